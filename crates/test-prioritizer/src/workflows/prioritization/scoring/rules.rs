use super::super::domain::TestRecord;
use super::super::registry::FactorRegistry;
use super::{ScoreComponent, ScoringError, TestScore};

pub(crate) fn score_record(
    record: &TestRecord,
    registry: &FactorRegistry,
) -> Result<TestScore, ScoringError> {
    if record.name.trim().is_empty() {
        return Err(ScoringError::BlankName { test_id: record.id });
    }

    if let Some(key) = record
        .factor_values
        .keys()
        .find(|key| registry.factor(key).is_none())
    {
        return Err(ScoringError::UnknownFactor {
            test_id: record.id,
            factor: key.clone(),
        });
    }

    if let Some(question) = record
        .yesno_answers
        .keys()
        .find(|question| registry.question(question).is_none())
    {
        return Err(ScoringError::UnknownQuestion {
            test_id: record.id,
            question: question.clone(),
        });
    }

    // The registry caps the catalog maximum at u32::MAX, so these sums fit.
    let mut components = Vec::with_capacity(registry.factors().len());
    let mut raw_score: u32 = 0;
    let mut weighted_score: u32 = 0;

    for factor in registry.factors() {
        let value = *record.factor_values.get(&factor.key).ok_or_else(|| {
            ScoringError::MissingFactorValue {
                test_id: record.id,
                factor: factor.key.clone(),
            }
        })?;

        if !factor.contains(value) {
            return Err(ScoringError::InvalidFactorValue {
                test_id: record.id,
                factor: factor.key.clone(),
                value,
                min: factor.min_value,
                max: factor.max_value,
            });
        }

        let contribution = value * factor.weight;
        raw_score += value;
        weighted_score += contribution;
        components.push(ScoreComponent {
            factor: factor.key.clone(),
            value,
            weight: factor.weight,
            contribution,
        });
    }

    Ok(TestScore {
        automatable: record.automatable,
        raw_score,
        weighted_score,
        components,
    })
}
