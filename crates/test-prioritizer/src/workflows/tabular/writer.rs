use super::columns::output_headers;
use super::normalizer::flag_text;
use super::CodecError;
use crate::workflows::prioritization::{rank_records, FactorRegistry, ScoringEngine, TestRecord};
use std::io::Write;

/// Validate, score and rank the records, then write them in contract order.
/// Nothing is written unless every record fits the catalog.
pub(crate) fn write_records<W: Write>(
    writer: W,
    records: &[TestRecord],
    engine: &ScoringEngine,
) -> Result<(), CodecError> {
    let registry = engine.registry();
    for record in records {
        check_compatible(record, registry)?;
    }

    let ranked = rank_records(engine.score_all(records)?);

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(output_headers(registry))?;

    for (index, scored) in ranked.iter().enumerate() {
        let record = &scored.record;
        let mut row: Vec<String> = vec![
            (index + 1).to_string(),
            scored.priority.label().to_string(),
            record.ticket_id.clone().unwrap_or_default(),
            record.section.clone().unwrap_or_default(),
            record.name.clone(),
            record.description.clone(),
        ];
        row.extend(registry.questions().iter().map(|question| {
            record
                .yesno_answers
                .get(&question.question_text)
                .map(|answer| flag_text(*answer).to_string())
                .unwrap_or_default()
        }));
        row.push(scored.weighted_score.to_string());
        row.push(scored.raw_score.to_string());
        row.push(flag_text(record.automatable).to_string());
        row.extend(registry.factors().iter().map(|factor| {
            record
                .factor_values
                .get(&factor.key)
                .copied()
                .unwrap_or_default()
                .to_string()
        }));
        row.push(record.id.to_string());

        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

fn check_compatible(record: &TestRecord, registry: &FactorRegistry) -> Result<(), CodecError> {
    let incompatible = |detail: String| CodecError::IncompatibleFactorSet {
        test_id: record.id,
        detail,
    };

    if let Some(key) = record
        .factor_values
        .keys()
        .find(|key| registry.factor(key).is_none())
    {
        return Err(incompatible(format!("unknown factor '{key}'")));
    }
    if let Some(factor) = registry
        .factors()
        .iter()
        .find(|factor| !record.factor_values.contains_key(&factor.key))
    {
        return Err(incompatible(format!("missing factor '{}'", factor.key)));
    }
    if let Some(question) = record
        .yesno_answers
        .keys()
        .find(|question| registry.question(question).is_none())
    {
        return Err(incompatible(format!("unknown question '{question}'")));
    }

    Ok(())
}
