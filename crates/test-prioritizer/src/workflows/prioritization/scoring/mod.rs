mod config;
mod policy;
mod rules;

pub use config::{ScoreBand, ThresholdLadder, ThresholdLadderError};
pub use policy::classify;

use super::domain::{Priority, TestId, TestRecord};
use super::registry::FactorRegistry;
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;

/// Stateless engine applying a factor catalog and threshold ladder to records.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    registry: Arc<FactorRegistry>,
    thresholds: ThresholdLadder,
}

impl ScoringEngine {
    pub fn new(registry: Arc<FactorRegistry>, thresholds: ThresholdLadder) -> Self {
        Self {
            registry,
            thresholds,
        }
    }

    pub fn registry(&self) -> &FactorRegistry {
        &self.registry
    }

    pub fn shared_registry(&self) -> Arc<FactorRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn thresholds(&self) -> &ThresholdLadder {
        &self.thresholds
    }

    /// Score and classify one record. Either the whole result is produced or
    /// the first offending field is reported.
    pub fn score(&self, record: &TestRecord) -> Result<ScoredTestRecord, ScoringError> {
        let score = score(record, &self.registry)?;
        let priority = classify(&score, &self.thresholds);
        Ok(ScoredTestRecord::new(record.clone(), score, priority))
    }

    /// Score a batch, failing atomically on the first invalid record.
    pub fn score_all<'a, I>(&self, records: I) -> Result<Vec<ScoredTestRecord>, ScoringError>
    where
        I: IntoIterator<Item = &'a TestRecord>,
    {
        records.into_iter().map(|record| self.score(record)).collect()
    }
}

/// Pure scoring of a record's factor values against a catalog.
pub fn score(record: &TestRecord, registry: &FactorRegistry) -> Result<TestScore, ScoringError> {
    rules::score_record(record, registry)
}

/// Discrete contribution of one factor, kept for transparent audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreComponent {
    pub factor: String,
    pub value: u32,
    pub weight: u32,
    pub contribution: u32,
}

/// Scoring output before classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestScore {
    pub automatable: bool,
    pub raw_score: u32,
    pub weighted_score: u32,
    pub components: Vec<ScoreComponent>,
}

/// A record together with its derived scores and tier. Always recomputable
/// from the record; never stored on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredTestRecord {
    pub record: TestRecord,
    pub raw_score: u32,
    pub weighted_score: u32,
    pub priority: Priority,
    pub components: Vec<ScoreComponent>,
}

impl ScoredTestRecord {
    pub fn new(record: TestRecord, score: TestScore, priority: Priority) -> Self {
        Self {
            record,
            raw_score: score.raw_score,
            weighted_score: score.weighted_score,
            priority,
            components: score.components,
        }
    }

    pub fn id(&self) -> TestId {
        self.record.id
    }

    pub fn contribution_of(&self, factor: &str) -> Option<u32> {
        self.components
            .iter()
            .find(|component| component.factor == factor)
            .map(|component| component.contribution)
    }

    /// Weighted score as a percentage of the catalog maximum, one decimal.
    pub fn percent_of_max(&self, max_weighted_score: u32) -> f64 {
        if max_weighted_score == 0 {
            return 0.0;
        }
        let pct = f64::from(self.weighted_score) / f64::from(max_weighted_score) * 100.0;
        (pct * 10.0).round() / 10.0
    }
}

/// Report ordering: automatable tests first, then weighted score descending,
/// raw score descending, id ascending.
pub fn ranking_order(a: &ScoredTestRecord, b: &ScoredTestRecord) -> Ordering {
    let gated = |scored: &ScoredTestRecord| scored.priority == Priority::WontAutomate;
    gated(a)
        .cmp(&gated(b))
        .then_with(|| b.weighted_score.cmp(&a.weighted_score))
        .then_with(|| b.raw_score.cmp(&a.raw_score))
        .then_with(|| a.record.id.cmp(&b.record.id))
}

pub fn rank_records(mut records: Vec<ScoredTestRecord>) -> Vec<ScoredTestRecord> {
    records.sort_by(ranking_order);
    records
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    #[error("test {test_id}: factor '{factor}' value {value} outside {min}..={max}")]
    InvalidFactorValue {
        test_id: TestId,
        factor: String,
        value: u32,
        min: u32,
        max: u32,
    },
    #[error("test {test_id}: missing value for factor '{factor}'")]
    MissingFactorValue { test_id: TestId, factor: String },
    #[error("test {test_id}: factor '{factor}' is not in the catalog")]
    UnknownFactor { test_id: TestId, factor: String },
    #[error("test {test_id}: question '{question}' is not in the catalog")]
    UnknownQuestion { test_id: TestId, question: String },
    #[error("test {test_id}: name must not be blank")]
    BlankName { test_id: TestId },
}
