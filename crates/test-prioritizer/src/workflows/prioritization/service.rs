use std::io::{Read, Write};
use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use super::domain::{TestId, TestRecord, TestRecordDraft, TestRecordUpdate};
use super::registry::FactorRegistry;
use super::report::{
    render_html, render_markdown, render_text, MatrixError, PrioritizationMatrix, ReportData,
    ReportSettings,
};
use super::repository::{RepositoryError, TestRepository};
use super::scoring::{rank_records, ScoredTestRecord, ScoringEngine, ScoringError};
use crate::workflows::tabular::{CodecError, TestCsvCodec};

/// Placeholder id used while validating a draft that has not been stored yet.
const UNASSIGNED: TestId = TestId(0);

/// Service composing the repository, scoring engine and report settings.
pub struct PrioritizationService<R> {
    repository: Arc<R>,
    engine: ScoringEngine,
    codec: TestCsvCodec,
    settings: ReportSettings,
}

impl<R> PrioritizationService<R>
where
    R: TestRepository + 'static,
{
    pub fn new(repository: Arc<R>, engine: ScoringEngine, settings: ReportSettings) -> Self {
        let codec = TestCsvCodec::new(engine.clone());
        Self {
            repository,
            engine,
            codec,
            settings,
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn registry(&self) -> &FactorRegistry {
        self.engine.registry()
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    /// Validate and store a new test. Nothing is stored if scoring fails.
    pub fn add(
        &self,
        draft: TestRecordDraft,
    ) -> Result<ScoredTestRecord, PrioritizationServiceError> {
        self.engine
            .score(&TestRecord::from_draft(UNASSIGNED, draft.clone()))
            .map_err(PrioritizationServiceError::InvalidDraft)?;

        let stored = self.repository.insert(draft)?;
        let scored = self.engine.score(&stored)?;
        info!(
            test_id = %scored.id(),
            priority = scored.priority.label(),
            weighted_score = scored.weighted_score,
            "test added"
        );
        Ok(scored)
    }

    /// Apply a field-wise edit. The stored record is untouched unless the
    /// edited version scores cleanly.
    pub fn edit(
        &self,
        id: TestId,
        update: &TestRecordUpdate,
    ) -> Result<ScoredTestRecord, PrioritizationServiceError> {
        let current = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound(id))?;
        let edited = update.apply_to(&current);
        let scored = self.engine.score(&edited)?;

        self.repository.update(edited)?;
        info!(
            test_id = %id,
            priority = scored.priority.label(),
            weighted_score = scored.weighted_score,
            "test updated"
        );
        Ok(scored)
    }

    pub fn delete(&self, id: TestId) -> Result<TestRecord, PrioritizationServiceError> {
        let removed = self.repository.delete(id)?;
        info!(test_id = %id, "test deleted");
        Ok(removed)
    }

    pub fn get(&self, id: TestId) -> Result<ScoredTestRecord, PrioritizationServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound(id))?;
        Ok(self.engine.score(&record)?)
    }

    /// Every stored test, scored and in report order.
    pub fn ranked(&self) -> Result<Vec<ScoredTestRecord>, PrioritizationServiceError> {
        let records = self.repository.list()?;
        let scored = self.engine.score_all(&records)?;
        Ok(rank_records(scored))
    }

    pub fn report(&self) -> Result<ReportData, PrioritizationServiceError> {
        let scored = self.ranked()?;
        debug!(tests = scored.len(), "aggregating report");
        Ok(ReportData::aggregate(
            &scored,
            self.engine.registry(),
            &self.settings,
        ))
    }

    pub fn report_html(
        &self,
        generated_at: NaiveDateTime,
    ) -> Result<String, PrioritizationServiceError> {
        let data = self.report()?;
        Ok(render_html(&data, self.engine.thresholds(), generated_at))
    }

    pub fn report_text(
        &self,
        generated_at: NaiveDateTime,
    ) -> Result<String, PrioritizationServiceError> {
        let data = self.report()?;
        Ok(render_text(&data, self.engine.thresholds(), generated_at))
    }

    pub fn report_markdown(
        &self,
        generated_at: NaiveDateTime,
    ) -> Result<String, PrioritizationServiceError> {
        let data = self.report()?;
        Ok(render_markdown(&data, self.engine.thresholds(), generated_at))
    }

    /// Bubble-chart series of every stored test on two factors.
    pub fn matrix(
        &self,
        x_factor: &str,
        y_factor: &str,
    ) -> Result<PrioritizationMatrix, PrioritizationServiceError> {
        let matrix = self.report()?.matrix(x_factor, y_factor)?;
        debug!(points = matrix.points.len(), x_factor, y_factor, "matrix built");
        Ok(matrix)
    }

    /// Decode a CSV batch and add it to (or, with `replace`, swap it in for)
    /// the stored tests. The batch is fully validated first.
    pub fn import_csv<Rd: Read>(
        &self,
        reader: Rd,
        replace: bool,
    ) -> Result<usize, PrioritizationServiceError> {
        let records = match self.codec.decode(reader) {
            Ok(records) => records,
            Err(err) => {
                warn!(problems = err.problems().len(), "csv import rejected");
                return Err(err.into());
            }
        };
        self.engine.score_all(&records)?;

        let imported = self.repository.import(records, replace)?;
        info!(imported, replace, "csv import applied");
        Ok(imported)
    }

    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize, PrioritizationServiceError> {
        let records = self.repository.list()?;
        self.codec.encode(&records, writer)?;
        info!(exported = records.len(), "csv export written");
        Ok(records.len())
    }
}

/// Error raised by the prioritization service.
#[derive(Debug, thiserror::Error)]
pub enum PrioritizationServiceError {
    /// Scoring failure on a draft; the id in the message is the placeholder 0.
    #[error("invalid test: {0}")]
    InvalidDraft(ScoringError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}
