use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::prioritization::catalog::TestCatalog;
use crate::workflows::prioritization::{
    prioritization_router, FactorRegistry, PrioritizationService, ReportSettings,
    RepositoryError, ScoredTestRecord, ScoringEngine, TestId, TestRecord, TestRecordDraft,
    TestRepository, ThresholdLadder,
};

/// Factor values in reference catalog order: regression, impact, effort,
/// complexity, framework, angular, repetitive.
pub(super) type Values = [u32; 7];

pub(super) fn registry() -> Arc<FactorRegistry> {
    Arc::new(FactorRegistry::reference())
}

pub(super) fn engine() -> ScoringEngine {
    ScoringEngine::new(registry(), ThresholdLadder::reference())
}

pub(super) fn engine_with(thresholds: ThresholdLadder) -> ScoringEngine {
    ScoringEngine::new(registry(), thresholds)
}

pub(super) fn factor_values(values: Values) -> BTreeMap<String, u32> {
    FactorRegistry::reference()
        .factors()
        .iter()
        .map(|factor| factor.key.clone())
        .zip(values)
        .collect()
}

pub(super) fn draft(name: &str, values: Values) -> TestRecordDraft {
    TestRecordDraft {
        ticket_id: Some(format!("QA-{}", name.len())),
        name: name.to_string(),
        section: Some("Checkout".to_string()),
        description: format!("{name} end to end"),
        factor_values: factor_values(values),
        yesno_answers: BTreeMap::new(),
        automatable: true,
    }
}

pub(super) fn record(id: u64, name: &str, values: Values) -> TestRecord {
    TestRecord::from_draft(TestId(id), draft(name, values))
}

pub(super) fn gated(id: u64, name: &str, values: Values) -> TestRecord {
    let mut record = record(id, name, values);
    record.automatable = false;
    record
}

pub(super) fn in_section(mut record: TestRecord, section: Option<&str>) -> TestRecord {
    record.section = section.map(str::to_string);
    record
}

pub(super) fn scored(records: &[TestRecord]) -> Vec<ScoredTestRecord> {
    engine().score_all(records).expect("fixtures score cleanly")
}

/// The worked example: weighted 41, raw 17.
pub(super) const EXAMPLE: Values = [4, 5, 2, 1, 3, 0, 2];

pub(super) fn build_service() -> (PrioritizationService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service =
        PrioritizationService::new(repository.clone(), engine(), ReportSettings::default());
    (service, repository)
}

pub(super) fn router_with_service(
    service: PrioritizationService<MemoryRepository>,
) -> axum::Router {
    prioritization_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) catalog: Arc<Mutex<TestCatalog>>,
}

impl TestRepository for MemoryRepository {
    fn insert(&self, draft: TestRecordDraft) -> Result<TestRecord, RepositoryError> {
        let mut guard = self.catalog.lock().expect("repository mutex poisoned");
        Ok(guard.add(draft))
    }

    fn update(&self, record: TestRecord) -> Result<(), RepositoryError> {
        let mut guard = self.catalog.lock().expect("repository mutex poisoned");
        guard.replace(record)?;
        Ok(())
    }

    fn delete(&self, id: TestId) -> Result<TestRecord, RepositoryError> {
        let mut guard = self.catalog.lock().expect("repository mutex poisoned");
        Ok(guard.delete(id)?)
    }

    fn fetch(&self, id: TestId) -> Result<Option<TestRecord>, RepositoryError> {
        let guard = self.catalog.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<TestRecord>, RepositoryError> {
        let guard = self.catalog.lock().expect("repository mutex poisoned");
        Ok(guard.records().cloned().collect())
    }

    fn import(&self, records: Vec<TestRecord>, replace: bool) -> Result<usize, RepositoryError> {
        let mut guard = self.catalog.lock().expect("repository mutex poisoned");
        Ok(guard.import(records, replace)?)
    }
}

pub(super) struct UnavailableRepository;

impl TestRepository for UnavailableRepository {
    fn insert(&self, _draft: TestRecordDraft) -> Result<TestRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: TestRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: TestId) -> Result<TestRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: TestId) -> Result<Option<TestRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<TestRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn import(&self, _records: Vec<TestRecord>, _replace: bool) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = read_body(response).await;
    serde_json::from_slice(&body).expect("json payload")
}
