use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use test_prioritizer::config::PrioritizationConfig;
use test_prioritizer::error::AppError;
use test_prioritizer::workflows::prioritization::{
    PrioritizationService, RepositoryError, ScoringEngine, TestCatalog, TestId, TestRecord,
    TestRecordDraft, TestRepository,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local catalog; the mutex is the single write lock for the service.
#[derive(Default, Clone)]
pub(crate) struct InMemoryTestRepository {
    catalog: Arc<Mutex<TestCatalog>>,
}

impl InMemoryTestRepository {
    fn lock(&self) -> Result<MutexGuard<'_, TestCatalog>, RepositoryError> {
        self.catalog
            .lock()
            .map_err(|_| RepositoryError::Unavailable("test catalog lock poisoned".to_string()))
    }
}

impl TestRepository for InMemoryTestRepository {
    fn insert(&self, draft: TestRecordDraft) -> Result<TestRecord, RepositoryError> {
        Ok(self.lock()?.add(draft))
    }

    fn update(&self, record: TestRecord) -> Result<(), RepositoryError> {
        self.lock()?.replace(record)?;
        Ok(())
    }

    fn delete(&self, id: TestId) -> Result<TestRecord, RepositoryError> {
        Ok(self.lock()?.delete(id)?)
    }

    fn fetch(&self, id: TestId) -> Result<Option<TestRecord>, RepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<TestRecord>, RepositoryError> {
        Ok(self.lock()?.records().cloned().collect())
    }

    fn import(&self, records: Vec<TestRecord>, replace: bool) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.import(records, replace)?)
    }
}

pub(crate) fn build_engine(config: &PrioritizationConfig) -> Result<ScoringEngine, AppError> {
    let registry = config.registry()?;
    Ok(ScoringEngine::new(Arc::new(registry), config.thresholds))
}

pub(crate) fn build_service(
    config: &PrioritizationConfig,
) -> Result<PrioritizationService<InMemoryTestRepository>, AppError> {
    let engine = build_engine(config)?;
    Ok(PrioritizationService::new(
        Arc::new(InMemoryTestRepository::default()),
        engine,
        config.report,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn draft(name: &str) -> TestRecordDraft {
        TestRecordDraft {
            ticket_id: None,
            name: name.to_string(),
            section: None,
            description: String::new(),
            factor_values: BTreeMap::new(),
            yesno_answers: BTreeMap::new(),
            automatable: true,
        }
    }

    #[test]
    fn repository_assigns_sequential_ids() {
        let repository = InMemoryTestRepository::default();
        let first = repository.insert(draft("first")).expect("insert");
        let second = repository.insert(draft("second")).expect("insert");
        assert_eq!(first.id, TestId(1));
        assert_eq!(second.id, TestId(2));

        repository.delete(first.id).expect("delete");
        assert_eq!(repository.list().expect("list").len(), 1);
        assert!(repository.fetch(first.id).expect("fetch").is_none());
    }

    #[test]
    fn update_of_missing_record_is_not_found() {
        let repository = InMemoryTestRepository::default();
        let orphan = TestRecord::from_draft(TestId(7), draft("orphan"));
        assert!(matches!(
            repository.update(orphan),
            Err(RepositoryError::NotFound(TestId(7)))
        ));
    }

    #[test]
    fn default_service_uses_reference_catalog() {
        let service = build_service(&PrioritizationConfig::default()).expect("service");
        assert_eq!(service.registry().max_weighted_score(), 70);
        assert_eq!(service.settings().top_n, 10);
    }
}
