use super::domain::{TestId, TestRecord, TestRecordDraft, TestRecordUpdate};
use super::scoring::{ScoredTestRecord, ScoringEngine, ScoringError};
use std::collections::BTreeMap;

/// Caller-owned collection of test records. Ids start at 1, increase
/// monotonically and are never handed out twice, even after deletes.
#[derive(Debug, Clone)]
pub struct TestCatalog {
    records: BTreeMap<TestId, TestRecord>,
    next_id: u64,
}

impl Default for TestCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TestCatalog {
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn add(&mut self, draft: TestRecordDraft) -> TestRecord {
        let id = TestId(self.next_id);
        self.next_id += 1;
        let record = TestRecord::from_draft(id, draft);
        self.records.insert(id, record.clone());
        record
    }

    /// Insert a record that already carries an id (e.g. from a CSV import).
    pub fn insert(&mut self, record: TestRecord) -> Result<(), CatalogError> {
        if self.records.contains_key(&record.id) {
            return Err(CatalogError::DuplicateId(record.id));
        }
        self.next_id = self.next_id.max(record.id.0.saturating_add(1));
        self.records.insert(record.id, record);
        Ok(())
    }

    /// Apply a field-wise edit once the edited record scores cleanly against
    /// `engine`; otherwise the stored record is left as it was.
    pub fn edit(
        &mut self,
        id: TestId,
        update: &TestRecordUpdate,
        engine: &ScoringEngine,
    ) -> Result<ScoredTestRecord, CatalogError> {
        let record = self.records.get_mut(&id).ok_or(CatalogError::NotFound(id))?;
        let edited = update.apply_to(record);
        let scored = engine.score(&edited)?;
        *record = edited;
        Ok(scored)
    }

    /// Replace a stored record wholesale; the id must already exist.
    pub fn replace(&mut self, record: TestRecord) -> Result<(), CatalogError> {
        match self.records.get_mut(&record.id) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(CatalogError::NotFound(record.id)),
        }
    }

    pub fn delete(&mut self, id: TestId) -> Result<TestRecord, CatalogError> {
        self.records.remove(&id).ok_or(CatalogError::NotFound(id))
    }

    /// Remove every record and reset the id counter.
    pub fn clear(&mut self) -> bool {
        let had_records = !self.records.is_empty();
        self.records.clear();
        self.next_id = 1;
        had_records
    }

    pub fn get(&self, id: TestId) -> Option<&TestRecord> {
        self.records.get(&id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&TestRecord> {
        self.records.values().find(|record| record.name == name)
    }

    pub fn records(&self) -> impl Iterator<Item = &TestRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn next_id(&self) -> TestId {
        TestId(self.next_id)
    }

    /// Append (or, with `replace`, swap in) a batch of records. The batch is
    /// checked for id clashes before anything is changed.
    pub fn import(&mut self, records: Vec<TestRecord>, replace: bool) -> Result<usize, CatalogError> {
        let mut seen = std::collections::HashSet::new();
        for record in &records {
            let clashes = !replace && self.records.contains_key(&record.id);
            if clashes || !seen.insert(record.id) {
                return Err(CatalogError::DuplicateId(record.id));
            }
        }

        if replace {
            self.clear();
        }

        let count = records.len();
        for record in records {
            self.insert(record)?;
        }
        Ok(count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("test {0} already exists")]
    DuplicateId(TestId),
    #[error("test {0} not found")]
    NotFound(TestId),
    #[error(transparent)]
    Rejected(#[from] ScoringError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::prioritization::{FactorRegistry, ThresholdLadder};
    use std::sync::Arc;

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
    fn ids_are_never_reused_after_delete() {
        let mut catalog = TestCatalog::new();
        let first = catalog.add(draft("first"));
        let second = catalog.add(draft("second"));
        catalog.delete(second.id).expect("delete succeeds");
        let third = catalog.add(draft("third"));

        assert_eq!(first.id, TestId(1));
        assert_eq!(third.id, TestId(3));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn insert_advances_counter_past_explicit_ids() {
        let mut catalog = TestCatalog::new();
        let record = TestRecord::from_draft(TestId(41), draft("imported"));
        catalog.insert(record.clone()).expect("insert");
        assert_eq!(catalog.next_id(), TestId(42));
        assert_eq!(catalog.insert(record), Err(CatalogError::DuplicateId(TestId(41))));
    }

    #[test]
    fn import_rejects_clashes_without_partial_changes() {
        let mut catalog = TestCatalog::new();
        catalog.add(draft("existing"));

        let batch = vec![
            TestRecord::from_draft(TestId(5), draft("five")),
            TestRecord::from_draft(TestId(1), draft("clash")),
        ];
        assert_eq!(
            catalog.import(batch.clone(), false),
            Err(CatalogError::DuplicateId(TestId(1)))
        );
        assert_eq!(catalog.len(), 1);

        assert_eq!(catalog.import(batch, true), Ok(2));
        assert_eq!(catalog.find_by_name("clash").map(|r| r.id), Some(TestId(1)));
        assert!(catalog.find_by_name("existing").is_none());
    }

    #[test]
    fn edit_validates_before_applying() {
        let engine = ScoringEngine::new(
            Arc::new(FactorRegistry::reference()),
            ThresholdLadder::reference(),
        );
        let mut scorable = draft("Checkout");
        scorable.factor_values = engine
            .registry()
            .factors()
            .iter()
            .map(|factor| (factor.key.clone(), 5))
            .collect();
        let mut catalog = TestCatalog::new();
        let stored = catalog.add(scorable);

        let blank = TestRecordUpdate {
            name: Some("   ".to_string()),
            ..TestRecordUpdate::default()
        };
        assert!(matches!(
            catalog.edit(stored.id, &blank, &engine),
            Err(CatalogError::Rejected(ScoringError::BlankName { .. }))
        ));
        assert_eq!(catalog.get(stored.id), Some(&stored));

        let gated = TestRecordUpdate {
            automatable: Some(false),
            ..TestRecordUpdate::default()
        };
        let edited = catalog.edit(stored.id, &gated, &engine).expect("edit applies");
        assert_eq!(edited.weighted_score, 70);
        assert_eq!(catalog.get(stored.id).map(|record| record.automatable), Some(false));
        assert_eq!(
            catalog.edit(TestId(99), &gated, &engine).map(|scored| scored.id()),
            Err(CatalogError::NotFound(TestId(99)))
        );
    }

    #[test]
    fn clear_resets_counter() {
        let mut catalog = TestCatalog::new();
        assert!(!catalog.clear());
        catalog.add(draft("one"));
        assert!(catalog.clear());
        assert_eq!(catalog.add(draft("again")).id, TestId(1));
    }
}
