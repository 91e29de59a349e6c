use super::catalog::CatalogError;
use super::domain::{TestId, TestRecord, TestRecordDraft};
use super::scoring::ScoringError;

/// Storage abstraction so the service module can be exercised in isolation.
/// Implementations serialize writes; reads return owned snapshots.
pub trait TestRepository: Send + Sync {
    /// Store a new record under the next free id.
    fn insert(&self, draft: TestRecordDraft) -> Result<TestRecord, RepositoryError>;
    fn update(&self, record: TestRecord) -> Result<(), RepositoryError>;
    fn delete(&self, id: TestId) -> Result<TestRecord, RepositoryError>;
    fn fetch(&self, id: TestId) -> Result<Option<TestRecord>, RepositoryError>;
    fn list(&self) -> Result<Vec<TestRecord>, RepositoryError>;
    /// Append a batch, or swap the whole collection when `replace` is set.
    fn import(&self, records: Vec<TestRecord>, replace: bool) -> Result<usize, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("test {0} already exists")]
    Conflict(TestId),
    #[error("test {0} not found")]
    NotFound(TestId),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("test rejected: {0}")]
    Rejected(ScoringError),
}

impl From<CatalogError> for RepositoryError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::DuplicateId(id) => Self::Conflict(id),
            CatalogError::NotFound(id) => Self::NotFound(id),
            CatalogError::Rejected(err) => Self::Rejected(err),
        }
    }
}
