//! Scoring, tiering and reporting of manual tests as automation candidates.
//!
//! The engine pieces (`registry`, `scoring`, `report`, `catalog`) are pure and
//! never log; `service` and `router` are the host-side layers that own storage
//! access and emit tracing events.

pub mod catalog;
pub mod domain;
pub mod registry;
pub mod report;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogError, TestCatalog};
pub use domain::{
    css_class_for_label, Priority, TestId, TestRecord, TestRecordDraft, TestRecordUpdate,
};
pub use registry::{AutomatableGate, Factor, FactorRegistry, RegistryError, YesNoQuestion};
pub use report::{MatrixError, PrioritizationMatrix, ReportData, ReportSettings};
pub use repository::{RepositoryError, TestRepository};
pub use router::prioritization_router;
pub use scoring::{
    classify, rank_records, ranking_order, score, ScoreBand, ScoreComponent, ScoredTestRecord,
    ScoringEngine, ScoringError, TestScore, ThresholdLadder, ThresholdLadderError,
};
pub use service::{PrioritizationService, PrioritizationServiceError};
