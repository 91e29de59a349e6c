use super::super::domain::{Priority, TestId};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TierCountEntry {
    pub priority: Priority,
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionEntry {
    pub section: String,
    pub total: usize,
    pub tiers: Vec<TierCountEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistogramBucketEntry {
    pub lower: u32,
    pub upper: u32,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FactorContributionEntry {
    pub factor: String,
    pub display_name: String,
    pub weight: u32,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopTestEntry {
    pub rank: usize,
    pub id: TestId,
    pub name: String,
    pub priority: Priority,
    pub priority_label: &'static str,
    pub weighted_score: u32,
    pub raw_score: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub total_tests: usize,
    pub tier_counts: Vec<TierCountEntry>,
    pub sections: Vec<SectionEntry>,
    pub score_histogram: Vec<HistogramBucketEntry>,
    pub factor_contributions: Vec<FactorContributionEntry>,
    pub top_tests: Vec<TopTestEntry>,
}

/// One entry of the `{{test_data_json}}` array consumed by the report script.
#[derive(Debug, Clone, Serialize)]
pub struct TestDataRow {
    pub id: TestId,
    pub ticket_id: String,
    pub name: String,
    pub section: String,
    pub priority: &'static str,
    pub total_score: u32,
}
