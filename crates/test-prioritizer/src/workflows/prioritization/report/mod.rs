mod html;
mod markdown;
mod matrix;
mod summary;
mod text;
pub mod views;

pub use html::{render_html, render_with_template, REPORT_TEMPLATE, TEMPLATE_TOKENS};
pub use markdown::render_markdown;
pub use matrix::{MatrixAxis, MatrixCell, MatrixError, MatrixPoint, PrioritizationMatrix};
pub use summary::{
    FactorContribution, HistogramBucket, ReportData, ScoreHistogram, SectionSummary, TierCounts,
};
pub use text::render_text;

use super::domain::Priority;
use super::scoring::ThresholdLadder;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BUCKET_WIDTH: u32 = 10;
pub const DEFAULT_TOP_N: usize = 10;

/// Caller-tunable aggregation knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSettings {
    pub bucket_width: u32,
    pub top_n: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            bucket_width: DEFAULT_BUCKET_WIDTH,
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// Human readable score range of a tier, e.g. `56 - 62` or `>= 63`.
pub(crate) fn score_range_label(thresholds: &ThresholdLadder, priority: Priority) -> String {
    match thresholds.band(priority) {
        Some(band) => match (band.min, band.max) {
            (Some(min), Some(max)) => format!("{min} - {max}"),
            (Some(min), None) => format!(">= {min}"),
            (None, Some(max)) => format!("<= {max}"),
            (None, None) => "any".to_string(),
        },
        None if priority == Priority::WontAutomate => "manual testing only".to_string(),
        None => "none".to_string(),
    }
}
