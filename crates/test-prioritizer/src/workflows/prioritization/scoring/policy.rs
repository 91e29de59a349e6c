use super::super::domain::Priority;
use super::config::ThresholdLadder;
use super::TestScore;

/// The automatable gate wins over the ladder; the weighted score of a gated
/// test is kept for display only.
pub fn classify(score: &TestScore, thresholds: &ThresholdLadder) -> Priority {
    if !score.automatable {
        return Priority::WontAutomate;
    }

    thresholds.band_for(score.weighted_score)
}
