use super::super::domain::Priority;
use serde::{Deserialize, Serialize};

/// Four strictly decreasing cutoffs separating the score-based tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLadder")]
pub struct ThresholdLadder {
    highest_threshold: u32,
    high_threshold: u32,
    medium_threshold: u32,
    low_threshold: u32,
}

#[derive(Deserialize)]
struct RawLadder {
    highest_threshold: i64,
    high_threshold: i64,
    medium_threshold: i64,
    low_threshold: i64,
}

impl TryFrom<RawLadder> for ThresholdLadder {
    type Error = ThresholdLadderError;

    fn try_from(raw: RawLadder) -> Result<Self, Self::Error> {
        Self::new(
            raw.highest_threshold,
            raw.high_threshold,
            raw.medium_threshold,
            raw.low_threshold,
        )
    }
}

/// Inclusive score range covered by one tier. `None` bounds are open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreBand {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

impl ThresholdLadder {
    pub fn new(highest: i64, high: i64, medium: i64, low: i64) -> Result<Self, ThresholdLadderError> {
        let ordered = highest > high && high > medium && medium > low && low >= 0;
        if !ordered {
            return Err(ThresholdLadderError::InvalidThresholdLadder {
                highest,
                high,
                medium,
                low,
            });
        }

        let convert = |value: i64| {
            u32::try_from(value).map_err(|_| ThresholdLadderError::InvalidThresholdLadder {
                highest,
                high,
                medium,
                low,
            })
        };

        Ok(Self {
            highest_threshold: convert(highest)?,
            high_threshold: convert(high)?,
            medium_threshold: convert(medium)?,
            low_threshold: convert(low)?,
        })
    }

    /// 90/80/60/40 percent of the reference catalog's maximum score of 70.
    pub const fn reference() -> Self {
        Self {
            highest_threshold: 63,
            high_threshold: 56,
            medium_threshold: 42,
            low_threshold: 28,
        }
    }

    pub const fn highest_threshold(&self) -> u32 {
        self.highest_threshold
    }

    pub const fn high_threshold(&self) -> u32 {
        self.high_threshold
    }

    pub const fn medium_threshold(&self) -> u32 {
        self.medium_threshold
    }

    pub const fn low_threshold(&self) -> u32 {
        self.low_threshold
    }

    /// Highest tier whose lower bound the score meets.
    pub fn band_for(&self, score: u32) -> Priority {
        if score >= self.highest_threshold {
            Priority::Highest
        } else if score >= self.high_threshold {
            Priority::High
        } else if score >= self.medium_threshold {
            Priority::Medium
        } else if score >= self.low_threshold {
            Priority::Low
        } else {
            Priority::Lowest
        }
    }

    /// Score range of a tier; `None` for Won't Automate and for an empty
    /// Lowest band when the low threshold is zero.
    pub fn band(&self, priority: Priority) -> Option<ScoreBand> {
        let band = |min: u32, next: u32| ScoreBand {
            min: Some(min),
            max: Some(next - 1),
        };

        match priority {
            Priority::Highest => Some(ScoreBand {
                min: Some(self.highest_threshold),
                max: None,
            }),
            Priority::High => Some(band(self.high_threshold, self.highest_threshold)),
            Priority::Medium => Some(band(self.medium_threshold, self.high_threshold)),
            Priority::Low => Some(band(self.low_threshold, self.medium_threshold)),
            Priority::Lowest => self.low_threshold.checked_sub(1).map(|max| ScoreBand {
                min: None,
                max: Some(max),
            }),
            Priority::WontAutomate => None,
        }
    }
}

impl Default for ThresholdLadder {
    fn default() -> Self {
        Self::reference()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThresholdLadderError {
    #[error(
        "thresholds must satisfy highest > high > medium > low >= 0 \
         (got {highest}/{high}/{medium}/{low})"
    )]
    InvalidThresholdLadder {
        highest: i64,
        high: i64,
        medium: i64,
        low: i64,
    },
}
