use super::super::domain::Priority;
use super::super::registry::{AutomatableGate, Factor, FactorRegistry};
use super::super::scoring::{rank_records, ScoredTestRecord};
use super::views::{
    FactorContributionEntry, HistogramBucketEntry, ReportSummary, SectionEntry, TestDataRow,
    TierCountEntry, TopTestEntry,
};
use super::ReportSettings;
use std::collections::BTreeMap;

/// Per-tier record counts in [`Priority::ordered`] order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TierCounts([usize; 6]);

impl TierCounts {
    pub fn get(&self, priority: Priority) -> usize {
        self.0[priority.index()]
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    fn increment(&mut self, priority: Priority) {
        self.0[priority.index()] += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSummary {
    pub section: String,
    pub counts: TierCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramBucket {
    /// Inclusive lower bound.
    pub lower: u32,
    /// Exclusive upper bound.
    pub upper: u32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreHistogram {
    pub bucket_width: u32,
    pub buckets: Vec<HistogramBucket>,
}

impl ScoreHistogram {
    /// Contiguous buckets aligned to multiples of the width, spanning the
    /// lowest to the highest observed score.
    fn build(scores: &[u32], bucket_width: u32) -> Self {
        let width = bucket_width.max(1);
        let (Some(min), Some(max)) = (scores.iter().min(), scores.iter().max()) else {
            return Self {
                bucket_width: width,
                buckets: Vec::new(),
            };
        };

        let first = min / width;
        let last = max / width;
        let mut buckets: Vec<HistogramBucket> = (first..=last)
            .map(|slot| {
                let lower = slot * width;
                HistogramBucket {
                    lower,
                    // The top bucket of a very wide histogram is clamped.
                    upper: lower.saturating_add(width),
                    count: 0,
                }
            })
            .collect();

        for score in scores {
            let slot = (score / width - first) as usize;
            buckets[slot].count += 1;
        }

        Self {
            bucket_width: width,
            buckets,
        }
    }

    pub fn populated(&self) -> usize {
        self.buckets.iter().filter(|bucket| bucket.count > 0).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorContribution {
    pub key: String,
    pub display_name: String,
    pub weight: u32,
    pub total: u64,
}

/// Aggregated, render-ready view over a set of scored records.
#[derive(Debug, Clone)]
pub struct ReportData {
    pub ranked: Vec<ScoredTestRecord>,
    pub counts: TierCounts,
    pub sections: Vec<SectionSummary>,
    pub histogram: ScoreHistogram,
    pub factor_contributions: Vec<FactorContribution>,
    pub top_tests: Vec<ScoredTestRecord>,
    pub factors: Vec<Factor>,
    pub gate: AutomatableGate,
    pub max_weighted_score: u32,
}

impl ReportData {
    /// Pure aggregation; an empty input yields zero counts and empty series.
    pub fn aggregate(
        records: &[ScoredTestRecord],
        registry: &FactorRegistry,
        settings: &ReportSettings,
    ) -> Self {
        let ranked = rank_records(records.to_vec());

        let mut counts = TierCounts::default();
        let mut by_section: BTreeMap<&str, TierCounts> = BTreeMap::new();
        for scored in &ranked {
            counts.increment(scored.priority);
            if let Some(section) = scored.record.section.as_deref() {
                by_section
                    .entry(section)
                    .or_default()
                    .increment(scored.priority);
            }
        }

        let sections = by_section
            .into_iter()
            .map(|(section, counts)| SectionSummary {
                section: section.to_string(),
                counts,
            })
            .collect();

        let scores: Vec<u32> = ranked.iter().map(|scored| scored.weighted_score).collect();
        let histogram = ScoreHistogram::build(&scores, settings.bucket_width);

        let factor_contributions = registry
            .factors()
            .iter()
            .map(|factor| FactorContribution {
                key: factor.key.clone(),
                display_name: factor.display_name.clone(),
                weight: factor.weight,
                total: ranked
                    .iter()
                    .filter_map(|scored| scored.contribution_of(&factor.key))
                    .map(u64::from)
                    .sum(),
            })
            .collect();

        let top_tests = ranked
            .iter()
            .filter(|scored| scored.priority != Priority::WontAutomate)
            .take(settings.top_n)
            .cloned()
            .collect();

        Self {
            counts,
            sections,
            histogram,
            factor_contributions,
            top_tests,
            factors: registry.factors().to_vec(),
            gate: registry.gate().clone(),
            max_weighted_score: registry.max_weighted_score(),
            ranked,
        }
    }

    pub fn total_tests(&self) -> usize {
        self.ranked.len()
    }

    /// Records of one tier in ranked order.
    pub fn tier(&self, priority: Priority) -> impl Iterator<Item = &ScoredTestRecord> {
        self.ranked
            .iter()
            .filter(move |scored| scored.priority == priority)
    }

    pub fn total_weighted_score(&self) -> u64 {
        self.ranked
            .iter()
            .map(|scored| u64::from(scored.weighted_score))
            .sum()
    }

    pub fn total_contribution(&self) -> u64 {
        self.factor_contributions
            .iter()
            .map(|contribution| contribution.total)
            .sum()
    }

    pub fn summary(&self) -> ReportSummary {
        let tier_counts = Priority::ordered()
            .into_iter()
            .map(|priority| TierCountEntry {
                priority,
                label: priority.label(),
                count: self.counts.get(priority),
            })
            .collect();

        let sections = self
            .sections
            .iter()
            .map(|summary| SectionEntry {
                section: summary.section.clone(),
                total: summary.counts.total(),
                tiers: Priority::ordered()
                    .into_iter()
                    .map(|priority| TierCountEntry {
                        priority,
                        label: priority.label(),
                        count: summary.counts.get(priority),
                    })
                    .collect(),
            })
            .collect();

        let score_histogram = self
            .histogram
            .buckets
            .iter()
            .map(|bucket| HistogramBucketEntry {
                lower: bucket.lower,
                upper: bucket.upper,
                count: bucket.count,
            })
            .collect();

        let factor_contributions = self
            .factor_contributions
            .iter()
            .map(|contribution| FactorContributionEntry {
                factor: contribution.key.clone(),
                display_name: contribution.display_name.clone(),
                weight: contribution.weight,
                total: contribution.total,
            })
            .collect();

        let top_tests = self
            .top_tests
            .iter()
            .enumerate()
            .map(|(index, scored)| TopTestEntry {
                rank: index + 1,
                id: scored.record.id,
                name: scored.record.name.clone(),
                priority: scored.priority,
                priority_label: scored.priority.label(),
                weighted_score: scored.weighted_score,
                raw_score: scored.raw_score,
            })
            .collect();

        ReportSummary {
            total_tests: self.total_tests(),
            tier_counts,
            sections,
            score_histogram,
            factor_contributions,
            top_tests,
        }
    }

    /// Rows for the HTML table script: tier order, then score descending.
    pub fn test_data_rows(&self) -> Vec<TestDataRow> {
        let mut rows: Vec<&ScoredTestRecord> = self.ranked.iter().collect();
        rows.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| b.weighted_score.cmp(&a.weighted_score))
                .then_with(|| a.record.id.cmp(&b.record.id))
        });

        rows.into_iter()
            .map(|scored| TestDataRow {
                id: scored.record.id,
                ticket_id: scored.record.ticket_id.clone().unwrap_or_default(),
                name: scored.record.name.clone(),
                section: scored.record.section.clone().unwrap_or_default(),
                priority: scored.priority.label(),
                total_score: scored.weighted_score,
            })
            .collect()
    }
}
