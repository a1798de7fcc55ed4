//! Monthly Top-K Ranking
//!
//! Groups raw usage rows by month, ranks each month's resources by request
//! count and pivots the result into one rank-or-absent series per tracked
//! resource.
//!
//! ## Algorithm
//!
//! 1. Partition records by [`MonthKey`]
//! 2. Sort each month by requests descending and keep the first `limit`
//! 3. Assign 1-based positions within the truncated list
//! 4. Collect every resource that made any month's top list (the tracked set)
//! 5. For each tracked resource, emit one point per month in the dataset,
//!    `None` where it was not ranked
//!
//! Equal request counts are ordered by resource identity (library, version,
//! file) so the output does not depend on the order rows come out of the
//! store.
//!
//! A resource holds at most one slot per month. When the store has several
//! rows for the same resource in one month, only the row with the most
//! requests is ranked and the rest are dropped before truncation, so
//! positions stay contiguous.

use crate::models::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Default number of resources ranked per month
pub const DEFAULT_TOP_LIMIT: usize = 5;

/// Output of the ranking aggregation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingReport {
    pub limit: usize,
    /// Every month present in the input, ascending
    pub months: Vec<MonthKey>,
    /// Each month's ranked top list
    pub monthly_top: BTreeMap<MonthKey, Vec<RankedEntry>>,
    /// One series per tracked resource, ordered by resource identity
    pub series: Vec<ResourceSeries>,
}

impl RankingReport {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn tracked_count(&self) -> usize {
        self.series.len()
    }

    pub fn month_labels(&self) -> Vec<String> {
        self.months.iter().map(|m| m.to_string()).collect()
    }
}

pub struct RankingAggregator {
    limit: usize,
}

impl Default for RankingAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_LIMIT)
    }
}

impl RankingAggregator {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn aggregate(&self, records: &[UsageRecord]) -> RankingReport {
        let monthly_top = self.rank_by_month(records);
        let months: Vec<MonthKey> = monthly_top.keys().cloned().collect();

        let tracked: BTreeSet<ResourceId> = monthly_top
            .values()
            .flat_map(|entries| entries.iter().map(RankedEntry::resource))
            .collect();

        let series: Vec<ResourceSeries> = tracked
            .into_iter()
            .map(|resource| {
                let points = monthly_top
                    .iter()
                    .map(|(month, entries)| SeriesPoint {
                        month: month.clone(),
                        entry: entries.iter().find(|e| e.resource() == resource).cloned(),
                    })
                    .collect();
                ResourceSeries { resource, points }
            })
            .collect();

        debug!(
            records = records.len(),
            months = months.len(),
            tracked = series.len(),
            limit = self.limit,
            "Ranking aggregation complete"
        );

        RankingReport {
            limit: self.limit,
            months,
            monthly_top,
            series,
        }
    }

    /// Group by month and keep each month's top `limit`, positions assigned.
    /// The `BTreeMap` keeps months in chronological order.
    pub fn rank_by_month(&self, records: &[UsageRecord]) -> BTreeMap<MonthKey, Vec<RankedEntry>> {
        let mut by_month: BTreeMap<MonthKey, Vec<&UsageRecord>> = BTreeMap::new();
        for record in records {
            by_month.entry(record.month_key()).or_default().push(record);
        }

        by_month
            .into_iter()
            .map(|(month, mut rows)| {
                rows.sort_by(|a, b| {
                    b.requests
                        .cmp(&a.requests)
                        .then_with(|| a.library.cmp(&b.library))
                        .then_with(|| a.version.cmp(&b.version))
                        .then_with(|| a.file.cmp(&b.file))
                });
                let mut seen = BTreeSet::new();
                let ranked = rows
                    .into_iter()
                    .filter(|record| seen.insert(record.resource()))
                    .take(self.limit)
                    .enumerate()
                    .map(|(i, record)| RankedEntry::from_record(i + 1, record))
                    .collect();
                (month, ranked)
            })
            .collect()
    }
}
