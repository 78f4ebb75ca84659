//! # Time Window
//! Most-recent-N slice of the snapshot sequence, averaged per snapshot for
//! one industry.
//!
//! Position in the input decides recency; callers supply chronological
//! input (see `ingest::is_chronological`). Every selected snapshot yields one
//! point, so chart x-axes stay aligned to snapshot times.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::aggregate::round_to;
use crate::model::{Snapshot, Timestamp};
use crate::normalize::Normalizer;

/// Range presets offered by the trend view (most recent N snapshots).
pub const RANGE_PRESETS: [usize; 4] = [24, 48, 168, 720];
pub const DEFAULT_RANGE: usize = 48;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp: Timestamp,
    pub value: f64,
}

/// Last `limit` snapshots (clamped), one point each; `limit == 0` acts as 1.
pub fn windowed_series(snapshots: &[Snapshot], industry: &str, limit: usize) -> Vec<SeriesPoint> {
    windowed_series_with(&Normalizer::default(), snapshots, industry, limit)
}

pub fn windowed_series_with(
    normalizer: &Normalizer,
    snapshots: &[Snapshot],
    industry: &str,
    limit: usize,
) -> Vec<SeriesPoint> {
    let start = snapshots.len().saturating_sub(limit.max(1));

    snapshots[start..]
        .iter()
        .map(|snap| {
            let mut sum = 0.0f64;
            let mut n = 0usize;
            for r in normalizer.normalize(snap) {
                if r.industry == industry {
                    sum += r.score;
                    n += 1;
                }
            }
            let avg = if n > 0 { sum / n as f64 } else { 0.0 };
            SeriesPoint {
                timestamp: snap.run_timestamp.clone(),
                value: round_to(avg, 4),
            }
        })
        .collect()
}

/// Sorted, de-duplicated industries appearing anywhere in `snapshots`.
pub fn industries_in(normalizer: &Normalizer, snapshots: &[Snapshot]) -> Vec<String> {
    let set: BTreeSet<String> = snapshots
        .iter()
        .flat_map(|s| normalizer.normalize(s))
        .map(|r| r.industry)
        .collect();
    set.into_iter().collect()
}
