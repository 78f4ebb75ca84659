//! # Ranking
//! Stable orderings over aggregated industries and individual records.
//!
//! Magnitude rankings sort descending by `abs(value)`; equal magnitudes keep
//! their input order. Selections are single scans where the first
//! encountered candidate wins ties.

use serde::Serialize;

use crate::aggregate::{round_to, IndustryTable};
use crate::model::{ImpactRecord, RawEvent};
use crate::normalize::Normalizer;
use crate::taxonomy::NO_DATA_INDUSTRY;

/// Default length of the home view's industry bars.
pub const HOME_TOP_N: usize = 10;
/// Default length of the average-impact industry chart.
pub const CHART_TOP_N: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked {
    pub name: String,
    pub value: f64,
}

/// Which per-industry statistic to rank by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Sum,
    /// Mean rounded to 4 decimals.
    Mean,
}

/// Stable sort by descending `abs(key)`, then truncate to `n`.
pub fn top_n_by<T, F>(mut items: Vec<T>, n: usize, key: F) -> Vec<T>
where
    F: Fn(&T) -> f64,
{
    items.sort_by(|a, b| key(b).abs().total_cmp(&key(a).abs()));
    items.truncate(n);
    items
}

pub fn top_n_by_magnitude(items: Vec<Ranked>, n: usize) -> Vec<Ranked> {
    top_n_by(items, n, |r| r.value)
}

pub fn rank_industries(table: &IndustryTable, metric: Metric, n: usize) -> Vec<Ranked> {
    let items = table
        .iter()
        .map(|s| Ranked {
            name: s.industry.clone(),
            value: match metric {
                Metric::Sum => s.sum,
                Metric::Mean => round_to(s.mean, 4),
            },
        })
        .collect();
    top_n_by_magnitude(items, n)
}

/// Returned by extremum selection when there is nothing to select from.
pub fn no_data_record() -> ImpactRecord {
    ImpactRecord {
        text: "No data available".to_string(),
        timestamp: String::new(),
        industry: NO_DATA_INDUSTRY.to_string(),
        score: 0.0,
        impact_type: None,
        thematic_category: None,
        relevance: None,
        event_id: None,
    }
}

/// Record with the highest raw score; first encountered wins ties.
pub fn max_by_score(records: &[ImpactRecord]) -> Option<&ImpactRecord> {
    select_first(records, |cand, best| cand.score > best.score)
}

/// Record with the lowest raw score; first encountered wins ties.
pub fn min_by_score(records: &[ImpactRecord]) -> Option<&ImpactRecord> {
    select_first(records, |cand, best| cand.score < best.score)
}

/// "Top opportunity" and "top risk" cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extremes {
    pub top_opportunity: ImpactRecord,
    pub top_risk: ImpactRecord,
}

pub fn extremes(records: &[ImpactRecord]) -> Extremes {
    Extremes {
        top_opportunity: max_by_score(records).cloned().unwrap_or_else(no_data_record),
        top_risk: min_by_score(records).cloned().unwrap_or_else(no_data_record),
    }
}

/// The record with the largest `abs(score)`; first encountered wins ties.
pub fn top_impact(records: &[ImpactRecord]) -> Option<&ImpactRecord> {
    select_first(records, |cand, best| cand.score.abs() > best.score.abs())
}

/// One record standing for `event` in one-impact-per-event views.
pub fn top_impact_of(normalizer: &Normalizer, event: &RawEvent, fallback_ts: &str) -> ImpactRecord {
    let mut recs = normalizer.normalize_event(event, fallback_ts);
    let idx = top_impact(&recs)
        .and_then(|best| recs.iter().position(|r| std::ptr::eq(r, best)))
        .unwrap_or(0);
    // normalize_event never returns an empty list for a single event
    recs.swap_remove(idx)
}

/// The `k` largest-magnitude records of one event, ties in source order.
pub fn top_k_impacts(
    normalizer: &Normalizer,
    event: &RawEvent,
    fallback_ts: &str,
    k: usize,
) -> Vec<ImpactRecord> {
    top_n_by(normalizer.normalize_event(event, fallback_ts), k, |r| r.score)
}

fn select_first<F>(records: &[ImpactRecord], better: F) -> Option<&ImpactRecord>
where
    F: Fn(&ImpactRecord, &ImpactRecord) -> bool,
{
    let mut it = records.iter();
    let mut best = it.next()?;
    for r in it {
        if better(r, best) {
            best = r;
        }
    }
    Some(best)
}
