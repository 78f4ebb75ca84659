//! # Views
//! Pure functions mapping a loaded dataset to the structures each dashboard
//! view renders. No I/O; every view picks one [`Normalizer`] and therefore
//! one default-industry label.

use serde::Serialize;

use crate::aggregate::aggregate;
use crate::model::{parse_timestamp, ImpactRecord, ImpactType, RawEvent, Snapshot, Timestamp};
use crate::normalize::Normalizer;
use crate::ranking::{self, Extremes, Metric, Ranked};
use crate::taxonomy::INDUSTRIES;
use crate::window::{industries_in, windowed_series_with, SeriesPoint, RANGE_PRESETS};

/// Event text longer than this is cut in the events table.
pub const TABLE_TEXT_CHARS: usize = 150;
/// Industries listed per row in the events table.
pub const TABLE_TOP_INDUSTRIES: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeSummary {
    pub run_timestamp: Option<Timestamp>,
    /// One row per live event: its highest-magnitude impact.
    pub rows: Vec<ImpactRecord>,
    pub average_score: f64,
    pub sentiment: &'static str,
    #[serde(flatten)]
    pub extremes: Extremes,
    /// Per-industry score sums, top-N by magnitude.
    pub industry_bars: Vec<Ranked>,
}

pub fn home_summary(
    normalizer: &Normalizer,
    live_events: &[RawEvent],
    run_timestamp: Option<&str>,
    top_n: usize,
) -> HomeSummary {
    let fallback_ts = run_timestamp.unwrap_or_default();
    let rows: Vec<ImpactRecord> = live_events
        .iter()
        .map(|ev| {
            let mut r = ranking::top_impact_of(normalizer, ev, fallback_ts);
            r.impact_type.get_or_insert(ImpactType::Neutral);
            r
        })
        .collect();

    let average_score = if rows.is_empty() {
        0.0
    } else {
        rows.iter().map(|r| r.score).sum::<f64>() / rows.len() as f64
    };
    let sentiment = if average_score > 0.0 {
        "Positive"
    } else if average_score < 0.0 {
        "Negative"
    } else {
        "Neutral"
    };

    let industry_bars = ranking::rank_industries(&aggregate(&rows), Metric::Sum, top_n);

    HomeSummary {
        run_timestamp: run_timestamp.map(str::to_string),
        extremes: ranking::extremes(&rows),
        average_score,
        sentiment,
        industry_bars,
        rows,
    }
}

/// Mean impact per industry over every record of the live events.
pub fn industry_chart(
    normalizer: &Normalizer,
    live_events: &[RawEvent],
    run_timestamp: Option<&str>,
    top_n: usize,
) -> Vec<Ranked> {
    let records = normalizer.normalize_events(live_events, run_timestamp.unwrap_or_default());
    ranking::rank_industries(&aggregate(&records), Metric::Mean, top_n)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRow {
    pub id: Option<String>,
    pub time: Timestamp,
    /// e.g. `"Tea (0.800), Rubber (-0.120)"`.
    pub industries: String,
    pub text: String,
    pub score: f64,
}

/// Live events ordered by `abs(score)`, ties in source order.
pub fn events_table(
    normalizer: &Normalizer,
    live_events: &[RawEvent],
    run_timestamp: Option<&str>,
) -> Vec<EventRow> {
    let fallback_ts = run_timestamp.unwrap_or_default();
    let rows: Vec<EventRow> = live_events
        .iter()
        .map(|ev| {
            let top = ranking::top_k_impacts(normalizer, ev, fallback_ts, TABLE_TOP_INDUSTRIES);
            let industries = top
                .iter()
                .map(|r| format!("{} ({:.3})", r.industry, r.score))
                .collect::<Vec<_>>()
                .join(", ");
            let score = ev
                .opportunity_score
                .or_else(|| top.first().map(|r| r.score))
                .unwrap_or(0.0);
            EventRow {
                id: ev.id.clone(),
                time: ev.timestamp.clone().unwrap_or_else(|| fallback_ts.to_string()),
                industries,
                text: truncate_chars(&ev.text, TABLE_TEXT_CHARS),
                score,
            }
        })
        .collect();
    ranking::top_n_by(rows, usize::MAX, |r: &EventRow| r.score)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisPoint {
    pub timestamp: Timestamp,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisView {
    pub industry: String,
    pub industries: Vec<&'static str>,
    /// Chronological, at most `points` long.
    pub points: Vec<AnalysisPoint>,
    /// Newest first.
    pub top_news: Vec<ImpactRecord>,
}

/// Drill-down for one industry over the whole history. Without a selection
/// the first taxonomy industry is shown.
pub fn analysis_view(
    normalizer: &Normalizer,
    snapshots: &[Snapshot],
    industry: Option<&str>,
    points: usize,
    top_news: usize,
) -> AnalysisView {
    let selected = industry
        .filter(|s| !s.trim().is_empty())
        .or_else(|| INDUSTRIES.first().copied())
        .unwrap_or(normalizer.default_industry())
        .to_string();

    // an unparseable stamp sorts with the last parseable one before it,
    // so it keeps its place in history order
    let mut last = None;
    let mut keyed: Vec<_> = normalizer
        .normalize_all(snapshots)
        .into_iter()
        .filter(|r| r.industry == selected)
        .map(|r| {
            if let Some(ts) = parse_timestamp(&r.timestamp) {
                last = Some(ts);
            }
            (last, r)
        })
        .collect();
    keyed.sort_by_key(|(key, _)| *key);
    let records: Vec<ImpactRecord> = keyed.into_iter().map(|(_, r)| r).collect();

    let start = records.len().saturating_sub(points);
    let chart = records[start..]
        .iter()
        .map(|r| AnalysisPoint {
            timestamp: r.timestamp.clone(),
            score: r.score,
        })
        .collect();

    let newest: Vec<ImpactRecord> = records.into_iter().rev().take(top_news).collect();

    AnalysisView {
        industry: selected,
        industries: INDUSTRIES.to_vec(),
        points: chart,
        top_news: newest,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendView {
    pub industry: Option<String>,
    /// Window applied to `series`, at least 1.
    pub limit: usize,
    /// Range selector options.
    pub ranges: Vec<usize>,
    pub industries: Vec<String>,
    /// Empty until an industry is selected.
    pub series: Vec<SeriesPoint>,
}

pub fn trend_view(
    normalizer: &Normalizer,
    snapshots: &[Snapshot],
    industry: Option<&str>,
    limit: usize,
) -> TrendView {
    let industry = industry.filter(|s| !s.trim().is_empty());
    let limit = limit.max(1);
    TrendView {
        industry: industry.map(str::to_string),
        limit,
        ranges: RANGE_PRESETS.to_vec(),
        industries: industries_in(normalizer, snapshots),
        series: industry
            .map(|ind| windowed_series_with(normalizer, snapshots, ind, limit))
            .unwrap_or_default(),
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let mut out: String = s.chars().take(max).collect();
        out.push('…');
        out
    } else {
        s.to_string()
    }
}
