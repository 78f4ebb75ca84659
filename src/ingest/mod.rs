// src/ingest/mod.rs
pub mod config;
pub mod providers;
pub mod scheduler;
pub mod types;

use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::error::LoadError;
use crate::indicators::{parse_report, Indicators};
use crate::ingest::types::{FeedSource, Resource};
use crate::model::{parse_timestamp, RawEvent, Snapshot, Timestamp};
use crate::store::Dataset;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("snapshot_lines_total", "Non-empty history lines read.");
        describe_counter!(
            "snapshot_lines_dropped_total",
            "History lines dropped because they did not parse to a snapshot."
        );
        describe_counter!("reload_runs_total", "Reloads started, by trigger.");
        describe_counter!(
            "reload_requests_coalesced_total",
            "Reload requests folded into pending ones because the queue was full."
        );
        describe_counter!("reload_failures_total", "Reloads that failed to load.");
        describe_counter!(
            "reload_stale_discarded_total",
            "Reload completions discarded because a newer one was applied."
        );
        describe_counter!(
            "indicator_fetch_errors_total",
            "Indicator documents that could not be fetched or parsed."
        );
        describe_counter!("feed_http_errors_total", "Feed GETs that failed or returned non-2xx.");
        describe_histogram!("reload_duration_ms", "Fetch + parse time per reload in ms.");
        describe_gauge!(
            "dataset_last_loaded_ts",
            "Unix ts of the last applied dataset."
        );
        describe_gauge!("dataset_records", "History records in the applied dataset.");
    });
}

/// Parse newline-delimited snapshots, dropping lines that do not parse.
pub fn load_snapshots(raw: &str) -> Vec<Snapshot> {
    load_snapshots_with_stats(raw).0
}

/// Like [`load_snapshots`], also returning how many lines were dropped.
pub fn load_snapshots_with_stats(raw: &str) -> (Vec<Snapshot>, usize) {
    let mut out = Vec::new();
    let mut dropped = 0usize;

    for (lineno, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line)
            .ok()
            .and_then(|v| Snapshot::from_value(&v))
        {
            Some(s) => out.push(s),
            None => {
                dropped += 1;
                tracing::debug!(target: "ingest", line = lineno + 1, "dropping unparseable snapshot line");
            }
        }
    }

    counter!("snapshot_lines_total").increment((out.len() + dropped) as u64);
    counter!("snapshot_lines_dropped_total").increment(dropped as u64);
    (out, dropped)
}

/// True when every pair of parseable `run_timestamp`s is in non-decreasing order.
pub fn is_chronological(snapshots: &[Snapshot]) -> bool {
    let stamps: Vec<_> = snapshots
        .iter()
        .filter_map(|s| parse_timestamp(&s.run_timestamp))
        .collect();
    stamps.windows(2).all(|w| w[0] <= w[1])
}

/// The `live_output` resource after parsing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveDocument {
    pub run_timestamp: Option<Timestamp>,
    pub events: Vec<RawEvent>,
}

/// Accepts a bare event list or `{ run_timestamp?, events: [...] }`.
/// Any other valid JSON yields no events; invalid JSON is an error.
pub fn parse_live_document(raw: &str) -> Result<LiveDocument, LoadError> {
    let v: Value = serde_json::from_str(raw).map_err(|source| LoadError::Parse {
        resource: Resource::LiveOutput,
        source,
    })?;

    let doc = match &v {
        Value::Array(list) => LiveDocument {
            run_timestamp: None,
            events: list.iter().map(RawEvent::from_value).collect(),
        },
        Value::Object(_) => {
            let snap = Snapshot::from_value(&v).unwrap_or_else(|| Snapshot {
                snapshot_id: None,
                run_timestamp: String::new(),
                events: Vec::new(),
            });
            LiveDocument {
                run_timestamp: Some(snap.run_timestamp).filter(|t| !t.is_empty()),
                events: snap.events,
            }
        }
        _ => LiveDocument::default(),
    };
    Ok(doc)
}

/// Fetch every resource once and assemble a dataset.
///
/// Live output and history are required; indicator documents are best-effort
/// and simply absent from the dataset when they fail.
pub async fn fetch_dataset(feed: &dyn FeedSource, seq: u64) -> Result<Dataset, LoadError> {
    ensure_metrics_described();
    let t0 = Instant::now();

    let live_raw = feed.fetch(Resource::LiveOutput).await?;
    let live = parse_live_document(&live_raw)?;

    let history_raw = feed.fetch(Resource::History).await?;
    let (snapshots, dropped) = load_snapshots_with_stats(&history_raw);
    if !is_chronological(&snapshots) {
        tracing::warn!(target: "ingest", "history is not in chronological order; windows follow file order");
    }

    let mut indicators = Indicators::default();
    for resource in Resource::INDICATORS {
        let parsed = match feed.fetch(resource).await {
            Ok(raw) => store_indicator(&mut indicators, resource, &raw),
            Err(e) => Err(e),
        };
        if let Err(e) = parsed {
            tracing::warn!(target: "ingest", resource = %e.resource(), error = %e, feed = feed.name(), "indicator unavailable");
            counter!("indicator_fetch_errors_total").increment(1);
        }
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("reload_duration_ms").record(ms);

    tracing::info!(
        target: "ingest",
        seq,
        live_events = live.events.len(),
        snapshots = snapshots.len(),
        dropped,
        "dataset fetched"
    );

    Ok(Dataset::new(seq, live, snapshots, indicators))
}

fn store_indicator(into: &mut Indicators, resource: Resource, raw: &str) -> Result<(), LoadError> {
    match resource {
        Resource::NationalActivity => into.national = Some(parse_report(resource, raw)?),
        Resource::OperationalEnvironment => into.operational = Some(parse_report(resource, raw)?),
        Resource::RiskOpportunity => into.risk_opportunity = Some(parse_report(resource, raw)?),
        Resource::LiveOutput | Resource::History => {}
    }
    Ok(())
}

pub(crate) fn record_dataset_gauges(dataset: &Dataset) {
    gauge!("dataset_last_loaded_ts").set(dataset.loaded_at.timestamp() as f64);
    gauge!("dataset_records").set(dataset.history_records_len() as f64);
}
