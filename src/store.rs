//! store.rs: the single in-memory dataset shared by all views.
//!
//! Reloads may overlap. Each one takes a sequence number when it is
//! triggered, and a completion is applied only if its number is newer than
//! the last applied dataset. A failed reload never clears a loaded dataset;
//! only a failure before the first success is surfaced as `Failed`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Serialize;

use crate::error::LoadError;
use crate::indicators::Indicators;
use crate::ingest::LiveDocument;
use crate::model::{RawEvent, Snapshot, Timestamp};

/// Everything one successful reload produced.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub seq: u64,
    pub loaded_at: DateTime<Utc>,
    pub live_run_timestamp: Option<Timestamp>,
    pub live_events: Vec<RawEvent>,
    pub snapshots: Vec<Snapshot>,
    pub indicators: Indicators,
}

impl Dataset {
    pub fn new(seq: u64, live: LiveDocument, snapshots: Vec<Snapshot>, indicators: Indicators) -> Self {
        Self {
            seq,
            loaded_at: Utc::now(),
            live_run_timestamp: live.run_timestamp,
            live_events: live.events,
            snapshots,
            indicators,
        }
    }

    /// Records the history expands to, without materializing them.
    pub fn history_records_len(&self) -> usize {
        self.snapshots
            .iter()
            .flat_map(|s| s.events.iter())
            .map(|e| e.shape.cardinality())
            .sum()
    }
}

#[derive(Debug, Clone)]
pub enum LoadState {
    Loading,
    Ready(Arc<Dataset>),
    /// First load failed; nothing to show yet.
    Failed(String),
}

/// Reserved when a reload is triggered; carried to its completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReloadTicket(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// A newer dataset was already applied; this completion was dropped.
    Stale,
    /// Reload failed; the previous dataset stays in place.
    KeptPrevious,
    /// Reload failed and there is no previous dataset.
    FirstLoadFailed,
}

#[derive(Debug)]
struct Inner {
    state: LoadState,
    last_applied: u64,
    last_error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DatasetStore {
    inner: Arc<RwLock<Inner>>,
    next_seq: Arc<AtomicU64>,
}

impl Default for DatasetStore {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreStatus {
    pub state: &'static str,
    pub seq: u64,
    pub loaded_at: Option<DateTime<Utc>>,
    pub live_events: usize,
    pub snapshots: usize,
    pub last_error: Option<String>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                state: LoadState::Loading,
                last_applied: 0,
                last_error: None,
            })),
            next_seq: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Reserve the next sequence number for a reload about to start.
    pub fn begin(&self) -> ReloadTicket {
        ReloadTicket(self.next_seq.fetch_add(1, Ordering::SeqCst))
    }

    pub fn complete(&self, ticket: ReloadTicket, result: Result<Dataset, LoadError>) -> ApplyOutcome {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());

        if ticket.0 <= inner.last_applied {
            counter!("reload_stale_discarded_total").increment(1);
            tracing::debug!(target: "ingest", seq = ticket.0, applied = inner.last_applied, "discarding stale reload");
            return ApplyOutcome::Stale;
        }

        match result {
            Ok(mut dataset) => {
                dataset.seq = ticket.0;
                crate::ingest::record_dataset_gauges(&dataset);
                inner.state = LoadState::Ready(Arc::new(dataset));
                inner.last_applied = ticket.0;
                inner.last_error = None;
                ApplyOutcome::Applied
            }
            Err(e) => {
                counter!("reload_failures_total").increment(1);
                let msg = e.to_string();
                inner.last_error = Some(msg.clone());
                if matches!(inner.state, LoadState::Ready(_)) {
                    tracing::warn!(target: "ingest", seq = ticket.0, error = %msg, "reload failed; keeping previous dataset");
                    ApplyOutcome::KeptPrevious
                } else {
                    tracing::error!(target: "ingest", seq = ticket.0, error = %msg, "initial load failed");
                    inner.state = LoadState::Failed(msg);
                    ApplyOutcome::FirstLoadFailed
                }
            }
        }
    }

    pub fn state(&self) -> LoadState {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .state
            .clone()
    }

    /// The applied dataset, if any.
    pub fn current(&self) -> Option<Arc<Dataset>> {
        match self.state() {
            LoadState::Ready(d) => Some(d),
            LoadState::Loading | LoadState::Failed(_) => None,
        }
    }

    pub fn status(&self) -> StoreStatus {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let (state, ds) = match &inner.state {
            LoadState::Loading => ("loading", None),
            LoadState::Ready(d) => ("ready", Some(d)),
            LoadState::Failed(_) => ("failed", None),
        };
        StoreStatus {
            state,
            seq: inner.last_applied,
            loaded_at: ds.map(|d| d.loaded_at),
            live_events: ds.map(|d| d.live_events.len()).unwrap_or(0),
            snapshots: ds.map(|d| d.snapshots.len()).unwrap_or(0),
            last_error: inner.last_error.clone(),
        }
    }
}
