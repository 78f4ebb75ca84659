// src/ingest/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::ingest::fetch_dataset;
use crate::ingest::types::FeedSource;
use crate::store::{ApplyOutcome, DatasetStore, ReloadTicket};

/// What asked for a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadTrigger {
    Timer,
    /// Upstream broadcast ("files changed").
    Broadcast,
    /// Manual refresh.
    User,
}

impl ReloadTrigger {
    pub fn label(self) -> &'static str {
        match self {
            ReloadTrigger::Timer => "timer",
            ReloadTrigger::Broadcast => "broadcast",
            ReloadTrigger::User => "user",
        }
    }
}

/// Triggers waiting to be picked up. Requests beyond this are folded into
/// the reloads already queued.
pub const TRIGGER_QUEUE: usize = 4;
/// Reloads allowed to run at the same time.
pub const MAX_IN_FLIGHT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Queued,
    /// The queue is full; a reload already waiting will pick up fresh data.
    Coalesced,
    /// The scheduler has stopped.
    Stopped,
}

/// Cheap handle for asking the scheduler to reload.
#[derive(Debug, Clone)]
pub struct ReloadHandle {
    tx: mpsc::Sender<ReloadTrigger>,
}

impl ReloadHandle {
    pub fn request(&self, trigger: ReloadTrigger) -> RequestOutcome {
        match self.tx.try_send(trigger) {
            Ok(()) => RequestOutcome::Queued,
            Err(TrySendError::Full(_)) => {
                counter!("reload_requests_coalesced_total", "trigger" => trigger.label()).increment(1);
                RequestOutcome::Coalesced
            }
            Err(TrySendError::Closed(_)) => RequestOutcome::Stopped,
        }
    }

    /// A handle whose requests go nowhere, for routers built without a
    /// running scheduler.
    pub fn detached() -> Self {
        let (tx, _rx) = mpsc::channel(1);
        Self { tx }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ReloadSchedulerCfg {
    pub interval_secs: u64,
}

/// Fetch once and hand the result to the store under `ticket`.
pub async fn reload_once(
    feed: &dyn FeedSource,
    store: &DatasetStore,
    ticket: ReloadTicket,
    trigger: ReloadTrigger,
) -> ApplyOutcome {
    counter!("reload_runs_total", "trigger" => trigger.label()).increment(1);
    let result = fetch_dataset(feed, ticket.0).await;
    let outcome = store.complete(ticket, result);
    tracing::info!(
        target: "ingest",
        seq = ticket.0,
        trigger = trigger.label(),
        outcome = ?outcome,
        "reload finished"
    );
    outcome
}

/// Spawn the reload loop. The first timer tick fires immediately and
/// performs the initial load. Every trigger reserves its ticket when it is
/// picked up and runs in its own task, so up to [`MAX_IN_FLIGHT`] reloads
/// may overlap; the store keeps whichever was triggered last.
pub fn spawn_reload_scheduler(
    cfg: ReloadSchedulerCfg,
    feed: Arc<dyn FeedSource>,
    store: DatasetStore,
) -> (ReloadHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<ReloadTrigger>(TRIGGER_QUEUE);
    let handle = ReloadHandle { tx };
    let permits = Arc::new(Semaphore::new(MAX_IN_FLIGHT));

    let join = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(cfg.interval_secs.max(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            let trigger = tokio::select! {
                _ = ticker.tick() => ReloadTrigger::Timer,
                msg = rx.recv() => match msg {
                    Some(t) => t,
                    None => break,
                },
            };

            // while every slot is busy, new requests pile up in the queue and coalesce
            let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                break;
            };
            let ticket = store.begin();
            let feed = Arc::clone(&feed);
            let store = store.clone();
            tracing::debug!(target: "ingest", seq = ticket.0, trigger = trigger.label(), "reload triggered");
            tokio::spawn(async move {
                let _permit = permit;
                reload_once(feed.as_ref(), &store, ticket, trigger).await;
            });
        }
        tracing::info!(target: "ingest", "reload scheduler stopped");
    });

    (handle, join)
}
