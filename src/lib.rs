// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod error;
pub mod indicators;
pub mod ingest;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod ranking;
pub mod store;
pub mod taxonomy;
pub mod views;
pub mod window;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, router, AppState};
pub use crate::config::MonitorConfig;
pub use crate::error::LoadError;
pub use crate::model::{EventShape, ImpactRecord, ImpactType, RawEvent, Snapshot};
pub use crate::normalize::{normalize, Normalizer};
pub use crate::store::{ApplyOutcome, DatasetStore, LoadState};
