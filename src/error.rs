//! Load-level failures. Everything finer-grained (bad lines, bad fields)
//! degrades to defaults and never reaches this type.

use thiserror::Error;

use crate::ingest::types::Resource;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("transport error fetching {resource}: {message}")]
    Transport { resource: Resource, message: String },

    #[error("{resource} responded with HTTP {status}")]
    Status { resource: Resource, status: u16 },

    #[error("{resource} is not valid JSON: {source}")]
    Parse {
        resource: Resource,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    pub fn resource(&self) -> Resource {
        match self {
            LoadError::Transport { resource, .. }
            | LoadError::Status { resource, .. }
            | LoadError::Parse { resource, .. } => *resource,
        }
    }

    /// Transport and status failures, as opposed to bad payloads.
    pub fn is_transport(&self) -> bool {
        matches!(self, LoadError::Transport { .. } | LoadError::Status { .. })
    }
}
