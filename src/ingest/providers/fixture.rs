use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::LoadError;
use crate::ingest::types::{FeedSource, Resource};

/// In-memory feed for tests and offline runs. Missing resources fail like
/// an unreachable server.
#[derive(Debug, Default)]
pub struct FixtureFeed {
    docs: RwLock<HashMap<Resource, String>>,
}

impl FixtureFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, resource: Resource, raw: impl Into<String>) -> Self {
        self.set(resource, raw);
        self
    }

    pub fn set(&self, resource: Resource, raw: impl Into<String>) {
        self.docs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(resource, raw.into());
    }

    pub fn remove(&self, resource: Resource) {
        self.docs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&resource);
    }
}

#[async_trait]
impl FeedSource for FixtureFeed {
    async fn fetch(&self, resource: Resource) -> Result<String, LoadError> {
        self.docs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&resource)
            .cloned()
            .ok_or_else(|| LoadError::Transport {
                resource,
                message: "fixture not set".to_string(),
            })
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
