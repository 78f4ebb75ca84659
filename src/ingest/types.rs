// src/ingest/types.rs
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Upstream documents polled on each reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    LiveOutput,
    History,
    NationalActivity,
    OperationalEnvironment,
    RiskOpportunity,
}

impl Resource {
    pub const INDICATORS: [Resource; 3] = [
        Resource::NationalActivity,
        Resource::OperationalEnvironment,
        Resource::RiskOpportunity,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Resource::LiveOutput => "live_output",
            Resource::History => "history",
            Resource::NationalActivity => "national_activity",
            Resource::OperationalEnvironment => "operational_environment",
            Resource::RiskOpportunity => "risk_opportunity",
        }
    }

    /// History is appended to hourly and must bypass caches on every fetch.
    pub fn cache_busting(self) -> bool {
        matches!(self, Resource::History)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fetches the raw text of one upstream resource. One attempt, no retries.
#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, resource: Resource) -> Result<String, LoadError>;
    fn name(&self) -> &'static str;
}
