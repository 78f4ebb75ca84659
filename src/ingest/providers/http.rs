use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;

use crate::error::LoadError;
use crate::ingest::config::FeedEndpoints;
use crate::ingest::types::{FeedSource, Resource};

/// Polls the upstream file server over HTTP. Each fetch is one GET.
pub struct HttpFeed {
    endpoints: FeedEndpoints,
    client: reqwest::Client,
}

impl HttpFeed {
    pub fn new(endpoints: FeedEndpoints) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(endpoints.timeout)
            .build()
            .context("building feed http client")?;
        Ok(Self { endpoints, client })
    }
}

#[async_trait]
impl FeedSource for HttpFeed {
    async fn fetch(&self, resource: Resource) -> Result<String, LoadError> {
        let now_ms = chrono::Utc::now().timestamp_millis();
        let url = self
            .endpoints
            .request_url(resource, now_ms)
            .ok_or_else(|| LoadError::Transport {
                resource,
                message: "no url configured".to_string(),
            })?;

        let resp = match self.client.get(&url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, %resource, "feed http error");
                counter!("feed_http_errors_total").increment(1);
                return Err(LoadError::Transport {
                    resource,
                    message: e.to_string(),
                });
            }
        };

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(target: "ingest", status = status.as_u16(), %resource, "feed http non-success status");
            counter!("feed_http_errors_total").increment(1);
            return Err(LoadError::Status {
                resource,
                status: status.as_u16(),
            });
        }

        resp.text().await.map_err(|e| LoadError::Transport {
            resource,
            message: e.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
