// src/ingest/config.rs
use std::collections::HashMap;
use std::time::Duration;

use crate::config::MonitorConfig;
use crate::ingest::types::Resource;

/// Where each upstream resource lives, resolved against one base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEndpoints {
    urls: HashMap<Resource, String>,
    pub timeout: Duration,
}

impl FeedEndpoints {
    pub fn from_config(cfg: &MonitorConfig) -> Self {
        let base = cfg.base_url.trim_end_matches('/');
        let urls = [
            (Resource::LiveOutput, &cfg.live_path),
            (Resource::History, &cfg.history_path),
            (Resource::NationalActivity, &cfg.national_path),
            (Resource::OperationalEnvironment, &cfg.operational_path),
            (Resource::RiskOpportunity, &cfg.risk_opportunity_path),
        ]
        .into_iter()
        .map(|(r, path)| (r, join_url(base, path)))
        .collect();

        Self {
            urls,
            timeout: Duration::from_secs(cfg.request_timeout_secs),
        }
    }

    pub fn url(&self, resource: Resource) -> Option<&str> {
        self.urls.get(&resource).map(String::as_str)
    }

    /// URL to request right now; history gets a fresh `t=<millis>` query.
    pub fn request_url(&self, resource: Resource, now_ms: i64) -> Option<String> {
        let url = self.url(resource)?;
        if !resource.cache_busting() {
            return Some(url.to_string());
        }
        let sep = if url.contains('?') { '&' } else { '?' };
        Some(format!("{url}{sep}t={now_ms}"))
    }
}

fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!("{base}/{}", path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_join_base_with_single_slash() {
        let cfg = MonitorConfig {
            base_url: "http://feeds.local".into(),
            live_path: "output/live.json".into(),
            ..MonitorConfig::default()
        };
        let ep = FeedEndpoints::from_config(&cfg);
        assert_eq!(ep.url(Resource::LiveOutput), Some("http://feeds.local/output/live.json"));
        assert_eq!(
            ep.url(Resource::History),
            Some("http://feeds.local/history/hourly_history.jsonl")
        );
    }

    #[test]
    fn absolute_paths_are_kept() {
        let cfg = MonitorConfig {
            national_path: "https://cdn.example/n.json".into(),
            ..MonitorConfig::default()
        };
        let ep = FeedEndpoints::from_config(&cfg);
        assert_eq!(ep.url(Resource::NationalActivity), Some("https://cdn.example/n.json"));
    }

    #[test]
    fn only_history_is_cache_busted() {
        let ep = FeedEndpoints::from_config(&MonitorConfig::default());
        let h = ep.request_url(Resource::History, 1234).unwrap();
        assert!(h.ends_with("hourly_history.jsonl?t=1234"));
        let l = ep.request_url(Resource::LiveOutput, 1234).unwrap();
        assert!(!l.contains("t=1234"));
    }
}
