// src/config/mod.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ranking::{CHART_TOP_N, HOME_TOP_N};
use crate::taxonomy::DEFAULT_INDUSTRY;
use crate::window::DEFAULT_RANGE;

pub const ENV_CONFIG_PATH: &str = "MONITOR_CONFIG_PATH";
pub const ENV_BASE_URL: &str = "MONITOR_BASE_URL";
pub const ENV_REFRESH_SECS: &str = "MONITOR_REFRESH_SECS";
pub const ENV_METRICS: &str = "MONITOR_METRICS";

pub const DEFAULT_REFRESH_SECS: u64 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}
fn default_live_path() -> String {
    "/output/live_output.json".to_string()
}
fn default_history_path() -> String {
    "/history/hourly_history.jsonl".to_string()
}
fn default_national_path() -> String {
    "/output/national_activity_indicators.json".to_string()
}
fn default_operational_path() -> String {
    "/output/operational_environment_indicators.json".to_string()
}
fn default_risk_opportunity_path() -> String {
    "/output/risk_opportunity_insights.json".to_string()
}
fn default_refresh_secs() -> u64 {
    DEFAULT_REFRESH_SECS
}
fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
fn default_industry() -> String {
    DEFAULT_INDUSTRY.to_string()
}
fn default_home_top_n() -> usize {
    HOME_TOP_N
}
fn default_chart_top_n() -> usize {
    CHART_TOP_N
}
fn default_trend_limit() -> usize {
    DEFAULT_RANGE
}
fn default_analysis_points() -> usize {
    50
}
fn default_analysis_top_news() -> usize {
    5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Origin of the upstream file server, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_live_path")]
    pub live_path: String,
    #[serde(default = "default_history_path")]
    pub history_path: String,
    #[serde(default = "default_national_path")]
    pub national_path: String,
    #[serde(default = "default_operational_path")]
    pub operational_path: String,
    #[serde(default = "default_risk_opportunity_path")]
    pub risk_opportunity_path: String,

    #[serde(default = "default_refresh_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// The one label every view uses for unresolved industries.
    #[serde(default = "default_industry")]
    pub default_industry: String,
    #[serde(default = "default_home_top_n")]
    pub home_top_n: usize,
    #[serde(default = "default_chart_top_n")]
    pub chart_top_n: usize,
    #[serde(default = "default_trend_limit")]
    pub trend_limit: usize,
    #[serde(default = "default_analysis_points")]
    pub analysis_points: usize,
    #[serde(default = "default_analysis_top_news")]
    pub analysis_top_news: usize,

    #[serde(default)]
    pub metrics_enabled: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            live_path: default_live_path(),
            history_path: default_history_path(),
            national_path: default_national_path(),
            operational_path: default_operational_path(),
            risk_opportunity_path: default_risk_opportunity_path(),
            refresh_interval_secs: DEFAULT_REFRESH_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            default_industry: default_industry(),
            home_top_n: HOME_TOP_N,
            chart_top_n: CHART_TOP_N,
            trend_limit: DEFAULT_RANGE,
            analysis_points: default_analysis_points(),
            analysis_top_news: default_analysis_top_news(),
            metrics_enabled: false,
        }
    }
}

impl MonitorConfig {
    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading monitor config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = parse_config(&content, ext.as_str())
            .with_context(|| format!("parsing monitor config {}", path.display()))?;
        Ok(cfg.sanitized())
    }

    /// Load using env var + fallbacks, then apply env overrides:
    /// 1) $MONITOR_CONFIG_PATH
    /// 2) config/monitor.toml
    /// 3) config/monitor.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        let base = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let toml_p = PathBuf::from("config/monitor.toml");
            let json_p = PathBuf::from("config/monitor.json");
            if toml_p.exists() {
                Self::load_from(&toml_p)?
            } else if json_p.exists() {
                Self::load_from(&json_p)?
            } else {
                Self::default()
            }
        };
        base.with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            if !url.trim().is_empty() {
                self.base_url = url;
            }
        }
        if let Ok(raw) = std::env::var(ENV_REFRESH_SECS) {
            self.refresh_interval_secs = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_REFRESH_SECS} must be an integer, got {raw:?}"))?;
        }
        if let Ok(raw) = std::env::var(ENV_METRICS) {
            self.metrics_enabled = matches!(raw.trim(), "1" | "true" | "yes");
        }
        Ok(self.sanitized())
    }

    /// Replace unusable values with defaults.
    pub fn sanitized(mut self) -> Self {
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
        if self.base_url.is_empty() {
            self.base_url = default_base_url();
        }
        if self.refresh_interval_secs == 0 {
            self.refresh_interval_secs = DEFAULT_REFRESH_SECS;
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = DEFAULT_REQUEST_TIMEOUT_SECS;
        }
        if self.default_industry.trim().is_empty() {
            self.default_industry = default_industry();
        }
        if self.home_top_n == 0 {
            self.home_top_n = HOME_TOP_N;
        }
        if self.chart_top_n == 0 {
            self.chart_top_n = CHART_TOP_N;
        }
        if self.trend_limit == 0 {
            self.trend_limit = DEFAULT_RANGE;
        }
        if self.analysis_points == 0 {
            self.analysis_points = default_analysis_points();
        }
        if self.analysis_top_news == 0 {
            self.analysis_top_news = default_analysis_top_news();
        }
        self
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<MonitorConfig> {
    match hint_ext {
        "toml" => Ok(toml::from_str(s)?),
        "json" => Ok(serde_json::from_str(s)?),
        _ => {
            if let Ok(v) = toml::from_str(s) {
                return Ok(v);
            }
            if let Ok(v) = serde_json::from_str(s) {
                return Ok(v);
            }
            bail!("unsupported monitor config format")
        }
    }
}
