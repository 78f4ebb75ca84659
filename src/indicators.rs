//! # Derived indicators
//! Typed pass-through for the three summary documents the upstream pipeline
//! precomputes (national activity, operational environment,
//! risk/opportunity). Nothing here is recomputed; the filters only select.
//!
//! Parsing is lenient: missing fields default, mistyped scalars become
//! `None`, unparseable list items are skipped, unknown keys land in `extra`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::LoadError;
use crate::ingest::types::Resource;

/// Score above which an insight counts as a risk / an opportunity.
pub const SIGNAL_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NationalActivityReport {
    #[serde(default, deserialize_with = "lenient_string")]
    pub generated_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_indicators: u64,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub indicators: Vec<NationalIndicator>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NationalIndicator {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub headline: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub thematic_category: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub top_industries_affected: Vec<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub impact_score: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationalEnvironmentReport {
    #[serde(default, deserialize_with = "lenient_string")]
    pub generated_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_indicators: u64,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub indicators: Vec<OperationalIndicator>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationalIndicator {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub signal: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub thematic_category: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub affected_industries_count: u64,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub top_affected_industries: Vec<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub overall_impact: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskOpportunityReport {
    #[serde(default, deserialize_with = "lenient_string")]
    pub generated_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_insights: u64,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub insights: Vec<RiskOpportunityInsight>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskOpportunityInsight {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub headline: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub thematic_category: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub risk_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub risk_category: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub risk_explanation: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub opportunity_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub opportunity_category: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub opportunity_explanation: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub top_affected_industries: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Selection applied by the risk/opportunity view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightFilter {
    #[default]
    All,
    Risks,
    Opportunities,
}

impl RiskOpportunityReport {
    pub fn risks(&self) -> impl Iterator<Item = &RiskOpportunityInsight> {
        self.insights
            .iter()
            .filter(|i| i.risk_score.unwrap_or(0.0) > SIGNAL_THRESHOLD)
    }

    pub fn opportunities(&self) -> impl Iterator<Item = &RiskOpportunityInsight> {
        self.insights
            .iter()
            .filter(|i| i.opportunity_score.unwrap_or(0.0) > SIGNAL_THRESHOLD)
    }

    pub fn filtered(&self, filter: InsightFilter) -> Vec<&RiskOpportunityInsight> {
        match filter {
            InsightFilter::All => self.insights.iter().collect(),
            InsightFilter::Risks => self.risks().collect(),
            InsightFilter::Opportunities => self.opportunities().collect(),
        }
    }

    pub fn high_risk_count(&self) -> usize {
        self.insights
            .iter()
            .filter(|i| i.risk_category.as_deref() == Some("High Risk"))
            .count()
    }

    pub fn high_opportunity_count(&self) -> usize {
        self.insights
            .iter()
            .filter(|i| i.opportunity_category.as_deref() == Some("High Opportunity"))
            .count()
    }
}

/// Indicator documents of one dataset; each is absent if its fetch failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Indicators {
    pub national: Option<NationalActivityReport>,
    pub operational: Option<OperationalEnvironmentReport>,
    pub risk_opportunity: Option<RiskOpportunityReport>,
}

/// Whole-document parse; invalid JSON is a load-level error.
pub fn parse_report<T: DeserializeOwned>(resource: Resource, raw: &str) -> Result<T, LoadError> {
    serde_json::from_str(raw).map_err(|source| LoadError::Parse { resource, source })
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|f: &f64| f.is_finite()))
}

fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

fn lenient_strings<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_vec<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect(),
        _ => Vec::new(),
    })
}
