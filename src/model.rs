//! # Data model
//! Snapshots and raw events as delivered by the upstream pipeline, plus the
//! normalized [`ImpactRecord`].
//!
//! Raw JSON is read leniently: every field is optional and type mismatches
//! degrade to defaults instead of failing the event. The event's shape
//! (`impacts` list, `industry_impact` map, or legacy `category` +
//! `opportunity_score`) is decided once here, at parse time.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// ISO-8601 text as written by the pipeline (e.g. `2025-01-31T10:00:00Z`).
pub type Timestamp = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImpactType {
    Opportunity,
    Threat,
    Neutral,
}

impl ImpactType {
    /// Case-insensitive; anything unrecognised (e.g. "Weather Report") is `Neutral`.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "opportunity" => ImpactType::Opportunity,
            "threat" => ImpactType::Threat,
            _ => ImpactType::Neutral,
        }
    }
}

/// One entry of a multi-impact event's `impacts` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactEntry {
    /// `None` when missing or empty; resolved to the default label at normalization.
    pub industry: Option<String>,
    pub score: f64,
    pub impact_type: Option<ImpactType>,
    pub relevance: Option<f64>,
}

impl ImpactEntry {
    fn from_value(v: &Value) -> Self {
        match v.as_object() {
            Some(obj) => Self {
                industry: opt_string(obj.get("industry")),
                score: coerce_score(obj.get("score")),
                impact_type: obj
                    .get("impact_type")
                    .and_then(Value::as_str)
                    .map(ImpactType::parse),
                relevance: opt_f64(obj.get("relevance")),
            },
            None => Self {
                industry: None,
                score: 0.0,
                impact_type: None,
                relevance: None,
            },
        }
    }
}

/// Which expansion rule applies to an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum EventShape {
    /// Non-empty `impacts` list: one record per entry.
    MultiImpact { impacts: Vec<ImpactEntry> },
    /// Non-empty `industry_impact` map, in document key order: one record per key.
    Mapped { industry_impact: Vec<(String, f64)> },
    /// Everything else: exactly one record.
    Legacy {
        category: Option<String>,
        score: f64,
    },
}

impl EventShape {
    fn detect(obj: &Map<String, Value>) -> Self {
        if let Some(list) = obj.get("impacts").and_then(Value::as_array) {
            if !list.is_empty() {
                return EventShape::MultiImpact {
                    impacts: list.iter().map(ImpactEntry::from_value).collect(),
                };
            }
        }
        if let Some(map) = obj.get("industry_impact").and_then(Value::as_object) {
            if !map.is_empty() {
                return EventShape::Mapped {
                    industry_impact: map
                        .iter()
                        .map(|(k, v)| (k.clone(), coerce_score(Some(v))))
                        .collect(),
                };
            }
        }
        EventShape::Legacy {
            category: opt_string(obj.get("category")),
            score: coerce_score(obj.get("opportunity_score")),
        }
    }

    /// Number of records this shape expands to.
    pub fn cardinality(&self) -> usize {
        match self {
            EventShape::MultiImpact { impacts } => impacts.len(),
            EventShape::Mapped { industry_impact } => industry_impact.len(),
            EventShape::Legacy { .. } => 1,
        }
    }
}

/// A single detected news/signal item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct RawEvent {
    pub id: Option<String>,
    pub source: Option<String>,
    pub text: String,
    pub timestamp: Option<Timestamp>,
    pub thematic_category: Option<String>,
    /// Raw legacy score, kept even for multi-impact events (the events table shows it).
    pub opportunity_score: Option<f64>,
    pub shape: EventShape,
}

impl From<Value> for RawEvent {
    fn from(v: Value) -> Self {
        Self::from_value(&v)
    }
}

impl RawEvent {
    pub fn from_value(v: &Value) -> Self {
        let empty = Map::new();
        let obj = v.as_object().unwrap_or(&empty);
        Self {
            id: opt_string(obj.get("id")),
            source: opt_string(obj.get("source")),
            text: obj
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            timestamp: opt_string(obj.get("timestamp")),
            thematic_category: opt_string(obj.get("thematic_category")),
            opportunity_score: opt_f64(obj.get("opportunity_score")),
            shape: EventShape::detect(obj),
        }
    }
}

/// One ingestion unit: a timestamped batch of events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct Snapshot {
    pub snapshot_id: Option<String>,
    pub run_timestamp: Timestamp,
    pub events: Vec<RawEvent>,
}

impl Snapshot {
    /// `None` unless `v` is a JSON object. Absent or non-list `events` become empty.
    pub fn from_value(v: &Value) -> Option<Self> {
        let obj = v.as_object()?;
        let events = obj
            .get("events")
            .and_then(Value::as_array)
            .map(|list| list.iter().map(RawEvent::from_value).collect())
            .unwrap_or_default();
        Some(Self {
            snapshot_id: opt_string(obj.get("snapshot_id")),
            run_timestamp: opt_string(obj.get("run_timestamp")).unwrap_or_default(),
            events,
        })
    }
}

impl TryFrom<Value> for Snapshot {
    type Error = String;

    fn try_from(v: Value) -> Result<Self, Self::Error> {
        Snapshot::from_value(&v).ok_or_else(|| "snapshot must be a JSON object".to_string())
    }
}

/// Normalized (event, industry) pair with a single score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactRecord {
    pub text: String,
    pub timestamp: Timestamp,
    pub industry: String,
    pub score: f64,
    pub impact_type: Option<ImpactType>,
    pub thematic_category: Option<String>,
    pub relevance: Option<f64>,
    pub event_id: Option<String>,
}

/// Parse pipeline timestamps: RFC 3339, or naive ISO (assumed UTC).
pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    let ts = ts.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(ts, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Finite number from a JSON number or numeric string; `0` otherwise.
pub(crate) fn coerce_score(v: Option<&Value>) -> f64 {
    opt_f64(v).unwrap_or(0.0)
}

fn opt_f64(v: Option<&Value>) -> Option<f64> {
    let x = match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    x.filter(|f| f.is_finite())
}

fn opt_string(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
