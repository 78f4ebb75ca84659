//! # Record Normalizer
//! Flattens snapshots into the uniform [`ImpactRecord`] stream.
//!
//! Pure and order-preserving: records come out in (snapshot, event, impact)
//! order and running it twice over the same input gives the same output.

use crate::model::{EventShape, ImpactRecord, RawEvent, Snapshot};
use crate::taxonomy::DEFAULT_INDUSTRY;

/// Normalizer bound to one default-industry label.
#[derive(Debug, Clone)]
pub struct Normalizer {
    default_industry: String,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_INDUSTRY)
    }
}

impl Normalizer {
    /// An empty label falls back to [`DEFAULT_INDUSTRY`].
    pub fn new(default_industry: impl Into<String>) -> Self {
        let label = default_industry.into();
        let label = if label.trim().is_empty() {
            DEFAULT_INDUSTRY.to_string()
        } else {
            label
        };
        Self {
            default_industry: label,
        }
    }

    pub fn default_industry(&self) -> &str {
        &self.default_industry
    }

    pub fn normalize(&self, snapshot: &Snapshot) -> Vec<ImpactRecord> {
        self.normalize_events(&snapshot.events, &snapshot.run_timestamp)
    }

    /// All snapshots, concatenated in input order.
    pub fn normalize_all(&self, snapshots: &[Snapshot]) -> Vec<ImpactRecord> {
        snapshots.iter().flat_map(|s| self.normalize(s)).collect()
    }

    pub fn normalize_events(&self, events: &[RawEvent], fallback_ts: &str) -> Vec<ImpactRecord> {
        let mut out = Vec::with_capacity(events.iter().map(|e| e.shape.cardinality()).sum());
        for ev in events {
            self.push_event(ev, fallback_ts, &mut out);
        }
        out
    }

    pub fn normalize_event(&self, event: &RawEvent, fallback_ts: &str) -> Vec<ImpactRecord> {
        let mut out = Vec::with_capacity(event.shape.cardinality());
        self.push_event(event, fallback_ts, &mut out);
        out
    }

    fn push_event(&self, ev: &RawEvent, fallback_ts: &str, out: &mut Vec<ImpactRecord>) {
        let timestamp = ev
            .timestamp
            .as_deref()
            .unwrap_or(fallback_ts)
            .to_string();

        let record = |industry: Option<&str>, score: f64| ImpactRecord {
            text: ev.text.clone(),
            timestamp: timestamp.clone(),
            industry: self.resolve(industry),
            score,
            impact_type: None,
            thematic_category: ev.thematic_category.clone(),
            relevance: None,
            event_id: ev.id.clone(),
        };

        match &ev.shape {
            EventShape::MultiImpact { impacts } => {
                for imp in impacts {
                    let mut r = record(imp.industry.as_deref(), imp.score);
                    r.impact_type = imp.impact_type;
                    r.relevance = imp.relevance;
                    out.push(r);
                }
            }
            EventShape::Mapped { industry_impact } => {
                for (industry, score) in industry_impact {
                    out.push(record(Some(industry.as_str()), *score));
                }
            }
            EventShape::Legacy { category, score } => {
                out.push(record(category.as_deref(), *score));
            }
        }
    }

    fn resolve(&self, industry: Option<&str>) -> String {
        match industry {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => self.default_industry.clone(),
        }
    }
}

/// Normalize with the shared [`DEFAULT_INDUSTRY`] label.
pub fn normalize(snapshot: &Snapshot) -> Vec<ImpactRecord> {
    Normalizer::default().normalize(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImpactType;
    use serde_json::json;

    fn snap(v: serde_json::Value) -> Snapshot {
        Snapshot::from_value(&v).unwrap()
    }

    #[test]
    fn event_timestamp_wins_over_run_timestamp() {
        let s = snap(json!({
            "run_timestamp": "2025-01-01T00:00:00Z",
            "events": [
                {"text": "a", "timestamp": "2025-01-01T00:05:00Z", "category": "Tea", "opportunity_score": 0.1},
                {"text": "b", "category": "Tea", "opportunity_score": 0.2}
            ]
        }));
        let recs = normalize(&s);
        assert_eq!(recs[0].timestamp, "2025-01-01T00:05:00Z");
        assert_eq!(recs[1].timestamp, "2025-01-01T00:00:00Z");
    }

    #[test]
    fn multi_impact_copies_entry_fields() {
        let s = snap(json!({
            "run_timestamp": "t0",
            "events": [{
                "text": "Port expansion",
                "thematic_category": "Infrastructure",
                "impacts": [
                    {"industry": "Logistics", "score": 0.6, "impact_type": "Opportunity", "relevance": 0.9},
                    {"industry": "", "score": "bad", "impact_type": "Threat"},
                    "garbage"
                ]
            }]
        }));
        let recs = normalize(&s);
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].industry, "Logistics");
        assert_eq!(recs[0].relevance, Some(0.9));
        assert_eq!(recs[0].thematic_category.as_deref(), Some("Infrastructure"));
        assert_eq!(recs[1].industry, DEFAULT_INDUSTRY);
        assert_eq!(recs[1].score, 0.0);
        assert_eq!(recs[1].impact_type, Some(ImpactType::Threat));
        assert_eq!(recs[2].industry, DEFAULT_INDUSTRY);
        assert_eq!(recs[2].impact_type, None);
    }

    #[test]
    fn mapped_impacts_have_no_impact_type() {
        let s = snap(json!({
            "run_timestamp": "t0",
            "events": [{"text": "x", "industry_impact": {"Tea": 0.3, "Rubber": -0.1}}]
        }));
        let recs = normalize(&s);
        assert_eq!(recs.len(), 2);
        assert!(recs.iter().all(|r| r.impact_type.is_none()));
        assert_eq!(recs[1].industry, "Rubber");
    }

    #[test]
    fn configured_default_label_is_used() {
        let s = snap(json!({"events": [{"text": "orphan"}]}));
        let recs = Normalizer::new("Other").normalize(&s);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].industry, "Other");
        assert_eq!(Normalizer::new("  ").default_industry(), DEFAULT_INDUSTRY);
    }
}
