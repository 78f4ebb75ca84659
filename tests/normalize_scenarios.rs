// tests/normalize_scenarios.rs
//
// Record expansion rules for each event shape, against single snapshots.

use industry_impact_monitor::model::{ImpactType, Snapshot};
use industry_impact_monitor::normalize::{normalize, Normalizer};
use industry_impact_monitor::taxonomy::DEFAULT_INDUSTRY;
use serde_json::json;

fn snap(v: serde_json::Value) -> Snapshot {
    Snapshot::from_value(&v).expect("snapshot object")
}

#[test]
fn multi_impact_entry_becomes_one_record() {
    let s = snap(json!({
        "run_timestamp": "2025-03-01T08:00:00Z",
        "events": [{
            "text": "Tea auction prices climb",
            "impacts": [{"industry": "Tea", "score": 0.8, "impact_type": "Opportunity"}]
        }]
    }));
    let recs = normalize(&s);
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].industry, "Tea");
    assert_eq!(recs[0].score, 0.8);
    assert_eq!(recs[0].impact_type, Some(ImpactType::Opportunity));
    assert_eq!(recs[0].timestamp, "2025-03-01T08:00:00Z");
}

#[test]
fn legacy_event_uses_category_and_opportunity_score() {
    let s = snap(json!({
        "run_timestamp": "t",
        "events": [{"text": "Storms", "category": "Tourism", "opportunity_score": -0.3}]
    }));
    let recs = normalize(&s);
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].industry, "Tourism");
    assert_eq!(recs[0].score, -0.3);
}

#[test]
fn empty_events_give_no_records() {
    assert!(normalize(&snap(json!({"run_timestamp": "t", "events": []}))).is_empty());
    assert!(normalize(&snap(json!({"run_timestamp": "t"}))).is_empty());
}

#[test]
fn record_count_matches_shape_cardinality() {
    let s = snap(json!({
        "run_timestamp": "t",
        "events": [
            {"impacts": [
                {"industry": "Tea", "score": 0.1},
                {"industry": "Rubber", "score": 0.2},
                {"industry": "Coconut", "score": 0.3}
            ]},
            {"industry_impact": {"Apparel": -0.1, "Tourism": 0.4}},
            {"text": "bare"}
        ]
    }));
    let expected: usize = s.events.iter().map(|e| e.shape.cardinality()).sum();
    let recs = normalize(&s);
    assert_eq!(expected, 6);
    assert_eq!(recs.len(), expected);
    assert_eq!(recs[5].industry, DEFAULT_INDUSTRY);
    assert_eq!(recs[5].score, 0.0);
}

#[test]
fn impacts_take_priority_over_other_fields() {
    let s = snap(json!({
        "run_timestamp": "t",
        "events": [{
            "impacts": [{"industry": "Tea", "score": 0.5}],
            "industry_impact": {"Rubber": 0.9},
            "category": "Mining",
            "opportunity_score": 0.7
        }]
    }));
    let recs = normalize(&s);
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].industry, "Tea");
}

#[test]
fn empty_impacts_list_falls_through_to_map() {
    let s = snap(json!({
        "run_timestamp": "t",
        "events": [{"impacts": [], "industry_impact": {"Rubber": 0.9, "Tea": "0.1"}}]
    }));
    let recs = normalize(&s);
    let pairs: Vec<(&str, f64)> = recs.iter().map(|r| (r.industry.as_str(), r.score)).collect();
    assert_eq!(pairs, vec![("Rubber", 0.9), ("Tea", 0.1)]);
}

#[test]
fn mistyped_scores_become_zero() {
    let s = snap(json!({
        "run_timestamp": "t",
        "events": [
            {"category": "Tea", "opportunity_score": "lots"},
            {"category": "Rubber", "opportunity_score": null},
            {"impacts": [{"industry": "Coconut", "score": {"x": 1}}]}
        ]
    }));
    let recs = normalize(&s);
    assert!(recs.iter().all(|r| r.score == 0.0));
}

#[test]
fn normalization_is_idempotent() {
    let s = snap(json!({
        "run_timestamp": "2025-03-01T08:00:00Z",
        "events": [
            {"impacts": [{"industry": "Tea", "score": 0.8}, {"score": -0.2}]},
            {"industry_impact": {"Tourism": 0.3}}
        ]
    }));
    let n = Normalizer::default();
    assert_eq!(n.normalize(&s), n.normalize(&s));
    assert_eq!(n.normalize(&s), normalize(&s));
}

#[test]
fn configured_label_replaces_default_everywhere() {
    let s = snap(json!({
        "run_timestamp": "t",
        "events": [
            {"impacts": [{"score": 0.1}]},
            {"industry_impact": {"": 0.2}},
            {"category": "  "}
        ]
    }));
    let n = Normalizer::new("Other");
    let recs = n.normalize(&s);
    assert_eq!(recs.len(), 3);
    assert!(recs.iter().all(|r| r.industry == "Other"));
}
