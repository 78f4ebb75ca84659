// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.

use std::fs;
use std::sync::Arc;

use serde_json::Value as Json;
use shuttle_axum::axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt as _; // for `oneshot`

use industry_impact_monitor::api::{self, AppState};
use industry_impact_monitor::config::MonitorConfig;
use industry_impact_monitor::ingest::providers::FixtureFeed;
use industry_impact_monitor::ingest::scheduler::{
    reload_once, spawn_reload_scheduler, ReloadHandle, ReloadSchedulerCfg, ReloadTrigger,
};
use industry_impact_monitor::ingest::types::FeedSource;
use industry_impact_monitor::ingest::types::Resource;
use industry_impact_monitor::store::DatasetStore;

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("tests/fixtures/{name}")).expect("fixture present")
}

fn router_for(store: DatasetStore) -> Router {
    let state = AppState::new(store, ReloadHandle::detached(), Arc::new(MonitorConfig::default()));
    api::router(state)
}

async fn loaded_router() -> Router {
    let feed = FixtureFeed::new()
        .with(Resource::LiveOutput, fixture("live_output.json"))
        .with(Resource::History, fixture("history.jsonl"))
        .with(Resource::RiskOpportunity, fixture("risk_opportunity.json"));
    let store = DatasetStore::new();
    reload_once(&feed, &store, store.begin(), ReloadTrigger::User).await;
    router_for(store)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let json = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, json)
}

#[tokio::test]
async fn health_returns_ok() {
    let app = router_for(DatasetStore::new());
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(String::from_utf8(bytes.to_vec()).unwrap().trim(), "OK");
}

#[tokio::test]
async fn data_routes_are_503_before_first_load() {
    let app = router_for(DatasetStore::new());
    for uri in ["/api/summary", "/api/events", "/api/history/trend?industry=Tea"] {
        let (status, body) = get_json(app.clone(), uri).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{uri}");
        assert_eq!(body["state"], "loading");
    }
    let (status, body) = get_json(app, "/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "loading");
}

#[tokio::test]
async fn summary_after_load() {
    let (status, body) = get_json(loaded_router().await, "/api/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sentiment"], "Negative");
    assert_eq!(body["top_opportunity"]["industry"], "Tourism");
    assert_eq!(body["rows"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn chart_respects_n() {
    let (status, body) = get_json(loaded_router().await, "/api/industries/chart?n=2").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Tourism", "Construction"]);
}

#[tokio::test]
async fn trend_returns_windowed_series() {
    let (status, body) =
        get_json(loaded_router().await, "/api/history/trend?industry=Tea&limit=3").await;
    assert_eq!(status, StatusCode::OK);
    let series = body["series"].as_array().unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series[2]["value"], 0.4);
    assert!(body["industries"].as_array().unwrap().iter().any(|i| i == "Rubber"));
}

#[tokio::test]
async fn trend_reports_applied_limit_and_range_presets() {
    let (status, body) =
        get_json(loaded_router().await, "/api/history/trend?industry=Tea&limit=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["limit"], 1);
    assert_eq!(body["series"].as_array().unwrap().len(), 1);
    let ranges: Vec<u64> = body["ranges"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r.as_u64())
        .collect();
    assert_eq!(ranges, vec![24, 48, 168, 720]);
}

#[tokio::test]
async fn analysis_defaults_to_first_industry() {
    let (status, body) = get_json(loaded_router().await, "/api/analysis").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["industry"], industry_impact_monitor::taxonomy::INDUSTRIES[0]);
}

#[tokio::test]
async fn indicators_filter_and_missing_documents() {
    let app = loaded_router().await;
    let (status, body) =
        get_json(app.clone(), "/api/indicators/risk-opportunity?filter=risks").await;
    assert_eq!(status, StatusCode::OK);
    let insights = body["insights"].as_array().unwrap();
    assert_eq!(insights.len(), 1);
    assert_eq!(insights[0]["id"], "r1");
    assert_eq!(body["high_opportunity"], 1);

    let (status, _) = get_json(app, "/api/indicators/national").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reload_hooks_report_stopped_scheduler() {
    let app = router_for(DatasetStore::new());
    for uri in ["/api/reload", "/hooks/reload"] {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE, "{uri}");
    }
}

#[tokio::test]
async fn reload_hooks_accept_while_scheduler_runs() {
    let store = DatasetStore::new();
    let feed: Arc<dyn FeedSource> = Arc::new(FixtureFeed::new());
    let (handle, join) =
        spawn_reload_scheduler(ReloadSchedulerCfg { interval_secs: 3600 }, feed, store.clone());
    let app = api::router(AppState::new(store, handle, Arc::new(MonitorConfig::default())));

    for _ in 0..12 {
        let req = Request::builder()
            .method("POST")
            .uri("/hooks/reload")
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
        let body: Json = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["accepted"], true);
        assert_eq!(body["trigger"], "broadcast");
        assert!(body["coalesced"].is_boolean());
    }

    join.abort();
}
