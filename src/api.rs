use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use shuttle_axum::axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::config::MonitorConfig;
use crate::indicators::{
    InsightFilter, NationalActivityReport, OperationalEnvironmentReport, RiskOpportunityInsight,
};
use crate::ingest::scheduler::{ReloadHandle, ReloadTrigger, RequestOutcome};
use crate::normalize::Normalizer;
use crate::ranking::Ranked;
use crate::store::{Dataset, DatasetStore, LoadState, StoreStatus};
use crate::views::{self, AnalysisView, EventRow, HomeSummary, TrendView};

#[derive(Clone)]
pub struct AppState {
    pub store: DatasetStore,
    pub reload: ReloadHandle,
    pub config: Arc<MonitorConfig>,
    normalizer: Arc<Normalizer>,
}

impl AppState {
    pub fn new(store: DatasetStore, reload: ReloadHandle, config: Arc<MonitorConfig>) -> Self {
        let normalizer = Arc::new(Normalizer::new(config.default_industry.clone()));
        Self {
            store,
            reload,
            config,
            normalizer,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/status", get(status))
        .route("/api/summary", get(summary))
        .route("/api/industries/chart", get(industry_chart))
        .route("/api/events", get(events))
        .route("/api/history/industries", get(history_industries))
        .route("/api/history/trend", get(history_trend))
        .route("/api/analysis", get(analysis))
        .route("/api/indicators/national", get(national))
        .route("/api/indicators/operational", get(operational))
        .route("/api/indicators/risk-opportunity", get(risk_opportunity))
        .route("/api/reload", post(reload_user))
        .route("/hooks/reload", post(reload_broadcast))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Alias used by the binary and tests.
pub fn router(state: AppState) -> Router {
    create_router(state)
}

/// Current dataset, or a 503 describing why there is none.
fn ready(state: &AppState) -> Result<Arc<Dataset>, Response> {
    match state.store.state() {
        LoadState::Ready(ds) => Ok(ds),
        LoadState::Loading => Err(unavailable("loading", None)),
        LoadState::Failed(e) => Err(unavailable("failed", Some(e))),
    }
}

fn unavailable(state: &str, error: Option<String>) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "state": state, "error": error })),
    )
        .into_response()
}

async fn status(State(state): State<AppState>) -> Json<StoreStatus> {
    Json(state.store.status())
}

async fn summary(State(state): State<AppState>) -> Result<Json<HomeSummary>, Response> {
    let ds = ready(&state)?;
    Ok(Json(views::home_summary(
        &state.normalizer,
        &ds.live_events,
        ds.live_run_timestamp.as_deref(),
        state.config.home_top_n,
    )))
}

#[derive(Debug, Deserialize)]
struct ChartQuery {
    n: Option<usize>,
}

async fn industry_chart(
    State(state): State<AppState>,
    Query(q): Query<ChartQuery>,
) -> Result<Json<Vec<Ranked>>, Response> {
    let ds = ready(&state)?;
    let n = q.n.filter(|n| *n > 0).unwrap_or(state.config.chart_top_n);
    Ok(Json(views::industry_chart(
        &state.normalizer,
        &ds.live_events,
        ds.live_run_timestamp.as_deref(),
        n,
    )))
}

async fn events(State(state): State<AppState>) -> Result<Json<Vec<EventRow>>, Response> {
    let ds = ready(&state)?;
    Ok(Json(views::events_table(
        &state.normalizer,
        &ds.live_events,
        ds.live_run_timestamp.as_deref(),
    )))
}

async fn history_industries(State(state): State<AppState>) -> Result<Json<Vec<String>>, Response> {
    let ds = ready(&state)?;
    Ok(Json(crate::window::industries_in(&state.normalizer, &ds.snapshots)))
}

#[derive(Debug, Deserialize)]
struct TrendQuery {
    industry: Option<String>,
    limit: Option<usize>,
}

async fn history_trend(
    State(state): State<AppState>,
    Query(q): Query<TrendQuery>,
) -> Result<Json<TrendView>, Response> {
    let ds = ready(&state)?;
    // report the window actually applied; zero selects one snapshot
    let limit = q.limit.unwrap_or(state.config.trend_limit).max(1);
    Ok(Json(views::trend_view(
        &state.normalizer,
        &ds.snapshots,
        q.industry.as_deref(),
        limit,
    )))
}

#[derive(Debug, Deserialize)]
struct AnalysisQuery {
    industry: Option<String>,
}

async fn analysis(
    State(state): State<AppState>,
    Query(q): Query<AnalysisQuery>,
) -> Result<Json<AnalysisView>, Response> {
    let ds = ready(&state)?;
    Ok(Json(views::analysis_view(
        &state.normalizer,
        &ds.snapshots,
        q.industry.as_deref(),
        state.config.analysis_points,
        state.config.analysis_top_news,
    )))
}

fn missing_indicator(name: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("{name} indicators unavailable") })),
    )
        .into_response()
}

async fn national(
    State(state): State<AppState>,
) -> Result<Json<NationalActivityReport>, Response> {
    let ds = ready(&state)?;
    ds.indicators
        .national
        .clone()
        .map(Json)
        .ok_or_else(|| missing_indicator("national activity"))
}

async fn operational(
    State(state): State<AppState>,
) -> Result<Json<OperationalEnvironmentReport>, Response> {
    let ds = ready(&state)?;
    ds.indicators
        .operational
        .clone()
        .map(Json)
        .ok_or_else(|| missing_indicator("operational environment"))
}

#[derive(Debug, Deserialize)]
struct InsightQuery {
    #[serde(default)]
    filter: InsightFilter,
}

#[derive(Debug, Serialize)]
struct InsightsOut {
    generated_at: Option<String>,
    total_insights: u64,
    high_risk: usize,
    high_opportunity: usize,
    insights: Vec<RiskOpportunityInsight>,
}

async fn risk_opportunity(
    State(state): State<AppState>,
    Query(q): Query<InsightQuery>,
) -> Result<Json<InsightsOut>, Response> {
    let ds = ready(&state)?;
    let report = ds
        .indicators
        .risk_opportunity
        .as_ref()
        .ok_or_else(|| missing_indicator("risk/opportunity"))?;
    Ok(Json(InsightsOut {
        generated_at: report.generated_at.clone(),
        total_insights: report.total_insights,
        high_risk: report.high_risk_count(),
        high_opportunity: report.high_opportunity_count(),
        insights: report.filtered(q.filter).into_iter().cloned().collect(),
    }))
}

fn request_reload(state: &AppState, trigger: ReloadTrigger) -> Response {
    let (status, accepted, coalesced) = match state.reload.request(trigger) {
        RequestOutcome::Queued => (StatusCode::ACCEPTED, true, false),
        RequestOutcome::Coalesced => (StatusCode::ACCEPTED, true, true),
        RequestOutcome::Stopped => {
            tracing::warn!(target: "api", trigger = trigger.label(), "reload requested but scheduler is not running");
            (StatusCode::SERVICE_UNAVAILABLE, false, false)
        }
    };
    (
        status,
        Json(json!({ "accepted": accepted, "coalesced": coalesced, "trigger": trigger })),
    )
        .into_response()
}

async fn reload_user(State(state): State<AppState>) -> Response {
    request_reload(&state, ReloadTrigger::User)
}

async fn reload_broadcast(State(state): State<AppState>) -> Response {
    request_reload(&state, ReloadTrigger::Broadcast)
}
