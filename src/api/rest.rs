// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
//   GET /health                    liveness probe
//   GET /market/schwab-status      can we reach Schwab with the saved token?
//   GET /market/candles            recent candles for a symbol/timeframe
//   GET /strategies/video-bos      break-of-structure trade ticket
//
// CORS only admits the configured dashboard origins.
// =============================================================================

use std::ops::RangeInclusive;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderValue,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::error::ApiError;
use crate::app_state::AppState;
use crate::market_data::{candle::tail, Candle};
use crate::schwab::SchwabClient;
use crate::strategy::{analyze, BosReport};
use crate::types::Timeframe;

const CANDLE_LIMITS: RangeInclusive<i64> = 10..=500;
const BOS_LIMITS: RangeInclusive<i64> = 50..=500;

/// Symbol used by the connectivity probe.
const PROBE_SYMBOL: &str = "SPY";

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS, request tracing and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let configured = &state.runtime_config.allowed_origins;
    let allow_origin = if configured.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = configured
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/market/schwab-status", get(schwab_status))
        .route("/market/candles", get(candles))
        .route("/strategies/video-bos", get(video_bos))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Query parameters
// =============================================================================

fn default_symbol() -> String {
    PROBE_SYMBOL.to_string()
}

fn default_tf() -> String {
    Timeframe::default().to_string()
}

fn default_limit() -> i64 {
    200
}

#[derive(Debug, Deserialize)]
struct MarketQuery {
    #[serde(default = "default_symbol")]
    symbol: String,
    #[serde(default = "default_tf")]
    tf: String,
    #[serde(default = "default_limit")]
    limit: i64,
}

/// Query parameters after normalization.
#[derive(Debug, PartialEq)]
struct MarketRequest {
    symbol: String,
    timeframe: Timeframe,
    limit: usize,
}

impl MarketQuery {
    fn validate(self, limits: RangeInclusive<i64>) -> Result<MarketRequest, ApiError> {
        let symbol = self.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ApiError::BadRequest("symbol must not be empty".into()));
        }

        let timeframe = self
            .tf
            .parse::<Timeframe>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        if !limits.contains(&self.limit) {
            return Err(ApiError::BadRequest(format!(
                "limit must be between {} and {}",
                limits.start(),
                limits.end()
            )));
        }

        Ok(MarketRequest {
            symbol,
            timeframe,
            limit: self.limit as usize,
        })
    }
}

/// Fetch candles for `req` and keep the most recent `req.limit`.
async fn fetch_recent(client: &SchwabClient, req: &MarketRequest) -> Result<Vec<Candle>, ApiError> {
    let candles = client.get_price_history(&req.symbol, req.timeframe).await?;
    Ok(tail(&candles, req.limit).to_vec())
}

fn ready_client(state: &AppState) -> Result<SchwabClient, ApiError> {
    state.schwab_client()?.ok_or(ApiError::NotReady)
}

// =============================================================================
// Health (public)
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
    uptime_secs: u64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        server_time: chrono::Utc::now().timestamp_millis(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

// =============================================================================
// Market
// =============================================================================

#[derive(Serialize)]
struct SchwabStatusResponse {
    ok: bool,
    status_code: u16,
}

async fn schwab_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SchwabStatusResponse>, ApiError> {
    let client = ready_client(&state)?;
    let status_code = client.get_quote(PROBE_SYMBOL).await?;
    Ok(Json(SchwabStatusResponse {
        ok: status_code == 200,
        status_code,
    }))
}

#[derive(Serialize)]
struct CandlesResponse {
    symbol: String,
    timeframe: Timeframe,
    candles: Vec<Candle>,
}

async fn candles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<CandlesResponse>, ApiError> {
    let req = query.validate(CANDLE_LIMITS)?;
    let client = ready_client(&state)?;
    let candles = fetch_recent(&client, &req).await?;

    Ok(Json(CandlesResponse {
        symbol: req.symbol,
        timeframe: req.timeframe,
        candles,
    }))
}

// =============================================================================
// Strategies
// =============================================================================

async fn video_bos(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<BosReport>, ApiError> {
    let req = query.validate(BOS_LIMITS)?;
    let client = ready_client(&state)?;
    let candles = fetch_recent(&client, &req).await?;

    let report = analyze(
        &req.symbol,
        req.timeframe,
        &candles,
        &state.runtime_config.strategy_params,
    )?;

    info!(
        symbol = %report.symbol,
        timeframe = %report.timeframe,
        mode = report.ticket.mode(),
        "BOS ticket issued"
    );
    Ok(Json(report))
}

// =============================================================================
// Tests
// =============================================================================
