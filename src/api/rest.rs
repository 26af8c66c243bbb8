// =============================================================================
// REST API Endpoints - Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/` and return JSON. The three dashboard
// sections map to `/trending`, `/search/:symbol` and `/analysis/:symbol`;
// `/health`, `/config` and `/errors` support the frontend shell.
//
// CORS is configured permissively; the frontend is served from a different
// origin during development.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, info};

use crate::analysis::{AnalysisReport, QuoteOverview};
use crate::api::views::TrendingBoard;
use crate::app_state::{AppState, ErrorRecord};
use crate::error::ProviderError;
use crate::market_data::{CorporateActions, FinancialStatements, Fundamentals, PriceHistory};
use crate::runtime_config::IndicatorParams;
use crate::types::HistoryPeriod;

const MAX_SYMBOL_LEN: usize = 20;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS, request tracing and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ── Shell ───────────────────────────────────────────────────
        .route("/api/v1/health", get(health))
        .route("/api/v1/config", get(public_config))
        .route("/api/v1/errors", get(recent_errors))
        // ── Dashboard sections ──────────────────────────────────────
        .route("/api/v1/trending", get(trending))
        .route("/api/v1/search/:symbol", get(search))
        .route("/api/v1/analysis/:symbol", get(analysis))
        // ── Middleware & State ───────────────────────────────────────
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Provider(ProviderError::NoData { .. }) => StatusCode::NOT_FOUND,
            Self::Provider(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}

/// Trim and upper-case a user-supplied ticker, rejecting anything that is
/// not a plausible symbol.
pub fn normalize_symbol(raw: &str) -> Result<String, ApiError> {
    let symbol = raw.trim().to_ascii_uppercase();
    if symbol.is_empty() {
        return Err(ApiError::InvalidRequest("symbol must not be empty".into()));
    }
    if symbol.len() > MAX_SYMBOL_LEN {
        return Err(ApiError::InvalidRequest(format!(
            "symbol must be at most {MAX_SYMBOL_LEN} characters"
        )));
    }
    if let Some(bad) = symbol
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '^' | '=' | '-')))
    {
        return Err(ApiError::InvalidRequest(format!(
            "invalid character `{bad}` in symbol"
        )));
    }
    Ok(symbol)
}

fn parse_date(field: &str, value: Option<&str>, default: NaiveDate) -> Result<NaiveDate, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d").map_err(|_| {
            ApiError::InvalidRequest(format!("`{field}` must be a YYYY-MM-DD date, got `{v}`"))
        }),
    }
}

/// Record a provider failure in the dashboard log and pass it on.
fn logged(state: &AppState, symbol: &str, err: ProviderError) -> ProviderError {
    state.push_error(&err, Some(symbol));
    err
}

fn require_bars(history: PriceHistory) -> Result<PriceHistory, ProviderError> {
    if history.is_empty() {
        Err(ProviderError::no_data(history.symbol))
    } else {
        Ok(history)
    }
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
    uptime_secs: u64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        server_time: chrono::Utc::now().timestamp_millis(),
        uptime_secs: state.uptime_secs(),
    };
    Json(resp)
}

// =============================================================================
// Public configuration
// =============================================================================

#[derive(Serialize)]
struct PublicConfig<'a> {
    benchmark_symbol: &'a str,
    default_start: NaiveDate,
    default_end: NaiveDate,
    significant_change_pct: f64,
    cards_per_row: usize,
    indicators: &'a IndicatorParams,
    periods: Vec<&'static str>,
    default_period: HistoryPeriod,
}

async fn public_config(State(state): State<Arc<AppState>>) -> Response {
    let cfg = &state.config;
    Json(PublicConfig {
        benchmark_symbol: &cfg.benchmark_symbol,
        default_start: cfg.default_start,
        default_end: cfg.default_end,
        significant_change_pct: cfg.significant_change_pct,
        cards_per_row: cfg.cards_per_row,
        indicators: &cfg.indicators,
        periods: HistoryPeriod::ALL.iter().map(|p| p.as_str()).collect(),
        default_period: HistoryPeriod::default(),
    })
    .into_response()
}

// =============================================================================
// Recent provider errors
// =============================================================================

async fn recent_errors(State(state): State<Arc<AppState>>) -> Json<Vec<ErrorRecord>> {
    Json(state.recent_errors())
}

// =============================================================================
// Trends
// =============================================================================

async fn trending(State(state): State<Arc<AppState>>) -> Result<Json<TrendingBoard>, ApiError> {
    let tickers = state.trending.trending().await.map_err(|e| {
        state.push_error(&e, None);
        e
    })?;

    info!(count = tickers.len(), "trending tickers served");
    Ok(Json(TrendingBoard::build(
        tickers,
        &state.config.quote_page_base_url,
        state.config.cards_per_row,
    )))
}

// =============================================================================
// Search
// =============================================================================

#[derive(Debug, Deserialize)]
struct SearchQuery {
    period: Option<String>,
}

async fn search(
    State(state): State<Arc<AppState>>,
    Path(raw_symbol): Path<String>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<QuoteOverview>, ApiError> {
    let symbol = normalize_symbol(&raw_symbol)?;
    let period = match query.period.as_deref() {
        Some(p) => p.parse::<HistoryPeriod>().map_err(ApiError::InvalidRequest)?,
        None => HistoryPeriod::default(),
    };
    let (start, end) = period.range(chrono::Utc::now().date_naive());

    let provider = &state.provider;
    let (history, fundamentals, actions, financials) = tokio::join!(
        provider.history(&symbol, start, end),
        provider.fundamentals(&symbol),
        provider.corporate_actions(&symbol),
        provider.financials(&symbol),
    );

    let history = history
        .and_then(require_bars)
        .map_err(|e| logged(&state, &symbol, e))?;

    // Fundamentals, corporate actions and statements are supplementary: the
    // chart still renders without them.
    let fundamentals = fundamentals.unwrap_or_else(|e| {
        state.push_error(&e, Some(&symbol));
        Fundamentals {
            symbol: symbol.clone(),
            ..Default::default()
        }
    });
    let actions = actions.unwrap_or_else(|e| {
        state.push_error(&e, Some(&symbol));
        CorporateActions::default()
    });
    let financials = financials.unwrap_or_else(|e| {
        state.push_error(&e, Some(&symbol));
        FinancialStatements::default()
    });

    debug!(symbol = %symbol, %period, bars = history.len(), "search served");
    Ok(Json(QuoteOverview::build(
        fundamentals,
        &history,
        actions,
        financials,
        period,
        (start, end),
        &state.config.indicators,
    )))
}

// =============================================================================
// Analysis
// =============================================================================

#[derive(Debug, Deserialize)]
struct AnalysisQuery {
    start: Option<String>,
    end: Option<String>,
}

async fn analysis(
    State(state): State<Arc<AppState>>,
    Path(raw_symbol): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<AnalysisReport>, ApiError> {
    let symbol = normalize_symbol(&raw_symbol)?;
    let config = &state.config;
    let start = parse_date("start", query.start.as_deref(), config.default_start)?;
    let end = parse_date("end", query.end.as_deref(), config.default_end)?;
    if start >= end {
        return Err(ApiError::InvalidRequest(format!(
            "start ({start}) must be before end ({end})"
        )));
    }

    let benchmark_symbol = config.benchmark_symbol.as_str();
    let (history, benchmark) = tokio::join!(
        state.provider.history(&symbol, start, end),
        state.provider.history(benchmark_symbol, start, end),
    );

    let history = history
        .and_then(require_bars)
        .map_err(|e| logged(&state, &symbol, e))?;
    if let Err(e) = &benchmark {
        state.push_error(e, Some(benchmark_symbol));
    }

    let report = AnalysisReport::build(&history, benchmark.as_ref(), start, end, config);
    info!(
        symbol = %symbol,
        bars = report.bars.len(),
        correlation = ?report.correlation,
        notes = report.notes.len(),
        "analysis served"
    );
    Ok(Json(report))
}
