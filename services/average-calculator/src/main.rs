//! Average Calculator
//!
//! HTTP service that:
//! 1. Fetches a batch of numbers (primes, fibonacci, even, random) from the
//!    evaluation API with a 500ms budget
//! 2. Merges the unseen ones into a fixed-size sliding window
//! 3. Returns the window before and after, the batch, and the window average

mod config;
mod numbers;
mod state;
mod window;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use common::config::{cli_config_arg, process_env, resolve_path};
use common::http::{ApiError, panic_response};
use common::metrics::{ServiceMetrics, track_requests};
use common::runtime::{DRAIN_TIMEOUT, init_tracing, serve_until_signal};
use eval_auth::TokenManager;
use eval_client::Fetcher;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, info, info_span, warn};

use crate::config::Config;
use crate::numbers::{INVALID_ID_MESSAGE, NumberKind, NumbersResponse};
use crate::state::ServiceState;

/// Shared application state accessible from all handlers
#[derive(Clone)]
struct AppState {
    service: Arc<ServiceState>,
    metrics: ServiceMetrics,
    prometheus: PrometheusHandle,
}

/// Build the axum router with all routes and shared state.
///
/// `max_connections` bounds in-flight requests across the service.
fn build_router(state: AppState, max_connections: usize) -> Router {
    Router::new()
        .route(
            "/numbers/{numberid}",
            get(numbers_handler).post(numbers_handler),
        )
        .route("/test-numbers/{numberid}", get(test_numbers_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.metrics.clone(),
            track_requests,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_connections))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    info!("starting average-calculator");

    // Install Prometheus metrics recorder before any metrics are emitted
    let prometheus = common::metrics::install_recorder()
        .context("failed to install Prometheus recorder")?;

    let args: Vec<String> = std::env::args().collect();
    let config_path = resolve_path(cli_config_arg(&args), &process_env);
    match &config_path {
        Some(path) => info!(path = %path.display(), "loading configuration"),
        None => info!("no config file given, using defaults"),
    }
    let config = Config::load(config_path.as_deref(), &process_env)
        .context("failed to load configuration")?;

    info!(
        listen_addr = %config.server.listen_addr,
        base_url = %config.upstream.base_url,
        timeout_ms = config.upstream.timeout_ms,
        window_size = config.window.size,
        preloaded_credential = config.credential.is_some(),
        "configuration loaded"
    );
    if !config.identity.is_complete() {
        warn!("identity is incomplete, token requests may be rejected");
    }

    let client = reqwest::Client::new();
    let tokens = TokenManager::new(client.clone(), &config.upstream.base_url, config.identity)
        .with_credential(config.credential)
        .with_timeout(Duration::from_millis(config.upstream.auth_timeout_ms));
    let fetcher = Fetcher::new(
        client,
        &config.upstream.base_url,
        Arc::new(tokens),
        Duration::from_millis(config.upstream.timeout_ms),
    );

    let state = AppState {
        service: Arc::new(ServiceState::new(config.window.size, fetcher)),
        metrics: ServiceMetrics::new(),
        prometheus,
    };
    let app = build_router(state, config.server.max_connections);

    let listen_addr = config.server.listen_addr;
    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind to {listen_addr}"))?;
    info!(addr = %listen_addr, "accepting requests");

    serve_until_signal(listener, app, DRAIN_TIMEOUT).await?;

    info!("shutdown complete");
    Ok(())
}

fn parse_kind(number_id: &str) -> Result<NumberKind, ApiError> {
    NumberKind::from_id(number_id)
        .ok_or_else(|| ApiError::InvalidRequest(INVALID_ID_MESSAGE.to_string()))
}

fn new_request_id() -> String {
    format!("req_{}", uuid::Uuid::new_v4().as_simple())
}

/// `GET|POST /numbers/{numberid}`: fetch from upstream and update the window.
async fn numbers_handler(
    State(state): State<AppState>,
    Path(number_id): Path<String>,
) -> Result<Json<NumbersResponse>, ApiError> {
    let kind = parse_kind(&number_id)?;
    let span = info_span!("numbers", request_id = %new_request_id(), endpoint = kind.endpoint());
    let response = state
        .service
        .update_from_upstream(kind)
        .instrument(span)
        .await;
    Ok(Json(response))
}

/// `GET /test-numbers/{numberid}`: update the window from the static table.
async fn test_numbers_handler(
    State(state): State<AppState>,
    Path(number_id): Path<String>,
) -> Result<Json<NumbersResponse>, ApiError> {
    let kind = parse_kind(&number_id)?;
    let span = info_span!("test_numbers", request_id = %new_request_id(), endpoint = kind.endpoint());
    let response = state.service.update_from_mock(kind).instrument(span).await;
    Ok(Json(response))
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let window = state.service.window_status().await;
    Json(serde_json::json!({
        "status": "healthy",
        "uptime_seconds": state.metrics.started_at.elapsed().as_secs(),
        "requests_served": state.metrics.requests(),
        "errors_total": state.metrics.errors(),
        "window": {
            "size": window.size,
            "capacity": window.capacity,
            "last_updated": window.last_updated,
        },
    }))
}

/// Prometheus metrics endpoint in text exposition format.
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        axum::http::StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.prometheus.render(),
    )
}
