//! Social Media Analytics
//!
//! HTTP service that:
//! 1. Collects users, their posts and each post's comments from the
//!    evaluation API, caching results for a minute
//! 2. Falls back to a built-in table when the API is unavailable
//! 3. Serves top users by comments received, latest posts and most
//!    commented posts

mod analytics;
mod cache;
mod config;
mod mock;
mod model;
mod source;
mod state;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, SecondsFormat};
use common::config::{cli_config_arg, process_env, resolve_path};
use common::http::{ApiError, panic_response};
use common::metrics::{ServiceMetrics, track_requests};
use common::runtime::{DRAIN_TIMEOUT, init_tracing, serve_until_signal};
use eval_auth::TokenManager;
use eval_client::Fetcher;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, info, info_span, warn};

use crate::config::Config;
use crate::model::{PostsResponse, UsersResponse};
use crate::source::{MockSource, RemoteSource, SocialSource};
use crate::state::ServiceState;

const INVALID_TYPE_MESSAGE: &str = r#"Invalid type parameter. Use "latest" or "popular"."#;

/// Shared application state accessible from all handlers
#[derive(Clone)]
struct AppState {
    service: Arc<ServiceState>,
    metrics: ServiceMetrics,
    prometheus: PrometheusHandle,
}

/// Build the axum router with all routes and shared state.
fn build_router(state: AppState, max_connections: usize) -> Router {
    Router::new()
        .route("/users", get(users_handler))
        .route("/posts", get(posts_handler))
        .route("/test", get(test_handler))
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
    info!("starting social-analytics");

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
        cache_ttl_secs = config.source.cache_ttl_secs,
        offline = config.source.offline,
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
    let tokens = fetcher.tokens().clone();

    let source: Arc<dyn SocialSource> = if config.source.offline {
        Arc::new(MockSource)
    } else {
        Arc::new(RemoteSource::new(
            fetcher,
            Duration::from_secs(config.source.cache_ttl_secs),
        ))
    };
    let service = Arc::new(ServiceState::new(source, tokens));

    // Warm the store and cache before the first request arrives
    let warmup = service.clone();
    tokio::spawn(
        async move { warmup.refresh().await }.instrument(info_span!("warmup")),
    );

    let state = AppState {
        service,
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

fn new_request_id() -> String {
    format!("req_{}", uuid::Uuid::new_v4().as_simple())
}

/// `GET /users`: top five authors by comments received.
async fn users_handler(State(state): State<AppState>) -> Json<UsersResponse> {
    let span = info_span!("users", request_id = %new_request_id());
    let users = state.service.top_users().instrument(span).await;
    Json(UsersResponse { users })
}

#[derive(Debug, Deserialize)]
struct PostsQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// `GET /posts?type=latest|popular`. The type is checked before any refresh.
async fn posts_handler(
    State(state): State<AppState>,
    Query(query): Query<PostsQuery>,
) -> Result<Json<PostsResponse>, ApiError> {
    let span = info_span!("posts", request_id = %new_request_id(), kind = query.kind.as_deref());
    let posts = match query.kind.as_deref() {
        Some("latest") => state.service.latest_posts().instrument(span).await,
        Some("popular") => state.service.popular_posts().instrument(span).await,
        _ => return Err(ApiError::InvalidRequest(INVALID_TYPE_MESSAGE.to_string())),
    };
    Ok(Json(PostsResponse { posts }))
}

/// Unix milliseconds as an ISO-8601 UTC timestamp, e.g.
/// `2030-03-17T17:46:40.000Z`. `None` when out of chrono's range.
fn iso_timestamp(millis: u64) -> Option<String> {
    let millis = i64::try_from(millis).ok()?;
    DateTime::from_timestamp_millis(millis)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// `GET /test`: credential presence and built-in table sizes.
async fn test_handler(State(state): State<AppState>) -> impl IntoResponse {
    let auth = state.service.tokens().status().await;
    Json(serde_json::json!({
        "message": "API is working",
        "auth": {
            "tokenExists": auth.token_exists,
            "expiresAt": auth.expires_at.and_then(iso_timestamp),
        },
        "mockDataSize": mock::size(),
    }))
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.service.summary().await;
    Json(serde_json::json!({
        "status": "healthy",
        "uptime_seconds": state.metrics.started_at.elapsed().as_secs(),
        "requests_served": state.metrics.requests(),
        "errors_total": state.metrics.errors(),
        "store": store,
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

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use eval_auth::{Credential, Identity};
    use tower::ServiceExt;

    fn test_app(credential: Option<Credential>) -> Router {
        let tokens = TokenManager::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1",
            Identity::default(),
        )
        .with_credential(credential);
        let fetcher = Fetcher::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1",
            Arc::new(tokens),
            Duration::from_millis(500),
        );
        let tokens = fetcher.tokens().clone();
        // unreachable upstream: every call falls back to the built-in table
        let source = Arc::new(RemoteSource::new(fetcher, Duration::from_secs(60)));
        let state = AppState {
            service: Arc::new(ServiceState::new(source, tokens)),
            metrics: ServiceMetrics::new(),
            prometheus: common::metrics::detached_handle(),
        };
        build_router(state, 1000)
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn users_returns_top_authors() {
        let app = test_app(None);
        let (status, json) = get_json(&app, "/users").await;

        assert_eq!(status, StatusCode::OK);
        let users = json["users"].as_array().unwrap();
        assert_eq!(users.len(), 4);
        assert_eq!(users[0]["userId"], "1");
        assert_eq!(users[0]["name"], "John Doe");
        assert_eq!(users[0]["commentCount"], 5);
    }

    #[tokio::test]
    async fn posts_latest() {
        let app = test_app(None);
        let (status, json) = get_json(&app, "/posts?type=latest").await;

        assert_eq!(status, StatusCode::OK);
        let ids: Vec<_> = json["posts"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, [105, 104, 103, 102, 101]);
        assert_eq!(json["posts"][0]["userName"], "Bob Johnson");
    }

    #[tokio::test]
    async fn posts_popular() {
        let app = test_app(None);
        let (status, json) = get_json(&app, "/posts?type=popular").await;

        assert_eq!(status, StatusCode::OK);
        let posts = json["posts"].as_array().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0]["id"], 101);
        assert_eq!(posts[0]["userId"], 1);
        assert_eq!(posts[0]["content"], "Post about technology");
        assert_eq!(posts[0]["commentCount"], 3);
    }

    #[tokio::test]
    async fn posts_rejects_missing_or_unknown_type() {
        let app = test_app(None);
        for uri in ["/posts", "/posts?type=oldest", "/posts?type="] {
            let (status, json) = get_json(&app, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(json["error"], INVALID_TYPE_MESSAGE);
        }

        // rejected requests never trigger a refresh
        let (_, health) = get_json(&app, "/health").await;
        assert_eq!(health["store"]["posts"], 0);
    }

    #[tokio::test]
    async fn test_endpoint_reports_credential() {
        let app = test_app(Some(Credential::new("t".into(), None, 1_900_000_000_000)));
        let (status, json) = get_json(&app, "/test").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "API is working");
        assert_eq!(json["auth"]["tokenExists"], true);
        assert_eq!(json["auth"]["expiresAt"], "2030-03-17T17:46:40.000Z");
        assert_eq!(json["mockDataSize"]["users"], 5);
        assert_eq!(json["mockDataSize"]["posts"], 5);
        assert_eq!(json["mockDataSize"]["comments"], 5);
    }

    #[tokio::test]
    async fn test_endpoint_without_credential() {
        let app = test_app(None);
        let (_, json) = get_json(&app, "/test").await;
        assert_eq!(json["auth"]["tokenExists"], false);
        assert!(json["auth"]["expiresAt"].is_null());
    }

    #[test]
    fn iso_timestamp_keeps_millis() {
        assert_eq!(
            iso_timestamp(1_700_000_000_123).as_deref(),
            Some("2023-11-14T22:13:20.123Z")
        );
        assert_eq!(iso_timestamp(0).as_deref(), Some("1970-01-01T00:00:00.000Z"));
        assert_eq!(iso_timestamp(u64::MAX), None);
    }

    #[tokio::test]
    async fn health_counts_errors() {
        let app = test_app(None);
        get_json(&app, "/posts?type=bogus").await;
        get_json(&app, "/users").await;

        let (status, json) = get_json(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["requests_served"], 2);
        assert_eq!(json["errors_total"], 1);
        assert_eq!(json["store"]["users"], 5);
    }
}
