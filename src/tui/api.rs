//! HTTP endpoint exposing the widget state and the cached static assets.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::Serialize;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};

use crate::cache::AssetCache;
use crate::config::ServerConfig;
use crate::display::SharedDisplay;
use crate::refresh::RefreshReason;

/// Port to serve on: `MAWAQIT_API_PORT` if set and valid, else the config.
#[must_use]
pub fn api_port(config: &ServerConfig) -> u16 {
    env::var("MAWAQIT_API_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(config.port)
}

#[derive(Clone)]
struct AppState {
    display: SharedDisplay,
    refresh_tx: Arc<mpsc::UnboundedSender<RefreshReason>>,
    cache: Arc<AssetCache>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct RefreshResponse {
    queued: bool,
}

fn content_type(path: &str) -> &'static str {
    match path.rsplit_once('.').map(|(_, ext)| ext) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

async fn api_health() -> impl IntoResponse {
    axum::Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn api_times(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(state.display.snapshot())
}

async fn api_refresh(State(state): State<AppState>) -> impl IntoResponse {
    let queued = state.refresh_tx.send(RefreshReason::Manual).is_ok();
    axum::Json(RefreshResponse { queued })
}

async fn cached_asset(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    match state.cache.get(&path).await {
        Ok(Some(bytes)) => ([(header::CONTENT_TYPE, content_type(&path))], bytes).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            log::warn!("Rejected asset request {path:?}: {e}");
            StatusCode::BAD_REQUEST.into_response()
        }
    }
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(api_health))
        .route("/api/times", get(api_times))
        .route("/api/refresh", post(api_refresh))
        .route("/assets/{*path}", get(cached_asset))
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP endpoint and serves until the listener fails.
///
/// # Errors
///
/// Returns an error if the server cannot bind to the specified address.
pub async fn run_api_server(
    display: SharedDisplay,
    refresh_tx: mpsc::UnboundedSender<RefreshReason>,
    cache: AssetCache,
    host: &str,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let state = AppState {
        display,
        refresh_tx: Arc::new(refresh_tx),
        cache: Arc::new(cache),
    };

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplaySink;
    use tempfile::TempDir;

    fn state(cache_dir: &std::path::Path) -> (AppState, mpsc::UnboundedReceiver<RefreshReason>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = AppState {
            display: SharedDisplay::new(),
            refresh_tx: Arc::new(tx),
            cache: Arc::new(AssetCache::new(cache_dir, "static")),
        };
        (state, rx)
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type("index.html"), "text/html; charset=utf-8");
        assert_eq!(content_type("js/index.js"), "text/javascript; charset=utf-8");
        assert_eq!(content_type("README"), "application/octet-stream");
    }

    #[tokio::test]
    async fn times_returns_display_snapshot() {
        let dir = TempDir::new().unwrap();
        let (state, _rx) = state(dir.path());
        state.display.set_timer("00:42:00");

        let response = api_times(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("\"timer\":\"00:42:00\""));
        assert!(body.contains("\"loading\":true"));
    }

    #[tokio::test]
    async fn refresh_enqueues_manual_request() {
        let dir = TempDir::new().unwrap();
        let (state, mut rx) = state(dir.path());

        let response = api_refresh(State(state)).await.into_response();
        assert_eq!(body_string(response).await, r#"{"queued":true}"#);
        assert_eq!(rx.try_recv().unwrap(), RefreshReason::Manual);
    }

    #[tokio::test]
    async fn assets_are_served_from_cache() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("static/css")).unwrap();
        std::fs::write(dir.path().join("static/css/index.css"), "body{}").unwrap();
        let (state, _rx) = state(dir.path());

        let response = cached_asset(State(state.clone()), Path("css/index.css".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/css; charset=utf-8"
        );
        assert_eq!(body_string(response).await, "body{}");

        let missing = cached_asset(State(state.clone()), Path("js/index.js".to_string())).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let escaping = cached_asset(State(state), Path("../etc/passwd".to_string())).await;
        assert_eq!(escaping.status(), StatusCode::BAD_REQUEST);
    }
}
