//! HTTP front end for the organization scan.
//!
//! ## Endpoints
//!
//! - `GET /api/scan?lat&lng[&radius_km][&q][&category]` runs one scan
//! - `GET /health` liveness probe

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use givescan_search::{COORDINATES_REQUIRED, ScanParams, Scanner};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};

/// Error body returned for internal failures; the cause stays in the logs.
pub const SCAN_FAILED: &str = "scan_failed";

/// JSON error body: `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable error message.
    pub error: String,
}

/// JSON body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the server is serving.
    pub status: String,
}

// ---------------------------------------------------------------------------
// Shared application state
// ---------------------------------------------------------------------------

/// Shared state for axum handlers.
#[derive(Clone)]
struct AppState {
    /// Adapter registry and pipeline configuration, built once at startup.
    scanner: Arc<Scanner>,
    /// Parent of every per-request cancellation token.
    shutdown: CancellationToken,
}

/// Build the service router around a prepared [`Scanner`].
///
/// Each request scans under a child of `shutdown`, so cancelling it aborts
/// in-flight provider calls.
pub fn router(scanner: Arc<Scanner>, shutdown: CancellationToken) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS]);

    Router::new()
        .route("/api/scan", get(handle_scan))
        .route("/health", get(handle_health))
        .with_state(AppState { scanner, shutdown })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ---------------------------------------------------------------------------
// ScanServer
// ---------------------------------------------------------------------------

/// The scan HTTP service running on a background task.
pub struct ScanServer {
    /// The address the server is listening on.
    addr: SocketAddr,
    /// Cancelled to stop accepting connections and abort running scans.
    shutdown: CancellationToken,
    /// Handle to the background server task.
    handle: JoinHandle<()>,
}

impl ScanServer {
    /// Start the server.
    ///
    /// Binds to `{config.host}:{config.port}` (use port `0` for auto-assign)
    /// and begins serving in a background tokio task.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan configuration is invalid or the TCP
    /// listener cannot bind.
    pub async fn start(config: ServerConfig) -> Result<Self> {
        let bind_addr = config.bind_addr();
        let scanner = Arc::new(Scanner::new(config.scan)?);
        info!(providers = ?scanner.sources(), "scanner ready");

        let shutdown = CancellationToken::new();
        let app = router(scanner, shutdown.clone());

        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| ServerError::Bind(format!("{bind_addr}: {e}")))?;
        let addr = listener.local_addr()?;

        info!("givescan listening on http://{addr}");

        let stop = shutdown.clone();
        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(stop.cancelled_owned())
                .await;
            if let Err(e) = result {
                tracing::error!("server error: {e}");
            }
        });

        Ok(Self {
            addr,
            shutdown,
            handle,
        })
    }

    /// Returns the address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Stop accepting connections, cancel running scans and wait for the
    /// server task to finish.
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Err(e) = (&mut self.handle).await {
            if !e.is_cancelled() {
                tracing::error!("server task failed: {e}");
            }
        }
        info!("givescan stopped");
    }
}

impl Drop for ScanServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
        self.handle.abort();
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// `GET /api/scan`: validate, fan out, merge.
async fn handle_scan(
    State(state): State<AppState>,
    params: std::result::Result<Query<ScanParams>, QueryRejection>,
) -> Response {
    let Ok(Query(params)) = params else {
        return error_response(StatusCode::BAD_REQUEST, COORDINATES_REQUIRED);
    };

    let cancel = state.shutdown.child_token();
    match state.scanner.scan(&params, &cancel).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) if e.is_validation() => {
            tracing::debug!(error = %e, "scan rejected");
            error_response(StatusCode::BAD_REQUEST, COORDINATES_REQUIRED)
        }
        Err(e) => {
            tracing::error!(error = %e, "scan failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, SCAN_FAILED)
        }
    }
}

/// `GET /health`.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
    })
}

fn error_response(status: StatusCode, message: &str) -> Response {
    let body = ErrorResponse {
        error: message.to_owned(),
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn error_response_shape() {
        let body = ErrorResponse {
            error: COORDINATES_REQUIRED.to_owned(),
        };
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "lat,lng required" }));
    }

    #[test]
    fn error_response_status() {
        let resp = error_response(StatusCode::INTERNAL_SERVER_ERROR, SCAN_FAILED);
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(body) = handle_health().await;
        assert_eq!(body.status, "ok");
    }

    #[tokio::test]
    async fn start_rejects_invalid_scan_config() {
        let mut config = ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            ..Default::default()
        };
        config.scan.max_results = 0;
        let err = ScanServer::start(config).await.err().expect("invalid config");
        assert!(matches!(err, ServerError::Scan(_)));
    }

    #[tokio::test]
    async fn start_binds_ephemeral_port() {
        let config = ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            ..Default::default()
        };
        let server = ScanServer::start(config).await.expect("server starts");
        assert_ne!(server.port(), 0);
        assert!(server.addr().ip().is_loopback());
        server.shutdown().await;
    }
}
