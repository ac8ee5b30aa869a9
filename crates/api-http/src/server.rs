//! HTTP Server
//!
//! Binds the axum router and serves until a shutdown signal arrives.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use crate::handler::{self, AppState, MAX_UPLOAD_BYTES};

const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
const DEFAULT_HTTP_PORT: u16 = 8317;

/// Multipart framing overhead allowed on top of the file cap.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

/// HTTP Server Configuration
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HTTP_HOST.to_string(),
            port: DEFAULT_HTTP_PORT,
        }
    }
}

/// HTTP Server
pub struct HttpServer {
    config: HttpServerConfig,
    state: Arc<AppState>,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// Router factory, public so tests can drive it in-process.
    pub fn router(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/api/generate", post(handler::generate))
            .route("/healthz", get(handler::health))
            .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + BODY_LIMIT_SLACK))
            .with_state(state)
    }

    /// Serve until ctrl-c. In-flight requests drain before this returns.
    ///
    /// Security: defaults to binding 127.0.0.1 only; expose deliberately.
    pub async fn start(self) -> Result<(), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting HTTP server"
        );

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| format!("Failed to bind {addr}: {e}"))?;

        info!("HTTP server started successfully");

        axum::serve(listener, Self::router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| format!("HTTP server failed: {e}"))
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received. Draining in-flight requests...");
}
