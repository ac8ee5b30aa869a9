//! idphoto - Main Entry Point
//! HTTP server: telemetry, env configuration, dependency wiring.

mod telemetry;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

// Import workspace crates
use idphoto_api_http::{AppState, HttpServer, HttpServerConfig};
use idphoto_core::application::PhotoPipeline;
use idphoto_core::port::time_provider::SystemTimeProvider;
use idphoto_infra_gemini::{GeminiBackgroundEditor, GeminiConfig};
use idphoto_infra_imaging::ImagingBackend;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging (JSON format for production)
    let log_format = std::env::var("IDPHOTO_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("idphoto=info"))
        .expect("Failed to create env filter");

    // Optional non-blocking file logging alongside stdout
    let (file_layer, _file_guard) = match std::env::var("IDPHOTO_LOG_DIR") {
        Ok(dir) => {
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "idphoto.log"));
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().boxed())
                .with(file_layer)
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().boxed())
                .with(file_layer)
                .init();
        }
    }

    info!("idphoto server v{} starting...", VERSION);

    // 1.1. Initialize OpenTelemetry (optional)
    if let Err(e) = telemetry::init_telemetry() {
        tracing::warn!(error = ?e, "Failed to initialize OpenTelemetry (continuing without it)");
    }

    // 2. Load configuration
    let http_host =
        std::env::var("IDPHOTO_HTTP_HOST").unwrap_or_else(|_| HttpServerConfig::default().host);
    let http_port: u16 = std::env::var("IDPHOTO_HTTP_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| HttpServerConfig::default().port);

    // 3. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let transformer = Arc::new(ImagingBackend::new());

    // The editor credential is resolved once here; without it the server
    // still serves, and /api/generate answers 500 before any processing.
    let state = match GeminiConfig::from_env() {
        Some(mut gemini_config) => {
            if let Ok(model) = std::env::var("IDPHOTO_GEMINI_MODEL") {
                gemini_config = gemini_config.with_model(model);
            }
            info!(model = %gemini_config.model, "Background editor configured");

            let editor = Arc::new(
                GeminiBackgroundEditor::new(gemini_config)
                    .map_err(|e| anyhow::anyhow!("Editor init failed: {}", e))?,
            );
            let pipeline = Arc::new(PhotoPipeline::with_defaults(
                transformer,
                editor,
                time_provider,
            ));
            AppState::new(pipeline)
        }
        None => {
            tracing::error!(
                "GEMINI_API_KEY is not configured; /api/generate will refuse every request"
            );
            AppState::unconfigured("GEMINI_API_KEY is not configured")
        }
    };

    // 4. Start HTTP server (runs until ctrl-c, drains in-flight requests)
    let server = HttpServer::new(
        HttpServerConfig {
            host: http_host,
            port: http_port,
        },
        state,
    );

    server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server failed: {}", e))?;

    info!("Shutdown complete.");

    Ok(())
}
