//! HTTP Method Handlers
//!
//! Implements the business logic for each route with injected dependencies.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::{info, warn};
use uuid::Uuid;

use idphoto_core::application::PhotoPipeline;
use idphoto_core::domain::SourceImage;

use crate::error::to_http_error;
use crate::rate_limiter::RateLimiter;
use crate::types::{ErrorBody, GenerateResponse, HealthResponse};

/// Hard cap on the uploaded file size.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Multipart field carrying the upload.
const UPLOAD_FIELD: &str = "image";

/// Handler state with injected dependencies.
///
/// `pipeline` is `None` when the server booted without a usable editor
/// credential; every generate request then answers 500 before any
/// processing starts.
pub struct AppState {
    pipeline: Option<Arc<PhotoPipeline>>,
    config_error: String,
    rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(pipeline: Arc<PhotoPipeline>) -> Self {
        Self {
            pipeline: Some(pipeline),
            config_error: String::new(),
            rate_limiter: Self::limiter_from_env(),
        }
    }

    /// State for a server without a configured background editor.
    pub fn unconfigured(reason: impl Into<String>) -> Self {
        Self {
            pipeline: None,
            config_error: reason.into(),
            rate_limiter: Self::limiter_from_env(),
        }
    }

    /// State with an explicit rate limiter (tests and embedders).
    pub fn with_rate_limiter(pipeline: Arc<PhotoPipeline>, rate_limiter: RateLimiter) -> Self {
        Self {
            pipeline: Some(pipeline),
            config_error: String::new(),
            rate_limiter,
        }
    }

    // Default: 20 burst, 5 req/sec (configurable via env)
    fn limiter_from_env() -> RateLimiter {
        let max_burst: u32 = std::env::var("IDPHOTO_RATE_LIMIT_BURST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(20);

        let rate_per_sec: u32 = std::env::var("IDPHOTO_RATE_LIMIT_RATE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        RateLimiter::new(max_burst, rate_per_sec)
    }
}

/// POST /api/generate
pub async fn generate(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let request_id = Uuid::new_v4();

    // Rate limiting check (billable pipeline behind it)
    if !state.rate_limiter.check() {
        return error_response(
            StatusCode::TOO_MANY_REQUESTS,
            ErrorBody::new("Rate limit exceeded. Please slow down."),
        );
    }

    // Fail fast on a missing credential, before touching the upload
    let Some(pipeline) = &state.pipeline else {
        warn!(request_id = %request_id, reason = %state.config_error, "Generate refused");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody::new(state.config_error.clone()),
        );
    };

    let source = match read_upload(multipart).await {
        Ok(source) => source,
        Err(response) => return response,
    };

    info!(
        request_id = %request_id,
        bytes = source.bytes.len(),
        mime = ?source.declared_mime,
        "Upload received"
    );

    match pipeline.generate(source).await {
        Ok(artifact) => {
            info!(
                request_id = %request_id,
                background = %artifact.background,
                "Photo generated"
            );
            let image = format!(
                "data:{};base64,{}",
                artifact.mime,
                BASE64.encode(&artifact.bytes)
            );
            (StatusCode::OK, Json(GenerateResponse { image })).into_response()
        }
        Err(err) => {
            warn!(request_id = %request_id, error = %err, "Generate failed");
            let (status, body) = to_http_error(err);
            error_response(status, body)
        }
    }
}

/// Pull the `image` field out of the multipart body.
async fn read_upload(mut multipart: Multipart) -> Result<SourceImage, Response> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err(error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorBody::with_details("Malformed upload", e.to_string()),
                ));
            }
        };

        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let declared_mime = field.content_type().map(str::to_string);
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                return Err(error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorBody::with_details("Upload read failed", e.to_string()),
                ));
            }
        };

        if bytes.is_empty() {
            break; // same answer as a missing field
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                ErrorBody::new(format!("File too large (max {MAX_UPLOAD_BYTES} bytes)")),
            ));
        }

        return Ok(SourceImage::new(bytes.to_vec(), declared_mime));
    }

    Err(error_response(
        StatusCode::BAD_REQUEST,
        ErrorBody::new("No file"),
    ))
}

/// GET /healthz
pub async fn health() -> Response {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            version: idphoto_core::VERSION,
        }),
    )
        .into_response()
}

fn error_response(status: StatusCode, body: ErrorBody) -> Response {
    (status, Json(body)).into_response()
}
