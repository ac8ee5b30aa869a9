//! HTTP Request/Response Types

use serde::{Deserialize, Serialize};

/// POST /api/generate - success body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// `data:image/jpeg;base64,<...>` - ready for an `<img>` src or download
    pub image: String,
}

/// Error body for every non-2xx answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// GET /healthz
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
