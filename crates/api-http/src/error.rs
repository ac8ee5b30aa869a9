//! HTTP Error Mapping
//!
//! Maps application errors to HTTP statuses. Only fatal conditions ever get
//! here - editor flakiness is absorbed inside the pipeline.

use axum::http::StatusCode;
use idphoto_core::error::AppError;

use crate::types::ErrorBody;

/// Convert an AppError to an HTTP status + JSON error body.
pub fn to_http_error(err: AppError) -> (StatusCode, ErrorBody) {
    match err {
        AppError::Domain(e) => (StatusCode::BAD_REQUEST, ErrorBody::new(e.to_string())),
        AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, ErrorBody::new(msg)),
        AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new(msg)),
        AppError::Preprocess(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody::with_details("Preprocessing failed", e.to_string()),
        ),
        AppError::Crop(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody::with_details("Final crop failed", e.to_string()),
        ),
        AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new(msg)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idphoto_core::domain::DomainError;
    use idphoto_core::port::image_transformer::TransformError;

    #[test]
    fn input_faults_map_to_400() {
        let (status, _) = to_http_error(AppError::InvalidInput("bad bytes".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = to_http_error(AppError::Domain(DomainError::EmptyImage));
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn server_faults_map_to_500_with_details() {
        let (status, body) = to_http_error(AppError::Preprocess(TransformError::Encode(
            "out of memory".into(),
        )));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Preprocessing failed");
        assert!(body.details.unwrap().contains("out of memory"));
    }

    #[test]
    fn config_faults_map_to_500() {
        let (status, body) = to_http_error(AppError::Config("GEMINI_API_KEY is not set".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.details.is_none());
    }
}
