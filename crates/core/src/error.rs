// Central Error Type for the Application

use thiserror::Error;

use crate::port::image_transformer::TransformError;

/// Application-level error type.
///
/// Only truly fatal conditions live here: bad input, bad configuration, and
/// failures of the deterministic imaging steps. Generative-editor flakiness
/// never surfaces as an `AppError` - the pipeline absorbs it via retry and
/// fallback.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Preprocessing failed: {0}")]
    Preprocess(TransformError),

    #[error("Final crop failed: {0}")]
    Crop(TransformError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
