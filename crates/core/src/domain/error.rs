// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Empty image payload")]
    EmptyImage,

    #[error("Invalid photo spec: {0}")]
    InvalidSpec(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
