// Domain Layer - Pure business logic and entities

pub mod error;
pub mod photo;

// Re-exports
pub use error::DomainError;
pub use photo::{
    BackgroundSource, EncodedImage, FocalStrategy, PhotoArtifact, PhotoSpec, SourceImage,
};
