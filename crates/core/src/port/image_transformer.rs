// Image Transformer Port
// Abstraction over the deterministic imaging operations (decode, orient,
// resize, crop, composite, encode). Implementations may run CPU-bound work
// on a blocking thread pool.

use crate::domain::{EncodedImage, FocalStrategy};
use async_trait::async_trait;
use thiserror::Error;

/// Parameters for the pre-normalization step.
#[derive(Debug, Clone)]
pub struct NormalizeParams {
    /// Bounding box the image must fit within. Never enlarges.
    pub max_width: u32,
    pub max_height: u32,
    /// JPEG quality for the re-encoded intermediate (1..=100).
    pub jpeg_quality: u8,
}

/// Parameters for the final cover crop.
#[derive(Debug, Clone)]
pub struct CropParams {
    /// Exact output dimensions in pixels.
    pub width: u32,
    pub height: u32,
    pub focal: FocalStrategy,
    /// JPEG quality for the final encode (1..=100).
    pub jpeg_quality: u8,
}

/// Transform errors
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Undecodable image: {0}")]
    Decode(String),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("Imaging worker failed: {0}")]
    Worker(String),
}

impl TransformError {
    /// True when the source bytes themselves are at fault, so the failure
    /// should surface as invalid input rather than a server error.
    pub fn is_input_fault(&self) -> bool {
        matches!(
            self,
            TransformError::Decode(_) | TransformError::UnsupportedFormat(_)
        )
    }
}

/// Image Transformer trait
///
/// Implementations:
/// - ImagingBackend (infra-imaging): `image`-crate adapter
#[async_trait]
pub trait ImageTransformer: Send + Sync {
    /// Orient upright, downscale to fit the bounding box without enlarging,
    /// re-encode as JPEG.
    ///
    /// # Errors
    /// - TransformError::Decode / UnsupportedFormat if `bytes` is not a
    ///   decodable image
    /// - TransformError::Encode if re-encoding fails
    async fn normalize(
        &self,
        bytes: &[u8],
        params: &NormalizeParams,
    ) -> Result<EncodedImage, TransformError>;

    /// Resize to cover the exact target dimensions, crop the overflow with
    /// the given focal strategy, re-encode as JPEG.
    async fn cover_crop(
        &self,
        image: &EncodedImage,
        params: &CropParams,
    ) -> Result<EncodedImage, TransformError>;

    /// Composite the image centered on a solid-white canvas of its own
    /// dimensions (flattens any transparency), re-encode as JPEG.
    async fn composite_on_white(
        &self,
        image: &EncodedImage,
        jpeg_quality: u8,
    ) -> Result<EncodedImage, TransformError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Which operation the mock should fail (all others succeed).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MockFailure {
        Normalize,
        NormalizeDecode,
        CoverCrop,
        Composite,
    }

    /// Mock transformer producing stub images and recording operations.
    pub struct MockImageTransformer {
        failure: Option<MockFailure>,
        /// Dimensions "normalize" pretends the input had after downscaling.
        normalized_dims: (u32, u32),
        ops: Mutex<Vec<String>>,
    }

    impl MockImageTransformer {
        pub fn new() -> Self {
            Self {
                failure: None,
                normalized_dims: (1000, 800),
                ops: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(failure: MockFailure) -> Self {
            Self {
                failure: Some(failure),
                ..Self::new()
            }
        }

        pub fn operations(&self) -> Vec<String> {
            self.ops.lock().unwrap().clone()
        }

        fn record(&self, op: &str) {
            self.ops.lock().unwrap().push(op.to_string());
        }
    }

    impl Default for MockImageTransformer {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ImageTransformer for MockImageTransformer {
        async fn normalize(
            &self,
            _bytes: &[u8],
            _params: &NormalizeParams,
        ) -> Result<EncodedImage, TransformError> {
            self.record("normalize");
            match self.failure {
                Some(MockFailure::Normalize) => {
                    Err(TransformError::Encode("mock normalize failure".into()))
                }
                Some(MockFailure::NormalizeDecode) => {
                    Err(TransformError::Decode("mock decode failure".into()))
                }
                _ => Ok(EncodedImage {
                    bytes: b"normalized".to_vec(),
                    mime: "image/jpeg".to_string(),
                    width: self.normalized_dims.0,
                    height: self.normalized_dims.1,
                }),
            }
        }

        async fn cover_crop(
            &self,
            _image: &EncodedImage,
            params: &CropParams,
        ) -> Result<EncodedImage, TransformError> {
            self.record("cover_crop");
            if self.failure == Some(MockFailure::CoverCrop) {
                return Err(TransformError::Encode("mock crop failure".into()));
            }
            Ok(EncodedImage {
                bytes: b"cropped".to_vec(),
                mime: "image/jpeg".to_string(),
                width: params.width,
                height: params.height,
            })
        }

        async fn composite_on_white(
            &self,
            image: &EncodedImage,
            _jpeg_quality: u8,
        ) -> Result<EncodedImage, TransformError> {
            self.record("composite_on_white");
            if self.failure == Some(MockFailure::Composite) {
                return Err(TransformError::Encode("mock composite failure".into()));
            }
            Ok(EncodedImage {
                bytes: b"composite".to_vec(),
                mime: "image/jpeg".to_string(),
                width: image.width,
                height: image.height,
            })
        }
    }
}
