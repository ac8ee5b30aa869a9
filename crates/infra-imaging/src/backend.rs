// ImageTransformer adapter over the `image` crate.
// Thin async shell: every operation clones its inputs onto the tokio
// blocking pool and runs the sync code in `ops`.

use async_trait::async_trait;

use idphoto_core::domain::EncodedImage;
use idphoto_core::port::image_transformer::{
    CropParams, ImageTransformer, NormalizeParams, TransformError,
};

use crate::ops;

/// Pure-Rust imaging backend. Stateless; one instance serves all requests.
pub struct ImagingBackend;

impl ImagingBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImagingBackend {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_blocking<T, F>(op: F) -> Result<T, TransformError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, TransformError> + Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| TransformError::Worker(e.to_string()))?
}

#[async_trait]
impl ImageTransformer for ImagingBackend {
    async fn normalize(
        &self,
        bytes: &[u8],
        params: &NormalizeParams,
    ) -> Result<EncodedImage, TransformError> {
        let bytes = bytes.to_vec();
        let params = params.clone();
        run_blocking(move || ops::normalize(&bytes, &params)).await
    }

    async fn cover_crop(
        &self,
        image: &EncodedImage,
        params: &CropParams,
    ) -> Result<EncodedImage, TransformError> {
        let bytes = image.bytes.clone();
        let params = params.clone();
        run_blocking(move || ops::cover_crop(&bytes, &params)).await
    }

    async fn composite_on_white(
        &self,
        image: &EncodedImage,
        jpeg_quality: u8,
    ) -> Result<EncodedImage, TransformError> {
        let bytes = image.bytes.clone();
        run_blocking(move || ops::composite_on_white(&bytes, jpeg_quality)).await
    }
}
