// Photo Pipeline Orchestrator
// Sequencing: pre-normalize -> background edit (retried) -> fallback
// composite -> final cover crop. Owns the retry policy and the fallback
// decision; absorbs all editor flakiness.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::constants::*;
use crate::application::retry::{RetryDecision, RetryPolicy};
use crate::domain::{
    BackgroundSource, EncodedImage, FocalStrategy, PhotoArtifact, PhotoSpec, SourceImage,
};
use crate::error::{AppError, Result};
use crate::port::background_editor::EditError;
use crate::port::image_transformer::{CropParams, NormalizeParams};
use crate::port::{BackgroundEditor, ImageTransformer, TimeProvider};

/// Tunable knobs of a pipeline instance. Immutable for the lifetime of a
/// request; one instance is shared across all requests.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub spec: PhotoSpec,
    pub normalize_max_edge: u32,
    pub normalize_quality: u8,
    pub final_quality: u8,
    pub focal: FocalStrategy,
    pub instruction: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            spec: PhotoSpec {
                width_mm: PHOTO_WIDTH_MM,
                height_mm: PHOTO_HEIGHT_MM,
                dpi: PHOTO_DPI,
            },
            normalize_max_edge: NORMALIZE_MAX_EDGE,
            normalize_quality: NORMALIZE_JPEG_QUALITY,
            final_quality: FINAL_JPEG_QUALITY,
            focal: FocalStrategy::Attention,
            instruction: DEFAULT_BACKGROUND_INSTRUCTION.to_string(),
        }
    }
}

/// Turns one uploaded image into one ID-photo-shaped image, tolerating
/// transient failure of the background editor.
pub struct PhotoPipeline {
    transformer: Arc<dyn ImageTransformer>,
    editor: Arc<dyn BackgroundEditor>,
    retry_policy: RetryPolicy,
    time_provider: Arc<dyn TimeProvider>,
    options: PipelineOptions,
}

impl PhotoPipeline {
    pub fn new(
        transformer: Arc<dyn ImageTransformer>,
        editor: Arc<dyn BackgroundEditor>,
        retry_policy: RetryPolicy,
        time_provider: Arc<dyn TimeProvider>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            transformer,
            editor,
            retry_policy,
            time_provider,
            options,
        }
    }

    /// Pipeline with the fixed product defaults (3 attempts, 2s backoff base,
    /// 35x45mm @ 300dpi).
    pub fn with_defaults(
        transformer: Arc<dyn ImageTransformer>,
        editor: Arc<dyn BackgroundEditor>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self::new(
            transformer,
            editor,
            RetryPolicy::new(MAX_EDIT_ATTEMPTS, EDIT_BACKOFF_BASE_MS),
            time_provider,
            PipelineOptions::default(),
        )
    }

    /// Run the whole pipeline for one upload.
    ///
    /// Only Step 1 (pre-normalize) and Step 3 (final crop) can fail the
    /// request; everything in between degrades.
    pub async fn generate(&self, source: SourceImage) -> Result<PhotoArtifact> {
        source.validate()?;
        let started = self.time_provider.now_millis();

        // Step 1: orient upright, downscale within bounds, re-encode.
        let normalize = NormalizeParams {
            max_width: self.options.normalize_max_edge,
            max_height: self.options.normalize_max_edge,
            jpeg_quality: self.options.normalize_quality,
        };
        let normalized = self
            .transformer
            .normalize(&source.bytes, &normalize)
            .await
            .map_err(|e| {
                if e.is_input_fault() {
                    AppError::InvalidInput(e.to_string())
                } else {
                    AppError::Preprocess(e)
                }
            })?;

        info!(
            width = %normalized.width,
            height = %normalized.height,
            "Upload pre-normalized"
        );

        // Step 2: background edit with retry, then fallback. Never fatal.
        let (subject, background) = self.replace_background(&normalized).await;

        // Step 3: cover + focal crop to the exact target pixel size.
        let crop = CropParams {
            width: self.options.spec.pixel_width(),
            height: self.options.spec.pixel_height(),
            focal: self.options.focal,
            jpeg_quality: self.options.final_quality,
        };
        let photo = self
            .transformer
            .cover_crop(&subject, &crop)
            .await
            .map_err(AppError::Crop)?;

        info!(
            width = %photo.width,
            height = %photo.height,
            background = %background,
            duration_ms = %(self.time_provider.now_millis() - started),
            "Photo generated"
        );

        Ok(PhotoArtifact {
            bytes: photo.bytes,
            mime: photo.mime,
            width: photo.width,
            height: photo.height,
            background,
        })
    }

    /// Attempt the generative edit up to the retry budget, then fall back to
    /// the local composite. Degrades to the pre-normalized bytes if even the
    /// composite fails - nothing past Step 1 throws from here.
    async fn replace_background(
        &self,
        normalized: &EncodedImage,
    ) -> (EncodedImage, BackgroundSource) {
        let mut attempt: u32 = 0;

        while attempt < self.retry_policy.max_attempts() {
            attempt += 1;

            match self
                .editor
                .replace_background(normalized, &self.options.instruction)
                .await
            {
                Ok(edited) => {
                    info!(attempt = %attempt, "Background replaced by editor");
                    return (edited, BackgroundSource::Edited);
                }
                Err(EditError::Disabled) => {
                    info!("Background editing disabled; using composite");
                    break;
                }
                Err(e) => match self.retry_policy.should_retry(attempt) {
                    RetryDecision::Retry(delay_ms) => {
                        warn!(
                            attempt = %attempt,
                            delay_ms = %delay_ms,
                            error = %e,
                            "Background edit attempt failed, retrying"
                        );
                        self.time_provider.sleep_ms(delay_ms).await;
                    }
                    RetryDecision::Exhausted => {
                        warn!(
                            attempt = %attempt,
                            error = %e,
                            "Background edit attempts exhausted, falling back to composite"
                        );
                        break;
                    }
                },
            }
        }

        match self
            .transformer
            .composite_on_white(normalized, self.options.normalize_quality)
            .await
        {
            Ok(composite) => (composite, BackgroundSource::Composite),
            Err(e) => {
                warn!(error = %e, "Fallback composite failed, passing original through");
                (normalized.clone(), BackgroundSource::Original)
            }
        }
    }
}
