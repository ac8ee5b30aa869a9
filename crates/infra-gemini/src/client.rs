// Gemini background editor
// One generateContent call per invocation; the pipeline owns retries.

use std::io::Cursor;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};
use tracing::{debug, warn};

use idphoto_core::domain::EncodedImage;
use idphoto_core::port::background_editor::{BackgroundEditor, EditError};
use idphoto_core::{AppError, Result};

use crate::config::GeminiConfig;
use crate::response::{extract_image_payload, ExtractedPayload};

/// Longest API error body excerpt carried into an `EditError`.
const ERROR_BODY_EXCERPT: usize = 512;

/// Background editor over the Gemini generateContent API.
pub struct GeminiBackgroundEditor {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiBackgroundEditor {
    /// Build the editor and its shared HTTP client.
    ///
    /// # Errors
    /// - AppError::Config if the TLS/connection stack cannot be initialized
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Config(format!("HTTP client init failed: {e}")))?;
        Ok(Self { config, http })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base, self.config.model
        )
    }

    fn build_payload(&self, image: &EncodedImage, instruction: &str) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": instruction },
                    {
                        "inlineData": {
                            "mimeType": image.mime,
                            "data": BASE64.encode(&image.bytes),
                        }
                    }
                ]
            }],
            "generationConfig": {
                "responseModalities": ["IMAGE"],
            }
        })
    }
}

#[async_trait]
impl BackgroundEditor for GeminiBackgroundEditor {
    async fn replace_background(
        &self,
        image: &EncodedImage,
        instruction: &str,
    ) -> std::result::Result<EncodedImage, EditError> {
        let endpoint = self.endpoint();
        debug!(model = %self.config.model, "Sending background edit request");

        let response = self
            .http
            .post(&endpoint)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&self.build_payload(image, instruction))
            .send()
            .await
            .map_err(|e| EditError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Gemini answered with a failure status");
            return Err(EditError::Api {
                status: status.as_u16(),
                message: excerpt(&body, ERROR_BODY_EXCERPT),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| EditError::Transport(format!("response body read failed: {e}")))?;

        let (bytes, declared_mime) = match extract_image_payload(&body) {
            ExtractedPayload::InlineData { bytes, mime } => (bytes, mime),
            ExtractedPayload::DataUriText { bytes, mime } => (bytes, Some(mime)),
            ExtractedPayload::BareBase64 { bytes } => (bytes, None),
            ExtractedPayload::Nothing => return Err(EditError::NoImagePayload),
        };

        // The pipeline only accepts decodable images; probe the header now so
        // a garbage payload counts as a failed attempt, not a crash later.
        let (width, height) =
            probe_dimensions(&bytes).map_err(EditError::UndecodablePayload)?;

        debug!(width = %width, height = %height, "Gemini returned an edited image");

        Ok(EncodedImage {
            bytes,
            mime: declared_mime.unwrap_or_else(|| "image/png".to_string()),
            width,
            height,
        })
    }
}

/// Cheap header-only decode to validate the payload and learn its size.
fn probe_dimensions(bytes: &[u8]) -> std::result::Result<(u32, u32), String> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| e.to_string())?
        .into_dimensions()
        .map_err(|e| e.to_string())
}

fn excerpt(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
