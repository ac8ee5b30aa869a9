// Photo Domain Model

use serde::{Deserialize, Serialize};

use super::error::{DomainError, Result};

/// Millimetres per inch, for mm/DPI → pixel conversion.
const MM_PER_INCH: f64 = 25.4;

/// Raw upload as received from the caller. Never mutated.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub bytes: Vec<u8>,
    /// MIME type as declared by the uploader (not trusted for decoding).
    pub declared_mime: Option<String>,
}

impl SourceImage {
    pub fn new(bytes: Vec<u8>, declared_mime: Option<String>) -> Self {
        Self {
            bytes,
            declared_mime,
        }
    }

    /// Reject uploads that cannot possibly be an image.
    pub fn validate(&self) -> Result<()> {
        if self.bytes.is_empty() {
            return Err(DomainError::EmptyImage);
        }
        if let Some(mime) = &self.declared_mime {
            if !mime.starts_with("image/") {
                return Err(DomainError::Validation(format!(
                    "declared content type is not an image: {mime}"
                )));
            }
        }
        Ok(())
    }
}

/// Encoded image bytes plus the metadata every pipeline step needs.
/// The unit of exchange between steps and ports.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub width: u32,
    pub height: u32,
}

/// Physical target geometry. Pixel dimensions are derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhotoSpec {
    pub width_mm: f64,
    pub height_mm: f64,
    pub dpi: u32,
}

impl PhotoSpec {
    pub fn new(width_mm: f64, height_mm: f64, dpi: u32) -> Result<Self> {
        if width_mm <= 0.0 || height_mm <= 0.0 || dpi == 0 {
            return Err(DomainError::InvalidSpec(format!(
                "{width_mm}mm x {height_mm}mm @ {dpi}dpi"
            )));
        }
        Ok(Self {
            width_mm,
            height_mm,
            dpi,
        })
    }

    pub fn pixel_width(&self) -> u32 {
        mm_to_px(self.width_mm, self.dpi)
    }

    pub fn pixel_height(&self) -> u32 {
        mm_to_px(self.height_mm, self.dpi)
    }
}

fn mm_to_px(mm: f64, dpi: u32) -> u32 {
    (mm / MM_PER_INCH * dpi as f64).round() as u32
}

/// Crop placement strategy for the final cover crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FocalStrategy {
    /// Center the crop window.
    Center,
    /// Bias the crop window toward the most visually salient region.
    Attention,
}

/// Which path produced the background of the final photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackgroundSource {
    /// The generative editor returned a usable image.
    Edited,
    /// Editor exhausted; local white-canvas composite.
    Composite,
    /// Even the composite failed; pre-normalized bytes passed through.
    Original,
}

impl std::fmt::Display for BackgroundSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackgroundSource::Edited => write!(f, "EDITED"),
            BackgroundSource::Composite => write!(f, "COMPOSITE"),
            BackgroundSource::Original => write!(f, "ORIGINAL"),
        }
    }
}

/// Final pipeline output: one encoded photo plus provenance.
#[derive(Debug, Clone)]
pub struct PhotoArtifact {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub width: u32,
    pub height: u32,
    pub background: BackgroundSource,
}
