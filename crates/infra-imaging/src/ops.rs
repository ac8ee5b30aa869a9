//! Synchronous imaging operations.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image` crate (pure Rust decoders) |
//! | Orientation | `ImageDecoder::orientation` + `DynamicImage::apply_orientation` |
//! | Downscale / cover resize | `image::imageops` with `Lanczos3` filter |
//! | Focal crop | `saliency::attention_origin` + `DynamicImage::crop_imm` |
//! | Composite | `image::imageops::overlay` on a white canvas |
//! | Encode | `image::codecs::jpeg::JpegEncoder` |

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{
    DynamicImage, ExtendedColorType, ImageDecoder, ImageEncoder, ImageReader, Rgba, RgbaImage,
};

use idphoto_core::domain::{EncodedImage, FocalStrategy};
use idphoto_core::port::image_transformer::{CropParams, NormalizeParams, TransformError};

use crate::saliency;

const JPEG_MIME: &str = "image/jpeg";

/// Decode with a guessed container format and EXIF orientation applied.
fn decode_oriented(bytes: &[u8]) -> Result<DynamicImage, TransformError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| TransformError::Decode(e.to_string()))?;
    if reader.format().is_none() {
        return Err(TransformError::UnsupportedFormat(
            "unrecognized image container".to_string(),
        ));
    }
    let mut decoder = reader
        .into_decoder()
        .map_err(|e| TransformError::Decode(e.to_string()))?;
    // Orientation metadata is advisory; a missing or broken EXIF block must
    // not fail the decode.
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut img = DynamicImage::from_decoder(decoder)
        .map_err(|e| TransformError::Decode(e.to_string()))?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// JPEG carries no alpha; flatten transparency onto white before encoding
/// so see-through regions do not decay into arbitrary channel values.
fn flatten_to_rgb(img: &DynamicImage) -> image::RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }
    let fg = img.to_rgba8();
    let mut canvas = RgbaImage::from_pixel(fg.width(), fg.height(), Rgba([255, 255, 255, 255]));
    image::imageops::overlay(&mut canvas, &fg, 0, 0);
    DynamicImage::ImageRgba8(canvas).to_rgb8()
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<EncodedImage, TransformError> {
    let rgb = flatten_to_rgb(img);
    let (width, height) = rgb.dimensions();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut Cursor::new(&mut out), quality)
        .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| TransformError::Encode(e.to_string()))?;
    Ok(EncodedImage {
        bytes: out,
        mime: JPEG_MIME.to_string(),
        width,
        height,
    })
}

/// Orient upright, downscale to fit the bounding box (never enlarging),
/// re-encode as JPEG.
pub(crate) fn normalize(
    bytes: &[u8],
    params: &NormalizeParams,
) -> Result<EncodedImage, TransformError> {
    let img = decode_oriented(bytes)?;
    let img = if img.width() > params.max_width || img.height() > params.max_height {
        img.resize(params.max_width, params.max_height, FilterType::Lanczos3)
    } else {
        img
    };
    encode_jpeg(&img, params.jpeg_quality)
}

/// Resize to cover the exact target, crop the overflow with the focal
/// strategy, re-encode as JPEG.
pub(crate) fn cover_crop(bytes: &[u8], params: &CropParams) -> Result<EncodedImage, TransformError> {
    if params.width == 0 || params.height == 0 {
        return Err(TransformError::Encode(
            "zero-sized crop target".to_string(),
        ));
    }
    let img = decode_oriented(bytes)?;
    let (w, h) = (img.width(), img.height());
    let (tw, th) = (params.width, params.height);

    // Cover scale: one axis lands exactly on the target, the other
    // overflows and is cropped away.
    let scale = f64::max(tw as f64 / w as f64, th as f64 / h as f64);
    let sw = ((w as f64 * scale).round() as u32).max(tw);
    let sh = ((h as f64 * scale).round() as u32).max(th);
    let resized = if (sw, sh) == (w, h) {
        img
    } else {
        img.resize_exact(sw, sh, FilterType::Lanczos3)
    };

    let (ox, oy) = match params.focal {
        FocalStrategy::Center => ((sw - tw) / 2, (sh - th) / 2),
        FocalStrategy::Attention => saliency::attention_origin(&resized.to_luma8(), tw, th),
    };
    let cropped = resized.crop_imm(ox, oy, tw, th);
    encode_jpeg(&cropped, params.jpeg_quality)
}

/// Composite centered on a solid-white canvas of the image's own dimensions.
/// Flattens any transparency; output is always JPEG.
pub(crate) fn composite_on_white(
    bytes: &[u8],
    jpeg_quality: u8,
) -> Result<EncodedImage, TransformError> {
    let img = decode_oriented(bytes)?;
    let fg = img.to_rgba8();
    let (cw, ch) = (fg.width(), fg.height());

    let mut canvas = RgbaImage::from_pixel(cw, ch, Rgba([255, 255, 255, 255]));
    let ox = i64::from(cw.saturating_sub(fg.width()) / 2);
    let oy = i64::from(ch.saturating_sub(fg.height()) / 2);
    image::imageops::overlay(&mut canvas, &fg, ox, oy);

    encode_jpeg(&DynamicImage::ImageRgba8(canvas), jpeg_quality)
}
