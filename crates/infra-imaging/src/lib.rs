//! Imaging adapter for the idphoto pipeline.
//!
//! Implements the `ImageTransformer` port on the pure-Rust `image` crate:
//! decode (JPEG/PNG/WebP) with EXIF orientation applied, Lanczos3 downscale,
//! cover + focal crop, white-canvas compositing and JPEG encoding. All
//! CPU-bound work runs on the tokio blocking pool.

mod backend;
mod ops;
mod saliency;

pub use backend::ImagingBackend;
