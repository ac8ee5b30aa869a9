//! Gemini adapter for the idphoto pipeline.
//!
//! Implements the `BackgroundEditor` port against the Gemini
//! `generateContent` endpoint. One `reqwest::Client` per editor instance,
//! built once at startup and shared across requests; the pipeline owns all
//! retrying - this crate performs exactly one HTTP call per invocation.

mod client;
mod config;
mod response;

pub use client::GeminiBackgroundEditor;
pub use config::GeminiConfig;
pub use response::ExtractedPayload;
