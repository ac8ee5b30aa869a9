//! HTTP API Layer
//!
//! Exposes the photo pipeline over REST: one multipart upload endpoint plus
//! a health probe. Maps application errors to HTTP statuses and shields the
//! billable pipeline behind a token-bucket rate limiter.

pub mod error;
pub mod handler;
pub mod rate_limiter;
pub mod server;
pub mod types;

pub use handler::AppState;
pub use server::{HttpServer, HttpServerConfig};
