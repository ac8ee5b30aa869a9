// Gemini client configuration
// Process-wide read-only values resolved once at startup.

use std::time::Duration;

/// Primary environment variable holding the API credential.
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
/// Accepted alternative (Google Cloud convention).
pub const ENV_API_KEY_ALT: &str = "GOOGLE_API_KEY";

const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 90;

/// Immutable configuration for the Gemini editor.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub request_timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Resolve the credential from the environment. Returns `None` when no
    /// key is configured - the caller decides whether that is fatal.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var(ENV_API_KEY)
            .or_else(|_| std::env::var(ENV_API_KEY_ALT))
            .ok()
            .filter(|k| !k.trim().is_empty())?;
        Some(Self::new(api_key))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

// Keep the credential out of debug output and logs.
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
