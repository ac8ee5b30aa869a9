// Background Editor Port
// Abstraction for the generative background-replacement collaborator.
// One network call per invocation; the caller owns retries.

use crate::domain::EncodedImage;
use async_trait::async_trait;
use thiserror::Error;

/// Edit errors. All variants except `Disabled` are transient from the
/// pipeline's point of view: the retry loop treats them uniformly.
#[derive(Error, Debug)]
pub enum EditError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("No image payload in response")]
    NoImagePayload,

    #[error("Response payload not decodable as an image: {0}")]
    UndecodablePayload(String),

    #[error("Background editing disabled")]
    Disabled,
}

/// Background Editor trait
///
/// Implementations:
/// - GeminiBackgroundEditor (infra-gemini): generateContent over HTTPS
/// - DisabledBackgroundEditor: always reports `Disabled` (no-key operation)
#[async_trait]
pub trait BackgroundEditor: Send + Sync {
    /// Ask the collaborator to replace the background of `image` according
    /// to the natural-language `instruction`. Returns the edited image on
    /// success.
    ///
    /// # Errors
    /// - EditError::Transport if the request never completed
    /// - EditError::Api if the service answered with a failure status
    /// - EditError::NoImagePayload / UndecodablePayload if the response
    ///   carried nothing usable
    async fn replace_background(
        &self,
        image: &EncodedImage,
        instruction: &str,
    ) -> Result<EncodedImage, EditError>;
}

/// Editor stand-in for running without an API credential. The pipeline
/// skips straight to the composite fallback when it sees `Disabled`.
pub struct DisabledBackgroundEditor;

#[async_trait]
impl BackgroundEditor for DisabledBackgroundEditor {
    async fn replace_background(
        &self,
        _image: &EncodedImage,
        _instruction: &str,
    ) -> Result<EncodedImage, EditError> {
        Err(EditError::Disabled)
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted editor behavior for one attempt.
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Return an edited image.
        Succeed,
        /// Fail with a transport error.
        FailTransport(String),
        /// Fail with "no image payload found".
        FailNoImage,
        /// Report the editor as disabled.
        Disabled,
    }

    /// Mock editor replaying a script of per-attempt behaviors.
    ///
    /// When the script runs out, `fallback` repeats forever. Call counts are
    /// observable so tests can assert exactly how many attempts were made.
    pub struct MockBackgroundEditor {
        script: Mutex<VecDeque<MockBehavior>>,
        fallback: MockBehavior,
        call_count: Mutex<usize>,
    }

    impl MockBackgroundEditor {
        pub fn new(fallback: MockBehavior) -> Self {
            Self {
                script: Mutex::new(VecDeque::new()),
                fallback,
                call_count: Mutex::new(0),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockBehavior::Succeed)
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::FailTransport(message.into()))
        }

        /// Play `script` first, then fall back to `fallback`.
        pub fn with_script(script: Vec<MockBehavior>, fallback: MockBehavior) -> Self {
            Self {
                script: Mutex::new(script.into()),
                fallback,
                call_count: Mutex::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl BackgroundEditor for MockBackgroundEditor {
        async fn replace_background(
            &self,
            image: &EncodedImage,
            _instruction: &str,
        ) -> Result<EncodedImage, EditError> {
            *self.call_count.lock().unwrap() += 1;

            let behavior = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone());

            match behavior {
                MockBehavior::Succeed => Ok(EncodedImage {
                    bytes: b"edited".to_vec(),
                    mime: "image/jpeg".to_string(),
                    width: image.width,
                    height: image.height,
                }),
                MockBehavior::FailTransport(msg) => Err(EditError::Transport(msg)),
                MockBehavior::FailNoImage => Err(EditError::NoImagePayload),
                MockBehavior::Disabled => Err(EditError::Disabled),
            }
        }
    }
}
