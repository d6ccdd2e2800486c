//! Speech Capture Port - Interface for turning customer audio into text.
//!
//! The engine only ever sees transcribed text. Implementations own the
//! microphone or telephony leg and any speech-to-text service behind it.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::foundation::CallId;

/// Errors that can occur while listening
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SpeechError {
    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Recognition service failed: {0}")]
    Recognition(String),

    #[error("Speech input closed")]
    Closed,
}

/// Parameters for one listen attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub call_id: CallId,
    /// BCP 47 tag passed to the recognizer, e.g. `en-IN`.
    pub language: String,
    /// How long to wait for the customer to start speaking.
    pub timeout: Duration,
    /// Longest single phrase accepted.
    pub phrase_time_limit: Duration,
}

/// Port for capturing one customer utterance
#[async_trait]
pub trait SpeechCapture: Send + Sync {
    /// Listen for one utterance.
    ///
    /// # Returns
    /// `Ok(None)` (or an empty string) when nothing intelligible was heard
    /// before the timeout.
    ///
    /// # Errors
    /// Returns `SpeechError` when the capture device or service fails
    async fn listen(&self, request: &CaptureRequest) -> Result<Option<String>, SpeechError>;
}
