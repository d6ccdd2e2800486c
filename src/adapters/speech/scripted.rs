//! Scripted speech adapters.
//!
//! Capture replays a fixed list of utterances and synthesis remembers what
//! it was asked to say. Deterministic, so call flows can be asserted end to
//! end without audio.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::ports::{CaptureRequest, SpeechCapture, SpeechError, SpeechSynthesis};

/// Capture that hands out queued results in order.
///
/// Once the queue is drained every listen fails with [`SpeechError::Closed`],
/// which hosts read as the customer hanging up.
#[derive(Debug, Clone, Default)]
pub struct ScriptedCapture {
    queue: Arc<Mutex<VecDeque<Result<Option<String>, SpeechError>>>>,
    requests: Arc<Mutex<Vec<CaptureRequest>>>,
}

impl ScriptedCapture {
    /// Capture that will "hear" each utterance once. Empty strings model
    /// silence.
    pub fn new<I, S>(utterances: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue = utterances
            .into_iter()
            .map(|u| {
                let text: String = u.into();
                Ok(if text.is_empty() { None } else { Some(text) })
            })
            .collect();
        Self {
            queue: Arc::new(Mutex::new(queue)),
            requests: Arc::default(),
        }
    }

    /// Queue a failure after the current entries.
    pub async fn push_error(&self, error: SpeechError) {
        self.queue.lock().await.push_back(Err(error));
    }

    /// Requests seen so far (for test assertions).
    pub async fn requests(&self) -> Vec<CaptureRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn remaining(&self) -> usize {
        self.queue.lock().await.len()
    }
}

#[async_trait]
impl SpeechCapture for ScriptedCapture {
    async fn listen(&self, request: &CaptureRequest) -> Result<Option<String>, SpeechError> {
        self.requests.lock().await.push(request.clone());
        self.queue
            .lock()
            .await
            .pop_front()
            .unwrap_or(Err(SpeechError::Closed))
    }
}

/// Synthesis that records spoken lines instead of playing them.
#[derive(Debug, Clone, Default)]
pub struct RecordingSynthesis {
    spoken: Arc<Mutex<Vec<(String, String)>>>,
    failing: bool,
}

impl RecordingSynthesis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synthesis whose every call fails, for exercising host tolerance.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Lines spoken so far, without their language tags.
    pub async fn spoken(&self) -> Vec<String> {
        self.spoken
            .lock()
            .await
            .iter()
            .map(|(text, _)| text.clone())
            .collect()
    }
}

#[async_trait]
impl SpeechSynthesis for RecordingSynthesis {
    async fn speak(&self, text: &str, language: &str) -> Result<(), SpeechError> {
        if self.failing {
            return Err(SpeechError::DeviceUnavailable("speaker offline".to_string()));
        }
        self.spoken
            .lock()
            .await
            .push((text.to_string(), language.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::CallId;
    use std::time::Duration;

    fn request() -> CaptureRequest {
        CaptureRequest {
            call_id: CallId::new(),
            language: "en-IN".to_string(),
            timeout: Duration::from_secs(5),
            phrase_time_limit: Duration::from_secs(10),
        }
    }

    #[tokio::test]
    async fn replays_in_order_then_closes() {
        let capture = ScriptedCapture::new(["hello", "", "my salary is 40000"]);

        assert_eq!(capture.listen(&request()).await, Ok(Some("hello".to_string())));
        assert_eq!(capture.listen(&request()).await, Ok(None));
        assert_eq!(
            capture.listen(&request()).await,
            Ok(Some("my salary is 40000".to_string()))
        );
        assert_eq!(capture.listen(&request()).await, Err(SpeechError::Closed));
        assert_eq!(capture.requests().await.len(), 4);
    }

    #[tokio::test]
    async fn queued_error_is_returned() {
        let capture = ScriptedCapture::new(Vec::<String>::new());
        capture
            .push_error(SpeechError::Recognition("timeout".into()))
            .await;
        assert!(matches!(
            capture.listen(&request()).await,
            Err(SpeechError::Recognition(_))
        ));
    }

    #[tokio::test]
    async fn synthesis_records_lines() {
        let synthesis = RecordingSynthesis::new();
        synthesis.speak("Namaste", "hi-IN").await.unwrap();
        assert_eq!(synthesis.spoken().await, vec!["Namaste".to_string()]);

        assert!(RecordingSynthesis::failing().speak("x", "en-IN").await.is_err());
    }
}
