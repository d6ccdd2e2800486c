//! Console speech adapters: typed lines in, printed lines out.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use crate::ports::{CaptureRequest, SpeechCapture, SpeechError, SpeechSynthesis};

/// Reads customer utterances from standard input.
///
/// A line not typed within the request timeout counts as silence. End of
/// input closes the capture.
pub struct StdinCapture {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl StdinCapture {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

impl Default for StdinCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechCapture for StdinCapture {
    async fn listen(&self, request: &CaptureRequest) -> Result<Option<String>, SpeechError> {
        let mut lines = self.lines.lock().await;
        match tokio::time::timeout(request.timeout, lines.next_line()).await {
            Err(_) => {
                tracing::debug!(call_id = %request.call_id, "no input before timeout");
                Ok(None)
            }
            Ok(Ok(Some(line))) => Ok(Some(line.trim().to_string())),
            Ok(Ok(None)) => Err(SpeechError::Closed),
            Ok(Err(e)) => Err(SpeechError::DeviceUnavailable(e.to_string())),
        }
    }
}

/// Prints agent lines to standard output.
#[derive(Debug, Default)]
pub struct ConsoleSynthesis;

#[async_trait]
impl SpeechSynthesis for ConsoleSynthesis {
    async fn speak(&self, text: &str, language: &str) -> Result<(), SpeechError> {
        let line = format!("[agent/{}] {}\n", language, text);
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(line.as_bytes())
            .await
            .map_err(|e| SpeechError::DeviceUnavailable(e.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|e| SpeechError::DeviceUnavailable(e.to_string()))
    }
}
