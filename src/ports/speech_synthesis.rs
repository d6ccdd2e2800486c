//! Speech Synthesis Port - Interface for speaking agent lines.

use async_trait::async_trait;

use super::SpeechError;

/// Port for text-to-speech playback
///
/// Playback is fire-and-forget from the dialogue's point of view: hosts log
/// failures and carry on with the call.
#[async_trait]
pub trait SpeechSynthesis: Send + Sync {
    /// Speak `text` in `language`.
    ///
    /// # Errors
    /// Returns `SpeechError` if playback could not be started
    async fn speak(&self, text: &str, language: &str) -> Result<(), SpeechError>;
}
