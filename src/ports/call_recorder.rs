//! Call Recorder Port - Interface for persisting calls and transcripts.
//!
//! The recorder is write-only from the core's side: records are upserted
//! or appended, never read back during a call.

use async_trait::async_trait;

use crate::domain::call::{CallRecord, TranscriptRecord};

/// Errors that can occur while recording
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RecorderError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Recorder unavailable: {0}")]
    Unavailable(String),
}

/// Port for durable storage of call records
#[async_trait]
pub trait CallRecorder: Send + Sync {
    /// Insert or update the summary row for a call.
    ///
    /// # Errors
    /// Returns `RecorderError` if the write fails
    async fn record_call(&self, call: &CallRecord) -> Result<(), RecorderError>;

    /// Append one transcript line.
    ///
    /// # Errors
    /// Returns `RecorderError` if the write fails
    async fn record_transcript(&self, line: &TranscriptRecord) -> Result<(), RecorderError>;
}
