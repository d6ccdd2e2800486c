//! In-Memory Call Recorder Adapter
//!
//! Keeps call rows and transcript lines in memory.
//! Used when no database is configured, and in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::call::{CallRecord, TranscriptRecord};
use crate::domain::foundation::CallId;
use crate::ports::{CallRecorder, RecorderError};

/// In-memory storage for call records
#[derive(Debug, Clone, Default)]
pub struct InMemoryCallRecorder {
    calls: Arc<RwLock<HashMap<CallId, CallRecord>>>,
    transcripts: Arc<RwLock<Vec<TranscriptRecord>>>,
}

impl InMemoryCallRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest row written for a call
    pub async fn call(&self, call_id: CallId) -> Option<CallRecord> {
        self.calls.read().await.get(&call_id).cloned()
    }

    /// Number of distinct calls recorded
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Transcript lines for a call, in write order
    pub async fn transcript(&self, call_id: CallId) -> Vec<TranscriptRecord> {
        self.transcripts
            .read()
            .await
            .iter()
            .filter(|line| line.call_id == call_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CallRecorder for InMemoryCallRecorder {
    async fn record_call(&self, call: &CallRecord) -> Result<(), RecorderError> {
        let mut calls = self.calls.write().await;
        calls.insert(call.call_id, call.clone());
        Ok(())
    }

    async fn record_transcript(&self, line: &TranscriptRecord) -> Result<(), RecorderError> {
        let mut transcripts = self.transcripts.write().await;
        transcripts.push(line.clone());
        Ok(())
    }
}
