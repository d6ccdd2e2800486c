//! Persistence-facing projections of a dialogue session.
//!
//! The engine never reads these back; they are what the host hands to a
//! [`CallRecorder`](crate::ports::CallRecorder).

use serde::{Deserialize, Serialize};

use super::status::{CallOutcome, CallStatus};
use crate::domain::dialogue::{DialogueSession, DialogueState, HistoryEntry, Speaker};
use crate::domain::foundation::{CallId, DomainError, StateMachine, Timestamp, TranscriptId};

/// Summary row for one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    pub call_id: CallId,
    pub customer_name: String,
    pub agent_name: String,
    pub language: String,
    pub status: CallStatus,
    pub outcome: CallOutcome,
    pub final_state: DialogueState,
    pub customer_data: serde_json::Value,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
    pub duration_secs: Option<u64>,
}

impl CallRecord {
    /// Record for a call that has just been placed.
    pub fn opened(session: &DialogueSession) -> Self {
        Self {
            call_id: session.id(),
            customer_name: session.customer_name().to_string(),
            agent_name: session.agent_name().to_string(),
            language: session.language().to_string(),
            status: CallStatus::InProgress,
            outcome: CallOutcome::Unknown,
            final_state: session.state(),
            customer_data: session.slots().to_json(),
            start_time: session.started_at(),
            end_time: None,
            duration_secs: None,
        }
    }

    /// Moves the record to a finished status using the session's closure.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the record is already finished
    pub fn finish(&mut self, session: &DialogueSession, status: CallStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(status)?;

        let end_time = session
            .closure()
            .map(|c| c.ended_at)
            .unwrap_or_else(Timestamp::now);

        self.outcome = session.closure().map(|c| c.outcome).unwrap_or_default();
        self.final_state = session.state();
        self.customer_data = session.slots().to_json();
        self.end_time = Some(end_time);
        self.duration_secs = Some(end_time.whole_secs_since(&self.start_time));
        Ok(())
    }
}

/// One persisted line of a call transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub id: TranscriptId,
    pub call_id: CallId,
    /// Position within the call, starting at zero.
    pub sequence: u32,
    pub speaker: Speaker,
    pub text: String,
    pub state: DialogueState,
    pub timestamp: Timestamp,
}

impl TranscriptRecord {
    pub fn from_entry(call_id: CallId, sequence: u32, entry: &HistoryEntry) -> Self {
        Self {
            id: TranscriptId::new(),
            call_id,
            sequence,
            speaker: entry.speaker,
            text: entry.text.clone(),
            state: entry.state,
            timestamp: entry.timestamp,
        }
    }
}

/// Transcript records for history entries from `from` onwards.
pub fn transcript_since(session: &DialogueSession, from: usize) -> Vec<TranscriptRecord> {
    session
        .history()
        .iter()
        .enumerate()
        .skip(from)
        .map(|(i, entry)| TranscriptRecord::from_entry(session.id(), i as u32, entry))
        .collect()
}
