//! Per-call mutable dialogue state.

use serde::{Deserialize, Serialize};

use super::renderer::RenderContext;
use super::slots::SlotMap;
use super::state::DialogueState;
use crate::domain::call::CallOutcome;
use crate::domain::foundation::{CallId, Timestamp};

/// Who said a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Agent,
    Customer,
}

impl Speaker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Customer => "customer",
        }
    }
}

/// One line of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub speaker: Speaker,
    pub text: String,
    /// State the session was in once the line was spoken.
    pub state: DialogueState,
    pub timestamp: Timestamp,
}

/// How and when an ended call was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallClosure {
    pub outcome: CallOutcome,
    pub ended_at: Timestamp,
}

/// Mutable state of a single scripted call.
///
/// # Invariants
///
/// - `history` is append-only with non-decreasing timestamps
/// - once `state` is `Ended` it never changes again
/// - `closure` is set at most once
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueSession {
    id: CallId,
    state: DialogueState,
    slots: SlotMap,
    customer_name: String,
    agent_name: String,
    language: String,
    history: Vec<HistoryEntry>,
    started_at: Timestamp,
    closure: Option<CallClosure>,
}

impl DialogueSession {
    /// Creates a fresh session in `Greeting` with empty history.
    pub(crate) fn new(
        customer_name: impl Into<String>,
        agent_name: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            id: CallId::new(),
            state: DialogueState::Greeting,
            slots: SlotMap::new(),
            customer_name: customer_name.into(),
            agent_name: agent_name.into(),
            language: language.into(),
            history: Vec::new(),
            started_at: Timestamp::now(),
            closure: None,
        }
    }

    // === Accessors ===

    pub fn id(&self) -> CallId {
        self.id
    }

    pub fn state(&self) -> DialogueState {
        self.state
    }

    pub fn slots(&self) -> &SlotMap {
        &self.slots
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn closure(&self) -> Option<&CallClosure> {
        self.closure.as_ref()
    }

    /// Returns true once the call has reached `Ended`.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Number of customer lines, empty ones included.
    pub fn customer_turns(&self) -> usize {
        self.history
            .iter()
            .filter(|e| e.speaker == Speaker::Customer)
            .count()
    }

    /// Values templates may reference.
    pub fn render_context(&self) -> RenderContext<'_> {
        RenderContext {
            customer_name: &self.customer_name,
            agent_name: &self.agent_name,
            slots: &self.slots,
        }
    }

    // === Mutation (engine only) ===

    pub(crate) fn slots_mut(&mut self) -> &mut SlotMap {
        &mut self.slots
    }

    pub(crate) fn set_state(&mut self, state: DialogueState) {
        if self.state.is_terminal() {
            return;
        }
        self.state = state;
    }

    /// Appends a line, stamped no earlier than the previous one.
    pub(crate) fn record(&mut self, speaker: Speaker, text: impl Into<String>) {
        let timestamp = Timestamp::now_not_before(self.history.last().map(|e| &e.timestamp));
        self.history.push(HistoryEntry {
            speaker,
            text: text.into(),
            state: self.state,
            timestamp,
        });
    }

    /// Marks the call over. Returns false if it was already closed.
    pub(crate) fn close(&mut self, outcome: CallOutcome) -> bool {
        if self.closure.is_some() {
            return false;
        }
        let ended_at = Timestamp::now_not_before(self.history.last().map(|e| &e.timestamp));
        self.state = DialogueState::Ended;
        self.closure = Some(CallClosure { outcome, ended_at });
        true
    }
}
