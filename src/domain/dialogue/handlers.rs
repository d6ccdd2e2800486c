//! Per-state turn handlers.
//!
//! A handler looks at one customer utterance, may fill slots, and decides
//! whether the call moves on. Where it moves to is never the handler's call:
//! the engine follows the script's default transition.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use super::script::Script;
use super::slots::{Slot, SlotMap, SlotValue};
use super::state::DialogueState;

/// One customer utterance as seen by a handler.
#[derive(Debug, Clone, Copy)]
pub struct Turn<'a> {
    /// State the session was in when the utterance arrived.
    pub state: DialogueState,
    pub raw: &'a str,
    /// Lowercased, trimmed form used for keyword matching.
    pub normalized: &'a str,
}

/// What a handler decided for a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Follow the default transition and prompt the next state.
    Advance,
    /// Stay put and say this template instead.
    Hold(String),
}

/// Behavior bound to a dialogue state.
pub trait StateHandler: Send + Sync + Debug {
    /// Handles one utterance in the handler's state.
    fn handle(&self, turn: &Turn<'_>, script: &Script, slots: &mut SlotMap) -> Reply;

    /// Template used after advancing into a state with no prompt of its own.
    fn fallback<'s>(&self, script: &'s Script) -> &'s str {
        &script.fallbacks().continuation
    }
}

/// Advances on anything, including silence.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdvanceHandler;

impl StateHandler for AdvanceHandler {
    fn handle(&self, _turn: &Turn<'_>, _script: &Script, _slots: &mut SlotMap) -> Reply {
        Reply::Advance
    }
}

/// Checks that the customer is salaried before moving on.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmploymentHandler;

impl StateHandler for EmploymentHandler {
    fn handle(&self, turn: &Turn<'_>, script: &Script, _slots: &mut SlotMap) -> Reply {
        if script.extractor().mentions_employment(turn.normalized) {
            Reply::Advance
        } else {
            Reply::Hold(script.fallbacks().employment_clarification.clone())
        }
    }
}

/// Collects the net monthly salary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SalaryHandler;

impl StateHandler for SalaryHandler {
    fn handle(&self, turn: &Turn<'_>, script: &Script, slots: &mut SlotMap) -> Reply {
        match script.extractor().salary(turn.raw) {
            Ok(amount) => {
                if let Err(err) = slots.fill(Slot::Salary, SlotValue::Amount(amount), turn.state) {
                    tracing::warn!(error = %err, "salary slot not updated");
                }
                Reply::Advance
            }
            Err(err) => {
                tracing::debug!(error = %err, "no salary in utterance");
                Reply::Hold(script.fallbacks().salary_clarification.clone())
            }
        }
    }
}

/// Waits for a positive reaction to the pitch.
#[derive(Debug, Clone, Copy, Default)]
pub struct BenefitsHandler;

impl StateHandler for BenefitsHandler {
    fn handle(&self, turn: &Turn<'_>, script: &Script, _slots: &mut SlotMap) -> Reply {
        if script.extractor().is_positive(turn.normalized) {
            Reply::Advance
        } else {
            Reply::Hold(script.fallbacks().benefits_clarification.clone())
        }
    }
}

/// Personal details are read out but not parsed field by field.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonalDetailsHandler;

impl StateHandler for PersonalDetailsHandler {
    fn handle(&self, _turn: &Turn<'_>, _script: &Script, _slots: &mut SlotMap) -> Reply {
        Reply::Advance
    }
}

/// Returns to the main flow after an objection was answered.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectionResumeHandler;

impl StateHandler for ObjectionResumeHandler {
    fn handle(&self, _turn: &Turn<'_>, _script: &Script, _slots: &mut SlotMap) -> Reply {
        Reply::Advance
    }

    fn fallback<'s>(&self, script: &'s Script) -> &'s str {
        &script.fallbacks().objection_resume
    }
}

/// State to handler lookup, with a catch-all for unbound states.
#[derive(Debug, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<DialogueState, Arc<dyn StateHandler>>,
    default: Arc<dyn StateHandler>,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::reference()
    }
}

impl HandlerRegistry {
    /// Registry where every state uses `default`.
    pub fn new(default: Arc<dyn StateHandler>) -> Self {
        Self {
            handlers: HashMap::new(),
            default,
        }
    }

    /// Handlers for the overdraft script.
    pub fn reference() -> Self {
        use DialogueState::*;

        Self::new(Arc::new(AdvanceHandler))
            .with_handler(EmploymentStatus, Arc::new(EmploymentHandler))
            .with_handler(SalaryCollection, Arc::new(SalaryHandler))
            .with_handler(BenefitsExplanation, Arc::new(BenefitsHandler))
            .with_handler(PersonalDetails, Arc::new(PersonalDetailsHandler))
            .with_handler(ObjectionHandling, Arc::new(ObjectionResumeHandler))
    }

    /// Binds (or rebinds) a state.
    pub fn with_handler(mut self, state: DialogueState, handler: Arc<dyn StateHandler>) -> Self {
        self.handlers.insert(state, handler);
        self
    }

    pub fn handler_for(&self, state: DialogueState) -> &dyn StateHandler {
        self.handlers
            .get(&state)
            .unwrap_or(&self.default)
            .as_ref()
    }
}
