//! Dialogue module.
//!
//! The scripted conversation engine: static script tables, objection
//! interception, slot extraction, template rendering and the per-call
//! session they operate on.

mod catalog;
mod engine;
mod extractor;
mod handlers;
mod objections;
mod renderer;
mod script;
mod session;
mod slots;
mod state;
mod transitions;

pub use catalog::ScriptCatalog;
pub use engine::{DialogueEngine, TurnOutcome};
pub use extractor::{
    contains_any, decimal_digit, normalize_utterance, parse_amount, ExtractionError, SlotExtractor,
};
pub use handlers::{
    AdvanceHandler, BenefitsHandler, EmploymentHandler, HandlerRegistry, ObjectionResumeHandler,
    PersonalDetailsHandler, Reply, SalaryHandler, StateHandler, Turn,
};
pub use objections::{ObjectionDetector, ObjectionId, ObjectionRule, ObjectionTable};
pub use renderer::{reference_defaults, MessageRenderer, RenderContext, RenderError};
pub use script::{FallbackMessages, Script, ScriptError, ScriptParts};
pub use session::{CallClosure, DialogueSession, HistoryEntry, Speaker};
pub use slots::{FilledSlot, Slot, SlotMap, SlotValue};
pub use state::DialogueState;
pub use transitions::TransitionTable;
