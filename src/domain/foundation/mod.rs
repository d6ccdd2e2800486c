//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types that the dialogue
//! and call modules build on.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{CallId, TranscriptId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
