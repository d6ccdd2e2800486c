//! Call module.
//!
//! Status, outcome and the records a host persists for each call.

mod record;
mod status;

pub use record::{transcript_since, CallRecord, TranscriptRecord};
pub use status::{CallOutcome, CallStatus};
