//! Application layer - Call hosting.
//!
//! Orchestrates the dialogue engine against the speech and recorder ports
//! and keeps track of calls in progress.

mod active_calls;
mod call_service;

pub use active_calls::{ActiveCalls, LiveCall, LiveCallHandle};
pub use call_service::{
    CallService, CallServiceError, CallSettings, EndCallCommand, Heard, StartCallCommand,
    StartCallResult,
};
