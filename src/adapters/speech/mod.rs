//! Speech adapters.
//!
//! - `ScriptedCapture` / `RecordingSynthesis` - Deterministic, for tests
//! - `StdinCapture` / `ConsoleSynthesis` - Terminal host

mod console;
mod scripted;

pub use console::{ConsoleSynthesis, StdinCapture};
pub use scripted::{RecordingSynthesis, ScriptedCapture};
