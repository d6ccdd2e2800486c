//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the dialogue core and the outside world. Adapters implement these ports.
//!
//! ## Speech Ports
//!
//! - `SpeechCapture` - Customer audio in, transcribed text out
//! - `SpeechSynthesis` - Agent lines out as audio
//!
//! ## Persistence Ports
//!
//! - `CallRecorder` - Durable call and transcript records

mod call_recorder;
mod speech_capture;
mod speech_synthesis;

pub use call_recorder::{CallRecorder, RecorderError};
pub use speech_capture::{CaptureRequest, SpeechCapture, SpeechError};
pub use speech_synthesis::SpeechSynthesis;
