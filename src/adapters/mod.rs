//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the dialogue core to external systems:
//! - `memory` - In-memory call recorder
//! - `postgres` - PostgreSQL call recorder
//! - `speech` - Scripted and console speech capture/synthesis

pub mod memory;
pub mod postgres;
pub mod speech;

pub use memory::InMemoryCallRecorder;
pub use postgres::PostgresCallRecorder;
pub use speech::{ConsoleSynthesis, RecordingSynthesis, ScriptedCapture, StdinCapture};
