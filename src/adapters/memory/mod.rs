//! In-memory adapters for development and tests.

mod call_recorder;

pub use call_recorder::InMemoryCallRecorder;
