//! Call Script - Scripted outbound sales dialogue engine
//!
//! Drives a fixed sales script turn by turn: objections are intercepted
//! before normal flow, a few slots are pulled out of customer replies, and
//! agent lines are rendered from templates. Speech and persistence sit
//! behind ports so the engine itself stays synchronous and I/O free.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
