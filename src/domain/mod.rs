//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `dialogue` - Script tables, objection handling and the dialogue engine
//! - `call` - Call status, outcome and persistence records

pub mod call;
pub mod dialogue;
pub mod foundation;
