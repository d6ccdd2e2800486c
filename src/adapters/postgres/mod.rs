//! PostgreSQL adapters - Database implementations for persistence ports.
//!
//! - `PostgresCallRecorder` - Call summaries and transcripts

mod call_recorder;

use sqlx::migrate::Migrator;

pub use call_recorder::PostgresCallRecorder;

/// Schema migrations shipped with the crate.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");
