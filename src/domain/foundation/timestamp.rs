//! UTC instants for history entries and call records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A UTC instant. Serializes as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Current time, raised to `floor` if the clock reads earlier.
    ///
    /// Appends to a session history use the previous entry as the floor, so
    /// entries stay in order if the wall clock steps backwards.
    pub fn now_not_before(floor: Option<&Timestamp>) -> Self {
        let now = Self::now();
        match floor {
            Some(floor) if *floor > now => *floor,
            _ => now,
        }
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Whole seconds elapsed since `earlier`, zero if `earlier` is later.
    pub fn whole_secs_since(&self, earlier: &Timestamp) -> u64 {
        u64::try_from(self.0.signed_duration_since(earlier.0).num_seconds()).unwrap_or(0)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.to_rfc3339())
    }
}
