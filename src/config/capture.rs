//! Speech capture timing

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Listen timing and the silence budget for a call.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptureConfig {
    /// Seconds to wait for the customer to start speaking
    #[serde(default = "default_listen_timeout")]
    pub listen_timeout_secs: u64,

    /// Longest accepted phrase in seconds
    #[serde(default = "default_phrase_time_limit")]
    pub phrase_time_limit_secs: u64,

    /// Consecutive silent listens before the host gives up on the call
    #[serde(default = "default_max_silent_turns")]
    pub max_silent_turns: u32,
}

impl CaptureConfig {
    pub fn listen_timeout(&self) -> Duration {
        Duration::from_secs(self.listen_timeout_secs)
    }

    pub fn phrase_time_limit(&self) -> Duration {
        Duration::from_secs(self.phrase_time_limit_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.listen_timeout_secs == 0 || self.phrase_time_limit_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.max_silent_turns == 0 {
            return Err(ValidationError::InvalidSilentTurns);
        }
        Ok(())
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            listen_timeout_secs: default_listen_timeout(),
            phrase_time_limit_secs: default_phrase_time_limit(),
            max_silent_turns: default_max_silent_turns(),
        }
    }
}

fn default_listen_timeout() -> u64 {
    5
}

fn default_phrase_time_limit() -> u64 {
    10
}

fn default_max_silent_turns() -> u32 {
    3
}
