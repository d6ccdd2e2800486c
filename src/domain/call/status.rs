//! Call lifecycle status and business outcome.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{StateMachine, ValidationError};

/// Connection-level status of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    #[default]
    InProgress,
    Completed,
    Failed,
    Busy,
    NotConnected,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Busy => "busy",
            Self::NotConnected => "not_connected",
        }
    }
}

impl StateMachine for CallStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        use CallStatus::*;
        match self {
            InProgress => vec![Completed, Failed, Busy, NotConnected],
            Completed | Failed | Busy | NotConnected => vec![],
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the customer decided, as judged by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    Interested,
    NotInterested,
    CallBack,
    /// Do not call.
    Dnc,
    #[default]
    Unknown,
}

impl CallOutcome {
    pub const ALL: [CallOutcome; 5] = [
        CallOutcome::Interested,
        CallOutcome::NotInterested,
        CallOutcome::CallBack,
        CallOutcome::Dnc,
        CallOutcome::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interested => "interested",
            Self::NotInterested => "not_interested",
            Self::CallBack => "call_back",
            Self::Dnc => "dnc",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallOutcome {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|o| o.as_str() == wanted)
            .ok_or_else(|| ValidationError::unknown("call_outcome", s))
    }
}
