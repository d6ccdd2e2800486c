//! Domain error types shared by the dialogue and call modules.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Rejected input when building a value object or parsing a name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be blank")]
    Blank { field: &'static str },

    #[error("Unknown {field} '{value}'")]
    Unknown { field: &'static str, value: String },
}

impl ValidationError {
    pub fn blank(field: &'static str) -> Self {
        Self::Blank { field }
    }

    /// A name that does not match any known variant of `field`.
    pub fn unknown(field: &'static str, value: impl Into<String>) -> Self {
        Self::Unknown {
            field,
            value: value.into(),
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            Self::Blank { field } | Self::Unknown { field, .. } => field,
        }
    }
}

/// Machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ValidationFailed,
    UnknownValue,

    InvalidStateTransition,
    CallAlreadyActive,
    SlotConflict,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::UnknownValue => "UNKNOWN_VALUE",
            Self::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            Self::CallAlreadyActive => "CALL_ALREADY_ACTIVE",
            Self::SlotConflict => "SLOT_CONFLICT",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain failure with a code, a human message and key/value context.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Input rejected at the application boundary, tagged with its field.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message).with_detail("field", field)
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details.get(key).map(String::as_str)
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let code = match &err {
            ValidationError::Blank { .. } => ErrorCode::ValidationFailed,
            ValidationError::Unknown { .. } => ErrorCode::UnknownValue,
        };
        DomainError::new(code, err.to_string()).with_detail("field", err.field())
    }
}
