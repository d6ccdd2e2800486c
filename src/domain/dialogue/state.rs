//! Dialogue states of the scripted call.
//!
//! The state is only a tag. Which state follows which is decided by the
//! [`TransitionTable`](super::TransitionTable), and what happens inside a
//! state by the [`HandlerRegistry`](super::HandlerRegistry).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Where a call currently is in the sales script.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum DialogueState {
    /// Opening line, agent introduces themselves.
    #[default]
    Greeting,

    /// Declared in the state set but not wired into the reference script.
    IdentityConfirmation,

    /// Pitch of the overdraft facility.
    ScriptIntroduction,

    /// Disclosure that the call is recorded.
    RecordingNotice,

    /// Salaried or self-employed.
    EmploymentStatus,

    /// Net take-home salary.
    SalaryCollection,

    /// Limit, interest and repayment explanation.
    BenefitsExplanation,

    /// Sector, company, PAN, date of birth, pincode, designation.
    PersonalDetails,

    /// Agent checks the portal and sends a consent link.
    EligibilityCheck,

    /// Credit bureau pull disclosure.
    BureauConsent,

    /// Document checklist.
    DocumentRequirements,

    /// A canned rebuttal was just given.
    ObjectionHandling,

    /// Wrap-up and farewell.
    CallClosing,

    /// Terminal.
    Ended,
}

impl DialogueState {
    /// Every declared state, in script order.
    pub const ALL: [DialogueState; 14] = [
        DialogueState::Greeting,
        DialogueState::IdentityConfirmation,
        DialogueState::ScriptIntroduction,
        DialogueState::RecordingNotice,
        DialogueState::EmploymentStatus,
        DialogueState::SalaryCollection,
        DialogueState::BenefitsExplanation,
        DialogueState::PersonalDetails,
        DialogueState::EligibilityCheck,
        DialogueState::BureauConsent,
        DialogueState::DocumentRequirements,
        DialogueState::ObjectionHandling,
        DialogueState::CallClosing,
        DialogueState::Ended,
    ];

    /// Stable snake_case name, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::IdentityConfirmation => "identity_confirmation",
            Self::ScriptIntroduction => "script_introduction",
            Self::RecordingNotice => "recording_notice",
            Self::EmploymentStatus => "employment_status",
            Self::SalaryCollection => "salary_collection",
            Self::BenefitsExplanation => "benefits_explanation",
            Self::PersonalDetails => "personal_details",
            Self::EligibilityCheck => "eligibility_check",
            Self::BureauConsent => "bureau_consent",
            Self::DocumentRequirements => "document_requirements",
            Self::ObjectionHandling => "objection_handling",
            Self::CallClosing => "call_closing",
            Self::Ended => "ended",
        }
    }

    /// Short human label, suitable for dashboards and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Greeting => "Greeting",
            Self::IdentityConfirmation => "Identity confirmation",
            Self::ScriptIntroduction => "Introduction",
            Self::RecordingNotice => "Recording notice",
            Self::EmploymentStatus => "Employment",
            Self::SalaryCollection => "Salary",
            Self::BenefitsExplanation => "Benefits",
            Self::PersonalDetails => "Personal details",
            Self::EligibilityCheck => "Eligibility",
            Self::BureauConsent => "Bureau consent",
            Self::DocumentRequirements => "Documents",
            Self::ObjectionHandling => "Objection",
            Self::CallClosing => "Closing",
            Self::Ended => "Ended",
        }
    }

    /// Returns true once the call is over.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended)
    }
}

impl fmt::Display for DialogueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialogueState {
    type Err = ValidationError;

    /// Accepts `salary_collection` as well as `SALARY_COLLECTION`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == wanted)
            .ok_or_else(|| ValidationError::unknown("dialogue_state", s))
    }
}
