//! Objection table and detector.
//!
//! An objection is an utterance that must interrupt the script: resistance,
//! a question about pricing, abuse, or a bad line. Categories are checked in
//! table order and the first hit wins, so order is priority.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::extractor::normalize_utterance;
use crate::domain::foundation::ValidationError;

/// Declared objection categories, in reference priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectionId {
    NoNeed,
    ExistingLoan,
    InterestRate,
    NeedTime,
    CashWithdrawal,
    NoEmi,
    RecordingQuestion,
    CreditCard,
    ReducingBalance,
    ProcessingFee,
    InappropriateLanguage,
    UnclearVoice,
}

impl ObjectionId {
    /// Every category, in reference priority order.
    pub const ALL: [ObjectionId; 12] = [
        ObjectionId::NoNeed,
        ObjectionId::ExistingLoan,
        ObjectionId::InterestRate,
        ObjectionId::NeedTime,
        ObjectionId::CashWithdrawal,
        ObjectionId::NoEmi,
        ObjectionId::RecordingQuestion,
        ObjectionId::CreditCard,
        ObjectionId::ReducingBalance,
        ObjectionId::ProcessingFee,
        ObjectionId::InappropriateLanguage,
        ObjectionId::UnclearVoice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoNeed => "no_need",
            Self::ExistingLoan => "existing_loan",
            Self::InterestRate => "interest_rate",
            Self::NeedTime => "need_time",
            Self::CashWithdrawal => "cash_withdrawal",
            Self::NoEmi => "no_emi",
            Self::RecordingQuestion => "recording_question",
            Self::CreditCard => "credit_card",
            Self::ReducingBalance => "reducing_balance",
            Self::ProcessingFee => "processing_fee",
            Self::InappropriateLanguage => "inappropriate_language",
            Self::UnclearVoice => "unclear_voice",
        }
    }
}

impl fmt::Display for ObjectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectionId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| ValidationError::unknown("objection_id", s))
    }
}

/// One category: its trigger phrases and the canned rebuttal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectionRule {
    id: ObjectionId,
    triggers: Vec<String>,
    response: String,
}

impl ObjectionRule {
    /// Creates a rule. Triggers are normalized the same way utterances are.
    pub fn new<I, S>(id: ObjectionId, triggers: I, response: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            id,
            triggers: triggers
                .into_iter()
                .map(|t| normalize_utterance(t.as_ref()))
                .filter(|t| !t.is_empty())
                .collect(),
            response: response.into(),
        }
    }

    pub fn id(&self) -> ObjectionId {
        self.id
    }

    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    /// Substring match against an already-normalized utterance.
    pub fn matches(&self, normalized: &str) -> bool {
        self.triggers.iter().any(|t| normalized.contains(t.as_str()))
    }
}

/// Ordered objection categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectionTable {
    rules: Vec<ObjectionRule>,
}

impl ObjectionTable {
    pub fn new(rules: Vec<ObjectionRule>) -> Self {
        Self { rules }
    }

    /// Rules in priority order.
    pub fn rules(&self) -> &[ObjectionRule] {
        &self.rules
    }

    pub fn rule(&self, id: ObjectionId) -> Option<&ObjectionRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn response_for(&self, id: ObjectionId) -> Option<&str> {
        self.rule(id).map(ObjectionRule::response)
    }

    /// The English rebuttals used with the reference script.
    pub fn reference() -> Self {
        use ObjectionId::*;

        Self::new(vec![
            ObjectionRule::new(
                NoNeed,
                ["don't need", "not interested", "no need", "not required", "not necessary"],
                "An Overdraft Facility is a great financial backup. There is no EMI, and you only pay interest on the amount used.",
            ),
            ObjectionRule::new(
                ExistingLoan,
                ["already have", "existing loan", "ongoing loan", "current loan"],
                "You can balance transfer your loan for better interest rates.",
            ),
            ObjectionRule::new(
                InterestRate,
                ["rate of interest", "interest rate", "what is the rate"],
                "1.25% monthly, calculated on a reducing balance method.",
            ),
            ObjectionRule::new(
                NeedTime,
                ["think", "time", "discuss", "family", "later"],
                "Sure, but this offer is currently available for your profile. Can we call you back in the evening?",
            ),
            ObjectionRule::new(
                CashWithdrawal,
                ["withdraw cash", "cash withdrawal", "cash"],
                "Yes, you can transfer the Overdraft amount directly to your account.",
            ),
            ObjectionRule::new(
                NoEmi,
                ["emi", "monthly payment", "installment"],
                "There is no EMI in an Overdraft, only interest on the utilized amount.",
            ),
            ObjectionRule::new(
                RecordingQuestion,
                ["recording", "recorded", "why recording"],
                "This call is recorded for training and quality purposes to enhance our service.",
            ),
            ObjectionRule::new(
                CreditCard,
                ["credit card", "already have card"],
                "Credit card cash withdrawals have extra charges, whereas Overdrafts don't.",
            ),
            ObjectionRule::new(
                ReducingBalance,
                ["reducing balance", "how interest calculated"],
                "Interest is applied on the remaining balance after each repayment.",
            ),
            ObjectionRule::new(
                ProcessingFee,
                ["processing fee", "charges", "fees"],
                "Banks charge a one-time processing fee starting from 1%.",
            ),
            ObjectionRule::new(
                InappropriateLanguage,
                ["fuck", "shit", "damn", "bloody"],
                "Sir/Madam, I am here to assist you professionally. Please maintain a respectful conversation.",
            ),
            ObjectionRule::new(
                UnclearVoice,
                ["can't hear", "unclear", "speak louder", "network issue"],
                "Sir/Madam, I am unable to hear you properly. Could you please check your network or speak a bit louder?",
            ),
        ])
    }
}

/// Classifies utterances against an [`ObjectionTable`]. Pure.
#[derive(Debug, Clone, Copy)]
pub struct ObjectionDetector<'a> {
    table: &'a ObjectionTable,
}

impl<'a> ObjectionDetector<'a> {
    pub fn new(table: &'a ObjectionTable) -> Self {
        Self { table }
    }

    /// First matching rule in priority order, if any.
    pub fn detect(&self, utterance: &str) -> Option<&'a ObjectionRule> {
        let normalized = normalize_utterance(utterance);
        self.detect_normalized(&normalized)
    }

    /// Same as [`detect`](Self::detect) for text that is already normalized.
    pub fn detect_normalized(&self, normalized: &str) -> Option<&'a ObjectionRule> {
        if normalized.is_empty() {
            return None;
        }
        self.table.rules.iter().find(|rule| rule.matches(normalized))
    }

    /// Category id of the first matching rule.
    pub fn classify(&self, utterance: &str) -> Option<ObjectionId> {
        self.detect(utterance).map(ObjectionRule::id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Option<ObjectionId> {
        let table = ObjectionTable::reference();
        ObjectionDetector::new(&table).classify(text)
    }

    mod detection {
        use super::*;

        #[test]
        fn detects_no_need() {
            assert_eq!(classify("I don't need this"), Some(ObjectionId::NoNeed));
        }

        #[test]
        fn detection_is_case_insensitive() {
            assert_eq!(classify("NOT INTERESTED"), Some(ObjectionId::NoNeed));
        }

        #[test]
        fn detects_inappropriate_language() {
            assert_eq!(classify("oh damn"), Some(ObjectionId::InappropriateLanguage));
        }

        #[test]
        fn detects_unclear_voice() {
            assert_eq!(classify("sorry I can't hear you"), Some(ObjectionId::UnclearVoice));
        }

        #[test]
        fn plain_answers_are_not_objections() {
            assert_eq!(classify("my salary is 55,000"), None);
            assert_eq!(classify("hello"), None);
            assert_eq!(classify("yes I do a job"), None);
        }

        #[test]
        fn empty_utterance_is_not_an_objection() {
            assert_eq!(classify(""), None);
            assert_eq!(classify("   "), None);
        }
    }

    mod priority {
        use super::*;

        #[test]
        fn earlier_category_wins_on_overlap() {
            // "already have card" also contains "already have" (existing_loan).
            assert_eq!(classify("I already have card"), Some(ObjectionId::ExistingLoan));
        }

        #[test]
        fn need_time_beats_cash() {
            assert_eq!(
                classify("let me think about the cash part"),
                Some(ObjectionId::NeedTime)
            );
        }

        #[test]
        fn table_order_is_declared_order() {
            let table = ObjectionTable::reference();
            let ids: Vec<_> = table.rules().iter().map(ObjectionRule::id).collect();
            assert_eq!(ids, ObjectionId::ALL.to_vec());
        }

        #[test]
        fn custom_order_changes_winner() {
            let table = ObjectionTable::new(vec![
                ObjectionRule::new(ObjectionId::CashWithdrawal, ["cash"], "cash first"),
                ObjectionRule::new(ObjectionId::NeedTime, ["think"], "time second"),
            ]);
            let rule = ObjectionDetector::new(&table)
                .detect("let me think about the cash part")
                .unwrap();
            assert_eq!(rule.response(), "cash first");
        }
    }

    mod ids {
        use super::*;

        #[test]
        fn round_trips_through_str() {
            for id in ObjectionId::ALL {
                assert_eq!(id.as_str().parse::<ObjectionId>().unwrap(), id);
            }
        }

        #[test]
        fn rejects_unknown_id() {
            assert!("too_expensive".parse::<ObjectionId>().is_err());
        }
    }

    #[test]
    fn rule_normalizes_triggers() {
        let rule = ObjectionRule::new(ObjectionId::NoNeed, ["  Don’t Need  ", ""], "x");
        assert_eq!(rule.triggers(), &["don't need".to_string()]);
    }

    #[test]
    fn every_reference_rule_has_a_response() {
        let table = ObjectionTable::reference();
        for id in ObjectionId::ALL {
            assert!(!table.response_for(id).unwrap().is_empty());
        }
    }
}
