//! Slot extraction from transcribed utterances.
//!
//! Everything here is keyword or digit matching on normalized text. There
//! is no intent model behind it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from parsing a value out of an utterance.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("No digits found in utterance")]
    NoDigits,

    #[error("Amount '{0}' does not fit in a salary slot")]
    AmountTooLarge(String),
}

/// Lowercases, trims and folds typographic apostrophes so that
/// "I Don’t need" matches the trigger "don't need".
pub fn normalize_utterance(text: &str) -> String {
    text.trim()
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{02BC}' => '\'',
            other => other,
        })
        .flat_map(char::to_lowercase)
        .collect()
}

/// Returns true if the normalized utterance contains any keyword.
pub fn contains_any<S: AsRef<str>>(normalized: &str, keywords: &[S]) -> bool {
    keywords
        .iter()
        .any(|keyword| normalized.contains(keyword.as_ref()))
}

/// Zero code points of the decimal digit blocks a customer's recognizer is
/// likely to emit. Each block holds `0..=9` contiguously.
const DIGIT_ZEROS: &[u32] = &[
    0x0030, // ASCII
    0x0660, // Arabic-Indic
    0x06F0, // Extended Arabic-Indic
    0x0966, // Devanagari
    0x09E6, // Bengali
    0x0A66, // Gurmukhi
    0x0AE6, // Gujarati
    0x0B66, // Oriya
    0x0BE6, // Tamil
    0x0C66, // Telugu
    0x0CE6, // Kannada
    0x0D66, // Malayalam
    0xFF10, // Fullwidth
];

/// Value of a decimal digit in any of the supported scripts.
pub fn decimal_digit(c: char) -> Option<u32> {
    let code = u32::from(c);
    DIGIT_ZEROS
        .iter()
        .find(|zero| (**zero..=**zero + 9).contains(&code))
        .map(|zero| code - zero)
}

/// Pulls the first amount out of free text.
///
/// Thousands separators (`,`) are removed first, so both "55,000" and the
/// Indian grouping "1,00,000" parse whole. The first maximal run of decimal
/// digits wins, in any supported script ("५५,०००" reads as 55000).
pub fn parse_amount(text: &str) -> Result<u64, ExtractionError> {
    let run: String = text
        .chars()
        .filter(|c| *c != ',')
        .skip_while(|c| decimal_digit(*c).is_none())
        .take_while(|c| decimal_digit(*c).is_some())
        .collect();

    if run.is_empty() {
        return Err(ExtractionError::NoDigits);
    }

    let amount = run
        .chars()
        .filter_map(decimal_digit)
        .try_fold(0u64, |acc, digit| acc.checked_mul(10)?.checked_add(u64::from(digit)));
    amount.ok_or(ExtractionError::AmountTooLarge(run))
}

/// Per-state parsers over the keyword sets a script declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotExtractor {
    /// Words that confirm the customer is salaried.
    #[serde(default = "default_employment_keywords")]
    pub employment_keywords: Vec<String>,

    /// Words that read as a positive reaction to the offer.
    #[serde(default = "default_positive_keywords")]
    pub positive_keywords: Vec<String>,
}

impl Default for SlotExtractor {
    fn default() -> Self {
        Self {
            employment_keywords: default_employment_keywords(),
            positive_keywords: default_positive_keywords(),
        }
    }
}

impl SlotExtractor {
    /// Employment question: does the answer mention a job?
    pub fn mentions_employment(&self, normalized: &str) -> bool {
        contains_any(normalized, &self.employment_keywords)
    }

    /// Benefits pitch: did the customer react positively?
    pub fn is_positive(&self, normalized: &str) -> bool {
        contains_any(normalized, &self.positive_keywords)
    }

    /// Salary question: the first amount in the utterance.
    pub fn salary(&self, raw: &str) -> Result<u64, ExtractionError> {
        parse_amount(raw)
    }

    /// Lowercases every keyword so matching against normalized text works.
    pub(crate) fn normalized(mut self) -> Self {
        for keyword in self
            .employment_keywords
            .iter_mut()
            .chain(self.positive_keywords.iter_mut())
        {
            *keyword = normalize_utterance(keyword);
        }
        self
    }
}

fn default_employment_keywords() -> Vec<String> {
    ["job", "employed", "salary", "employee"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_positive_keywords() -> Vec<String> {
    ["good", "great", "nice", "interested", "yes"]
        .into_iter()
        .map(String::from)
        .collect()
}
