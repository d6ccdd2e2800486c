//! Data slots collected from the customer.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::state::DialogueState;
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, ValidationError};

/// A named value the script wants from the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Salary,
    Company,
    Designation,
    Pan,
    #[serde(rename = "dob")]
    DateOfBirth,
    Pincode,
}

impl Slot {
    pub const ALL: [Slot; 6] = [
        Slot::Salary,
        Slot::Company,
        Slot::Designation,
        Slot::Pan,
        Slot::DateOfBirth,
        Slot::Pincode,
    ];

    /// Name used in templates and exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Salary => "salary",
            Self::Company => "company",
            Self::Designation => "designation",
            Self::Pan => "pan",
            Self::DateOfBirth => "dob",
            Self::Pincode => "pincode",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Slot {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s)
            .ok_or_else(|| ValidationError::unknown("slot", s))
    }
}

/// Value held by a slot. Salary is numeric, everything else free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotValue {
    Amount(u64),
    Text(String),
}

impl fmt::Display for SlotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amount(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A filled slot and the state whose extractor filled it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilledSlot {
    pub value: SlotValue,
    pub filled_by: DialogueState,
    pub filled_at: Timestamp,
}

/// Slots collected so far in one session.
///
/// # Invariants
///
/// - A slot filled by one state's extractor is never overwritten by another
///   state's extractor. The owning state may refresh its own value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotMap {
    slots: BTreeMap<Slot, FilledSlot>,
}

impl SlotMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: Slot) -> Option<&SlotValue> {
        self.slots.get(&slot).map(|filled| &filled.value)
    }

    pub fn filled_by(&self, slot: Slot) -> Option<DialogueState> {
        self.slots.get(&slot).map(|filled| filled.filled_by)
    }

    /// Numeric salary, when collected.
    pub fn salary(&self) -> Option<u64> {
        match self.get(Slot::Salary) {
            Some(SlotValue::Amount(n)) => Some(*n),
            _ => None,
        }
    }

    /// Stores a value on behalf of `by`.
    ///
    /// # Errors
    ///
    /// - `SlotConflict` if the slot was already filled from a different state
    pub fn fill(
        &mut self,
        slot: Slot,
        value: SlotValue,
        by: DialogueState,
    ) -> Result<(), DomainError> {
        if let Some(owner) = self.filled_by(slot) {
            if owner != by {
                return Err(DomainError::new(
                    ErrorCode::SlotConflict,
                    format!("Slot '{}' already filled during {}", slot, owner),
                )
                .with_detail("slot", slot.as_str())
                .with_detail("attempted_by", by.as_str()));
            }
        }

        self.slots.insert(
            slot,
            FilledSlot {
                value,
                filled_by: by,
                filled_at: Timestamp::now(),
            },
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, &SlotValue)> {
        self.slots.iter().map(|(slot, filled)| (*slot, &filled.value))
    }

    /// Flat `{ "salary": 55000, ... }` view for the persistence side.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .iter()
            .map(|(slot, value)| {
                let json = match value {
                    SlotValue::Amount(n) => serde_json::Value::from(*n),
                    SlotValue::Text(s) => serde_json::Value::from(s.clone()),
                };
                (slot.as_str().to_string(), json)
            })
            .collect();
        serde_json::Value::Object(map)
    }
}
