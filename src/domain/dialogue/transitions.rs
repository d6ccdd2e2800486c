//! Transition table: which states may follow which.
//!
//! Candidate lists are ordered. The engine's automatic move always takes
//! the first candidate; later entries are recorded edges that nothing
//! selects today.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::state::DialogueState;

/// Static graph of permitted state-to-state moves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionTable {
    edges: BTreeMap<DialogueState, Vec<DialogueState>>,
}

impl TransitionTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the candidate list for a state.
    pub fn with_edges(
        mut self,
        from: DialogueState,
        candidates: impl IntoIterator<Item = DialogueState>,
    ) -> Self {
        self.insert(from, candidates.into_iter().collect());
        self
    }

    /// Adds (or replaces) the candidate list for a state.
    pub fn insert(&mut self, from: DialogueState, candidates: Vec<DialogueState>) {
        self.edges.insert(from, candidates);
    }

    /// Ordered candidates out of a state; empty when it has none.
    pub fn candidates(&self, from: DialogueState) -> &[DialogueState] {
        self.edges.get(&from).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The automatic next state: the first candidate.
    pub fn default_transition(&self, from: DialogueState) -> Option<DialogueState> {
        self.candidates(from).first().copied()
    }

    /// Returns true if `to` is listed as a candidate of `from`.
    pub fn permits(&self, from: DialogueState, to: DialogueState) -> bool {
        self.candidates(from).contains(&to)
    }

    /// Iterates every `(from, to)` edge.
    pub fn edges(&self) -> impl Iterator<Item = (DialogueState, DialogueState)> + '_ {
        self.edges
            .iter()
            .flat_map(|(from, targets)| targets.iter().map(move |to| (*from, *to)))
    }

    /// Every state appearing in the table, as a source or as a target.
    pub fn referenced_states(&self) -> BTreeSet<DialogueState> {
        self.edges
            .iter()
            .flat_map(|(from, targets)| std::iter::once(*from).chain(targets.iter().copied()))
            .collect()
    }

    /// States reachable from `start` by following any listed edge.
    pub fn reachable_from(&self, start: DialogueState) -> BTreeSet<DialogueState> {
        let mut seen = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(state) = queue.pop_front() {
            for next in self.candidates(state) {
                if seen.insert(*next) {
                    queue.push_back(*next);
                }
            }
        }
        seen
    }

    /// The edges of the reference overdraft script.
    pub fn reference() -> Self {
        use DialogueState::*;

        Self::new()
            .with_edges(Greeting, [ScriptIntroduction])
            .with_edges(ScriptIntroduction, [RecordingNotice])
            .with_edges(RecordingNotice, [EmploymentStatus])
            .with_edges(EmploymentStatus, [SalaryCollection])
            .with_edges(SalaryCollection, [BenefitsExplanation])
            .with_edges(BenefitsExplanation, [PersonalDetails, ObjectionHandling])
            .with_edges(PersonalDetails, [EligibilityCheck, ObjectionHandling])
            .with_edges(EligibilityCheck, [BureauConsent, ObjectionHandling])
            .with_edges(BureauConsent, [DocumentRequirements, ObjectionHandling])
            .with_edges(DocumentRequirements, [CallClosing, ObjectionHandling])
            .with_edges(
                ObjectionHandling,
                [
                    BenefitsExplanation,
                    PersonalDetails,
                    EligibilityCheck,
                    BureauConsent,
                    DocumentRequirements,
                    CallClosing,
                ],
            )
            .with_edges(CallClosing, [Ended])
    }
}
