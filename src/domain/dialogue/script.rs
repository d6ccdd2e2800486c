//! The validated, immutable bundle of static tables a call runs on.
//!
//! A [`Script`] can only be obtained through validation, so an engine
//! holding one never has to re-check the graph at turn time.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::catalog::ScriptCatalog;
use super::extractor::SlotExtractor;
use super::objections::{ObjectionId, ObjectionRule, ObjectionTable};
use super::renderer::{reference_defaults, MessageRenderer};
use super::state::DialogueState;
use super::transitions::TransitionTable;

static REFERENCE: Lazy<Result<Arc<Script>, ScriptError>> =
    Lazy::new(|| Script::reference().map(Arc::new));

/// Startup failures for a script. Fatal: a host should refuse to run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("Unknown dialogue state '{name}' in {section}")]
    UnknownState { section: String, name: String },

    #[error("Unknown objection category '{0}'")]
    UnknownObjection(String),

    #[error("States unreachable from greeting: {0:?}")]
    Unreachable(Vec<DialogueState>),

    #[error("The ended state cannot have outgoing transitions")]
    EndedHasTransitions,

    #[error("Only call_closing may lead to ended, found edge from {from}")]
    IllegalEndedEdge { from: DialogueState },

    #[error("The greeting state needs a catalog entry")]
    MissingGreeting,

    #[error("Objection '{0}' needs at least one trigger and a response")]
    EmptyObjection(ObjectionId),

    #[error("Objection '{0}' is declared more than once")]
    DuplicateObjection(ObjectionId),

    #[error("Failed to read script {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to parse script: {0}")]
    Parse(String),
}

/// Messages used when a handler holds the state or no prompt exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackMessages {
    pub employment_clarification: String,
    pub salary_clarification: String,
    pub benefits_clarification: String,
    pub continuation: String,
    pub objection_resume: String,
}

impl Default for FallbackMessages {
    fn default() -> Self {
        Self {
            employment_clarification: "I understand. For this overdraft facility, we primarily \
                work with salaried employees. Do you have any other questions?"
                .to_string(),
            salary_clarification: "Could you please tell me your net take-home salary amount? \
                For example, if it's 50,000 rupees, please say 'fifty thousand'."
                .to_string(),
            benefits_clarification: "Let me explain more about how this can help you. You can \
                use this facility for any emergency or investment purpose without any EMI burden."
                .to_string(),
            continuation: "Thank you for your response. Let me continue with the process."
                .to_string(),
            objection_resume: "I understand your concern. Let me explain how this can benefit you."
                .to_string(),
        }
    }
}

/// Unvalidated script contents.
#[derive(Debug, Clone, Default)]
pub struct ScriptParts {
    pub name: String,
    pub catalog: ScriptCatalog,
    pub transitions: TransitionTable,
    pub objections: ObjectionTable,
    pub extractor: SlotExtractor,
    pub fallbacks: FallbackMessages,
    pub defaults: BTreeMap<String, String>,
}

impl ScriptParts {
    /// The Flexi Overdraft script.
    pub fn reference() -> Self {
        Self {
            name: "flexi-overdraft".to_string(),
            catalog: ScriptCatalog::reference(),
            transitions: TransitionTable::reference(),
            objections: ObjectionTable::reference(),
            extractor: SlotExtractor::default(),
            fallbacks: FallbackMessages::default(),
            defaults: reference_defaults(),
        }
    }
}

/// Validated static tables for a call.
#[derive(Debug, Clone)]
pub struct Script {
    name: String,
    catalog: ScriptCatalog,
    transitions: TransitionTable,
    objections: ObjectionTable,
    extractor: SlotExtractor,
    fallbacks: FallbackMessages,
    renderer: MessageRenderer,
}

impl Script {
    /// Validates `parts` and seals them into a script.
    ///
    /// # Errors
    ///
    /// - `MissingGreeting` if greeting has no catalog entry
    /// - `EndedHasTransitions` if ended lists any candidate
    /// - `IllegalEndedEdge` if a state other than call_closing targets ended
    /// - `EmptyObjection` / `DuplicateObjection` for bad objection tables
    /// - `Unreachable` if a participating state cannot be reached
    pub fn new(parts: ScriptParts) -> Result<Self, ScriptError> {
        validate(&parts)?;

        Ok(Self {
            name: parts.name,
            catalog: parts.catalog,
            transitions: parts.transitions,
            objections: parts.objections,
            extractor: parts.extractor.normalized(),
            fallbacks: parts.fallbacks,
            renderer: MessageRenderer::new(parts.defaults),
        })
    }

    /// The built-in overdraft script.
    pub fn reference() -> Result<Self, ScriptError> {
        Self::new(ScriptParts::reference())
    }

    /// Process-wide shared copy of the built-in script.
    pub fn shared_reference() -> Result<Arc<Self>, ScriptError> {
        REFERENCE.clone()
    }

    /// Parses and validates a YAML script document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ScriptError> {
        let doc: ScriptDocument =
            serde_yaml::from_str(yaml).map_err(|e| ScriptError::Parse(e.to_string()))?;
        Self::new(doc.into_parts()?)
    }

    /// Reads, parses and validates a YAML script file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| ScriptError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let script = Self::from_yaml_str(&yaml)?;
        tracing::info!(script = %script.name, path = %path.display(), "script loaded");
        Ok(script)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn catalog(&self) -> &ScriptCatalog {
        &self.catalog
    }

    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    pub fn objections(&self) -> &ObjectionTable {
        &self.objections
    }

    pub fn extractor(&self) -> &SlotExtractor {
        &self.extractor
    }

    pub fn fallbacks(&self) -> &FallbackMessages {
        &self.fallbacks
    }

    pub fn renderer(&self) -> &MessageRenderer {
        &self.renderer
    }
}

fn validate(parts: &ScriptParts) -> Result<(), ScriptError> {
    if !parts.catalog.has_entry(DialogueState::Greeting) {
        return Err(ScriptError::MissingGreeting);
    }

    if !parts.transitions.candidates(DialogueState::Ended).is_empty() {
        return Err(ScriptError::EndedHasTransitions);
    }

    if let Some((from, _)) = parts
        .transitions
        .edges()
        .find(|(from, to)| *to == DialogueState::Ended && *from != DialogueState::CallClosing)
    {
        return Err(ScriptError::IllegalEndedEdge { from });
    }

    let mut seen = HashSet::new();
    for rule in parts.objections.rules() {
        if !seen.insert(rule.id()) {
            return Err(ScriptError::DuplicateObjection(rule.id()));
        }
        if rule.triggers().is_empty() || rule.response().trim().is_empty() {
            return Err(ScriptError::EmptyObjection(rule.id()));
        }
    }

    let participating: BTreeSet<DialogueState> = parts
        .catalog
        .states()
        .chain(parts.transitions.referenced_states())
        .collect();

    // Objections can jump to objection handling from anywhere, and end-call
    // can close any call.
    let mut reachable = parts.transitions.reachable_from(DialogueState::Greeting);
    if !parts.objections.rules().is_empty() {
        reachable.extend(parts.transitions.reachable_from(DialogueState::ObjectionHandling));
    }
    reachable.insert(DialogueState::Ended);

    let unreachable: Vec<DialogueState> = participating.difference(&reachable).copied().collect();
    if !unreachable.is_empty() {
        return Err(ScriptError::Unreachable(unreachable));
    }

    Ok(())
}

/// On-disk YAML form. State and objection names are strings so unknown
/// names can be reported by section.
#[derive(Debug, Deserialize)]
struct ScriptDocument {
    #[serde(default = "default_script_name")]
    name: String,
    catalog: BTreeMap<String, Vec<String>>,
    transitions: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    objections: Vec<ObjectionDocument>,
    #[serde(default)]
    extractor: SlotExtractor,
    #[serde(default)]
    fallbacks: FallbackMessages,
    defaults: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct ObjectionDocument {
    id: String,
    triggers: Vec<String>,
    response: String,
}

fn default_script_name() -> String {
    "custom".to_string()
}

fn parse_state(section: &str, name: &str) -> Result<DialogueState, ScriptError> {
    name.parse().map_err(|_| ScriptError::UnknownState {
        section: section.to_string(),
        name: name.to_string(),
    })
}

impl ScriptDocument {
    fn into_parts(self) -> Result<ScriptParts, ScriptError> {
        let mut catalog = ScriptCatalog::new();
        for (name, templates) in self.catalog {
            catalog.insert(parse_state("catalog", &name)?, templates);
        }

        let mut transitions = TransitionTable::new();
        for (name, targets) in self.transitions {
            let from = parse_state("transitions", &name)?;
            let targets = targets
                .iter()
                .map(|t| parse_state("transitions", t))
                .collect::<Result<Vec<_>, _>>()?;
            transitions.insert(from, targets);
        }

        let rules = self
            .objections
            .into_iter()
            .map(|o| {
                let id = o
                    .id
                    .parse::<ObjectionId>()
                    .map_err(|_| ScriptError::UnknownObjection(o.id.clone()))?;
                Ok(ObjectionRule::new(id, o.triggers, o.response))
            })
            .collect::<Result<Vec<_>, ScriptError>>()?;

        Ok(ScriptParts {
            name: self.name,
            catalog,
            transitions,
            objections: ObjectionTable::new(rules),
            extractor: self.extractor,
            fallbacks: self.fallbacks,
            defaults: self.defaults.unwrap_or_else(reference_defaults),
        })
    }
}
