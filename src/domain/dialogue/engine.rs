//! Turn orchestration for scripted calls.
//!
//! The engine is synchronous and does no I/O. Hosts own the sessions and
//! must not run two turns on the same session at once.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::extractor::normalize_utterance;
use super::handlers::{HandlerRegistry, Reply, Turn};
use super::objections::{ObjectionDetector, ObjectionId};
use super::script::{Script, ScriptError};
use super::session::{DialogueSession, Speaker};
use super::state::DialogueState;
use crate::domain::call::CallOutcome;

/// Result of one customer turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// What the agent says next. `None` once the call is over.
    pub message: Option<String>,
    /// State after the turn.
    pub state: DialogueState,
    /// Objection category that preempted the turn, if any.
    pub objection: Option<ObjectionId>,
}

impl TurnOutcome {
    fn ended() -> Self {
        Self {
            message: None,
            state: DialogueState::Ended,
            objection: None,
        }
    }
}

/// Drives dialogue sessions through a script.
#[derive(Debug, Clone)]
pub struct DialogueEngine {
    script: Arc<Script>,
    handlers: HandlerRegistry,
}

impl DialogueEngine {
    /// Engine with the overdraft handlers over `script`.
    pub fn new(script: Arc<Script>) -> Self {
        Self::with_handlers(script, HandlerRegistry::reference())
    }

    pub fn with_handlers(script: Arc<Script>, handlers: HandlerRegistry) -> Self {
        Self { script, handlers }
    }

    /// Engine over the shared built-in script.
    pub fn reference() -> Result<Self, ScriptError> {
        Ok(Self::new(Script::shared_reference()?))
    }

    pub fn script(&self) -> &Arc<Script> {
        &self.script
    }

    /// Opens a call in greeting and records the greeting as the first line.
    pub fn start_session(
        &self,
        customer_name: &str,
        agent_name: &str,
        language: &str,
    ) -> DialogueSession {
        let mut session = DialogueSession::new(customer_name, agent_name, language);
        if let Some(greeting) = self.next_prompt(&session) {
            session.record(Speaker::Agent, greeting);
        }

        tracing::info!(
            call_id = %session.id(),
            script = %self.script.name(),
            language = %language,
            "dialogue session started"
        );
        session
    }

    /// Renders the opening template of the current state. Pure.
    pub fn next_prompt(&self, session: &DialogueSession) -> Option<String> {
        self.prompt_for(session, session.state())
    }

    /// Handles one customer utterance.
    ///
    /// Objections are checked before the state's handler runs. A session
    /// that has already ended is left untouched.
    pub fn process_utterance(&self, session: &mut DialogueSession, text: &str) -> TurnOutcome {
        if session.is_terminal() {
            tracing::debug!(call_id = %session.id(), "utterance after call ended ignored");
            return TurnOutcome::ended();
        }

        session.record(Speaker::Customer, text);
        let normalized = normalize_utterance(text);

        if let Some(rule) = ObjectionDetector::new(self.script.objections()).detect_normalized(&normalized) {
            tracing::info!(
                call_id = %session.id(),
                objection = %rule.id(),
                from = %session.state(),
                "objection detected"
            );
            session.set_state(DialogueState::ObjectionHandling);
            let message = self.render(session, rule.response());
            session.record(Speaker::Agent, message.clone());
            return TurnOutcome {
                message: Some(message),
                state: DialogueState::ObjectionHandling,
                objection: Some(rule.id()),
            };
        }

        let current = session.state();
        let handler = self.handlers.handler_for(current);
        let turn = Turn {
            state: current,
            raw: text,
            normalized: &normalized,
        };

        let message = match handler.handle(&turn, &self.script, session.slots_mut()) {
            Reply::Advance => match self.script.transitions().default_transition(current) {
                Some(next) => {
                    session.set_state(next);
                    tracing::info!(call_id = %session.id(), from = %current, to = %next, "state advanced");
                    self.prompt_for(session, next)
                        .unwrap_or_else(|| self.render(session, handler.fallback(&self.script)))
                }
                None => {
                    tracing::debug!(call_id = %session.id(), state = %current, "no outgoing transition");
                    self.render(session, handler.fallback(&self.script))
                }
            },
            Reply::Hold(template) => {
                tracing::debug!(call_id = %session.id(), state = %current, "state held");
                self.render(session, &template)
            }
        };

        session.record(Speaker::Agent, message.clone());
        TurnOutcome {
            message: Some(message),
            state: session.state(),
            objection: None,
        }
    }

    /// Closes the call with `outcome`. Calling it again does nothing.
    pub fn end_session(&self, session: &mut DialogueSession, outcome: CallOutcome) {
        if session.closure().is_some() {
            return;
        }
        session.close(outcome);
        session.record(Speaker::Agent, format!("Call ended with outcome: {}", outcome));

        tracing::info!(
            call_id = %session.id(),
            outcome = %outcome,
            turns = session.customer_turns(),
            "dialogue session ended"
        );
    }

    fn prompt_for(&self, session: &DialogueSession, state: DialogueState) -> Option<String> {
        self.script
            .catalog()
            .opening_template(state)
            .map(|template| self.render(session, template))
    }

    fn render(&self, session: &DialogueSession, template: &str) -> String {
        self.script
            .renderer()
            .render(template, &session.render_context())
    }
}
