//! Template rendering with named placeholders.
//!
//! Templates use `{name}` placeholders and `{{` / `}}` for literal braces.
//! Rendering never fails a turn: if any placeholder cannot be resolved, or
//! the braces are malformed, the raw template is returned as-is.

use std::collections::BTreeMap;

use thiserror::Error;

use super::slots::{Slot, SlotMap};

/// Why a template could not be interpolated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("No value or default for placeholder '{0}'")]
    Unresolved(String),

    #[error("Unclosed '{{' at byte {0}")]
    UnclosedBrace(usize),

    #[error("Unmatched '}}' at byte {0}")]
    UnmatchedBrace(usize),
}

/// Session values visible to templates.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub customer_name: &'a str,
    pub agent_name: &'a str,
    pub slots: &'a SlotMap,
}

/// Interpolates templates from session data and declared defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRenderer {
    defaults: BTreeMap<String, String>,
}

impl Default for MessageRenderer {
    fn default() -> Self {
        Self::new(reference_defaults())
    }
}

impl MessageRenderer {
    /// Creates a renderer with the given placeholder defaults.
    pub fn new(defaults: BTreeMap<String, String>) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &BTreeMap<String, String> {
        &self.defaults
    }

    /// Renders `template`, falling back to the raw text on any failure.
    pub fn render(&self, template: &str, ctx: &RenderContext<'_>) -> String {
        match self.try_render(template, ctx) {
            Ok(rendered) => rendered,
            Err(err) => {
                tracing::debug!(error = %err, "template left unformatted");
                template.to_string()
            }
        }
    }

    /// Renders `template`, reporting the first problem found.
    pub fn try_render(&self, template: &str, ctx: &RenderContext<'_>) -> Result<String, RenderError> {
        let mut out = String::with_capacity(template.len());
        let mut chars = template.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    out.push('{');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, inner) in chars.by_ref() {
                        if inner == '}' {
                            closed = true;
                            break;
                        }
                        if inner == '{' {
                            return Err(RenderError::UnclosedBrace(pos));
                        }
                        name.push(inner);
                    }
                    if !closed {
                        return Err(RenderError::UnclosedBrace(pos));
                    }
                    let value = self
                        .resolve(name.trim(), ctx)
                        .ok_or(RenderError::Unresolved(name))?;
                    out.push_str(&value);
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    out.push('}');
                }
                '}' => return Err(RenderError::UnmatchedBrace(pos)),
                other => out.push(other),
            }
        }

        Ok(out)
    }

    /// Only the two names and the three offer slots are template inputs.
    /// Other collected slots (PAN, date of birth, pincode) never reach a
    /// prompt.
    fn resolve(&self, name: &str, ctx: &RenderContext<'_>) -> Option<String> {
        let slot = match name {
            "customer_name" => return Some(ctx.customer_name.to_string()),
            "agent_name" => return Some(ctx.agent_name.to_string()),
            "salary" => Slot::Salary,
            "company" => Slot::Company,
            "designation" => Slot::Designation,
            _ => return None,
        };

        ctx.slots
            .get(slot)
            .map(ToString::to_string)
            .or_else(|| self.defaults.get(name).cloned())
    }
}

/// Defaults used when a slot has not been collected yet.
pub fn reference_defaults() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("salary".to_string(), "100000".to_string()),
        ("company".to_string(), String::new()),
        ("designation".to_string(), String::new()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dialogue::{DialogueState, SlotValue};

    fn ctx(slots: &SlotMap) -> RenderContext<'_> {
        RenderContext {
            customer_name: "Asha",
            agent_name: "Rahul",
            slots,
        }
    }

    #[test]
    fn substitutes_names() {
        let slots = SlotMap::new();
        let out = MessageRenderer::default().render("Hi {customer_name}, {agent_name} here", &ctx(&slots));
        assert_eq!(out, "Hi Asha, Rahul here");
    }

    #[test]
    fn stored_salary_beats_default() {
        let mut slots = SlotMap::new();
        slots
            .fill(Slot::Salary, SlotValue::Amount(55_000), DialogueState::SalaryCollection)
            .unwrap();
        let out = MessageRenderer::default().render("Salary {salary}", &ctx(&slots));
        assert_eq!(out, "Salary 55000");
    }

    #[test]
    fn missing_salary_uses_default() {
        let slots = SlotMap::new();
        let out = MessageRenderer::default().render("Salary {salary}", &ctx(&slots));
        assert_eq!(out, "Salary 100000");
    }

    #[test]
    fn empty_default_renders_empty() {
        let slots = SlotMap::new();
        let out = MessageRenderer::default().render("[{company}|{designation}]", &ctx(&slots));
        assert_eq!(out, "[|]");
    }

    #[test]
    fn unknown_placeholder_returns_raw_template() {
        let slots = SlotMap::new();
        let template = "Dear {customer_name}, your PAN is {pan}";
        let renderer = MessageRenderer::default();
        assert_eq!(
            renderer.try_render(template, &ctx(&slots)),
            Err(RenderError::Unresolved("pan".into()))
        );
        assert_eq!(renderer.render(template, &ctx(&slots)), template);
    }

    #[test]
    fn collected_personal_slots_are_not_placeholders() {
        let mut slots = SlotMap::new();
        slots
            .fill(Slot::Pan, SlotValue::Text("ABCDE1234F".into()), DialogueState::PersonalDetails)
            .unwrap();
        let mut defaults = reference_defaults();
        defaults.insert("pincode".into(), "411001".into());
        let renderer = MessageRenderer::new(defaults);

        assert_eq!(
            renderer.try_render("PAN {pan}", &ctx(&slots)),
            Err(RenderError::Unresolved("pan".into()))
        );
        assert_eq!(renderer.render("Pin {pincode}", &ctx(&slots)), "Pin {pincode}");
    }

    #[test]
    fn malformed_braces_return_raw_template() {
        let slots = SlotMap::new();
        let renderer = MessageRenderer::default();
        assert_eq!(renderer.render("oops {customer_name", &ctx(&slots)), "oops {customer_name");
        assert_eq!(renderer.render("oops } here", &ctx(&slots)), "oops } here");
    }

    #[test]
    fn doubled_braces_are_literal() {
        let slots = SlotMap::new();
        let out = MessageRenderer::default().render("{{literal}} {agent_name}", &ctx(&slots));
        assert_eq!(out, "{literal} Rahul");
    }

    #[test]
    fn filled_slot_without_default_resolves() {
        let mut slots = SlotMap::new();
        slots
            .fill(Slot::Pincode, SlotValue::Text("411001".into()), DialogueState::PersonalDetails)
            .unwrap();
        let out = MessageRenderer::default().render("Pincode {pincode}", &ctx(&slots));
        assert_eq!(out, "Pincode 411001");
    }

    #[test]
    fn plain_text_passes_through() {
        let slots = SlotMap::new();
        let text = "1. 3 Months bank statement – (As per Bank )";
        assert_eq!(MessageRenderer::default().render(text, &ctx(&slots)), text);
    }
}
