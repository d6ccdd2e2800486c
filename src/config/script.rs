//! Script selection and per-call defaults

use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

use super::error::ValidationError;
use crate::domain::dialogue::{Script, ScriptError};

/// Which script to run and the defaults applied to each call.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptConfig {
    /// YAML script to load instead of the built-in one
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Recognizer and synthesis language when a call does not set one
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Agent name spoken in the greeting
    #[serde(default = "default_agent_name")]
    pub default_agent_name: String,
}

impl ScriptConfig {
    /// Loads the configured script, or shares the built-in one.
    pub fn load_script(&self) -> Result<Arc<Script>, ScriptError> {
        match &self.path {
            Some(path) => Script::from_yaml_file(path).map(Arc::new),
            None => Script::shared_reference(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(path) = &self.path {
            if !path.is_file() {
                return Err(ValidationError::ScriptNotFound(path.display().to_string()));
            }
        }
        if !is_language_tag(&self.default_language) {
            return Err(ValidationError::InvalidLanguage(self.default_language.clone()));
        }
        if self.default_agent_name.trim().is_empty() {
            return Err(ValidationError::MissingRequired("script.default_agent_name"));
        }
        Ok(())
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            path: None,
            default_language: default_language(),
            default_agent_name: default_agent_name(),
        }
    }
}

/// Loose BCP 47 shape check: `en`, `en-IN`, `hi-IN`.
fn is_language_tag(tag: &str) -> bool {
    let mut parts = tag.split('-');
    let primary_ok = parts
        .next()
        .map(|p| (2..=3).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphabetic()))
        .unwrap_or(false);
    primary_ok && parts.all(|p| !p.is_empty() && p.len() <= 8 && p.chars().all(|c| c.is_ascii_alphanumeric()))
}

fn default_language() -> String {
    "en-IN".to_string()
}

fn default_agent_name() -> String {
    "Rahul".to_string()
}
