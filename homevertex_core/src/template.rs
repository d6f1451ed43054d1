//! Narrow contract for the host's templating engine.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct TemplateError(pub String);

/// Renders a template source against named variables.
///
/// The output is returned verbatim; callers never re-parse it.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, source: &str, variables: &serde_json::Value) -> Result<String, TemplateError>;
}

/// Named bindings available to the system prompt template.
#[derive(Debug, Clone, Serialize)]
pub struct PromptVariables<T: Serialize> {
    pub ha_name: String,
    pub exposed_entities: Vec<T>,
    pub current_device_id: Option<String>,
}

impl<T: Serialize> PromptVariables<T> {
    pub fn to_value(&self) -> Result<serde_json::Value, TemplateError> {
        serde_json::to_value(self).map_err(|e| TemplateError(e.to_string()))
    }
}
