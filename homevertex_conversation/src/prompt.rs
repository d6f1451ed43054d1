//! System prompt rendering.

use homevertex_core::template::PromptVariables;
use homevertex_core::{TemplateEngine, TemplateError};
use minijinja::{Environment, UndefinedBehavior};

use crate::snapshot::ExposedEntity;

/// Jinja-compatible engine with the host's global helpers (`now()`).
pub struct JinjaTemplateEngine {
    env: Environment<'static>,
}

fn now() -> String {
    chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S%.6f%:z")
        .to_string()
}

impl JinjaTemplateEngine {
    #[must_use]
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_function("now", now);
        Self { env }
    }
}

impl Default for JinjaTemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for JinjaTemplateEngine {
    fn render(&self, source: &str, variables: &serde_json::Value) -> Result<String, TemplateError> {
        self.env
            .render_str(source, variables)
            .map_err(|e| TemplateError(e.to_string()))
    }
}

/// Renders the configured prompt template against the current snapshot.
pub struct PromptRenderer {
    engine: Box<dyn TemplateEngine>,
}

impl PromptRenderer {
    #[must_use]
    pub fn new(engine: Box<dyn TemplateEngine>) -> Self {
        Self { engine }
    }

    pub fn render(
        &self,
        template: &str,
        ha_name: &str,
        exposed_entities: &[ExposedEntity],
        current_device_id: Option<&str>,
    ) -> Result<String, TemplateError> {
        let variables = PromptVariables {
            ha_name: ha_name.to_string(),
            exposed_entities: exposed_entities.to_vec(),
            current_device_id: current_device_id.map(ToString::to_string),
        }
        .to_value()?;
        self.engine.render(template, &variables)
    }
}

impl Default for PromptRenderer {
    fn default() -> Self {
        Self::new(Box::new(JinjaTemplateEngine::new()))
    }
}
