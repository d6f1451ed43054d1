//! Chat continuation over a stateless `ModelClient`.
//!
//! A `ChatSession` owns a seeded history. Each `send_message` call sends the
//! whole history plus the new user turn; only a successful reply extends the
//! history.

use tracing::debug;

use crate::{Content, GenerateRequest, GenerationConfig, ModelClient, ModelError, ModelResponse};

pub struct ChatSession<'a, C: ModelClient + ?Sized> {
    client: &'a C,
    model: String,
    generation_config: GenerationConfig,
    history: Vec<Content>,
}

impl<'a, C: ModelClient + ?Sized> ChatSession<'a, C> {
    #[must_use]
    pub const fn start(
        client: &'a C,
        model: String,
        generation_config: GenerationConfig,
        history: Vec<Content>,
    ) -> Self {
        Self {
            client,
            model,
            generation_config,
            history,
        }
    }

    pub async fn send_message(&mut self, text: &str) -> Result<ModelResponse, ModelError> {
        let mut contents = self.history.clone();
        contents.push(Content::user_text(text));

        debug!(
            "Sending chat turn to {} with {} prior turns",
            self.model,
            self.history.len()
        );

        let response = self
            .client
            .generate_content(GenerateRequest {
                model: self.model.clone(),
                contents: contents.clone(),
                generation_config: Some(self.generation_config),
            })
            .await?;

        contents.push(Content::model_text(response.text.clone()));
        self.history = contents;
        Ok(response)
    }

    #[must_use]
    pub fn history(&self) -> &[Content] {
        &self.history
    }

    #[must_use]
    pub fn into_history(self) -> Vec<Content> {
        self.history
    }
}
