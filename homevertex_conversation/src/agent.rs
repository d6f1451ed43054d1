//! Conversation agent backed by a Vertex AI chat model.

use std::sync::Arc;

use async_trait::async_trait;
use homevertex_config::{EntryOptions, HistoryConfig};
use homevertex_core::{
    ChatSession, ConversationAgent, ConversationInput, ConversationResult, Host, IntentResponse,
    IntentResponseErrorCode, ModelClient, ModelError, TemplateError,
};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::history::HistoryStore;
use crate::prompt::PromptRenderer;
use crate::snapshot::collect_exposed_entities;

/// Per-turn failures, worded as the apology the user hears.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("Sorry, I had a problem with my template: {0}")]
    Template(#[from] TemplateError),

    #[error("Sorry, I had a problem talking to Google Generative AI: {0}")]
    Model(#[from] ModelError),
}

pub struct VertexAgent {
    host: Arc<dyn Host>,
    client: Arc<dyn ModelClient>,
    options: RwLock<EntryOptions>,
    renderer: PromptRenderer,
    history: HistoryStore,
}

impl VertexAgent {
    #[must_use]
    pub fn new(
        host: Arc<dyn Host>,
        client: Arc<dyn ModelClient>,
        options: EntryOptions,
        history_config: HistoryConfig,
    ) -> Self {
        info!("Creating Vertex AI conversation agent");
        Self {
            host,
            client,
            options: RwLock::new(options),
            renderer: PromptRenderer::default(),
            history: HistoryStore::new(history_config),
        }
    }

    /// Swap the entry options; the next turn uses them, history is kept.
    pub async fn update_options(&self, options: EntryOptions) {
        *self.options.write().await = options;
    }

    pub async fn options(&self) -> EntryOptions {
        self.options.read().await.clone()
    }

    #[must_use]
    pub const fn history(&self) -> &HistoryStore {
        &self.history
    }

    async fn run_turn(
        &self,
        input: &ConversationInput,
    ) -> (String, Result<String, TurnError>) {
        let options = self.options().await;
        debug!("Model: {}", options.model);

        let lease = self.history.acquire(input.conversation_id.as_deref()).await;
        let conversation_id = lease.id().to_string();

        let exposed_entities = collect_exposed_entities(self.host.as_ref());
        let system_prompt = match self.renderer.render(
            &options.prompt,
            &self.host.location_name(),
            &exposed_entities,
            input.device_id.as_deref(),
        ) {
            Ok(prompt) => prompt,
            Err(err) => {
                error!("Error rendering prompt: {err}");
                return (conversation_id, Err(err.into()));
            }
        };

        let history = lease.session().seeded_history(&system_prompt);
        debug!("Input: '{}' with history: {:?}", input.text, history);

        let generation_config = options.generation_config();
        let mut chat = ChatSession::start(
            self.client.as_ref(),
            options.model,
            generation_config,
            history,
        );
        let response = match chat.send_message(&input.text).await {
            Ok(response) => response,
            Err(err) => {
                error!("Error sending message: {err}");
                return (conversation_id, Err(err.into()));
            }
        };

        debug!("Response: {}", response.text);
        self.history.commit(lease, chat.into_history()).await;
        (conversation_id, Ok(response.text))
    }
}

#[async_trait]
impl ConversationAgent for VertexAgent {
    async fn process(&self, input: &ConversationInput) -> ConversationResult {
        let (conversation_id, outcome) = self.run_turn(input).await;

        let mut response = IntentResponse::new(input.language.clone());
        match outcome {
            Ok(text) => response.set_speech(text),
            Err(err) => response.set_error(IntentResponseErrorCode::Unknown, err.to_string()),
        }

        ConversationResult {
            response,
            conversation_id,
        }
    }
}
