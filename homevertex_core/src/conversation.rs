//! Types of the host's conversation-agent contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Marker the host uses for "every language".
pub const MATCH_ALL: &str = "*";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationInput {
    pub text: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    pub language: String,
    #[serde(default)]
    pub device_id: Option<String>,
}

impl ConversationInput {
    #[must_use]
    pub fn new(text: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            conversation_id: None,
            language: language.into(),
            device_id: None,
        }
    }

    #[must_use]
    pub fn with_conversation_id(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    #[must_use]
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntentResponseErrorCode {
    Unknown,
}

/// Speech or error returned to the host for one turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntentResponse {
    pub language: String,
    pub speech: Option<String>,
    pub error: Option<(IntentResponseErrorCode, String)>,
}

impl IntentResponse {
    #[must_use]
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            speech: None,
            error: None,
        }
    }

    pub fn set_speech(&mut self, speech: impl Into<String>) {
        self.speech = Some(speech.into());
    }

    /// Records an error; the message is also what gets spoken.
    pub fn set_error(&mut self, code: IntentResponseErrorCode, message: impl Into<String>) {
        let message = message.into();
        self.speech = Some(message.clone());
        self.error = Some((code, message));
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationResult {
    pub response: IntentResponse,
    pub conversation_id: String,
}

/// Agent the host routes conversation turns to.
#[async_trait]
pub trait ConversationAgent: Send + Sync {
    /// Languages handled, or `MATCH_ALL`.
    fn supported_languages(&self) -> &'static str {
        MATCH_ALL
    }

    /// Handle one turn. Failures are reported inside the result, never raised.
    async fn process(&self, input: &ConversationInput) -> ConversationResult;
}
