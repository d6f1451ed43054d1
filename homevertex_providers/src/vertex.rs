//! Vertex AI client bound to one project and region.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use homevertex_core::{GenerateRequest, ModelClient, ModelError, ModelResponse};
use reqwest::Client;
use tracing::{debug, info};

use crate::credentials::ServiceAccountKey;
use crate::error::{SetupError, classify_token_error};
use crate::types::{GenerateContentRequest, GenerateContentResponse, map_http_error};

/// OAuth2 scope for Vertex AI
const VERTEX_AI_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Authenticated Vertex AI session for one configured entry.
///
/// Each entry owns its provider; dropping it is the teardown.
#[derive(Clone)]
pub struct VertexProvider {
    client: Client,
    project_id: String,
    location: String,
    token_provider: Arc<CustomServiceAccount>,
}

impl VertexProvider {
    /// Load a service-account key file and bind a client to its project.
    pub async fn from_service_account_file(
        credentials_path: impl AsRef<Path>,
        location: impl Into<String>,
    ) -> Result<Self, SetupError> {
        let key = ServiceAccountKey::from_file(credentials_path).await?;
        Self::from_key(&key, location)
    }

    pub fn from_key(key: &ServiceAccountKey, location: impl Into<String>) -> Result<Self, SetupError> {
        let service_account = CustomServiceAccount::from_json(key.json())
            .map_err(|e| SetupError::Authentication(e.to_string()))?;

        let location = location.into();
        info!(
            "Creating VertexProvider for project {} in {}",
            key.project_id(),
            location
        );

        Ok(Self {
            client: Client::builder().build()?,
            project_id: key.project_id().to_string(),
            location,
            token_provider: Arc::new(service_account),
        })
    }

    /// Fetch one access token to prove the credential is accepted.
    pub async fn verify(&self) -> Result<(), SetupError> {
        self.token_provider
            .token(&[VERTEX_AI_SCOPE])
            .await
            .map(|_| ())
            .map_err(|e| classify_token_error(e.to_string()))
    }

    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    fn endpoint_url(&self, model: &str) -> String {
        endpoint_url(&self.project_id, &self.location, model)
    }

    async fn access_token(&self) -> Result<String, ModelError> {
        let token = self
            .token_provider
            .token(&[VERTEX_AI_SCOPE])
            .await
            .map_err(|e| ModelError::Authentication(e.to_string()))?;
        Ok(token.as_str().to_string())
    }
}

#[async_trait]
impl ModelClient for VertexProvider {
    async fn generate_content(
        &self,
        request: GenerateRequest,
    ) -> Result<ModelResponse, ModelError> {
        if request.contents.is_empty() {
            return Err(ModelError::Validation("contents must not be empty".into()));
        }

        let body = GenerateContentRequest::new(&request.contents, request.generation_config);
        let token = self.access_token().await?;

        info!("Sending request to Vertex AI: model={}", request.model);

        let response = self
            .client
            .post(self.endpoint_url(&request.model))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Vertex AI error body".to_string());
            return Err(map_http_error(status.as_u16(), &body_text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        let (text, usage) = parsed.into_text()?;
        if let Some(usage) = usage {
            debug!(
                "Tokens: {} prompt + {} completion = {} total",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        info!("Received response from Vertex AI");
        Ok(ModelResponse { text, usage })
    }
}

fn endpoint_url(project_id: &str, location: &str, model: &str) -> String {
    format!(
        "https://{location}-aiplatform.googleapis.com/v1/projects/{project_id}/locations/{location}/publishers/google/models/{model}:generateContent"
    )
}

impl std::fmt::Debug for VertexProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VertexProvider")
            .field("project_id", &self.project_id)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regional_endpoint() {
        assert_eq!(
            endpoint_url("my-home", "us-central1", "gemini-1.0-pro"),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/my-home/locations/us-central1/publishers/google/models/gemini-1.0-pro:generateContent"
        );
    }

    #[test]
    fn test_vision_model_in_other_region() {
        assert_eq!(
            endpoint_url("p", "europe-west4", "gemini-1.0-pro-vision"),
            "https://europe-west4-aiplatform.googleapis.com/v1/projects/p/locations/europe-west4/publishers/google/models/gemini-1.0-pro-vision:generateContent"
        );
    }
}
