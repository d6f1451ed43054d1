//! Wire types for the Vertex AI `generateContent` endpoint.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use homevertex_core::{Content, GenerationConfig, ModelError, Part, Role, Usage};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<WireGenerationConfig>,
}

#[derive(Debug, Serialize)]
pub struct WireContent {
    pub role: &'static str,
    pub parts: Vec<WirePart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum WirePart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineDataPayload {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireGenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl From<GenerationConfig> for WireGenerationConfig {
    fn from(config: GenerationConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

impl From<&Content> for WireContent {
    fn from(content: &Content) -> Self {
        let role = match content.role {
            Role::User => "user",
            Role::Model => "model",
        };
        let parts = content
            .parts
            .iter()
            .map(|part| match part {
                Part::Text(text) => WirePart::Text { text: text.clone() },
                Part::InlineData { mime_type, data } => WirePart::InlineData {
                    inline_data: InlineDataPayload {
                        mime_type: mime_type.clone(),
                        data: BASE64_STANDARD.encode(data),
                    },
                },
            })
            .collect();
        Self { role, parts }
    }
}

impl GenerateContentRequest {
    #[must_use]
    pub fn new(contents: &[Content], generation_config: Option<GenerationConfig>) -> Self {
        Self {
            contents: contents.iter().map(WireContent::from).collect(),
            generation_config: generation_config.map(WireGenerationConfig::from),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    pub candidates: Option<Vec<Candidate>>,
    pub usage_metadata: Option<UsageMetadata>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, or a validation error when the model
    /// produced none (for example because the prompt was blocked).
    pub fn into_text(self) -> Result<(String, Option<Usage>), ModelError> {
        let usage = self.usage_metadata.map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ModelError::Validation(format!(
                "prompt was blocked: {reason}"
            )));
        }

        let Some(candidate) = self.candidates.and_then(|c| c.into_iter().next()) else {
            return Err(ModelError::InvalidResponse(
                "response has no candidates".to_string(),
            ));
        };

        let texts: Vec<String> = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if texts.is_empty() {
            let reason = candidate
                .finish_reason
                .unwrap_or_else(|| "unknown".to_string());
            return Err(ModelError::Validation(format!(
                "response has no text (finish reason: {reason})"
            )));
        }

        Ok((texts.concat(), usage))
    }
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

pub fn map_http_error(status: u16, body: &str) -> ModelError {
    let message = serde_json::from_str::<ErrorWrapper>(body).map_or_else(
        |_| body.to_string(),
        |wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        },
    );
    ModelError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let contents = vec![
            Content::user_text("system prompt"),
            Content::model_text("Ok"),
            Content {
                role: Role::User,
                parts: vec![
                    Part::text("what is this?"),
                    Part::InlineData {
                        mime_type: "image/png".to_string(),
                        data: b"png".to_vec(),
                    },
                ],
            },
        ];
        let config = GenerationConfig {
            temperature: 0.5,
            top_p: 1.0,
            top_k: 1,
            max_output_tokens: 150,
        };

        let body = serde_json::to_value(GenerateContentRequest::new(&contents, Some(config)))
            .unwrap();

        assert_eq!(
            body,
            json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "system prompt"}]},
                    {"role": "model", "parts": [{"text": "Ok"}]},
                    {"role": "user", "parts": [
                        {"text": "what is this?"},
                        {"inlineData": {"mimeType": "image/png", "data": "cG5n"}}
                    ]}
                ],
                "generationConfig": {
                    "temperature": 0.5,
                    "topP": 1.0,
                    "topK": 1,
                    "maxOutputTokens": 150
                }
            })
        );
    }

    #[test]
    fn test_request_without_generation_config() {
        let body = serde_json::to_value(GenerateContentRequest::new(
            &[Content::user_text("hi")],
            None,
        ))
        .unwrap();
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_response_text_and_usage() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "The porch "}, {"text": "light is off."}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5, "totalTokenCount": 15}
        }))
        .unwrap();

        let (text, usage) = response.into_text().unwrap();
        assert_eq!(text, "The porch light is off.");
        assert_eq!(usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn test_blocked_response_is_validation_error() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        assert!(matches!(
            response.into_text(),
            Err(ModelError::Validation(msg)) if msg.contains("SAFETY")
        ));
    }

    #[test]
    fn test_empty_candidate_reports_finish_reason() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"finishReason": "MAX_TOKENS"}]
        }))
        .unwrap();
        let err = response.into_text().unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }

    #[test]
    fn test_map_http_error_envelope() {
        let err = map_http_error(
            400,
            r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#,
        );
        assert_eq!(
            err.to_string(),
            "API error (400): INVALID_ARGUMENT: API key not valid."
        );

        let err = map_http_error(502, "bad gateway");
        assert_eq!(err.to_string(), "API error (502): bad gateway");
    }
}
