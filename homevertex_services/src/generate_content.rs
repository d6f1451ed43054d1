//! One-shot `generate_content` service: a prompt plus optional images in,
//! generated text out. No conversation state is involved.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use homevertex_core::{Content, GenerateRequest, Host, ModelClient, Part, Role};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::error::ServiceError;
use crate::registry::ServiceHandler;

pub const SERVICE_GENERATE_CONTENT: &str = "generate_content";

/// Model used when the call carries no images.
pub const TEXT_MODEL: &str = "gemini-1.0-pro";

/// Model used as soon as one image is attached.
pub const VISION_MODEL: &str = "gemini-1.0-pro-vision";

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentData {
    pub prompt: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub image_filename: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GenerateContentReply {
    pub text: String,
}

/// Accept either a single path or a list of paths.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(PathBuf),
        Many(Vec<PathBuf>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(path) => vec![path],
        OneOrMany::Many(paths) => paths,
    })
}

pub struct GenerateContentService {
    host: Arc<dyn Host>,
    client: Arc<dyn ModelClient>,
}

impl GenerateContentService {
    #[must_use]
    pub fn new(host: Arc<dyn Host>, client: Arc<dyn ModelClient>) -> Self {
        Self { host, client }
    }

    pub async fn generate(
        &self,
        data: GenerateContentData,
    ) -> Result<GenerateContentReply, ServiceError> {
        let mut images = Vec::with_capacity(data.image_filename.len());
        for path in data.image_filename {
            let mime_type = self.check_image(&path).await?;
            images.push((path, mime_type));
        }

        let model = if images.is_empty() {
            TEXT_MODEL
        } else {
            VISION_MODEL
        };

        let mut parts = vec![Part::text(data.prompt)];
        for (path, mime_type) in images {
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|source| ServiceError::Read { path, source })?;
            parts.push(Part::InlineData {
                mime_type,
                data: bytes,
            });
        }

        info!("Generating content with {model} from {} parts", parts.len());
        let response = self
            .client
            .generate_content(GenerateRequest {
                model: model.to_string(),
                contents: vec![Content {
                    role: Role::User,
                    parts,
                }],
                generation_config: None,
            })
            .await
            .map_err(|err| {
                error!("Error generating content: {err}");
                ServiceError::from(err)
            })?;

        debug!("Generated: {}", response.text);
        Ok(GenerateContentReply {
            text: response.text,
        })
    }

    /// Returns the image's MIME type once the path passes every check.
    async fn check_image(&self, path: &Path) -> Result<String, ServiceError> {
        if !self.host.is_allowed_path(path) {
            return Err(ServiceError::PathNotAllowed(path.to_path_buf()));
        }
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(ServiceError::NotFound(path.to_path_buf()));
        }
        match mime_guess::from_path(path).first() {
            Some(mime) if mime.type_() == mime_guess::mime::IMAGE => {
                Ok(mime.essence_str().to_string())
            }
            _ => Err(ServiceError::NotAnImage(path.to_path_buf())),
        }
    }
}

#[async_trait]
impl ServiceHandler for GenerateContentService {
    async fn call(&self, data: Value) -> Result<Value, ServiceError> {
        let data: GenerateContentData = serde_json::from_value(data)?;
        let reply = self.generate(data).await?;
        Ok(serde_json::to_value(reply)?)
    }
}
