//! Integration tests for the `generate_content` service.
//!
//! These tests verify that:
//! - The text-only model is used without images and the vision model with them
//! - Image parts follow the prompt in the order given
//! - Path validation fails before any remote call is made
//! - Remote failures surface as a service error

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use homevertex_core::{
    DOMAIN, GenerateRequest, InMemoryHost, ModelClient, ModelError, ModelResponse, Part,
};
use homevertex_services::{
    GenerateContentData, GenerateContentService, SERVICE_GENERATE_CONTENT, ServiceError,
    ServiceRegistry, TEXT_MODEL, VISION_MODEL,
};
use serde_json::json;

#[derive(Default)]
struct RecordingClient {
    fail: bool,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl RecordingClient {
    fn failing() -> Self {
        Self {
            fail: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for RecordingClient {
    async fn generate_content(
        &self,
        request: GenerateRequest,
    ) -> Result<ModelResponse, ModelError> {
        self.requests.lock().unwrap().push(request);
        if self.fail {
            return Err(ModelError::Api {
                status: 400,
                message: "INVALID_ARGUMENT: bad image".to_string(),
            });
        }
        Ok(ModelResponse {
            text: "A cat on a sofa.".to_string(),
            usage: None,
        })
    }
}

/// Temporary directory that is removed on drop.
struct TempDir(PathBuf);

impl TempDir {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("homevertex_services_{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        Self(dir)
    }

    fn write(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.0.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn service(dir: &TempDir, client: &Arc<RecordingClient>) -> GenerateContentService {
    let host = InMemoryHost::default().with_allowed_dir(&dir.0);
    GenerateContentService::new(Arc::new(host), Arc::clone(client) as Arc<dyn ModelClient>)
}

#[tokio::test]
async fn test_text_only_uses_text_model() {
    let dir = TempDir::new();
    let client = Arc::new(RecordingClient::default());
    let service = service(&dir, &client);

    let reply = service
        .generate(GenerateContentData {
            prompt: "Write a haiku".to_string(),
            image_filename: Vec::new(),
        })
        .await
        .unwrap();

    assert_eq!(reply.text, "A cat on a sofa.");
    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model, TEXT_MODEL);
    assert!(requests[0].generation_config.is_none());
    assert_eq!(requests[0].contents.len(), 1);
    assert_eq!(
        requests[0].contents[0].parts,
        vec![Part::text("Write a haiku")]
    );
}

#[tokio::test]
async fn test_images_use_vision_model_in_order() {
    let dir = TempDir::new();
    let first = dir.write("first.png", b"png-bytes");
    let second = dir.write("second.jpg", b"jpg-bytes");
    let client = Arc::new(RecordingClient::default());
    let service = service(&dir, &client);

    service
        .generate(GenerateContentData {
            prompt: "Describe".to_string(),
            image_filename: vec![first, second],
        })
        .await
        .unwrap();

    let requests = client.requests();
    assert_eq!(requests[0].model, VISION_MODEL);
    assert_eq!(
        requests[0].contents[0].parts,
        vec![
            Part::text("Describe"),
            Part::InlineData {
                mime_type: "image/png".to_string(),
                data: b"png-bytes".to_vec(),
            },
            Part::InlineData {
                mime_type: "image/jpeg".to_string(),
                data: b"jpg-bytes".to_vec(),
            },
        ]
    );
}

#[tokio::test]
async fn test_disallowed_path_never_reaches_model() {
    let dir = TempDir::new();
    let outside = TempDir::new();
    let image = outside.write("secret.png", b"png");
    let client = Arc::new(RecordingClient::default());
    let service = service(&dir, &client);

    let err = service
        .generate(GenerateContentData {
            prompt: "Describe".to_string(),
            image_filename: vec![image],
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::PathNotAllowed(_)));
    assert!(err.to_string().contains("no access to path"));
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn test_missing_file_is_rejected() {
    let dir = TempDir::new();
    let client = Arc::new(RecordingClient::default());
    let service = service(&dir, &client);

    let missing = dir.0.join("missing.png");
    let err = service
        .generate(GenerateContentData {
            prompt: "Describe".to_string(),
            image_filename: vec![missing.clone()],
        })
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        format!("`{}` does not exist", missing.display())
    );
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn test_non_image_is_rejected() {
    let dir = TempDir::new();
    let image = dir.write("ok.png", b"png");
    let notes = dir.write("notes.txt", b"hello");
    let client = Arc::new(RecordingClient::default());
    let service = service(&dir, &client);

    let err = service
        .generate(GenerateContentData {
            prompt: "Describe".to_string(),
            image_filename: vec![image, notes],
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::NotAnImage(_)));
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn test_remote_failure_is_raised() {
    let dir = TempDir::new();
    let client = Arc::new(RecordingClient::failing());
    let service = service(&dir, &client);

    let err = service
        .generate(GenerateContentData {
            prompt: "Hi".to_string(),
            image_filename: Vec::new(),
        })
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Error generating content: API error (400): INVALID_ARGUMENT: bad image"
    );
    assert_eq!(client.requests().len(), 1);
}

#[tokio::test]
async fn test_registry_call_returns_text() {
    let dir = TempDir::new();
    let image = dir.write("cat.webp", b"webp");
    let client = Arc::new(RecordingClient::default());

    let mut registry = ServiceRegistry::new();
    registry.register(
        DOMAIN,
        SERVICE_GENERATE_CONTENT,
        Arc::new(service(&dir, &client)),
    );

    let reply = registry
        .call(
            DOMAIN,
            SERVICE_GENERATE_CONTENT,
            json!({"prompt": "What is this?", "image_filename": image}),
        )
        .await
        .unwrap();

    assert_eq!(reply, json!({"text": "A cat on a sofa."}));
    assert_eq!(client.requests()[0].model, VISION_MODEL);

    let err = registry
        .call(DOMAIN, SERVICE_GENERATE_CONTENT, json!({"image_filename": []}))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidData(_)));
}
