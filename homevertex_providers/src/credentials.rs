//! Service-account key loading.

use std::path::Path;

use serde::Deserialize;

use crate::error::SetupError;

#[derive(Deserialize)]
struct KeyFields {
    #[serde(rename = "type")]
    kind: Option<String>,
    project_id: Option<String>,
    client_email: Option<String>,
    private_key: Option<String>,
}

/// A parsed service-account key file and the project it is bound to.
#[derive(Clone)]
pub struct ServiceAccountKey {
    project_id: String,
    client_email: String,
    json: String,
}

impl ServiceAccountKey {
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SetupError::CredentialsFile {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::from_json(json).map_err(|e| match e {
            SetupError::Authentication(message) => SetupError::CredentialsFile {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    pub fn from_json(json: String) -> Result<Self, SetupError> {
        let fields: KeyFields = serde_json::from_str(&json)
            .map_err(|e| SetupError::Authentication(format!("malformed key file: {e}")))?;

        if fields.kind.as_deref() != Some("service_account") {
            return Err(SetupError::Authentication(
                "key file is not a service account key".to_string(),
            ));
        }
        if fields.private_key.as_deref().is_none_or(str::is_empty) {
            return Err(SetupError::Authentication(
                "key file has no private_key".to_string(),
            ));
        }
        let project_id = fields
            .project_id
            .filter(|p| !p.is_empty())
            .ok_or_else(|| SetupError::Authentication("key file has no project_id".to_string()))?;

        Ok(Self {
            project_id,
            client_email: fields.client_email.unwrap_or_default(),
            json,
        })
    }

    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    #[must_use]
    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    pub(crate) fn json(&self) -> &str {
        &self.json
    }
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .finish_non_exhaustive()
    }
}
