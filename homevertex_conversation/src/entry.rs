//! Config-entry lifecycle: set up a Vertex AI session and agent per entry,
//! tear them down on unload.

use std::collections::HashMap;
use std::sync::Arc;

use homevertex_config::{EntryConfig, HistoryConfig};
use homevertex_core::{Host, ModelClient};
use homevertex_providers::{SetupError, VertexProvider};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::agent::VertexAgent;

#[derive(Debug, Error)]
pub enum EntryError {
    /// Setup failed in a way the host should retry later
    #[error("Entry not ready: {0}")]
    NotReady(SetupError),

    /// The credential was rejected; the entry stays disabled
    #[error("Entry disabled: {0}")]
    Disabled(SetupError),

    #[error("Entry already loaded: {0}")]
    AlreadyLoaded(String),
}

impl From<SetupError> for EntryError {
    fn from(err: SetupError) -> Self {
        if err.is_fatal() {
            Self::Disabled(err)
        } else {
            Self::NotReady(err)
        }
    }
}

/// Session and agent owned by one loaded entry.
#[derive(Clone)]
pub struct LoadedEntry {
    pub client: Arc<dyn ModelClient>,
    pub agent: Arc<VertexAgent>,
}

pub struct EntryManager {
    host: Arc<dyn Host>,
    history_config: HistoryConfig,
    entries: RwLock<HashMap<String, LoadedEntry>>,
}

impl EntryManager {
    #[must_use]
    pub fn new(host: Arc<dyn Host>, history_config: HistoryConfig) -> Self {
        Self {
            host,
            history_config,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Authenticate against Vertex AI and register the entry's agent.
    pub async fn setup_entry(
        &self,
        entry_id: &str,
        config: &EntryConfig,
    ) -> Result<LoadedEntry, EntryError> {
        info!("Setting up entry {entry_id}");

        let provider = match VertexProvider::from_service_account_file(
            &config.credentials,
            config.location.clone(),
        )
        .await
        {
            Ok(provider) => provider,
            Err(err) => {
                warn!("Could not load credentials for entry {entry_id}: {err}");
                return Err(err.into());
            }
        };

        if let Err(err) = provider.verify().await {
            if err.is_fatal() {
                error!("Invalid credential for entry {entry_id}: {err}");
            } else {
                warn!("Entry {entry_id} not ready: {err}");
            }
            return Err(err.into());
        }

        info!(
            "Entry {entry_id} bound to project {} in {}",
            provider.project_id(),
            provider.location()
        );
        self.setup_with_client(entry_id, config, Arc::new(provider))
            .await
    }

    /// Register an entry backed by an already initialized client.
    pub async fn setup_with_client(
        &self,
        entry_id: &str,
        config: &EntryConfig,
        client: Arc<dyn ModelClient>,
    ) -> Result<LoadedEntry, EntryError> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(entry_id) {
            return Err(EntryError::AlreadyLoaded(entry_id.to_string()));
        }

        let agent = Arc::new(VertexAgent::new(
            Arc::clone(&self.host),
            Arc::clone(&client),
            config.options.clone(),
            self.history_config.clone(),
        ));
        let loaded = LoadedEntry { client, agent };
        entries.insert(entry_id.to_string(), loaded.clone());

        info!("Entry {entry_id} loaded");
        Ok(loaded)
    }

    /// Drop the entry's agent and client. Returns false if it was not loaded.
    pub async fn unload_entry(&self, entry_id: &str) -> bool {
        let removed = self.entries.write().await.remove(entry_id).is_some();
        if removed {
            info!("Entry {entry_id} unloaded");
        }
        removed
    }

    pub async fn get(&self, entry_id: &str) -> Option<LoadedEntry> {
        self.entries.read().await.get(entry_id).cloned()
    }

    pub async fn is_loaded(&self, entry_id: &str) -> bool {
        self.entries.read().await.contains_key(entry_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use homevertex_core::{GenerateRequest, InMemoryHost, ModelError, ModelResponse};

    struct EchoClient;

    #[async_trait]
    impl ModelClient for EchoClient {
        async fn generate_content(
            &self,
            request: GenerateRequest,
        ) -> Result<ModelResponse, ModelError> {
            Ok(ModelResponse {
                text: request.model,
                usage: None,
            })
        }
    }

    fn manager() -> EntryManager {
        EntryManager::new(Arc::new(InMemoryHost::default()), HistoryConfig::default())
    }

    #[tokio::test]
    async fn test_missing_credentials_is_not_ready() {
        let manager = manager();
        let config = EntryConfig {
            credentials: std::env::temp_dir()
                .join(format!("homevertex_missing_{}.json", uuid::Uuid::now_v7())),
            ..EntryConfig::default()
        };

        let err = manager.setup_entry("entry-1", &config).await.err().unwrap();
        assert!(matches!(err, EntryError::NotReady(_)));
        assert!(!manager.is_loaded("entry-1").await);
    }

    #[tokio::test]
    async fn test_setup_and_unload() {
        let manager = manager();
        let config = EntryConfig::default();

        manager
            .setup_with_client("entry-1", &config, Arc::new(EchoClient))
            .await
            .unwrap();
        assert!(manager.is_loaded("entry-1").await);

        let duplicate = manager
            .setup_with_client("entry-1", &config, Arc::new(EchoClient))
            .await;
        assert!(matches!(duplicate, Err(EntryError::AlreadyLoaded(_))));

        assert!(manager.unload_entry("entry-1").await);
        assert!(!manager.unload_entry("entry-1").await);
        assert!(manager.get("entry-1").await.is_none());
    }

    #[test]
    fn test_setup_error_classification() {
        let err: EntryError = SetupError::InvalidCredential("invalid_grant".to_string()).into();
        assert!(matches!(err, EntryError::Disabled(_)));

        let err: EntryError = SetupError::Authentication("timeout".to_string()).into();
        assert!(matches!(err, EntryError::NotReady(_)));
    }
}
