use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ServiceError;

/// A request/response service callable by `domain.service` name.
#[async_trait]
pub trait ServiceHandler: Send + Sync {
    async fn call(&self, data: Value) -> Result<Value, ServiceError>;
}

#[derive(Default)]
pub struct ServiceRegistry {
    services: HashMap<(String, String), Arc<dyn ServiceHandler>>,
}

impl ServiceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one under the same name.
    pub fn register(
        &mut self,
        domain: impl Into<String>,
        service: impl Into<String>,
        handler: Arc<dyn ServiceHandler>,
    ) {
        let key = (domain.into(), service.into());
        info!("Registering service {}.{}", key.0, key.1);
        self.services.insert(key, handler);
    }

    pub fn remove(&mut self, domain: &str, service: &str) -> bool {
        self.services
            .remove(&(domain.to_string(), service.to_string()))
            .is_some()
    }

    #[must_use]
    pub fn has_service(&self, domain: &str, service: &str) -> bool {
        self.services
            .contains_key(&(domain.to_string(), service.to_string()))
    }

    pub async fn call(
        &self,
        domain: &str,
        service: &str,
        data: Value,
    ) -> Result<Value, ServiceError> {
        let handler = self
            .services
            .get(&(domain.to_string(), service.to_string()))
            .cloned()
            .ok_or_else(|| ServiceError::UnknownService {
                domain: domain.to_string(),
                service: service.to_string(),
            })?;

        debug!("Calling service {domain}.{service}");
        handler.call(data).await
    }
}
