//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input, dispatched
//! statically from `main`.

use std::sync::Arc;

use homevertex_config::Config;
use homevertex_conversation::{EntryManager, LoadedEntry};
use homevertex_core::{DOMAIN, Host, InMemoryHost};
use homevertex_services::{GenerateContentService, SERVICE_GENERATE_CONTENT, ServiceRegistry};
use tracing::info;

mod chat;
mod generate;
mod info;
mod init;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use generate::{GenerateInput, GenerateStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use version::VersionStrategy;

/// The CLI drives a single config entry.
const ENTRY_ID: &str = "default";

/// Contract shared by all command strategies.
///
/// Each strategy declares its own input type, so commands take typed
/// parameters without boxing or runtime casting.
pub trait CommandStrategy: Send + Sync + 'static {
    type Input;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Host snapshot from the configured file, or an empty home.
fn load_host(config: &Config) -> anyhow::Result<InMemoryHost> {
    match &config.host_snapshot {
        Some(path) => {
            info!("Loading host snapshot from {}", path.display());
            InMemoryHost::load(path)
        }
        None => Ok(InMemoryHost::default()),
    }
}

/// Everything a command needs once the entry is loaded.
struct Runtime {
    host: Arc<dyn Host>,
    manager: EntryManager,
    entry: LoadedEntry,
}

impl Runtime {
    async fn start() -> anyhow::Result<Self> {
        let config = Config::load()?;
        let host: Arc<dyn Host> = Arc::new(load_host(&config)?);

        let manager = EntryManager::new(Arc::clone(&host), config.history.clone());
        let entry = manager.setup_entry(ENTRY_ID, &config.entry).await?;

        Ok(Self {
            host,
            manager,
            entry,
        })
    }

    fn services(&self) -> ServiceRegistry {
        let mut registry = ServiceRegistry::new();
        registry.register(
            DOMAIN,
            SERVICE_GENERATE_CONTENT,
            Arc::new(GenerateContentService::new(
                Arc::clone(&self.host),
                Arc::clone(&self.entry.client),
            )),
        );
        registry
    }

    async fn shutdown(self) {
        self.manager.unload_entry(ENTRY_ID).await;
    }
}
