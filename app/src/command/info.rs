use homevertex_config::Config;
use homevertex_conversation::{PromptRenderer, collect_exposed_entities};
use homevertex_core::Host;

use super::load_host;

/// Strategy for displaying the resolved configuration.
///
/// Prints the entry settings, history limits, the entities the agent would
/// see, and the system prompt rendered from them. Needs no credentials.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let host = load_host(&config)?;

        println!("=== homevertex Configuration ===\n");

        println!("Entry:");
        println!("  Credentials: {}", config.entry.credentials.display());
        println!("  Location: {}", config.entry.location);
        println!();

        let options = &config.entry.options;
        println!("Options:");
        println!("  Model: {}", options.model);
        println!("  Temperature: {}", options.temperature);
        println!("  Top P: {}", options.top_p);
        println!("  Top K: {}", options.top_k);
        println!("  Max Tokens: {}", options.max_tokens);
        println!();

        println!("History:");
        println!("  Max Conversations: {}", config.history.max_conversations);
        println!("  Idle Timeout: {}s", config.history.idle_timeout_secs);
        println!("  Max Exchange Turns: {}", config.history.max_exchange_turns);
        println!();

        let entities = collect_exposed_entities(&host);
        println!("Host: {}", host.location_name());
        match &config.host_snapshot {
            Some(path) => println!("  Snapshot: {}", path.display()),
            None => println!("  Snapshot: (not set)"),
        }
        println!("  Exposed Entities: {}", entities.len());
        for entity in &entities {
            println!("    {} ({}): {}", entity.entity_id, entity.name, entity.state);
        }
        println!();

        println!("Prompt:");
        match PromptRenderer::default().render(
            &options.prompt,
            &host.location_name(),
            &entities,
            None,
        ) {
            Ok(prompt) => println!("{prompt}"),
            Err(e) => println!("  Error: {e}"),
        }

        Ok(())
    }
}
