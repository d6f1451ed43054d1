use homevertex_core::GenerationConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub const DEFAULT_CHAT_MODEL: &str = "gemini-1.0-pro";
pub const DEFAULT_TEMPERATURE: f32 = 0.9;
pub const DEFAULT_TOP_P: f32 = 1.0;
pub const DEFAULT_TOP_K: u32 = 1;
pub const DEFAULT_MAX_TOKENS: u32 = 150;
pub const DEFAULT_CREDENTIALS: &str = "/config/googlecloud.json";
pub const DEFAULT_LOCATION: &str = "us-central1";

pub const DEFAULT_PROMPT: &str = r"I want you to act as smart home manager of Home Assistant.
I will provide information of smart home along with a question, you will truthfully make correction or answer using information provided in one sentence in everyday language.

Current Time: {{now()}}

Available Devices:
```csv
entity_id,name,state,aliases
{% for entity in exposed_entities -%}
{{ entity.entity_id }},{{ entity.name }},{{ entity.state }},{{entity.aliases | join('/')}}
{% endfor -%}
```

The current state of devices is provided in available devices.
";

/// Settings of one configured entry: where the credentials live, which
/// region to call, and the per-turn model options.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EntryConfig {
    #[serde(default = "EntryConfig::default_credentials")]
    pub credentials: PathBuf,
    #[serde(default = "EntryConfig::default_location")]
    pub location: String,
    #[serde(default)]
    pub options: EntryOptions,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            credentials: Self::default_credentials(),
            location: Self::default_location(),
            options: EntryOptions::default(),
        }
    }
}

impl EntryConfig {
    fn default_credentials() -> PathBuf {
        PathBuf::from(DEFAULT_CREDENTIALS)
    }

    fn default_location() -> String {
        DEFAULT_LOCATION.to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EntryOptions {
    #[serde(default = "EntryOptions::default_model")]
    pub model: String,
    #[serde(default = "EntryOptions::default_temperature")]
    pub temperature: f32,
    #[serde(default = "EntryOptions::default_top_p")]
    pub top_p: f32,
    #[serde(default = "EntryOptions::default_top_k")]
    pub top_k: u32,
    #[serde(default = "EntryOptions::default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "EntryOptions::default_prompt")]
    pub prompt: String,
}

impl Default for EntryOptions {
    fn default() -> Self {
        Self {
            model: Self::default_model(),
            temperature: Self::default_temperature(),
            top_p: Self::default_top_p(),
            top_k: Self::default_top_k(),
            max_tokens: Self::default_max_tokens(),
            prompt: Self::default_prompt(),
        }
    }
}

impl EntryOptions {
    fn default_model() -> String {
        DEFAULT_CHAT_MODEL.to_string()
    }

    const fn default_temperature() -> f32 {
        DEFAULT_TEMPERATURE
    }

    const fn default_top_p() -> f32 {
        DEFAULT_TOP_P
    }

    const fn default_top_k() -> u32 {
        DEFAULT_TOP_K
    }

    const fn default_max_tokens() -> u32 {
        DEFAULT_MAX_TOKENS
    }

    fn default_prompt() -> String {
        DEFAULT_PROMPT.to_string()
    }

    #[must_use]
    pub const fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: self.temperature,
            top_p: self.top_p,
            top_k: self.top_k,
            max_output_tokens: self.max_tokens,
        }
    }
}

/// Retention policy for in-memory conversation histories.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Most conversations kept at once; the least recently used is evicted.
    /// Values below 1 act as 1
    #[serde(default = "HistoryConfig::default_max_conversations")]
    pub max_conversations: usize,
    /// Conversations idle longer than this are dropped; 0 keeps them forever
    #[serde(default = "HistoryConfig::default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// Exchange turns kept after the two reserved prompt slots; 0 keeps all
    #[serde(default = "HistoryConfig::default_max_exchange_turns")]
    pub max_exchange_turns: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_conversations: Self::default_max_conversations(),
            idle_timeout_secs: Self::default_idle_timeout_secs(),
            max_exchange_turns: Self::default_max_exchange_turns(),
        }
    }
}

impl HistoryConfig {
    const fn default_max_conversations() -> usize {
        256
    }

    const fn default_idle_timeout_secs() -> u64 {
        3600
    }

    const fn default_max_exchange_turns() -> usize {
        40
    }

    #[must_use]
    pub const fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    #[must_use]
    pub const fn with_max_conversations(mut self, max: usize) -> Self {
        self.max_conversations = max;
        self
    }

    #[must_use]
    pub const fn with_idle_timeout_secs(mut self, secs: u64) -> Self {
        self.idle_timeout_secs = secs;
        self
    }

    #[must_use]
    pub const fn with_max_exchange_turns(mut self, turns: usize) -> Self {
        self.max_exchange_turns = turns;
        self
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(flatten)]
    pub entry: EntryConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    /// JSON snapshot of host entities used by the CLI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_snapshot: Option<PathBuf>,
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("homevertex"))
    }

    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_dir()?.join("config.json");

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'homevertex init' to create config.",
                config_path.display()
            );
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let host_path = config_dir.join("host.json");
        let mut config = Self {
            host_snapshot: Some(host_path.clone()),
            ..Self::default()
        };
        config.entry.credentials = config_dir.join("googlecloud.json");

        std::fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;

        if !host_path.exists() {
            let host_template = r#"{
  "location_name": "Home",
  "allowlist_external_dirs": ["/media"],
  "entities": [
    {
      "entity_id": "light.living_room",
      "name": "Living Room Light",
      "state": "off",
      "aliases": ["lounge lamp"]
    }
  ]
}"#;
            std::fs::write(&host_path, host_template)?;
        }

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!(
            "   1. Save your Google Cloud service account key as {}",
            config.entry.credentials.display()
        );
        println!("   2. Describe your devices in {}", host_path.display());
        println!("   3. Run 'homevertex chat' to start a conversation");
        println!();
        println!("🔧 Configuration options:");
        println!("   - location: Vertex AI region (us-central1, europe-west4, etc.)");
        println!("   - options.model / temperature / top_p / top_k / max_tokens: sampling");
        println!("   - options.prompt: Jinja template for the system prompt");
        println!("   - history: conversation retention limits");
        println!();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.entry.credentials, PathBuf::from(DEFAULT_CREDENTIALS));
        assert_eq!(config.entry.location, DEFAULT_LOCATION);
        assert_eq!(config.entry.options, EntryOptions::default());
        assert_eq!(config.history, HistoryConfig::default());
        assert!(config.host_snapshot.is_none());
    }

    #[test]
    fn test_generation_config_defaults() {
        let generation = EntryOptions::default().generation_config();
        assert!((generation.temperature - 0.9).abs() < f32::EPSILON);
        assert!((generation.top_p - 1.0).abs() < f32::EPSILON);
        assert_eq!(generation.top_k, 1);
        assert_eq!(generation.max_output_tokens, 150);
    }

    #[test]
    fn test_partial_options_keep_other_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"location": "europe-west4", "options": {"model": "gemini-1.5-flash", "top_k": 40}}"#,
        )
        .unwrap();
        assert_eq!(config.entry.location, "europe-west4");
        assert_eq!(config.entry.options.model, "gemini-1.5-flash");
        assert_eq!(config.entry.options.top_k, 40);
        assert_eq!(config.entry.options.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.entry.options.prompt, DEFAULT_PROMPT);
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("homevertex_cfg_{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(
            &path,
            r#"{"credentials": "/tmp/key.json", "history": {"max_conversations": 3}}"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.entry.credentials, PathBuf::from("/tmp/key.json"));
        assert_eq!(config.history.max_conversations, 3);
        assert_eq!(config.history.max_exchange_turns, 40);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
