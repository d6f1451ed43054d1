#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod command;

use command::{
    ChatInput, ChatStrategy, CommandStrategy, GenerateInput, GenerateStrategy, InfoStrategy,
    InitStrategy, VersionStrategy,
};

#[derive(Parser)]
#[command(name = "homevertex")]
#[command(about = "Vertex AI conversation agent for the smart home", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Init,
    /// Show resolved configuration and exposed entities
    Info,
    /// Talk to the conversation agent
    Chat {
        /// Single message to send
        #[arg(short = 'm', long)]
        message: Option<String>,

        /// Conversation to continue
        #[arg(short = 'c', long)]
        conversation_id: Option<String>,

        /// Device the utterance comes from
        #[arg(long)]
        device_id: Option<String>,

        /// Language tag reported to the agent
        #[arg(short = 'l', long, default_value = "en")]
        language: String,
    },
    /// Call the one-shot generate_content service
    Generate {
        /// Prompt text
        #[arg(short = 'p', long)]
        prompt: String,

        /// Image file to attach (repeatable)
        #[arg(short = 'i', long = "image")]
        images: Vec<PathBuf>,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Info => InfoStrategy.execute(()).await,
        Commands::Chat {
            message,
            conversation_id,
            device_id,
            language,
        } => {
            ChatStrategy
                .execute(ChatInput {
                    message,
                    conversation_id,
                    device_id,
                    language,
                })
                .await
        }
        Commands::Generate { prompt, images } => {
            GenerateStrategy
                .execute(GenerateInput { prompt, images })
                .await
        }
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
