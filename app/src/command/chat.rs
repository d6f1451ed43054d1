//! Conversation turns against the configured entry's agent.

use std::io::Write;

use homevertex_core::{ConversationAgent, ConversationInput, ConversationResult};
use tracing::info;

use super::Runtime;

#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Single message to send (non-interactive mode)
    pub message: Option<String>,
    /// Conversation to continue; unknown ids start a new one
    pub conversation_id: Option<String>,
    pub device_id: Option<String>,
    pub language: String,
}

impl ChatInput {
    fn turn(&self, text: &str, conversation_id: Option<&str>) -> ConversationInput {
        let mut input = ConversationInput::new(text, self.language.clone());
        if let Some(id) = conversation_id {
            input = input.with_conversation_id(id);
        }
        if let Some(device_id) = &self.device_id {
            input = input.with_device_id(device_id.clone());
        }
        input
    }
}

/// Strategy for the chat command.
///
/// With `--message` it runs one turn; otherwise it reads utterances from
/// stdin and keeps following the conversation id the agent hands back.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let runtime = Runtime::start().await?;
        let agent = &runtime.entry.agent;

        if let Some(message) = &input.message {
            let result = agent
                .process(&input.turn(message, input.conversation_id.as_deref()))
                .await;
            print_result(&result);
            info!("Conversation id: {}", result.conversation_id);
        } else {
            let mut conversation_id = input.conversation_id.clone();

            println!("=== Vertex AI Conversation ===");
            println!("Type 'exit', 'quit', or Ctrl+C to end the session.\n");

            loop {
                print!("> ");
                std::io::stdout().flush()?;

                let mut line = String::new();
                if std::io::stdin().read_line(&mut line)? == 0 {
                    break;
                }
                let line = line.trim();

                if matches!(line, "exit" | "quit" | "q") {
                    break;
                }
                if line.is_empty() {
                    continue;
                }

                let result = agent
                    .process(&input.turn(line, conversation_id.as_deref()))
                    .await;
                print_result(&result);
                conversation_id = Some(result.conversation_id);
            }

            if let Some(id) = conversation_id {
                println!("\nConversation id: {id}");
            }
        }

        runtime.shutdown().await;
        Ok(())
    }
}

fn print_result(result: &ConversationResult) {
    let speech = result.response.speech.as_deref().unwrap_or_default();
    if result.response.is_error() {
        eprintln!("\n{speech}\n");
    } else {
        println!("\n{speech}\n");
    }
}
