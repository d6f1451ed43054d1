use std::path::PathBuf;

use homevertex_core::DOMAIN;
use homevertex_services::SERVICE_GENERATE_CONTENT;
use serde_json::json;

use super::Runtime;

#[derive(Debug, Clone)]
pub struct GenerateInput {
    pub prompt: String,
    pub images: Vec<PathBuf>,
}

/// Strategy for calling the `generate_content` service once.
#[derive(Debug, Clone, Copy)]
pub struct GenerateStrategy;

impl super::CommandStrategy for GenerateStrategy {
    type Input = GenerateInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let runtime = Runtime::start().await?;
        let services = runtime.services();

        let reply = services
            .call(
                DOMAIN,
                SERVICE_GENERATE_CONTENT,
                json!({
                    "prompt": input.prompt,
                    "image_filename": input.images,
                }),
            )
            .await;

        runtime.shutdown().await;

        let reply = reply?;
        println!("{}", reply["text"].as_str().unwrap_or_default());
        Ok(())
    }
}
