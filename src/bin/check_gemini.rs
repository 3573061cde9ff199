//! Utility to check that the configured Gemini key and model answer.

use portfolio_api::chat::extract_reply;
use portfolio_api::config::Config;
use portfolio_api::gemini_client::{GeminiClient, GenerationConfig};

/// Main entry point for the Gemini connectivity check.
///
/// Sends a fixed short prompt with a small output budget and prints the reply.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let client = GeminiClient::new(&config)?;

    let generation = GenerationConfig {
        max_output_tokens: 50,
        ..GenerationConfig::default()
    };

    match client.generate_content("Say hello", generation).await {
        Ok(response) => {
            println!("Model: {}", client.model());
            println!("Reply: {}", extract_reply(&response));
            Ok(())
        }
        Err(e) => {
            eprintln!("Gemini test failed: {}", e);
            Err(e.into())
        }
    }
}
