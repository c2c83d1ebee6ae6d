//! Chat command implementation.

use anyhow::{Context, Result};
use colored::Colorize;
use pharmacheck_core::{ChatClient, ChatConfig, ChatTranscript};
use serde_json::json;

use crate::Output;

/// Execute the chat command.
pub async fn execute(message: String, chat_url: Option<String>, out: Output) -> Result<()> {
    let mut config = ChatConfig::default();
    if let Some(url) = chat_url {
        config.base_url = url;
    }
    let client = ChatClient::with_config(config).context("Failed to configure the chat client")?;

    let mut transcript = ChatTranscript::new();
    let reply = transcript.send(&client, &message).await?;

    if out.json {
        println!("{:#}", json!({ "messages": transcript.messages() }));
    } else if !out.quiet {
        println!("{} {}", "Assistant:".cyan().bold(), reply);
    }
    Ok(())
}
