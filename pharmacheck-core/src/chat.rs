//! Assistant chat client.
//!
//! Questions are proxied to a remote chat API. The assistant is a
//! convenience: every failure degrades to a fixed apology instead of an
//! error surfaced to the user.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::ChatError;

/// Default chat service base URL.
pub const DEFAULT_CHAT_URL: &str = "https://ai-chat-bot-oig5.onrender.com";

/// Path of the chat endpoint under the base URL.
const CHAT_PATH: &str = "api/chat/";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const WELCOME_MESSAGE: &str =
    "Hello! I'm your PharmaCheck assistant. How can I help you today?";

/// Reply when the service answered without any text.
pub const EMPTY_REPLY: &str = "I apologize, I couldn't process that. Please try again.";

/// Reply when the service could not be reached or answered with an error.
pub const APOLOGY: &str =
    "Sorry, I'm having trouble connecting right now. Please try again later.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    response: Option<String>,
    message: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> String {
        [self.response, self.message]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or_else(|| EMPTY_REPLY.to_string())
    }
}

/// Configuration for the chat client.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("PHARMACHECK_CHAT_URL")
                .unwrap_or_else(|_| DEFAULT_CHAT_URL.to_string()),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

pub struct ChatClient {
    client: Client,
    endpoint: Url,
}

impl ChatClient {
    pub fn new() -> Result<Self, ChatError> {
        Self::with_config(ChatConfig::default())
    }

    #[instrument(level = "debug", skip_all, fields(base_url = %config.base_url))]
    pub fn with_config(config: ChatConfig) -> Result<Self, ChatError> {
        let base = format!("{}/", config.base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&base)
            .and_then(|base| base.join(CHAT_PATH))
            .map_err(|e| ChatError::Unavailable(format!("Invalid chat URL: {e}")))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ChatError::Unavailable(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Ask the assistant. Service failures come back as [`ChatError::Unavailable`].
    #[instrument(level = "info", skip(self, message), fields(chars = message.len()))]
    pub async fn ask(&self, message: &str) -> Result<String, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let start = Instant::now();
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&ChatRequest { message })
            .send()
            .await
            .map_err(|e| ChatError::Unavailable(e.to_string()))?;

        let status = response.status();
        debug!(status = %status, "Received chat response");
        if !status.is_success() {
            return Err(ChatError::Unavailable(format!(
                "chat API returned status: {status}"
            )));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Unavailable(format!("invalid chat response: {e}")))?;

        info!(
            latency_ms = start.elapsed().as_millis() as u64,
            "Chat reply received"
        );
        Ok(reply.into_text())
    }

    /// Ask the assistant, replacing any service failure with [`APOLOGY`].
    pub async fn reply(&self, message: &str) -> Result<String, ChatError> {
        match self.ask(message).await {
            Err(ChatError::Unavailable(reason)) => {
                warn!(reason = %reason, "Chat service unavailable");
                Ok(APOLOGY.to_string())
            }
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn now(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A conversation with the assistant, starting with the welcome message.
#[derive(Debug, Clone)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
    pending: bool,
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self {
            messages: vec![ChatMessage::now(Sender::Bot, WELCOME_MESSAGE)],
            pending: false,
        }
    }
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Record the user's message and mark a reply as pending.
    pub fn begin(&mut self, text: &str) -> Result<(), ChatError> {
        if self.pending {
            return Err(ChatError::Busy);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        self.messages.push(ChatMessage::now(Sender::User, text));
        self.pending = true;
        Ok(())
    }

    /// Record the bot's reply and clear the pending flag.
    pub fn finish(&mut self, reply: impl Into<String>) {
        self.messages.push(ChatMessage::now(Sender::Bot, reply));
        self.pending = false;
    }

    /// Send `text` through `client` and record both sides.
    pub async fn send(&mut self, client: &ChatClient, text: &str) -> Result<String, ChatError> {
        self.begin(text)?;
        let reply = client
            .reply(text)
            .await
            .unwrap_or_else(|_| APOLOGY.to_string());
        self.finish(reply.clone());
        Ok(reply)
    }
}
