//! Conversation client with a fixed fallback reply

use reqwest::Client;
use tracing::{debug, warn};

use super::chat::{
    recent_turns, ChatBackend, ChatError, ChatMessage, ChatReply, ChatRequest, FALLBACK_REPLY,
    GREETING, MAX_HISTORY_TURNS,
};

/// Talks to a running `/ai-chat` proxy endpoint
#[derive(Debug, Clone)]
pub struct ProxyBackend {
    http: Client,
    endpoint: String,
}

impl ProxyBackend {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl ChatBackend for ProxyBackend {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let request = ChatRequest { messages: messages.to_vec() };
        let response = self.http.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Upstream(format!("proxy returned {}", status)));
        }

        let reply: ChatReply = response.json().await?;
        Ok(reply.message)
    }
}

/// One round trip as seen by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatExchange {
    pub reply: String,
    /// Set when the backend failed and the fallback reply was substituted
    pub fallback: bool,
}

/// Conversation log that never surfaces backend errors to the user
#[derive(Debug)]
pub struct ChatClient<B> {
    backend: B,
    log: Vec<ChatMessage>,
}

impl<B: ChatBackend> ChatClient<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            log: vec![ChatMessage::assistant(GREETING)],
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.log
    }

    /// Send a user message. Blank input is ignored and returns None.
    pub async fn send(&mut self, text: &str) -> Option<ChatExchange> {
        if text.trim().is_empty() {
            return None;
        }
        self.log.push(ChatMessage::user(text));

        let context = recent_turns(&self.log, MAX_HISTORY_TURNS);
        debug!("Sending {} of {} messages", context.len(), self.log.len());

        let exchange = match self.backend.complete(context).await {
            Ok(reply) => ChatExchange { reply, fallback: false },
            Err(e) => {
                warn!("Chat request failed, using fallback reply: {}", e);
                ChatExchange {
                    reply: FALLBACK_REPLY.to_string(),
                    fallback: true,
                }
            }
        };

        self.log.push(ChatMessage::assistant(exchange.reply.clone()));
        Some(exchange)
    }
}
