//! Hosted chat-completion API client used by the proxy endpoint

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use super::chat::{
    ChatBackend, ChatError, ChatMessage, EMPTY_REPLY, MAX_TOKENS, SYSTEM_PROMPT, TEMPERATURE,
};

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Forwards conversations to the hosted API with the fixed persona prompt
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl UpstreamClient {
    pub fn new(url: String, model: String, api_key: Option<String>) -> Self {
        Self {
            http: Client::new(),
            url,
            model,
            // an empty variable counts as unset
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, messages: &[ChatMessage]) -> CompletionRequest<'_> {
        let mut forwarded = Vec::with_capacity(messages.len() + 1);
        forwarded.push(ChatMessage::system(SYSTEM_PROMPT));
        forwarded.extend_from_slice(messages);

        CompletionRequest {
            model: &self.model,
            messages: forwarded,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

impl ChatBackend for UpstreamClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let Some(api_key) = self.api_key.as_deref() else {
            error!("Chat API key not found");
            return Err(ChatError::MissingCredential);
        };

        debug!("Forwarding {} messages to {}", messages.len(), self.url);
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&self.build_request(messages))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            error!("Chat API error: {}", status);
            return Err(ChatError::Upstream(format!("status {}", status)));
        }

        let body: CompletionResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty());

        match content {
            Some(content) => Ok(content),
            None => {
                warn!("Chat API response carried no message");
                Ok(EMPTY_REPLY.to_string())
            }
        }
    }
}
