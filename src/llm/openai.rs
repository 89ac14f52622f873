//! OpenAI chat-completions gateway implementation

use super::error::GatewayError;
use super::AssistantGateway;
use crate::prompt::{render_user_message, SYSTEM_PROMPT};
use crate::session::{Role, Turn};
use crate::state_machine::TicketContext;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Transport-level request deadline. The coordinator imposes its own
/// turn deadline on top; this only bounds a wedged connection.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Gateway configuration, read from the environment
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());
        let base_url = std::env::var("INTAKE_OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string());
        let model = std::env::var("INTAKE_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());

        Self {
            api_key,
            base_url,
            model,
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Gateway backed by the OpenAI chat-completions API
pub struct OpenAiGateway {
    client: Client,
    config: GatewayConfig,
}

impl OpenAiGateway {
    pub fn new(config: GatewayConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    fn build_request(
        &self,
        history: &[Turn],
        context: &TicketContext,
        user_input: &str,
    ) -> ChatRequest {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: SYSTEM_PROMPT.to_string(),
        });

        for turn in history {
            let role = match turn.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            messages.push(ChatMessage {
                role: role.to_string(),
                content: turn.text.clone(),
            });
        }

        messages.push(ChatMessage {
            role: "user".to_string(),
            content: render_user_message(context, user_input),
        });

        ChatRequest {
            model: self.config.model.clone(),
            temperature: 0.0,
            messages,
        }
    }

    fn classify_error(&self, status: reqwest::StatusCode, body: &str) -> GatewayError {
        match status.as_u16() {
            401 | 403 => GatewayError::unavailable(format!("Authentication failed: {body}")),
            429 => GatewayError::unavailable(format!("Rate limited: {body}"))
                .with_retry_after(Duration::from_secs(1)),
            400..=499 => GatewayError::unavailable(format!("Upstream rejected request: {body}")),
            _ => GatewayError::unavailable(format!("HTTP {status}: {body}")),
        }
    }
}

#[async_trait]
impl AssistantGateway for OpenAiGateway {
    async fn generate(
        &self,
        history: &[Turn],
        context: &TicketContext,
        user_input: &str,
    ) -> Result<String, GatewayError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(GatewayError::unavailable(
                "No upstream API key configured",
            ));
        };

        let request = self.build_request(history, context, user_input);

        let response = self
            .client
            .post(&self.config.base_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::timeout(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    GatewayError::unavailable(format!("Connection failed: {e}"))
                } else {
                    GatewayError::unavailable(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::unavailable(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(self.classify_error(status, &body));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| GatewayError::malformed(format!("Failed to parse response: {e}")))?;

        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if reply.trim().is_empty() {
            return Err(GatewayError::malformed("Upstream returned an empty completion"));
        }

        Ok(reply)
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}
