//! OpenAI-compatible chat completions transport.
//! DeepSeek, OpenAI, Groq, Mistral and most hosted gateways accept the same
//! `/chat/completions` request shape, so a single implementation covers them.

use super::http_client::build_transport_client;
use super::scrub::sanitize_api_error;
use super::traits::{CompletionFuture, CompletionTransport};
use super::types::ChatMessage;
use crate::config::LlmConfig;
use crate::error::LlmError;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub struct OpenAiCompatibleTransport {
    pub(crate) name: String,
    /// Pre-computed `Authorization` header value.
    cached_auth: Option<String>,
    /// Pre-computed chat completions URL.
    cached_chat_url: String,
    client: Client,
}

impl OpenAiCompatibleTransport {
    pub fn new(name: &str, base_url: &str, api_key: Option<&str>, timeout_secs: u64) -> Self {
        let base_url = base_url.trim_end_matches('/');
        let cached_chat_url = if base_url.ends_with("chat/completions") {
            base_url.to_string()
        } else {
            format!("{base_url}/chat/completions")
        };

        Self {
            name: name.to_string(),
            cached_auth: api_key.map(|k| format!("Bearer {k}")),
            cached_chat_url,
            client: build_transport_client(timeout_secs),
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(
            &config.provider,
            &config.api_url,
            config.api_key.as_deref(),
            config.timeout_secs,
        )
    }

    fn chat_completions_url(&self) -> &str {
        &self.cached_chat_url
    }

    fn request_error(&self, error: &reqwest::Error) -> LlmError {
        LlmError::Request {
            provider: self.name.clone(),
            message: sanitize_api_error(&error.to_string()),
        }
    }

    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f64,
    ) -> Result<String, LlmError> {
        let Some(auth) = &self.cached_auth else {
            return Err(LlmError::MissingApiKey {
                provider: self.name.clone(),
            });
        };

        let request = ChatRequest {
            model,
            messages,
            temperature,
        };

        let response = self
            .client
            .post(self.chat_completions_url())
            .header("Authorization", auth)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read provider error body>".to_string());
            return Err(LlmError::Api {
                provider: self.name.clone(),
                status: status.as_u16(),
                message: sanitize_api_error(&body),
            });
        }

        let chat: ChatResponse = response.json().await.map_err(|e| LlmError::Decode {
            provider: self.name.clone(),
            message: sanitize_api_error(&e.to_string()),
        })?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::Decode {
                provider: self.name.clone(),
                message: "response carried no choices".into(),
            })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl CompletionTransport for OpenAiCompatibleTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_completion<'a>(
        &'a self,
        model: &'a str,
        messages: &'a [ChatMessage],
        temperature: f64,
    ) -> CompletionFuture<'a> {
        Box::pin(self.complete(model, messages, temperature))
    }
}
