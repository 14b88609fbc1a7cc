use super::record::StakeholderIdentity;
use super::balance::TokenBalance;
use super::value::PreferenceValue;
use crate::error::StakeholderError;
use crate::llm::{ChatMessage, CompletionTransport};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

const EXTRACTION_PROMPT: &str = "\
You read messages sent to an autonomous agent and extract the sender's preferences \
about how the agent should behave. Reply with a single JSON object mapping a short \
snake_case preference name to its value (number, boolean, string, list or object). \
Reply with {} when the message expresses no preference. Do not add any other text.";

/// Pulls preference key/value pairs out of a stakeholder's message.
#[async_trait]
pub trait PreferenceExtractor: Send + Sync {
    async fn extract(
        &self,
        message: &str,
    ) -> Result<BTreeMap<String, PreferenceValue>, StakeholderError>;
}

/// Looks up a stakeholder's current on-chain balance.
#[async_trait]
pub trait BalanceOracle: Send + Sync {
    async fn balance(&self, identity: &StakeholderIdentity) -> anyhow::Result<TokenBalance>;
}

/// Extractor that asks the completion transport for a JSON object.
pub struct LlmPreferenceExtractor {
    transport: Arc<dyn CompletionTransport>,
    model: String,
    temperature: f64,
}

impl LlmPreferenceExtractor {
    pub fn new(transport: Arc<dyn CompletionTransport>, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
            temperature: 0.0,
        }
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl PreferenceExtractor for LlmPreferenceExtractor {
    async fn extract(
        &self,
        message: &str,
    ) -> Result<BTreeMap<String, PreferenceValue>, StakeholderError> {
        let messages = [
            ChatMessage::system(EXTRACTION_PROMPT),
            ChatMessage::user(message),
        ];
        let raw = self
            .transport
            .create_completion(&self.model, &messages, self.temperature)
            .await?;
        parse_preferences(&raw)
    }
}

/// Decode a model reply into preferences; anything but a JSON object is rejected.
pub fn parse_preferences(raw: &str) -> Result<BTreeMap<String, PreferenceValue>, StakeholderError> {
    let body = strip_code_fence(raw.trim());
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        StakeholderError::Validation(format!("extracted preferences are not valid JSON: {e}"))
    })?;

    let serde_json::Value::Object(entries) = value else {
        return Err(StakeholderError::Validation(format!(
            "extracted preferences must be a JSON object, got {value}"
        )));
    };

    let mut preferences = BTreeMap::new();
    for (name, value) in entries {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(StakeholderError::Validation(
                "extracted preference has an empty name".into(),
            ));
        }
        preferences.insert(name, PreferenceValue::from(value));
    }
    Ok(preferences)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
