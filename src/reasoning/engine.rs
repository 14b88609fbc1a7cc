use super::aha::detect_reconsideration;
use super::parse::parse_step_response;
use super::purpose::step_purpose;
use super::types::{StepPurpose, ThoughtChain, ThoughtStep, contributes_to_outcome};
use crate::config::Config;
use crate::error::ReasoningError;
use crate::llm::{ChatMessage, CompletionTransport};
use crate::prompt::StepPromptBuilder;
use crate::stakeholders::AggregatedPreferences;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Model parameters and step budget for one engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainSettings {
    pub model: String,
    pub temperature: f64,
    pub max_steps: usize,
    pub default_step_confidence: f64,
}

impl ChainSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.llm.model.clone(),
            temperature: config.llm.temperature,
            max_steps: config.reasoning.max_steps,
            default_step_confidence: config.reasoning.default_step_confidence,
        }
    }
}

/// Inputs shared by every step of one chain.
#[derive(Debug, Clone, Default)]
pub struct ChainRequest {
    pub system_prompt: String,
    /// Snapshot read once when the request is built.
    pub preferences: AggregatedPreferences,
}

/// Drives the completion transport through a bounded sequence of steps.
pub struct ThoughtChainEngine {
    transport: Arc<dyn CompletionTransport>,
    settings: ChainSettings,
}

impl ThoughtChainEngine {
    pub fn new(
        transport: Arc<dyn CompletionTransport>,
        settings: ChainSettings,
    ) -> Result<Self, ReasoningError> {
        if settings.max_steps == 0 {
            return Err(ReasoningError::InvalidStepBudget(settings.max_steps));
        }
        Ok(Self {
            transport,
            settings,
        })
    }

    pub fn settings(&self) -> &ChainSettings {
        &self.settings
    }

    /// Generate up to `max_steps` steps, stopping at the first concrete one.
    ///
    /// A non-concrete step that trips the reconsideration detector is
    /// discarded and regenerated with the reconsider purpose. Any transport
    /// failure or cancellation aborts the whole chain.
    pub async fn generate_chain<B>(
        &self,
        request: &ChainRequest,
        builder: &B,
        cancel: &CancellationToken,
    ) -> Result<ThoughtChain, ReasoningError>
    where
        B: StepPromptBuilder + ?Sized,
    {
        info!(
            transport = self.transport.name(),
            max_steps = self.settings.max_steps,
            "generating thought chain"
        );
        let mut chain = ThoughtChain::new();

        for index in 0..self.settings.max_steps {
            let purpose = step_purpose(index, self.settings.max_steps);
            let mut step = self
                .generate_step(request, builder, &chain, purpose, cancel)
                .await?;

            if purpose != StepPurpose::Concrete {
                let detection = detect_reconsideration(&step, chain.steps(), &request.preferences);
                if detection.triggered {
                    debug!(
                        step = index,
                        kind = ?detection.kind,
                        reason = %detection.reason,
                        "reconsidering step"
                    );
                    step = self
                        .generate_step(request, builder, &chain, StepPurpose::Reconsider, cancel)
                        .await?;
                }
            }

            info!(step = index, purpose = %step.purpose, confidence = step.confidence, "generated step");
            chain.push(step);

            if chain.is_conclusive() {
                break;
            }
        }

        Ok(chain)
    }

    async fn generate_step<B>(
        &self,
        request: &ChainRequest,
        builder: &B,
        chain: &ThoughtChain,
        purpose: StepPurpose,
        cancel: &CancellationToken,
    ) -> Result<ThoughtStep, ReasoningError>
    where
        B: StepPromptBuilder + ?Sized,
    {
        let prompt = builder.build(purpose, chain.steps())?;
        let messages = [
            ChatMessage::system(request.system_prompt.as_str()),
            ChatMessage::user(prompt),
        ];

        let raw = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ReasoningError::Cancelled),
            result = self.transport.create_completion(
                &self.settings.model,
                &messages,
                self.settings.temperature,
            ) => result?,
        };

        let step = parse_step_response(&raw, purpose, self.settings.default_step_confidence);
        let contributes = contributes_to_outcome(purpose, chain.len());
        Ok(step.contributing(contributes))
    }
}
