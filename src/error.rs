use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `Cogito`.
///
/// Each subsystem defines its own error enum. The decision core never retries
/// or recovers on its own: every variant travels back to the orchestrator,
/// which decides whether to retry, apologise, or escalate.
#[derive(Debug, Error)]
pub enum CogitoError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── LLM transport ───────────────────────────────────────────────────
    #[error("llm: {0}")]
    Llm(#[from] LlmError),

    // ── Reasoning chain ─────────────────────────────────────────────────
    #[error("reasoning: {0}")]
    Reasoning(#[from] ReasoningError),

    // ── Outcome compilation ─────────────────────────────────────────────
    #[error("outcome: {0}")]
    Outcome(#[from] OutcomeError),

    // ── Stakeholders / preferences ──────────────────────────────────────
    #[error("stakeholder: {0}")]
    Stakeholder(#[from] StakeholderError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── LLM transport errors ────────────────────────────────────────────────────

/// Failure of a single completion call.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("provider {provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("provider {provider} API error ({status}): {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("provider {provider} returned an undecodable response: {message}")]
    Decode { provider: String, message: String },

    #[error("provider {provider} API key not set")]
    MissingApiKey { provider: String },
}

// ─── Reasoning errors ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ReasoningError {
    #[error("transport: {0}")]
    Transport(#[from] LlmError),

    #[error("chain generation cancelled")]
    Cancelled,

    #[error("step budget must be at least 1 (got {0})")]
    InvalidStepBudget(usize),

    #[error("prompt rendering failed: {0}")]
    Prompt(String),
}

// ─── Outcome compiler errors ─────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum OutcomeError {
    /// The chain output lacked the delimited payload, or it failed to decode.
    #[error("parse: {0}")]
    Parse(String),

    /// The payload decoded but violates a structural rule.
    #[error("validation: {0}")]
    Validation(String),
}

// ─── Stakeholder errors ──────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StakeholderError {
    #[error("validation: {0}")]
    Validation(String),

    #[error("store: {0}")]
    Store(String),

    #[error("preference extraction failed: {0}")]
    Extraction(#[from] LlmError),
}

impl From<sqlx::Error> for StakeholderError {
    fn from(error: sqlx::Error) -> Self {
        Self::Store(error.to_string())
    }
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, CogitoError>;
