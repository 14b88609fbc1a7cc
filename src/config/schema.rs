use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Upper bound on the step budget accepted from configuration.
pub const MAX_STEP_BUDGET: usize = 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub reasoning: ReasoningConfig,

    #[serde(default)]
    pub stakeholders: StakeholdersConfig,

    /// Optional TOML character profile. Without one the built-in persona is used.
    #[serde(default)]
    pub character_path: Option<PathBuf>,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ── LLM ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "deepseek".into()
}

fn default_api_url() -> String {
    "https://api.deepseek.com/v1".into()
}

fn default_model() -> String {
    "deepseek-reasoner".into()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_url: default_api_url(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ── Reasoning ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningConfig {
    /// Step budget per chain.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    /// Confidence assigned to a step whose response carries no `Confidence:` line.
    #[serde(default = "default_step_confidence")]
    pub default_step_confidence: f64,
}

fn default_max_steps() -> usize {
    3
}

fn default_step_confidence() -> f64 {
    0.7
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            default_step_confidence: default_step_confidence(),
        }
    }
}

// ── Stakeholders ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StakeholderBackend {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeholdersConfig {
    #[serde(default)]
    pub backend: StakeholderBackend,
    /// SQLite file; relative paths resolve against the config directory.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_network")]
    pub network: String,
    #[serde(default = "default_ticker")]
    pub ticker: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("stakeholders.db")
}

fn default_network() -> String {
    "ethereum".into()
}

fn default_ticker() -> String {
    "COG".into()
}

impl Default for StakeholdersConfig {
    fn default() -> Self {
        Self {
            backend: StakeholderBackend::default(),
            db_path: default_db_path(),
            network: default_network(),
            ticker: default_ticker(),
        }
    }
}

// ── Observability ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// "error" | "warn" | "info" | "debug" | "trace"
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ObservabilityConfig {
    pub fn level(&self) -> tracing::Level {
        match self.log_level.to_ascii_lowercase().as_str() {
            "error" => tracing::Level::ERROR,
            "warn" => tracing::Level::WARN,
            "debug" => tracing::Level::DEBUG,
            "trace" => tracing::Level::TRACE,
            _ => tracing::Level::INFO,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_STEP_BUDGET).contains(&self.reasoning.max_steps) {
            return Err(ConfigError::Validation(format!(
                "reasoning.max_steps must be between 1 and {MAX_STEP_BUDGET} (got {})",
                self.reasoning.max_steps
            )));
        }
        if !(0.0..=1.0).contains(&self.reasoning.default_step_confidence) {
            return Err(ConfigError::Validation(format!(
                "reasoning.default_step_confidence must be within [0, 1] (got {})",
                self.reasoning.default_step_confidence
            )));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Validation(format!(
                "llm.temperature must be within [0, 2] (got {})",
                self.llm.temperature
            )));
        }
        if self.llm.api_url.trim().is_empty() {
            return Err(ConfigError::Validation("llm.api_url is empty".into()));
        }
        Ok(())
    }

    /// Resolve the stakeholder database path relative to the config file.
    pub fn stakeholder_db_path(&self) -> PathBuf {
        if self.stakeholders.db_path.is_absolute() {
            return self.stakeholders.db_path.clone();
        }
        self.config_path
            .parent()
            .map_or_else(|| self.stakeholders.db_path.clone(), |dir| {
                dir.join(&self.stakeholders.db_path)
            })
    }
}
