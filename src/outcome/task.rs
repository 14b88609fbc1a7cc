use crate::error::OutcomeError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Active,
    Completed,
    Failed,
}

fn new_task_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A goal-directed unit of work compiled from a thought chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default = "new_task_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: f64,
    #[serde(default)]
    pub execution_steps: Vec<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub requires_approval: bool,
    #[serde(default)]
    pub requires_stakeholder_input: bool,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: new_task_id(),
            name: name.into(),
            description: description.into(),
            priority: 0.0,
            execution_steps: Vec::new(),
            status: TaskStatus::Pending,
            deadline: None,
            requires_approval: false,
            requires_stakeholder_input: false,
            tools: Vec::new(),
            created_by: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// The task as a ```` ```json ```` fenced block, the form the compiler reads back.
    pub fn to_fenced_block(&self) -> Result<String, OutcomeError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| OutcomeError::Parse(format!("failed to encode task: {e}")))?;
        Ok(format!("```json\n{json}\n```"))
    }
}
