use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Agent persona: who it is, how it talks, what it is working towards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    /// Standing instruction placed at the top of every system prompt.
    #[serde(default)]
    pub system: String,
    #[serde(default)]
    pub bio: Vec<String>,
    #[serde(default)]
    pub lore: Vec<String>,
    #[serde(default)]
    pub style: StyleGuide,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub goals: Vec<Goal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleGuide {
    #[serde(default)]
    pub tone: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_goal_weight")]
    pub weight: f64,
}

fn default_goal_weight() -> f64 {
    1.0
}

impl Default for Character {
    fn default() -> Self {
        Self {
            name: "Cogito".into(),
            system: "You are an autonomous community agent. Reason step by step and \
                     weigh stakeholder preferences before committing to a plan."
                .into(),
            bio: vec!["Coordinates a token-holder community across social platforms.".into()],
            lore: Vec::new(),
            style: StyleGuide {
                tone: vec!["concise".into(), "friendly".into()],
                constraints: vec!["Never promise token price movements.".into()],
            },
            topics: Vec::new(),
            goals: vec![Goal {
                id: "community-growth".into(),
                name: "Grow the community".into(),
                description: "Increase meaningful engagement among holders.".into(),
                weight: 1.0,
            }],
        }
    }
}

impl Character {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read character file {}", path.display()))?;
        let character: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse character file {}", path.display()))?;
        if character.name.trim().is_empty() {
            anyhow::bail!("character file {} has an empty name", path.display());
        }
        Ok(character)
    }

    /// Load from `path` when given, else fall back to the built-in persona.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}
