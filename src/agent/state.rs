use crate::persona::{Character, Goal};
use crate::stakeholders::AggregatedPreferences;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything one generation call reasons over, frozen at call time.
#[derive(Debug, Clone, Serialize)]
pub struct SystemState {
    pub character: Character,
    pub goals: Vec<Goal>,
    pub preferences: AggregatedPreferences,
    pub timestamp: DateTime<Utc>,
}

impl SystemState {
    /// Snapshot with the character's own goals.
    pub fn new(character: Character, preferences: AggregatedPreferences) -> Self {
        Self {
            goals: character.goals.clone(),
            character,
            preferences,
            timestamp: Utc::now(),
        }
    }

    /// The character with its goals replaced by this snapshot's goals.
    pub(super) fn planning_character(&self) -> Character {
        let mut character = self.character.clone();
        character.goals.clone_from(&self.goals);
        character
    }
}
