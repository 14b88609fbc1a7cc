use super::balance::TokenBalance;
use super::value::PreferenceValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use strum::{AsRefStr, Display, EnumString};

/// Who sent a message: the platform plus its local user id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StakeholderIdentity {
    pub platform: String,
    pub id: String,
}

impl StakeholderIdentity {
    pub fn new(platform: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            id: id.into(),
        }
    }

    /// Store key, `platform:id`.
    ///
    /// `%` and `:` in the platform are percent-encoded, so the first `:` always
    /// separates the two parts and distinct identities never share a key.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StakeholderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.platform.chars() {
            match c {
                '%' => f.write_str("%25")?,
                ':' => f.write_str("%3A")?,
                c => fmt::Write::write_char(f, c)?,
            }
        }
        write!(f, ":{}", self.id)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StakeholderKind {
    #[default]
    User,
    /// Accounts the character lists as always relevant.
    Priority,
}

/// One stakeholder's latest value for a preference key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceEntry {
    pub value: PreferenceValue,
    pub weight: f64,
    pub source: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stakeholder {
    pub identity: StakeholderIdentity,
    #[serde(default)]
    pub kind: StakeholderKind,
    #[serde(default)]
    pub token_balance: TokenBalance,
    #[serde(default)]
    pub preferences: BTreeMap<String, PreferenceEntry>,
    #[serde(default)]
    pub historical_messages: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Stakeholder {
    pub fn new(identity: StakeholderIdentity, kind: StakeholderKind) -> Self {
        let now = Utc::now();
        Self {
            identity,
            kind,
            token_balance: TokenBalance::zero(),
            preferences: BTreeMap::new(),
            historical_messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn key(&self) -> String {
        self.identity.key()
    }

    pub fn weight(&self) -> f64 {
        self.token_balance.weight()
    }

    /// Record `value` for `name`, replacing this stakeholder's previous value.
    pub fn set_preference(&mut self, name: impl Into<String>, value: PreferenceValue, weight: f64) {
        let now = Utc::now();
        self.preferences.insert(
            name.into(),
            PreferenceEntry {
                value,
                weight,
                source: self.identity.platform.clone(),
                updated_at: now,
            },
        );
        self.updated_at = now;
    }

    pub fn append_messages(&mut self, messages: impl IntoIterator<Item = String>) {
        self.historical_messages.extend(messages);
        self.updated_at = Utc::now();
    }
}
