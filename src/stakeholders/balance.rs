use crate::error::StakeholderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `log10` of the balance at which a stakeholder reaches full weight.
const MAX_LOG_WEIGHT: f64 = 15.0;

/// Token holdings in base units, kept as a decimal digit string so balances
/// beyond `u128` survive a store round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenBalance(String);

impl TokenBalance {
    pub fn zero() -> Self {
        Self("0".to_string())
    }

    pub fn is_zero(&self) -> bool {
        self.0 == "0"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Voting weight in `[0, 1]`: `log10(balance + 1) / 15`, so 10^15 base
    /// units reach 1.0.
    pub fn weight(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        // Digits-only strings always parse; huge values become infinity.
        let balance = self.0.parse::<f64>().unwrap_or(f64::INFINITY);
        stake_weight(balance)
    }
}

/// Weight for a balance already converted to a float.
pub fn stake_weight(balance: f64) -> f64 {
    if balance.is_nan() || balance <= 0.0 {
        return 0.0;
    }
    ((balance + 1.0).log10() / MAX_LOG_WEIGHT).clamp(0.0, 1.0)
}

impl Default for TokenBalance {
    fn default() -> Self {
        Self::zero()
    }
}

impl FromStr for TokenBalance {
    type Err = StakeholderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(StakeholderError::Validation(format!(
                "token balance must be a non-negative integer, got {s:?}"
            )));
        }
        let digits = trimmed.trim_start_matches('0');
        Ok(Self(if digits.is_empty() {
            "0".to_string()
        } else {
            digits.to_string()
        }))
    }
}

impl TryFrom<String> for TokenBalance {
    type Error = StakeholderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TokenBalance> for String {
    fn from(balance: TokenBalance) -> Self {
        balance.0
    }
}

impl From<u128> for TokenBalance {
    fn from(value: u128) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TokenBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
