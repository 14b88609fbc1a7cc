//! Stakeholder records and the stake-weighted preference aggregate.

mod aggregator;
mod balance;
mod extractor;
mod record;
pub mod store;
mod value;

pub use aggregator::PreferenceAggregator;
pub use balance::{TokenBalance, stake_weight};
pub use extractor::{BalanceOracle, LlmPreferenceExtractor, PreferenceExtractor, parse_preferences};
pub use record::{PreferenceEntry, Stakeholder, StakeholderIdentity, StakeholderKind};
pub use store::{MemoryStakeholderStore, SqliteStakeholderStore, StakeholderStore};
pub use value::{AggregatedPreferences, PreferenceValue, merge_preference};
