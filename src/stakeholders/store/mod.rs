mod memory;
mod sqlite;

pub use memory::MemoryStakeholderStore;
pub use sqlite::SqliteStakeholderStore;

use super::record::Stakeholder;
use crate::error::StakeholderError;
use async_trait::async_trait;

/// Persistence for stakeholder records, keyed by `platform:id`.
#[async_trait]
pub trait StakeholderStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Stakeholder>, StakeholderError>;

    /// Insert or replace the record under `stakeholder.key()`.
    async fn put(&self, stakeholder: &Stakeholder) -> Result<(), StakeholderError>;

    /// Every readable record, ordered by key.
    async fn list(&self) -> Result<Vec<Stakeholder>, StakeholderError>;
}
