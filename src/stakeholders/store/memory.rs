use super::StakeholderStore;
use crate::error::StakeholderError;
use crate::stakeholders::record::Stakeholder;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Process-local store; records vanish with the process.
#[derive(Default)]
pub struct MemoryStakeholderStore {
    records: RwLock<BTreeMap<String, Stakeholder>>,
}

impl MemoryStakeholderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StakeholderStore for MemoryStakeholderStore {
    async fn get(&self, key: &str) -> Result<Option<Stakeholder>, StakeholderError> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn put(&self, stakeholder: &Stakeholder) -> Result<(), StakeholderError> {
        self.records
            .write()
            .await
            .insert(stakeholder.key(), stakeholder.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Stakeholder>, StakeholderError> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}
