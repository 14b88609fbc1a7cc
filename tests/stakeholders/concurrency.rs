use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cogito::error::StakeholderError;
use cogito::stakeholders::{
    MemoryStakeholderStore, PreferenceAggregator, PreferenceExtractor, PreferenceValue,
    Stakeholder, StakeholderIdentity, StakeholderStore,
};

/// Treats the whole message as one preference name.
struct NameExtractor;

#[async_trait]
impl PreferenceExtractor for NameExtractor {
    async fn extract(
        &self,
        message: &str,
    ) -> Result<BTreeMap<String, PreferenceValue>, StakeholderError> {
        Ok(BTreeMap::from([(message.to_string(), PreferenceValue::Bool(true))]))
    }
}

/// Memory store that yields between read and write to widen race windows.
struct SlowStore(MemoryStakeholderStore);

#[async_trait]
impl StakeholderStore for SlowStore {
    async fn get(&self, key: &str) -> Result<Option<Stakeholder>, StakeholderError> {
        let record = self.0.get(key).await?;
        tokio::time::sleep(Duration::from_millis(2)).await;
        Ok(record)
    }

    async fn put(&self, stakeholder: &Stakeholder) -> Result<(), StakeholderError> {
        tokio::task::yield_now().await;
        self.0.put(stakeholder).await
    }

    async fn list(&self) -> Result<Vec<Stakeholder>, StakeholderError> {
        self.0.list().await
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_messages_for_one_stakeholder_lose_nothing() {
    const N: usize = 32;
    let store = Arc::new(SlowStore(MemoryStakeholderStore::new()));
    let aggregator = Arc::new(PreferenceAggregator::new(store.clone(), Arc::new(NameExtractor)));
    let identity = StakeholderIdentity::new("twitter", "alice");

    let handles: Vec<_> = (0..N)
        .map(|i| {
            let aggregator = Arc::clone(&aggregator);
            let identity = identity.clone();
            tokio::spawn(async move {
                aggregator
                    .process_message(&identity, &format!("pref_{i}"))
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let record = store.get("twitter:alice").await.unwrap().unwrap();
    assert_eq!(record.preferences.len(), N);
    for i in 0..N {
        assert!(record.preferences.contains_key(&format!("pref_{i}")));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn different_stakeholders_proceed_independently() {
    let store = Arc::new(SlowStore(MemoryStakeholderStore::new()));
    let aggregator = Arc::new(PreferenceAggregator::new(store.clone(), Arc::new(NameExtractor)));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let aggregator = Arc::clone(&aggregator);
            tokio::spawn(async move {
                let identity = StakeholderIdentity::new("discord", format!("user{i}"));
                aggregator.process_message(&identity, "gm").await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(store.list().await.unwrap().len(), 8);
}
