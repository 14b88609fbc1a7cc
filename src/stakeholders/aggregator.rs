use super::extractor::{BalanceOracle, PreferenceExtractor};
use super::record::{Stakeholder, StakeholderIdentity, StakeholderKind};
use super::store::StakeholderStore;
use super::value::{AggregatedPreferences, merge_preference};
use crate::error::StakeholderError;
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

type LockTable = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

/// Handle on one stakeholder's lock. The table entry is dropped with the last
/// handle, so the table only holds keys that are in use.
struct KeyLock<'a> {
    table: &'a LockTable,
    key: String,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl Deref for KeyLock<'_> {
    type Target = tokio::sync::Mutex<()>;

    fn deref(&self) -> &Self::Target {
        &self.lock
    }
}

impl Drop for KeyLock<'_> {
    fn drop(&mut self) {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the table, one here.
        let last_holder = Arc::strong_count(&self.lock) == 2
            && table.get(&self.key).is_some_and(|lock| Arc::ptr_eq(lock, &self.lock));
        if last_holder {
            table.remove(&self.key);
        }
    }
}

/// Folds stakeholder messages into per-stakeholder preferences and merges
/// them, weighted by stake, into one snapshot.
pub struct PreferenceAggregator {
    store: Arc<dyn StakeholderStore>,
    extractor: Arc<dyn PreferenceExtractor>,
    oracle: Option<Arc<dyn BalanceOracle>>,
    key_locks: LockTable,
}

impl PreferenceAggregator {
    pub fn new(store: Arc<dyn StakeholderStore>, extractor: Arc<dyn PreferenceExtractor>) -> Self {
        Self {
            store,
            extractor,
            oracle: None,
            key_locks: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_oracle(mut self, oracle: Arc<dyn BalanceOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    fn key_lock(&self, key: &str) -> KeyLock<'_> {
        let mut locks = self.key_locks.lock().unwrap_or_else(PoisonError::into_inner);
        let lock = Arc::clone(locks.entry(key.to_string()).or_default());
        KeyLock {
            table: &self.key_locks,
            key: key.to_string(),
            lock,
        }
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.key_locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Load the stakeholder, creating and persisting an empty record on first
    /// contact. Asking for [`StakeholderKind::Priority`] upgrades a stored user.
    pub async fn fetch_or_create(
        &self,
        identity: &StakeholderIdentity,
        kind: StakeholderKind,
    ) -> Result<Stakeholder, StakeholderError> {
        let key = identity.key();
        let lock = self.key_lock(&key);
        let _guard = lock.lock().await;
        self.load_or_create(identity, kind).await
    }

    async fn load_or_create(
        &self,
        identity: &StakeholderIdentity,
        kind: StakeholderKind,
    ) -> Result<Stakeholder, StakeholderError> {
        match self.store.get(&identity.key()).await? {
            Some(mut stakeholder) => {
                if kind == StakeholderKind::Priority && stakeholder.kind != kind {
                    stakeholder.kind = kind;
                    self.store.put(&stakeholder).await?;
                }
                Ok(stakeholder)
            }
            None => {
                let stakeholder = Stakeholder::new(identity.clone(), kind);
                self.store.put(&stakeholder).await?;
                debug!(key = %identity, %kind, "created stakeholder");
                Ok(stakeholder)
            }
        }
    }

    async fn refresh_balance(&self, stakeholder: &mut Stakeholder) {
        let Some(oracle) = &self.oracle else {
            return;
        };
        match oracle.balance(&stakeholder.identity).await {
            Ok(balance) => stakeholder.token_balance = balance,
            Err(e) => warn!(
                key = %stakeholder.identity,
                error = %e,
                "balance lookup failed; keeping stored balance"
            ),
        }
    }

    /// Extract preferences from `message` and store them under the sender's
    /// current weight. Returns the preference names that were written.
    ///
    /// Extraction runs before the record is locked; on extraction failure
    /// nothing is stored.
    pub async fn process_message(
        &self,
        identity: &StakeholderIdentity,
        message: &str,
    ) -> Result<Vec<String>, StakeholderError> {
        let extracted = self.extractor.extract(message).await?;

        let key = identity.key();
        let lock = self.key_lock(&key);
        let _guard = lock.lock().await;

        let mut stakeholder = self.load_or_create(identity, StakeholderKind::User).await?;
        self.refresh_balance(&mut stakeholder).await;
        let weight = stakeholder.weight();

        let names: Vec<String> = extracted.keys().cloned().collect();
        for (name, value) in extracted {
            stakeholder.set_preference(name, value, weight);
        }
        self.store.put(&stakeholder).await?;

        debug!(key = %key, weight, preferences = names.len(), "processed stakeholder message");
        Ok(names)
    }

    /// Append messages to an existing stakeholder's history.
    pub async fn add_historical_messages(
        &self,
        identity: &StakeholderIdentity,
        messages: Vec<String>,
    ) -> Result<(), StakeholderError> {
        let key = identity.key();
        let lock = self.key_lock(&key);
        let _guard = lock.lock().await;

        let mut stakeholder = self
            .store
            .get(&key)
            .await?
            .ok_or_else(|| StakeholderError::Validation(format!("stakeholder doesn't exist: {key}")))?;
        stakeholder.append_messages(messages);
        self.store.put(&stakeholder).await
    }

    /// Merge every stakeholder's preferences by the type rules of
    /// [`merge_preference`], stakeholders in key order and preferences in name
    /// order. Malformed entries are skipped with a warning.
    pub async fn aggregated_preferences(&self) -> Result<AggregatedPreferences, StakeholderError> {
        let mut stakeholders = self.store.list().await?;
        stakeholders.sort_by_key(Stakeholder::key);

        let mut aggregated = AggregatedPreferences::new();
        for stakeholder in stakeholders {
            for (name, entry) in stakeholder.preferences {
                if !entry.weight.is_finite() || !(0.0..=1.0).contains(&entry.weight) {
                    warn!(
                        key = %stakeholder.identity,
                        preference = %name,
                        weight = entry.weight,
                        "skipping preference with out-of-range weight"
                    );
                    continue;
                }
                if !entry.value.is_finite() {
                    warn!(
                        key = %stakeholder.identity,
                        preference = %name,
                        "skipping preference with non-finite number"
                    );
                    continue;
                }
                let merged = merge_preference(aggregated.remove(&name), entry.value, entry.weight);
                aggregated.insert(name, merged);
            }
        }
        Ok(aggregated)
    }
}
