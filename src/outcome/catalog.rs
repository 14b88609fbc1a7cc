use crate::error::OutcomeError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Arc;

/// An action the host can actually run.
#[async_trait]
pub trait CatalogAction: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Broad category, e.g. `social` or `chain`.
    fn kind(&self) -> &str;

    /// Extra guidance shown to the model about this action's parameters.
    fn parameters_prompt(&self) -> &str {
        ""
    }

    async fn execute(&self, parameters: &Map<String, Value>) -> anyhow::Result<()>;
}

/// Actions available to the decision core, keyed by `(kind, name)`.
#[derive(Default)]
pub struct ActionCatalog {
    actions: BTreeMap<(String, String), Arc<dyn CatalogAction>>,
}

impl ActionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action. A second action with the same kind and name is rejected.
    pub fn register(&mut self, action: Arc<dyn CatalogAction>) -> Result<(), OutcomeError> {
        let key = (action.kind().to_string(), action.name().to_string());
        if self.actions.contains_key(&key) {
            return Err(OutcomeError::Validation(format!(
                "action already registered: {} / {}",
                key.0, key.1
            )));
        }
        self.actions.insert(key, action);
        Ok(())
    }

    pub fn find(&self, kind: &str, name: &str) -> Option<&Arc<dyn CatalogAction>> {
        self.actions.get(&(kind.to_string(), name.to_string()))
    }

    /// First action with this name, in `(kind, name)` order.
    pub fn find_by_name(&self, name: &str) -> Option<&Arc<dyn CatalogAction>> {
        self.actions.values().find(|action| action.name() == name)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// One line per action for prompts.
    pub fn describe(&self) -> String {
        if self.actions.is_empty() {
            return "No actions available".to_string();
        }

        let mut out = String::new();
        for action in self.actions.values() {
            let _ = writeln!(
                out,
                "- {} / {}: {}",
                action.kind(),
                action.name(),
                action.description()
            );
            let hint = action.parameters_prompt();
            if !hint.is_empty() {
                let _ = writeln!(out, "  parameters: {hint}");
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Post;

    #[async_trait]
    impl CatalogAction for Post {
        fn name(&self) -> &str {
            "post_tweet"
        }

        fn description(&self) -> &str {
            "Post a message on X"
        }

        fn kind(&self) -> &str {
            "social"
        }

        fn parameters_prompt(&self) -> &str {
            "{\"text\": string}"
        }

        async fn execute(&self, _parameters: &Map<String, Value>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn empty_catalog_description() {
        assert_eq!(ActionCatalog::new().describe(), "No actions available");
    }

    #[test]
    fn register_and_find() {
        let mut catalog = ActionCatalog::new();
        catalog.register(Arc::new(Post)).unwrap();

        assert!(catalog.find("social", "post_tweet").is_some());
        assert!(catalog.find("chain", "post_tweet").is_none());
        assert_eq!(catalog.find_by_name("post_tweet").unwrap().kind(), "social");
        assert_eq!(
            catalog.describe(),
            "- social / post_tweet: Post a message on X\n  parameters: {\"text\": string}\n"
        );
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut catalog = ActionCatalog::new();
        catalog.register(Arc::new(Post)).unwrap();
        let err = catalog.register(Arc::new(Post)).unwrap_err();
        assert!(matches!(err, OutcomeError::Validation(_)));
        assert_eq!(catalog.len(), 1);
    }

    #[tokio::test]
    async fn registered_action_executes() {
        let mut catalog = ActionCatalog::new();
        catalog.register(Arc::new(Post)).unwrap();
        let action = catalog.find("social", "post_tweet").unwrap();
        assert!(action.execute(&Map::new()).await.is_ok());
    }
}
