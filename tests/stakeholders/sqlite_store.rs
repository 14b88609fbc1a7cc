use std::sync::Arc;

use cogito::stakeholders::{
    LlmPreferenceExtractor, PreferenceAggregator, PreferenceValue, SqliteStakeholderStore,
    StakeholderIdentity, StakeholderKind,
};
use tempfile::TempDir;

use crate::scripted_transport::ScriptedTransport;

#[tokio::test]
async fn aggregate_survives_reopening_the_database() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("stakeholders.db");
    let alice = StakeholderIdentity::new("twitter", "alice");

    {
        let store = Arc::new(SqliteStakeholderStore::open(&path).await.unwrap());
        let transport = ScriptedTransport::new([r#"{"channels": ["x", "discord"]}"#]);
        let aggregator = PreferenceAggregator::new(
            store,
            Arc::new(LlmPreferenceExtractor::new(transport, "test-model")),
        );
        aggregator
            .fetch_or_create(&alice, StakeholderKind::Priority)
            .await
            .unwrap();
        aggregator
            .process_message(&alice, "post on x and discord")
            .await
            .unwrap();
        aggregator
            .add_historical_messages(&alice, vec!["post on x and discord".into()])
            .await
            .unwrap();
    }

    let store = Arc::new(SqliteStakeholderStore::open(&path).await.unwrap());
    let aggregator = PreferenceAggregator::new(
        store,
        Arc::new(LlmPreferenceExtractor::new(
            ScriptedTransport::new(Vec::<String>::new()),
            "test-model",
        )),
    );

    let record = aggregator
        .fetch_or_create(&alice, StakeholderKind::User)
        .await
        .unwrap();
    assert_eq!(record.kind, StakeholderKind::Priority);
    assert_eq!(record.historical_messages, ["post on x and discord"]);

    let prefs = aggregator.aggregated_preferences().await.unwrap();
    assert_eq!(
        prefs["channels"],
        PreferenceValue::List(vec![
            PreferenceValue::Text("x".into()),
            PreferenceValue::Text("discord".into()),
        ])
    );
}
