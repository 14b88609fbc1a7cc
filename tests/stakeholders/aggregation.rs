use std::sync::Arc;

use async_trait::async_trait;
use cogito::stakeholders::{
    BalanceOracle, LlmPreferenceExtractor, MemoryStakeholderStore, PreferenceAggregator,
    PreferenceValue, Stakeholder, StakeholderIdentity, StakeholderKind, StakeholderStore,
    TokenBalance,
};

use crate::scripted_transport::ScriptedTransport;

struct Whale;

#[async_trait]
impl BalanceOracle for Whale {
    async fn balance(&self, identity: &StakeholderIdentity) -> anyhow::Result<TokenBalance> {
        Ok(if identity.id == "whale" {
            TokenBalance::from(1_000_000_000_000_000)
        } else {
            TokenBalance::from(9)
        })
    }
}

fn record(id: &str, name: &str, value: PreferenceValue, weight: f64) -> Stakeholder {
    let mut stakeholder = Stakeholder::new(StakeholderIdentity::new("x", id), StakeholderKind::User);
    stakeholder.set_preference(name, value, weight);
    stakeholder
}

async fn aggregate(records: &[Stakeholder]) -> cogito::stakeholders::AggregatedPreferences {
    let store = Arc::new(MemoryStakeholderStore::new());
    for stakeholder in records {
        store.put(stakeholder).await.unwrap();
    }
    let extractor = Arc::new(LlmPreferenceExtractor::new(
        ScriptedTransport::new(Vec::<String>::new()),
        "test-model",
    ));
    PreferenceAggregator::new(store, extractor)
        .aggregated_preferences()
        .await
        .unwrap()
}

#[tokio::test]
async fn numeric_preferences_average_by_weight() {
    let prefs = aggregate(&[
        record("a", "posts_per_day", PreferenceValue::Number(10.0), 0.2),
        record("b", "posts_per_day", PreferenceValue::Number(20.0), 0.5),
    ])
    .await;
    assert_eq!(prefs["posts_per_day"], PreferenceValue::Number(15.0));
}

#[tokio::test]
async fn light_stake_cannot_flip_a_boolean() {
    let prefs = aggregate(&[
        record("a", "threads", PreferenceValue::Bool(true), 0.1),
        record("b", "threads", PreferenceValue::Bool(false), 0.7),
    ])
    .await;
    assert_eq!(prefs["threads"], PreferenceValue::Bool(true));
}

#[tokio::test]
async fn fold_follows_stakeholder_key_order() {
    let prefs = aggregate(&[
        record("b", "tone", PreferenceValue::Text("bold".into()), 0.9),
        record("a", "tone", PreferenceValue::Text("calm".into()), 0.9),
    ])
    .await;
    assert_eq!(prefs["tone"], PreferenceValue::Text("bold".into()));
}

#[tokio::test]
async fn whale_messages_override_through_process_message() {
    let store = Arc::new(MemoryStakeholderStore::new());
    let transport = ScriptedTransport::new([
        r#"{"tone": "calm", "threads": false}"#,
        r#"{"tone": "bold", "threads": true}"#,
    ]);
    let aggregator = PreferenceAggregator::new(
        store.clone(),
        Arc::new(LlmPreferenceExtractor::new(transport, "test-model")),
    )
    .with_oracle(Arc::new(Whale));

    aggregator
        .process_message(&StakeholderIdentity::new("x", "minnow"), "keep it calm")
        .await
        .unwrap();
    aggregator
        .process_message(&StakeholderIdentity::new("x", "whale"), "go bold, use threads")
        .await
        .unwrap();

    let minnow = store.get("x:minnow").await.unwrap().unwrap();
    assert!((minnow.preferences["tone"].weight - 1.0 / 15.0).abs() < 1e-9);

    let prefs = aggregator.aggregated_preferences().await.unwrap();
    assert_eq!(prefs["tone"], PreferenceValue::Text("bold".into()));
    assert_eq!(prefs["threads"], PreferenceValue::Bool(true));
}

#[test]
fn weight_curve() {
    assert_eq!(TokenBalance::zero().weight(), 0.0);
    assert!((TokenBalance::from(1_000_000_000_000_000).weight() - 1.0).abs() < 1e-9);
    assert_eq!(TokenBalance::from(u128::MAX).weight(), 1.0);

    let weights: Vec<f64> = [0_u128, 1, 10, 1_000, 1_000_000, 1_000_000_000]
        .into_iter()
        .map(|b| TokenBalance::from(b).weight())
        .collect();
    assert!(weights.windows(2).all(|pair| pair[0] < pair[1]));
}
