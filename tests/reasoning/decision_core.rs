use std::sync::Arc;

use async_trait::async_trait;
use cogito::agent::DecisionCore;
use cogito::error::{CogitoError, OutcomeError};
use cogito::outcome::{ActionCatalog, CatalogAction, OutcomeCompiler, Task, TaskStatus};
use cogito::persona::Character;
use cogito::reasoning::{ChainSettings, StepPurpose, ThoughtChain, ThoughtChainEngine, ThoughtStep};
use cogito::stakeholders::{
    LlmPreferenceExtractor, MemoryStakeholderStore, PreferenceAggregator, StakeholderIdentity,
};
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use crate::scripted_transport::ScriptedTransport;

const CALM_STEP: &str = "Host the AMA on Friday, so holders get answers.\nConfidence: 0.8";

struct Announce;

#[async_trait]
impl CatalogAction for Announce {
    fn name(&self) -> &str {
        "announce"
    }

    fn description(&self) -> &str {
        "Post an announcement"
    }

    fn kind(&self) -> &str {
        "social"
    }

    async fn execute(&self, _parameters: &Map<String, Value>) -> anyhow::Result<()> {
        Ok(())
    }
}

fn sample_task() -> Task {
    let mut task = Task::new("Host AMA", "Answer holder questions live");
    task.priority = 0.8;
    task.execution_steps = vec!["Pick a slot".into(), "Announce it".into()];
    task.requires_stakeholder_input = true;
    task
}

fn core_with(transport: Arc<ScriptedTransport>, max_steps: usize) -> DecisionCore {
    let store = Arc::new(MemoryStakeholderStore::new());
    let extractor = Arc::new(LlmPreferenceExtractor::new(transport.clone(), "test-model"));
    let aggregator = Arc::new(PreferenceAggregator::new(store, extractor));

    let mut catalog = ActionCatalog::new();
    catalog.register(Arc::new(Announce)).unwrap();

    let settings = ChainSettings {
        model: "test-model".into(),
        temperature: 0.0,
        max_steps,
        default_step_confidence: 0.7,
    };
    let engine = ThoughtChainEngine::new(transport, settings).unwrap();
    DecisionCore::new(engine, aggregator, Arc::new(catalog), Character::default())
}

#[test]
fn fenced_task_round_trips_through_the_compiler() {
    let task = sample_task();
    let chain = ThoughtChain::from_steps([ThoughtStep::new(
        StepPurpose::Concrete,
        format!("Here is the plan.\n{}", task.to_fenced_block().unwrap()),
    )]);

    let catalog = ActionCatalog::new();
    let decoded = OutcomeCompiler::new(&catalog).compile_task(&chain).unwrap();
    assert_eq!(decoded, task);
}

#[tokio::test]
async fn generate_tasks_compiles_and_stamps_the_task() {
    let task = sample_task();
    let transport = ScriptedTransport::new([
        CALM_STEP.to_string(),
        format!("Settled.\n{}", task.to_fenced_block().unwrap()),
    ]);
    let core = core_with(transport.clone(), 2);

    let state = core.snapshot_state().await.unwrap();
    let generation = core
        .generate_tasks(&state, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(generation.chain.len(), 2);
    let [generated] = generation.tasks.as_slice() else {
        panic!("expected exactly one task");
    };
    assert_eq!(generated.id, task.id);
    assert_eq!(generated.execution_steps, task.execution_steps);
    assert_eq!(generated.status, TaskStatus::Pending);
    assert_eq!(generated.created_by, "Cogito");
    assert!(generated.created_at.is_some());

    let prompts = transport.prompts();
    assert!(prompts[0].contains("Grow the community"));
    assert!(prompts[1].contains("```json"));
}

#[tokio::test]
async fn missing_fence_is_a_parse_error() {
    let transport = ScriptedTransport::new([CALM_STEP, "I would host an AMA."]);
    let core = core_with(transport, 2);

    let state = core.snapshot_state().await.unwrap();
    let err = core
        .generate_tasks(&state, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CogitoError::Outcome(OutcomeError::Parse(_))));
}

#[tokio::test]
async fn generate_actions_orders_by_dependency() {
    let transport = ScriptedTransport::new([
        CALM_STEP,
        "```json\n[\
         {\"id\": \"post\", \"name\": \"announce\", \"parameters\": {\"text\": \"AMA Friday\"}, \"dependencies\": [\"draft\"]},\
         {\"id\": \"draft\", \"name\": \"draft_copy\", \"kind\": \"content\"}\
         ]\n```",
    ]);
    let core = core_with(transport.clone(), 2);

    let state = core.snapshot_state().await.unwrap();
    let generation = core
        .generate_actions(&sample_task(), &state, &CancellationToken::new())
        .await
        .unwrap();

    let ids: Vec<&str> = generation.actions.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["draft", "post"]);
    assert_eq!(generation.actions[1].kind, "social");
    assert!(transport.prompts()[0].contains("- social / announce: Post an announcement"));
}

#[tokio::test]
async fn snapshot_reads_current_preferences() {
    let transport = ScriptedTransport::new([r#"{"post_frequency": 3}"#]);
    let core = core_with(transport, 2);

    core.aggregator()
        .process_message(&StakeholderIdentity::new("twitter", "alice"), "post three times a day")
        .await
        .unwrap();

    let state = core.snapshot_state().await.unwrap();
    assert!(state.preferences.contains_key("post_frequency"));
    assert_eq!(state.goals, state.character.goals);
}
