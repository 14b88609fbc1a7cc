use std::sync::Arc;
use std::time::Duration;

use cogito::error::{LlmError, ReasoningError};
use cogito::reasoning::{ChainRequest, ChainSettings, StepPurpose, ThoughtChainEngine};
use tokio_util::sync::CancellationToken;

use crate::scripted_transport::{ScriptedTransport, StalledTransport, purpose_prompt};

const CALM_STEP: &str = "Host the AMA on Friday, so holders get answers.\nConfidence: 0.8";
const TASK_STEP: &str = "Final answer.\n```json\n{\"name\": \"Host AMA\"}\n```";

fn settings(max_steps: usize) -> ChainSettings {
    ChainSettings {
        model: "test-model".into(),
        temperature: 0.0,
        max_steps,
        default_step_confidence: 0.7,
    }
}

fn request() -> ChainRequest {
    ChainRequest {
        system_prompt: "You are Cogito.".into(),
        ..ChainRequest::default()
    }
}

#[tokio::test]
async fn one_step_budget_produces_one_concrete_step() {
    let transport = ScriptedTransport::new([TASK_STEP]);
    let engine = ThoughtChainEngine::new(transport.clone(), settings(1)).unwrap();

    let chain = engine
        .generate_chain(&request(), &purpose_prompt, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(chain.len(), 1);
    assert_eq!(chain.steps()[0].purpose, StepPurpose::Concrete);
    assert!(chain.is_conclusive());
    assert_eq!(chain.final_conclusion(), Some(chain.steps()[0].content.as_str()));
    assert_eq!(transport.prompts(), ["concrete"]);
    assert_eq!(transport.system_prompts(), ["You are Cogito."]);
}

#[tokio::test]
async fn purposes_follow_the_schedule_and_stop_at_concrete() {
    let transport = ScriptedTransport::new([CALM_STEP, CALM_STEP, TASK_STEP, "unused"]);
    let engine = ThoughtChainEngine::new(transport.clone(), settings(3)).unwrap();

    let chain = engine
        .generate_chain(&request(), &purpose_prompt, &CancellationToken::new())
        .await
        .unwrap();

    let purposes: Vec<StepPurpose> = chain.steps().iter().map(|s| s.purpose).collect();
    assert_eq!(
        purposes,
        [StepPurpose::Initial, StepPurpose::Refinement, StepPurpose::Concrete]
    );
    assert_eq!(transport.remaining(), 1);

    let contributing: Vec<bool> = chain.steps().iter().map(|s| s.contributes_to_outcome).collect();
    assert_eq!(contributing, [false, false, true]);
}

#[tokio::test]
async fn explicit_reconsideration_replaces_the_step() {
    let transport = ScriptedTransport::new([
        "Actually, a bigger venue could work.\nConfidence: 0.9",
        CALM_STEP,
        TASK_STEP,
    ]);
    let engine = ThoughtChainEngine::new(transport.clone(), settings(2)).unwrap();

    let chain = engine
        .generate_chain(&request(), &purpose_prompt, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(transport.prompts(), ["initial", "reconsider", "concrete"]);
    assert_eq!(chain.len(), 2);
    assert_eq!(chain.steps()[0].purpose, StepPurpose::Reconsider);
    assert!(chain.steps()[0].content.starts_with("Host the AMA"));
    assert!(chain.steps()[0].contributes_to_outcome);
    assert!(chain.steps().iter().all(|s| !s.content.contains("Actually")));
}

#[tokio::test]
async fn confidence_drop_triggers_reconsideration() {
    let transport = ScriptedTransport::new([
        CALM_STEP,
        "Hence the venue stays, so nothing changes.\nConfidence: 0.3",
        CALM_STEP,
        TASK_STEP,
    ]);
    let engine = ThoughtChainEngine::new(transport.clone(), settings(3)).unwrap();

    engine
        .generate_chain(&request(), &purpose_prompt, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        transport.prompts(),
        ["initial", "refinement", "reconsider", "concrete"]
    );
}

#[tokio::test]
async fn transport_failure_aborts_the_chain() {
    let transport = ScriptedTransport::with_results([
        Ok(CALM_STEP.to_string()),
        Err(LlmError::Api {
            provider: "scripted".into(),
            status: 503,
            message: "overloaded".into(),
        }),
    ]);
    let engine = ThoughtChainEngine::new(transport, settings(3)).unwrap();

    let err = engine
        .generate_chain(&request(), &purpose_prompt, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReasoningError::Transport(LlmError::Api { status: 503, .. })
    ));
}

#[tokio::test]
async fn cancellation_interrupts_a_pending_call() {
    let engine = ThoughtChainEngine::new(Arc::new(StalledTransport), settings(3)).unwrap();
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        engine.generate_chain(&request(), &purpose_prompt, &cancel),
    )
    .await
    .expect("cancellation should end generation");

    assert!(matches!(result, Err(ReasoningError::Cancelled)));
}

#[test]
fn zero_budget_is_rejected() {
    let transport = ScriptedTransport::new(Vec::<String>::new());
    assert!(matches!(
        ThoughtChainEngine::new(transport, settings(0)),
        Err(ReasoningError::InvalidStepBudget(0))
    ));
}
