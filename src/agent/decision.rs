use super::state::SystemState;
use crate::error::{ReasoningError, Result};
use crate::outcome::{Action, ActionCatalog, OutcomeCompiler, Task};
use crate::persona::Character;
use crate::prompt::{ActionPromptBuilder, TaskPromptBuilder, TeraEngine, build_system_prompt};
use crate::reasoning::{ChainRequest, ThoughtChain, ThoughtChainEngine};
use crate::stakeholders::PreferenceAggregator;
use chrono::Utc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Tasks compiled from one chain, plus the chain itself.
#[derive(Debug)]
pub struct TaskGeneration {
    pub tasks: Vec<Task>,
    pub chain: ThoughtChain,
}

/// Dependency-ordered actions for one task, plus the chain that planned them.
#[derive(Debug)]
pub struct ActionGeneration {
    pub actions: Vec<Action>,
    pub chain: ThoughtChain,
}

fn prompt_error(error: &anyhow::Error) -> ReasoningError {
    ReasoningError::Prompt(format!("{error:#}"))
}

/// Wires the chain engine, preference snapshot and outcome compiler together.
pub struct DecisionCore {
    engine: ThoughtChainEngine,
    aggregator: Arc<PreferenceAggregator>,
    catalog: Arc<ActionCatalog>,
    character: Character,
}

impl DecisionCore {
    pub fn new(
        engine: ThoughtChainEngine,
        aggregator: Arc<PreferenceAggregator>,
        catalog: Arc<ActionCatalog>,
        character: Character,
    ) -> Self {
        Self {
            engine,
            aggregator,
            catalog,
            character,
        }
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn aggregator(&self) -> &Arc<PreferenceAggregator> {
        &self.aggregator
    }

    /// Read the current aggregate and freeze it with the character.
    pub async fn snapshot_state(&self) -> Result<SystemState> {
        let preferences = self.aggregator.aggregated_preferences().await?;
        Ok(SystemState::new(self.character.clone(), preferences))
    }

    fn chain_request(&self, state: &SystemState) -> Result<ChainRequest> {
        let mut prompts = TeraEngine::new();
        let system_prompt =
            build_system_prompt(&mut prompts, &state.character, &state.preferences)
                .map_err(|e| prompt_error(&e))?;
        Ok(ChainRequest {
            system_prompt,
            preferences: state.preferences.clone(),
        })
    }

    /// Reason toward one task and compile it.
    pub async fn generate_tasks(
        &self,
        state: &SystemState,
        cancel: &CancellationToken,
    ) -> Result<TaskGeneration> {
        let request = self.chain_request(state)?;
        let builder = TaskPromptBuilder::new(&state.planning_character(), &state.preferences)
            .map_err(|e| prompt_error(&e))?;

        let chain = self.engine.generate_chain(&request, &builder, cancel).await?;
        let mut task = OutcomeCompiler::new(&self.catalog).compile_task(&chain)?;

        let now = Utc::now();
        task.created_by.clone_from(&state.character.name);
        task.created_at.get_or_insert(now);
        task.updated_at = Some(now);

        info!(task = %task.name, steps = chain.len(), "generated task");
        Ok(TaskGeneration {
            tasks: vec![task],
            chain,
        })
    }

    /// Plan the catalog actions that carry out `task`.
    pub async fn generate_actions(
        &self,
        task: &Task,
        state: &SystemState,
        cancel: &CancellationToken,
    ) -> Result<ActionGeneration> {
        let request = self.chain_request(state)?;
        let builder = ActionPromptBuilder::new(
            &state.planning_character(),
            task,
            &self.catalog,
            &state.preferences,
        )
        .map_err(|e| prompt_error(&e))?;

        let chain = self.engine.generate_chain(&request, &builder, cancel).await?;
        let actions = OutcomeCompiler::new(&self.catalog).compile_actions(&chain)?;

        info!(task = %task.name, actions = actions.len(), "generated actions");
        Ok(ActionGeneration { actions, chain })
    }
}
