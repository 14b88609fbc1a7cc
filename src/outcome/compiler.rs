use super::action::{Action, RawAction};
use super::catalog::ActionCatalog;
use super::dag::{DagContract, DagEdge, DagNode};
use super::task::Task;
use crate::error::OutcomeError;
use crate::reasoning::ThoughtChain;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

const START_FENCE: &str = "```json";
const END_FENCE: &str = "```";

/// Turns finished thought chains into tasks and action plans.
pub struct OutcomeCompiler<'a> {
    catalog: &'a ActionCatalog,
}

impl<'a> OutcomeCompiler<'a> {
    pub fn new(catalog: &'a ActionCatalog) -> Self {
        Self { catalog }
    }

    /// Decode the first fenced JSON block of the chain's last step as a [`Task`].
    pub fn compile_task(&self, chain: &ThoughtChain) -> Result<Task, OutcomeError> {
        let last = chain
            .last()
            .ok_or_else(|| OutcomeError::Parse("thought chain is empty".into()))?;

        let block = match fenced_blocks(&last.content).into_iter().next() {
            Some(block) => block?,
            None => return Err(OutcomeError::Parse("start fence not found".into())),
        };

        serde_json::from_str(block)
            .map_err(|e| OutcomeError::Parse(format!("failed to decode task: {e}")))
    }

    /// Collect actions from the contributing steps and order them by dependency.
    pub fn compile_actions(&self, chain: &ThoughtChain) -> Result<Vec<Action>, OutcomeError> {
        let mut raw = Vec::new();
        for step in chain.contributing_steps() {
            for block in fenced_blocks(&step.content) {
                raw.extend(decode_action_block(block?)?);
            }
        }
        if raw.is_empty() {
            return Ok(Vec::new());
        }

        let actions = self.resolve(raw)?;
        order_by_dependencies(actions)
    }

    fn resolve(&self, raw: Vec<RawAction>) -> Result<Vec<Action>, OutcomeError> {
        let explicit_ids: HashSet<String> = raw
            .iter()
            .filter_map(|action| action.id.as_deref().map(str::trim))
            .filter(|id| !id.is_empty())
            .map(ToString::to_string)
            .collect();
        let mut next_generated = 0_usize;

        let mut actions: Vec<Action> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for item in raw {
            let id = match item.id.as_deref().map(str::trim) {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => loop {
                    next_generated += 1;
                    let candidate = format!("action-{next_generated}");
                    if !explicit_ids.contains(&candidate) {
                        break candidate;
                    }
                },
            };
            let action = self.resolve_one(id, item)?;

            match positions.get(&action.id) {
                Some(&index) => actions[index] = action,
                None => {
                    positions.insert(action.id.clone(), actions.len());
                    actions.push(action);
                }
            }
        }

        Ok(actions)
    }

    fn resolve_one(&self, id: String, raw: RawAction) -> Result<Action, OutcomeError> {
        let name = raw
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| OutcomeError::Validation(format!("action {id} has no name")))?;

        let kind = match raw.kind.map(|kind| kind.trim().to_string()) {
            Some(kind) if !kind.is_empty() => kind,
            _ => self
                .catalog
                .find_by_name(&name)
                .map(|action| action.kind().to_string())
                .ok_or_else(|| {
                    OutcomeError::Validation(format!(
                        "action {id} ({name}) has no kind and is not in the catalog"
                    ))
                })?,
        };

        let parameters = match raw.parameters {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(OutcomeError::Validation(format!(
                    "action {id} parameters must be a JSON object, got {other}"
                )));
            }
        };

        let mut dependencies: Vec<String> = Vec::with_capacity(raw.dependencies.len());
        for dependency in raw.dependencies {
            let dependency = dependency.trim().to_string();
            if !dependency.is_empty() && !dependencies.contains(&dependency) {
                dependencies.push(dependency);
            }
        }

        Ok(Action {
            id,
            name,
            kind,
            parameters,
            priority: raw.priority.unwrap_or_default(),
            deadline: raw.deadline,
            dependencies,
        })
    }
}

fn order_by_dependencies(actions: Vec<Action>) -> Result<Vec<Action>, OutcomeError> {
    let known: HashSet<&str> = actions.iter().map(|action| action.id.as_str()).collect();
    for action in &actions {
        if let Some(missing) = action
            .dependencies
            .iter()
            .find(|dependency| !known.contains(dependency.as_str()))
        {
            return Err(OutcomeError::Validation(format!(
                "action {} depends on unknown action {missing}",
                action.id
            )));
        }
    }

    let dag = DagContract::new(
        actions.iter().map(|action| DagNode::new(&action.id)).collect(),
        actions
            .iter()
            .flat_map(|action| {
                action
                    .dependencies
                    .iter()
                    .map(|dependency| DagEdge::new(dependency, &action.id))
            })
            .collect(),
    );
    let order = dag.topological_sort()?;

    let mut by_id: HashMap<String, Action> = actions
        .into_iter()
        .map(|action| (action.id.clone(), action))
        .collect();
    Ok(order
        .into_iter()
        .filter_map(|id| by_id.remove(&id))
        .collect())
}

fn decode_action_block(block: &str) -> Result<Vec<RawAction>, OutcomeError> {
    let value: Value = serde_json::from_str(block)
        .map_err(|e| OutcomeError::Parse(format!("failed to decode actions: {e}")))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("actions") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                object.insert("actions".into(), other);
                vec![Value::Object(object)]
            }
            None => vec![Value::Object(object)],
        },
        other => {
            return Err(OutcomeError::Parse(format!(
                "expected an action object or array, got {other}"
            )));
        }
    };

    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item)
                .map_err(|e| OutcomeError::Parse(format!("failed to decode action: {e}")))
        })
        .collect()
}

/// Bodies of every ```` ```json ```` block in `content`, in order.
///
/// Fences must start a line. A block with no closing fence yields an error
/// and ends the scan.
fn fenced_blocks(content: &str) -> Vec<Result<&str, OutcomeError>> {
    let mut blocks = Vec::new();
    let mut offset = 0;
    let mut open: Option<usize> = None;

    for line in content.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let marker = line.trim();

        match open {
            None if marker == START_FENCE => open = Some(offset),
            Some(body_start) if marker == END_FENCE => {
                blocks.push(Ok(&content[body_start..line_start]));
                open = None;
            }
            _ => {}
        }
    }

    if open.is_some() {
        blocks.push(Err(OutcomeError::Parse("end fence not found".into())));
    }
    blocks
}
