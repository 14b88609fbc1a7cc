//! Purpose-specific prompts for each step of a thought chain.

use super::builder::{format_preferences, format_previous_steps};
use super::engine::TeraEngine;
use crate::error::ReasoningError;
use crate::outcome::{ActionCatalog, Task};
use crate::persona::Character;
use crate::reasoning::{StepPurpose, ThoughtStep};
use crate::stakeholders::AggregatedPreferences;
use serde::Serialize;
use tera::Context;

/// Produces the user prompt for the next step, given the steps so far.
pub trait StepPromptBuilder: Send + Sync {
    fn build(&self, purpose: StepPurpose, steps: &[ThoughtStep]) -> Result<String, ReasoningError>;
}

impl<F> StepPromptBuilder for F
where
    F: Fn(StepPurpose, &[ThoughtStep]) -> String + Send + Sync,
{
    fn build(&self, purpose: StepPurpose, steps: &[ThoughtStep]) -> Result<String, ReasoningError> {
        Ok(self(purpose, steps))
    }
}

const RESPONSE_FORMAT: &str = "\
Think it through, then end your answer with these sections:
Evidence:
- <facts or figures that support your reasoning>
Alternatives:
- <other approaches worth considering>
Confidence: <a number between 0 and 1>";

const TASK_SCHEMA: &str = r#"```json
{
  "id": "short-kebab-id",
  "name": "Task name",
  "description": "What the task achieves and why",
  "priority": 0.8,
  "execution_steps": ["first step", "second step"],
  "status": "pending",
  "requires_approval": false,
  "requires_stakeholder_input": false,
  "tools": []
}
```"#;

const ACTION_SCHEMA: &str = r#"```json
[
  {
    "id": "a1",
    "name": "<catalog action name>",
    "kind": "<catalog action kind>",
    "parameters": {},
    "priority": 0.5,
    "dependencies": []
  }
]
```"#;

const TASK_TEMPLATES: [(StepPurpose, &str); 6] = [
    (
        StepPurpose::Initial,
        "\
You are {{ name }}. Review your goals and what stakeholders currently want, \
then list the candidate tasks most worth pursuing next.

Goals:
{% for goal in goals %}- {{ goal.name }} (weight {{ goal.weight }}): {{ goal.description }}
{% endfor %}
Stakeholder preferences:
{{ preferences }}

{{ response_format }}",
    ),
    (
        StepPurpose::Exploration,
        "\
Explore different ways of pursuing the strongest candidate tasks.

Previous steps:
{{ previous_steps }}
{{ response_format }}",
    ),
    (
        StepPurpose::Analysis,
        "\
Evaluate the candidate tasks for feasibility, risk and alignment with your goals \
and the stakeholder preferences.

Previous steps:
{{ previous_steps }}
{{ response_format }}",
    ),
    (
        StepPurpose::Refinement,
        "\
Improve and tighten the most promising task based on the analysis so far.

Previous steps:
{{ previous_steps }}
{{ response_format }}",
    ),
    (
        StepPurpose::Reconsider,
        "\
Your latest reasoning had a weakness. Step back, reconsider the approach, and \
settle on a better task.

Previous steps:
{{ previous_steps }}
Emit the resulting task as a single JSON object in a fenced block:
{{ schema }}

{{ response_format }}",
    ),
    (
        StepPurpose::Concrete,
        "\
Finalize exactly one executable task from the reasoning below.

Previous steps:
{{ previous_steps }}
Emit the task as a single JSON object in a fenced block, exactly like this:
{{ schema }}",
    ),
];

const ACTION_TEMPLATES: [(StepPurpose, &str); 6] = [
    (
        StepPurpose::Initial,
        "\
You are {{ name }}. Plan the actions needed to carry out this task:
{{ task }}

Available actions:
{{ catalog }}

{{ response_format }}",
    ),
    (
        StepPurpose::Exploration,
        "\
Explore which available actions could move the task forward and in what order.

Task:
{{ task }}

Previous steps:
{{ previous_steps }}
{{ response_format }}",
    ),
    (
        StepPurpose::Analysis,
        "\
Check the planned actions for missing prerequisites, ordering problems and risk.

Previous steps:
{{ previous_steps }}
{{ response_format }}",
    ),
    (
        StepPurpose::Refinement,
        "\
Refine the action plan: fill in parameters and dependencies.

Available actions:
{{ catalog }}

Previous steps:
{{ previous_steps }}
{{ response_format }}",
    ),
    (
        StepPurpose::Reconsider,
        "\
Your latest plan had a weakness. Reconsider it and produce a better action plan \
using only the available actions.

Available actions:
{{ catalog }}

Previous steps:
{{ previous_steps }}
Emit the actions as a JSON array in a fenced block:
{{ schema }}

{{ response_format }}",
    ),
    (
        StepPurpose::Concrete,
        "\
Finalize the action plan. Use only the available actions; list an action's \
prerequisites by id in `dependencies`.

Available actions:
{{ catalog }}

Previous steps:
{{ previous_steps }}
Emit the actions as a JSON array in a fenced block, exactly like this:
{{ schema }}",
    ),
];

/// One registered template per purpose plus the context shared by all of them.
struct PurposePrompts {
    engine: TeraEngine,
    context: Context,
}

impl PurposePrompts {
    fn new(templates: &[(StepPurpose, &str)], context: Context) -> anyhow::Result<Self> {
        let mut engine = TeraEngine::new();
        for (purpose, template) in templates {
            engine.add_template(purpose.as_ref(), template)?;
        }
        Ok(Self { engine, context })
    }

    fn render(&self, purpose: StepPurpose, steps: &[ThoughtStep]) -> Result<String, ReasoningError> {
        let mut ctx = self.context.clone();
        ctx.insert("previous_steps", &format_previous_steps(steps));
        self.engine
            .render(purpose.as_ref(), &ctx)
            .map_err(|e| ReasoningError::Prompt(format!("{e:#}")))
    }
}

/// Goal as rendered into a prompt, weight pre-formatted.
#[derive(Serialize)]
struct GoalLine<'a> {
    name: &'a str,
    weight: String,
    description: &'a str,
}

fn base_context(character: &Character, preferences: &AggregatedPreferences) -> anyhow::Result<Context> {
    let mut ctx = Context::new();
    ctx.insert("name", &character.name);
    let goals: Vec<GoalLine<'_>> = character
        .goals
        .iter()
        .map(|goal| GoalLine {
            name: &goal.name,
            weight: format!("{:.2}", goal.weight),
            description: &goal.description,
        })
        .collect();
    ctx.insert("goals", &goals);
    ctx.insert("preferences", &format_preferences(preferences)?);
    ctx.insert("response_format", RESPONSE_FORMAT);
    Ok(ctx)
}

/// Prompts for a chain that ends in one [`Task`].
pub struct TaskPromptBuilder {
    prompts: PurposePrompts,
}

impl TaskPromptBuilder {
    pub fn new(character: &Character, preferences: &AggregatedPreferences) -> anyhow::Result<Self> {
        let mut ctx = base_context(character, preferences)?;
        ctx.insert("schema", TASK_SCHEMA);
        Ok(Self {
            prompts: PurposePrompts::new(&TASK_TEMPLATES, ctx)?,
        })
    }
}

impl StepPromptBuilder for TaskPromptBuilder {
    fn build(&self, purpose: StepPurpose, steps: &[ThoughtStep]) -> Result<String, ReasoningError> {
        self.prompts.render(purpose, steps)
    }
}

/// Prompts for a chain that plans the actions carrying out `task`.
pub struct ActionPromptBuilder {
    prompts: PurposePrompts,
}

impl ActionPromptBuilder {
    pub fn new(
        character: &Character,
        task: &Task,
        catalog: &ActionCatalog,
        preferences: &AggregatedPreferences,
    ) -> anyhow::Result<Self> {
        let mut ctx = base_context(character, preferences)?;
        ctx.insert("task", &serde_json::to_string_pretty(task)?);
        ctx.insert("catalog", &catalog.describe());
        ctx.insert("schema", ACTION_SCHEMA);
        Ok(Self {
            prompts: PurposePrompts::new(&ACTION_TEMPLATES, ctx)?,
        })
    }
}

impl StepPromptBuilder for ActionPromptBuilder {
    fn build(&self, purpose: StepPurpose, steps: &[ThoughtStep]) -> Result<String, ReasoningError> {
        self.prompts.render(purpose, steps)
    }
}
