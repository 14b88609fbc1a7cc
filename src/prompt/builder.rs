use super::engine::TeraEngine;
use crate::persona::Character;
use crate::reasoning::ThoughtStep;
use crate::stakeholders::AggregatedPreferences;
use std::fmt::Write as _;
use tera::Context;

const SYSTEM_PROMPT_TEMPLATE: &str = "\
You are {{ name }}.
{{ system }}
{% if bio %}
## Bio
{% for line in bio %}- {{ line }}
{% endfor %}{% endif %}\
{% if lore %}
## Lore
{% for line in lore %}- {{ line }}
{% endfor %}{% endif %}\
{% if tone %}
## Tone
{{ tone }}
{% endif %}\
{% if constraints %}
## Constraints
{% for line in constraints %}- {{ line }}
{% endfor %}{% endif %}
## Stakeholder Preferences
{{ preferences }}
";

const SYSTEM_PROMPT_NAME: &str = "system_prompt";

/// Ensure the default templates are registered in the engine.
fn ensure_defaults(engine: &mut TeraEngine) -> anyhow::Result<()> {
    engine.add_template(SYSTEM_PROMPT_NAME, SYSTEM_PROMPT_TEMPLATE)
}

/// Render aggregated preferences for embedding in a prompt.
pub fn format_preferences(preferences: &AggregatedPreferences) -> anyhow::Result<String> {
    if preferences.is_empty() {
        return Ok("No stakeholder preferences recorded yet.".into());
    }
    Ok(serde_json::to_string_pretty(preferences)?)
}

/// System prompt shared by every step of a chain.
pub fn build_system_prompt(
    engine: &mut TeraEngine,
    character: &Character,
    preferences: &AggregatedPreferences,
) -> anyhow::Result<String> {
    ensure_defaults(engine)?;

    let mut ctx = Context::new();
    ctx.insert("name", &character.name);
    ctx.insert("system", &character.system);
    ctx.insert("bio", &character.bio);
    ctx.insert("lore", &character.lore);
    ctx.insert("tone", &character.style.tone.join(", "));
    ctx.insert("constraints", &character.style.constraints);
    ctx.insert("preferences", &format_preferences(preferences)?);

    engine.render(SYSTEM_PROMPT_NAME, &ctx)
}

/// `Step n (purpose):` blocks for every step so far.
pub fn format_previous_steps(steps: &[ThoughtStep]) -> String {
    if steps.is_empty() {
        return "No previous steps".into();
    }

    let mut formatted = String::new();
    for (i, step) in steps.iter().enumerate() {
        let _ = write!(
            formatted,
            "Step {} ({}):\n{}\n\n",
            i + 1,
            step.purpose,
            step.content
        );
    }
    formatted
}
