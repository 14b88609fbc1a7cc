mod builder;
mod engine;
mod steps;

pub use builder::{build_system_prompt, format_preferences, format_previous_steps};
pub use engine::TeraEngine;
pub use steps::{ActionPromptBuilder, StepPromptBuilder, TaskPromptBuilder};
