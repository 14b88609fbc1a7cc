use super::Config;
use super::schema::MAX_STEP_BUDGET;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("COGITO_API_KEY").or_else(|_| std::env::var("API_KEY"))
            && !key.is_empty()
        {
            self.llm.api_key = Some(key);
        }

        if let Ok(url) = std::env::var("COGITO_API_URL")
            && !url.is_empty()
        {
            self.llm.api_url = url;
        }

        if let Ok(model) = std::env::var("COGITO_MODEL")
            && !model.is_empty()
        {
            self.llm.model = model;
        }

        if let Ok(steps_str) = std::env::var("COGITO_MAX_STEPS")
            && let Ok(steps) = steps_str.parse::<usize>()
            && (1..=MAX_STEP_BUDGET).contains(&steps)
        {
            self.reasoning.max_steps = steps;
        }

        if let Ok(level) = std::env::var("COGITO_LOG_LEVEL")
            && !level.is_empty()
        {
            self.observability.log_level = level;
        }
    }
}
