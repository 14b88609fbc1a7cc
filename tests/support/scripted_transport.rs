#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use cogito::error::LlmError;
use cogito::llm::{ChatMessage, CompletionFuture, CompletionTransport, MessageRole};
use cogito::reasoning::{StepPurpose, ThoughtStep};

/// Replies from a fixed script, one per call, and records every user prompt.
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
    systems: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_results(replies.into_iter().map(|reply| Ok(reply.into())))
    }

    pub fn with_results(replies: impl IntoIterator<Item = Result<String, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
            systems: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn system_prompts(&self) -> Vec<String> {
        self.systems.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

impl CompletionTransport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    fn create_completion<'a>(
        &'a self,
        _model: &'a str,
        messages: &'a [ChatMessage],
        _temperature: f64,
    ) -> CompletionFuture<'a> {
        for message in messages {
            let sink = match message.role {
                MessageRole::System => &self.systems,
                MessageRole::User => &self.prompts,
                MessageRole::Assistant => continue,
            };
            sink.lock().unwrap().push(message.content.clone());
        }

        let reply = self.replies.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(LlmError::Request {
                provider: "scripted".into(),
                message: "script exhausted".into(),
            })
        });
        Box::pin(async move { reply })
    }
}

/// Never answers.
pub struct StalledTransport;

impl CompletionTransport for StalledTransport {
    fn name(&self) -> &str {
        "stalled"
    }

    fn create_completion<'a>(
        &'a self,
        _model: &'a str,
        _messages: &'a [ChatMessage],
        _temperature: f64,
    ) -> CompletionFuture<'a> {
        Box::pin(std::future::pending())
    }
}

/// Step prompt that is just the purpose name, so tests can read the schedule
/// back from the recorded prompts.
pub fn purpose_prompt(purpose: StepPurpose, _steps: &[ThoughtStep]) -> String {
    purpose.to_string()
}
