use super::types::ChatMessage;
use crate::error::LlmError;
use std::future::Future;
use std::pin::Pin;

pub type CompletionFuture<'a> = Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>>;

/// Single-shot chat completion. No streaming, no tool calls.
pub trait CompletionTransport: Send + Sync {
    /// Transport identifier (e.g. "deepseek", "openai").
    fn name(&self) -> &str;

    fn create_completion<'a>(
        &'a self,
        model: &'a str,
        messages: &'a [ChatMessage],
        temperature: f64,
    ) -> CompletionFuture<'a>;
}

impl<T: CompletionTransport + ?Sized> CompletionTransport for std::sync::Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn create_completion<'a>(
        &'a self,
        model: &'a str,
        messages: &'a [ChatMessage],
        temperature: f64,
    ) -> CompletionFuture<'a> {
        (**self).create_completion(model, messages, temperature)
    }
}
