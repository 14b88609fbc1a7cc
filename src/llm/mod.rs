//! Completion transport: the single seam through which the decision core
//! talks to a language model.

pub mod compatible;
pub mod http_client;
pub mod scrub;
pub mod traits;
pub mod types;

pub use compatible::OpenAiCompatibleTransport;
pub use http_client::build_transport_client;
pub use scrub::sanitize_api_error;
pub use traits::{CompletionFuture, CompletionTransport};
pub use types::{ChatMessage, MessageRole};
