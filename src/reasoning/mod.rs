//! Thought-chain generation and the reconsideration detector.

pub mod aha;
mod engine;
mod parse;
mod purpose;
mod types;

pub use aha::{
    detect_better_alternative, detect_confidence_drop, detect_explicit_reconsideration,
    detect_logical_gaps, detect_reconsideration,
};
pub use engine::{ChainRequest, ChainSettings, ThoughtChainEngine};
pub use parse::parse_step_response;
pub use purpose::step_purpose;
pub use types::{
    ReconsiderationDetection, StepPurpose, ThoughtChain, ThoughtStep, TriggerKind,
    contributes_to_outcome,
};
