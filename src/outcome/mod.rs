//! Compiling finished thought chains into tasks and ordered action plans.

mod action;
mod catalog;
mod compiler;
pub mod dag;
mod task;

pub use action::Action;
pub use catalog::{ActionCatalog, CatalogAction};
pub use compiler::OutcomeCompiler;
pub use dag::DagContract;
pub use task::{Task, TaskStatus};
