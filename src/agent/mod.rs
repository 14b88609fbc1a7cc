mod decision;
mod state;

pub use decision::{ActionGeneration, DecisionCore, TaskGeneration};
pub use state::SystemState;
