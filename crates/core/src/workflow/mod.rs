pub mod action;
pub mod dag;
pub mod executor;
pub mod step_executor;

pub use action::{
    action_fn, sync_action, Action, ActionMatcher, ActionSet, MatchedAction, StatePattern,
};
pub use dag::WorkflowGraph;
pub use executor::WorkflowEngine;
pub use step_executor::StepExecutor;
