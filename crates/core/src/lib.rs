// Core types and functionality for Dotflow: signal-driven execution of state graphs

pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod types;
pub mod workflow;

pub use config::{AmbiguityPolicy, EngineConfig, RerunPolicy, TopologyPolicy};
pub use context::RunContext;
pub use error::{BuildError, RunError};
pub use events::{ErrorEvent, ErrorKind, Event, EventBus, EventType};
pub use types::*;
pub use workflow::{action_fn, sync_action, Action, ActionSet, WorkflowEngine, WorkflowGraph};
