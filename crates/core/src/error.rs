//! Error types for building and running workflows.

use std::sync::Arc;

/// Errors raised while constructing a workflow engine.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The edge list does not describe a graph with a single entry and exit.
    #[error("Malformed graph: {0}")]
    MalformedGraph(String),

    /// An action pattern could not be compiled.
    #[error("Invalid action pattern \"{pattern}\": {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors that terminate a workflow run.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RunError {
    /// No outgoing edge matches the current state and signal.
    #[error("No next states possible from \"{state}\"{}", signal_suffix(.signal))]
    UnresolvedTransition { state: String, signal: String },

    /// More than one outgoing edge matches and ambiguity is treated as an error.
    #[error(
        "Multiple next states possible from \"{state}\" for \"{signal}\" [{}]",
        .candidates.join(", ")
    )]
    AmbiguousTransition {
        state: String,
        signal: String,
        candidates: Vec<String>,
    },

    /// The action bound to `state` failed. Displays the original failure verbatim.
    #[error("{cause}")]
    ActionFailure {
        state: String,
        cause: Arc<anyhow::Error>,
    },

    /// The engine already finished a run and reruns are disabled.
    #[error("Workflow already finished; reruns are disabled")]
    AlreadyFinished,
}

impl RunError {
    /// The failure returned by the action, if this error came from one
    pub fn action_error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::ActionFailure { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }

    /// State the run was in when the error occurred
    pub fn state(&self) -> Option<&str> {
        match self {
            Self::UnresolvedTransition { state, .. }
            | Self::AmbiguousTransition { state, .. }
            | Self::ActionFailure { state, .. } => Some(state),
            Self::AlreadyFinished => None,
        }
    }
}

fn signal_suffix(signal: &str) -> String {
    if signal.is_empty() {
        String::new()
    } else {
        format!(" for \"{}\"", signal)
    }
}
