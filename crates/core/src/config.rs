use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the engine resolves more than one entry or exit candidate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopologyPolicy {
    /// Reject the graph
    #[default]
    Strict,
    /// Take the first candidate in state order
    FirstCandidate,
}

/// How the engine resolves several outgoing edges for the same signal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Follow the first declared edge
    #[default]
    FirstMatch,
    /// Fail the run
    Error,
}

/// Whether `run()` may be called again after a run has finished
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RerunPolicy {
    #[default]
    Always,
    Forbid,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub topology: TopologyPolicy,

    #[serde(default)]
    pub ambiguity: AmbiguityPolicy,

    #[serde(default)]
    pub rerun: RerunPolicy,
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse engine configuration")
    }

    /// Load configuration from a TOML file, falling back to defaults when it is absent
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(
                "Engine configuration {} not found, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).context("Failed to read engine configuration")?;
        Self::from_toml_str(&content)
    }

    pub fn with_topology(mut self, topology: TopologyPolicy) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_ambiguity(mut self, ambiguity: AmbiguityPolicy) -> Self {
        self.ambiguity = ambiguity;
        self
    }

    pub fn with_rerun(mut self, rerun: RerunPolicy) -> Self {
        self.rerun = rerun;
        self
    }
}
