use super::action::{ActionMatcher, ActionSet};
use super::dag::WorkflowGraph;
use super::step_executor::StepExecutor;
use crate::config::{AmbiguityPolicy, EngineConfig, RerunPolicy};
use crate::context::RunContext;
use crate::error::{BuildError, RunError};
use crate::events::{ErrorEvent, ErrorKind, Event, EventBus, EventType};
use crate::types::{EdgeStatement, RunId, RunStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Last transition taken by a run
#[derive(Debug, Default)]
struct Cursor {
    state: Option<String>,
    signal: String,
}

/// Which run `status()` reports on
#[derive(Debug, Default)]
struct LatestRun {
    run_id: Option<RunId>,
    status: RunStatus,
}

/// Engine that walks a workflow graph from its entry state to its exit state,
/// performing the action bound to every visited state.
///
/// Graph, actions and configuration are fixed at construction. Each call to
/// [`WorkflowEngine::run`] owns its own context and cursor, so one engine can
/// serve several runs, including concurrent ones.
pub struct WorkflowEngine {
    graph: WorkflowGraph,
    step_executor: StepExecutor,
    events: Arc<EventBus>,
    config: EngineConfig,
    latest: RwLock<LatestRun>,
    has_finished: AtomicBool,
}

impl WorkflowEngine {
    /// Build an engine with the default configuration
    pub fn new(statements: &[EdgeStatement], actions: ActionSet) -> Result<Self, BuildError> {
        Self::with_config(statements, actions, EngineConfig::default())
    }

    pub fn with_config(
        statements: &[EdgeStatement],
        actions: ActionSet,
        config: EngineConfig,
    ) -> Result<Self, BuildError> {
        let graph = WorkflowGraph::from_statements(statements, config.topology)?;
        Self::from_graph(graph, actions, config)
    }

    pub fn from_graph(
        graph: WorkflowGraph,
        actions: ActionSet,
        config: EngineConfig,
    ) -> Result<Self, BuildError> {
        let matcher = Arc::new(ActionMatcher::compile(&actions)?);
        let events = Arc::new(EventBus::new());

        let unreachable = graph.unreachable_states();
        if !unreachable.is_empty() {
            tracing::warn!(
                "States unreachable from \"{}\": {}",
                graph.entry(),
                unreachable.join(", ")
            );
        }

        tracing::debug!(
            "Workflow engine ready: {} states, {} edges, entry=\"{}\", exit=\"{}\", {} action bindings",
            graph.state_count(),
            graph.edges().len(),
            graph.entry(),
            graph.exit(),
            matcher.len()
        );

        Ok(Self {
            graph,
            step_executor: StepExecutor::new(matcher, events.clone()),
            events,
            config,
            latest: RwLock::new(LatestRun::default()),
            has_finished: AtomicBool::new(false),
        })
    }

    /// Publish events on a caller-owned bus instead of the engine's own
    pub fn with_event_bus(mut self, events: Arc<EventBus>) -> Self {
        self.step_executor = self.step_executor.with_event_bus(events.clone());
        self.events = events;
        self
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Status of the most recently started run
    pub async fn status(&self) -> RunStatus {
        self.latest.read().await.status
    }

    /// Record the outcome of `run_id`, unless a newer run has started since
    async fn settle(&self, run_id: RunId, status: RunStatus) {
        let mut latest = self.latest.write().await;
        if latest.run_id == Some(run_id) {
            latest.status = status;
        }
    }

    /// Execute the workflow from the entry state until the exit state is
    /// performed, returning the context the actions accumulated.
    pub async fn run(&self) -> Result<RunContext, RunError> {
        if self.config.rerun == RerunPolicy::Forbid && self.has_finished.load(Ordering::Acquire) {
            tracing::warn!("Rejecting run: workflow already finished and reruns are disabled");
            return Err(RunError::AlreadyFinished);
        }

        let run_id = RunId::new();
        let context = RunContext::new();

        tracing::info!("Starting workflow run: run_id={}", run_id);
        *self.latest.write().await = LatestRun {
            run_id: Some(run_id),
            status: RunStatus::Running,
        };
        self.events.publish(Event::new(run_id, EventType::Started));

        match self.execute_steps(run_id, &context).await {
            Ok(()) => {
                self.has_finished.store(true, Ordering::Release);
                self.settle(run_id, RunStatus::Finished).await;
                tracing::info!("Workflow run finished: run_id={}", run_id);
                Ok(context)
            }
            Err(e) => {
                self.settle(run_id, RunStatus::Failed).await;
                tracing::error!("Workflow run failed: run_id={}, error={}", run_id, e);
                Err(e)
            }
        }
    }

    async fn execute_steps(&self, run_id: RunId, context: &RunContext) -> Result<(), RunError> {
        let mut cursor = Cursor::default();

        loop {
            let next = match cursor.state.as_deref() {
                None => self.graph.entry().to_string(),
                Some(state) => self.resolve_transition(run_id, state, &cursor.signal)?,
            };

            let signal = self
                .step_executor
                .perform(run_id, &next, &cursor.signal, context)
                .await?;

            tracing::debug!(
                "Step complete: state=\"{}\" signal=\"{}\" run_id={}",
                next,
                signal,
                run_id
            );

            let reached_exit = next == self.graph.exit();
            cursor = Cursor {
                state: Some(next),
                signal,
            };

            if reached_exit {
                self.events.publish(Event::new(run_id, EventType::Finished));
                return Ok(());
            }
        }
    }

    /// Pick the state that follows `state` when it produced `signal`
    fn resolve_transition(
        &self,
        run_id: RunId,
        state: &str,
        signal: &str,
    ) -> Result<String, RunError> {
        let candidates = self.graph.next_states(state, signal);

        let error = match (candidates.as_slice(), self.config.ambiguity) {
            ([only], _) => return Ok(only.to_string()),
            ([first, ..], AmbiguityPolicy::FirstMatch) => {
                tracing::debug!(
                    "{} edges leave \"{}\" for \"{}\", following the first",
                    candidates.len(),
                    state,
                    signal
                );
                return Ok(first.to_string());
            }
            ([], _) => RunError::UnresolvedTransition {
                state: state.to_string(),
                signal: signal.to_string(),
            },
            (_, AmbiguityPolicy::Error) => RunError::AmbiguousTransition {
                state: state.to_string(),
                signal: signal.to_string(),
                candidates: candidates.iter().map(|s| s.to_string()).collect(),
            },
        };

        let kind = match error {
            RunError::AmbiguousTransition { .. } => ErrorKind::AmbiguousTransition,
            _ => ErrorKind::UnresolvedTransition,
        };

        self.events.publish(Event::new(
            run_id,
            EventType::Error(ErrorEvent {
                kind,
                state: state.to_string(),
                signal: signal.to_string(),
                message: error.to_string(),
            }),
        ));

        Err(error)
    }
}

impl std::fmt::Debug for WorkflowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowEngine")
            .field("graph", &self.graph)
            .field("actions", self.step_executor.matcher())
            .field("config", &self.config)
            .finish()
    }
}
