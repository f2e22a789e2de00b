use super::action::ActionMatcher;
use crate::context::RunContext;
use crate::error::RunError;
use crate::events::{ErrorEvent, ErrorKind, Event, EventBus, EventType};
use crate::types::RunId;
use std::sync::Arc;

/// Performs the action bound to a single state and reports its lifecycle
#[derive(Debug, Clone)]
pub struct StepExecutor {
    matcher: Arc<ActionMatcher>,
    events: Arc<EventBus>,
}

impl StepExecutor {
    pub fn new(matcher: Arc<ActionMatcher>, events: Arc<EventBus>) -> Self {
        Self { matcher, events }
    }

    pub fn with_event_bus(self, events: Arc<EventBus>) -> Self {
        Self { events, ..self }
    }

    pub fn matcher(&self) -> &ActionMatcher {
        &self.matcher
    }

    /// Perform `state`, entered on `incoming_signal`, and return the signal it produced
    /// (empty when none).
    pub async fn perform(
        &self,
        run_id: RunId,
        state: &str,
        incoming_signal: &str,
        context: &RunContext,
    ) -> Result<String, RunError> {
        self.events.publish(Event::new(
            run_id,
            EventType::Performing {
                state: state.to_string(),
            },
        ));

        let signal = match self.matcher.find_action(state) {
            Some(matched) => {
                tracing::debug!(
                    "Performing state \"{}\" via pattern \"{}\" for run {}",
                    state,
                    matched.pattern,
                    run_id
                );

                match matched
                    .action
                    .perform(matched.params, context.clone())
                    .await
                {
                    Ok(signal) => signal.unwrap_or_default(),
                    Err(e) => {
                        tracing::error!("Action for state \"{}\" failed: {:#}", state, e);

                        self.events.publish(Event::new(
                            run_id,
                            EventType::Error(ErrorEvent {
                                kind: ErrorKind::ActionFailure,
                                state: state.to_string(),
                                signal: incoming_signal.to_string(),
                                message: e.to_string(),
                            }),
                        ));

                        return Err(RunError::ActionFailure {
                            state: state.to_string(),
                            cause: Arc::new(e),
                        });
                    }
                }
            }
            None => {
                let message = format!("unrecognized action: {}", state);
                tracing::warn!("{} (run {})", message, run_id);
                self.events
                    .publish(Event::new(run_id, EventType::Warning { message }));
                String::new()
            }
        };

        self.events.publish(Event::new(
            run_id,
            EventType::Performed {
                state: state.to_string(),
            },
        ));

        Ok(signal)
    }
}
