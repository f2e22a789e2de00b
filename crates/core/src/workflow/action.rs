use crate::context::RunContext;
use crate::error::BuildError;
use crate::types::Params;
use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use std::future::Future;
use std::sync::{Arc, OnceLock};

/// Unit of work bound to one or more states.
///
/// Receives the placeholder values captured from the state name and the
/// run's shared context. A returned non-empty string becomes the signal used
/// to pick the next edge.
#[async_trait]
pub trait Action: Send + Sync {
    async fn perform(&self, params: Params, context: RunContext) -> Result<Option<String>>;
}

/// Adapter for async closures
pub struct FnAction<F>(F);

#[async_trait]
impl<F, Fut> Action for FnAction<F>
where
    F: Fn(Params, RunContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<String>>> + Send + 'static,
{
    async fn perform(&self, params: Params, context: RunContext) -> Result<Option<String>> {
        (self.0)(params, context).await
    }
}

/// Adapter for plain closures
pub struct SyncAction<F>(F);

#[async_trait]
impl<F> Action for SyncAction<F>
where
    F: Fn(Params, RunContext) -> Result<Option<String>> + Send + Sync + 'static,
{
    async fn perform(&self, params: Params, context: RunContext) -> Result<Option<String>> {
        (self.0)(params, context)
    }
}

/// Wrap an async closure as an action
pub fn action_fn<F, Fut>(f: F) -> Arc<dyn Action>
where
    F: Fn(Params, RunContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<String>>> + Send + 'static,
{
    Arc::new(FnAction(f))
}

/// Wrap a synchronous closure as an action
pub fn sync_action<F>(f: F) -> Arc<dyn Action>
where
    F: Fn(Params, RunContext) -> Result<Option<String>> + Send + Sync + 'static,
{
    Arc::new(SyncAction(f))
}

/// Ordered mapping of state-name patterns to actions
#[derive(Clone, Default)]
pub struct ActionSet {
    bindings: Vec<(String, Arc<dyn Action>)>,
}

impl ActionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `action` to states matching `pattern`. Earlier bindings take precedence.
    pub fn bind(mut self, pattern: impl Into<String>, action: Arc<dyn Action>) -> Self {
        self.bindings.push((pattern.into(), action));
        self
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|(p, _)| p.as_str())
    }
}

impl std::fmt::Debug for ActionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.patterns()).finish()
    }
}

/// A pattern compiled into an anchored regular expression
#[derive(Debug, Clone)]
pub struct StatePattern {
    source: String,
    regex: Regex,
    names: Vec<String>,
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex is valid")
    })
}

impl StatePattern {
    /// Compile `pattern`, turning each `{name}` into a named capture group
    pub fn compile(pattern: &str) -> Result<Self, BuildError> {
        let mut expr = String::from(r"\A");
        let mut names = Vec::new();
        let mut last = 0;

        for caps in placeholder_regex().captures_iter(pattern) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let name = name.as_str();

            expr.push_str(&regex::escape(&pattern[last..whole.start()]));
            expr.push_str(&format!("(?P<{}>.*)", name));
            names.push(name.to_string());
            last = whole.end();
        }
        expr.push_str(&regex::escape(&pattern[last..]));
        expr.push_str(r"\z");

        let regex = Regex::new(&expr).map_err(|source| BuildError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
            names,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholder names in the order they appear
    pub fn placeholders(&self) -> &[String] {
        &self.names
    }

    /// Captured placeholder values when `state` matches the whole pattern
    pub fn matches(&self, state: &str) -> Option<Params> {
        let caps = self.regex.captures(state)?;
        Some(
            self.names
                .iter()
                .filter_map(|name| caps.name(name).map(|m| (name.as_str(), m.as_str())))
                .collect(),
        )
    }
}

/// Action matched for a state
#[derive(Clone)]
pub struct MatchedAction {
    pub pattern: String,
    pub params: Params,
    pub action: Arc<dyn Action>,
}

/// Compiled action bindings, tried in declaration order
#[derive(Clone)]
pub struct ActionMatcher {
    bindings: Vec<(StatePattern, Arc<dyn Action>)>,
}

impl ActionMatcher {
    pub fn compile(actions: &ActionSet) -> Result<Self, BuildError> {
        let mut bindings = Vec::with_capacity(actions.len());
        for (pattern, action) in &actions.bindings {
            bindings.push((StatePattern::compile(pattern)?, Arc::clone(action)));
        }

        Ok(Self { bindings })
    }

    /// First binding whose pattern matches `state`
    pub fn find_action(&self, state: &str) -> Option<MatchedAction> {
        self.bindings.iter().find_map(|(pattern, action)| {
            pattern.matches(state).map(|params| MatchedAction {
                pattern: pattern.as_str().to_string(),
                params,
                action: Arc::clone(action),
            })
        })
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl std::fmt::Debug for ActionMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.bindings.iter().map(|(p, _)| p.as_str()))
            .finish()
    }
}
