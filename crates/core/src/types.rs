use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Unique identifier for a workflow run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of the most recent workflow run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    NotStarted,
    Running,
    Finished,
    Failed,
}

/// Attribute attached to a parsed edge statement (`[label=foo]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: String,
    pub eq: String,
}

impl Attribute {
    pub fn new(id: impl Into<String>, eq: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            eq: eq.into(),
        }
    }
}

/// Edge statement as produced by an external graph parser.
///
/// `nodes` holds the endpoints in order; a chain `a -> b -> c` carries three
/// endpoints and expands into one edge per consecutive pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeStatement {
    pub nodes: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl EdgeStatement {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            nodes: vec![from.into(), to.into()],
            attributes: Vec::new(),
        }
    }

    /// Statement covering a chain of endpoints
    pub fn chain<I, S>(nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            nodes: nodes.into_iter().map(Into::into).collect(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, id: impl Into<String>, eq: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(id, eq));
        self
    }

    pub fn with_label(self, label: impl Into<String>) -> Self {
        self.with_attribute("label", label)
    }

    /// Signal carried by this statement: the first `label` attribute, or empty
    pub fn label(&self) -> &str {
        self.attributes
            .iter()
            .find(|a| a.id == "label")
            .map(|a| a.eq.as_str())
            .unwrap_or("")
    }
}

/// A single transition between two states, taken when the source state
/// produced `signal` (empty means unconditional)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub signal: String,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            signal: String::new(),
        }
    }

    pub fn labeled(
        source: impl Into<String>,
        target: impl Into<String>,
        signal: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            signal: signal.into(),
        }
    }
}

/// Placeholder values captured from a state name by an action pattern
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_defaults_to_empty() {
        let stmt = EdgeStatement::new("a", "b");
        assert_eq!(stmt.label(), "");

        let stmt = EdgeStatement::new("a", "b").with_attribute("color", "red");
        assert_eq!(stmt.label(), "");
    }

    #[test]
    fn test_first_label_wins() {
        let stmt = EdgeStatement::new("a", "b")
            .with_attribute("color", "red")
            .with_label("yes")
            .with_label("no");
        assert_eq!(stmt.label(), "yes");
    }

    #[test]
    fn test_edge_statement_deserializes_without_attributes() {
        let stmt: EdgeStatement = serde_json::from_str(r#"{"nodes": ["start", "end"]}"#).unwrap();
        assert_eq!(stmt, EdgeStatement::new("start", "end"));
    }

    #[test]
    fn test_params_lookup() {
        let params: Params = [("message", "Hello")].into_iter().collect();
        assert_eq!(params.get("message"), Some("Hello"));
        assert_eq!(params.get("missing"), None);
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_run_status_serialization() {
        let json = serde_json::to_string(&RunStatus::NotStarted).unwrap();
        assert_eq!(json, "\"not_started\"");
    }
}
