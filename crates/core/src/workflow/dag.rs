use crate::config::TopologyPolicy;
use crate::error::BuildError;
use crate::types::{Edge, EdgeStatement};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use petgraph::Direction;
use std::collections::HashMap;

/// Graph of states connected by signal-labeled edges, with its resolved
/// entry and exit states
#[derive(Debug, Clone)]
pub struct WorkflowGraph {
    graph: DiGraph<String, String>,
    state_indices: HashMap<String, NodeIndex>,
    edges: Vec<Edge>,
    entry: NodeIndex,
    exit: NodeIndex,
}

impl WorkflowGraph {
    /// Build a graph from parsed edge statements
    pub fn from_statements(
        statements: &[EdgeStatement],
        policy: TopologyPolicy,
    ) -> Result<Self, BuildError> {
        let mut edges = Vec::new();

        for stmt in statements {
            if stmt.nodes.len() < 2 {
                return Err(BuildError::MalformedGraph(format!(
                    "edge statement needs at least two endpoints, got {:?}",
                    stmt.nodes
                )));
            }

            let signal = stmt.label();
            for pair in stmt.nodes.windows(2) {
                edges.push(Edge::labeled(&pair[0], &pair[1], signal));
            }
        }

        Self::from_edges(edges, policy)
    }

    /// Build a graph from an edge list
    pub fn from_edges(edges: Vec<Edge>, policy: TopologyPolicy) -> Result<Self, BuildError> {
        if edges.is_empty() {
            return Err(BuildError::MalformedGraph("graph has no edges".to_string()));
        }

        let mut graph = DiGraph::new();
        let mut state_indices = HashMap::new();

        // States are indexed in order of first appearance
        for edge in &edges {
            let source = Self::intern(&mut graph, &mut state_indices, &edge.source);
            let target = Self::intern(&mut graph, &mut state_indices, &edge.target);
            graph.add_edge(source, target, edge.signal.clone());
        }

        let entry_candidates = Self::states_without(&graph, Direction::Incoming);
        let exit_candidates = Self::states_without(&graph, Direction::Outgoing);

        let entry = Self::pick(&graph, &entry_candidates, policy, "entry", "incoming")?;
        let exit = Self::pick(&graph, &exit_candidates, policy, "exit", "outgoing")?;

        Ok(Self {
            graph,
            state_indices,
            edges,
            entry,
            exit,
        })
    }

    fn intern(
        graph: &mut DiGraph<String, String>,
        indices: &mut HashMap<String, NodeIndex>,
        state: &str,
    ) -> NodeIndex {
        *indices
            .entry(state.to_string())
            .or_insert_with(|| graph.add_node(state.to_string()))
    }

    fn states_without(graph: &DiGraph<String, String>, direction: Direction) -> Vec<NodeIndex> {
        graph
            .node_indices()
            .filter(|&n| graph.neighbors_directed(n, direction).next().is_none())
            .collect()
    }

    fn pick(
        graph: &DiGraph<String, String>,
        candidates: &[NodeIndex],
        policy: TopologyPolicy,
        role: &str,
        direction: &str,
    ) -> Result<NodeIndex, BuildError> {
        match (candidates, policy) {
            ([], _) => Err(BuildError::MalformedGraph(format!(
                "no {} state: every state has {} edges",
                role, direction
            ))),
            ([only], _) => Ok(*only),
            ([first, ..], TopologyPolicy::FirstCandidate) => Ok(*first),
            (_, TopologyPolicy::Strict) => {
                let names: Vec<&str> = candidates.iter().map(|&n| graph[n].as_str()).collect();
                Err(BuildError::MalformedGraph(format!(
                    "multiple {} states: {}",
                    role,
                    names.join(", ")
                )))
            }
        }
    }

    /// Entry state (no incoming edges)
    pub fn entry(&self) -> &str {
        &self.graph[self.entry]
    }

    /// Exit state (no outgoing edges)
    pub fn exit(&self) -> &str {
        &self.graph[self.exit]
    }

    /// All states, in order of first appearance
    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.graph.node_indices().map(|n| self.graph[n].as_str())
    }

    pub fn state_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn contains_state(&self, state: &str) -> bool {
        self.state_indices.contains_key(state)
    }

    /// Edges in declaration order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Targets reachable from `state` when it produced `signal`, in edge declaration order
    pub fn next_states(&self, state: &str, signal: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.source == state && e.signal == signal)
            .map(|e| e.target.as_str())
            .collect()
    }

    /// States that no path from the entry state reaches
    pub fn unreachable_states(&self) -> Vec<&str> {
        let mut reached = vec![false; self.graph.node_count()];
        let mut dfs = Dfs::new(&self.graph, self.entry);
        while let Some(node) = dfs.next(&self.graph) {
            reached[node.index()] = true;
        }

        self.graph
            .node_indices()
            .filter(|n| !reached[n.index()])
            .map(|n| self.graph[n].as_str())
            .collect()
    }
}
