use crate::error::OutcomeError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

type Result<T> = std::result::Result<T, OutcomeError>;

fn invalid(message: String) -> OutcomeError {
    OutcomeError::Validation(message)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagNode {
    pub id: String,
}

impl DagNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// `from` must complete before `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagEdge {
    pub from: String,
    pub to: String,
}

impl DagEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Dependency graph over action ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagContract {
    pub nodes: Vec<DagNode>,
    pub edges: Vec<DagEdge>,
}

impl DagContract {
    pub fn new(nodes: Vec<DagNode>, edges: Vec<DagEdge>) -> Self {
        Self { nodes, edges }
    }

    pub fn validate(&self) -> Result<()> {
        let node_ids = self.validate_nodes()?;
        let adjacency = self.validate_edges(&node_ids)?;
        validate_cycle_free(&node_ids, &adjacency)
    }

    /// Node ids with every edge pointing forward.
    ///
    /// Among nodes that are ready at the same time, the one declared first
    /// comes first.
    pub fn topological_sort(&self) -> Result<Vec<String>> {
        self.validate()?;

        let position: HashMap<&str, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.as_str(), i))
            .collect();

        let mut in_degree = vec![0_usize; self.nodes.len()];
        let mut successors = vec![Vec::new(); self.nodes.len()];
        for edge in &self.edges {
            if let (Some(&from), Some(&to)) =
                (position.get(edge.from.as_str()), position.get(edge.to.as_str()))
            {
                in_degree[to] += 1;
                successors[from].push(to);
            }
        }

        let mut ready: BTreeSet<usize> = in_degree
            .iter()
            .enumerate()
            .filter_map(|(i, degree)| (*degree == 0).then_some(i))
            .collect();

        let mut sorted = Vec::with_capacity(self.nodes.len());
        while let Some(index) = ready.pop_first() {
            sorted.push(self.nodes[index].id.clone());
            for &next in &successors[index] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.insert(next);
                }
            }
        }

        if sorted.len() != self.nodes.len() {
            return Err(invalid("cycle detected while sorting DAG".into()));
        }

        Ok(sorted)
    }

    fn validate_nodes(&self) -> Result<BTreeSet<String>> {
        let mut node_ids = BTreeSet::new();

        for node in &self.nodes {
            if node.id.trim().is_empty() {
                return Err(invalid("node id cannot be empty".into()));
            }

            if !node_ids.insert(node.id.clone()) {
                return Err(invalid(format!("duplicate node id: {}", node.id)));
            }
        }

        Ok(node_ids)
    }

    fn validate_edges(&self, node_ids: &BTreeSet<String>) -> Result<BTreeMap<String, Vec<String>>> {
        let mut adjacency: BTreeMap<String, Vec<String>> = node_ids
            .iter()
            .map(|id| (id.clone(), Vec::new()))
            .collect();
        let mut seen_edges = BTreeSet::new();

        for edge in &self.edges {
            if !node_ids.contains(&edge.from) || !node_ids.contains(&edge.to) {
                let known = node_ids.iter().cloned().collect::<Vec<_>>().join(", ");
                return Err(invalid(format!(
                    "edge references unknown node: {} -> {} (known nodes: [{known}])",
                    edge.from, edge.to
                )));
            }

            if !seen_edges.insert((edge.from.as_str(), edge.to.as_str())) {
                return Err(invalid(format!(
                    "duplicate edge: {} -> {}",
                    edge.from, edge.to
                )));
            }

            adjacency
                .entry(edge.from.clone())
                .or_default()
                .push(edge.to.clone());
        }

        Ok(adjacency)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Visiting,
    Visited,
}

fn validate_cycle_free(
    node_ids: &BTreeSet<String>,
    adjacency: &BTreeMap<String, Vec<String>>,
) -> Result<()> {
    let mut states = BTreeMap::new();
    let mut stack = Vec::new();

    for node_id in node_ids {
        if states.contains_key(node_id.as_str()) {
            continue;
        }

        if let Some(path) = detect_cycle(node_id, adjacency, &mut states, &mut stack) {
            return Err(invalid(format!("cycle detected: {}", path.join(" -> "))));
        }
    }

    Ok(())
}

/// Depth-first walk; returns the offending path when a back edge is found.
fn detect_cycle<'a>(
    node_id: &'a str,
    adjacency: &'a BTreeMap<String, Vec<String>>,
    states: &mut BTreeMap<&'a str, NodeState>,
    stack: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    states.insert(node_id, NodeState::Visiting);
    stack.push(node_id);

    for neighbor in adjacency.get(node_id).into_iter().flatten() {
        match states.get(neighbor.as_str()) {
            Some(NodeState::Visiting) => {
                let start = stack.iter().position(|entry| entry == neighbor)?;
                let mut cycle: Vec<String> = stack[start..].iter().map(ToString::to_string).collect();
                cycle.push(neighbor.clone());
                return Some(cycle);
            }
            Some(NodeState::Visited) => {}
            None => {
                if let Some(path) = detect_cycle(neighbor, adjacency, states, stack) {
                    return Some(path);
                }
            }
        }
    }

    stack.pop();
    states.insert(node_id, NodeState::Visited);
    None
}
