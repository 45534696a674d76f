//! Topology — a plain description of the graph ants run on.
//!
//! A `TopologySpec` is just data: nodes with their roles, and an ordered
//! list of directed edges. The runtime turns it into live edges and node
//! actors. Edge order matters: a node's outgoing edges are walked in the
//! order they appear here, which makes selection deterministic for a
//! given random draw.

use crate::error::{Result, TopologyError};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A node in a topology description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: NodeId,
    pub kind: NodeKind,
}

/// A directed edge in a topology description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub start: NodeId,
    pub end: NodeId,
}

impl EdgeSpec {
    pub fn new(start: impl Into<NodeId>, end: impl Into<NodeId>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Everything the runtime needs to build a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologySpec {
    /// Nodes, with ids running densely from zero in order.
    pub nodes: Vec<NodeSpec>,
    /// Directed edges in iteration order.
    pub edges: Vec<EdgeSpec>,
    /// Amount subtracted from every edge after each round.
    pub decay_factor: f64,
}

impl TopologySpec {
    /// Empty spec with the given decay factor.
    pub fn new(decay_factor: f64) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            decay_factor,
        }
    }

    /// Append a node. Ids are assigned densely in insertion order.
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(NodeSpec { id, kind });
        id
    }

    /// Append a directed edge.
    pub fn add_edge(&mut self, start: NodeId, end: NodeId) {
        self.edges.push(EdgeSpec { start, end });
    }

    /// Append a pair of opposing directed edges.
    pub fn connect(&mut self, a: NodeId, b: NodeId) {
        self.add_edge(a, b);
        self.add_edge(b, a);
    }

    /// The home node, if exactly one is present.
    pub fn home(&self) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|n| n.kind == NodeKind::Home)
            .map(|n| n.id)
    }

    /// The goal node, if present.
    pub fn goal(&self) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|n| n.kind == NodeKind::Goal)
            .map(|n| n.id)
    }

    /// Outgoing edges of a node, in iteration order.
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = &EdgeSpec> {
        self.edges.iter().filter(move |e| e.start == node)
    }

    /// Incoming edges of a node, in iteration order.
    pub fn in_edges(&self, node: NodeId) -> impl Iterator<Item = &EdgeSpec> {
        self.edges.iter().filter(move |e| e.end == node)
    }

    /// Check the description is something ants can run on.
    ///
    /// Rejects: empty graphs, sparse or duplicate ids, missing or doubled
    /// home/goal, home == goal, edges to unknown nodes, self loops,
    /// duplicate edges, non-goal nodes with no way out, and a home node
    /// nothing flows into (ants are released onto one of home's incoming
    /// edges).
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(TopologyError::EmptyGraph.into());
        }

        let mut home: Option<NodeId> = None;
        let mut goal: Option<NodeId> = None;
        for (idx, node) in self.nodes.iter().enumerate() {
            let expected = NodeId::new(idx as u32);
            if node.id != expected {
                if node.id.index() < idx {
                    return Err(TopologyError::DuplicateNode(node.id).into());
                }
                return Err(TopologyError::SparseIds {
                    expected,
                    found: node.id,
                }
                .into());
            }
            match node.kind {
                NodeKind::Home => {
                    if let Some(first) = home {
                        return Err(TopologyError::DuplicateHome(first, node.id).into());
                    }
                    home = Some(node.id);
                }
                NodeKind::Goal => {
                    if let Some(first) = goal {
                        return Err(TopologyError::DuplicateGoal(first, node.id).into());
                    }
                    goal = Some(node.id);
                }
                NodeKind::Path => {}
            }
        }
        let home = home.ok_or(TopologyError::MissingHome)?;
        let goal = goal.ok_or(TopologyError::MissingGoal)?;
        if home == goal {
            return Err(TopologyError::HomeIsGoal(home).into());
        }

        let node_count = self.nodes.len();
        let mut seen = HashSet::with_capacity(self.edges.len());
        let mut has_out = vec![false; node_count];
        let mut has_in = vec![false; node_count];
        for edge in &self.edges {
            for id in [edge.start, edge.end] {
                if id.index() >= node_count {
                    return Err(TopologyError::UnknownNode(id).into());
                }
            }
            if edge.start == edge.end {
                return Err(TopologyError::SelfLoop(edge.start).into());
            }
            if !seen.insert((edge.start, edge.end)) {
                return Err(TopologyError::DuplicateEdge(edge.start, edge.end).into());
            }
            has_out[edge.start.index()] = true;
            has_in[edge.end.index()] = true;
        }

        for node in &self.nodes {
            if node.kind != NodeKind::Goal && !has_out[node.id.index()] {
                return Err(TopologyError::DeadEnd(node.id).into());
            }
        }
        if !has_in[home.index()] {
            return Err(TopologyError::NoEntryEdge(home).into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeshError;

    fn line() -> TopologySpec {
        // 0 (home) <-> 1 <-> 2 (goal)
        let mut spec = TopologySpec::new(0.3);
        let a = spec.add_node(NodeKind::Home);
        let b = spec.add_node(NodeKind::Path);
        let c = spec.add_node(NodeKind::Goal);
        spec.connect(a, b);
        spec.connect(b, c);
        spec
    }

    fn topology_err(spec: &TopologySpec) -> TopologyError {
        match spec.validate() {
            Err(MeshError::Topology(e)) => e,
            other => panic!("expected topology error, got {:?}", other),
        }
    }

    #[test]
    fn valid_line_passes() {
        let spec = line();
        spec.validate().unwrap();
        assert_eq!(spec.home(), Some(NodeId::new(0)));
        assert_eq!(spec.goal(), Some(NodeId::new(2)));
        assert_eq!(spec.out_edges(NodeId::new(1)).count(), 2);
        assert_eq!(spec.in_edges(NodeId::new(0)).count(), 1);
    }

    #[test]
    fn empty_graph_rejected() {
        assert_eq!(topology_err(&TopologySpec::new(0.3)), TopologyError::EmptyGraph);
    }

    #[test]
    fn missing_roles_rejected() {
        let mut spec = TopologySpec::new(0.3);
        let a = spec.add_node(NodeKind::Path);
        let b = spec.add_node(NodeKind::Goal);
        spec.connect(a, b);
        assert_eq!(topology_err(&spec), TopologyError::MissingHome);

        let mut spec = TopologySpec::new(0.3);
        let a = spec.add_node(NodeKind::Home);
        let b = spec.add_node(NodeKind::Path);
        spec.connect(a, b);
        assert_eq!(topology_err(&spec), TopologyError::MissingGoal);
    }

    #[test]
    fn duplicate_goal_rejected() {
        let mut spec = line();
        spec.add_node(NodeKind::Goal);
        assert_eq!(
            topology_err(&spec),
            TopologyError::DuplicateGoal(NodeId::new(2), NodeId::new(3))
        );
    }

    #[test]
    fn dead_end_rejected() {
        let mut spec = line();
        let d = spec.add_node(NodeKind::Path);
        spec.add_edge(NodeId::new(1), d);
        assert_eq!(topology_err(&spec), TopologyError::DeadEnd(d));
    }

    #[test]
    fn goal_may_be_a_sink() {
        let mut spec = TopologySpec::new(0.3);
        let a = spec.add_node(NodeKind::Home);
        let b = spec.add_node(NodeKind::Path);
        let c = spec.add_node(NodeKind::Goal);
        spec.connect(a, b);
        spec.add_edge(b, c);
        spec.validate().unwrap();
    }

    #[test]
    fn bad_edges_rejected() {
        let mut spec = line();
        spec.add_edge(NodeId::new(0), NodeId::new(9));
        assert_eq!(topology_err(&spec), TopologyError::UnknownNode(NodeId::new(9)));

        let mut spec = line();
        spec.add_edge(NodeId::new(1), NodeId::new(1));
        assert_eq!(topology_err(&spec), TopologyError::SelfLoop(NodeId::new(1)));

        let mut spec = line();
        spec.add_edge(NodeId::new(0), NodeId::new(1));
        assert_eq!(
            topology_err(&spec),
            TopologyError::DuplicateEdge(NodeId::new(0), NodeId::new(1))
        );
    }

    #[test]
    fn home_without_entry_rejected() {
        let mut spec = TopologySpec::new(0.3);
        let a = spec.add_node(NodeKind::Home);
        let b = spec.add_node(NodeKind::Goal);
        spec.add_edge(a, b);
        assert_eq!(topology_err(&spec), TopologyError::NoEntryEdge(a));
    }

    #[test]
    fn sparse_ids_rejected() {
        let mut spec = line();
        spec.nodes[2].id = NodeId::new(5);
        assert!(matches!(topology_err(&spec), TopologyError::SparseIds { .. }));
    }
}
