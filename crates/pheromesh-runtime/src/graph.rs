//! The running mesh: nodes, edges, and the pheromone operations the round
//! controller applies between rounds.

use crate::edge::Edge;
use crate::error::RuntimeResult;
use crate::node::{Mailboxes, Node, NodeWorkers};
use pheromesh_core::error::{MeshError, TopologyError};
use pheromesh_core::topology::TopologySpec;
use pheromesh_core::trail::hops;
use pheromesh_core::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Node/edge topology plus the `(start, end) -> edge` index.
///
/// Read-only after [`Graph::build`]; only pheromone levels change.
#[derive(Debug)]
pub struct Graph {
    nodes: Vec<Arc<Node>>,
    edges: Vec<Arc<Edge>>,
    edge_index: HashMap<(NodeId, NodeId), usize>,
    home: NodeId,
    goal: NodeId,
    decay_factor: f64,
}

impl Graph {
    /// Build the mesh described by `spec`, with mailboxes of `capacity`.
    ///
    /// Returns the receiving ends separately; hand them to [`Graph::start`].
    pub fn build(spec: &TopologySpec, capacity: usize) -> RuntimeResult<(Graph, Mailboxes)> {
        spec.validate()?;
        if capacity == 0 {
            return Err(MeshError::invalid_config(
                "mailbox_capacity",
                "0",
                "must hold at least one ant",
            )
            .into());
        }
        if !spec.decay_factor.is_finite() || spec.decay_factor < 0.0 {
            return Err(MeshError::invalid_config(
                "decay_factor",
                spec.decay_factor.to_string(),
                "must be a finite, non-negative amount",
            )
            .into());
        }

        let mut mailboxes = Mailboxes::new();
        let mut edges = Vec::with_capacity(spec.edges.len());
        let mut edge_index = HashMap::with_capacity(spec.edges.len());
        let mut out_edges: Vec<Vec<Arc<Edge>>> = vec![Vec::new(); spec.nodes.len()];
        let mut in_edges: Vec<Vec<Arc<Edge>>> = vec![Vec::new(); spec.nodes.len()];

        for es in &spec.edges {
            let (edge, mailbox) = Edge::new(es.start, es.end, capacity);
            let edge = Arc::new(edge);
            mailboxes.insert(es.start, es.end, mailbox);
            edge_index.insert((es.start, es.end), edges.len());
            out_edges[es.start.index()].push(Arc::clone(&edge));
            in_edges[es.end.index()].push(Arc::clone(&edge));
            edges.push(edge);
        }

        let nodes = spec
            .nodes
            .iter()
            .zip(in_edges.into_iter().zip(out_edges))
            .map(|(ns, (ins, outs))| Arc::new(Node::new(ns.id, ns.kind, ins, outs)))
            .collect();

        // validate() guarantees both exist.
        let home = spec
            .home()
            .ok_or_else(|| MeshError::from(TopologyError::MissingHome))?;
        let goal = spec
            .goal()
            .ok_or_else(|| MeshError::from(TopologyError::MissingGoal))?;

        debug!(
            nodes = spec.nodes.len(),
            edges = edges.len(),
            %home,
            %goal,
            "graph built"
        );

        let graph = Graph {
            nodes,
            edges,
            edge_index,
            home,
            goal,
            decay_factor: spec.decay_factor,
        };
        Ok((graph, mailboxes))
    }

    /// Launch every node's workers. Must be called inside a tokio runtime.
    pub fn start(self, mut mailboxes: Mailboxes) -> (Arc<Graph>, NodeWorkers) {
        let mut handles = Vec::with_capacity(self.edges.len());
        for node in &self.nodes {
            handles.extend(node.start(&mut mailboxes));
        }
        debug!(workers = handles.len(), "node workers started");
        (Arc::new(self), NodeWorkers::new(handles))
    }

    /// Reinforce every edge between consecutive nodes of `trail` by
    /// `deposit`. Pairs with no matching edge are skipped.
    ///
    /// Returns the number of edges reinforced.
    pub fn mark_path(&self, trail: &[NodeId], deposit: f64) -> usize {
        let mut marked = 0;
        for (start, end) in hops(trail) {
            match self.edge(start, end) {
                Some(edge) => {
                    edge.reinforce(deposit);
                    marked += 1;
                }
                None => warn!(%start, %end, "trail step has no edge, skipping"),
            }
        }
        marked
    }

    /// Decay every edge by the graph's decay factor.
    pub fn dissipate(&self) {
        for edge in &self.edges {
            edge.decay(self.decay_factor);
        }
    }

    pub fn edge(&self, start: NodeId, end: NodeId) -> Option<&Arc<Edge>> {
        self.edge_index.get(&(start, end)).map(|&i| &self.edges[i])
    }

    pub fn node(&self, id: NodeId) -> Option<&Arc<Node>> {
        self.nodes.get(id.index())
    }

    pub fn nodes(&self) -> &[Arc<Node>] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Arc<Edge>] {
        &self.edges
    }

    pub fn home(&self) -> NodeId {
        self.home
    }

    pub fn goal(&self) -> NodeId {
        self.goal
    }

    /// The edge new ants are released onto: home's first incoming edge.
    pub fn entry_edge(&self) -> Option<&Arc<Edge>> {
        self.node(self.home)
            .and_then(|home| home.in_edges().first())
    }

    pub fn decay_factor(&self) -> f64 {
        self.decay_factor
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Every edge's pheromone level, ordered by start then end.
    pub fn snapshot(&self) -> Vec<EdgeSnapshot> {
        let mut snaps: Vec<EdgeSnapshot> = self.edges.iter().map(|e| e.snapshot()).collect();
        snaps.sort_by_key(|s| (s.start, s.end));
        snaps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeError;
    use pheromesh_core::grid::{square_grid, GridOptions};
    use pheromesh_core::trail::unloop;

    fn grid(dimension: u32) -> Graph {
        let spec = square_grid(&GridOptions::new(dimension)).unwrap();
        Graph::build(&spec, DEFAULT_MAILBOX_CAPACITY).unwrap().0
    }

    fn ids(raw: &[u32]) -> Vec<NodeId> {
        raw.iter().copied().map(NodeId::new).collect()
    }

    #[test]
    fn build_indexes_every_edge() {
        let g = grid(3);
        assert_eq!(g.node_count(), 9);
        assert_eq!(g.edge_count(), 40);
        assert_eq!(g.home(), NodeId::new(0));
        assert_eq!(g.goal(), NodeId::new(8));
        assert!(g.edge(NodeId::new(0), NodeId::new(4)).is_some());
        assert!(g.edge(NodeId::new(0), NodeId::new(8)).is_none());
        assert_eq!(g.node(NodeId::new(4)).unwrap().out_edges().len(), 8);
        assert!(g.node(NodeId::new(9)).is_none());
    }

    #[test]
    fn entry_edge_leads_into_home() {
        let g = grid(3);
        let entry = g.entry_edge().unwrap();
        assert_eq!(entry.end(), g.home());
    }

    #[test]
    fn zero_capacity_rejected() {
        let spec = square_grid(&GridOptions::new(2)).unwrap();
        let err = Graph::build(&spec, 0).unwrap_err();
        assert!(matches!(err, RuntimeError::Mesh(MeshError::Config(_))));
    }

    #[test]
    fn invalid_topology_rejected() {
        let spec = TopologySpec::new(0.3);
        let err = Graph::build(&spec, 5).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::Mesh(MeshError::Topology(TopologyError::EmptyGraph))
        );
    }

    #[test]
    fn mark_path_touches_exactly_the_trail_edges() {
        let g = grid(3);
        let trail = unloop(&ids(&[0, 1, 4, 3, 4, 5, 8]));
        assert_eq!(trail, ids(&[0, 1, 4, 5, 8]));

        assert_eq!(g.mark_path(&trail, 1.0), 4);

        let marked = [(0, 1), (1, 4), (4, 5), (5, 8)];
        for snap in g.snapshot() {
            let pair = (snap.start.0, snap.end.0);
            let expected = if marked.contains(&pair) {
                PHEROMONE_FLOOR + 1.0
            } else {
                PHEROMONE_FLOOR
            };
            assert!(
                (snap.pheromone - expected).abs() < 1e-12,
                "edge {:?} at {}",
                pair,
                snap.pheromone
            );
        }
    }

    #[test]
    fn mark_path_skips_missing_pairs() {
        let g = grid(3);
        // 0 -> 8 is not an edge.
        assert_eq!(g.mark_path(&ids(&[0, 8, 5]), 2.0), 1);
        assert!(g.edge(NodeId::new(8), NodeId::new(5)).unwrap().pheromone() > 2.0);
    }

    #[test]
    fn dissipate_clamps_at_floor() {
        let g = grid(2);
        g.mark_path(&ids(&[0, 3]), 1.0);
        g.dissipate();
        let e = g.edge(NodeId::new(0), NodeId::new(3)).unwrap();
        assert!((e.pheromone() - 0.8).abs() < 1e-12);
        for _ in 0..10 {
            g.dissipate();
        }
        assert!(g.snapshot().iter().all(|s| s.pheromone == PHEROMONE_FLOOR));
    }

    #[test]
    fn snapshot_is_ordered() {
        let g = grid(3);
        let snaps = g.snapshot();
        assert!(snaps
            .windows(2)
            .all(|w| (w[0].start, w[0].end) < (w[1].start, w[1].end)));
    }
}
