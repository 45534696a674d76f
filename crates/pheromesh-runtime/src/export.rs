//! Pheromone exporters — edge reports, JSON and Graphviz DOT.
//!
//! Exports the graph's edges with their pheromone levels, strongest first,
//! plus summary statistics over the whole graph.

use crate::error::RuntimeResult;
use crate::graph::Graph;
use petgraph::dot::{Config, Dot};
use petgraph::graph::DiGraph;
use petgraph::visit::EdgeRef;
use pheromesh_core::error::MeshError;
use pheromesh_core::types::*;
use serde::Serialize;
use std::fmt;

/// Statistics over a set of edge pheromone levels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PheromoneStats {
    pub edges: usize,
    pub total: f64,
    pub mean: f64,
    pub median: f64,
    pub max: f64,
    pub min: f64,
}

/// Every edge, strongest first, with statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeReport {
    pub stats: PheromoneStats,
    pub edges: Vec<EdgeSnapshot>,
}

/// Compute pheromone statistics.
pub fn pheromone_stats(snapshots: &[EdgeSnapshot]) -> PheromoneStats {
    if snapshots.is_empty() {
        return PheromoneStats {
            edges: 0,
            total: 0.0,
            mean: 0.0,
            median: 0.0,
            max: 0.0,
            min: 0.0,
        };
    }

    let levels: Vec<f64> = snapshots.iter().map(|s| s.pheromone).collect();
    let edges = levels.len();
    let total = levels.iter().sum::<f64>();
    let max = levels.iter().cloned().fold(0.0f64, f64::max);
    let min = levels.iter().cloned().fold(f64::MAX, f64::min);

    let mut sorted = levels;
    sorted.sort_by(|a, b| a.total_cmp(b));
    let median = sorted[sorted.len() / 2];

    PheromoneStats {
        edges,
        total,
        mean: total / edges as f64,
        median,
        max,
        min,
    }
}

/// Build a report from an edge snapshot.
pub fn edge_report(snapshots: &[EdgeSnapshot]) -> EdgeReport {
    let mut edges = snapshots.to_vec();
    // Strongest first; ties keep start/end order.
    edges.sort_by(|a, b| {
        b.pheromone
            .total_cmp(&a.pheromone)
            .then_with(|| (a.start, a.end).cmp(&(b.start, b.end)))
    });
    EdgeReport {
        stats: pheromone_stats(snapshots),
        edges,
    }
}

/// The edge report as pretty-printed JSON.
pub fn to_json(graph: &Graph) -> RuntimeResult<String> {
    let report = edge_report(&graph.snapshot());
    serde_json::to_string_pretty(&report).map_err(|e| MeshError::from(e).into())
}

/// Node weight for DOT rendering.
#[derive(Debug, Clone, Copy)]
struct DotNode {
    id: NodeId,
    kind: NodeKind,
}

impl fmt::Display for DotNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

fn node_attrs(node: &DotNode) -> String {
    match node.kind {
        NodeKind::Home => format!("color=\"#8B0000\" label=\"{}: HOME\"", node.id),
        NodeKind::Goal => format!("color=\"#008000\" label=\"{}: GOAL\"", node.id),
        NodeKind::Path => format!("color=\"#D3D3D3\" label=\"{}\"", node.id),
    }
}

/// Edge colour alpha: proportional to pheromone relative to `max`, never
/// below 10 so untravelled edges still show.
fn edge_alpha(pheromone: f64, max: f64) -> u8 {
    if max <= 0.0 || !pheromone.is_finite() {
        return 10;
    }
    let scaled = (pheromone / max * 245.0).clamp(0.0, 245.0) as u8;
    scaled + 10
}

/// Render the graph as Graphviz DOT, darker edges carrying more pheromone.
pub fn to_dot(graph: &Graph) -> String {
    let mut dg: DiGraph<DotNode, f64> =
        DiGraph::with_capacity(graph.node_count(), graph.edge_count());
    let indices: Vec<_> = graph
        .nodes()
        .iter()
        .map(|n| {
            dg.add_node(DotNode {
                id: n.id(),
                kind: n.kind(),
            })
        })
        .collect();

    let mut max = 0.0f64;
    for edge in graph.edges() {
        let level = edge.pheromone();
        max = max.max(level);
        dg.add_edge(indices[edge.start().index()], indices[edge.end().index()], level);
    }

    let edge_getter = |_: &DiGraph<DotNode, f64>, e: petgraph::graph::EdgeReference<'_, f64>| {
        format!(
            "penwidth=3.0 arrowhead=open color=\"#104E8B{:02X}\"",
            edge_alpha(*e.weight(), max)
        )
    };
    let node_getter = |_: &DiGraph<DotNode, f64>, (_, n): (petgraph::graph::NodeIndex, &DotNode)| {
        node_attrs(n)
    };

    format!(
        "{}",
        Dot::with_attr_getters(
            &dg,
            &[Config::EdgeNoLabel, Config::NodeNoLabel],
            &edge_getter,
            &node_getter,
        )
    )
}
