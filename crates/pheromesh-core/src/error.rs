//! Error types for Pheromesh operations.
//!
//! Topology problems are caught when a graph is described, long before
//! any ant is released into it.

use crate::types::NodeId;
use std::error::Error;
use std::fmt;

/// Result type for Pheromesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while describing or configuring a colony.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshError {
    /// Graph-shape errors.
    Topology(TopologyError),
    /// Configuration errors.
    Config(ConfigError),
    /// Serialization errors.
    Serialization(String),
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::Topology(e) => write!(f, "Topology error: {}", e),
            MeshError::Config(e) => write!(f, "Config error: {}", e),
            MeshError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl Error for MeshError {}

impl From<serde_json::Error> for MeshError {
    fn from(e: serde_json::Error) -> Self {
        MeshError::Serialization(e.to_string())
    }
}

impl From<TopologyError> for MeshError {
    fn from(e: TopologyError) -> Self {
        MeshError::Topology(e)
    }
}

impl From<ConfigError> for MeshError {
    fn from(e: ConfigError) -> Self {
        MeshError::Config(e)
    }
}

/// Graph-shape errors.
#[derive(Debug, Clone, PartialEq)]
pub enum TopologyError {
    /// Graph has no nodes.
    EmptyGraph,
    /// No node is marked as home.
    MissingHome,
    /// No node is marked as goal.
    MissingGoal,
    /// More than one node is marked as home.
    DuplicateHome(NodeId, NodeId),
    /// More than one node is marked as goal.
    DuplicateGoal(NodeId, NodeId),
    /// Home and goal are the same node.
    HomeIsGoal(NodeId),
    /// Two nodes share an id.
    DuplicateNode(NodeId),
    /// Node ids must run densely from zero.
    SparseIds { expected: NodeId, found: NodeId },
    /// An edge or role refers to a node that does not exist.
    UnknownNode(NodeId),
    /// The same directed edge is listed twice.
    DuplicateEdge(NodeId, NodeId),
    /// An edge starts and ends at the same node.
    SelfLoop(NodeId),
    /// A non-goal node has no way out; ants would be stranded there.
    DeadEnd(NodeId),
    /// Home has no incoming edge to release ants onto.
    NoEntryEdge(NodeId),
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyError::EmptyGraph => write!(f, "Graph is empty"),
            TopologyError::MissingHome => write!(f, "No home node"),
            TopologyError::MissingGoal => write!(f, "No goal node"),
            TopologyError::DuplicateHome(a, b) => {
                write!(f, "Two home nodes: {} and {}", a, b)
            }
            TopologyError::DuplicateGoal(a, b) => {
                write!(f, "Two goal nodes: {} and {}", a, b)
            }
            TopologyError::HomeIsGoal(id) => write!(f, "Node {} is both home and goal", id),
            TopologyError::DuplicateNode(id) => write!(f, "Duplicate node: {}", id),
            TopologyError::SparseIds { expected, found } => {
                write!(f, "Node ids must be dense: expected {}, found {}", expected, found)
            }
            TopologyError::UnknownNode(id) => write!(f, "Unknown node: {}", id),
            TopologyError::DuplicateEdge(from, to) => {
                write!(f, "Duplicate edge: {} -> {}", from, to)
            }
            TopologyError::SelfLoop(id) => write!(f, "Self loop on node {}", id),
            TopologyError::DeadEnd(id) => write!(f, "Node {} has no outgoing edges", id),
            TopologyError::NoEntryEdge(id) => {
                write!(f, "Home node {} has no incoming edge to release ants on", id)
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Invalid value.
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue {
                field,
                value,
                reason,
            } => {
                write!(f, "Invalid value for {}: {} ({})", field, value, reason)
            }
        }
    }
}

// Convenience constructors
impl MeshError {
    pub fn invalid_config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        MeshError::Config(ConfigError::InvalidValue {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_node_ids() {
        let e = MeshError::from(TopologyError::DeadEnd(NodeId::new(4)));
        assert_eq!(e.to_string(), "Topology error: Node 4 has no outgoing edges");
    }

    #[test]
    fn config_display() {
        let e = MeshError::invalid_config("decay_factor", "-1", "must not be negative");
        assert_eq!(
            e.to_string(),
            "Config error: Invalid value for decay_factor: -1 (must not be negative)"
        );
    }
}
