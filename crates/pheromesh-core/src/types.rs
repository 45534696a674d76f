//! Shared types used across all Pheromesh crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lowest pheromone level any edge may hold.
///
/// Keeps selection probabilities well defined: an edge can never be
/// starved to zero weight.
pub const PHEROMONE_FLOOR: f64 = 0.1;

/// Default number of ants an edge mailbox holds before senders wait.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 5;

/// Identifier for a node in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// Position of this node in a dense node vector.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Unique identifier for an ant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AntId(pub Uuid);

impl AntId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Deterministic id, for tests.
    pub fn from_seed(seed: u64) -> Self {
        Self(Uuid::from_u128(seed as u128))
    }
}

impl Default for AntId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AntId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role a node plays in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Where every ant starts. Exactly one per graph.
    Home,
    /// Where every ant is trying to get to. Exactly one per graph.
    Goal,
    /// Any other node.
    Path,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Home => write!(f, "HOME"),
            NodeKind::Goal => write!(f, "GOAL"),
            NodeKind::Path => write!(f, "PATH"),
        }
    }
}

/// How an ant left a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Reached the goal node; its trail is applied to the graph.
    Arrived,
    /// Retired by a step ceiling before reaching the goal; nothing is applied.
    Withdrawn,
}

/// Read-only view of one edge after (or between) rounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub start: NodeId,
    pub end: NodeId,
    pub pheromone: f64,
}

/// Clamp a pheromone level to the floor.
///
/// NaN collapses to the floor as well, so a corrupted reading can never
/// leak into selection weights.
pub fn clamp_pheromone(level: f64) -> f64 {
    if level.is_nan() || level < PHEROMONE_FLOOR {
        PHEROMONE_FLOOR
    } else {
        level
    }
}

/// The current round of the simulation.
pub type Round = u64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_keeps_values_above_floor() {
        assert_eq!(clamp_pheromone(3.5), 3.5);
        assert_eq!(clamp_pheromone(PHEROMONE_FLOOR), PHEROMONE_FLOOR);
    }

    #[test]
    fn clamp_lifts_low_and_nan_values() {
        assert_eq!(clamp_pheromone(-4.0), PHEROMONE_FLOOR);
        assert_eq!(clamp_pheromone(0.0), PHEROMONE_FLOOR);
        assert_eq!(clamp_pheromone(f64::NAN), PHEROMONE_FLOOR);
    }

    #[test]
    fn seeded_ant_ids_are_stable() {
        assert_eq!(AntId::from_seed(7), AntId::from_seed(7));
        assert_ne!(AntId::from_seed(7), AntId::from_seed(8));
        assert_ne!(AntId::new(), AntId::new());
    }

    #[test]
    fn node_kind_display() {
        assert_eq!(NodeKind::Home.to_string(), "HOME");
        assert_eq!(NodeKind::Goal.to_string(), "GOAL");
        assert_eq!(NodeId::new(12).to_string(), "12");
    }
}
