//! Square grid generator.
//!
//! Lays nodes out row by row on a `dimension × dimension` grid and links
//! each one to every neighbour above, below, left, right and on the four
//! diagonals, in both directions. For a dimension of 3:
//!
//! ```text
//! 0 1 2
//! 3 4 5
//! 6 7 8
//! ```
//!
//! node 4 links to all eight others, corners link to three.

use crate::error::{MeshError, Result, TopologyError};
use crate::topology::TopologySpec;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Parameters for a square grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridOptions {
    /// Nodes on each side of the square.
    pub dimension: u32,
    /// Index of the home node.
    pub home: u32,
    /// Index of the goal node.
    pub goal: u32,
    /// Amount subtracted from every edge after each round.
    pub decay_factor: f64,
}

impl GridOptions {
    /// Grid with home in the top-left corner and goal in the bottom-right.
    ///
    /// A dimension too large for `u32` node ids is accepted here and
    /// rejected by [`square_grid`].
    pub fn new(dimension: u32) -> Self {
        Self {
            dimension,
            home: 0,
            goal: dimension.saturating_mul(dimension).saturating_sub(1),
            decay_factor: 0.3,
        }
    }

    pub fn with_home(mut self, home: u32) -> Self {
        self.home = home;
        self
    }

    pub fn with_goal(mut self, goal: u32) -> Self {
        self.goal = goal;
        self
    }

    pub fn with_decay(mut self, decay_factor: f64) -> Self {
        self.decay_factor = decay_factor;
        self
    }
}

/// Build a square grid topology.
pub fn square_grid(options: &GridOptions) -> Result<TopologySpec> {
    let dim = options.dimension;
    if dim < 2 {
        return Err(MeshError::invalid_config(
            "dimension",
            dim.to_string(),
            "a grid needs at least 2 nodes per side",
        ));
    }
    let count = dim.checked_mul(dim).ok_or_else(|| {
        MeshError::invalid_config(
            "dimension",
            dim.to_string(),
            "too many nodes for 32-bit node ids",
        )
    })?;
    for id in [options.home, options.goal] {
        if id >= count {
            return Err(TopologyError::UnknownNode(NodeId::new(id)).into());
        }
    }
    if options.home == options.goal {
        return Err(TopologyError::HomeIsGoal(NodeId::new(options.home)).into());
    }

    let mut spec = TopologySpec::new(options.decay_factor);
    for id in 0..count {
        let kind = if id == options.home {
            NodeKind::Home
        } else if id == options.goal {
            NodeKind::Goal
        } else {
            NodeKind::Path
        };
        spec.add_node(kind);
    }

    let dim = dim as i64;
    for row in 0..dim {
        for col in 0..dim {
            let from = NodeId::new((row * dim + col) as u32);
            for dr in -1..=1 {
                for dc in -1..=1 {
                    if dr == 0 && dc == 0 {
                        continue;
                    }
                    let (r, c) = (row + dr, col + dc);
                    if r < 0 || r >= dim || c < 0 || c >= dim {
                        continue;
                    }
                    spec.add_edge(from, NodeId::new((r * dim + c) as u32));
                }
            }
        }
    }

    Ok(spec)
}
