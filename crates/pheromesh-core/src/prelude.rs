//! Pheromesh Core Prelude — convenient imports for common usage.
//!
//! ```rust
//! use pheromesh_core::prelude::*;
//! ```

// Re-export commonly used types
pub use crate::types::{
    AntId, NodeId, NodeKind,
    EdgeSnapshot, Outcome, Round,
    clamp_pheromone,
    PHEROMONE_FLOOR, DEFAULT_MAILBOX_CAPACITY,
};

// Re-export topology description and generators
pub use crate::topology::{EdgeSpec, NodeSpec, TopologySpec};
pub use crate::grid::{square_grid, GridOptions};

// Re-export trail algorithms
pub use crate::trail::{hops, unloop};

// Re-export error types
pub use crate::error::{ConfigError, MeshError, Result, TopologyError};
