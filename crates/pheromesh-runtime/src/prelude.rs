//! Pheromesh Runtime Prelude — convenient imports for common usage.
//!
//! ```rust
//! use pheromesh_runtime::prelude::*;
//! ```

pub use crate::ant::{
    pick_edge, Ant, AntFactory, CompletedTrail, RoundTicket, SimpleAnt, SimpleAntFactory,
    StepLimitedAnt, StepLimitedAntFactory, Step,
};
pub use crate::arbiter::{RandomArbiter, RandomHandle};
pub use crate::barrier::CountdownBarrier;
pub use crate::colony::{Colony, RoundReport, RunSummary};
pub use crate::config::ColonyConfig;
pub use crate::edge::{AntBox, Edge, Mailbox, PheromoneCell};
pub use crate::error::{RuntimeError, RuntimeResult};
pub use crate::export::{self, edge_report, pheromone_stats, EdgeReport, PheromoneStats};
pub use crate::graph::Graph;
pub use crate::node::{Mailboxes, Node, NodeWorkers};
