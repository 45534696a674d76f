//! Errors raised while the mesh is running.

use pheromesh_core::error::MeshError;
use pheromesh_core::types::{NodeId, Round};
use thiserror::Error;

/// Errors that can occur in runtime operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error("Randomness arbiter is no longer running")]
    ArbiterGone,

    #[error("Mailbox on edge {start} -> {end} is closed")]
    MailboxClosed { start: NodeId, end: NodeId },

    #[error("Node {0} has no outgoing edge to choose")]
    NoChoice(NodeId),

    #[error("Barrier timed out with {remaining} ants outstanding")]
    BarrierTimeout { remaining: usize },

    #[error("Round {round} did not close in time: {remaining} ants still travelling")]
    RoundTimeout { round: Round, remaining: usize },

    #[error("Colony stalled in round {0} and cannot run further rounds")]
    Stalled(Round),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
