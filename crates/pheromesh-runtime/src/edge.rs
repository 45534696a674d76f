//! Pheromone-bearing edges.
//!
//! An edge is two things kept side by side: a numeric pheromone cell that
//! node workers read while ants decide and the colony writes between
//! rounds, and a bounded mailbox carrying ants from `start` to `end`.
//! The two never share a lock.

use crate::ant::Ant;
use crate::error::{RuntimeError, RuntimeResult};
use pheromesh_core::types::*;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

/// Ants in transit.
pub type AntBox = Box<dyn Ant>;

/// Receiving end of an edge mailbox, owned by the worker at `end`.
pub type Mailbox = mpsc::Receiver<AntBox>;

/// Lock-free pheromone level, never below [`PHEROMONE_FLOOR`].
///
/// The `f64` is stored as raw bits in an `AtomicU64` and updated with a
/// compare-and-swap loop, so concurrent reinforcements all land.
#[derive(Debug)]
pub struct PheromoneCell {
    bits: AtomicU64,
}

impl PheromoneCell {
    pub fn new(level: f64) -> Self {
        Self {
            bits: AtomicU64::new(clamp_pheromone(level).to_bits()),
        }
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Add `delta` (may be negative) and clamp to the floor.
    /// Non-finite deltas are ignored. Returns the new level.
    pub fn adjust(&self, delta: f64) -> f64 {
        if !delta.is_finite() {
            return self.get();
        }
        let step = |bits: u64| clamp_pheromone(f64::from_bits(bits) + delta);
        let prev = match self
            .bits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                Some(step(bits).to_bits())
            }) {
            Ok(bits) | Err(bits) => bits,
        };
        step(prev)
    }
}

impl Default for PheromoneCell {
    fn default() -> Self {
        Self::new(PHEROMONE_FLOOR)
    }
}

/// A directed connection between two nodes.
#[derive(Debug)]
pub struct Edge {
    start: NodeId,
    end: NodeId,
    pheromone: PheromoneCell,
    mailbox: mpsc::Sender<AntBox>,
}

impl Edge {
    /// Create an edge at the pheromone floor, with a mailbox holding at
    /// most `capacity` ants. Returns the receiving end separately: it
    /// belongs to whichever worker serves this edge.
    ///
    /// `capacity` must be non-zero.
    pub fn new(start: NodeId, end: NodeId, capacity: usize) -> (Self, Mailbox) {
        let (tx, rx) = mpsc::channel(capacity);
        let edge = Self {
            start,
            end,
            pheromone: PheromoneCell::default(),
            mailbox: tx,
        };
        (edge, rx)
    }

    pub fn start(&self) -> NodeId {
        self.start
    }

    pub fn end(&self) -> NodeId {
        self.end
    }

    pub fn pheromone(&self) -> f64 {
        self.pheromone.get()
    }

    /// Add pheromone. Returns the new level.
    pub fn reinforce(&self, amount: f64) -> f64 {
        self.pheromone.adjust(amount)
    }

    /// Remove pheromone, stopping at the floor. Returns the new level.
    pub fn decay(&self, amount: f64) -> f64 {
        self.pheromone.adjust(-amount)
    }

    /// Push an ant toward `end`, waiting while the mailbox is full.
    ///
    /// If the mailbox has closed, the ant is withdrawn from its round
    /// before the error is returned, so its barrier slot is still counted.
    pub async fn send(&self, ant: AntBox) -> RuntimeResult<()> {
        match self.mailbox.send(ant).await {
            Ok(()) => Ok(()),
            Err(mpsc::error::SendError(ant)) => {
                ant.record_completion(Outcome::Withdrawn);
                Err(RuntimeError::MailboxClosed {
                    start: self.start,
                    end: self.end,
                })
            }
        }
    }

    /// Number of ants that could be pushed right now without waiting.
    pub fn free_slots(&self) -> usize {
        self.mailbox.capacity()
    }

    pub fn snapshot(&self) -> EdgeSnapshot {
        EdgeSnapshot {
            start: self.start,
            end: self.end,
            pheromone: self.pheromone(),
        }
    }
}
