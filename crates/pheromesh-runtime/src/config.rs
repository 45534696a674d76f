//! Run configuration for a colony.

use pheromesh_core::error::{MeshError, Result};
use pheromesh_core::types::DEFAULT_MAILBOX_CAPACITY;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable parameters for a colony run.
///
/// Graph shape and decay live in the topology; everything about how ants
/// are released and rounds are paced lives here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyConfig {
    /// Ants released per round (default: 20).
    pub ant_count: usize,
    /// Pheromone each arriving ant lays on every edge of its trail (default: 1.0).
    pub deposit: f64,
    /// Rounds to run (default: 500).
    pub iterations: u64,
    /// Ants an edge mailbox holds before senders wait (default: 5).
    pub mailbox_capacity: usize,
    /// Withdraw an ant after visiting this many nodes (default: unlimited).
    pub max_steps: Option<usize>,
    /// Give up on a round after this many milliseconds (default: wait forever).
    pub round_timeout_ms: Option<u64>,
    /// Seed for the randomness arbiter (default: OS entropy).
    pub seed: Option<u64>,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            ant_count: 20,
            deposit: 1.0,
            iterations: 500,
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            max_steps: None,
            round_timeout_ms: None,
            seed: None,
        }
    }
}

impl ColonyConfig {
    pub fn with_ant_count(mut self, ant_count: usize) -> Self {
        self.ant_count = ant_count;
        self
    }

    pub fn with_deposit(mut self, deposit: f64) -> Self {
        self.deposit = deposit;
        self
    }

    pub fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn with_round_timeout(mut self, timeout: Duration) -> Self {
        self.round_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn round_timeout(&self) -> Option<Duration> {
        self.round_timeout_ms.map(Duration::from_millis)
    }

    /// Reject values a run cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.ant_count == 0 {
            return Err(MeshError::invalid_config(
                "ant_count",
                "0",
                "at least one ant per round",
            ));
        }
        if !self.deposit.is_finite() || self.deposit < 0.0 {
            return Err(MeshError::invalid_config(
                "deposit",
                self.deposit.to_string(),
                "must be a finite, non-negative amount",
            ));
        }
        if self.mailbox_capacity == 0 {
            return Err(MeshError::invalid_config(
                "mailbox_capacity",
                "0",
                "must hold at least one ant",
            ));
        }
        if self.max_steps == Some(0) {
            return Err(MeshError::invalid_config(
                "max_steps",
                "0",
                "ants need at least one step",
            ));
        }
        if self.round_timeout_ms == Some(0) {
            return Err(MeshError::invalid_config(
                "round_timeout_ms",
                "0",
                "leave unset to wait forever",
            ));
        }
        Ok(())
    }
}
