//! Randomness arbiter.
//!
//! One task owns the random generator. Ants never touch it: each draw is a
//! request carrying a `oneshot` reply channel, sent over an `mpsc` queue
//! and served in arrival order. Many ants, one generator, no lock on it.

use crate::error::{RuntimeError, RuntimeResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{mpsc, oneshot};

/// Requests queued ahead of the arbiter before callers wait to enqueue.
const REQUEST_QUEUE: usize = 256;

/// Where draws come from.
enum Source {
    Rng(StdRng),
    /// Fixed values replayed in a cycle, for deterministic tests.
    Script { values: Vec<f64>, next: usize },
}

impl Source {
    fn draw(&mut self) -> f64 {
        match self {
            Source::Rng(rng) => rng.gen::<f64>(),
            Source::Script { values, next } => {
                let value = values[*next % values.len()];
                *next += 1;
                value
            }
        }
    }
}

/// Spawns the task that owns the generator.
pub struct RandomArbiter;

impl RandomArbiter {
    /// Start an arbiter and return a handle to it.
    ///
    /// With a seed the sequence of draws is reproducible; without one the
    /// generator is seeded from OS entropy. Must be called inside a tokio
    /// runtime. The task ends once every handle has been dropped.
    pub fn spawn(seed: Option<u64>) -> RandomHandle {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::spawn_source(Source::Rng(rng))
    }

    /// Start an arbiter that replays `values` in order, cycling.
    ///
    /// An empty script falls back to an entropy-seeded generator.
    pub fn scripted(values: Vec<f64>) -> RandomHandle {
        if values.is_empty() {
            return Self::spawn(None);
        }
        Self::spawn_source(Source::Script { values, next: 0 })
    }

    fn spawn_source(mut source: Source) -> RandomHandle {
        let (requests, mut rx) = mpsc::channel::<oneshot::Sender<f64>>(REQUEST_QUEUE);

        tokio::spawn(async move {
            let mut served: u64 = 0;
            while let Some(reply) = rx.recv().await {
                // A caller that gave up waiting is not an error.
                let _ = reply.send(source.draw());
                served += 1;
            }
            tracing::debug!(served, "randomness arbiter stopped");
        });

        RandomHandle { requests }
    }
}

/// Cloneable handle for requesting draws from the arbiter.
#[derive(Clone, Debug)]
pub struct RandomHandle {
    requests: mpsc::Sender<oneshot::Sender<f64>>,
}

impl RandomHandle {
    /// One uniform draw in `[0, 1)`.
    pub async fn draw(&self) -> RuntimeResult<f64> {
        let (tx, rx) = oneshot::channel();
        self.requests
            .send(tx)
            .await
            .map_err(|_| RuntimeError::ArbiterGone)?;
        rx.await.map_err(|_| RuntimeError::ArbiterGone)
    }
}
