//! Colony — the round controller.
//!
//! The colony owns a running graph and drives it one round at a time.
//!
//! Each round:
//! 1. A fresh countdown barrier is preset to the number of ants
//! 2. Ants are released onto home's entry edge
//! 3. The colony waits for every ant to arrive or be withdrawn
//! 4. Arrived trails are unlooped and reinforced
//! 5. Every edge decays
//!
//! Rounds never overlap: no ant is in flight while pheromone is written.

use crate::ant::{AntFactory, CompletedTrail, RoundTicket, SimpleAntFactory, StepLimitedAntFactory};
use crate::arbiter::RandomArbiter;
use crate::barrier::CountdownBarrier;
use crate::config::ColonyConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::graph::Graph;
use crate::node::NodeWorkers;
use pheromesh_core::error::{MeshError, TopologyError};
use pheromesh_core::topology::TopologySpec;
use pheromesh_core::trail::unloop;
use pheromesh_core::types::*;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// What happened in one round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundReport {
    /// Round number, starting at 1.
    pub round: Round,
    pub released: usize,
    pub arrived: usize,
    pub withdrawn: usize,
    /// Mean raw trail length (nodes visited) of arrived ants.
    pub mean_trail_len: f64,
    /// Mean unlooped trail length of arrived ants.
    pub mean_unlooped_len: f64,
    /// Shortest unlooped trail of the round, if any ant arrived.
    pub shortest_unlooped: Option<Vec<NodeId>>,
}

/// Reports for every round of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub reports: Vec<RoundReport>,
}

impl RunSummary {
    pub fn rounds(&self) -> usize {
        self.reports.len()
    }

    pub fn total_arrived(&self) -> usize {
        self.reports.iter().map(|r| r.arrived).sum()
    }

    pub fn total_withdrawn(&self) -> usize {
        self.reports.iter().map(|r| r.withdrawn).sum()
    }

    /// Shortest unlooped trail seen in any round. Earlier rounds win ties.
    pub fn shortest_unlooped(&self) -> Option<&[NodeId]> {
        self.reports
            .iter()
            .filter_map(|r| r.shortest_unlooped.as_deref())
            .fold(None, |best: Option<&[NodeId]>, path| match best {
                Some(b) if b.len() <= path.len() => Some(b),
                _ => Some(path),
            })
    }

    pub fn last(&self) -> Option<&RoundReport> {
        self.reports.last()
    }
}

/// The colony — runs rounds of ants over a graph.
pub struct Colony {
    graph: Arc<Graph>,
    workers: NodeWorkers,
    factory: Arc<dyn AntFactory>,
    config: ColonyConfig,
    /// Rounds completed so far.
    round: Round,
    /// Round that timed out, if any. Its ants may still be travelling.
    stalled: Option<Round>,
}

impl Colony {
    /// Build the graph, start its workers and a randomness arbiter.
    ///
    /// Ants are [`SimpleAnt`](crate::ant::SimpleAnt)s, step-limited when
    /// `config.max_steps` is set. Must be called inside a tokio runtime.
    pub fn new(spec: &TopologySpec, config: ColonyConfig) -> RuntimeResult<Self> {
        config.validate()?;
        let random = RandomArbiter::spawn(config.seed);
        let factory: Arc<dyn AntFactory> = match config.max_steps {
            Some(max_steps) => Arc::new(StepLimitedAntFactory::new(
                config.deposit,
                random,
                max_steps,
            )),
            None => Arc::new(SimpleAntFactory::new(config.deposit, random)),
        };
        Self::with_factory(spec, config, factory)
    }

    /// Like [`Colony::new`] but releasing ants from a custom factory.
    pub fn with_factory(
        spec: &TopologySpec,
        config: ColonyConfig,
        factory: Arc<dyn AntFactory>,
    ) -> RuntimeResult<Self> {
        config.validate()?;
        let (graph, mailboxes) = Graph::build(spec, config.mailbox_capacity)?;
        let (graph, workers) = graph.start(mailboxes);
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            ants = config.ant_count,
            seed = ?config.seed,
            "colony started"
        );
        Ok(Self {
            graph,
            workers,
            factory,
            config,
            round: 0,
            stalled: None,
        })
    }

    /// Run one full round.
    ///
    /// # Errors
    ///
    /// `RoundTimeout` if the round budget runs out first; the colony is then
    /// stalled and every later call returns `Stalled`.
    pub async fn run_round(&mut self) -> RuntimeResult<RoundReport> {
        if let Some(round) = self.stalled {
            return Err(RuntimeError::Stalled(round));
        }
        let round = self.round + 1;
        let released = self.config.ant_count;
        let home = self.graph.home();
        let entry = self
            .graph
            .entry_edge()
            .cloned()
            .ok_or_else(|| MeshError::from(TopologyError::NoEntryEdge(home)))?;
        let deadline = self.config.round_timeout().map(|t| Instant::now() + t);

        let barrier = Arc::new(CountdownBarrier::new(released));
        let (arrivals, mut trails) = mpsc::unbounded_channel();

        let release = async {
            for _ in 0..released {
                let ticket = RoundTicket::new(Arc::clone(&barrier), arrivals.clone());
                entry.send(self.factory.spawn(home, ticket)).await?;
            }
            Ok::<_, RuntimeError>(())
        };
        let released_ok = match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, release).await.ok(),
            None => Some(release.await),
        };
        match released_ok {
            Some(result) => result?,
            None => return Err(self.stall(round, barrier.remaining())),
        }
        drop(arrivals);

        let closed = match deadline {
            Some(deadline) => barrier.wait_until(deadline).await,
            None => {
                barrier.wait().await;
                Ok(())
            }
        };
        if let Err(e) = closed {
            return Err(match e {
                RuntimeError::BarrierTimeout { remaining } => self.stall(round, remaining),
                other => other,
            });
        }

        // Every trail was queued before the barrier opened.
        let mut completed = Vec::with_capacity(released);
        while let Ok(record) = trails.try_recv() {
            completed.push(record);
        }
        let report = self.apply(round, released, &completed);
        self.graph.dissipate();
        self.round = round;

        debug!(
            round,
            arrived = report.arrived,
            withdrawn = report.withdrawn,
            mean_unlooped_len = report.mean_unlooped_len,
            "round complete"
        );
        Ok(report)
    }

    /// Reinforce arrived trails and summarise the round.
    fn apply(&self, round: Round, released: usize, completed: &[CompletedTrail]) -> RoundReport {
        let mut arrived = 0;
        let mut withdrawn = 0;
        let mut trail_total = 0;
        let mut unlooped_total = 0;
        let mut shortest: Option<Vec<NodeId>> = None;

        for record in completed {
            match record.outcome {
                Outcome::Arrived => {
                    let path = unloop(&record.trail);
                    self.graph.mark_path(&path, record.deposit);
                    arrived += 1;
                    trail_total += record.trail.len();
                    unlooped_total += path.len();
                    if shortest.as_ref().map_or(true, |s| path.len() < s.len()) {
                        shortest = Some(path);
                    }
                }
                Outcome::Withdrawn => withdrawn += 1,
            }
        }

        let mean = |total: usize| {
            if arrived == 0 {
                0.0
            } else {
                total as f64 / arrived as f64
            }
        };
        RoundReport {
            round,
            released,
            arrived,
            withdrawn,
            mean_trail_len: mean(trail_total),
            mean_unlooped_len: mean(unlooped_total),
            shortest_unlooped: shortest,
        }
    }

    fn stall(&mut self, round: Round, remaining: usize) -> RuntimeError {
        warn!(round, remaining, "round timed out, colony stalled");
        self.stalled = Some(round);
        RuntimeError::RoundTimeout { round, remaining }
    }

    /// Run `iterations` rounds.
    pub async fn run(&mut self, iterations: u64) -> RuntimeResult<RunSummary> {
        self.run_with_callback(iterations, |_| true).await
    }

    /// Run up to `iterations` rounds, calling `callback` after each.
    ///
    /// Stops early when the callback returns `false`.
    pub async fn run_with_callback<F>(
        &mut self,
        iterations: u64,
        mut callback: F,
    ) -> RuntimeResult<RunSummary>
    where
        F: FnMut(&RoundReport) -> bool,
    {
        info!(iterations, from_round = self.round + 1, "run started");
        let mut summary = RunSummary::default();
        for _ in 0..iterations {
            let report = self.run_round().await?;
            let keep_going = callback(&report);
            summary.reports.push(report);
            if !keep_going {
                break;
            }
        }
        info!(
            rounds = summary.rounds(),
            arrived = summary.total_arrived(),
            withdrawn = summary.total_withdrawn(),
            "run finished"
        );
        Ok(summary)
    }

    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    pub fn config(&self) -> &ColonyConfig {
        &self.config
    }

    /// Rounds completed so far.
    pub fn round(&self) -> Round {
        self.round
    }

    pub fn is_stalled(&self) -> bool {
        self.stalled.is_some()
    }

    /// Every edge's pheromone level, ordered by start then end.
    pub fn snapshot(&self) -> Vec<EdgeSnapshot> {
        self.graph.snapshot()
    }

    /// Stop every node worker.
    pub async fn shutdown(self) {
        self.workers.shutdown().await;
        debug!("colony shut down");
    }
}
