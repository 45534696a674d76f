//! Ants — the tokens that travel the mesh.
//!
//! Every ant strategy sits behind the [`Ant`] trait: given the node it has
//! just arrived at, pick exactly one way out, or report that it is done.
//! Node workers drive ants; they never inspect ant state themselves.

use crate::arbiter::RandomHandle;
use crate::barrier::CountdownBarrier;
use crate::edge::{AntBox, Edge};
use crate::error::{RuntimeError, RuntimeResult};
use crate::node::Node;
use async_trait::async_trait;
use pheromesh_core::types::*;
use std::sync::Arc;
use tokio::sync::mpsc;

/// What an ant decided at a node.
#[derive(Debug, Clone)]
pub enum Step {
    /// Move along this outgoing edge.
    Forward(Arc<Edge>),
    /// The node is the goal; the ant is done for this round.
    Arrived,
    /// The ant gives up for this round without reaching the goal.
    Withdrawn,
}

/// The record an ant hands back when it leaves a round.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedTrail {
    pub ant: AntId,
    pub trail: Vec<NodeId>,
    pub deposit: f64,
    pub outcome: Outcome,
}

/// What an ant carries to report back to the round that released it.
#[derive(Debug, Clone)]
pub struct RoundTicket {
    barrier: Arc<CountdownBarrier>,
    arrivals: mpsc::UnboundedSender<CompletedTrail>,
}

impl RoundTicket {
    pub fn new(
        barrier: Arc<CountdownBarrier>,
        arrivals: mpsc::UnboundedSender<CompletedTrail>,
    ) -> Self {
        Self { barrier, arrivals }
    }

    /// Hand in the trail, then count the barrier down.
    ///
    /// The trail is queued before the count drops, so once the barrier
    /// opens every trail of the round is already waiting to be read.
    pub fn complete(self, record: CompletedTrail) {
        if self.arrivals.send(record).is_err() {
            tracing::debug!("round no longer collecting trails");
        }
        self.barrier.arrive();
    }
}

/// A traversal strategy.
#[async_trait]
pub trait Ant: Send {
    fn id(&self) -> AntId;

    /// Node ids visited so far, in order.
    fn trail(&self) -> &[NodeId];

    /// Pheromone laid on each edge of the unlooped trail.
    fn deposit(&self) -> f64;

    /// Record arrival at `node` and choose exactly one next step.
    async fn choose_next(&mut self, node: &Node) -> RuntimeResult<Step>;

    /// Leave the round, reporting the trail and releasing the barrier once.
    fn record_completion(self: Box<Self>, outcome: Outcome);
}

/// Creates the ants released each round.
pub trait AntFactory: Send + Sync {
    fn spawn(&self, home: NodeId, ticket: RoundTicket) -> AntBox;
}

/// Picks edges in proportion to their pheromone, never turning straight
/// back unless there is no other way out.
pub struct SimpleAnt {
    id: AntId,
    /// Node visited before the current one.
    last_node: NodeId,
    trail: Vec<NodeId>,
    deposit: f64,
    random: RandomHandle,
    ticket: RoundTicket,
}

impl SimpleAnt {
    /// `last_node` is normally the home node itself, so nothing is
    /// excluded on the first decision.
    pub fn new(last_node: NodeId, deposit: f64, random: RandomHandle, ticket: RoundTicket) -> Self {
        Self {
            id: AntId::new(),
            last_node,
            trail: Vec::with_capacity(100),
            deposit,
            random,
            ticket,
        }
    }

    pub fn last_node(&self) -> NodeId {
        self.last_node
    }

    /// Total pheromone on `edges`, leaving out the edge back to the node
    /// this ant just came from.
    pub fn sum_pheromones(&self, edges: &[Arc<Edge>]) -> f64 {
        edges
            .iter()
            .filter(|e| e.end() != self.last_node)
            .map(|e| e.pheromone())
            .sum()
    }

    fn into_record(self, outcome: Outcome) -> (RoundTicket, CompletedTrail) {
        let record = CompletedTrail {
            ant: self.id,
            trail: self.trail,
            deposit: self.deposit,
            outcome,
        };
        (self.ticket, record)
    }
}

/// Walk `edges` in order, skipping the one leading to `exclude`, and return
/// the first whose cumulative share of `total` reaches `r`.
///
/// Falls back to the last edge when nothing qualifies: a zero total, a
/// rounding shortfall, or the excluded edge being the only one. Returns
/// `None` only for an empty slice.
pub fn pick_edge<'a>(
    edges: &'a [Arc<Edge>],
    exclude: NodeId,
    total: f64,
    r: f64,
) -> Option<&'a Arc<Edge>> {
    let mut pos = 0.0;
    for edge in edges {
        if edge.end() == exclude {
            continue;
        }
        pos += edge.pheromone();
        if r <= pos / total {
            return Some(edge);
        }
    }
    edges.last()
}

#[async_trait]
impl Ant for SimpleAnt {
    fn id(&self) -> AntId {
        self.id
    }

    fn trail(&self) -> &[NodeId] {
        &self.trail
    }

    fn deposit(&self) -> f64 {
        self.deposit
    }

    async fn choose_next(&mut self, node: &Node) -> RuntimeResult<Step> {
        self.trail.push(node.id());

        if node.is_goal() {
            return Ok(Step::Arrived);
        }

        let total = self.sum_pheromones(node.out_edges());
        let r = self.random.draw().await?;

        let edge = pick_edge(node.out_edges(), self.last_node, total, r)
            .ok_or(RuntimeError::NoChoice(node.id()))?;
        self.last_node = node.id();
        Ok(Step::Forward(Arc::clone(edge)))
    }

    fn record_completion(self: Box<Self>, outcome: Outcome) {
        let (ticket, record) = self.into_record(outcome);
        ticket.complete(record);
    }
}

/// A [`SimpleAnt`] that gives up after visiting `max_steps` nodes without
/// reaching the goal, so one lost ant cannot hold a round open forever.
pub struct StepLimitedAnt {
    inner: SimpleAnt,
    max_steps: usize,
}

impl StepLimitedAnt {
    pub fn new(inner: SimpleAnt, max_steps: usize) -> Self {
        Self { inner, max_steps }
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }
}

#[async_trait]
impl Ant for StepLimitedAnt {
    fn id(&self) -> AntId {
        self.inner.id
    }

    fn trail(&self) -> &[NodeId] {
        &self.inner.trail
    }

    fn deposit(&self) -> f64 {
        self.inner.deposit
    }

    async fn choose_next(&mut self, node: &Node) -> RuntimeResult<Step> {
        if !node.is_goal() && self.inner.trail.len() >= self.max_steps {
            self.inner.trail.push(node.id());
            return Ok(Step::Withdrawn);
        }
        self.inner.choose_next(node).await
    }

    fn record_completion(self: Box<Self>, outcome: Outcome) {
        let (ticket, record) = self.inner.into_record(outcome);
        ticket.complete(record);
    }
}

/// Releases [`SimpleAnt`]s.
#[derive(Debug, Clone)]
pub struct SimpleAntFactory {
    deposit: f64,
    random: RandomHandle,
}

impl SimpleAntFactory {
    pub fn new(deposit: f64, random: RandomHandle) -> Self {
        Self { deposit, random }
    }
}

impl AntFactory for SimpleAntFactory {
    fn spawn(&self, home: NodeId, ticket: RoundTicket) -> AntBox {
        Box::new(SimpleAnt::new(home, self.deposit, self.random.clone(), ticket))
    }
}

/// Releases [`StepLimitedAnt`]s.
#[derive(Debug, Clone)]
pub struct StepLimitedAntFactory {
    deposit: f64,
    random: RandomHandle,
    max_steps: usize,
}

impl StepLimitedAntFactory {
    pub fn new(deposit: f64, random: RandomHandle, max_steps: usize) -> Self {
        Self {
            deposit,
            random,
            max_steps,
        }
    }
}

impl AntFactory for StepLimitedAntFactory {
    fn spawn(&self, home: NodeId, ticket: RoundTicket) -> AntBox {
        let inner = SimpleAnt::new(home, self.deposit, self.random.clone(), ticket);
        Box::new(StepLimitedAnt::new(inner, self.max_steps))
    }
}
