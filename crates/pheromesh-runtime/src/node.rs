//! Node actors.
//!
//! A node owns its incoming and outgoing edges and runs one worker task per
//! incoming edge. A worker knows nothing about any particular ant: it pulls
//! the next arrival off its mailbox, lets the ant pick where to go, and
//! forwards it. All per-ant state travels with the ant.

use crate::ant::Step;
use crate::edge::{Edge, Mailbox};
use pheromesh_core::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{trace, warn};

/// A vertex in the running mesh. Immutable once built.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    in_edges: Vec<Arc<Edge>>,
    out_edges: Vec<Arc<Edge>>,
}

impl Node {
    pub fn new(
        id: NodeId,
        kind: NodeKind,
        in_edges: Vec<Arc<Edge>>,
        out_edges: Vec<Arc<Edge>>,
    ) -> Self {
        Self {
            id,
            kind,
            in_edges,
            out_edges,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_goal(&self) -> bool {
        self.kind == NodeKind::Goal
    }

    pub fn in_edges(&self) -> &[Arc<Edge>] {
        &self.in_edges
    }

    /// Outgoing edges in their fixed iteration order.
    pub fn out_edges(&self) -> &[Arc<Edge>] {
        &self.out_edges
    }

    /// Launch one worker per incoming edge.
    ///
    /// Each worker takes ownership of its edge's mailbox out of
    /// `mailboxes`. An incoming edge whose mailbox was already taken gets
    /// no worker.
    pub fn start(self: &Arc<Self>, mailboxes: &mut Mailboxes) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::with_capacity(self.in_edges.len());
        for edge in &self.in_edges {
            let Some(mailbox) = mailboxes.take(edge.start(), edge.end()) else {
                warn!(node = %self.id, from = %edge.start(), "no mailbox for incoming edge");
                continue;
            };
            let node = Arc::clone(self);
            let from = edge.start();
            handles.push(tokio::spawn(serve_edge(node, from, mailbox)));
        }
        handles
    }
}

/// Worker loop for one incoming edge.
///
/// Runs until the mailbox closes, i.e. for as long as the graph lives.
async fn serve_edge(node: Arc<Node>, from: NodeId, mut mailbox: Mailbox) {
    while let Some(mut ant) = mailbox.recv().await {
        match ant.choose_next(&node).await {
            Ok(Step::Forward(edge)) => {
                trace!(ant = %ant.id(), from = %node.id, to = %edge.end(), "forward");
                if let Err(e) = edge.send(ant).await {
                    // The ant was withdrawn by `send`; the mesh is tearing down.
                    warn!(node = %node.id, error = %e, "stopping worker");
                    return;
                }
            }
            Ok(Step::Arrived) => {
                trace!(ant = %ant.id(), node = %node.id, "arrived");
                ant.record_completion(Outcome::Arrived);
            }
            Ok(Step::Withdrawn) => {
                warn!(ant = %ant.id(), node = %node.id, steps = ant.trail().len(), "ant withdrawn");
                ant.record_completion(Outcome::Withdrawn);
            }
            Err(e) => {
                warn!(ant = %ant.id(), node = %node.id, error = %e, "ant could not move, withdrawing");
                ant.record_completion(Outcome::Withdrawn);
            }
        }
    }
    trace!(node = %node.id, from = %from, "mailbox closed");
}

/// Receiving ends of every edge mailbox, keyed by `(start, end)`.
#[derive(Debug, Default)]
pub struct Mailboxes {
    by_edge: HashMap<(NodeId, NodeId), Mailbox>,
}

impl Mailboxes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, start: NodeId, end: NodeId, mailbox: Mailbox) {
        self.by_edge.insert((start, end), mailbox);
    }

    pub fn take(&mut self, start: NodeId, end: NodeId) -> Option<Mailbox> {
        self.by_edge.remove(&(start, end))
    }

    pub fn len(&self) -> usize {
        self.by_edge.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_edge.is_empty()
    }
}

/// Join handles for every node worker in a graph.
///
/// Workers never finish on their own while the graph is alive, so dropping
/// this set aborts them.
#[derive(Debug, Default)]
pub struct NodeWorkers {
    handles: Vec<JoinHandle<()>>,
}

impl NodeWorkers {
    pub fn new(handles: Vec<JoinHandle<()>>) -> Self {
        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Abort every worker and wait for them to wind down.
    pub async fn shutdown(mut self) {
        let handles = std::mem::take(&mut self.handles);
        for handle in &handles {
            handle.abort();
        }
        // Aborted tasks resolve to a cancellation error; that is the point.
        let _ = futures::future::join_all(handles).await;
    }
}

impl Drop for NodeWorkers {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ant::{RoundTicket, SimpleAnt};
    use crate::arbiter::RandomArbiter;
    use crate::barrier::CountdownBarrier;
    use crate::edge::AntBox;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn worker_withdraws_ant_when_next_mailbox_is_gone() {
        // 0 -> 1 -> 2, where 1 -> 2 has lost its receiver.
        let (inbound, inbound_rx) = Edge::new(NodeId::new(0), NodeId::new(1), 1);
        let (outbound, outbound_rx) = Edge::new(NodeId::new(1), NodeId::new(2), 1);
        drop(outbound_rx);
        let inbound = Arc::new(inbound);
        let node = Arc::new(Node::new(
            NodeId::new(1),
            NodeKind::Path,
            vec![Arc::clone(&inbound)],
            vec![Arc::new(outbound)],
        ));
        let mut boxes = Mailboxes::new();
        boxes.insert(NodeId::new(0), NodeId::new(1), inbound_rx);
        let workers = NodeWorkers::new(node.start(&mut boxes));

        let barrier = Arc::new(CountdownBarrier::new(1));
        let (tx, mut arrivals) = mpsc::unbounded_channel();
        let ticket = RoundTicket::new(Arc::clone(&barrier), tx);
        let ant: AntBox = Box::new(SimpleAnt::new(
            NodeId::new(0),
            1.0,
            RandomArbiter::spawn(Some(2)),
            ticket,
        ));
        inbound.send(ant).await.unwrap();

        barrier
            .wait_timeout(std::time::Duration::from_secs(1))
            .await
            .unwrap();
        let record = arrivals.recv().await.unwrap();
        assert_eq!(record.outcome, Outcome::Withdrawn);
        assert_eq!(record.trail, vec![NodeId::new(1)]);
        workers.shutdown().await;
    }

    #[test]
    fn mailboxes_hand_out_each_receiver_once() {
        let (_edge, rx) = Edge::new(NodeId::new(0), NodeId::new(1), 1);
        let mut boxes = Mailboxes::new();
        boxes.insert(NodeId::new(0), NodeId::new(1), rx);
        assert_eq!(boxes.len(), 1);
        assert!(boxes.take(NodeId::new(0), NodeId::new(1)).is_some());
        assert!(boxes.take(NodeId::new(0), NodeId::new(1)).is_none());
        assert!(boxes.is_empty());
    }

    #[test]
    fn node_accessors() {
        let (a, _) = Edge::new(NodeId::new(1), NodeId::new(0), 1);
        let (b, _) = Edge::new(NodeId::new(0), NodeId::new(1), 1);
        let node = Node::new(
            NodeId::new(0),
            NodeKind::Home,
            vec![Arc::new(a)],
            vec![Arc::new(b)],
        );
        assert_eq!(node.id(), NodeId::new(0));
        assert_eq!(node.kind(), NodeKind::Home);
        assert!(!node.is_goal());
        assert_eq!(node.in_edges()[0].start(), NodeId::new(1));
        assert_eq!(node.out_edges()[0].end(), NodeId::new(1));
    }
}
