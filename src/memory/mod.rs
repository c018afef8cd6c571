//! The Memory Graph Builder (§4.3): turns the data-flow graph into a
//! bipartite interference graph of operator-step vertices and tensor
//! vertices, from which the Max-Cut Engine sweeps for live sets.
//!
//! Each [`crate::graph::Node`] produces exactly one output tensor, so a
//! tensor vertex and its producing operator-step vertex share a `NodeId`.
//! Two synthetic vertices — `dummy_node` and `dummy_tensor` — anchor the
//! graph's entry and exit: `dummy_tensor` is the phantom input consumed by
//! any node with no real incoming edges, and `dummy_node` is the phantom
//! sink that consumes any tensor with no real outgoing edges. Both are
//! folded into the liveness computation below rather than modeled as
//! literal extra vertices, since their only observable effect is to give
//! every real tensor a producer-edge and a consumer-edge.

use crate::errors::RucResult;
use crate::graph::Graph;
use crate::types::NodeId;

/// The interval during which one node's output tensor is live: produced at
/// `producer_step` and last consumed at `last_consumer_step`. The exit
/// sentinel position (`graph.len()`) stands in for `dummy_node` when a
/// tensor has no real consumers, so it stays live through the end of
/// execution rather than being collected immediately.
#[derive(Debug, Clone, Copy)]
pub struct Liveness {
    pub node: NodeId,
    pub producer_step: usize,
    pub last_consumer_step: usize,
}

/// The memory interference graph: one liveness interval per node, indexed by
/// topological step.
#[derive(Debug, Clone)]
pub struct MemoryGraph {
    intervals: Vec<Liveness>,
    /// Exit sentinel step standing in for `dummy_node`.
    pub exit_step: usize,
}

impl MemoryGraph {
    pub fn build(graph: &Graph) -> RucResult<Self> {
        let n = graph.len();
        let exit_step = n;

        // None until a real consumer edge is seen; falls back to the
        // dummy_node exit sentinel for tensors with no real consumers.
        let mut last_consumer: Vec<Option<usize>> = vec![None; n];
        for edge in graph.edges() {
            let slot = &mut last_consumer[edge.source.0];
            *slot = Some(slot.map_or(edge.sink.0, |cur| cur.max(edge.sink.0)));
        }

        let intervals = graph
            .topological_order()
            .map(|node| Liveness {
                node,
                producer_step: node.0,
                last_consumer_step: last_consumer[node.0].unwrap_or(exit_step),
            })
            .collect();

        Ok(Self { intervals, exit_step })
    }

    pub fn intervals(&self) -> &[Liveness] {
        &self.intervals
    }
}
