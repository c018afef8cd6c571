//! The Max-Cut Engine (§4.4): sweeps the memory graph's topological steps
//! and, at each one, records the set of tensors simultaneously alive.

use tracing::debug;

use crate::errors::{RucError, RucResult};
use crate::graph::Graph;
use crate::memory::MemoryGraph;
use crate::types::NodeId;

/// One moment of execution: the tensors alive immediately after the step's
/// node has produced its output and before any of them has been released.
#[derive(Debug, Clone)]
pub struct Cut {
    /// Topological step this cut was taken at (for diagnostics only; not
    /// part of its identity).
    pub step: usize,
    /// Tensors alive at this cut, in ascending `NodeId` order.
    pub live: Vec<NodeId>,
}

/// Enumerates every non-empty cut of `graph`'s memory graph, in a
/// deterministic order: ascending step index, with each cut's live set
/// sorted by ascending `NodeId` (§9, open question on cut ordering).
///
/// A tensor is live at `step` once its producer has run and until its last
/// consumer has run — `producer_step <= step < last_consumer_step`. The
/// upper bound is exclusive: once the step that reads a tensor has executed,
/// that tensor has been consumed and is no longer simultaneously live with
/// whatever the consuming step produced, so a tensor never double-counts
/// against its own consumer's output (§9, open question on the live-set
/// boundary).
#[tracing::instrument(skip(graph), name = "maxcut_compute")]
pub fn compute_cuts(graph: &Graph) -> RucResult<Vec<Cut>> {
    if graph.is_empty() {
        return Ok(Vec::new());
    }

    let mem = MemoryGraph::build(graph)?;
    let intervals = mem.intervals();

    let mut cuts = Vec::new();
    for step in 0..=mem.exit_step {
        let mut live: Vec<NodeId> = intervals
            .iter()
            .filter(|iv| iv.producer_step <= step && iv.last_consumer_step > step)
            .map(|iv| iv.node)
            .collect();
        if live.is_empty() {
            continue;
        }
        live.sort_unstable();
        cuts.push(Cut { step, live });
    }

    if cuts.is_empty() {
        return Err(RucError::CutComputationFailed);
    }

    debug!(cut_count = cuts.len(), "max-cut enumeration complete");
    Ok(cuts)
}
