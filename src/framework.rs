//! The boundary to the framework-implementation collaborator (§6): the
//! piece of the surrounding toolkit that knows how to count MAC operations
//! for a node and which weight attribute of an op-type is its kernel. The
//! resource utilization calculator treats this purely as a trait object —
//! no reflection on concrete op types, per the tagged-op-kind redesign note.

use crate::graph::Graph;
use crate::types::{AttrKey, NodeId};

/// Implemented by the surrounding toolkit (op-type registry, frontend
/// importer) to supply the numeric facts the RUC cannot derive from the
/// graph IR alone.
pub trait FrameworkOps: std::fmt::Debug {
    /// Number of multiply-accumulate operations `node` performs. Nodes with
    /// no MACs (e.g. reshape, activation) return zero.
    fn get_node_mac_operations(&self, graph: &Graph, node: NodeId) -> u64;

    /// The weight attribute names that represent `op_type`'s kernel. BOPS
    /// computation rejects op-types that report more than one.
    fn get_kernel_op_attributes(&self, op_type: &str) -> Vec<AttrKey>;
}
