//! The data-flow graph IR the resource utilization calculator borrows and
//! never mutates. A [`Graph`] owns its nodes in a fixed, already
//! topologically-sorted order (position in the node vector doubles as the
//! node's [`NodeId`]) plus the explicit edge list that connects them.

pub mod builder;

use std::collections::BTreeMap;

use crate::errors::{RucError, RucResult};
use crate::types::{AttrKey, BitSetting, NodeId, ReuseGroupId};

/// One admissible quantization configuration for a node: a bit-width/enabled
/// setting per weight attribute plus one for the node's activation.
#[derive(Debug, Clone)]
pub struct CandidateConfig {
    pub weights: BTreeMap<AttrKey, BitSetting>,
    pub activation: BitSetting,
}

/// A single weight tensor attached to a node (e.g. a conv kernel or bias).
#[derive(Debug, Clone)]
pub struct WeightAttr {
    pub key: AttrKey,
    pub element_count: u64,
    /// At least one candidate quantizes this attribute.
    pub is_quantization_enabled: bool,
    /// More than one distinct enabled candidate bit-width exists.
    pub is_configurable: bool,
    /// Marks the attribute as the node's convolution/dense kernel. At most
    /// one weight attribute per node may set this.
    pub is_kernel: bool,
}

/// A node in the quantized computation graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub op_type: String,
    /// Element count of the node's (single) output tensor.
    pub output_elements: u64,
    pub weight_attrs: Vec<WeightAttr>,
    pub candidates: Vec<CandidateConfig>,
    pub is_activation_quantization_enabled: bool,
    pub has_configurable_activation: bool,
    pub reuse: bool,
    pub reuse_group: Option<ReuseGroupId>,
}

impl Node {
    pub fn weight_attr(&self, key: &AttrKey) -> Option<&WeightAttr> {
        self.weight_attrs.iter().find(|w| &w.key == key)
    }

    pub fn kernel_weight_attr(&self) -> Option<&WeightAttr> {
        self.weight_attrs.iter().find(|w| w.is_kernel)
    }
}

/// A directed data-flow edge. `sink_port` is unique per `(sink, port)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub source: NodeId,
    pub source_port: usize,
    pub sink: NodeId,
    pub sink_port: usize,
}

/// An immutable, topologically-ordered data-flow graph.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Graph {
    pub(crate) fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> RucResult<&Node> {
        self.nodes.get(id.0).ok_or_else(|| {
            RucError::InvariantViolation(format!("{id} is not present in the graph"))
        })
    }

    /// The graph's nodes in topological (execution) order.
    pub fn topological_order(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Incoming edges of `node`, sorted by ascending sink-port index.
    pub fn incoming_edges(&self, node: NodeId) -> Vec<&Edge> {
        let mut edges: Vec<&Edge> = self.edges.iter().filter(|e| e.sink == node).collect();
        edges.sort_by_key(|e| e.sink_port);
        edges
    }

    /// Outgoing edges of `node`, in insertion order.
    pub fn outgoing_edges(&self, node: NodeId) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.source == node).collect()
    }

    pub fn weight_attrs(&self, node: NodeId) -> RucResult<&[WeightAttr]> {
        Ok(&self.node(node)?.weight_attrs)
    }

    pub fn is_activation_quantization_enabled(&self, node: NodeId) -> RucResult<bool> {
        Ok(self.node(node)?.is_activation_quantization_enabled)
    }

    pub fn has_configurable_activation(&self, node: NodeId) -> RucResult<bool> {
        Ok(self.node(node)?.has_configurable_activation)
    }

    pub fn is_weights_quantization_enabled(&self, node: NodeId, attr: &AttrKey) -> RucResult<bool> {
        Ok(self.weight_attr(node, attr)?.is_quantization_enabled)
    }

    pub fn is_configurable_weight(&self, node: NodeId, attr: &AttrKey) -> RucResult<bool> {
        Ok(self.weight_attr(node, attr)?.is_configurable)
    }

    pub fn has_kernel_weight_to_quantize(&self, node: NodeId) -> RucResult<bool> {
        Ok(self
            .node(node)?
            .kernel_weight_attr()
            .map(|w| w.is_quantization_enabled)
            .unwrap_or(false))
    }

    fn weight_attr(&self, node: NodeId, attr: &AttrKey) -> RucResult<&WeightAttr> {
        self.node(node)?.weight_attr(attr).ok_or_else(|| RucError::UnknownAttribute {
            node,
            attr: attr.clone(),
        })
    }

    /// Distinct enabled activation bit-widths among the node's candidates.
    pub fn get_unique_activation_candidates(&self, node: NodeId) -> RucResult<Vec<u8>> {
        let n = self.node(node)?;
        let mut bits: Vec<u8> = n
            .candidates
            .iter()
            .filter(|c| c.activation.enabled)
            .map(|c| c.activation.n_bits)
            .collect();
        bits.sort_unstable();
        bits.dedup();
        if bits.is_empty() {
            return Err(RucError::InvariantViolation(format!(
                "{node} has activation quantization enabled but no enabled candidate"
            )));
        }
        Ok(bits)
    }

    /// Distinct enabled bit-widths for `attr` among the node's candidates.
    pub fn get_unique_weights_candidates(&self, node: NodeId, attr: &AttrKey) -> RucResult<Vec<u8>> {
        // Validate the attribute exists before scanning candidates.
        self.weight_attr(node, attr)?;
        let n = self.node(node)?;
        let mut bits: Vec<u8> = n
            .candidates
            .iter()
            .filter_map(|c| c.weights.get(attr))
            .filter(|b| b.enabled)
            .map(|b| b.n_bits)
            .collect();
        bits.sort_unstable();
        bits.dedup();
        if bits.is_empty() {
            return Err(RucError::InvariantViolation(format!(
                "{node} attribute {attr} has quantization enabled but no enabled candidate"
            )));
        }
        Ok(bits)
    }
}
