//! A small DSL for assembling [`Graph`] values, in the spirit of the
//! computation-graph builders used elsewhere in this codebase: callers
//! describe nodes and edges imperatively and get back stable [`NodeId`]s.

use std::collections::BTreeMap;

use super::{CandidateConfig, Edge, Graph, Node, WeightAttr};
use crate::errors::{RucError, RucResult};
use crate::types::{AttrKey, NodeId, ReuseGroupId};

/// Declarative spec for one weight attribute, passed to [`GraphBuilder::add_node`].
#[derive(Debug, Clone)]
pub struct WeightAttrSpec {
    pub key: AttrKey,
    pub element_count: u64,
    pub is_kernel: bool,
}

impl WeightAttrSpec {
    pub fn new(key: AttrKey, element_count: u64) -> Self {
        Self { key, element_count, is_kernel: false }
    }

    pub fn kernel(key: AttrKey, element_count: u64) -> Self {
        Self { key, element_count, is_kernel: true }
    }
}

/// Incrementally builds a [`Graph`], deriving each node's `is_configurable`
/// / `is_quantization_enabled` flags from its candidate set so callers never
/// have to keep the two in sync by hand.
#[derive(Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node with the given weight attributes and candidate set.
    /// `candidates` must be non-empty; every weight attribute must appear
    /// in every candidate's `weights` map.
    pub fn add_node(
        &mut self,
        op_type: impl Into<String>,
        output_elements: u64,
        weight_attr_specs: Vec<WeightAttrSpec>,
        candidates: Vec<CandidateConfig>,
    ) -> RucResult<NodeId> {
        let id = NodeId(self.nodes.len());

        if candidates.is_empty() {
            return Err(RucError::InvariantViolation(format!(
                "{id} was built with an empty candidate set"
            )));
        }

        let kernel_count = weight_attr_specs.iter().filter(|s| s.is_kernel).count();
        if kernel_count > 1 {
            return Err(RucError::InvariantViolation(format!(
                "{id} declares {kernel_count} kernel weight attributes, at most one is allowed"
            )));
        }

        let mut weight_attrs = Vec::with_capacity(weight_attr_specs.len());
        for spec in weight_attr_specs {
            for c in &candidates {
                if !c.weights.contains_key(&spec.key) {
                    return Err(RucError::InvariantViolation(format!(
                        "{id} candidate is missing a setting for attribute {}",
                        spec.key
                    )));
                }
            }

            let mut enabled_bits: Vec<u8> = candidates
                .iter()
                .filter_map(|c| c.weights.get(&spec.key))
                .filter(|b| b.enabled)
                .map(|b| b.n_bits)
                .collect();
            enabled_bits.sort_unstable();
            enabled_bits.dedup();

            let is_quantization_enabled = !enabled_bits.is_empty();
            let is_configurable = enabled_bits.len() > 1;

            weight_attrs.push(WeightAttr {
                key: spec.key,
                element_count: spec.element_count,
                is_quantization_enabled,
                is_configurable,
                is_kernel: spec.is_kernel,
            });
        }

        let mut activation_bits: Vec<u8> = candidates
            .iter()
            .filter(|c| c.activation.enabled)
            .map(|c| c.activation.n_bits)
            .collect();
        activation_bits.sort_unstable();
        activation_bits.dedup();

        let node = Node {
            id,
            op_type: op_type.into(),
            output_elements,
            weight_attrs,
            candidates,
            is_activation_quantization_enabled: !activation_bits.is_empty(),
            has_configurable_activation: activation_bits.len() > 1,
            reuse: false,
            reuse_group: None,
        };
        self.nodes.push(node);
        Ok(id)
    }

    /// Marks `node` as sharing parameters with `group`; reused nodes are
    /// excluded from weight aggregation by default (§4.2).
    pub fn mark_reused(&mut self, node: NodeId, group: ReuseGroupId) -> RucResult<()> {
        let n = self.nodes.get_mut(node.0).ok_or_else(|| {
            RucError::InvariantViolation(format!("{node} is not present in the graph"))
        })?;
        n.reuse = true;
        n.reuse_group = Some(group);
        Ok(())
    }

    /// Connects `source`'s `source_port`-th output to `sink`'s `sink_port`-th
    /// input.
    pub fn add_edge(&mut self, source: NodeId, source_port: usize, sink: NodeId, sink_port: usize) -> RucResult<()> {
        if source.0 >= self.nodes.len() || sink.0 >= self.nodes.len() {
            return Err(RucError::InvariantViolation(
                "edge references a node outside the graph".to_string(),
            ));
        }
        if self.edges.iter().any(|e| e.sink == sink && e.sink_port == sink_port) {
            return Err(RucError::InvariantViolation(format!(
                "sink port {sink_port} of {sink} is already connected"
            )));
        }
        self.edges.push(Edge { source, source_port, sink, sink_port });
        Ok(())
    }

    /// Convenience for the common case of a single-output producer feeding a
    /// single positional input.
    pub fn connect(&mut self, source: NodeId, sink: NodeId, sink_port: usize) -> RucResult<()> {
        self.add_edge(source, 0, sink, sink_port)
    }

    pub fn build(self) -> Graph {
        Graph::new(self.nodes, self.edges)
    }
}

/// Builds a single candidate whose weight attributes all share `n_bits` /
/// `enabled`, convenient for tests that don't exercise mixed precision.
pub fn uniform_candidate(weights: &[(AttrKey, u8)], activation_bits: u8) -> CandidateConfig {
    let mut map = BTreeMap::new();
    for (key, bits) in weights {
        map.insert(key.clone(), crate::types::BitSetting::new(*bits, true));
    }
    CandidateConfig {
        weights: map,
        activation: crate::types::BitSetting::new(activation_bits, true),
    }
}
