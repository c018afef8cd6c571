//! The Target Selector: filters nodes / weight attributes by a
//! [`TargetInclusionCriterion`] (§4.2).

use crate::errors::RucResult;
use crate::graph::Graph;
use crate::types::{AttrKey, NodeId, TargetInclusionCriterion};

fn weight_matches(criterion: TargetInclusionCriterion, enabled: bool, configurable: bool) -> bool {
    match criterion {
        TargetInclusionCriterion::QConfigurable => configurable,
        TargetInclusionCriterion::AnyQuantized => enabled,
        TargetInclusionCriterion::QNonConfigurable => enabled && !configurable,
        TargetInclusionCriterion::Any => true,
    }
}

/// Selects the weight attributes of `node` matching `criterion`. Reused
/// nodes are skipped entirely unless `include_reused` is set, so weight
/// aggregation doesn't double-count shared parameters.
pub fn select_weight_attrs(
    graph: &Graph,
    node: NodeId,
    criterion: TargetInclusionCriterion,
    include_reused: bool,
) -> RucResult<Vec<AttrKey>> {
    let n = graph.node(node)?;
    if n.reuse && !include_reused {
        return Ok(Vec::new());
    }
    Ok(n.weight_attrs
        .iter()
        .filter(|w| weight_matches(criterion, w.is_quantization_enabled, w.is_configurable))
        .map(|w| w.key.clone())
        .collect())
}

/// Selects the nodes, in topological order, whose activation matches
/// `criterion`.
pub fn select_activation_nodes(
    graph: &Graph,
    criterion: TargetInclusionCriterion,
    include_reused: bool,
) -> RucResult<Vec<NodeId>> {
    let mut selected = Vec::new();
    for id in graph.topological_order() {
        let n = graph.node(id)?;
        if n.reuse && !include_reused {
            continue;
        }
        if weight_matches(criterion, n.is_activation_quantization_enabled, n.has_configurable_activation) {
            selected.push(id);
        }
    }
    Ok(selected)
}

/// Restricts `select_activation_nodes` to a specific set of candidate node
/// ids (e.g. the tensors alive on one cut), preserving their relative order.
pub fn select_activation_nodes_among(
    graph: &Graph,
    candidates: &[NodeId],
    criterion: TargetInclusionCriterion,
    include_reused: bool,
) -> RucResult<Vec<NodeId>> {
    let mut selected = Vec::new();
    for &id in candidates {
        let n = graph.node(id)?;
        if n.reuse && !include_reused {
            continue;
        }
        if weight_matches(criterion, n.is_activation_quantization_enabled, n.has_configurable_activation) {
            selected.push(id);
        }
    }
    Ok(selected)
}
