//! The Utilization Aggregator (§4.5): the single public entry point,
//! [`Ruc::compute`], that validates a request, resolves bit-widths through
//! the config resolver, selects targets, sweeps the Max-Cut Engine's cuts,
//! and folds everything into a [`ResourceUtilization`] record.

use std::cell::{Ref, RefCell};
use std::collections::HashSet;

use tracing::instrument;

use crate::config::{
    effective_activation_nbits, effective_weight_nbits, validate_custom_weight_config,
    CustomActivationConfig, CustomWeightConfig,
};
use crate::errors::{RucError, RucResult};
use crate::framework::FrameworkOps;
use crate::graph::Graph;
use crate::maxcut::{compute_cuts, Cut};
use crate::target::{select_activation_nodes_among, select_weight_attrs};
use crate::types::{BitwidthMode, NodeId, RUTarget, TargetInclusionCriterion, BITS_PER_BYTE};

/// The four scalar metrics the RUC can report. Only the requested fields
/// are populated; the rest stay `None` (§4.5 post-condition).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceUtilization {
    pub weights_memory: Option<u64>,
    pub activation_memory: Option<u64>,
    pub total_memory: Option<u64>,
    pub bops: Option<u64>,
}

impl ResourceUtilization {
    /// The subset of [`RUTarget`]s actually populated in this record.
    pub fn get_restricted_targets(&self) -> HashSet<RUTarget> {
        let mut set = HashSet::new();
        if self.weights_memory.is_some() {
            set.insert(RUTarget::Weights);
        }
        if self.activation_memory.is_some() {
            set.insert(RUTarget::Activation);
        }
        if self.total_memory.is_some() {
            set.insert(RUTarget::Total);
        }
        if self.bops.is_some() {
            set.insert(RUTarget::BOPS);
        }
        set
    }
}

/// Diagnostic per-node / per-cut breakdowns accompanying a
/// [`ResourceUtilization`] result.
#[derive(Debug, Clone, Default)]
pub struct UtilizationDetail {
    /// Weight bytes per node, in topological order (§8, P8).
    pub per_node_weights: Vec<(NodeId, u64)>,
    /// Activation bytes per cut, in cut-enumeration order.
    pub per_cut_activation: Vec<(usize, u64)>,
    /// BOPS per node, in topological order.
    pub per_node_bops: Vec<(NodeId, u64)>,
}

fn default_targets() -> HashSet<RUTarget> {
    [RUTarget::Weights, RUTarget::Activation, RUTarget::Total, RUTarget::BOPS]
        .into_iter()
        .collect()
}

/// A resource utilization calculator session: borrows a [`Graph`] and a
/// [`FrameworkOps`] collaborator for its lifetime. Stateless across calls to
/// [`Ruc::compute`] except for the write-once-on-first-read cut cache.
pub struct Ruc<'g, 'f> {
    graph: &'g Graph,
    framework: &'f dyn FrameworkOps,
    cuts: RefCell<Option<Vec<Cut>>>,
}

impl<'g, 'f> Ruc<'g, 'f> {
    pub fn new(graph: &'g Graph, framework: &'f dyn FrameworkOps) -> Self {
        Self { graph, framework, cuts: RefCell::new(None) }
    }

    fn cuts(&self) -> RucResult<Ref<'_, Vec<Cut>>> {
        if self.cuts.borrow().is_none() {
            let computed = compute_cuts(self.graph)?;
            *self.cuts.borrow_mut() = Some(computed);
        }
        Ok(Ref::map(self.cuts.borrow(), |c| c.as_ref().unwrap()))
    }

    /// Evaluates the requested metrics for `mode` / `criterion`. See §4.5
    /// for the full validation and computation rules.
    #[instrument(skip(self, act_cfg, w_cfg), name = "ruc_compute")]
    pub fn compute(
        &self,
        criterion: TargetInclusionCriterion,
        mode: BitwidthMode,
        act_cfg: Option<&CustomActivationConfig>,
        w_cfg: Option<&CustomWeightConfig>,
        targets: Option<&HashSet<RUTarget>>,
        allow_unused_cfg: bool,
    ) -> RucResult<(ResourceUtilization, UtilizationDetail)> {
        if (act_cfg.is_some() || w_cfg.is_some()) && mode != BitwidthMode::QCustom {
            return Err(RucError::InvalidRequest(
                "a custom activation/weight config was supplied but mode is not QCustom".to_string(),
            ));
        }

        let owned_default;
        let targets: &HashSet<RUTarget> = match targets {
            Some(t) if t.is_empty() => {
                return Err(RucError::InvalidRequest("targets must not be empty".to_string()))
            }
            Some(t) => t,
            None => {
                owned_default = default_targets();
                &owned_default
            }
        };

        if let Some(w) = w_cfg {
            validate_custom_weight_config(self.graph, w)?;
            let relevant = targets.contains(&RUTarget::Weights)
                || targets.contains(&RUTarget::Total)
                || targets.contains(&RUTarget::BOPS);
            if !relevant && !allow_unused_cfg {
                return Err(RucError::InvalidRequest(
                    "w_cfg was supplied but none of Weights/Total/BOPS were requested".to_string(),
                ));
            }
        }

        if act_cfg.is_some() {
            let relevant = targets.contains(&RUTarget::Activation)
                || targets.contains(&RUTarget::Total)
                || targets.contains(&RUTarget::BOPS);
            if !relevant && !allow_unused_cfg {
                return Err(RucError::InvalidRequest(
                    "act_cfg was supplied but none of Activation/Total/BOPS were requested".to_string(),
                ));
            }
        }

        if targets.contains(&RUTarget::BOPS) && criterion != TargetInclusionCriterion::AnyQuantized {
            return Err(RucError::NotSupported(
                "BOPS is only supported for criterion = AnyQuantized".to_string(),
            ));
        }

        let need_weights = targets.contains(&RUTarget::Weights) || targets.contains(&RUTarget::Total);
        let need_activation = targets.contains(&RUTarget::Activation) || targets.contains(&RUTarget::Total);
        let need_bops = targets.contains(&RUTarget::BOPS);

        let (weights_bytes, per_node_weights) = if need_weights {
            self.compute_weights(criterion, mode, w_cfg)?
        } else {
            (0, Vec::new())
        };

        let (peak_activation_bytes, per_cut_activation) = if need_activation {
            let cuts = self.cuts()?;
            self.compute_activation(criterion, mode, act_cfg, &cuts)?
        } else {
            (0, Vec::new())
        };

        let per_node_bops = if need_bops { self.compute_bops(mode, act_cfg, w_cfg)? } else { Vec::new() };
        let bops_total: u64 = per_node_bops.iter().map(|(_, b)| *b).sum();

        let result = ResourceUtilization {
            weights_memory: targets.contains(&RUTarget::Weights).then_some(weights_bytes),
            activation_memory: targets.contains(&RUTarget::Activation).then_some(peak_activation_bytes),
            total_memory: targets.contains(&RUTarget::Total).then_some(weights_bytes + peak_activation_bytes),
            bops: targets.contains(&RUTarget::BOPS).then_some(bops_total),
        };

        debug_assert_eq!(
            result.get_restricted_targets(),
            targets.clone(),
            "compute() must populate exactly the requested targets"
        );

        Ok((result, UtilizationDetail { per_node_weights, per_cut_activation, per_node_bops }))
    }

    fn compute_weights(
        &self,
        criterion: TargetInclusionCriterion,
        mode: BitwidthMode,
        w_cfg: Option<&CustomWeightConfig>,
    ) -> RucResult<(u64, Vec<(NodeId, u64)>)> {
        let mut total = 0u64;
        let mut detail = Vec::new();

        for node in self.graph.topological_order() {
            let attrs = select_weight_attrs(self.graph, node, criterion, false)?;
            if attrs.is_empty() {
                continue;
            }
            let mut node_bytes = 0u64;
            for attr in &attrs {
                let custom = w_cfg.and_then(|m| m.get(&node)).and_then(|inner| inner.get(attr)).copied();
                let n_bits = effective_weight_nbits(self.graph, node, attr, mode, custom)?;
                let element_count = self.graph.node(node)?.weight_attr(attr).ok_or_else(|| {
                    RucError::InvariantViolation(format!("{node} lost attribute {attr} mid-computation"))
                })?.element_count;
                node_bytes += element_count * n_bits as u64 / BITS_PER_BYTE;
            }
            total += node_bytes;
            detail.push((node, node_bytes));
        }

        Ok((total, detail))
    }

    fn compute_activation(
        &self,
        criterion: TargetInclusionCriterion,
        mode: BitwidthMode,
        act_cfg: Option<&CustomActivationConfig>,
        cuts: &[Cut],
    ) -> RucResult<(u64, Vec<(usize, u64)>)> {
        let mut per_cut = Vec::with_capacity(cuts.len());
        let mut peak = 0u64;

        for (idx, cut) in cuts.iter().enumerate() {
            let selected = select_activation_nodes_among(self.graph, &cut.live, criterion, true)?;
            let mut bytes = 0u64;
            for node in selected {
                let custom = act_cfg.and_then(|m| m.get(&node)).copied();
                let n_bits = effective_activation_nbits(self.graph, node, mode, custom)?;
                let element_count = self.graph.node(node)?.output_elements;
                bytes += element_count * n_bits as u64 / BITS_PER_BYTE;
            }
            peak = peak.max(bytes);
            per_cut.push((idx, bytes));
        }

        Ok((peak, per_cut))
    }

    fn compute_bops(
        &self,
        mode: BitwidthMode,
        act_cfg: Option<&CustomActivationConfig>,
        w_cfg: Option<&CustomWeightConfig>,
    ) -> RucResult<Vec<(NodeId, u64)>> {
        let mut detail = Vec::new();

        for node in self.graph.topological_order() {
            if !self.graph.has_kernel_weight_to_quantize(node)? {
                continue;
            }
            let n = self.graph.node(node)?;
            let kernel_attr = n.kernel_weight_attr().ok_or_else(|| {
                RucError::InvariantViolation(format!("{node} has no kernel weight attribute"))
            })?;
            let kernel_attr_key = kernel_attr.key.clone();

            let reported = self.framework.get_kernel_op_attributes(&n.op_type);
            if reported.len() > 1 {
                return Err(RucError::NotSupported(format!(
                    "op type {:?} reports {} kernel attributes, at most one is supported",
                    n.op_type,
                    reported.len()
                )));
            }

            let incoming = self.graph.incoming_edges(node);
            if incoming.len() != 1 {
                return Err(RucError::InvariantViolation(format!(
                    "{node} carries a kernel weight but has {} incoming edges, expected exactly one",
                    incoming.len()
                )));
            }
            let producer = incoming[0].source;

            let mac_count = self.framework.get_node_mac_operations(self.graph, node);

            let act_custom = act_cfg.and_then(|m| m.get(&producer)).copied();
            let activation_nbits = effective_activation_nbits(self.graph, producer, mode, act_custom)?;

            let weight_custom =
                w_cfg.and_then(|m| m.get(&node)).and_then(|inner| inner.get(&kernel_attr_key)).copied();
            let kernel_nbits = effective_weight_nbits(self.graph, node, &kernel_attr_key, mode, weight_custom)?;

            let bops = mac_count * activation_nbits as u64 * kernel_nbits as u64;
            detail.push((node, bops));
        }

        Ok(detail)
    }
}
