//! The Quantization Config Resolver: pure functions mapping
//! `(node, attribute-or-activation, mode, optional custom setting)` to an
//! effective bit-width (§4.1).

use std::collections::HashMap;

use crate::errors::{RucError, RucResult};
use crate::graph::Graph;
use crate::types::{AttrKey, BitSetting, BitwidthMode, NodeId, FLOAT_BITWIDTH};

/// Caller-supplied per-node activation overrides, only meaningful under
/// [`BitwidthMode::QCustom`].
pub type CustomActivationConfig = HashMap<NodeId, BitSetting>;

/// Caller-supplied per-node, per-attribute weight overrides, only meaningful
/// under [`BitwidthMode::QCustom`].
pub type CustomWeightConfig = HashMap<NodeId, HashMap<AttrKey, BitSetting>>;

/// Resolves the effective activation bit-width for `node` under `mode`,
/// honoring an optional custom override (resolution order in §4.1).
pub fn effective_activation_nbits(
    graph: &Graph,
    node: NodeId,
    mode: BitwidthMode,
    custom: Option<BitSetting>,
) -> RucResult<u8> {
    if let Some(setting) = custom {
        if mode != BitwidthMode::QCustom {
            return Err(RucError::InvalidRequest(format!(
                "{node} carries a custom activation config but mode is {mode:?}, not QCustom"
            )));
        }
        return Ok(if setting.enabled { setting.n_bits } else { FLOAT_BITWIDTH });
    }

    if mode == BitwidthMode::Float || !graph.is_activation_quantization_enabled(node)? {
        return Ok(FLOAT_BITWIDTH);
    }

    match mode {
        BitwidthMode::Q8Bit => Ok(8),
        BitwidthMode::QMaxBit => Ok(*graph.get_unique_activation_candidates(node)?.iter().max().unwrap()),
        BitwidthMode::QMinBit => Ok(*graph.get_unique_activation_candidates(node)?.iter().min().unwrap()),
        BitwidthMode::QCustom | BitwidthMode::QDefaultSP => {
            let unique = graph.get_unique_activation_candidates(node)?;
            if unique.len() == 1 {
                Ok(unique[0])
            } else {
                Err(RucError::AmbiguousDefault {
                    node,
                    context: format!(
                        "activation has {} distinct candidate bit-widths and no custom override",
                        unique.len()
                    ),
                })
            }
        }
        BitwidthMode::Float => unreachable!("handled above"),
    }
}

/// Resolves the effective weight bit-width for `(node, attr)` under `mode`,
/// honoring an optional custom override restricted to that attribute.
pub fn effective_weight_nbits(
    graph: &Graph,
    node: NodeId,
    attr: &AttrKey,
    mode: BitwidthMode,
    custom: Option<BitSetting>,
) -> RucResult<u8> {
    if let Some(setting) = custom {
        if mode != BitwidthMode::QCustom {
            return Err(RucError::InvalidRequest(format!(
                "{node} carries a custom weight config for {attr} but mode is {mode:?}, not QCustom"
            )));
        }
        return Ok(if setting.enabled { setting.n_bits } else { FLOAT_BITWIDTH });
    }

    if mode == BitwidthMode::Float || !graph.is_weights_quantization_enabled(node, attr)? {
        return Ok(FLOAT_BITWIDTH);
    }

    match mode {
        BitwidthMode::Q8Bit => Ok(8),
        BitwidthMode::QMaxBit => Ok(*graph.get_unique_weights_candidates(node, attr)?.iter().max().unwrap()),
        BitwidthMode::QMinBit => Ok(*graph.get_unique_weights_candidates(node, attr)?.iter().min().unwrap()),
        BitwidthMode::QCustom | BitwidthMode::QDefaultSP => {
            let unique = graph.get_unique_weights_candidates(node, attr)?;
            if unique.len() == 1 {
                Ok(unique[0])
            } else {
                Err(RucError::AmbiguousDefault {
                    node,
                    context: format!(
                        "attribute {attr} has {} distinct candidate bit-widths and no custom override",
                        unique.len()
                    ),
                })
            }
        }
        BitwidthMode::Float => unreachable!("handled above"),
    }
}

/// Validates that every attribute named in `w_cfg` actually exists on its
/// node, raising [`RucError::UnknownAttribute`] otherwise.
pub fn validate_custom_weight_config(graph: &Graph, w_cfg: &CustomWeightConfig) -> RucResult<()> {
    for (&node, attrs) in w_cfg {
        for attr in attrs.keys() {
            if graph.node(node)?.weight_attr(attr).is_none() {
                return Err(RucError::UnknownAttribute { node, attr: attr.clone() });
            }
        }
    }
    Ok(())
}
