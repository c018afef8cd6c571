//! Shared scalar types and enumerations used across the resource utilization
//! calculator: stable node identities, weight-attribute keys, and the
//! enumerations exposed to callers of [`crate::aggregator::Ruc`].

use std::fmt;

/// Bit-width used for any tensor whose quantization is disabled.
pub const FLOAT_BITWIDTH: u8 = 32;
/// Divisor used to turn an element-count × bit-width product into bytes.
pub const BITS_PER_BYTE: u64 = 8;

/// Stable identifier for a node in the [`crate::graph::Graph`]. Indexes
/// directly into the graph's topologically-ordered node vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Identifier for a group of nodes that share the same underlying weight
/// parameters (see `reuse` / `reuse_group` on [`crate::graph::Node`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReuseGroupId(pub u64);

/// The name of a weight attribute on a node: either a declared name (e.g.
/// `"kernel"`, `"bias"`) or a positional index for ops that expose their
/// weights positionally.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttrKey {
    Named(String),
    Positional(usize),
}

impl AttrKey {
    pub fn named(name: impl Into<String>) -> Self {
        AttrKey::Named(name.into())
    }
}

impl fmt::Display for AttrKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrKey::Named(n) => write!(f, "{n}"),
            AttrKey::Positional(i) => write!(f, "#{i}"),
        }
    }
}

/// A single (bit-width, enabled) setting, attached either to one weight
/// attribute of a candidate, or to a candidate's activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitSetting {
    pub n_bits: u8,
    pub enabled: bool,
}

impl BitSetting {
    pub fn new(n_bits: u8, enabled: bool) -> Self {
        Self { n_bits, enabled }
    }

    pub fn float() -> Self {
        Self { n_bits: FLOAT_BITWIDTH, enabled: false }
    }
}

/// Policy for resolving a node's effective bit-width when several
/// candidates are available. See `§4.1` of the design for resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitwidthMode {
    /// Never quantize; always resolve to [`FLOAT_BITWIDTH`].
    Float,
    /// Fixed 8-bit quantization regardless of candidates.
    Q8Bit,
    /// The largest bit-width among the node's enabled candidates.
    QMaxBit,
    /// The smallest bit-width among the node's enabled candidates.
    QMinBit,
    /// Caller-supplied per-node custom configuration.
    QCustom,
    /// A single default precision, valid only when the node has exactly one
    /// distinct enabled candidate bit-width.
    QDefaultSP,
}

/// Criterion used by the target selector to decide which nodes / weight
/// attributes participate in a given metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetInclusionCriterion {
    /// Only attributes/nodes with more than one candidate bit-width.
    QConfigurable,
    /// Quantization-enabled but with a single candidate bit-width.
    QNonConfigurable,
    /// Any attribute/node with quantization enabled.
    AnyQuantized,
    /// All attributes/nodes, quantized or not.
    Any,
}

/// The metrics a caller may request from [`crate::aggregator::Ruc::compute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RUTarget {
    Weights,
    Activation,
    Total,
    BOPS,
}
