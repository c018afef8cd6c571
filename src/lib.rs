//! Resource utilization calculator for quantized computation graphs: given a
//! [`graph::Graph`] and a bit-width resolution policy, computes weight
//! memory, peak activation memory, total memory and bit-operations (BOPS),
//! plus per-node / per-cut breakdowns.
//!
//! The calculator never mutates the graph and never performs the
//! mixed-precision search that produces a bit-width assignment in the first
//! place — it only measures the cost of one already-chosen assignment. See
//! [`aggregator::Ruc`] for the entry point.

pub mod aggregator;
pub mod config;
pub mod errors;
pub mod framework;
pub mod graph;
pub mod maxcut;
pub mod memory;
pub mod target;
pub mod types;

pub use aggregator::{ResourceUtilization, Ruc, UtilizationDetail};
pub use errors::{RucError, RucResult};
pub use framework::FrameworkOps;
pub use graph::{builder::GraphBuilder, Graph};
pub use types::{BitwidthMode, RUTarget, TargetInclusionCriterion};
