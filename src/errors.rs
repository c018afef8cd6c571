use thiserror::Error;

use crate::types::{AttrKey, NodeId};

/// The taxonomy of failures the resource utilization calculator can raise.
///
/// `InvalidRequest`, `UnknownAttribute`, `AmbiguousDefault` and `NotSupported`
/// are recoverable caller-visible errors. `CutComputationFailed` and
/// `InvariantViolation` indicate an inconsistency in an upstream collaborator
/// (the graph importer or the framework implementation) and are never
/// retried internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RucError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{node} has no weight attribute {attr}")]
    UnknownAttribute { node: NodeId, attr: AttrKey },

    #[error("{node} cannot resolve a default bit-width ({context})")]
    AmbiguousDefault { node: NodeId, context: String },

    #[error("not supported: {0}")]
    NotSupported(String),

    #[error("cut computation failed: the memory graph produced no cuts for a non-empty graph")]
    CutComputationFailed,

    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

pub type RucResult<T> = Result<T, RucError>;
