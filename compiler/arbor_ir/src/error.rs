//! Errors raised by arena access and tree rewriting.

use crate::{NodeId, NodeKind, Slot};

/// Result alias for arena and rewrite operations.
pub type IrResult<T> = Result<T, IrError>;

/// Failure while reading or rebuilding nodes.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum IrError {
    /// A node was placed in a child position that cannot hold its kind.
    #[error("structural mismatch: a {found} node cannot occupy a {expected} slot")]
    StructuralMismatch { expected: Slot, found: NodeKind },

    /// A handle from another arena, i.e. from another (possibly destroyed)
    /// compilation context.
    #[error("node handle {0:?} does not belong to this context")]
    StaleHandle(NodeId),

    /// A rewrite kept descending into its own output.
    #[error("rewrite exceeded the recursion limit of {limit}; is a node being replaced by one of its ancestors?")]
    RecursionLimit { limit: u32 },

    /// A rewriter refused to continue.
    #[error("rewrite rejected: {message}")]
    Rejected { message: String },
}

impl IrError {
    /// Convenience constructor for rewriter-defined failures.
    #[cold]
    pub fn rejected(message: impl Into<String>) -> Self {
        IrError::Rejected {
            message: message.into(),
        }
    }
}
