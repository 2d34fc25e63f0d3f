//! Arbor IR - nodes, handles and rewriting
//!
//! Core data structures shared by the compiler service and the rewrite
//! engine:
//! - `NodeArena`: append-only node storage owned by one compilation context
//! - `NodeId`: generation-checked index into an arena
//! - `NodeData` / `NodeKind`: the closed set of syntax node shapes
//! - `NodeRef`: a typed handle borrowing its arena
//! - `visitor`: children-first rewriting with an identity fast path
//!
//! # Design Philosophy
//!
//! - **Immutable nodes**: an edit allocates a new node; nothing is patched
//!   in place, so unchanged subtrees keep their ids.
//! - **Flat storage**: children are `NodeId`s, not boxes.
//! - **Checked slots**: every allocation verifies that each child kind fits
//!   the position it is placed in.

/// Compile-time assertion that a type has a specific size.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod arena;
mod error;
mod handle;
mod interner;
mod node;
mod span;
pub mod visitor;

pub use arena::NodeArena;
pub use error::{IrError, IrResult};
pub use handle::{Descendants, NodeRef};
pub use interner::{Name, StringInterner};
pub use node::{Children, Node, NodeData, NodeFlags, NodeId, NodeKind, Slot};
pub use span::Span;
pub use visitor::{rewrite_tree, visit_each_child, RewriteCx, Rewriter};
