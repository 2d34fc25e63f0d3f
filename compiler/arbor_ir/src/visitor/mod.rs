//! Children-first tree rewriting.
//!
//! # Design
//!
//! A [`Rewriter`] has exactly one required method, `rewrite`, which maps a
//! node to its replacement. Traversal is not implicit: a rewriter that wants
//! to reach a node's children calls [`visit_each_child`] itself, either
//! before inspecting the node (it then sees already-rewritten children) or
//! after (it then sees the original children).
//!
//! ```text
//! impl Rewriter for RenameCalls {
//!     fn rewrite(&mut self, cx: &mut RewriteCx<'_>, node: NodeId) -> IrResult<NodeId> {
//!         // after-children: act on the rebuilt node
//!         let node = visit_each_child(self, cx, node)?;
//!         if cx.kind(node)? == NodeKind::Identifier { /* ... */ }
//!         Ok(node)
//!     }
//! }
//! ```
//!
//! `visit_each_child` returns the original id when no child changed, so an
//! untouched subtree keeps its identity all the way up. When a child did
//! change, the parent is rebuilt with its span and flags copied, and every
//! replacement is checked against the slot it lands in.
//!
//! Rewriters compose by wrapping ([`post_order`], [`pre_order`],
//! [`rewrite_kind`], [`chain`]) rather than by inheritance.

use arbor_stack::{ensure_sufficient_stack, DepthLimit};

use crate::{IrError, IrResult, NodeArena, NodeId, NodeKind, NodeRef};

/// Deepest nesting a single rewrite may reach.
pub const MAX_REWRITE_DEPTH: u32 = 2048;

/// Mutable state threaded through a rewrite.
pub struct RewriteCx<'a> {
    arena: &'a mut NodeArena,
    depth: DepthLimit,
}

impl<'a> RewriteCx<'a> {
    pub fn new(arena: &'a mut NodeArena) -> Self {
        Self::with_limit(arena, MAX_REWRITE_DEPTH)
    }

    pub fn with_limit(arena: &'a mut NodeArena, max_depth: u32) -> Self {
        RewriteCx {
            arena,
            depth: DepthLimit::new(max_depth),
        }
    }

    #[inline]
    pub fn arena(&self) -> &NodeArena {
        self.arena
    }

    /// Arena access for building replacement nodes.
    #[inline]
    pub fn arena_mut(&mut self) -> &mut NodeArena {
        self.arena
    }

    /// Kind of a node; ids from another arena are [`IrError::StaleHandle`].
    #[inline]
    pub fn kind(&self, node: NodeId) -> IrResult<NodeKind> {
        self.arena.kind(node)
    }

    /// Typed view of a node.
    pub fn node(&self, node: NodeId) -> IrResult<NodeRef<'_>> {
        self.arena.handle(node)
    }

    /// Current nesting of `visit_each_child` calls.
    pub fn depth(&self) -> u32 {
        self.depth.depth()
    }
}

/// Maps a node to its replacement.
pub trait Rewriter {
    fn rewrite(&mut self, cx: &mut RewriteCx<'_>, node: NodeId) -> IrResult<NodeId>;
}

impl<R: Rewriter + ?Sized> Rewriter for &mut R {
    fn rewrite(&mut self, cx: &mut RewriteCx<'_>, node: NodeId) -> IrResult<NodeId> {
        (**self).rewrite(cx, node)
    }
}

impl<R: Rewriter + ?Sized> Rewriter for Box<R> {
    fn rewrite(&mut self, cx: &mut RewriteCx<'_>, node: NodeId) -> IrResult<NodeId> {
        (**self).rewrite(cx, node)
    }
}

/// Rewrite every child of `node` with `rewriter`.
///
/// Returns `node` itself when every child came back unchanged; otherwise a
/// new node of the same kind with the replacement children.
pub fn visit_each_child<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    cx: &mut RewriteCx<'_>,
    node: NodeId,
) -> IrResult<NodeId> {
    let original = cx.arena.try_get(node)?.clone();
    cx.depth
        .enter()
        .map_err(|e| IrError::RecursionLimit { limit: e.limit })?;

    let result = ensure_sufficient_stack(|| {
        let mut changed = false;
        let data = original.data.try_map_children(|child, slot| {
            let replacement = rewriter.rewrite(cx, child)?;
            if replacement != child {
                let found = cx.arena.try_get(replacement)?.kind();
                if !found.fits(slot) {
                    return Err(IrError::StructuralMismatch {
                        expected: slot,
                        found,
                    });
                }
                changed = true;
            }
            Ok(replacement)
        })?;

        if changed {
            cx.arena.alloc(data, original.span, original.flags)
        } else {
            Ok(node)
        }
    });

    cx.depth.exit();
    result
}

/// Run `rewriter` over the tree rooted at `root`.
pub fn rewrite_tree<R: Rewriter + ?Sized>(
    arena: &mut NodeArena,
    root: NodeId,
    rewriter: &mut R,
) -> IrResult<NodeId> {
    let mut cx = RewriteCx::new(arena);
    rewriter.rewrite(&mut cx, root)
}

/// Visit children, then apply `f` to the (possibly rebuilt) node.
pub fn post_order<F>(f: F) -> PostOrder<F>
where
    F: FnMut(&mut RewriteCx<'_>, NodeId) -> IrResult<NodeId>,
{
    PostOrder(f)
}

pub struct PostOrder<F>(F);

impl<F> Rewriter for PostOrder<F>
where
    F: FnMut(&mut RewriteCx<'_>, NodeId) -> IrResult<NodeId>,
{
    fn rewrite(&mut self, cx: &mut RewriteCx<'_>, node: NodeId) -> IrResult<NodeId> {
        let node = visit_each_child(self, cx, node)?;
        (self.0)(cx, node)
    }
}

/// Apply `f` to the original node, then visit the children of its result.
///
/// Returning an ancestor from `f` makes the walk re-enter the same subtree
/// forever; the depth limit turns that into [`IrError::RecursionLimit`].
pub fn pre_order<F>(f: F) -> PreOrder<F>
where
    F: FnMut(&mut RewriteCx<'_>, NodeId) -> IrResult<NodeId>,
{
    PreOrder(f)
}

pub struct PreOrder<F>(F);

impl<F> Rewriter for PreOrder<F>
where
    F: FnMut(&mut RewriteCx<'_>, NodeId) -> IrResult<NodeId>,
{
    fn rewrite(&mut self, cx: &mut RewriteCx<'_>, node: NodeId) -> IrResult<NodeId> {
        let node = (self.0)(cx, node)?;
        visit_each_child(self, cx, node)
    }
}

/// After-children rewrite restricted to nodes of one kind.
pub fn rewrite_kind<F>(
    kind: NodeKind,
    mut f: F,
) -> PostOrder<impl FnMut(&mut RewriteCx<'_>, NodeId) -> IrResult<NodeId>>
where
    F: FnMut(&mut RewriteCx<'_>, NodeId) -> IrResult<NodeId>,
{
    post_order(move |cx: &mut RewriteCx<'_>, node: NodeId| {
        if cx.kind(node)? == kind {
            f(cx, node)
        } else {
            Ok(node)
        }
    })
}

/// Run `first` over the whole tree, then `second` over the result.
pub fn chain<A: Rewriter, B: Rewriter>(first: A, second: B) -> Chain<A, B> {
    Chain { first, second }
}

pub struct Chain<A, B> {
    first: A,
    second: B,
}

impl<A: Rewriter, B: Rewriter> Rewriter for Chain<A, B> {
    fn rewrite(&mut self, cx: &mut RewriteCx<'_>, node: NodeId) -> IrResult<NodeId> {
        let node = self.first.rewrite(cx, node)?;
        self.second.rewrite(cx, node)
    }
}
