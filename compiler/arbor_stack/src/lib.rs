//! Stack safety for recursive tree walks.
//!
//! Two separate concerns live here:
//!
//! - [`ensure_sufficient_stack`] grows the native stack on demand so deeply
//!   nested syntax (long call chains, nested blocks) cannot overflow it.
//! - [`DepthLimit`] bounds the *logical* recursion depth of a walk. Growing
//!   the stack forever would turn a rewrite that keeps re-entering its own
//!   output into an out-of-memory crash; the limit turns it into an error.
//!
//! ```text
//! fn walk(&mut self, node: NodeId) -> Result<NodeId, Error> {
//!     self.depth.enter()?;
//!     let result = ensure_sufficient_stack(|| self.walk_children(node));
//!     self.depth.exit();
//!     result
//! }
//! ```

use std::fmt;

/// Minimum stack space to keep available (100KB red zone).
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Ensure sufficient stack space is available before executing `f`.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version - just call directly (WASM has its own stack management).
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Error raised when a walk nests deeper than its [`DepthLimit`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct DepthExceeded {
    /// The configured maximum depth.
    pub limit: u32,
}

impl fmt::Display for DepthExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "recursion depth exceeded the limit of {}", self.limit)
    }
}

impl std::error::Error for DepthExceeded {}

/// Counter bounding how deep a recursive walk may go.
///
/// Every successful [`enter`](Self::enter) must be paired with an
/// [`exit`](Self::exit), including on error paths.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DepthLimit {
    depth: u32,
    max: u32,
}

impl DepthLimit {
    /// Create a limit allowing at most `max` nested levels.
    pub const fn new(max: u32) -> Self {
        DepthLimit { depth: 0, max }
    }

    /// Descend one level.
    pub fn enter(&mut self) -> Result<(), DepthExceeded> {
        if self.depth >= self.max {
            return Err(DepthExceeded { limit: self.max });
        }
        self.depth += 1;
        Ok(())
    }

    /// Return from one level.
    pub fn exit(&mut self) {
        debug_assert!(self.depth > 0, "DepthLimit::exit without matching enter");
        self.depth = self.depth.saturating_sub(1);
    }

    /// Current nesting depth.
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Configured maximum.
    pub const fn max(&self) -> u32 {
        self.max
    }
}
