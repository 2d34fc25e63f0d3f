//! Proof that at least one error was recorded.

use std::fmt;

/// Type-level evidence that an error diagnostic was emitted.
///
/// Only the diagnostic queue (or an explicit nonzero error count) can hand
/// one out, so a `Result<T, ErrorGuaranteed>` cannot fail silently.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    pub(crate) fn new() -> Self {
        ErrorGuaranteed(())
    }

    /// Returns a guarantee when `count` is nonzero.
    pub fn from_error_count(count: usize) -> Option<Self> {
        (count > 0).then(Self::new)
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error(s) emitted")
    }
}

#[cfg(test)]
mod tests;
