//! Diagnostic system for compiler and engine errors.
//!
//! - Error codes for searchability (`E####`, first digit = phase)
//! - Clear messages (what went wrong)
//! - Primary span (where it went wrong)
//! - Notes and secondary labels (what else is involved)
//!
//! # Error Guarantees
//!
//! [`ErrorGuaranteed`] provides type-level proof that at least one error was
//! reported:
//!
//! ```text
//! let errors: Option<ErrorGuaranteed> = queue.has_errors();
//! ```

mod diagnostic;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{
    duplicate_declaration, unexpected_token, unknown_identifier, Diagnostic, Label, Severity,
};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
