//! Read-only projections of a syntax tree.
//!
//! - [`dump_src`]: deterministic source reconstruction
//! - [`dump_json`]: structured JSON dump
//!
//! Both are used to verify the effect of rewrites from outside; neither
//! allocates nodes.

pub mod emitter;
mod json;
mod source;

pub use emitter::{Emitter, StringEmitter, INDENT_WIDTH};
pub use json::{dump_json, to_json_value};
pub use source::{dump_src, SourcePrinter};
