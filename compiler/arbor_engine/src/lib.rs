//! Arbor Engine - plugin rewrites between compilation stages
//!
//! The engine drives a [`CompilerService`] through the stages
//! `Parsed -> Checked -> BinaryGenerated` and lets plugins rewrite each
//! program's syntax tree on the way:
//!
//! ```text
//! Context::create ──► Parsed ──proceed_to──► Checked ──proceed_to──► BinaryGenerated
//!                       │                      │
//!                  run_pipeline           run_pipeline ──► recheck
//! ```
//!
//! - [`Context`]: one compilation session; owns the service, the program
//!   graph and the current [`Stage`]
//! - [`Pipeline`]: ordered transforms applied to dependencies first, then
//!   to the main program
//! - [`LinkageTracker`]: import bindings per program and their resolution
//!   against the exporting program
//! - [`CompilerService`]: the boundary to the parser, checker and emitter
//!
//! # Handles
//!
//! Nodes live in the service's [`NodeArena`](arbor_ir::NodeArena). A
//! [`NodeRef`](arbor_ir::NodeRef) borrows the context it came from, so it
//! cannot outlive [`Context::destroy`]. A bare [`NodeId`](arbor_ir::NodeId)
//! kept past that point is rejected with [`EngineError::StaleHandle`] by any
//! other context.

mod config;
mod context;
mod error;
mod linkage;
mod pipeline;
mod program;
mod service;
mod stage;

#[cfg(test)]
mod test_support;

pub use config::{ConfigError, HostConfig, SourceEntry};
pub use context::{with_context, Context};
pub use error::{BuildFailure, EngineError, EngineResult};
pub use linkage::{
    BindingKey, ExportTable, ExportTarget, ImportBinding, ImportKind, LinkageTracker,
    LinkageUpdate,
};
pub use pipeline::{
    Invocation, Pipeline, PipelineReport, Plugin, PluginContext, PluginError, ProgramEdit,
    TransformOptions,
};
pub use program::{Program, ProgramGraph, ProgramId};
pub use service::{CompilerService, EmittedUnit, ServiceError};
pub use stage::{Stage, StageController};
