//! The boundary to the compiler proper.
//!
//! The engine never parses, checks or emits anything itself. It calls a
//! [`CompilerService`], which owns the node arena for the lifetime of the
//! context. Calls are synchronous and never overlap: the context holds the
//! service exclusively.

use std::path::PathBuf;

use arbor_diagnostic::Diagnostic;
use arbor_ir::{IrError, NodeArena, NodeId};

use crate::{HostConfig, ProgramGraph, ProgramId};

pub trait CompilerService {
    /// Parse the configured sources and everything they import.
    fn load(&mut self, config: &HostConfig) -> Result<ProgramGraph, ServiceError>;

    /// Storage for every node of every program.
    fn arena(&self) -> &NodeArena;

    fn arena_mut(&mut self) -> &mut NodeArena;

    /// Program an import specifier written in `from` refers to.
    fn resolve_module(
        &self,
        graph: &ProgramGraph,
        from: ProgramId,
        specifier: &str,
    ) -> Option<ProgramId>;

    /// Re-derive parent links below `root` after its tree was rewritten.
    fn update_subtree(&mut self, root: NodeId) -> Result<(), ServiceError>;

    /// Parent recorded by the last `update_subtree` covering `node`.
    fn parent_of(&self, node: NodeId) -> Option<NodeId>;

    /// Semantic analysis of every program in the graph.
    fn check(&mut self, graph: &ProgramGraph) -> Vec<(ProgramId, Diagnostic)>;

    /// Forget every result of the last `check`.
    fn reset_semantics(&mut self);

    /// Declaration an identifier use resolved to in the last `check`.
    fn declaration_of(&self, reference: NodeId) -> Option<NodeId>;

    /// Produce binaries for every non-stdlib program.
    fn emit(&mut self, graph: &ProgramGraph) -> Result<Vec<EmittedUnit>, ServiceError>;

    fn dump_src(&self, root: NodeId) -> Result<String, ServiceError>;

    fn dump_json(&self, root: NodeId) -> Result<String, ServiceError>;

    /// Release everything the service holds. Called exactly once.
    fn dispose(&mut self);
}

/// One emitted program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmittedUnit {
    pub program: ProgramId,
    /// Where the bytes were written, if anywhere.
    pub path: Option<PathBuf>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("no source files configured")]
    NoSources,

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {} error(s)", .path.display(), .diagnostics.len())]
    Parse {
        path: PathBuf,
        diagnostics: Vec<Diagnostic>,
    },

    #[error("failed to emit {}: {message}", .path.display())]
    Emit { path: PathBuf, message: String },

    #[error(transparent)]
    Ir(#[from] IrError),
}
