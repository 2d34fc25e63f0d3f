//! Engine failures.

use std::fmt;

use arbor_diagnostic::{Diagnostic, ErrorGuaranteed};
use arbor_ir::{IrError, NodeId, NodeKind, Slot};

use crate::{BindingKey, PluginError, ProgramId, ServiceError, Stage};

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A rewrite put a node where its kind is not allowed.
    #[error("structural mismatch: a {found} node cannot occupy a {expected} slot")]
    StructuralMismatch { expected: Slot, found: NodeKind },

    /// A rewrite kept descending into its own output.
    #[error("rewrite exceeded the recursion limit of {limit}")]
    RecursionLimit { limit: u32 },

    /// The operation is not legal at the current stage. Raised before the
    /// service is called.
    #[error("cannot {operation} at stage {stage}")]
    StageViolation {
        operation: &'static str,
        stage: Stage,
    },

    #[error(transparent)]
    BuildFailed(BuildFailure),

    /// Bindings that resolved before a rewrite and no longer do.
    #[error(
        "{} import binding(s) no longer resolve after rewriting: {}",
        .bindings.len(),
        describe_bindings(.bindings)
    )]
    LinkageRegression {
        bindings: Vec<(ProgramId, BindingKey)>,
    },

    #[error("node handle {0:?} does not belong to this context")]
    StaleHandle(NodeId),

    #[error("{0} is not part of this context")]
    UnknownProgram(ProgramId),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("plugin `{plugin}` failed: {source}")]
    Transform {
        plugin: String,
        #[source]
        source: PluginError,
    },

    /// A rewriter refused to continue outside any plugin.
    #[error("rewrite rejected: {message}")]
    Rejected { message: String },
}

impl From<IrError> for EngineError {
    fn from(err: IrError) -> Self {
        match err {
            IrError::StructuralMismatch { expected, found } => {
                EngineError::StructuralMismatch { expected, found }
            }
            IrError::StaleHandle(id) => EngineError::StaleHandle(id),
            IrError::RecursionLimit { limit } => EngineError::RecursionLimit { limit },
            IrError::Rejected { message } => EngineError::Rejected { message },
        }
    }
}

fn describe_bindings(bindings: &[(ProgramId, BindingKey)]) -> String {
    bindings
        .iter()
        .map(|(program, key)| format!("{key} in {program}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error diagnostics left after a check or recheck.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildFailure {
    diagnostics: Vec<(ProgramId, Diagnostic)>,
    errors: ErrorGuaranteed,
}

impl BuildFailure {
    /// `None` when no diagnostic is an error.
    pub(crate) fn from_diagnostics(diagnostics: &[(ProgramId, Diagnostic)]) -> Option<Self> {
        let count = diagnostics.iter().filter(|(_, d)| d.is_error()).count();
        let errors = ErrorGuaranteed::from_error_count(count)?;
        Some(BuildFailure {
            diagnostics: diagnostics.to_vec(),
            errors,
        })
    }

    pub fn guarantee(&self) -> ErrorGuaranteed {
        self.errors
    }

    /// Every diagnostic of the failed check, warnings included.
    pub fn diagnostics(&self) -> &[(ProgramId, Diagnostic)] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|(_, d)| d.is_error()).count()
    }
}

impl fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "build failed with {} error(s)", self.error_count())?;
        for (program, diagnostic) in self.diagnostics.iter().filter(|(_, d)| d.is_error()) {
            write!(f, "\n{program}: {diagnostic}")?;
        }
        Ok(())
    }
}

impl std::error::Error for BuildFailure {}
