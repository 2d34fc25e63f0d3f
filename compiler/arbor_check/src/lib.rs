//! Semantic analysis for one program.
//!
//! Resolves every identifier in an expression position to the node that
//! declares it and reports the problems that make a program ill-formed on
//! its own. Cross-program questions (does the imported module export this
//! name?) belong to the linkage tracker, not here: an import specifier is a
//! declaration as far as this crate is concerned.
//!
//! # Passes
//!
//! 1. **Declarations**: every function, class, variable and import local of a
//!    scope is bound before any body is walked, so order of declaration does
//!    not matter inside one scope.
//! 2. **Bodies**: statements and expressions are walked, recording one
//!    reference per identifier use.

mod checker;
mod scope;

pub use checker::ModuleChecker;

use rustc_hash::FxHashMap;

use arbor_diagnostic::{Diagnostic, DiagnosticConfig, ErrorGuaranteed};
use arbor_ir::{Name, NodeArena, NodeId};

/// Names visible to every program (the prelude), keyed by interned name.
pub type Globals = FxHashMap<Name, NodeId>;

/// Identifier uses resolved to their declarations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SemanticModel {
    references: FxHashMap<NodeId, NodeId>,
}

impl SemanticModel {
    /// Declaration (or import specifier) an identifier use refers to.
    pub fn resolve(&self, reference: NodeId) -> Option<NodeId> {
        self.references.get(&reference).copied()
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.references.iter().map(|(&k, &v)| (k, v))
    }

    /// Fold another program's references into this one.
    pub fn extend(&mut self, other: SemanticModel) {
        self.references.extend(other.references);
    }

    /// Forget every resolution; the next check starts from scratch.
    pub fn clear(&mut self) {
        self.references.clear();
    }

    pub(crate) fn record(&mut self, reference: NodeId, declaration: NodeId) {
        self.references.insert(reference, declaration);
    }
}

/// Outcome of checking one program.
#[derive(Debug, Default)]
pub struct CheckResult {
    pub model: SemanticModel,
    pub diagnostics: Vec<Diagnostic>,
    /// Set when at least one of `diagnostics` is an error.
    pub errors: Option<ErrorGuaranteed>,
}

impl CheckResult {
    pub fn has_errors(&self) -> bool {
        self.errors.is_some()
    }
}

/// Check the program rooted at `root` with the default diagnostic limits.
pub fn check_program(arena: &NodeArena, root: NodeId, globals: &Globals) -> CheckResult {
    check_program_with(arena, root, globals, DiagnosticConfig::default())
}

/// Check the program rooted at `root`, keeping diagnostics per `config`.
#[tracing::instrument(level = "debug", skip_all, fields(root = %root))]
pub fn check_program_with(
    arena: &NodeArena,
    root: NodeId,
    globals: &Globals,
    config: DiagnosticConfig,
) -> CheckResult {
    let mut checker = ModuleChecker::with_config(arena, globals, config);
    checker.check_module(root);
    let result = checker.finish();
    tracing::debug!(
        references = result.model.len(),
        diagnostics = result.diagnostics.len(),
        "checked program"
    );
    result
}
