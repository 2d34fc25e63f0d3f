//! Ordered plugin transforms.
//!
//! A [`Plugin`] is a named transform
//! `(program, options, plugin context) -> Option<new root>`. Returning
//! `None` keeps whatever root the transform installed with
//! [`ProgramEdit::set_ast`] (or the original one if it installed nothing).
//!
//! [`Context::run_pipeline`](crate::Context::run_pipeline) hands every
//! non-stdlib dependency to the plugins first, each after the programs it
//! imports, and the main program last. A transform of the main program
//! therefore sees its dependencies in their rewritten shape.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::Value;

use arbor_ir::{rewrite_tree, IrError, NodeArena, NodeId, NodeKind, NodeRef, Rewriter};

use crate::{
    EngineError, EngineResult, HostConfig, LinkageUpdate, Program, ProgramGraph, ProgramId, Stage,
};

/// Per-invocation options handed to a transform.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TransformOptions<'a> {
    pub stage: Stage,
    pub is_main_program: bool,
    /// Name of the program being transformed.
    pub name: &'a str,
}

#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error(transparent)]
    Ir(#[from] IrError),

    #[error("{0}")]
    Failed(String),
}

impl PluginError {
    #[cold]
    pub fn failed(message: impl Into<String>) -> Self {
        PluginError::Failed(message.into())
    }
}

/// State shared by every plugin for the lifetime of a context.
#[derive(Debug)]
pub struct PluginContext {
    config: Arc<HostConfig>,
    parameters: FxHashMap<String, Value>,
}

impl PluginContext {
    pub fn new(config: Arc<HostConfig>) -> Self {
        PluginContext {
            config,
            parameters: FxHashMap::default(),
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Store a value for later plugins or later stages. Returns the
    /// previous value under `key`.
    pub fn set_parameter(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.parameters.insert(key.into(), value)
    }

    pub fn parameter(&self, key: &str) -> Option<&Value> {
        self.parameters.get(key)
    }

    pub fn remove_parameter(&mut self, key: &str) -> Option<Value> {
        self.parameters.remove(key)
    }
}

type TransformFn = dyn FnMut(
    &mut ProgramEdit<'_>,
    &TransformOptions<'_>,
    &mut PluginContext,
) -> Result<Option<NodeId>, PluginError>;

pub struct Plugin {
    name: String,
    transform: Box<TransformFn>,
}

impl Plugin {
    pub fn new<F>(name: impl Into<String>, transform: F) -> Self
    where
        F: FnMut(
                &mut ProgramEdit<'_>,
                &TransformOptions<'_>,
                &mut PluginContext,
            ) -> Result<Option<NodeId>, PluginError>
            + 'static,
    {
        Plugin {
            name: name.into(),
            transform: Box::new(transform),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Plugins in application order.
#[derive(Debug, Default)]
pub struct Pipeline {
    plugins: Vec<Plugin>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, plugin: Plugin) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn push(&mut self, plugin: Plugin) {
        self.plugins.push(plugin);
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(Plugin::name)
    }

    /// Run every plugin over one program, in order. The program's final
    /// root is left in `edit`.
    pub(crate) fn apply(
        &mut self,
        edit: &mut ProgramEdit<'_>,
        stage: Stage,
        plugin_cx: &mut PluginContext,
        report: &mut PipelineReport,
    ) -> EngineResult<()> {
        let is_main_program = edit.is_main();
        for plugin in &mut self.plugins {
            let before = edit.root();
            let name = edit.program.name.clone();
            let options = TransformOptions {
                stage,
                is_main_program,
                name: &name,
            };

            (plugin.transform)(edit, &options, plugin_cx)
                .and_then(|root| root.map_or(Ok(()), |root| edit.set_ast(root)))
                .map_err(|err| plugin_failure(&plugin.name, err))?;

            let changed = edit.root() != before;
            tracing::debug!(
                plugin = %plugin.name,
                program = %edit.id(),
                is_main_program,
                changed,
                "transform applied"
            );
            report.invocations.push(Invocation {
                program: edit.id(),
                plugin: plugin.name.clone(),
                is_main_program,
                changed,
            });
        }
        Ok(())
    }
}

/// IR failures keep their own error class; everything else is blamed on
/// the plugin.
fn plugin_failure(plugin: &str, err: PluginError) -> EngineError {
    match err {
        PluginError::Ir(IrError::Rejected { .. }) | PluginError::Failed(_) => {
            EngineError::Transform {
                plugin: plugin.to_owned(),
                source: err,
            }
        }
        PluginError::Ir(err) => EngineError::from(err),
    }
}

/// One program as seen by a transform.
///
/// The whole arena is writable, but only this program's root can be
/// replaced. Other programs are readable through
/// [`program`](Self::program); dependencies already carry their rewritten
/// trees.
pub struct ProgramEdit<'a> {
    program: &'a Program,
    graph: &'a ProgramGraph,
    arena: &'a mut NodeArena,
    root: NodeId,
}

impl<'a> ProgramEdit<'a> {
    pub(crate) fn new(
        program: &'a Program,
        graph: &'a ProgramGraph,
        arena: &'a mut NodeArena,
    ) -> Self {
        ProgramEdit {
            root: program.root(),
            program,
            graph,
            arena,
        }
    }

    pub fn id(&self) -> ProgramId {
        self.program.id()
    }

    pub fn name(&self) -> &str {
        &self.program.name
    }

    pub fn path(&self) -> &Path {
        &self.program.path
    }

    pub fn is_main(&self) -> bool {
        self.graph.main_id() == self.program.id()
    }

    /// Current root, including replacements made during this edit.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn ast(&self) -> Result<NodeRef<'_>, IrError> {
        self.arena.handle(self.root)
    }

    pub fn arena(&self) -> &NodeArena {
        self.arena
    }

    pub fn arena_mut(&mut self) -> &mut NodeArena {
        self.arena
    }

    pub fn graph(&self) -> &ProgramGraph {
        self.graph
    }

    /// Tree of another program, by name.
    pub fn program(&self, name: &str) -> Option<NodeRef<'_>> {
        let program = self.graph.find_by_name(name)?;
        self.arena.handle(program.root()).ok()
    }

    /// Install a new tree for this program.
    pub fn set_ast(&mut self, root: NodeId) -> Result<(), PluginError> {
        let kind = self.arena.try_get(root)?.kind();
        if kind != NodeKind::Module {
            return Err(IrError::rejected(format!(
                "a program root must be a Module, not a {kind}"
            ))
            .into());
        }
        self.root = root;
        Ok(())
    }

    /// Rewrite the whole tree and install the result. Returns whether
    /// anything changed.
    pub fn rewrite<R: Rewriter + ?Sized>(&mut self, rewriter: &mut R) -> Result<bool, PluginError> {
        let before = self.root;
        let after = rewrite_tree(self.arena, before, rewriter)?;
        self.set_ast(after)?;
        Ok(after != before)
    }
}

/// One transform applied to one program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: ProgramId,
    pub plugin: String,
    pub is_main_program: bool,
    /// Whether the program's root differs after the transform.
    pub changed: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// In execution order.
    pub invocations: Vec<Invocation>,
    /// Tracker update per program, in execution order.
    pub linkage: Vec<(ProgramId, LinkageUpdate)>,
    /// Whether the pipeline ended with a recheck.
    pub rechecked: bool,
}

impl PipelineReport {
    /// Programs at least one transform changed, in execution order.
    pub fn changed_programs(&self) -> Vec<ProgramId> {
        let mut programs = Vec::new();
        for invocation in self.invocations.iter().filter(|i| i.changed) {
            if !programs.contains(&invocation.program) {
                programs.push(invocation.program);
            }
        }
        programs
    }
}
