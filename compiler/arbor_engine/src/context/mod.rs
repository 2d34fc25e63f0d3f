//! The compilation context.
//!
//! A [`Context`] exclusively owns one [`CompilerService`] together with
//! the program graph it loaded, the linkage tracker and the current stage.
//! Every engine operation goes through `&mut Context`, so operations never
//! overlap and no global state exists.
//!
//! The service is disposed exactly once: by [`Context::destroy`], or by
//! `Drop` when the context goes out of scope on any other path.

mod recheck;

use std::sync::Arc;

use arbor_diagnostic::Diagnostic;
use arbor_ir::{NodeArena, NodeId, NodeKind, NodeRef};

use crate::pipeline::ProgramEdit;
use crate::{
    CompilerService, EmittedUnit, EngineError, EngineResult, HostConfig, LinkageTracker,
    LinkageUpdate, Pipeline, PipelineReport, PluginContext, Program, ProgramGraph, ProgramId,
    Stage, StageController,
};

pub struct Context<S: CompilerService> {
    service: S,
    graph: ProgramGraph,
    stage: StageController,
    tracker: LinkageTracker,
    config: Arc<HostConfig>,
    /// Diagnostics of the last check or recheck.
    diagnostics: Vec<(ProgramId, Diagnostic)>,
    emitted: Vec<EmittedUnit>,
    /// Trees changed since the last check.
    dirty: bool,
    disposed: bool,
}

impl<S: CompilerService> Context<S> {
    /// Load every configured program and start at [`Stage::Parsed`].
    ///
    /// The service is disposed if loading fails.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn create(mut service: S, config: impl Into<Arc<HostConfig>>) -> EngineResult<Self> {
        let config = config.into();
        let graph = match service.load(&config) {
            Ok(graph) => graph,
            Err(err) => {
                service.dispose();
                return Err(err.into());
            }
        };

        let mut cx = Context {
            service,
            graph,
            stage: StageController::new(),
            tracker: LinkageTracker::new(config.stdlib_prefixes.clone()),
            config,
            diagnostics: Vec::new(),
            emitted: Vec::new(),
            dirty: false,
            disposed: false,
        };
        cx.refresh_linkage()?;
        tracing::debug!(
            programs = cx.graph.len(),
            bindings = cx.tracker.len(),
            "context created"
        );
        Ok(cx)
    }

    /// Dispose the service now instead of at the end of the scope.
    pub fn destroy(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.service.dispose();
            tracing::debug!("context destroyed");
        }
    }

    #[inline]
    pub fn stage(&self) -> Stage {
        self.stage.current()
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn graph(&self) -> &ProgramGraph {
        &self.graph
    }

    pub fn programs(&self) -> impl Iterator<Item = &Program> {
        self.graph.iter()
    }

    pub fn program(&self, id: ProgramId) -> EngineResult<&Program> {
        self.graph.get(id).ok_or(EngineError::UnknownProgram(id))
    }

    pub fn main_program(&self) -> EngineResult<&Program> {
        self.program(self.graph.main_id())
    }

    pub fn tracker(&self) -> &LinkageTracker {
        &self.tracker
    }

    /// Diagnostics of the last check or recheck.
    pub fn diagnostics(&self) -> &[(ProgramId, Diagnostic)] {
        &self.diagnostics
    }

    /// Units produced on reaching [`Stage::BinaryGenerated`].
    pub fn emitted(&self) -> &[EmittedUnit] {
        &self.emitted
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Fresh plugin state sharing this context's configuration.
    pub fn plugin_context(&self) -> PluginContext {
        PluginContext::new(Arc::clone(&self.config))
    }

    pub fn arena(&self) -> &NodeArena {
        self.service.arena()
    }

    /// Write access to node storage for edits outside a pipeline. Call
    /// [`set_ast`](Self::set_ast) to install the result.
    pub fn arena_mut(&mut self) -> EngineResult<&mut NodeArena> {
        self.stage.ensure_editable("edit the syntax tree")?;
        Ok(self.service.arena_mut())
    }

    /// Typed handle for `id`.
    ///
    /// The handle borrows this context: it cannot be used once the context
    /// is destroyed. An id from another context is rejected here.
    pub fn node(&self, id: NodeId) -> EngineResult<NodeRef<'_>> {
        Ok(self.service.arena().handle(id)?)
    }

    /// Current tree of a program.
    pub fn root(&self, program: ProgramId) -> EngineResult<NodeRef<'_>> {
        self.node(self.program(program)?.root())
    }

    /// Parent of `node` as of the last subtree update.
    pub fn parent_of(&self, node: NodeId) -> EngineResult<Option<NodeRef<'_>>> {
        self.node(node)?;
        Ok(self.service.parent_of(node).and_then(|p| self.arena().handle(p).ok()))
    }

    /// Declaration an identifier use resolved to in the last check.
    pub fn declaration_of(&self, reference: NodeId) -> EngineResult<Option<NodeRef<'_>>> {
        self.node(reference)?;
        Ok(self
            .service
            .declaration_of(reference)
            .and_then(|d| self.arena().handle(d).ok()))
    }

    /// Replace the tree of one program.
    pub fn set_ast(&mut self, program: ProgramId, root: NodeId) -> EngineResult<LinkageUpdate> {
        self.stage.ensure_editable("replace a program tree")?;
        let is_stdlib = self.program(program)?.is_stdlib;
        let kind = self.node(root)?.kind();
        if kind != NodeKind::Module {
            return Err(EngineError::Rejected {
                message: format!("a program root must be a Module, not a {kind}"),
            });
        }

        self.graph.set_root(program, root);
        let update = if is_stdlib {
            LinkageUpdate::default()
        } else {
            self.tracker.update(program, self.service.arena().handle(root)?)
        };
        self.service.update_subtree(root)?;
        self.dirty = true;
        Ok(update)
    }

    /// Advance to `target`, running every stage in between.
    ///
    /// Reaching `Checked` runs semantic analysis and linkage resolution;
    /// if it reports errors the context stays at `Checked` and the call
    /// fails with [`EngineError::BuildFailed`]. Reaching `BinaryGenerated`
    /// emits every program, rechecking first if trees changed since the
    /// last check; a check that left errors blocks emission. Moving
    /// backward fails before the service is called.
    #[tracing::instrument(level = "debug", skip_all, fields(from = %self.stage(), to = %target))]
    pub fn proceed_to(&mut self, target: Stage) -> EngineResult<()> {
        for stage in self.stage.plan(target)? {
            match stage {
                Stage::Parsed => {}
                Stage::Checked => self.analyze()?,
                Stage::BinaryGenerated => self.emit()?,
            }
        }
        Ok(())
    }

    fn emit(&mut self) -> EngineResult<()> {
        if self.dirty {
            self.analyze()?;
        }
        self.ensure_buildable()?;
        let units = self.service.emit(&self.graph)?;
        tracing::debug!(units = units.len(), "programs emitted");
        self.emitted = units;
        self.stage.enter(Stage::BinaryGenerated);
        Ok(())
    }

    /// Apply `pipeline` to every non-stdlib program: dependencies first,
    /// the main program last. After each program the tracker and the
    /// service's parent links are brought up to date. At `Checked` the
    /// run ends with one [`recheck`](Self::recheck).
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(stage = %self.stage(), plugins = pipeline.len())
    )]
    pub fn run_pipeline(
        &mut self,
        pipeline: &mut Pipeline,
        plugin_cx: &mut PluginContext,
    ) -> EngineResult<PipelineReport> {
        self.stage.ensure_editable("run plugins")?;
        let stage = self.stage.current();
        let main = self.graph.main_id();

        let mut order: Vec<ProgramId> = self
            .graph
            .dependency_order()
            .into_iter()
            .filter(|&id| self.graph.get(id).is_some_and(|p| !p.is_stdlib))
            .collect();
        order.push(main);

        let mut report = PipelineReport::default();
        for id in order {
            let program = self.graph.get(id).ok_or(EngineError::UnknownProgram(id))?;
            let original = program.root();
            let mut edit = ProgramEdit::new(program, &self.graph, self.service.arena_mut());
            pipeline.apply(&mut edit, stage, plugin_cx, &mut report)?;
            let root = edit.root();

            if root != original {
                self.dirty = true;
            }
            self.graph.set_root(id, root);
            let update = self.tracker.update(id, self.service.arena().handle(root)?);
            report.linkage.push((id, update));
            self.service.update_subtree(root)?;
        }

        if stage == Stage::Checked {
            self.recheck()?;
            report.rechecked = true;
        }
        Ok(report)
    }

    /// Redo semantic analysis of the whole graph after edits.
    ///
    /// Legal only at `Checked`; the stage stays `Checked`. `BinaryGenerated`
    /// is terminal, so a recheck there fails with
    /// [`EngineError::StageViolation`] even though it is past `Checked`.
    /// Every binding that resolved before must still resolve afterwards,
    /// otherwise the call fails with [`EngineError::LinkageRegression`].
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn recheck(&mut self) -> EngineResult<()> {
        self.stage.ensure_recheckable()?;
        self.analyze()
    }

    /// Deterministic source text of a program.
    pub fn dump_src(&self, program: ProgramId) -> EngineResult<String> {
        let root = self.program(program)?.root();
        Ok(self.service.dump_src(root)?)
    }

    /// Structured dump of a program.
    pub fn dump_json(&self, program: ProgramId) -> EngineResult<String> {
        let root = self.program(program)?.root();
        Ok(self.service.dump_json(root)?)
    }

    fn refresh_linkage(&mut self) -> EngineResult<()> {
        for program in self.graph.iter().filter(|p| !p.is_stdlib) {
            let module = self.service.arena().handle(program.root())?;
            self.tracker.update(program.id(), module);
        }
        Ok(())
    }
}

impl<S: CompilerService> Drop for Context<S> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Create a context, run `f`, and destroy the context whatever `f`
/// returns.
pub fn with_context<S, T>(
    service: S,
    config: impl Into<Arc<HostConfig>>,
    f: impl FnOnce(&mut Context<S>) -> EngineResult<T>,
) -> EngineResult<T>
where
    S: CompilerService,
{
    let mut cx = Context::create(service, config)?;
    let result = f(&mut cx);
    cx.destroy();
    result
}
