//! Semantic analysis of the whole graph, shared by the first check and
//! every recheck.

use crate::{BuildFailure, CompilerService, Context, EngineError, EngineResult, Stage};

impl<S: CompilerService> Context<S> {
    /// 1. bring the tracker up to date with the current trees
    /// 2. remember which bindings resolve now
    /// 3. drop every resolution and every semantic annotation
    /// 4. check each program, then resolve linkage
    ///
    /// The stage is `Checked` afterwards even when the analysis fails.
    pub(super) fn analyze(&mut self) -> EngineResult<()> {
        self.refresh_linkage()?;
        let previously_resolved = self.tracker.resolved_keys();
        let cleared = self.tracker.reset_resolutions();
        self.service.reset_semantics();

        let mut diagnostics = self.service.check(&self.graph);
        let (service, graph) = (&self.service, &self.graph);
        diagnostics.extend(self.tracker.resolve(service.arena(), graph, |from, specifier| {
            service.resolve_module(graph, from, specifier)
        }));

        self.stage.enter(Stage::Checked);
        self.dirty = false;

        let regressions: Vec<_> = previously_resolved
            .into_iter()
            .filter(|(program, key)| {
                self.tracker
                    .binding(*program, key)
                    .is_some_and(|binding| !binding.is_resolved())
            })
            .collect();
        let errors = diagnostics.iter().filter(|(_, d)| d.is_error()).count();
        tracing::debug!(
            cleared,
            bindings = self.tracker.len(),
            unresolved = self.tracker.unresolved_keys().len(),
            diagnostics = diagnostics.len(),
            errors,
            regressions = regressions.len(),
            "semantic analysis finished"
        );
        self.diagnostics = diagnostics;

        if !regressions.is_empty() {
            return Err(EngineError::LinkageRegression {
                bindings: regressions,
            });
        }
        self.ensure_buildable()
    }

    /// Fails with the kept diagnostics if the last analysis found errors.
    pub(super) fn ensure_buildable(&self) -> EngineResult<()> {
        match BuildFailure::from_diagnostics(&self.diagnostics) {
            Some(failure) => Err(EngineError::BuildFailed(failure)),
            None => Ok(()),
        }
    }
}
