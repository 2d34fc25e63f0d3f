//! [`CompilerService`] backed by the arbor parser, checker and emitter.

mod resolve;

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use arbor_check::{Globals, SemanticModel};
use arbor_diagnostic::{Diagnostic, DiagnosticConfig};
use arbor_engine::{
    CompilerService, EmittedUnit, HostConfig, Program, ProgramGraph, ProgramId, ServiceError,
};
use arbor_ir::{IrResult, NodeArena, NodeData, NodeId};

use crate::prelude::{PRELUDE_NAME, PRELUDE_SOURCE};
use crate::sources::{normalize, FsSources, SourceProvider};

pub(crate) use resolve::candidates;

/// Extension of emitted unit files.
pub const UNIT_EXTENSION: &str = "abc";

/// Compiler service for one context.
///
/// Owns the node arena of every loaded program, the parent table and the
/// semantic model of the last check.
pub struct LocalService<P = FsSources> {
    provider: P,
    config: HostConfig,
    arena: NodeArena,
    parents: FxHashMap<NodeId, NodeId>,
    model: SemanticModel,
    disposed: bool,
}

impl LocalService<FsSources> {
    /// Service reading sources from disk.
    pub fn from_fs() -> Self {
        Self::new(FsSources)
    }
}

impl<P: SourceProvider> LocalService<P> {
    pub fn new(provider: P) -> Self {
        LocalService {
            provider,
            config: HostConfig::default(),
            arena: NodeArena::new(),
            parents: FxHashMap::default(),
            model: SemanticModel::default(),
            disposed: false,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// References resolved by the last check.
    pub fn semantic_model(&self) -> &SemanticModel {
        &self.model
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn parse_file(&mut self, path: &Path) -> Result<NodeId, ServiceError> {
        let text = self.provider.read(path).map_err(|source| ServiceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        arbor_parse::parse(&text, &mut self.arena).map_err(|diagnostics| ServiceError::Parse {
            path: path.to_path_buf(),
            diagnostics,
        })
    }

    /// First existing file an import specifier written in `from` names.
    fn locate(&self, from: &Path, specifier: &str) -> Option<PathBuf> {
        candidates(&self.config, from, specifier)
            .into_iter()
            .find(|path| self.provider.exists(path))
    }

    /// Declarations of the prelude, the global scope of every program.
    fn prelude_globals(&self, graph: &ProgramGraph) -> Globals {
        let mut globals = Globals::default();
        let Some(module) = graph
            .find_by_name(PRELUDE_NAME)
            .and_then(|prelude| self.arena.handle(prelude.root()).ok())
        else {
            return globals;
        };
        for node in module.children() {
            if let Some(name) = node.name().and_then(|name| self.arena.interner().get(name)) {
                globals.insert(name, node.id());
            }
        }
        globals
    }

    /// Where a program's unit goes: the per-file override, else
    /// `<output_path>/<stem>.abc`, else nowhere.
    fn output_path(&self, program: &Program) -> Option<PathBuf> {
        program.output.clone().or_else(|| {
            let dir = self.config.output_path.as_ref()?;
            let mut file = program.path.file_stem()?.to_os_string();
            file.push(".");
            file.push(UNIT_EXTENSION);
            Some(dir.join(file))
        })
    }
}

impl<P: SourceProvider> CompilerService for LocalService<P> {
    #[tracing::instrument(level = "debug", skip_all, fields(files = config.files.len()))]
    fn load(&mut self, config: &HostConfig) -> Result<ProgramGraph, ServiceError> {
        if config.files.is_empty() {
            return Err(ServiceError::NoSources);
        }
        self.config = config.clone();

        let mut graph = ProgramGraph::new();
        let mut queue = VecDeque::new();
        for entry in &config.files {
            let path = normalize(&entry.path);
            if graph.find_by_path(&path).is_some() {
                continue;
            }
            let root = self.parse_file(&path)?;
            let name = path.file_stem().map_or_else(
                || path.display().to_string(),
                |stem| stem.to_string_lossy().into_owned(),
            );
            let program = Program::new(name, path, root).with_output(entry.output.clone());
            queue.push_back(graph.add(program));
        }

        let prelude_root = arbor_parse::parse(PRELUDE_SOURCE, &mut self.arena).map_err(
            |diagnostics| ServiceError::Parse {
                path: PRELUDE_NAME.into(),
                diagnostics,
            },
        )?;
        let prelude = graph.add(Program::new(PRELUDE_NAME, PRELUDE_NAME, prelude_root).stdlib());

        while let Some(id) = queue.pop_front() {
            let Some(importer) = graph.get(id) else {
                continue;
            };
            let from = importer.path.clone();
            let from_stdlib = importer.is_stdlib;
            for specifier in module_specifiers(&self.arena, importer.root())? {
                let Some(path) = self.locate(&from, &specifier) else {
                    tracing::debug!(%specifier, from = %from.display(), "import target not found");
                    continue;
                };
                let to = if let Some(existing) = graph.find_by_path(&path) {
                    existing.id()
                } else {
                    let root = self.parse_file(&path)?;
                    let mut program = Program::new(specifier.as_str(), path, root);
                    if from_stdlib || self.config.is_stdlib(&specifier) {
                        program = program.stdlib();
                    }
                    let to = graph.add(program);
                    queue.push_back(to);
                    to
                };
                graph.add_dependency(id, to);
            }
            graph.add_dependency(id, prelude);
        }

        let roots: Vec<NodeId> = graph.iter().map(Program::root).collect();
        for root in roots {
            self.update_subtree(root)?;
        }
        tracing::debug!(programs = graph.len(), nodes = self.arena.len(), "loaded programs");
        Ok(graph)
    }

    fn arena(&self) -> &NodeArena {
        &self.arena
    }

    fn arena_mut(&mut self) -> &mut NodeArena {
        &mut self.arena
    }

    fn resolve_module(
        &self,
        graph: &ProgramGraph,
        from: ProgramId,
        specifier: &str,
    ) -> Option<ProgramId> {
        let from = graph.get(from)?;
        candidates(&self.config, &from.path, specifier)
            .iter()
            .find_map(|path| graph.find_by_path(path))
            .map(Program::id)
    }

    fn update_subtree(&mut self, root: NodeId) -> Result<(), ServiceError> {
        let module = self.arena.handle(root)?;
        for node in module.descendants() {
            for child in node.children() {
                self.parents.insert(child.id(), node.id());
            }
        }
        Ok(())
    }

    fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.parents.get(&node).copied()
    }

    #[tracing::instrument(level = "debug", skip_all, fields(programs = graph.len()))]
    fn check(&mut self, graph: &ProgramGraph) -> Vec<(ProgramId, Diagnostic)> {
        let globals = self.prelude_globals(graph);
        let limits = DiagnosticConfig {
            error_limit: self.config.error_limit,
            ..DiagnosticConfig::default()
        };
        let mut diagnostics = Vec::new();
        for program in graph.iter() {
            let result = arbor_check::check_program_with(
                &self.arena,
                program.root(),
                &globals,
                limits.clone(),
            );
            diagnostics.extend(result.diagnostics.into_iter().map(|d| (program.id(), d)));
            self.model.extend(result.model);
        }
        diagnostics
    }

    fn reset_semantics(&mut self) {
        self.model.clear();
    }

    fn declaration_of(&self, reference: NodeId) -> Option<NodeId> {
        self.model.resolve(reference)
    }

    #[tracing::instrument(level = "debug", skip_all)]
    fn emit(&mut self, graph: &ProgramGraph) -> Result<Vec<EmittedUnit>, ServiceError> {
        let mut units = Vec::new();
        for program in graph.iter().filter(|program| !program.is_stdlib) {
            let unit = arbor_emit::lower(&self.arena, program.root(), &program.name)?;
            let bytes = arbor_emit::encode(&unit).map_err(|e| ServiceError::Emit {
                path: program.path.clone(),
                message: e.to_string(),
            })?;
            let path = self.output_path(program);
            if let Some(path) = &path {
                write_unit(path, &bytes)?;
            }
            tracing::debug!(
                program = %program.name,
                bytes = bytes.len(),
                written = path.is_some(),
                "emitted unit"
            );
            units.push(EmittedUnit {
                program: program.id(),
                path,
                bytes,
            });
        }
        Ok(units)
    }

    fn dump_src(&self, root: NodeId) -> Result<String, ServiceError> {
        Ok(arbor_fmt::dump_src(&self.arena, root)?)
    }

    fn dump_json(&self, root: NodeId) -> Result<String, ServiceError> {
        Ok(arbor_fmt::dump_json(&self.arena, root)?)
    }

    fn dispose(&mut self) {
        tracing::debug!(nodes = self.arena.len(), "disposing compiler service");
        self.arena = NodeArena::new();
        self.parents = FxHashMap::default();
        self.model.clear();
        self.disposed = true;
    }
}

/// Import and re-export sources of a module, in statement order.
fn module_specifiers(arena: &NodeArena, root: NodeId) -> IrResult<Vec<String>> {
    let module = arena.handle(root)?;
    Ok(module
        .statements()
        .iter()
        .filter_map(|&statement| match module.at(statement).data() {
            NodeData::ImportDeclaration { source, .. }
            | NodeData::ExportNamedDeclaration {
                source: Some(source),
                ..
            } => module.at(*source).text().map(str::to_owned),
            _ => None,
        })
        .collect())
}

fn write_unit(path: &Path, bytes: &[u8]) -> Result<(), ServiceError> {
    let emit_error = |e: std::io::Error| ServiceError::Emit {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(emit_error)?;
    }
    std::fs::write(path, bytes).map_err(emit_error)
}
