//! Import/export linkage across programs.
//!
//! For every program the tracker keeps one [`ImportBinding`] per imported
//! name, keyed by `(source, exported)`. Bindings are collected in a single
//! pass over the program's top-level statements and resolved against the
//! [`ExportTable`] of the program the source names.
//!
//! # Lifecycle
//!
//! 1. [`update`](LinkageTracker::update) after a program's tree changed:
//!    new bindings start unresolved, bindings whose import disappeared are
//!    dropped, the rest keep their last resolution.
//! 2. [`reset_resolutions`](LinkageTracker::reset_resolutions) before a
//!    recheck, so no binding points into a tree that was replaced.
//! 3. [`resolve`](LinkageTracker::resolve) during a check.
//!
//! Nothing is repaired automatically. A declaration renamed without its
//! import specifier leaves the binding unresolved, reported as `E3001`.

mod exports;

pub use exports::{ExportTable, ExportTarget};

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};

use arbor_diagnostic::{Diagnostic, ErrorCode};
use arbor_ir::{NodeArena, NodeData, NodeFlags, NodeId, NodeKind, NodeRef, Span};

use crate::{ProgramGraph, ProgramId};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ImportKind {
    /// `import { a as b } from "./m"`
    Named,
    /// `import d from "./m"`
    Default,
    /// `import * as ns from "./m"`
    Namespace,
}

/// Identity of a binding within one program.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct BindingKey {
    pub source: String,
    pub exported: String,
}

impl BindingKey {
    pub fn new(source: impl Into<String>, exported: impl Into<String>) -> Self {
        BindingKey {
            source: source.into(),
            exported: exported.into(),
        }
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` from \"{}\"", self.exported, self.source)
    }
}

/// One imported name and the declaration it resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportBinding {
    pub local: String,
    /// Name in the exporting program; `default` or `*` for default and
    /// namespace imports.
    pub exported: String,
    pub source: String,
    pub kind: ImportKind,
    pub type_only: bool,
    /// The import specifier node that introduced the binding.
    pub specifier: NodeId,
    /// Declaration (or module, for a namespace import) in the exporting
    /// program. `None` until a check resolves it.
    pub resolved: Option<NodeId>,
}

impl ImportBinding {
    pub fn key(&self) -> BindingKey {
        BindingKey::new(self.source.clone(), self.exported.clone())
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }
}

/// Outcome of one [`LinkageTracker::update`].
#[derive(Copy, Clone, Default, Eq, PartialEq, Debug)]
pub struct LinkageUpdate {
    pub added: usize,
    pub removed: usize,
    pub retained: usize,
}

impl LinkageUpdate {
    pub fn is_unchanged(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

type BindingTable = FxHashMap<BindingKey, ImportBinding>;

#[derive(Debug, Default)]
pub struct LinkageTracker {
    stdlib_prefixes: Vec<String>,
    programs: FxHashMap<ProgramId, BindingTable>,
}

impl LinkageTracker {
    /// Imports whose specifier starts with one of `stdlib_prefixes` are not
    /// tracked.
    pub fn new(stdlib_prefixes: Vec<String>) -> Self {
        LinkageTracker {
            stdlib_prefixes,
            programs: FxHashMap::default(),
        }
    }

    fn is_stdlib(&self, specifier: &str) -> bool {
        self.stdlib_prefixes
            .iter()
            .any(|prefix| specifier.starts_with(prefix.as_str()))
    }

    /// Bindings introduced by the import declarations of `module`, in
    /// source order. The first specifier of a repeated key wins.
    pub fn collect(&self, module: NodeRef<'_>) -> Vec<ImportBinding> {
        let mut seen = FxHashSet::default();
        let mut bindings = Vec::new();

        for &statement in module.statements() {
            let node = module.at(statement);
            let NodeData::ImportDeclaration { source, specifiers } = node.data() else {
                continue;
            };
            let source = node.at(*source).text().unwrap_or_default();
            if self.is_stdlib(source) {
                continue;
            }
            let type_only = node.flags().contains(NodeFlags::TYPE_ONLY);

            for &specifier in specifiers {
                let spec = node.at(specifier);
                let (local, exported, kind) = match spec.data() {
                    NodeData::ImportSpecifier { imported, local } => (
                        *local,
                        spec.at(*imported).text().unwrap_or_default(),
                        ImportKind::Named,
                    ),
                    NodeData::ImportDefaultSpecifier { local } => {
                        (*local, "default", ImportKind::Default)
                    }
                    NodeData::ImportNamespaceSpecifier { local } => {
                        (*local, "*", ImportKind::Namespace)
                    }
                    _ => continue,
                };
                if !seen.insert((source, exported)) {
                    continue;
                }
                bindings.push(ImportBinding {
                    local: spec.at(local).text().unwrap_or_default().to_owned(),
                    exported: exported.to_owned(),
                    source: source.to_owned(),
                    kind,
                    type_only,
                    specifier,
                    resolved: None,
                });
            }
        }
        bindings
    }

    /// Recollect the bindings of `program` from its current tree.
    pub fn update(&mut self, program: ProgramId, module: NodeRef<'_>) -> LinkageUpdate {
        let fresh = self.collect(module);
        let previous = self.programs.remove(&program).unwrap_or_default();

        let mut update = LinkageUpdate::default();
        let mut table = BindingTable::default();
        for mut binding in fresh {
            let key = binding.key();
            match previous.get(&key) {
                Some(old) => {
                    binding.resolved = old.resolved;
                    update.retained += 1;
                }
                None => update.added += 1,
            }
            table.insert(key, binding);
        }
        update.removed = previous.keys().filter(|key| !table.contains_key(*key)).count();

        tracing::debug!(
            %program,
            added = update.added,
            removed = update.removed,
            retained = update.retained,
            "linkage updated"
        );
        self.programs.insert(program, table);
        update
    }

    /// Bindings of one program, sorted by key.
    pub fn bindings(&self, program: ProgramId) -> Vec<&ImportBinding> {
        let mut bindings: Vec<&ImportBinding> = self
            .programs
            .get(&program)
            .map(|table| table.values().collect())
            .unwrap_or_default();
        bindings.sort_by(|a, b| (&a.source, &a.exported).cmp(&(&b.source, &b.exported)));
        bindings
    }

    pub fn binding(&self, program: ProgramId, key: &BindingKey) -> Option<&ImportBinding> {
        self.programs.get(&program)?.get(key)
    }

    /// Total number of tracked bindings.
    pub fn len(&self) -> usize {
        self.programs.values().map(|table| table.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every resolved binding, sorted.
    pub fn resolved_keys(&self) -> Vec<(ProgramId, BindingKey)> {
        self.matching(ImportBinding::is_resolved)
    }

    /// Every unresolved binding, sorted.
    pub fn unresolved_keys(&self) -> Vec<(ProgramId, BindingKey)> {
        self.matching(|binding| !binding.is_resolved())
    }

    fn matching(&self, f: impl Fn(&ImportBinding) -> bool) -> Vec<(ProgramId, BindingKey)> {
        let f = &f;
        let mut keys: Vec<_> = self
            .programs
            .iter()
            .flat_map(|(&program, table)| {
                table
                    .iter()
                    .filter(move |&(_, binding)| f(binding))
                    .map(move |(key, _)| (program, key.clone()))
            })
            .collect();
        keys.sort();
        keys
    }

    /// Forget every resolution. Returns how many bindings were resolved.
    pub fn reset_resolutions(&mut self) -> usize {
        let mut cleared = 0;
        for binding in self.programs.values_mut().flat_map(|table| table.values_mut()) {
            if binding.resolved.take().is_some() {
                cleared += 1;
            }
        }
        cleared
    }

    /// Resolve every tracked binding against the current trees.
    ///
    /// `resolve_module` maps an import specifier written in a program to
    /// the program it names. Each failure becomes one diagnostic on the
    /// importing program and leaves the binding unresolved.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn resolve(
        &mut self,
        arena: &NodeArena,
        graph: &ProgramGraph,
        resolve_module: impl Fn(ProgramId, &str) -> Option<ProgramId>,
    ) -> Vec<(ProgramId, Diagnostic)> {
        let mut resolver = Resolver {
            arena,
            graph,
            resolve_module,
            tables: FxHashMap::default(),
        };
        let mut diagnostics = Vec::new();

        let mut programs: Vec<_> = self.programs.iter_mut().collect();
        programs.sort_by_key(|entry| *entry.0);
        for (&program, table) in programs {
            let mut bindings: Vec<_> = table.iter_mut().collect();
            bindings.sort_by(|a, b| a.0.cmp(b.0));
            for (_, binding) in bindings {
                match resolver.resolve(program, binding) {
                    Ok(target) => binding.resolved = Some(target),
                    Err(diagnostic) => {
                        binding.resolved = None;
                        diagnostics.push((program, diagnostic));
                    }
                }
            }
        }

        tracing::debug!(
            bindings = self.len(),
            unresolved = diagnostics.len(),
            "linkage resolved"
        );
        diagnostics
    }
}

/// Why an exported name could not be followed to a declaration.
enum LinkError {
    ModuleNotFound { source: String },
    Missing { module: String, name: String },
    Cycle { name: String },
}

struct Resolver<'a, F> {
    arena: &'a NodeArena,
    graph: &'a ProgramGraph,
    resolve_module: F,
    tables: FxHashMap<ProgramId, ExportTable>,
}

impl<F> Resolver<'_, F>
where
    F: Fn(ProgramId, &str) -> Option<ProgramId>,
{
    fn resolve(&mut self, program: ProgramId, binding: &ImportBinding) -> Result<NodeId, Diagnostic> {
        let span = self
            .arena
            .try_get(binding.specifier)
            .map_or(Span::DUMMY, |node| node.span);

        let result = (self.resolve_module)(program, &binding.source)
            .ok_or_else(|| LinkError::ModuleNotFound {
                source: binding.source.clone(),
            })
            .and_then(|target| match binding.kind {
                ImportKind::Namespace => self.module_root(target, &binding.source),
                ImportKind::Named | ImportKind::Default => {
                    self.follow_export(target, &binding.source, &binding.exported)
                }
            });

        let target = result.map_err(|err| link_diagnostic(err, span))?;
        self.check_kind(binding, target, span)?;
        Ok(target)
    }

    fn module_root(&self, program: ProgramId, source: &str) -> Result<NodeId, LinkError> {
        self.graph
            .get(program)
            .map(|p| p.root())
            .ok_or_else(|| LinkError::Missing {
                module: self.module_name(program, source),
                name: "*".to_owned(),
            })
    }

    /// Follow re-exports until a declaration. `source` is the specifier that
    /// led to `program`.
    fn follow_export(
        &mut self,
        program: ProgramId,
        source: &str,
        name: &str,
    ) -> Result<NodeId, LinkError> {
        let mut visited = FxHashSet::default();
        let mut specifier = source.to_owned();
        let mut current = (program, name.to_owned());
        loop {
            if !visited.insert(current.clone()) {
                return Err(LinkError::Cycle {
                    name: name.to_owned(),
                });
            }
            let (module, name) = &current;
            match self.table(*module).get(name).cloned() {
                Some(ExportTarget::Local(declaration)) => return Ok(declaration),
                Some(ExportTarget::ReExport { source, name }) => {
                    let next = (self.resolve_module)(*module, &source)
                        .ok_or_else(|| LinkError::ModuleNotFound {
                            source: source.clone(),
                        })?;
                    specifier = source;
                    current = (next, name);
                }
                None => {
                    return Err(LinkError::Missing {
                        module: self.module_name(*module, &specifier),
                        name: name.clone(),
                    })
                }
            }
        }
    }

    fn table(&mut self, program: ProgramId) -> &ExportTable {
        let (arena, graph) = (self.arena, self.graph);
        self.tables.entry(program).or_insert_with(|| {
            graph
                .get(program)
                .and_then(|p| arena.handle(p.root()).ok())
                .map(ExportTable::collect)
                .unwrap_or_default()
        })
    }

    /// The program's name, or the specifier that reached it when the graph
    /// does not know it.
    fn module_name(&self, program: ProgramId, specifier: &str) -> String {
        self.graph
            .get(program)
            .map_or_else(|| specifier.to_owned(), |p| p.name.clone())
    }

    /// Named and default imports must land on a declaration; type-only
    /// imports on a class.
    fn check_kind(
        &self,
        binding: &ImportBinding,
        target: NodeId,
        span: Span,
    ) -> Result<(), Diagnostic> {
        let kind = self.arena.try_get(target).map_or(NodeKind::Module, |n| n.kind());
        let fits = match binding.kind {
            ImportKind::Namespace => kind == NodeKind::Module,
            ImportKind::Named | ImportKind::Default if binding.type_only => {
                kind == NodeKind::ClassDeclaration
            }
            ImportKind::Named | ImportKind::Default => matches!(
                kind,
                NodeKind::FunctionDeclaration
                    | NodeKind::ClassDeclaration
                    | NodeKind::VariableDeclaration
            ),
        };
        if fits {
            return Ok(());
        }
        let expected = if binding.type_only { "a class" } else { "a declaration" };
        Err(Diagnostic::error(ErrorCode::E3002)
            .with_message(format!(
                "`{}` from \"{}\" is a {kind}, but this import expects {expected}",
                binding.exported, binding.source
            ))
            .with_label(span, "imported here"))
    }
}

fn link_diagnostic(err: LinkError, span: Span) -> Diagnostic {
    match err {
        LinkError::ModuleNotFound { source } => Diagnostic::error(ErrorCode::E3003)
            .with_message(format!("cannot find module \"{source}\""))
            .with_label(span, "imported here"),
        LinkError::Missing { module, name } => Diagnostic::error(ErrorCode::E3001)
            .with_message(format!("module \"{module}\" has no exported member `{name}`"))
            .with_label(span, "imported here"),
        LinkError::Cycle { name } => Diagnostic::error(ErrorCode::E3004)
            .with_message(format!("re-exports of `{name}` form a cycle"))
            .with_label(span, "imported here"),
    }
}
