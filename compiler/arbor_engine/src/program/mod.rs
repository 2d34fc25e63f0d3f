//! Programs and the dependency graph between them.

use std::fmt;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use arbor_ir::NodeId;

/// Index of a program in its [`ProgramGraph`].
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct ProgramId(u32);

impl ProgramId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        ProgramId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "program#{}", self.0)
    }
}

/// One compiled unit: a module tree plus what it was loaded from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    id: ProgramId,
    /// Module name as written by importers, e.g. `main`, `./lib`, `std/prelude`.
    pub name: String,
    pub path: PathBuf,
    root: NodeId,
    dependencies: Vec<ProgramId>,
    /// Standard-library programs are never handed to plugins.
    pub is_stdlib: bool,
    /// Per-file output override from the host configuration.
    pub output: Option<PathBuf>,
}

impl Program {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, root: NodeId) -> Self {
        Program {
            id: ProgramId(0),
            name: name.into(),
            path: path.into(),
            root,
            dependencies: Vec::new(),
            is_stdlib: false,
            output: None,
        }
    }

    #[must_use]
    pub fn stdlib(mut self) -> Self {
        self.is_stdlib = true;
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    /// Current module node. Replaced when a plugin installs a new tree.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Programs this one imports, in first-import order.
    pub fn dependencies(&self) -> &[ProgramId] {
        &self.dependencies
    }
}

/// Every program of one context. The first program added is the main one
/// unless [`set_main`](Self::set_main) says otherwise.
#[derive(Clone, Debug, Default)]
pub struct ProgramGraph {
    programs: Vec<Program>,
    main: ProgramId,
}

impl ProgramGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mut program: Program) -> ProgramId {
        let id = ProgramId(u32::try_from(self.programs.len()).unwrap_or(u32::MAX));
        program.id = id;
        self.programs.push(program);
        id
    }

    /// Record that `from` imports `to`. Duplicate and self edges are ignored.
    pub fn add_dependency(&mut self, from: ProgramId, to: ProgramId) {
        if from == to {
            return;
        }
        if let Some(program) = self.programs.get_mut(from.index()) {
            if !program.dependencies.contains(&to) {
                program.dependencies.push(to);
            }
        }
    }

    pub fn set_main(&mut self, main: ProgramId) {
        self.main = main;
    }

    pub fn main_id(&self) -> ProgramId {
        self.main
    }

    pub fn main(&self) -> Option<&Program> {
        self.get(self.main)
    }

    pub fn get(&self, id: ProgramId) -> Option<&Program> {
        self.programs.get(id.index())
    }

    pub(crate) fn set_root(&mut self, id: ProgramId, root: NodeId) {
        if let Some(program) = self.programs.get_mut(id.index()) {
            program.root = root;
        }
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Program> {
        self.programs.iter()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Program> {
        self.programs.iter().find(|p| p.name == name)
    }

    pub fn find_by_path(&self, path: &Path) -> Option<&Program> {
        self.programs.iter().find(|p| p.path == path)
    }

    /// Every program except the main one, each after the programs it
    /// depends on.
    ///
    /// Programs reachable from main come first in post-order; unreachable
    /// ones follow, again in post-order. An import cycle is broken at the
    /// edge that closes it.
    pub fn dependency_order(&self) -> Vec<ProgramId> {
        let mut order = Vec::with_capacity(self.programs.len());
        let mut visited = FxHashSet::default();

        let starts = std::iter::once(self.main).chain(self.programs.iter().map(Program::id));
        for start in starts {
            self.post_order_from(start, &mut visited, &mut order);
        }
        order.retain(|&id| id != self.main);
        order
    }

    fn post_order_from(
        &self,
        start: ProgramId,
        visited: &mut FxHashSet<ProgramId>,
        order: &mut Vec<ProgramId>,
    ) {
        if self.get(start).is_none() || !visited.insert(start) {
            return;
        }
        // (program, index of the next dependency to visit)
        let mut stack = vec![(start, 0usize)];
        while let Some((id, next)) = stack.last_mut() {
            let dependencies = self.programs[id.index()].dependencies.as_slice();
            if let Some(&dependency) = dependencies.get(*next) {
                *next += 1;
                if self.get(dependency).is_some() && visited.insert(dependency) {
                    stack.push((dependency, 0));
                }
            } else {
                order.push(*id);
                stack.pop();
            }
        }
    }
}
