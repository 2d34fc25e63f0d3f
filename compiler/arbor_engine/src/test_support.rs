//! In-memory compiler service for engine tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use arbor_diagnostic::Diagnostic;
use arbor_ir::{NodeArena, NodeData, NodeId};

use crate::{
    CompilerService, EmittedUnit, HostConfig, Program, ProgramGraph, ProgramId, ServiceError,
};

/// Calls made to a [`FakeService`], in order.
pub(crate) type CallLog = Rc<RefCell<Vec<&'static str>>>;

/// Parses named sources; a program's name is also its import specifier.
/// No semantic checks beyond linkage.
pub(crate) struct FakeService {
    sources: Vec<(String, String)>,
    arena: NodeArena,
    parents: FxHashMap<NodeId, NodeId>,
    log: CallLog,
}

impl FakeService {
    pub(crate) fn new(sources: &[(&str, &str)]) -> (Self, CallLog) {
        let log = CallLog::default();
        let service = FakeService {
            sources: sources
                .iter()
                .map(|&(name, text)| (name.to_owned(), text.to_owned()))
                .collect(),
            arena: NodeArena::new(),
            parents: FxHashMap::default(),
            log: Rc::clone(&log),
        };
        (service, log)
    }

    fn record(&self, call: &'static str) {
        self.log.borrow_mut().push(call);
    }
}

impl CompilerService for FakeService {
    fn load(&mut self, config: &HostConfig) -> Result<ProgramGraph, ServiceError> {
        self.record("load");
        let mut graph = ProgramGraph::new();
        for (name, text) in &self.sources {
            let root = arbor_parse::parse(text, &mut self.arena).map_err(|diagnostics| {
                ServiceError::Parse {
                    path: name.into(),
                    diagnostics,
                }
            })?;
            let program = Program::new(name.as_str(), name.as_str(), root);
            graph.add(if config.is_stdlib(name) {
                program.stdlib()
            } else {
                program
            });
        }

        let edges: Vec<(ProgramId, ProgramId)> = graph
            .iter()
            .flat_map(|program| {
                let module = self.arena.handle(program.root()).unwrap();
                module
                    .statements()
                    .iter()
                    .filter_map(|&statement| match module.at(statement).data() {
                        NodeData::ImportDeclaration { source, .. } => {
                            module.at(*source).text().map(str::to_owned)
                        }
                        _ => None,
                    })
                    .filter_map(|source| graph.find_by_name(&source).map(Program::id))
                    .map(|to| (program.id(), to))
                    .collect::<Vec<_>>()
            })
            .collect();
        for (from, to) in edges {
            graph.add_dependency(from, to);
        }
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
        _from: ProgramId,
        specifier: &str,
    ) -> Option<ProgramId> {
        graph.find_by_name(specifier).map(Program::id)
    }

    fn update_subtree(&mut self, root: NodeId) -> Result<(), ServiceError> {
        self.record("update_subtree");
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

    fn check(&mut self, _graph: &ProgramGraph) -> Vec<(ProgramId, Diagnostic)> {
        self.record("check");
        Vec::new()
    }

    fn reset_semantics(&mut self) {
        self.record("reset_semantics");
    }

    fn declaration_of(&self, _reference: NodeId) -> Option<NodeId> {
        None
    }

    fn emit(&mut self, graph: &ProgramGraph) -> Result<Vec<EmittedUnit>, ServiceError> {
        self.record("emit");
        Ok(graph
            .iter()
            .filter(|program| !program.is_stdlib)
            .map(|program| EmittedUnit {
                program: program.id(),
                path: None,
                bytes: program.name.as_bytes().to_vec(),
            })
            .collect())
    }

    fn dump_src(&self, root: NodeId) -> Result<String, ServiceError> {
        Ok(arbor_fmt::dump_src(&self.arena, root)?)
    }

    fn dump_json(&self, root: NodeId) -> Result<String, ServiceError> {
        Ok(arbor_fmt::dump_json(&self.arena, root)?)
    }

    fn dispose(&mut self) {
        self.record("dispose");
    }
}
