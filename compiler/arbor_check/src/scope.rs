//! Lexical scope stack.

use rustc_hash::FxHashMap;

use arbor_ir::{Name, NodeId};

/// Innermost-last stack of name tables.
#[derive(Default)]
pub(crate) struct ScopeStack {
    scopes: Vec<FxHashMap<Name, NodeId>>,
}

impl ScopeStack {
    pub(crate) fn push(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub(crate) fn pop(&mut self) {
        self.scopes.pop();
    }

    /// Bind `name` in the innermost scope. Returns the earlier binding when
    /// the name is already declared there; the earlier binding wins.
    pub(crate) fn declare(&mut self, name: Name, node: NodeId) -> Option<NodeId> {
        let scope = self.scopes.last_mut()?;
        match scope.get(&name) {
            Some(&previous) => Some(previous),
            None => {
                scope.insert(name, node);
                None
            }
        }
    }

    pub(crate) fn lookup(&self, name: Name) -> Option<NodeId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name).copied())
    }
}
