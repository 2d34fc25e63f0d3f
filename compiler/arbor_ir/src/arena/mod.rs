//! Append-only node storage owned by one compilation context.
//!
//! Nodes are never mutated or freed individually; the whole arena goes away
//! with its context. Each arena draws a fresh generation from a process-wide
//! counter and stamps it into every [`NodeId`] it hands out, so an id can
//! only ever be dereferenced against the arena that created it.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::{
    IrError, IrResult, Name, Node, NodeData, NodeFlags, NodeId, NodeKind, NodeRef, Span,
    StringInterner,
};

static NEXT_GENERATION: AtomicU32 = AtomicU32::new(1);

/// Storage for every node of one compilation context.
pub struct NodeArena {
    generation: u32,
    nodes: Vec<Node>,
    interner: StringInterner,
}

impl NodeArena {
    /// Create an empty arena with a fresh generation.
    pub fn new() -> Self {
        NodeArena {
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            nodes: Vec::with_capacity(1024),
            interner: StringInterner::new(),
        }
    }

    /// Generation stamped into every id from this arena.
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Number of allocated nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if no node has been allocated yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` was allocated by this arena.
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        id.generation() == self.generation && id.index() < self.nodes.len()
    }

    /// Checked lookup.
    pub fn try_get(&self, id: NodeId) -> IrResult<&Node> {
        if id.generation() != self.generation {
            return Err(IrError::StaleHandle(id));
        }
        self.nodes.get(id.index()).ok_or(IrError::StaleHandle(id))
    }

    /// Lookup for ids already known to come from this arena: handles and
    /// ids read out of node data.
    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> &Node {
        debug_assert_eq!(id.generation(), self.generation, "foreign {id:?}");
        &self.nodes[id.index()]
    }

    /// Kind of a node.
    #[inline]
    pub fn kind(&self, id: NodeId) -> IrResult<NodeKind> {
        Ok(self.try_get(id)?.kind())
    }

    /// Create a typed handle.
    ///
    /// The handle borrows this arena: it cannot outlive the context that
    /// owns the arena, so dereferencing a handle after the context is
    /// destroyed does not compile. Ids stored elsewhere (side tables,
    /// plugin state) are re-validated here.
    pub fn handle(&self, id: NodeId) -> IrResult<NodeRef<'_>> {
        self.try_get(id)?;
        Ok(NodeRef::new(id, self))
    }

    /// Allocate a node after checking every child against its slot.
    pub fn alloc(&mut self, data: NodeData, span: Span, flags: NodeFlags) -> IrResult<NodeId> {
        for (child, slot) in data.children() {
            let found = self.try_get(child)?.kind();
            if !found.fits(slot) {
                return Err(IrError::StructuralMismatch {
                    expected: slot,
                    found,
                });
            }
        }
        Ok(self.push(Node { data, span, flags }))
    }

    /// Replace the data of `original`, keeping its span and flags.
    pub fn update(&mut self, original: NodeId, data: NodeData) -> IrResult<NodeId> {
        let (span, flags) = {
            let node = self.try_get(original)?;
            (node.span, node.flags)
        };
        self.alloc(data, span, flags)
    }

    /// Copy `original` with different flags.
    pub fn with_flags(&mut self, original: NodeId, flags: NodeFlags) -> IrResult<NodeId> {
        let node = self.try_get(original)?;
        let copy = Node {
            data: node.data.clone(),
            span: node.span,
            flags,
        };
        Ok(self.push(copy))
    }

    fn push(&mut self, node: Node) -> NodeId {
        let index = u32::try_from(self.nodes.len()).unwrap_or(u32::MAX);
        self.nodes.push(node);
        NodeId::new(index, self.generation)
    }

    fn leaf(&mut self, data: NodeData) -> NodeId {
        self.push(Node {
            data,
            span: Span::DUMMY,
            flags: NodeFlags::empty(),
        })
    }

    // Strings

    /// Intern a string.
    pub fn intern(&mut self, text: &str) -> Name {
        self.interner.intern(text)
    }

    /// Text of an interned name.
    pub fn name_str(&self, name: Name) -> &str {
        self.interner.lookup(name)
    }

    /// The arena's interner.
    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Text of an identifier or string literal node.
    pub fn text_of(&self, id: NodeId) -> Option<&str> {
        match self.try_get(id).ok()?.data {
            NodeData::Identifier { name } => Some(self.name_str(name)),
            NodeData::StringLiteral { value } => Some(self.name_str(value)),
            _ => None,
        }
    }

    // Builders for synthesized nodes. They carry `Span::DUMMY`.

    /// `name`
    pub fn identifier(&mut self, name: &str) -> NodeId {
        let name = self.intern(name);
        self.leaf(NodeData::Identifier { name })
    }

    /// `"value"`
    pub fn string_literal(&mut self, value: &str) -> NodeId {
        let value = self.intern(value);
        self.leaf(NodeData::StringLiteral { value })
    }

    /// `42`
    pub fn number_literal(&mut self, value: f64) -> NodeId {
        self.leaf(NodeData::NumberLiteral {
            bits: value.to_bits(),
        })
    }

    /// `true` / `false`
    pub fn boolean_literal(&mut self, value: bool) -> NodeId {
        self.leaf(NodeData::BooleanLiteral { value })
    }

    /// `imported as local`, or just `imported` when both names match.
    pub fn import_specifier(&mut self, imported: &str, local: &str) -> NodeId {
        let imported = self.identifier(imported);
        let local = self.identifier(local);
        self.leaf(NodeData::ImportSpecifier { imported, local })
    }

    /// `import { specifiers } from "source"`
    pub fn import_declaration(&mut self, source: &str, specifiers: Vec<NodeId>) -> IrResult<NodeId> {
        let source = self.string_literal(source);
        self.alloc(
            NodeData::ImportDeclaration { source, specifiers },
            Span::DUMMY,
            NodeFlags::empty(),
        )
    }

    /// `callee(arguments)`
    pub fn call(&mut self, callee: NodeId, arguments: Vec<NodeId>) -> IrResult<NodeId> {
        self.alloc(
            NodeData::CallExpression { callee, arguments },
            Span::DUMMY,
            NodeFlags::empty(),
        )
    }

    /// Wrap an expression as a statement.
    pub fn expression_statement(&mut self, expression: NodeId) -> IrResult<NodeId> {
        self.alloc(
            NodeData::ExpressionStatement { expression },
            Span::DUMMY,
            NodeFlags::empty(),
        )
    }

    /// Copy of a module or block with a new statement list.
    pub fn with_statements(&mut self, original: NodeId, statements: Vec<NodeId>) -> IrResult<NodeId> {
        let data = match self.try_get(original)?.data {
            NodeData::Module { .. } => NodeData::Module { statements },
            NodeData::Block { .. } => NodeData::Block { statements },
            ref other => {
                return Err(IrError::rejected(format!(
                    "{} has no statement list",
                    other.kind()
                )))
            }
        };
        self.update(original, data)
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NodeArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeArena")
            .field("generation", &self.generation)
            .field("nodes", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
