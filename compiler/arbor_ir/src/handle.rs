//! Typed, borrow-checked views of arena nodes.

use std::fmt;

use crate::{IrResult, Node, NodeArena, NodeData, NodeFlags, NodeId, NodeKind, Span};

/// A node identity paired with the arena that owns it.
///
/// `NodeRef` is `Copy` and cheap; it exists only as long as the borrow of
/// its arena, which in turn is borrowed from the compilation context. A
/// handle therefore cannot be used after its context is destroyed.
#[derive(Copy, Clone)]
pub struct NodeRef<'a> {
    id: NodeId,
    arena: &'a NodeArena,
}

macro_rules! kind_predicates {
    ($($method:ident => $kind:ident),* $(,)?) => {
        $(
            #[doc = concat!("Whether this is a `", stringify!($kind), "` node.")]
            #[inline]
            pub fn $method(self) -> bool {
                self.kind() == NodeKind::$kind
            }
        )*
    };
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(id: NodeId, arena: &'a NodeArena) -> Self {
        NodeRef { id, arena }
    }

    /// Identity of this node.
    #[inline]
    pub fn id(self) -> NodeId {
        self.id
    }

    /// The arena this handle borrows.
    #[inline]
    pub fn arena(self) -> &'a NodeArena {
        self.arena
    }

    /// Full arena entry.
    #[inline]
    pub fn node(self) -> &'a Node {
        self.arena.get(self.id)
    }

    #[inline]
    pub fn kind(self) -> NodeKind {
        self.node().kind()
    }

    #[inline]
    pub fn data(self) -> &'a NodeData {
        &self.node().data
    }

    #[inline]
    pub fn span(self) -> Span {
        self.node().span
    }

    #[inline]
    pub fn flags(self) -> NodeFlags {
        self.node().flags
    }

    kind_predicates! {
        is_module => Module,
        is_import_declaration => ImportDeclaration,
        is_import_specifier => ImportSpecifier,
        is_import_default_specifier => ImportDefaultSpecifier,
        is_import_namespace_specifier => ImportNamespaceSpecifier,
        is_export_named_declaration => ExportNamedDeclaration,
        is_export_specifier => ExportSpecifier,
        is_function_declaration => FunctionDeclaration,
        is_class_declaration => ClassDeclaration,
        is_method_definition => MethodDefinition,
        is_parameter => Parameter,
        is_variable_declaration => VariableDeclaration,
        is_block => Block,
        is_return_statement => ReturnStatement,
        is_expression_statement => ExpressionStatement,
        is_call_expression => CallExpression,
        is_member_expression => MemberExpression,
        is_new_expression => NewExpression,
        is_identifier => Identifier,
        is_string_literal => StringLiteral,
        is_number_literal => NumberLiteral,
        is_boolean_literal => BooleanLiteral,
    }

    /// Handle to a node whose id was read out of this arena's node data,
    /// such as a child of `self`.
    ///
    /// # Panics
    ///
    /// Panics if `id` belongs to another arena. Use [`try_at`](Self::try_at)
    /// for ids that came from anywhere else.
    #[inline]
    pub fn at(self, id: NodeId) -> NodeRef<'a> {
        assert!(self.arena.contains(id), "{id:?} does not belong to this arena");
        NodeRef::new(id, self.arena)
    }

    /// Checked handle to another node of the same arena.
    pub fn try_at(self, id: NodeId) -> IrResult<NodeRef<'a>> {
        self.arena.handle(id)
    }

    /// Direct children in source order.
    pub fn children(self) -> impl Iterator<Item = NodeRef<'a>> {
        self.data()
            .children()
            .into_iter()
            .map(move |(id, _)| self.at(id))
    }

    /// Statements of a module or block; empty for other kinds.
    pub fn statements(self) -> &'a [NodeId] {
        match self.data() {
            NodeData::Module { statements } | NodeData::Block { statements } => statements,
            _ => &[],
        }
    }

    /// Text of an identifier or string literal.
    pub fn text(self) -> Option<&'a str> {
        self.arena.text_of(self.id)
    }

    /// Declared name: the identifier text of a declaration, parameter or
    /// identifier node.
    pub fn name(self) -> Option<&'a str> {
        match self.data() {
            NodeData::Identifier { .. } => self.text(),
            NodeData::FunctionDeclaration { name, .. }
            | NodeData::ClassDeclaration { name, .. }
            | NodeData::MethodDefinition { name, .. }
            | NodeData::VariableDeclaration { name, .. }
            | NodeData::Parameter { name } => self.arena.text_of(*name),
            _ => None,
        }
    }

    /// Pre-order iterator over this node and everything below it.
    pub fn descendants(self) -> Descendants<'a> {
        Descendants {
            arena: self.arena,
            stack: vec![self.id],
        }
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.arena, other.arena)
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}", self.kind(), self.id)
    }
}

/// Pre-order walk produced by [`NodeRef::descendants`].
pub struct Descendants<'a> {
    arena: &'a NodeArena,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let children = self.arena.get(id).data.children();
        self.stack.extend(children.iter().rev().map(|&(child, _)| child));
        Some(NodeRef::new(id, self.arena))
    }
}
