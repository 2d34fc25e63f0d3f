//! Node identities, kinds, and the closed set of node shapes.
//!
//! A node is an immutable value stored in a [`NodeArena`](crate::NodeArena)
//! and referenced by a [`NodeId`]. "Editing" a tree means allocating new
//! nodes and pointing a parent at them; the old nodes stay valid, which is
//! what makes `visit(n) == n` a cheap identity check.

use std::fmt;

use smallvec::SmallVec;

use crate::{Name, Span};

/// Generation-checked index into a [`NodeArena`](crate::NodeArena).
///
/// The generation identifies the arena (and therefore the compilation
/// context) that allocated the node. Looking an id up in any other arena
/// fails with [`IrError::StaleHandle`](crate::IrError::StaleHandle) instead
/// of silently reading an unrelated node.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    #[inline]
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        NodeId { index, generation }
    }

    /// Position in the owning arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Generation of the owning arena.
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}@{})", self.index, self.generation)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Fieldless discriminant of [`NodeData`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum NodeKind {
    Module,
    ImportDeclaration,
    ImportSpecifier,
    ImportDefaultSpecifier,
    ImportNamespaceSpecifier,
    ExportNamedDeclaration,
    ExportSpecifier,
    FunctionDeclaration,
    ClassDeclaration,
    MethodDefinition,
    Parameter,
    VariableDeclaration,
    Block,
    ReturnStatement,
    ExpressionStatement,
    CallExpression,
    MemberExpression,
    NewExpression,
    Identifier,
    StringLiteral,
    NumberLiteral,
    BooleanLiteral,
}

impl NodeKind {
    /// Name used in structured dumps and diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeKind::Module => "Module",
            NodeKind::ImportDeclaration => "ImportDeclaration",
            NodeKind::ImportSpecifier => "ImportSpecifier",
            NodeKind::ImportDefaultSpecifier => "ImportDefaultSpecifier",
            NodeKind::ImportNamespaceSpecifier => "ImportNamespaceSpecifier",
            NodeKind::ExportNamedDeclaration => "ExportNamedDeclaration",
            NodeKind::ExportSpecifier => "ExportSpecifier",
            NodeKind::FunctionDeclaration => "FunctionDeclaration",
            NodeKind::ClassDeclaration => "ClassDeclaration",
            NodeKind::MethodDefinition => "MethodDefinition",
            NodeKind::Parameter => "Parameter",
            NodeKind::VariableDeclaration => "VariableDeclaration",
            NodeKind::Block => "Block",
            NodeKind::ReturnStatement => "ReturnStatement",
            NodeKind::ExpressionStatement => "ExpressionStatement",
            NodeKind::CallExpression => "CallExpression",
            NodeKind::MemberExpression => "MemberExpression",
            NodeKind::NewExpression => "NewExpression",
            NodeKind::Identifier => "Identifier",
            NodeKind::StringLiteral => "StringLiteral",
            NodeKind::NumberLiteral => "NumberLiteral",
            NodeKind::BooleanLiteral => "BooleanLiteral",
        }
    }

    /// Whether a node of this kind may occupy `slot`.
    pub const fn fits(self, slot: Slot) -> bool {
        match slot {
            Slot::Statement => self.is_statement(),
            Slot::Expression => self.is_expression(),
            Slot::Identifier => matches!(self, NodeKind::Identifier),
            Slot::StringLiteral => matches!(self, NodeKind::StringLiteral),
            Slot::Parameter => matches!(self, NodeKind::Parameter),
            Slot::Block => matches!(self, NodeKind::Block),
            Slot::ClassMember => matches!(self, NodeKind::MethodDefinition),
            Slot::ImportSpecifier => matches!(
                self,
                NodeKind::ImportSpecifier
                    | NodeKind::ImportDefaultSpecifier
                    | NodeKind::ImportNamespaceSpecifier
            ),
            Slot::ExportSpecifier => matches!(self, NodeKind::ExportSpecifier),
        }
    }

    /// Kinds allowed in a statement list.
    pub const fn is_statement(self) -> bool {
        matches!(
            self,
            NodeKind::ImportDeclaration
                | NodeKind::ExportNamedDeclaration
                | NodeKind::FunctionDeclaration
                | NodeKind::ClassDeclaration
                | NodeKind::VariableDeclaration
                | NodeKind::Block
                | NodeKind::ReturnStatement
                | NodeKind::ExpressionStatement
        )
    }

    /// Kinds allowed in an expression position.
    pub const fn is_expression(self) -> bool {
        matches!(
            self,
            NodeKind::CallExpression
                | NodeKind::MemberExpression
                | NodeKind::NewExpression
                | NodeKind::Identifier
                | NodeKind::StringLiteral
                | NodeKind::NumberLiteral
                | NodeKind::BooleanLiteral
        )
    }

    /// Declarations that can be the target of an import.
    pub const fn is_declaration(self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDeclaration
                | NodeKind::ClassDeclaration
                | NodeKind::VariableDeclaration
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected-kind class of a child position.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Slot {
    Statement,
    Expression,
    Identifier,
    StringLiteral,
    Parameter,
    Block,
    ClassMember,
    ImportSpecifier,
    ExportSpecifier,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Slot::Statement => "statement",
            Slot::Expression => "expression",
            Slot::Identifier => "identifier",
            Slot::StringLiteral => "string literal",
            Slot::Parameter => "parameter",
            Slot::Block => "block",
            Slot::ClassMember => "class member",
            Slot::ImportSpecifier => "import specifier",
            Slot::ExportSpecifier => "export specifier",
        };
        f.write_str(text)
    }
}

bitflags::bitflags! {
    /// Modifiers carried alongside a node's data.
    ///
    /// Rebuilding a node with new children copies its flags unchanged.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
    pub struct NodeFlags: u8 {
        /// `export function f() {}`
        const EXPORT = 1;
        /// `export default ...`
        const DEFAULT = 1 << 1;
        /// `import type { T } from ...`
        const TYPE_ONLY = 1 << 2;
        /// `declare function f()`
        const DECLARE = 1 << 3;
        /// `const x = ...` (otherwise `let`)
        const CONST = 1 << 4;
        /// `static` class member
        const STATIC = 1 << 5;
    }
}

/// Shape of a node: one variant per [`NodeKind`].
#[derive(Clone, Debug, PartialEq)]
pub enum NodeData {
    Module {
        statements: Vec<NodeId>,
    },
    ImportDeclaration {
        source: NodeId,
        specifiers: Vec<NodeId>,
    },
    ImportSpecifier {
        imported: NodeId,
        local: NodeId,
    },
    ImportDefaultSpecifier {
        local: NodeId,
    },
    ImportNamespaceSpecifier {
        local: NodeId,
    },
    /// `export { a as b }` or, with a source, `export { a } from "./m"`.
    ExportNamedDeclaration {
        specifiers: Vec<NodeId>,
        source: Option<NodeId>,
    },
    ExportSpecifier {
        local: NodeId,
        exported: NodeId,
    },
    FunctionDeclaration {
        name: NodeId,
        params: Vec<NodeId>,
        body: NodeId,
    },
    ClassDeclaration {
        name: NodeId,
        members: Vec<NodeId>,
    },
    MethodDefinition {
        name: NodeId,
        params: Vec<NodeId>,
        body: NodeId,
    },
    Parameter {
        name: NodeId,
    },
    VariableDeclaration {
        name: NodeId,
        init: Option<NodeId>,
    },
    Block {
        statements: Vec<NodeId>,
    },
    ReturnStatement {
        argument: Option<NodeId>,
    },
    ExpressionStatement {
        expression: NodeId,
    },
    CallExpression {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    MemberExpression {
        object: NodeId,
        property: NodeId,
    },
    NewExpression {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    Identifier {
        name: Name,
    },
    StringLiteral {
        value: Name,
    },
    /// Stored as bits so the data stays `Eq`-comparable by value.
    NumberLiteral {
        bits: u64,
    },
    BooleanLiteral {
        value: bool,
    },
}

/// Children of one node, paired with the slot each occupies.
pub type Children = SmallVec<[(NodeId, Slot); 4]>;

impl NodeData {
    /// Discriminant of this shape.
    pub const fn kind(&self) -> NodeKind {
        match self {
            NodeData::Module { .. } => NodeKind::Module,
            NodeData::ImportDeclaration { .. } => NodeKind::ImportDeclaration,
            NodeData::ImportSpecifier { .. } => NodeKind::ImportSpecifier,
            NodeData::ImportDefaultSpecifier { .. } => NodeKind::ImportDefaultSpecifier,
            NodeData::ImportNamespaceSpecifier { .. } => NodeKind::ImportNamespaceSpecifier,
            NodeData::ExportNamedDeclaration { .. } => NodeKind::ExportNamedDeclaration,
            NodeData::ExportSpecifier { .. } => NodeKind::ExportSpecifier,
            NodeData::FunctionDeclaration { .. } => NodeKind::FunctionDeclaration,
            NodeData::ClassDeclaration { .. } => NodeKind::ClassDeclaration,
            NodeData::MethodDefinition { .. } => NodeKind::MethodDefinition,
            NodeData::Parameter { .. } => NodeKind::Parameter,
            NodeData::VariableDeclaration { .. } => NodeKind::VariableDeclaration,
            NodeData::Block { .. } => NodeKind::Block,
            NodeData::ReturnStatement { .. } => NodeKind::ReturnStatement,
            NodeData::ExpressionStatement { .. } => NodeKind::ExpressionStatement,
            NodeData::CallExpression { .. } => NodeKind::CallExpression,
            NodeData::MemberExpression { .. } => NodeKind::MemberExpression,
            NodeData::NewExpression { .. } => NodeKind::NewExpression,
            NodeData::Identifier { .. } => NodeKind::Identifier,
            NodeData::StringLiteral { .. } => NodeKind::StringLiteral,
            NodeData::NumberLiteral { .. } => NodeKind::NumberLiteral,
            NodeData::BooleanLiteral { .. } => NodeKind::BooleanLiteral,
        }
    }

    /// Children in source order, each tagged with its slot.
    pub fn children(&self) -> Children {
        fn push_all(ids: &[NodeId], slot: Slot, out: &mut Children) {
            out.extend(ids.iter().map(|&id| (id, slot)));
        }

        let mut out = Children::new();
        match self {
            NodeData::Module { statements } | NodeData::Block { statements } => {
                push_all(statements, Slot::Statement, &mut out);
            }
            NodeData::ImportDeclaration { source, specifiers } => {
                push_all(specifiers, Slot::ImportSpecifier, &mut out);
                out.push((*source, Slot::StringLiteral));
            }
            NodeData::ImportSpecifier { imported, local } => {
                out.push((*imported, Slot::Identifier));
                out.push((*local, Slot::Identifier));
            }
            NodeData::ImportDefaultSpecifier { local }
            | NodeData::ImportNamespaceSpecifier { local } => {
                out.push((*local, Slot::Identifier));
            }
            NodeData::ExportNamedDeclaration { specifiers, source } => {
                push_all(specifiers, Slot::ExportSpecifier, &mut out);
                if let Some(source) = source {
                    out.push((*source, Slot::StringLiteral));
                }
            }
            NodeData::ExportSpecifier { local, exported } => {
                out.push((*local, Slot::Identifier));
                out.push((*exported, Slot::Identifier));
            }
            NodeData::FunctionDeclaration { name, params, body }
            | NodeData::MethodDefinition { name, params, body } => {
                out.push((*name, Slot::Identifier));
                push_all(params, Slot::Parameter, &mut out);
                out.push((*body, Slot::Block));
            }
            NodeData::ClassDeclaration { name, members } => {
                out.push((*name, Slot::Identifier));
                push_all(members, Slot::ClassMember, &mut out);
            }
            NodeData::Parameter { name } => out.push((*name, Slot::Identifier)),
            NodeData::VariableDeclaration { name, init } => {
                out.push((*name, Slot::Identifier));
                if let Some(init) = init {
                    out.push((*init, Slot::Expression));
                }
            }
            NodeData::ReturnStatement { argument } => {
                if let Some(argument) = argument {
                    out.push((*argument, Slot::Expression));
                }
            }
            NodeData::ExpressionStatement { expression } => {
                out.push((*expression, Slot::Expression));
            }
            NodeData::CallExpression { callee, arguments }
            | NodeData::NewExpression { callee, arguments } => {
                out.push((*callee, Slot::Expression));
                push_all(arguments, Slot::Expression, &mut out);
            }
            NodeData::MemberExpression { object, property } => {
                out.push((*object, Slot::Expression));
                out.push((*property, Slot::Identifier));
            }
            NodeData::Identifier { .. }
            | NodeData::StringLiteral { .. }
            | NodeData::NumberLiteral { .. }
            | NodeData::BooleanLiteral { .. } => {}
        }
        out
    }

    /// Build a copy of this shape with every child passed through `f`.
    ///
    /// Children are visited in the same order as [`children`](Self::children).
    pub fn try_map_children<E>(
        &self,
        mut f: impl FnMut(NodeId, Slot) -> Result<NodeId, E>,
    ) -> Result<NodeData, E> {
        fn map_all<E>(
            ids: &[NodeId],
            slot: Slot,
            f: &mut impl FnMut(NodeId, Slot) -> Result<NodeId, E>,
        ) -> Result<Vec<NodeId>, E> {
            ids.iter().map(|&id| f(id, slot)).collect()
        }
        fn map_opt<E>(
            id: Option<NodeId>,
            slot: Slot,
            f: &mut impl FnMut(NodeId, Slot) -> Result<NodeId, E>,
        ) -> Result<Option<NodeId>, E> {
            id.map(|id| f(id, slot)).transpose()
        }

        let data = match self {
            NodeData::Module { statements } => NodeData::Module {
                statements: map_all(statements, Slot::Statement, &mut f)?,
            },
            NodeData::Block { statements } => NodeData::Block {
                statements: map_all(statements, Slot::Statement, &mut f)?,
            },
            NodeData::ImportDeclaration { source, specifiers } => {
                let specifiers = map_all(specifiers, Slot::ImportSpecifier, &mut f)?;
                let source = f(*source, Slot::StringLiteral)?;
                NodeData::ImportDeclaration { source, specifiers }
            }
            NodeData::ImportSpecifier { imported, local } => {
                let imported = f(*imported, Slot::Identifier)?;
                let local = f(*local, Slot::Identifier)?;
                NodeData::ImportSpecifier { imported, local }
            }
            NodeData::ImportDefaultSpecifier { local } => NodeData::ImportDefaultSpecifier {
                local: f(*local, Slot::Identifier)?,
            },
            NodeData::ImportNamespaceSpecifier { local } => NodeData::ImportNamespaceSpecifier {
                local: f(*local, Slot::Identifier)?,
            },
            NodeData::ExportNamedDeclaration { specifiers, source } => {
                let specifiers = map_all(specifiers, Slot::ExportSpecifier, &mut f)?;
                let source = map_opt(*source, Slot::StringLiteral, &mut f)?;
                NodeData::ExportNamedDeclaration { specifiers, source }
            }
            NodeData::ExportSpecifier { local, exported } => {
                let local = f(*local, Slot::Identifier)?;
                let exported = f(*exported, Slot::Identifier)?;
                NodeData::ExportSpecifier { local, exported }
            }
            NodeData::FunctionDeclaration { name, params, body } => {
                let name = f(*name, Slot::Identifier)?;
                let params = map_all(params, Slot::Parameter, &mut f)?;
                let body = f(*body, Slot::Block)?;
                NodeData::FunctionDeclaration { name, params, body }
            }
            NodeData::MethodDefinition { name, params, body } => {
                let name = f(*name, Slot::Identifier)?;
                let params = map_all(params, Slot::Parameter, &mut f)?;
                let body = f(*body, Slot::Block)?;
                NodeData::MethodDefinition { name, params, body }
            }
            NodeData::ClassDeclaration { name, members } => {
                let name = f(*name, Slot::Identifier)?;
                let members = map_all(members, Slot::ClassMember, &mut f)?;
                NodeData::ClassDeclaration { name, members }
            }
            NodeData::Parameter { name } => NodeData::Parameter {
                name: f(*name, Slot::Identifier)?,
            },
            NodeData::VariableDeclaration { name, init } => {
                let name = f(*name, Slot::Identifier)?;
                let init = map_opt(*init, Slot::Expression, &mut f)?;
                NodeData::VariableDeclaration { name, init }
            }
            NodeData::ReturnStatement { argument } => NodeData::ReturnStatement {
                argument: map_opt(*argument, Slot::Expression, &mut f)?,
            },
            NodeData::ExpressionStatement { expression } => NodeData::ExpressionStatement {
                expression: f(*expression, Slot::Expression)?,
            },
            NodeData::CallExpression { callee, arguments } => {
                let callee = f(*callee, Slot::Expression)?;
                let arguments = map_all(arguments, Slot::Expression, &mut f)?;
                NodeData::CallExpression { callee, arguments }
            }
            NodeData::NewExpression { callee, arguments } => {
                let callee = f(*callee, Slot::Expression)?;
                let arguments = map_all(arguments, Slot::Expression, &mut f)?;
                NodeData::NewExpression { callee, arguments }
            }
            NodeData::MemberExpression { object, property } => {
                let object = f(*object, Slot::Expression)?;
                let property = f(*property, Slot::Identifier)?;
                NodeData::MemberExpression { object, property }
            }
            leaf @ (NodeData::Identifier { .. }
            | NodeData::StringLiteral { .. }
            | NodeData::NumberLiteral { .. }
            | NodeData::BooleanLiteral { .. }) => leaf.clone(),
        };
        Ok(data)
    }
}

/// One arena entry: shape plus the fields copied across rebuilds.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub data: NodeData,
    pub span: Span,
    pub flags: NodeFlags,
}

impl Node {
    /// Discriminant of this node.
    #[inline]
    pub const fn kind(&self) -> NodeKind {
        self.data.kind()
    }
}

#[cfg(test)]
mod tests;
