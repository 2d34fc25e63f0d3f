//! Deterministic source reconstruction.
//!
//! Output rules:
//! - one statement per line, no semicolons, no trailing newline
//! - blocks indent their statements by [`INDENT_WIDTH`](crate::INDENT_WIDTH);
//!   an empty block prints as `{}`
//! - strings use double quotes with escapes re-applied
//! - an import specifier whose two names match prints once (`a`, not `a as a`)
//!
//! Re-parsing the output yields a tree that prints identically.

use arbor_ir::{IrResult, NodeArena, NodeData, NodeFlags, NodeId, NodeKind, NodeRef};
use arbor_lexer::escape;
use arbor_stack::ensure_sufficient_stack;

use crate::{Emitter, StringEmitter};

/// Print the tree under `root` as source text.
pub fn dump_src(arena: &NodeArena, root: NodeId) -> IrResult<String> {
    let root = arena.handle(root)?;
    let mut printer = SourcePrinter::new(StringEmitter::new());
    printer.print_node(root);
    Ok(printer.out.output())
}

/// Stateful printer over an [`Emitter`].
pub struct SourcePrinter<E> {
    out: E,
    indent: usize,
}

impl<E: Emitter> SourcePrinter<E> {
    pub fn new(out: E) -> Self {
        SourcePrinter { out, indent: 0 }
    }

    pub fn into_inner(self) -> E {
        self.out
    }

    /// Print any node: statements, expressions and the pieces in between.
    pub fn print_node(&mut self, node: NodeRef<'_>) {
        match node.data() {
            NodeData::Module { statements } => {
                for (i, &statement) in statements.iter().enumerate() {
                    if i > 0 {
                        self.out.emit_newline();
                        self.out.emit_indent(self.indent);
                    }
                    self.print_statement(node.at(statement));
                }
            }
            NodeData::ImportSpecifier { .. }
            | NodeData::ImportDefaultSpecifier { .. }
            | NodeData::ImportNamespaceSpecifier { .. } => self.print_import_specifier(node),
            NodeData::ExportSpecifier { local, exported } => {
                self.print_alias(node.at(*local), node.at(*exported));
            }
            NodeData::MethodDefinition { name, params, body } => {
                if node.flags().contains(NodeFlags::STATIC) {
                    self.out.emit("static ");
                }
                self.print_expr(node.at(*name));
                self.print_params(node, params);
                self.out.emit(" ");
                self.print_statement(node.at(*body));
            }
            NodeData::Parameter { name } => self.print_expr(node.at(*name)),
            _ if node.kind().is_statement() => self.print_statement(node),
            _ => self.print_expr(node),
        }
    }

    fn print_statement(&mut self, node: NodeRef<'_>) {
        ensure_sufficient_stack(|| self.print_statement_inner(node));
    }

    fn print_statement_inner(&mut self, node: NodeRef<'_>) {
        match node.data() {
            NodeData::ImportDeclaration { source, specifiers } => {
                self.print_import(node, *source, specifiers);
            }
            NodeData::ExportNamedDeclaration { specifiers, source } => {
                self.out.emit("export {");
                if !specifiers.is_empty() {
                    self.out.emit(" ");
                    self.print_list(node, specifiers);
                    self.out.emit(" ");
                }
                self.out.emit("}");
                if let Some(source) = source {
                    self.out.emit(" from ");
                    self.print_expr(node.at(*source));
                }
            }
            NodeData::FunctionDeclaration { name, params, body } => {
                self.print_modifiers(node.flags());
                self.out.emit("function ");
                self.print_expr(node.at(*name));
                self.print_params(node, params);
                self.out.emit(" ");
                self.print_statement(node.at(*body));
            }
            NodeData::ClassDeclaration { name, members } => {
                self.print_modifiers(node.flags());
                self.out.emit("class ");
                self.print_expr(node.at(*name));
                self.out.emit(" ");
                self.print_braced(node, members);
            }
            NodeData::VariableDeclaration { name, init } => {
                self.print_modifiers(node.flags());
                if node.flags().contains(NodeFlags::CONST) {
                    self.out.emit("const ");
                } else {
                    self.out.emit("let ");
                }
                self.print_expr(node.at(*name));
                if let Some(init) = init {
                    self.out.emit(" = ");
                    self.print_expr(node.at(*init));
                }
            }
            NodeData::Block { statements } => self.print_braced(node, statements),
            NodeData::ReturnStatement { argument } => {
                self.out.emit("return");
                if let Some(argument) = argument {
                    self.out.emit(" ");
                    self.print_expr(node.at(*argument));
                }
            }
            NodeData::ExpressionStatement { expression } => self.print_expr(node.at(*expression)),
            _ => self.print_node(node),
        }
    }

    fn print_modifiers(&mut self, flags: NodeFlags) {
        if flags.contains(NodeFlags::EXPORT) {
            self.out.emit("export ");
        }
        if flags.contains(NodeFlags::DEFAULT) {
            self.out.emit("default ");
        }
        if flags.contains(NodeFlags::DECLARE) {
            self.out.emit("declare ");
        }
    }

    /// `{}` or one member per indented line.
    fn print_braced(&mut self, parent: NodeRef<'_>, items: &[NodeId]) {
        if items.is_empty() {
            self.out.emit("{}");
            return;
        }
        self.out.emit("{");
        self.indent += 1;
        for &item in items {
            self.out.emit_newline();
            self.out.emit_indent(self.indent);
            self.print_node(parent.at(item));
        }
        self.indent -= 1;
        self.out.emit_newline();
        self.out.emit_indent(self.indent);
        self.out.emit("}");
    }

    fn print_import(&mut self, node: NodeRef<'_>, source: NodeId, specifiers: &[NodeId]) {
        self.out.emit("import ");
        if node.flags().contains(NodeFlags::TYPE_ONLY) {
            self.out.emit("type ");
        }
        if specifiers.is_empty() {
            self.print_expr(node.at(source));
            return;
        }

        let (named, other): (Vec<NodeId>, Vec<NodeId>) = specifiers
            .iter()
            .partition(|&&s| node.at(s).kind() == NodeKind::ImportSpecifier);
        let mut first = true;
        for specifier in other {
            if !first {
                self.out.emit(", ");
            }
            first = false;
            self.print_import_specifier(node.at(specifier));
        }
        if !named.is_empty() {
            if !first {
                self.out.emit(", ");
            }
            self.out.emit("{ ");
            self.print_list(node, &named);
            self.out.emit(" }");
        }
        self.out.emit(" from ");
        self.print_expr(node.at(source));
    }

    fn print_import_specifier(&mut self, node: NodeRef<'_>) {
        match node.data() {
            NodeData::ImportSpecifier { imported, local } => {
                self.print_alias(node.at(*imported), node.at(*local));
            }
            NodeData::ImportDefaultSpecifier { local } => self.print_expr(node.at(*local)),
            NodeData::ImportNamespaceSpecifier { local } => {
                self.out.emit("* as ");
                self.print_expr(node.at(*local));
            }
            _ => self.print_node(node),
        }
    }

    /// `a` or `a as b`.
    fn print_alias(&mut self, first: NodeRef<'_>, second: NodeRef<'_>) {
        self.print_expr(first);
        if first.text() != second.text() {
            self.out.emit(" as ");
            self.print_expr(second);
        }
    }

    fn print_params(&mut self, parent: NodeRef<'_>, params: &[NodeId]) {
        self.out.emit("(");
        self.print_list(parent, params);
        self.out.emit(")");
    }

    /// Comma-separated nodes.
    fn print_list(&mut self, parent: NodeRef<'_>, items: &[NodeId]) {
        for (i, &item) in items.iter().enumerate() {
            if i > 0 {
                self.out.emit(", ");
            }
            self.print_node(parent.at(item));
        }
    }

    fn print_expr(&mut self, node: NodeRef<'_>) {
        ensure_sufficient_stack(|| match node.data() {
            NodeData::Identifier { .. } => self.out.emit(node.text().unwrap_or_default()),
            NodeData::StringLiteral { .. } => {
                self.out.emit("\"");
                self.out.emit(&escape(node.text().unwrap_or_default()));
                self.out.emit("\"");
            }
            NodeData::NumberLiteral { bits } => {
                self.out.emit(&f64::from_bits(*bits).to_string());
            }
            NodeData::BooleanLiteral { value } => {
                self.out.emit(if *value { "true" } else { "false" });
            }
            NodeData::CallExpression { callee, arguments } => {
                self.print_expr(node.at(*callee));
                self.print_params(node, arguments);
            }
            NodeData::NewExpression { callee, arguments } => {
                self.out.emit("new ");
                self.print_expr(node.at(*callee));
                self.print_params(node, arguments);
            }
            NodeData::MemberExpression { object, property } => {
                self.print_expr(node.at(*object));
                self.out.emit(".");
                self.print_expr(node.at(*property));
            }
            _ => self.print_node(node),
        });
    }
}
