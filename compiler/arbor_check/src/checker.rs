//! The per-program checker.

use arbor_diagnostic::{
    duplicate_declaration, unknown_identifier, Diagnostic, DiagnosticConfig, DiagnosticQueue,
    ErrorCode,
};
use arbor_ir::{NodeArena, NodeData, NodeId, NodeRef};
use arbor_stack::ensure_sufficient_stack;

use crate::scope::ScopeStack;
use crate::{CheckResult, Globals, SemanticModel};

/// Walks one module, resolving names scope by scope.
pub struct ModuleChecker<'a> {
    arena: &'a NodeArena,
    globals: &'a Globals,
    scopes: ScopeStack,
    /// Number of enclosing function or method bodies.
    function_depth: u32,
    model: SemanticModel,
    diagnostics: DiagnosticQueue,
}

impl<'a> ModuleChecker<'a> {
    pub fn new(arena: &'a NodeArena, globals: &'a Globals) -> Self {
        Self::with_config(arena, globals, DiagnosticConfig::default())
    }

    pub fn with_config(
        arena: &'a NodeArena,
        globals: &'a Globals,
        config: DiagnosticConfig,
    ) -> Self {
        ModuleChecker {
            arena,
            globals,
            scopes: ScopeStack::default(),
            function_depth: 0,
            model: SemanticModel::default(),
            diagnostics: DiagnosticQueue::with_config(config),
        }
    }

    pub fn check_module(&mut self, root: NodeId) {
        let module = match self.arena.handle(root) {
            Ok(module) => module,
            Err(err) => {
                self.diagnostics.add(
                    Diagnostic::error(ErrorCode::E9001)
                        .with_message(format!("cannot check program: {err}")),
                );
                return;
            }
        };

        self.scopes.push();
        self.declare_all(module, module.statements());
        for &statement in module.statements() {
            self.check_statement(module.at(statement));
        }
        self.scopes.pop();
    }

    /// Diagnostics come back in source order.
    pub fn finish(mut self) -> CheckResult {
        let errors = self.diagnostics.has_errors();
        CheckResult {
            model: self.model,
            diagnostics: self.diagnostics.flush(),
            errors,
        }
    }

    // Pass 1: declarations

    /// Bind every declaration of one statement list in the innermost scope.
    fn declare_all(&mut self, parent: NodeRef<'a>, statements: &[NodeId]) {
        for &statement in statements {
            let node = parent.at(statement);
            match node.data() {
                NodeData::FunctionDeclaration { name, .. }
                | NodeData::ClassDeclaration { name, .. }
                | NodeData::VariableDeclaration { name, .. } => {
                    self.declare(node.at(*name), statement);
                }
                NodeData::ImportDeclaration { specifiers, .. } => {
                    for &specifier in specifiers {
                        let spec = node.at(specifier);
                        if let NodeData::ImportSpecifier { local, .. }
                        | NodeData::ImportDefaultSpecifier { local }
                        | NodeData::ImportNamespaceSpecifier { local } = spec.data()
                        {
                            self.declare(spec.at(*local), specifier);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn declare(&mut self, ident: NodeRef<'a>, declaration: NodeId) {
        let NodeData::Identifier { name } = *ident.data() else {
            return;
        };
        if let Some(previous) = self.scopes.declare(name, declaration) {
            self.diagnostics.add(duplicate_declaration(
                ident.span(),
                ident.at(previous).span(),
                ident.text().unwrap_or_default(),
            ));
        }
    }

    // Pass 2: bodies

    fn check_statement(&mut self, node: NodeRef<'a>) {
        ensure_sufficient_stack(|| match node.data() {
            NodeData::ExportNamedDeclaration {
                specifiers,
                source: None,
            } => {
                for &specifier in specifiers {
                    if let NodeData::ExportSpecifier { local, .. } = node.at(specifier).data() {
                        self.check_reference(node.at(*local));
                    }
                }
            }
            NodeData::FunctionDeclaration { params, body, .. } => {
                self.check_function(node, params, *body);
            }
            NodeData::ClassDeclaration { members, .. } => {
                for &member in members {
                    let method = node.at(member);
                    if let NodeData::MethodDefinition { params, body, .. } = method.data() {
                        self.check_function(method, params, *body);
                    }
                }
            }
            NodeData::VariableDeclaration {
                init: Some(init), ..
            } => self.check_expr(node.at(*init)),
            NodeData::Block { statements } => {
                self.scopes.push();
                self.declare_all(node, statements);
                for &statement in statements {
                    self.check_statement(node.at(statement));
                }
                self.scopes.pop();
            }
            NodeData::ReturnStatement { argument } => {
                if self.function_depth == 0 {
                    self.diagnostics.add(
                        Diagnostic::error(ErrorCode::E2003)
                            .with_message("`return` outside of a function")
                            .with_label(node.span(), "not inside a function body"),
                    );
                }
                if let Some(argument) = argument {
                    self.check_expr(node.at(*argument));
                }
            }
            NodeData::ExpressionStatement { expression } => self.check_expr(node.at(*expression)),
            _ => {}
        });
    }

    /// Parameters and the body's own declarations share one scope.
    fn check_function(&mut self, node: NodeRef<'a>, params: &[NodeId], body: NodeId) {
        self.scopes.push();
        self.function_depth += 1;

        for &param in params {
            if let NodeData::Parameter { name } = node.at(param).data() {
                self.declare(node.at(*name), param);
            }
        }
        let body = node.at(body);
        self.declare_all(body, body.statements());
        for &statement in body.statements() {
            self.check_statement(body.at(statement));
        }

        self.function_depth -= 1;
        self.scopes.pop();
    }

    fn check_expr(&mut self, node: NodeRef<'a>) {
        ensure_sufficient_stack(|| match node.data() {
            NodeData::Identifier { .. } => self.check_reference(node),
            NodeData::CallExpression { callee, arguments }
            | NodeData::NewExpression { callee, arguments } => {
                self.check_expr(node.at(*callee));
                for &argument in arguments {
                    self.check_expr(node.at(argument));
                }
            }
            // The property is a name, not a reference.
            NodeData::MemberExpression { object, .. } => self.check_expr(node.at(*object)),
            _ => {}
        });
    }

    fn check_reference(&mut self, ident: NodeRef<'a>) {
        let NodeData::Identifier { name } = *ident.data() else {
            return;
        };
        let declaration = self
            .scopes
            .lookup(name)
            .or_else(|| self.globals.get(&name).copied());
        match declaration {
            Some(declaration) => self.model.record(ident.id(), declaration),
            None => {
                self.diagnostics.add(unknown_identifier(
                    ident.span(),
                    ident.text().unwrap_or_default(),
                ));
            }
        }
    }
}
