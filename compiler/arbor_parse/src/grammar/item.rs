//! Imports, exports and declarations.

use arbor_ir::{NodeData, NodeFlags, NodeId, Span};
use arbor_lexer::TokenKind;

use crate::{ErrorContext, PResult, Parser};

impl Parser<'_, '_> {
    /// ```text
    /// import "./side-effect"
    /// import type? Default (, { a as b, c } | , * as ns)? from "./m"
    /// import type? { a as b, c } from "./m"
    /// import type? * as ns from "./m"
    /// ```
    pub(crate) fn parse_import(&mut self) -> PResult<NodeId> {
        self.parse_import_inner()
            .map_err(|e| e.in_context(ErrorContext::ImportDeclaration))
    }

    fn parse_import_inner(&mut self) -> PResult<NodeId> {
        let start = self.expect(TokenKind::Import)?;

        if matches!(
            self.cursor.current_kind(),
            TokenKind::String | TokenKind::UnterminatedString
        ) {
            let source = self.string_literal()?;
            let span = self.span_from(start);
            return self.alloc(
                NodeData::ImportDeclaration {
                    source,
                    specifiers: Vec::new(),
                },
                span,
                NodeFlags::empty(),
            );
        }

        let mut flags = NodeFlags::empty();
        if self.at_type_modifier() {
            self.cursor.advance();
            flags |= NodeFlags::TYPE_ONLY;
        }

        let mut specifiers = Vec::new();
        if self.cursor.check(TokenKind::Ident) {
            let local = self.identifier()?;
            let span = self.span_of(local)?;
            specifiers.push(self.alloc(
                NodeData::ImportDefaultSpecifier { local },
                span,
                NodeFlags::empty(),
            )?);
            if self.cursor.eat(TokenKind::Comma) {
                self.parse_import_tail(&mut specifiers)?;
            }
        } else {
            self.parse_import_tail(&mut specifiers)?;
        }

        self.expect_word("from")?;
        let source = self.string_literal()?;
        let span = self.span_from(start);
        self.alloc(NodeData::ImportDeclaration { source, specifiers }, span, flags)
    }

    /// `type` is a modifier only when an import clause follows it;
    /// `import type from "./m"` imports a default named `type`.
    fn at_type_modifier(&self) -> bool {
        if !self.check_word("type") {
            return false;
        }
        let next = self.cursor.peek(1);
        match next.kind {
            TokenKind::LBrace | TokenKind::Star => true,
            TokenKind::Ident => self.slice(next.span) != "from",
            _ => false,
        }
    }

    /// `{ a as b, c }` or `* as ns`
    fn parse_import_tail(&mut self, specifiers: &mut Vec<NodeId>) -> PResult<()> {
        if self.cursor.check(TokenKind::Star) {
            let start = self.cursor.advance().span;
            self.expect_word("as")?;
            let local = self.identifier()?;
            let span = self.span_from(start);
            specifiers.push(self.alloc(
                NodeData::ImportNamespaceSpecifier { local },
                span,
                NodeFlags::empty(),
            )?);
            return Ok(());
        }

        self.expect(TokenKind::LBrace)?;
        while !self.cursor.check(TokenKind::RBrace) {
            let (imported, local, span) = self.parse_alias_pair()?;
            specifiers.push(self.alloc(
                NodeData::ImportSpecifier { imported, local },
                span,
                NodeFlags::empty(),
            )?);
            if !self.cursor.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(())
    }

    /// `name` or `name as alias`. Without an alias both identifiers carry
    /// the same text and span.
    fn parse_alias_pair(&mut self) -> PResult<(NodeId, NodeId, Span)> {
        let first = self.identifier()?;
        let start = self.span_of(first)?;
        let second = if self.check_word("as") {
            self.cursor.advance();
            self.identifier()?
        } else {
            let data = self.arena.try_get(first)?.data.clone();
            self.alloc(data, start, NodeFlags::empty())?
        };
        Ok((first, second, self.span_from(start)))
    }

    /// ```text
    /// export default? (function | class | const | let) ...
    /// export { a as b, c } (from "./m")?
    /// ```
    pub(crate) fn parse_export(&mut self) -> PResult<NodeId> {
        self.parse_export_inner()
            .map_err(|e| e.in_context(ErrorContext::ExportDeclaration))
    }

    fn parse_export_inner(&mut self) -> PResult<NodeId> {
        let start = self.expect(TokenKind::Export)?;
        let mut flags = NodeFlags::EXPORT;
        if self.cursor.eat(TokenKind::Default) {
            flags |= NodeFlags::DEFAULT;
        }

        match self.cursor.current_kind() {
            TokenKind::Function => return self.parse_function(start, flags),
            TokenKind::Class => return self.parse_class(start, flags),
            TokenKind::Const | TokenKind::Let if !flags.contains(NodeFlags::DEFAULT) => {
                return self.parse_variable(start, flags)
            }
            TokenKind::LBrace if !flags.contains(NodeFlags::DEFAULT) => {}
            _ => return Err(self.unexpected("a declaration or `{`")),
        }

        self.expect(TokenKind::LBrace)?;
        let mut specifiers = Vec::new();
        while !self.cursor.check(TokenKind::RBrace) {
            let (local, exported, span) = self.parse_alias_pair()?;
            specifiers.push(self.alloc(
                NodeData::ExportSpecifier { local, exported },
                span,
                NodeFlags::empty(),
            )?);
            if !self.cursor.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;

        let source = if self.check_word("from") {
            self.cursor.advance();
            Some(self.string_literal()?)
        } else {
            None
        };
        let span = self.span_from(start);
        self.alloc(
            NodeData::ExportNamedDeclaration { specifiers, source },
            span,
            NodeFlags::empty(),
        )
    }

    /// `function name(params) { ... }`
    pub(crate) fn parse_function(&mut self, start: Span, flags: NodeFlags) -> PResult<NodeId> {
        let inner = |p: &mut Self| -> PResult<NodeId> {
            p.expect(TokenKind::Function)?;
            let name = p.identifier()?;
            let params = p.parse_params()?;
            let body = p.parse_block()?;
            let span = p.span_from(start);
            p.alloc(NodeData::FunctionDeclaration { name, params, body }, span, flags)
        };
        inner(self).map_err(|e| e.in_context(ErrorContext::FunctionDeclaration))
    }

    /// `(a, b)`
    fn parse_params(&mut self) -> PResult<Vec<NodeId>> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.cursor.check(TokenKind::RParen) {
            let name = self.identifier()?;
            let span = self.span_of(name)?;
            params.push(self.alloc(NodeData::Parameter { name }, span, NodeFlags::empty())?);
            if !self.cursor.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(params)
    }

    /// `class Name { static? method(params) { ... } ... }`
    pub(crate) fn parse_class(&mut self, start: Span, flags: NodeFlags) -> PResult<NodeId> {
        let inner = |p: &mut Self| -> PResult<NodeId> {
            p.expect(TokenKind::Class)?;
            let name = p.identifier()?;
            p.expect(TokenKind::LBrace)?;
            let mut members = Vec::new();
            while !p.cursor.check(TokenKind::RBrace) && !p.cursor.is_at_end() {
                if p.cursor.eat(TokenKind::Semicolon) {
                    continue;
                }
                members.push(p.parse_method()?);
            }
            p.expect(TokenKind::RBrace)?;
            let span = p.span_from(start);
            p.alloc(NodeData::ClassDeclaration { name, members }, span, flags)
        };
        inner(self).map_err(|e| e.in_context(ErrorContext::ClassDeclaration))
    }

    fn parse_method(&mut self) -> PResult<NodeId> {
        let start = self.cursor.current_span();
        let mut flags = NodeFlags::empty();
        if self.check_word("static") && self.cursor.peek(1).kind == TokenKind::Ident {
            self.cursor.advance();
            flags |= NodeFlags::STATIC;
        }
        let name = self.identifier()?;
        let params = self.parse_params()?;
        let body = self.parse_block()?;
        let span = self.span_from(start);
        self.alloc(NodeData::MethodDefinition { name, params, body }, span, flags)
    }

    /// `const name = init` or `let name (= init)?`
    pub(crate) fn parse_variable(&mut self, start: Span, flags: NodeFlags) -> PResult<NodeId> {
        let inner = |p: &mut Self| -> PResult<NodeId> {
            let mut flags = flags;
            if p.cursor.eat(TokenKind::Const) {
                flags |= NodeFlags::CONST;
            } else {
                p.expect(TokenKind::Let)?;
            }
            let name = p.identifier()?;
            let init = if p.cursor.eat(TokenKind::Eq) {
                Some(p.parse_expr()?)
            } else {
                None
            };
            let span = p.span_from(start);
            p.alloc(NodeData::VariableDeclaration { name, init }, span, flags)
        };
        inner(self).map_err(|e| e.in_context(ErrorContext::VariableDeclaration))
    }
}
