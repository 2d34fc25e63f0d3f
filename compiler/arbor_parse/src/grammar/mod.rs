//! Grammar productions.
//!
//! - `mod.rs`: statements and blocks
//! - `item.rs`: imports, exports and declarations
//! - `expr.rs`: expressions

mod expr;
mod item;

use arbor_ir::{NodeData, NodeFlags, NodeId};
use arbor_lexer::TokenKind;
use arbor_stack::ensure_sufficient_stack;

use crate::{ErrorContext, PResult, Parser};

impl Parser<'_, '_> {
    pub(crate) fn parse_statement(&mut self) -> PResult<NodeId> {
        ensure_sufficient_stack(|| {
            let statement = match self.cursor.current_kind() {
                TokenKind::Import => self.parse_import()?,
                TokenKind::Export => self.parse_export()?,
                TokenKind::Function => {
                    let start = self.cursor.current_span();
                    self.parse_function(start, NodeFlags::empty())?
                }
                TokenKind::Class => {
                    let start = self.cursor.current_span();
                    self.parse_class(start, NodeFlags::empty())?
                }
                TokenKind::Const | TokenKind::Let => {
                    let start = self.cursor.current_span();
                    self.parse_variable(start, NodeFlags::empty())?
                }
                TokenKind::Return => self.parse_return()?,
                TokenKind::Ident if self.at_declare_modifier() => {
                    let start = self.cursor.advance().span;
                    match self.cursor.current_kind() {
                        TokenKind::Function => self.parse_function(start, NodeFlags::DECLARE)?,
                        TokenKind::Class => self.parse_class(start, NodeFlags::DECLARE)?,
                        _ => self.parse_variable(start, NodeFlags::DECLARE)?,
                    }
                }
                TokenKind::LBrace => self.parse_block()?,
                _ => {
                    let expression = self.parse_expr()?;
                    let span = self.span_of(expression)?;
                    self.alloc(
                        NodeData::ExpressionStatement { expression },
                        span,
                        NodeFlags::empty(),
                    )?
                }
            };
            self.cursor.eat(TokenKind::Semicolon);
            Ok(statement)
        })
    }

    /// `declare` followed by a declaration keyword. Anywhere else it is an
    /// ordinary identifier.
    fn at_declare_modifier(&self) -> bool {
        self.check_word("declare")
            && matches!(
                self.cursor.peek(1).kind,
                TokenKind::Function | TokenKind::Class | TokenKind::Const | TokenKind::Let
            )
    }

    /// `{ statement* }`
    pub(crate) fn parse_block(&mut self) -> PResult<NodeId> {
        let start = self
            .expect(TokenKind::LBrace)
            .map_err(|e| e.in_context(ErrorContext::Block))?;
        let mut statements = Vec::new();
        while !self.cursor.check(TokenKind::RBrace) && !self.cursor.is_at_end() {
            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(err) => {
                    self.errors.push(err.in_context(ErrorContext::Block).into_diagnostic());
                    self.synchronize();
                }
            }
        }
        self.expect(TokenKind::RBrace).map_err(|_| {
            crate::ParseError::with_code(
                arbor_diagnostic::ErrorCode::E1003,
                self.cursor.current_span(),
                "unclosed delimiter `{`",
            )
        })?;
        let span = self.span_from(start);
        self.alloc(NodeData::Block { statements }, span, NodeFlags::empty())
    }

    /// `return expr?`
    ///
    /// The argument must start on the same line as `return`.
    fn parse_return(&mut self) -> PResult<NodeId> {
        let start = self.expect(TokenKind::Return)?;
        let argument = match self.cursor.current_kind() {
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof => None,
            _ if self.after_line_break() => None,
            _ => Some(self.parse_expr()?),
        };
        let span = self.span_from(start);
        self.alloc(NodeData::ReturnStatement { argument }, span, NodeFlags::empty())
    }
}
