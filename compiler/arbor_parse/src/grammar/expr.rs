//! Expressions: identifiers, literals, calls, member access and `new`.
//!
//! There are no operators, so there is no precedence climbing: an
//! expression is a primary followed by any number of `.name` and `(args)`
//! suffixes.

use arbor_ir::{NodeData, NodeFlags, NodeId};
use arbor_lexer::TokenKind;
use arbor_stack::ensure_sufficient_stack;

use crate::{ErrorContext, PResult, ParseError, Parser};

impl Parser<'_, '_> {
    pub(crate) fn parse_expr(&mut self) -> PResult<NodeId> {
        ensure_sufficient_stack(|| {
            let mut expr = self.parse_primary()?;
            loop {
                match self.cursor.current_kind() {
                    TokenKind::Dot => expr = self.parse_member(expr)?,
                    TokenKind::LParen => {
                        let arguments = self.parse_arguments()?;
                        let span = self.span_from(self.span_of(expr)?);
                        expr = self.alloc(
                            NodeData::CallExpression {
                                callee: expr,
                                arguments,
                            },
                            span,
                            NodeFlags::empty(),
                        )?;
                    }
                    _ => return Ok(expr),
                }
            }
        })
    }

    fn parse_primary(&mut self) -> PResult<NodeId> {
        let token = self.cursor.current();
        let data = match token.kind {
            TokenKind::Ident => return self.identifier(),
            TokenKind::String | TokenKind::UnterminatedString => return self.string_literal(),
            TokenKind::New => return self.parse_new(),
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                return Ok(inner);
            }
            TokenKind::Number(value) => NodeData::NumberLiteral {
                bits: value.to_bits(),
            },
            TokenKind::True => NodeData::BooleanLiteral { value: true },
            TokenKind::False => NodeData::BooleanLiteral { value: false },
            TokenKind::Error => {
                return Err(ParseError::unexpected(token.span, "expression", token.kind))
            }
            found => {
                return Err(ParseError::with_code(
                    arbor_diagnostic::ErrorCode::E1002,
                    token.span,
                    format!("expected expression, found `{found}`"),
                )
                .in_context(ErrorContext::Expression))
            }
        };
        self.cursor.advance();
        self.alloc(data, token.span, NodeFlags::empty())
    }

    /// `.property`
    fn parse_member(&mut self, object: NodeId) -> PResult<NodeId> {
        self.expect(TokenKind::Dot)?;
        let property = self.identifier()?;
        let span = self.span_from(self.span_of(object)?);
        self.alloc(
            NodeData::MemberExpression { object, property },
            span,
            NodeFlags::empty(),
        )
    }

    /// `new Callee(args)`; the argument list is optional.
    fn parse_new(&mut self) -> PResult<NodeId> {
        let start = self.expect(TokenKind::New)?;
        let mut callee = self.identifier()?;
        while self.cursor.check(TokenKind::Dot) {
            callee = self.parse_member(callee)?;
        }
        let arguments = if self.cursor.check(TokenKind::LParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        let span = self.span_from(start);
        self.alloc(
            NodeData::NewExpression { callee, arguments },
            span,
            NodeFlags::empty(),
        )
    }

    /// `( expr, ... )` with an optional trailing comma.
    fn parse_arguments(&mut self) -> PResult<Vec<NodeId>> {
        self.expect(TokenKind::LParen)?;
        let mut arguments = Vec::new();
        while !self.cursor.check(TokenKind::RParen) {
            arguments.push(self.parse_expr()?);
            if !self.cursor.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(arguments)
    }
}
