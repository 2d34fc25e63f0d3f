//! Recursive descent parser for arbor sources.
//!
//! Nodes are allocated straight into the caller's [`NodeArena`], so a parsed
//! program shares identities with everything later built on top of it.
//! Statement-level errors are recovered from (the parser skips to the next
//! statement keyword) so one pass reports every syntax error in a file.

mod cursor;
mod error;
mod grammar;

pub use cursor::Cursor;
pub use error::{ErrorContext, ParseError};

use arbor_diagnostic::{Diagnostic, ErrorCode};
use arbor_ir::{NodeArena, NodeData, NodeFlags, NodeId, Span};
use arbor_lexer::{unescape, Token, TokenKind};

type PResult<T> = Result<T, ParseError>;

/// Parse `source` into a `Module` node.
///
/// Returns every syntax error when any were found; partial trees are left
/// unreachable in the arena.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn parse(source: &str, arena: &mut NodeArena) -> Result<NodeId, Vec<Diagnostic>> {
    let tokens = arbor_lexer::lex(source);
    let mut parser = Parser::new(source, tokens.as_slice(), arena);
    match parser.parse_module() {
        Ok(module) if parser.errors.is_empty() => Ok(module),
        Ok(_) => Err(parser.errors),
        Err(err) => {
            parser.errors.push(err.into_diagnostic());
            Err(parser.errors)
        }
    }
}

/// Parser state.
pub(crate) struct Parser<'src, 'a> {
    source: &'src str,
    cursor: Cursor<'src>,
    arena: &'a mut NodeArena,
    errors: Vec<Diagnostic>,
}

impl<'src, 'a> Parser<'src, 'a> {
    fn new(source: &'src str, tokens: &'src [Token], arena: &'a mut NodeArena) -> Self {
        Parser {
            source,
            cursor: Cursor::new(tokens),
            arena,
            errors: Vec::new(),
        }
    }

    fn parse_module(&mut self) -> PResult<NodeId> {
        let mut statements = Vec::new();
        while !self.cursor.is_at_end() {
            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(err) => {
                    self.errors.push(err.into_diagnostic());
                    self.synchronize();
                }
            }
        }
        let end = u32::try_from(self.source.len()).unwrap_or(u32::MAX);
        self.alloc(
            NodeData::Module { statements },
            Span::new(0, end),
            NodeFlags::empty(),
        )
    }

    // Token helpers

    /// Source text under a span.
    fn slice(&self, span: Span) -> &'src str {
        self.source.get(span.to_range()).unwrap_or("")
    }

    /// Whether the current token is the identifier `word`.
    fn check_word(&self, word: &str) -> bool {
        self.cursor.check(TokenKind::Ident) && self.slice(self.cursor.current_span()) == word
    }

    /// Whether a line break separates the current token from the last
    /// consumed one.
    fn after_line_break(&self) -> bool {
        let gap = Span::new(self.cursor.previous_span().end, self.cursor.current_span().start);
        self.slice(gap).contains('\n')
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Span> {
        if self.cursor.check(kind) {
            Ok(self.cursor.advance().span)
        } else {
            Err(self.unexpected(&format!("`{}`", kind.display_name())))
        }
    }

    /// Consume the contextual keyword `word`.
    fn expect_word(&mut self, word: &str) -> PResult<Span> {
        if self.check_word(word) {
            Ok(self.cursor.advance().span)
        } else {
            Err(self.unexpected(&format!("`{word}`")))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.cursor.current();
        ParseError::unexpected(token.span, expected, token.kind)
    }

    /// Span from `start` to the end of the last consumed token.
    fn span_from(&self, start: Span) -> Span {
        start.merge(self.cursor.previous_span())
    }

    // Node helpers

    fn alloc(&mut self, data: NodeData, span: Span, flags: NodeFlags) -> PResult<NodeId> {
        Ok(self.arena.alloc(data, span, flags)?)
    }

    fn span_of(&self, id: NodeId) -> PResult<Span> {
        Ok(self.arena.try_get(id)?.span)
    }

    /// Consume an identifier and allocate an `Identifier` node for it.
    fn identifier(&mut self) -> PResult<NodeId> {
        if !self.cursor.check(TokenKind::Ident) {
            let token = self.cursor.current();
            return Err(match token.kind {
                TokenKind::Error | TokenKind::UnterminatedString => {
                    ParseError::unexpected(token.span, "identifier", token.kind)
                }
                found => ParseError::with_code(
                    ErrorCode::E1004,
                    token.span,
                    format!("expected identifier, found `{found}`"),
                ),
            });
        }
        let span = self.cursor.advance().span;
        let text = self.slice(span);
        let name = self.arena.intern(text);
        self.alloc(NodeData::Identifier { name }, span, NodeFlags::empty())
    }

    /// Consume a string literal and allocate a `StringLiteral` node for it.
    fn string_literal(&mut self) -> PResult<NodeId> {
        let token = self.cursor.current();
        let raw = self.slice(token.span);
        let body = match token.kind {
            TokenKind::String => raw.get(1..raw.len().saturating_sub(1)).unwrap_or(""),
            TokenKind::UnterminatedString => {
                self.errors.push(
                    ParseError::with_code(
                        ErrorCode::E0001,
                        token.span,
                        "unterminated string literal",
                    )
                    .into_diagnostic(),
                );
                raw.get(1..).unwrap_or("")
            }
            _ => {
                return Err(ParseError::with_code(
                    ErrorCode::E1005,
                    token.span,
                    format!("expected a string literal, found `{}`", token.kind),
                ))
            }
        };
        self.cursor.advance();
        let value = self.arena.intern(&unescape(body));
        self.alloc(NodeData::StringLiteral { value }, token.span, NodeFlags::empty())
    }

    /// Skip to a plausible statement start after an error.
    fn synchronize(&mut self) {
        self.cursor.advance();
        loop {
            match self.cursor.current_kind() {
                TokenKind::Semicolon => {
                    self.cursor.advance();
                    return;
                }
                TokenKind::Import
                | TokenKind::Export
                | TokenKind::Function
                | TokenKind::Class
                | TokenKind::Const
                | TokenKind::Let
                | TokenKind::Return
                | TokenKind::RBrace
                | TokenKind::Eof => return,
                _ => {
                    self.cursor.advance();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests;
