//! Parse error types.

use std::fmt;

use arbor_diagnostic::{unexpected_token, Diagnostic, ErrorCode};
use arbor_ir::{IrError, Span};
use arbor_lexer::TokenKind;

/// What was being parsed when an error occurred, for "while parsing X"
/// notes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorContext {
    ImportDeclaration,
    ExportDeclaration,
    FunctionDeclaration,
    ClassDeclaration,
    VariableDeclaration,
    Block,
    Expression,
}

impl ErrorContext {
    pub fn description(self) -> &'static str {
        match self {
            ErrorContext::ImportDeclaration => "an import declaration",
            ErrorContext::ExportDeclaration => "an export declaration",
            ErrorContext::FunctionDeclaration => "a function declaration",
            ErrorContext::ClassDeclaration => "a class declaration",
            ErrorContext::VariableDeclaration => "a variable declaration",
            ErrorContext::Block => "a block",
            ErrorContext::Expression => "an expression",
        }
    }
}

/// A parse failure, already shaped as a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    diagnostic: Diagnostic,
}

impl ParseError {
    /// Found `found` where `expected` was required.
    #[cold]
    pub fn unexpected(span: Span, expected: &str, found: TokenKind) -> Self {
        let code = match found {
            TokenKind::UnterminatedString => ErrorCode::E0001,
            TokenKind::Error => ErrorCode::E0002,
            _ => ErrorCode::E1001,
        };
        let mut diagnostic = unexpected_token(span, expected, found.display_name());
        diagnostic.code = code;
        ParseError { diagnostic }
    }

    #[cold]
    pub fn with_code(code: ErrorCode, span: Span, message: impl Into<String>) -> Self {
        let message = message.into();
        ParseError {
            diagnostic: Diagnostic::error(code)
                .with_message(message.clone())
                .with_label(span, message),
        }
    }

    /// Attach a "while parsing X" note, keeping the innermost one.
    #[must_use]
    pub fn in_context(mut self, context: ErrorContext) -> Self {
        if self.diagnostic.notes.is_empty() {
            self.diagnostic = self
                .diagnostic
                .with_note(format!("while parsing {}", context.description()));
        }
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.diagnostic.code
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        self.diagnostic
    }
}

impl From<IrError> for ParseError {
    fn from(err: IrError) -> Self {
        ParseError {
            diagnostic: Diagnostic::error(ErrorCode::E9001)
                .with_message(format!("parser built an invalid node: {err}")),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.diagnostic.fmt(f)
    }
}

impl std::error::Error for ParseError {}
