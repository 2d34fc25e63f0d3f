//! Cooked tokens handed to the parser.

use std::fmt;

use arbor_ir::Span;

/// Token discriminant plus the literal payloads the parser needs.
///
/// Identifier and string text is not copied here; the parser slices it out
/// of the source with the token span.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum TokenKind {
    // Literals
    Ident,
    String,
    Number(f64),

    // Keywords
    Import,
    Export,
    Function,
    Class,
    Return,
    Const,
    Let,
    True,
    False,
    Default,
    New,

    // Punctuation
    LBrace,
    RBrace,
    LParen,
    RParen,
    Comma,
    Semicolon,
    Dot,
    Star,
    Eq,

    /// A string literal with no closing quote before the end of the line.
    UnterminatedString,
    /// A character no token starts with.
    Error,
    Eof,
}

impl TokenKind {
    /// Human-readable form used in parse diagnostics.
    pub fn display_name(&self) -> &'static str {
        match self {
            TokenKind::Ident => "identifier",
            TokenKind::String | TokenKind::UnterminatedString => "string literal",
            TokenKind::Number(_) => "number",
            TokenKind::Import => "import",
            TokenKind::Export => "export",
            TokenKind::Function => "function",
            TokenKind::Class => "class",
            TokenKind::Return => "return",
            TokenKind::Const => "const",
            TokenKind::Let => "let",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Default => "default",
            TokenKind::New => "new",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Dot => ".",
            TokenKind::Star => "*",
            TokenKind::Eq => "=",
            TokenKind::Error => "invalid character",
            TokenKind::Eof => "end of file",
        }
    }

    /// Whether this kind is the same variant as `other`, ignoring payloads.
    #[inline]
    pub fn same_kind(&self, other: &TokenKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

/// Token stream; always terminated by a single [`TokenKind::Eof`].
#[derive(Clone, PartialEq, Debug, Default)]
pub struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    pub fn new() -> Self {
        TokenList { tokens: Vec::new() }
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    pub fn kinds(&self) -> impl Iterator<Item = TokenKind> + '_ {
        self.tokens.iter().map(|t| t.kind)
    }
}

impl std::ops::Index<usize> for TokenList {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.tokens[index]
    }
}
