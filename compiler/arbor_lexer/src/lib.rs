//! Lexer for arbor sources using logos.
//!
//! `from`, `as` and `type` are contextual: they lex as identifiers and the
//! parser recognizes them by text. Comments and all whitespace (newlines
//! included) are trivia; statements are separated by optional semicolons.

mod escape;
mod token;

pub use escape::{escape, unescape};
pub use token::{Token, TokenKind, TokenList};

use arbor_ir::Span;
use logos::Logos;

/// Raw token from logos (before cooking).
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    #[token("import")]
    Import,
    #[token("export")]
    Export,
    #[token("function")]
    Function,
    #[token("class")]
    Class,
    #[token("return")]
    Return,
    #[token("const")]
    Const,
    #[token("let")]
    Let,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("default")]
    Default,
    #[token("new")]
    New,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token("*")]
    Star,
    #[token("=")]
    Eq,

    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    // String literal (no unescaped newlines allowed)
    #[regex(r#""([^"\\\n\r]|\\.)*""#)]
    String,

    // Same body without the closing quote
    #[regex(r#""([^"\\\n\r]|\\.)*"#)]
    UnterminatedString,

    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*")]
    Ident,
}

/// Lex source code into a `TokenList`.
pub fn lex(source: &str) -> TokenList {
    let mut result = TokenList::new();
    let mut logos = RawToken::lexer(source);

    while let Some(token_result) = logos.next() {
        let span = Span::from_range(logos.span());
        let kind = match token_result {
            Ok(raw) => match convert_token(raw) {
                Some(kind) => kind,
                None => continue,
            },
            Err(()) => TokenKind::Error,
        };
        result.push(Token::new(kind, span));
    }

    let eof = u32::try_from(source.len()).unwrap_or(u32::MAX);
    result.push(Token::new(TokenKind::Eof, Span::new(eof, eof)));
    result
}

/// Cook a raw token; `None` for trivia.
fn convert_token(raw: RawToken) -> Option<TokenKind> {
    let kind = match raw {
        RawToken::Import => TokenKind::Import,
        RawToken::Export => TokenKind::Export,
        RawToken::Function => TokenKind::Function,
        RawToken::Class => TokenKind::Class,
        RawToken::Return => TokenKind::Return,
        RawToken::Const => TokenKind::Const,
        RawToken::Let => TokenKind::Let,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::Default => TokenKind::Default,
        RawToken::New => TokenKind::New,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Star => TokenKind::Star,
        RawToken::Eq => TokenKind::Eq,
        RawToken::Number(n) => TokenKind::Number(n),
        RawToken::String => TokenKind::String,
        RawToken::UnterminatedString => TokenKind::UnterminatedString,
        RawToken::Ident => TokenKind::Ident,
        RawToken::LineComment | RawToken::BlockComment => return None,
    };
    Some(kind)
}
