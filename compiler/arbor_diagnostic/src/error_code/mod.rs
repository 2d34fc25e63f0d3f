//! Error codes for all diagnostics.
//!
//! Format: E#### where the first digit indicates the phase:
//! - E0xxx: Lexer errors
//! - E1xxx: Parser errors
//! - E2xxx: Semantic errors (single program)
//! - E3xxx: Linkage errors (imports and exports across programs)
//! - E4xxx: Emission errors
//! - E9xxx: Internal errors

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum ErrorCode {
    // Lexer Errors (E0xxx)
    /// Unterminated string literal
    E0001,
    /// Invalid character in source
    E0002,

    // Parser Errors (E1xxx)
    /// Unexpected token
    E1001,
    /// Expected expression
    E1002,
    /// Unclosed delimiter
    E1003,
    /// Expected identifier
    E1004,
    /// Expected module path string
    E1005,

    // Semantic Errors (E2xxx)
    /// Unknown identifier
    E2001,
    /// Duplicate declaration in one scope
    E2002,
    /// `return` outside of a function body
    E2003,

    // Linkage Errors (E3xxx)
    /// Module has no exported member with this name
    E3001,
    /// Imported declaration has the wrong kind for the import
    E3002,
    /// Module not found
    E3003,
    /// Re-export chain loops back on itself
    E3004,

    // Emission Errors (E4xxx)
    /// Writing a compiled unit failed
    E4001,

    // Internal Errors (E9xxx)
    /// Internal error
    E9001,
}

impl ErrorCode {
    /// All error code variants, for exhaustive testing.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::E0001,
        ErrorCode::E0002,
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E3004,
        ErrorCode::E4001,
        ErrorCode::E9001,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E9001 => "E9001",
        }
    }

    pub fn is_lexer_error(&self) -> bool {
        self.as_str().starts_with("E0")
    }

    pub fn is_parser_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    pub fn is_semantic_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    /// Import/export linkage problems.
    pub fn is_linkage_error(&self) -> bool {
        self.as_str().starts_with("E3")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == s)
            .ok_or(())
    }
}

#[cfg(test)]
mod tests;
