use std::fmt;
use std::sync::Arc;

/// Source location for diagnostics.
///
/// Rows are 1-based, columns are 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: Arc<str>,
    pub row: usize,
    pub column: usize,
}

impl Location {
    #[must_use]
    pub fn new(path: impl Into<Arc<str>>, row: usize, column: usize) -> Self {
        Self {
            path: path.into(),
            row,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.path, self.row, self.column)
    }
}

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// The buffer is exhausted.
    EndOfFile,
    /// A run of characters that starts no other token.
    Unknown,
    /// `[A-Za-z_][A-Za-z0-9_]*`
    Identifier,
    /// Exactly one punctuation character.
    Symbol,
    /// A run of decimal digits.
    Integer,
    /// Double-quoted string literal, quotes included in the text.
    Str,
}

impl TokenKind {
    /// Human readable name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EndOfFile => "End_Of_File",
            Self::Unknown => "Unknown",
            Self::Identifier => "Identifier",
            Self::Symbol => "Symbol",
            Self::Integer => "Integer_Literal",
            Self::Str => "String_Literal",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single token: its kind, the text it spans, and where it starts.
///
/// The text borrows from the source buffer owned by the compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    /// Parsed value, only meaningful for [`TokenKind::Integer`].
    pub value: i64,
    pub location: Location,
}

impl Token<'_> {
    /// Whether this is a symbol token with exactly the given text.
    #[must_use]
    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Symbol && self.text == symbol
    }

    /// Whether this is an identifier token with exactly the given text.
    #[must_use]
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text == keyword
    }

    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::EndOfFile)
    }
}

impl fmt::Display for Token<'_> {
    /// Debug-style dump used by the token IR target.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::EndOfFile => write!(f, "Token::EOF"),
            TokenKind::Unknown => write!(f, "Token::Unknown('{}')", self.text),
            TokenKind::Identifier => write!(f, "Token::Ident({})", self.text),
            TokenKind::Symbol => write!(f, "Token::Symbol({})", self.text),
            TokenKind::Integer => write!(f, "Token::Int({})", self.value),
            TokenKind::Str => write!(f, "Token::Str({})", self.text),
        }
    }
}
