use std::sync::Arc;

use log::trace;

use crate::token::{Location, Token, TokenKind};

/// Tokenize a whole source string, stopping before end of file.
///
/// Lexing never fails: characters that start no known token come back
/// as [`TokenKind::Unknown`] tokens.
#[must_use]
pub fn tokenize(path: impl Into<Arc<str>>, input: &str) -> Vec<Token<'_>> {
    Lexer::new(path, input).collect()
}

/// Saved lexer position.
///
/// Restoring a cursor rewinds the lexer to exactly where it was when the
/// cursor was taken. The source buffer itself is never touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    offset: usize,
    row: usize,
    column: usize,
}

/// Pull-based lexer over a borrowed source buffer.
#[derive(Debug, Clone)]
pub struct Lexer<'src> {
    path: Arc<str>,
    source: &'src str,
    cursor: Cursor,
}

impl<'src> Lexer<'src> {
    pub fn new(path: impl Into<Arc<str>>, source: &'src str) -> Self {
        let start = if source.as_bytes().starts_with(&[0xEF, 0xBB, 0xBF]) {
            3
        } else {
            0
        };
        Self {
            path: path.into(),
            source,
            cursor: Cursor {
                offset: start,
                row: 1,
                column: 0,
            },
        }
    }

    #[must_use]
    pub const fn save(&self) -> Cursor {
        self.cursor
    }

    pub const fn restore(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    /// Consume and return the next token.
    ///
    /// Returns an end-of-file token, repeatedly, once the buffer is
    /// exhausted.
    pub fn next_token(&mut self) -> Token<'src> {
        let (token, cursor) = self.scan_from(self.cursor);
        self.cursor = cursor;
        trace!("lexed {token} at {}", token.location);
        token
    }

    /// Return the next token without consuming it.
    #[must_use]
    pub fn peek(&self) -> Token<'src> {
        self.scan_from(self.cursor).0
    }

    fn location_at(&self, cursor: Cursor) -> Location {
        Location {
            path: Arc::clone(&self.path),
            row: cursor.row,
            column: cursor.column,
        }
    }

    fn byte_at(&self, cursor: Cursor) -> Option<u8> {
        self.source.as_bytes().get(cursor.offset).copied()
    }

    /// Step over one byte, keeping row/column in sync.
    fn bump(&self, mut cursor: Cursor) -> Cursor {
        if let Some(byte) = self.byte_at(cursor) {
            if byte == b'\n' {
                cursor.row += 1;
                cursor.column = 0;
            } else if byte & 0xC0 != 0x80 {
                // UTF-8 continuation bytes belong to the previous column.
                cursor.column += 1;
            }
            cursor.offset += 1;
        }
        cursor
    }

    fn bump_while(&self, mut cursor: Cursor, pred: impl Fn(u8) -> bool) -> Cursor {
        while self.byte_at(cursor).is_some_and(&pred) {
            cursor = self.bump(cursor);
        }
        cursor
    }

    fn skip_line_comment(&self, cursor: Cursor) -> Cursor {
        let cursor = self.bump_while(cursor, |b| b != b'\n');
        // The newline is part of the comment.
        self.bump(cursor)
    }

    fn scan_from(&self, mut cursor: Cursor) -> (Token<'src>, Cursor) {
        loop {
            cursor = self.bump_while(cursor, is_space);

            let Some(first) = self.byte_at(cursor) else {
                let token = Token {
                    kind: TokenKind::EndOfFile,
                    text: "",
                    value: 0,
                    location: self.location_at(cursor),
                };
                return (token, cursor);
            };

            if first == b'/' && self.source.as_bytes().get(cursor.offset + 1) == Some(&b'/') {
                cursor = self.skip_line_comment(cursor);
                continue;
            }

            let start = cursor;
            let kind = if first.is_ascii_alphabetic() || first == b'_' {
                cursor = self.bump_while(cursor, |b| b.is_ascii_alphanumeric() || b == b'_');
                TokenKind::Identifier
            } else if first.is_ascii_digit() {
                cursor = self.bump_while(cursor, |b| b.is_ascii_digit());
                TokenKind::Integer
            } else if first == b'"' {
                let (kind, end) = self.read_string(cursor);
                cursor = end;
                kind
            } else if first.is_ascii_punctuation() {
                cursor = self.bump(cursor);
                TokenKind::Symbol
            } else {
                cursor = self.bump_while(cursor, |b| !is_space(b));
                TokenKind::Unknown
            };

            let text = &self.source[start.offset..cursor.offset];
            let value = if kind == TokenKind::Integer {
                // Literals too large for i64 saturate.
                text.parse().unwrap_or(i64::MAX)
            } else {
                0
            };

            let token = Token {
                kind,
                text,
                value,
                location: self.location_at(start),
            };
            return (token, cursor);
        }
    }

    /// Read a double-quoted literal starting at the opening quote.
    ///
    /// Without a closing quote on the same line the run degrades to an
    /// unknown token ending before the newline.
    fn read_string(&self, cursor: Cursor) -> (TokenKind, Cursor) {
        let mut cursor = self.bump(cursor);
        loop {
            match self.byte_at(cursor) {
                None | Some(b'\n') => return (TokenKind::Unknown, cursor),
                Some(b'"') => return (TokenKind::Str, self.bump(cursor)),
                Some(b'\\') => {
                    cursor = self.bump(cursor);
                    if self.byte_at(cursor).is_some_and(|b| b != b'\n') {
                        cursor = self.bump(cursor);
                    }
                }
                Some(_) => cursor = self.bump(cursor),
            }
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.is_eof() { None } else { Some(token) }
    }
}

const fn is_space(byte: u8) -> bool {
    byte.is_ascii_whitespace() || byte == 0x0B
}
