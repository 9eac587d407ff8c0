use std::fmt;

use log::debug;

use crate::ast::{self, Assignment, Expr, FnCall, FnDecl, Import, Node, NodeList, VarDecl};
use crate::diagnostic::{Diagnostic, Note};
use crate::lexer::Lexer;
use crate::token::{Location, Token, TokenKind};

pub const KEYWORD_FN: &str = "fn";
pub const KEYWORD_LET: &str = "let";
pub const KEYWORD_IMPORT: &str = "use";

const FN_STARTED: &str = "function declaration starts here";
const VAR_STARTED: &str = "variable declaration starts here";
const CALL_STARTED: &str = "function call starts here";
const IMPORT_STARTED: &str = "import statement starts here";
const DECL_MARKER: &str = "':=' for a mutable or '::' for an immutable variable";
const END_OF_STATEMENT: &str = "';' to end the statement";

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Input ended in the middle of a construct.
    UnexpectedEof { expected: &'static str },
    /// A token of the wrong kind or text.
    UnexpectedToken {
        expected: &'static str,
        kind: TokenKind,
        found: String,
    },
    /// A top-level token that starts no statement.
    UnknownStatement { kind: TokenKind, found: String },
    /// An identifier statement followed by something other than `=`, `(` or `;`.
    ExpectedStatementContinuation { kind: TokenKind, found: String },
    /// `use core:;`
    ImportTrailingColon,
    /// Colons and names out of order, e.g. `use :io;` or `use core io;`.
    InvalidImportPath,
    /// `use;`
    EmptyImport,
    /// `let NAME ::;`
    UninitializedConstant { name: String },
    /// Reserved grammar that is not built yet.
    Unimplemented { feature: &'static str },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof { expected } => {
                write!(f, "unexpected end of file: expected {expected}")
            }
            Self::UnexpectedToken {
                expected,
                kind,
                found,
            } => {
                write!(f, "unexpected {kind} `{found}`: expected {expected}")
            }
            Self::UnknownStatement { kind, found } => {
                write!(
                    f,
                    "don't know how to parse {kind} `{found}`: \
                     expected `fn`, `let` or `use` at the top level"
                )
            }
            Self::ExpectedStatementContinuation { kind, found } => {
                write!(f, "unexpected token: expected ';' or '()' but got {kind} `{found}`")
            }
            Self::ImportTrailingColon => {
                write!(
                    f,
                    "import name cannot end with a colon, did you forget to type something?"
                )
            }
            Self::InvalidImportPath => {
                write!(f, "invalid import path: imports are declared like `use core:io;`")
            }
            Self::EmptyImport => {
                write!(f, "missing import name: imports are declared like `use core:io;`")
            }
            Self::UninitializedConstant { name } => {
                write!(
                    f,
                    "immutable variable `{name}` must be initialized on declaration"
                )
            }
            Self::Unimplemented { feature } => {
                write!(f, "not implemented yet: {feature}")
            }
        }
    }
}

/// Error produced during parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{location}: {kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub location: Location,
    pub notes: Vec<Note>,
}

impl ParseError {
    const fn new(kind: ParseErrorKind, location: Location) -> Self {
        Self {
            kind,
            location,
            notes: Vec::new(),
        }
    }

    fn with_note(mut self, location: &Location, message: impl Into<String>) -> Self {
        self.notes.push(Note::new(location.clone(), message));
        self
    }

    #[must_use]
    pub const fn is_unimplemented(&self) -> bool {
        matches!(self.kind, ParseErrorKind::Unimplemented { .. })
    }

    #[must_use]
    pub fn diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.location.clone(), self.kind.to_string()).with_notes(&self.notes)
    }
}

/// Recursive-descent parser yielding one top-level statement per call.
#[derive(Debug, Clone)]
pub struct Parser<'src> {
    lexer: Lexer<'src>,
}

impl<'src> Parser<'src> {
    #[must_use]
    pub const fn new(lexer: Lexer<'src>) -> Self {
        Self { lexer }
    }

    /// Parse the next top-level statement.
    ///
    /// Returns [`Node::EndOfFile`] once the input is exhausted. After an
    /// error the lexer position is unspecified and parsing must stop.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` on any grammar violation.
    pub fn next_statement(&mut self) -> Result<Node<'src>, ParseError> {
        let token = self.lexer.next_token();
        let node = match token.kind {
            TokenKind::EndOfFile => Node::EndOfFile {
                location: token.location,
            },
            _ if token.is_keyword(KEYWORD_FN) => self.parse_fn_decl(token)?,
            _ if token.is_keyword(KEYWORD_IMPORT) => self.parse_import(token)?,
            _ if token.is_keyword(KEYWORD_LET) => self.parse_var_decl(token)?,
            _ => {
                return Err(ParseError::new(
                    ParseErrorKind::UnknownStatement {
                        kind: token.kind,
                        found: token.text.to_string(),
                    },
                    token.location,
                ));
            }
        };
        debug!("parsed {} at {}", node.kind_name(), node.location());
        Ok(node)
    }

    fn unexpected(token: Token<'_>, expected: &'static str) -> ParseError {
        if token.is_eof() {
            ParseError::new(ParseErrorKind::UnexpectedEof { expected }, token.location)
        } else {
            ParseError::new(
                ParseErrorKind::UnexpectedToken {
                    expected,
                    kind: token.kind,
                    found: token.text.to_string(),
                },
                token.location,
            )
        }
    }

    fn expect_symbol(
        &mut self,
        symbol: &str,
        expected: &'static str,
    ) -> Result<Token<'src>, ParseError> {
        let token = self.lexer.next_token();
        if token.is_symbol(symbol) {
            Ok(token)
        } else {
            Err(Self::unexpected(token, expected))
        }
    }

    fn expect_identifier(&mut self, expected: &'static str) -> Result<Token<'src>, ParseError> {
        let token = self.lexer.next_token();
        if token.kind == TokenKind::Identifier {
            Ok(token)
        } else {
            Err(Self::unexpected(token, expected))
        }
    }

    fn parse_fn_decl(&mut self, keyword: Token<'src>) -> Result<Node<'src>, ParseError> {
        let start = keyword.location;
        let note = |e: ParseError| e.with_note(&start, FN_STARTED);

        let name = self.expect_identifier("a function name").map_err(note)?;
        self.expect_symbol("(", "'(' after the function name")
            .map_err(note)?;
        let params = self.parse_params().map_err(note)?;
        let body = self.parse_body().map_err(note)?;

        Ok(Node::FnDecl(FnDecl {
            name: name.text,
            params,
            body,
            location: name.location,
        }))
    }

    fn parse_params(&mut self) -> Result<NodeList<'src>, ParseError> {
        let token = self.lexer.next_token();
        if token.is_symbol(")") {
            return Ok(Vec::new());
        }
        if token.kind == TokenKind::Identifier {
            return Err(ParseError::new(
                ParseErrorKind::Unimplemented {
                    feature: "function parameters",
                },
                token.location,
            ));
        }
        Err(Self::unexpected(token, "')' to close the parameter list"))
    }

    fn parse_body(&mut self) -> Result<NodeList<'src>, ParseError> {
        self.expect_symbol("{", "'{' to open the function body")?;

        let mut body = Vec::new();
        loop {
            let token = self.lexer.next_token();
            match token.kind {
                TokenKind::EndOfFile => {
                    return Err(Self::unexpected(token, "'}' to close the function body"));
                }
                TokenKind::Symbol if token.text == "}" => break,
                // Empty statement.
                TokenKind::Symbol if token.text == ";" => {}
                TokenKind::Identifier if token.text == KEYWORD_LET => {
                    body.push(self.parse_var_decl(token)?);
                }
                TokenKind::Identifier if token.text == KEYWORD_FN => {
                    body.push(self.parse_fn_decl(token)?);
                }
                TokenKind::Identifier => {
                    body.push(self.parse_identifier_statement(token)?);
                }
                TokenKind::Integer | TokenKind::Str => {
                    self.expect_symbol(";", END_OF_STATEMENT)?;
                    body.push(Node::Token(token));
                }
                TokenKind::Symbol | TokenKind::Unknown => body.push(Node::Token(token)),
            }
        }
        Ok(body)
    }

    fn parse_identifier_statement(&mut self, name: Token<'src>) -> Result<Node<'src>, ParseError> {
        let next = self.lexer.next_token();
        if next.is_symbol("=") {
            return self.parse_assignment(name);
        }
        if next.is_symbol("(") {
            return self.parse_fn_call(name);
        }
        if next.is_symbol(";") {
            return Ok(Node::Token(name));
        }
        if next.is_eof() {
            return Err(Self::unexpected(next, "';' or '()' after the identifier")
                .with_note(&name.location, "hanging statement starts here"));
        }
        Err(ParseError::new(
            ParseErrorKind::ExpectedStatementContinuation {
                kind: next.kind,
                found: next.text.to_string(),
            },
            next.location,
        ))
    }

    fn parse_assignment(&mut self, name: Token<'src>) -> Result<Node<'src>, ParseError> {
        let message = format!("invalid rvalue in assignment to `{}`", name.text);
        let location = name.location.clone();
        let note = |e: ParseError| e.with_note(&location, message.as_str());

        let initializer = self.parse_expr().map_err(note)?;
        self.expect_symbol(";", END_OF_STATEMENT).map_err(note)?;

        Ok(Node::Assignment(Assignment {
            name: name.text,
            initializer,
            location: name.location,
        }))
    }

    fn parse_fn_call(&mut self, name: Token<'src>) -> Result<Node<'src>, ParseError> {
        let start = name.location.clone();
        let note = |e: ParseError| e.with_note(&start, CALL_STARTED);

        let mut args = Vec::new();
        if self.lexer.peek().is_symbol(")") {
            self.lexer.next_token();
        } else {
            loop {
                let location = self.lexer.peek().location;
                let mut items = self.parse_expr().map_err(note)?;
                let arg = if items.len() == 1 {
                    items.remove(0)
                } else {
                    Node::Expr(Expr { items, location })
                };
                args.push(arg);

                let separator = self.lexer.next_token();
                if separator.is_symbol(",") {
                    continue;
                }
                if separator.is_symbol(")") {
                    break;
                }
                return Err(note(Self::unexpected(
                    separator,
                    "',' or ')' in the argument list",
                )));
            }
        }
        self.expect_symbol(";", END_OF_STATEMENT).map_err(note)?;

        Ok(Node::FnCall(FnCall {
            name: name.text,
            args,
            location: name.location,
        }))
    }

    /// `Operand (('+' | '-') Operand)*` with no precedence or grouping.
    fn parse_expr(&mut self) -> Result<NodeList<'src>, ParseError> {
        let mut items = Vec::new();
        loop {
            let operand = self.lexer.next_token();
            if !ast::is_operand(operand.kind) {
                return Err(Self::unexpected(operand, "an identifier or integer operand"));
            }
            items.push(Node::Token(operand));

            let next = self.lexer.peek();
            if next.is_symbol("+") || next.is_symbol("-") {
                items.push(Node::Token(self.lexer.next_token()));
            } else {
                return Ok(items);
            }
        }
    }

    fn parse_var_decl(&mut self, keyword: Token<'src>) -> Result<Node<'src>, ParseError> {
        let start = keyword.location;
        let note = |e: ParseError| e.with_note(&start, VAR_STARTED);

        let name = self.expect_identifier("a variable name").map_err(note)?;
        self.expect_symbol(":", DECL_MARKER).map_err(note)?;

        let marker = self.lexer.next_token();
        let mutable = if marker.is_symbol("=") {
            true
        } else if marker.is_symbol(":") {
            false
        } else {
            return Err(note(Self::unexpected(marker, DECL_MARKER)));
        };

        let initializer = if self.lexer.peek().is_symbol(";") {
            Vec::new()
        } else {
            self.parse_expr().map_err(note)?
        };

        if !mutable && initializer.is_empty() {
            return Err(note(ParseError::new(
                ParseErrorKind::UninitializedConstant {
                    name: name.text.to_string(),
                },
                name.location,
            )));
        }

        self.expect_symbol(";", END_OF_STATEMENT).map_err(note)?;

        Ok(Node::VarDecl(VarDecl {
            name: name.text,
            initializer,
            mutable,
            location: name.location,
        }))
    }

    fn parse_import(&mut self, keyword: Token<'src>) -> Result<Node<'src>, ParseError> {
        let start = keyword.location;
        let note = |e: ParseError| e.with_note(&start, IMPORT_STARTED);

        let mut name = String::new();
        let mut last_colon = None;
        let mut previous = TokenKind::Symbol;

        let end = loop {
            let token = self.lexer.next_token();
            if token.is_symbol(";") {
                break token.location;
            }
            if token.is_symbol(":") {
                if previous != TokenKind::Identifier {
                    return Err(note(ParseError::new(
                        ParseErrorKind::InvalidImportPath,
                        token.location,
                    )));
                }
                previous = TokenKind::Symbol;
                last_colon = Some(token.location);
                name.push(':');
                continue;
            }
            if token.kind == TokenKind::Identifier {
                if previous == TokenKind::Identifier {
                    return Err(note(ParseError::new(
                        ParseErrorKind::InvalidImportPath,
                        token.location,
                    )));
                }
                previous = TokenKind::Identifier;
                name.push_str(token.text);
                continue;
            }
            return Err(note(Self::unexpected(token, "an import name or ';'")));
        };

        if name.is_empty() {
            return Err(note(ParseError::new(ParseErrorKind::EmptyImport, end)));
        }
        if name.ends_with(':') {
            let location = last_colon.unwrap_or(end);
            return Err(note(ParseError::new(
                ParseErrorKind::ImportTrailingColon,
                location,
            )));
        }

        Ok(Node::Import(Import {
            name,
            alias: None,
            is_local: false,
            location: start,
        }))
    }
}
