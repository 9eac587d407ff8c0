//! Compiler for the dwo language.
//!
//! Source text is lexed on demand, parsed one top-level statement at a
//! time, and each statement is turned into JavaScript before the next one
//! is read.
//!
//! # Quick start
//!
//! ```
//! use dwoc_rs::compile_js;
//!
//! let js = compile_js("main.dwo", "fn main() { let x :: 5; }").unwrap();
//! assert!(js.starts_with("\"use strict\";\n\n"));
//! assert!(js.contains("function main() {\n  const x = 5;\n}"));
//! ```
//!
//! ## Inspect the syntax tree
//!
//! ```
//! use dwoc_rs::dump_ir;
//!
//! let ir = dump_ir("main.dwo", "use core:io;").unwrap();
//! assert_eq!(ir, "Node::Import(core:io)\nNode::EndOfFile\n");
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod codegen;
pub mod compiler;
pub mod diagnostic;
pub mod lexer;
pub mod parser;
pub mod symbols;
pub mod token;

pub use ast::{Node, NodeList};
pub use codegen::{CodegenError, CodegenErrorKind, JsGenerator};
pub use compiler::{Compiler, Target};
pub use diagnostic::{Diagnostic, Note, Severity};
pub use lexer::{Lexer, tokenize};
pub use parser::{ParseError, ParseErrorKind, Parser};
pub use token::{Location, Token, TokenKind};

/// Unified error type covering both parsing and code generation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A parser error.
    #[error("{0}")]
    Parse(#[from] ParseError),
    /// A code generation error.
    #[error("{0}")]
    Codegen(#[from] CodegenError),
}

impl Error {
    /// Reserved constructs that are not built yet abort compilation.
    #[must_use]
    pub const fn is_unimplemented(&self) -> bool {
        match self {
            Self::Parse(e) => e.is_unimplemented(),
            Self::Codegen(e) => e.is_unimplemented(),
        }
    }

    #[must_use]
    pub const fn location(&self) -> &Location {
        match self {
            Self::Parse(e) => &e.location,
            Self::Codegen(e) => &e.location,
        }
    }

    #[must_use]
    pub fn diagnostic(&self) -> Diagnostic {
        match self {
            Self::Parse(e) => e.diagnostic(),
            Self::Codegen(e) => e.diagnostic(),
        }
    }
}

/// Compile a source string to JavaScript in one step.
pub fn compile_js(path: &str, source: &str) -> Result<String, Error> {
    Compiler::new(path, source).run(Target::JavaScript)
}

/// Parse a source string and render its IR dump.
pub fn dump_ir(path: &str, source: &str) -> Result<String, Error> {
    Compiler::new(path, source).run(Target::Ir)
}

/// Render the raw token stream of a source string.
pub fn dump_tokens(path: &str, source: &str) -> Result<String, Error> {
    Compiler::new(path, source).run(Target::Tokens)
}
