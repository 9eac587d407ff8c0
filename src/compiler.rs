//! Compilation driver tying the lexer, parser, and generator together.

use std::fmt::Write as _;
use std::sync::Arc;

use log::{debug, info};

use crate::Error;
use crate::codegen::JsGenerator;
use crate::diagnostic::Diagnostic;
use crate::lexer::Lexer;
use crate::parser::Parser;

/// What to produce from a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    #[default]
    JavaScript,
    /// Debug dump of the syntax tree.
    Ir,
    /// Debug dump of the raw token stream.
    Tokens,
}

impl Target {
    /// File extension of the produced artifact, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::JavaScript => "js",
            Self::Ir => "ir",
            Self::Tokens => "tokens",
        }
    }
}

/// A single source file and the warnings collected while compiling it.
#[derive(Debug)]
pub struct Compiler<'src> {
    path: Arc<str>,
    source: &'src str,
    warnings: Vec<Diagnostic>,
}

impl<'src> Compiler<'src> {
    pub fn new(path: impl Into<Arc<str>>, source: &'src str) -> Self {
        Self {
            path: path.into(),
            source,
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Run one target over the whole source.
    ///
    /// Warnings gathered before a failure stay available through
    /// [`Compiler::warnings`].
    pub fn run(&mut self, target: Target) -> Result<String, Error> {
        info!("compiling {} to {target:?}", self.path);
        match target {
            Target::JavaScript => self.javascript(),
            Target::Ir => self.ir(),
            Target::Tokens => Ok(self.tokens()),
        }
    }

    fn lexer(&self) -> Lexer<'src> {
        Lexer::new(Arc::clone(&self.path), self.source)
    }

    fn javascript(&mut self) -> Result<String, Error> {
        let mut parser = Parser::new(self.lexer());
        let mut generator = JsGenerator::new();
        let mut statements = 0usize;

        loop {
            let node = parser.next_statement()?;
            if node.is_eof() {
                break;
            }
            let result = generator.generate(&node);
            self.warnings.extend(generator.take_warnings());
            result?;
            statements += 1;
        }

        debug!("generated {statements} top-level statement(s)");
        Ok(generator.finish())
    }

    fn ir(&self) -> Result<String, Error> {
        let mut parser = Parser::new(self.lexer());
        let mut out = String::new();
        loop {
            let node = parser.next_statement()?;
            let _ = writeln!(out, "{node}");
            if node.is_eof() {
                return Ok(out);
            }
        }
    }

    fn tokens(&self) -> String {
        let mut lexer = self.lexer();
        let mut out = String::new();
        loop {
            let token = lexer.next_token();
            let _ = writeln!(out, "{token}");
            if token.is_eof() {
                return out;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_survive_a_failure() {
        let mut compiler = Compiler::new("test.dwo", "fn main() { x; y() }");
        assert!(compiler.run(Target::JavaScript).is_err());
        assert_eq!(compiler.warnings().len(), 0);

        let mut compiler = Compiler::new("test.dwo", "fn f() { 1; }\nfn f() {}");
        assert!(compiler.run(Target::JavaScript).is_err());
        assert_eq!(compiler.warnings().len(), 1);
    }

    #[test]
    fn ir_ends_with_eof() {
        let mut compiler = Compiler::new("test.dwo", "use core:io;");
        assert_eq!(
            compiler.run(Target::Ir).expect("ir"),
            "Node::Import(core:io)\nNode::EndOfFile\n"
        );
    }

    #[test]
    fn tokens_end_with_eof() {
        let mut compiler = Compiler::new("test.dwo", "let x");
        assert_eq!(
            compiler.run(Target::Tokens).expect("tokens"),
            "Token::Ident(let)\nToken::Ident(x)\nToken::EOF\n"
        );
    }

    #[test]
    fn extensions() {
        assert_eq!(Target::default().extension(), "js");
        assert_eq!(Target::Ir.extension(), "ir");
    }
}
