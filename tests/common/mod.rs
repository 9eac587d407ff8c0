#![allow(dead_code)]

use dwoc_rs::{Error, Lexer, Node, ParseError, Parser, compile_js};

pub const PATH: &str = "test.dwo";
pub const PROLOGUE: &str = "\"use strict\";\n\n";

/// Compile to JavaScript, panicking with the diagnostic on failure.
pub fn js(source: &str) -> String {
    compile_js(PATH, source).unwrap_or_else(|e| {
        panic!("compilation failed: {e}\n--- source ---\n{source}")
    })
}

/// Compile to JavaScript and return the error.
pub fn js_err(source: &str) -> Error {
    match compile_js(PATH, source) {
        Ok(output) => panic!("compilation should fail\n--- output ---\n{output}"),
        Err(e) => e,
    }
}

/// Generated text after the prologue.
pub fn body(output: &str) -> &str {
    output
        .strip_prefix(PROLOGUE)
        .unwrap_or_else(|| panic!("missing prologue:\n{output}"))
}

/// Parse every top-level statement, excluding the end-of-file node.
pub fn parse_all(source: &str) -> Result<Vec<Node<'_>>, ParseError> {
    let mut parser = Parser::new(Lexer::new(PATH, source));
    let mut nodes = Vec::new();
    loop {
        let node = parser.next_statement()?;
        if node.is_eof() {
            return Ok(nodes);
        }
        nodes.push(node);
    }
}

pub fn parse_err(source: &str) -> ParseError {
    match parse_all(source) {
        Ok(nodes) => panic!("parse should fail, got {} node(s)", nodes.len()),
        Err(e) => e,
    }
}
