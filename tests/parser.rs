//! Parser edge cases and error tests.

mod common;

use common::{parse_all, parse_err};
use dwoc_rs::{Node, ParseErrorKind, TokenKind};

// -----------------------------------------------------------
// Statements.
// -----------------------------------------------------------

#[test]
fn parse_whitespace_and_comments_only() {
    assert!(parse_all("  // nothing here\n\n\t// still nothing\n").unwrap().is_empty());
}

#[test]
fn parse_fn_decl_body() {
    let nodes = parse_all("fn main() { let x := 5; x = x + 1; f(x, 2); }").unwrap();
    assert_eq!(nodes.len(), 1);
    let Node::FnDecl(decl) = &nodes[0] else {
        panic!("expected a function, got {:?}", nodes[0]);
    };
    assert_eq!(decl.name, "main");
    assert!(decl.params.is_empty());
    assert_eq!(decl.body.len(), 3);
    assert!(matches!(decl.body[0], Node::VarDecl(_)));
    assert!(matches!(decl.body[1], Node::Assignment(_)));
    assert!(matches!(decl.body[2], Node::FnCall(_)));
}

#[test]
fn parse_top_level_let() {
    let nodes = parse_all("let answer :: 42;").unwrap();
    let Node::VarDecl(decl) = &nodes[0] else {
        panic!("expected a declaration");
    };
    assert_eq!(decl.name, "answer");
    assert!(!decl.mutable);
    assert_eq!(decl.initializer.len(), 1);
}

#[test]
fn parse_mutable_without_initializer() {
    let nodes = parse_all("let x :=;").unwrap();
    let Node::VarDecl(decl) = &nodes[0] else {
        panic!("expected a declaration");
    };
    assert!(decl.mutable);
    assert!(decl.initializer.is_empty());
}

#[test]
fn parse_expression_is_flat() {
    let nodes = parse_all("let x := a + 1 - b;").unwrap();
    let Node::VarDecl(decl) = &nodes[0] else {
        panic!("expected a declaration");
    };
    let texts: Vec<String> = decl.initializer.iter().map(ToString::to_string).collect();
    assert_eq!(
        texts,
        vec![
            "Token::Ident(a)",
            "Token::Symbol(+)",
            "Token::Int(1)",
            "Token::Symbol(-)",
            "Token::Ident(b)",
        ]
    );
}

#[test]
fn parse_call_arguments() {
    let nodes = parse_all("fn main() { f(); g(a + 1, \"s\"); }").unwrap();
    let Node::FnDecl(decl) = &nodes[0] else {
        panic!("expected a function");
    };
    let Node::FnCall(empty) = &decl.body[0] else {
        panic!("expected a call");
    };
    assert!(empty.args.is_empty());
    let Node::FnCall(call) = &decl.body[1] else {
        panic!("expected a call");
    };
    assert_eq!(call.args.len(), 2);
    assert!(matches!(call.args[0], Node::Expr(_)));
    assert!(matches!(&call.args[1], Node::Token(t) if t.kind == TokenKind::Str));
}

#[test]
fn parse_dangling_atoms_and_empty_statements() {
    let nodes = parse_all("fn main() { ; x; 5; ; }").unwrap();
    let Node::FnDecl(decl) = &nodes[0] else {
        panic!("expected a function");
    };
    assert_eq!(decl.body.len(), 2);
    assert!(decl.body.iter().all(|n| matches!(n, Node::Token(_))));
}

#[test]
fn parse_nested_function() {
    let nodes = parse_all("fn outer() { fn inner() {} }").unwrap();
    let Node::FnDecl(decl) = &nodes[0] else {
        panic!("expected a function");
    };
    assert!(matches!(&decl.body[0], Node::FnDecl(inner) if inner.name == "inner"));
}

#[test]
fn parse_import_path() {
    let nodes = parse_all("use core:io;\nuse a:b:c;").unwrap();
    let names: Vec<&str> = nodes
        .iter()
        .map(|n| match n {
            Node::Import(import) => import.name.as_str(),
            _ => "",
        })
        .collect();
    assert_eq!(names, vec!["core:io", "a:b:c"]);
}

// -----------------------------------------------------------
// Parser errors.
// -----------------------------------------------------------

#[test]
fn parse_error_missing_close_paren() {
    let err = parse_err("fn f( { }");
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));
    assert_eq!((err.location.row, err.location.column), (1, 6));
    assert_eq!(err.notes[0].message, "function declaration starts here");
}

#[test]
fn parse_error_import_trailing_colon() {
    let err = parse_err("use core:;");
    assert_eq!(err.kind, ParseErrorKind::ImportTrailingColon);
    assert_eq!((err.location.row, err.location.column), (1, 8));
}

#[test]
fn parse_error_import_paths() {
    assert_eq!(parse_err("use :io;").kind, ParseErrorKind::InvalidImportPath);
    assert_eq!(parse_err("use core io;").kind, ParseErrorKind::InvalidImportPath);
    assert_eq!(parse_err("use core::io;").kind, ParseErrorKind::InvalidImportPath);
    assert_eq!(parse_err("use;").kind, ParseErrorKind::EmptyImport);
}

#[test]
fn parse_error_uninitialized_constant() {
    let err = parse_err("fn main() { let x ::; }");
    assert_eq!(
        err.kind,
        ParseErrorKind::UninitializedConstant {
            name: "x".to_string()
        }
    );
}

#[test]
fn parse_error_bad_declaration_marker() {
    let err = parse_err("let x : 5;");
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));
    assert_eq!(err.notes[0].message, "variable declaration starts here");
}

#[test]
fn parse_error_missing_semicolon() {
    let err = parse_err("fn main() { f() }");
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));
    assert_eq!(err.location.column, 16);
}

#[test]
fn parse_error_identifier_continuation() {
    let err = parse_err("fn main() { x + 1; }");
    assert!(matches!(
        err.kind,
        ParseErrorKind::ExpectedStatementContinuation { .. }
    ));
    assert!(err.kind.to_string().contains("expected ';' or '()'"));
}

#[test]
fn parse_error_unknown_top_level() {
    let err = parse_err("x = 1;");
    assert!(matches!(err.kind, ParseErrorKind::UnknownStatement { .. }));
}

#[test]
fn parse_error_unclosed_body() {
    let err = parse_err("fn main() { x;");
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedEof { .. }));
}

#[test]
fn parse_error_parameters_unimplemented() {
    let err = parse_err("fn f(a) {}");
    assert!(err.is_unimplemented());
}

#[test]
fn parse_error_diagnostic_format() {
    let err = parse_err("use core:;");
    let diag = err.diagnostic();
    assert!(diag.to_string().starts_with("test.dwo:1:8: [ERROR] "));
    assert_eq!(diag.notes.len(), 1);
}
