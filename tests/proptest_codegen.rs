//! Property-based tests with proptest.
//!
//! Generate small programs, compile them, and check the emitted
//! JavaScript against the declaration and expression rules.

mod common;

use std::collections::HashMap;

use common::{PROLOGUE, body, js, js_err, parse_all};
use dwoc_rs::{CodegenErrorKind, Error};
use proptest::prelude::*;

// -- Leaf strategies --

/// Identifier that is not a keyword.
fn ident() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,8}".prop_filter("keywords are not identifiers", |s| {
        !matches!(s.as_str(), "fn" | "let" | "use")
    })
}

/// Blank or comment-only chunk of source.
fn filler() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(" ".to_string()),
        Just("\t".to_string()),
        Just("\n".to_string()),
        Just("\r\n".to_string()),
        "[a-zA-Z0-9 ;:=+(){}\"-]{0,20}".prop_map(|text| format!("//{text}\n")),
    ]
}

#[derive(Debug, Clone)]
enum Operand {
    /// Value and the number of leading zeros written before it.
    Int(u16, usize),
    /// Index into the bound variables.
    Var(usize),
}

const VARS: [&str; 3] = ["a", "b", "c"];

fn operand() -> impl Strategy<Value = Operand> {
    prop_oneof![
        (any::<u16>(), 0..3usize).prop_map(|(n, zeros)| Operand::Int(n, zeros)),
        (0..VARS.len()).prop_map(Operand::Var),
    ]
}

/// First operand, then `(is_plus, operand)` pairs.
fn expression() -> impl Strategy<Value = (Operand, Vec<(bool, Operand)>)> {
    (
        operand(),
        prop::collection::vec((any::<bool>(), operand()), 0..8),
    )
}

fn operand_source(op: &Operand) -> String {
    match op {
        Operand::Int(n, zeros) => format!("{}{n}", "0".repeat(*zeros)),
        Operand::Var(i) => VARS[*i].to_string(),
    }
}

fn operand_value(op: &Operand, values: &[i64; 3]) -> i64 {
    match op {
        Operand::Int(n, _) => i64::from(*n),
        Operand::Var(i) => values[*i],
    }
}

/// Evaluate space-separated `operand (+|-) operand ...` text the way a
/// JavaScript engine would for numbers: left to right, equal precedence.
///
/// Integer literals must be plain decimal: a leading zero followed by more
/// digits is a legacy octal literal, which strict mode rejects.
fn eval_emitted(text: &str, bindings: &HashMap<&str, i64>) -> i64 {
    let mut parts = text.split(' ');
    let value_of = |part: &str| -> i64 {
        if part.starts_with(|c: char| c.is_ascii_digit()) {
            assert!(
                part == "0" || !part.starts_with('0'),
                "octal-style literal {part:?} in emitted code"
            );
            return part.parse().expect("decimal literal");
        }
        *bindings.get(part).expect("unbound operand")
    };
    let mut acc = value_of(parts.next().expect("empty expression"));
    while let Some(op) = parts.next() {
        let rhs = value_of(parts.next().expect("dangling operator"));
        acc = match op {
            "+" => acc + rhs,
            "-" => acc - rhs,
            other => panic!("unexpected operator {other:?}"),
        };
    }
    acc
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_whitespace_and_comments_emit_only_prologue(
        chunks in prop::collection::vec(filler(), 0..12)
    ) {
        let source = chunks.concat();
        prop_assert!(parse_all(&source).unwrap().is_empty());
        prop_assert_eq!(js(&source), PROLOGUE);
    }

    #[test]
    fn prop_declaration_mapping(name in ident(), value in any::<u32>(), mutable in any::<bool>()) {
        let marker = if mutable { ":=" } else { "::" };
        let keyword = if mutable { "let" } else { "const" };

        let top = js(&format!("let {name} {marker} {value};"));
        prop_assert_eq!(body(&top), format!("{keyword} {name} = {value};\n"));

        let local = js(&format!("fn main() {{ let {name} {marker} {value}; }}"));
        let expected = format!("  {keyword} {name} = {value};\n");
        prop_assert!(local.contains(&expected));
    }

    #[test]
    fn prop_redeclaration_rejected(
        name in ident(),
        first in any::<bool>(),
        second in any::<bool>(),
        in_body in any::<bool>(),
    ) {
        let marker = |mutable: bool| if mutable { ":=" } else { "::" };
        let decls = format!(
            "let {name} {} 1; let {name} {} 2;",
            marker(first),
            marker(second)
        );
        let source = if in_body {
            format!("fn main() {{ {decls} }}")
        } else {
            decls
        };
        match js_err(&source) {
            Error::Codegen(e) => {
                prop_assert_eq!(e.kind, CodegenErrorKind::Redeclaration { name: name.clone() });
            }
            Error::Parse(e) => {
                prop_assert!(false, "unexpected parse error: {}", e);
            }
        }
    }

    #[test]
    fn prop_expression_round_trip(
        (head, tail) in expression(),
        values in any::<[i16; 3]>(),
    ) {
        let values = values.map(i64::from);

        let mut source = String::from("fn main() { let result := ");
        source.push_str(&operand_source(&head));
        let mut expected = operand_value(&head, &values);
        for (plus, op) in &tail {
            source.push_str(if *plus { "+" } else { "-" });
            source.push_str(&operand_source(op));
            let rhs = operand_value(op, &values);
            expected = if *plus { expected + rhs } else { expected - rhs };
        }
        source.push_str("; }");

        let output = js(&source);
        let line = output
            .lines()
            .find_map(|l| l.strip_prefix("  let result = "))
            .and_then(|l| l.strip_suffix(';'))
            .expect("declaration line");

        let bindings: HashMap<&str, i64> = VARS.iter().copied().zip(values).collect();
        prop_assert_eq!(eval_emitted(line, &bindings), expected);
    }
}
