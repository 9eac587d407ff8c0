//! Abstract syntax tree produced one top-level statement at a time.
//!
//! Every node owns its children; dropping a node drops the whole subtree.

use std::fmt::{self, Write as _};

use crate::token::{Location, Token, TokenKind};

/// Owned, order-preserving sequence of nodes.
pub type NodeList<'src> = Vec<Node<'src>>;

/// One syntactic construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<'src> {
    /// End of input, returned instead of a statement.
    EndOfFile { location: Location },
    /// Identifier, literal, or symbol standing on its own.
    Token(Token<'src>),
    /// `use core:io;`
    Import(Import),
    /// Reserved, never produced by the parser.
    UnaryOp { location: Location },
    /// Reserved, never produced by the parser.
    BinaryOp { location: Location },
    /// Reserved, never produced by the parser.
    FnParamsDecl { location: Location },
    Expr(Expr<'src>),
    VarDecl(VarDecl<'src>),
    Assignment(Assignment<'src>),
    FnDecl(FnDecl<'src>),
    FnCall(FnCall<'src>),
}

/// Import of a colon-separated path, e.g. `core:io`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Joined path; never ends with `:`.
    pub name: String,
    pub alias: Option<String>,
    pub is_local: bool,
    pub location: Location,
}

/// Flat left-to-right chain of operands and `+`/`-` symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr<'src> {
    pub items: NodeList<'src>,
    pub location: Location,
}

/// `let NAME := EXPR;` (mutable) or `let NAME :: EXPR;` (immutable).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDecl<'src> {
    pub name: &'src str,
    /// Empty only for mutable declarations.
    pub initializer: NodeList<'src>,
    pub mutable: bool,
    pub location: Location,
}

/// `NAME = EXPR;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment<'src> {
    pub name: &'src str,
    pub initializer: NodeList<'src>,
    pub location: Location,
}

/// `fn NAME() { BODY }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FnDecl<'src> {
    pub name: &'src str,
    pub params: NodeList<'src>,
    pub body: NodeList<'src>,
    pub location: Location,
}

/// `NAME(ARG, ...);`
///
/// Single-token arguments are stored as bare [`Node::Token`]s, longer
/// ones as [`Node::Expr`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FnCall<'src> {
    pub name: &'src str,
    pub args: NodeList<'src>,
    pub location: Location,
}

impl Node<'_> {
    #[must_use]
    pub const fn location(&self) -> &Location {
        match self {
            Self::EndOfFile { location }
            | Self::UnaryOp { location }
            | Self::BinaryOp { location }
            | Self::FnParamsDecl { location } => location,
            Self::Token(token) => &token.location,
            Self::Import(import) => &import.location,
            Self::Expr(expr) => &expr.location,
            Self::VarDecl(decl) => &decl.location,
            Self::Assignment(assign) => &assign.location,
            Self::FnDecl(decl) => &decl.location,
            Self::FnCall(call) => &call.location,
        }
    }

    /// Human readable kind name used in diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::EndOfFile { .. } => "End_Of_File",
            Self::Token(_) => "Token",
            Self::Import(_) => "Import",
            Self::UnaryOp { .. } => "Unary_Operation",
            Self::BinaryOp { .. } => "Binary_Operation",
            Self::FnParamsDecl { .. } => "Function_Parameters_Declaration",
            Self::Expr(_) => "Expression",
            Self::VarDecl(_) => "Variable_Declaration",
            Self::Assignment(_) => "Variable_Assignment",
            Self::FnDecl(_) => "Function_Declaration",
            Self::FnCall(_) => "Function_Call",
        }
    }

    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EndOfFile { .. })
    }
}

impl fmt::Display for Node<'_> {
    /// IR dump of the node, nested bodies indented two spaces per level.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        dump_node(&mut out, self, 0);
        f.write_str(&out)
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn ident(out: &mut String, name: &str) {
    let _ = write!(out, "Token::Ident({name})");
}

fn dump_list(out: &mut String, nodes: &[Node<'_>]) {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        dump_node(out, node, 0);
    }
}

fn dump_node(out: &mut String, node: &Node<'_>, depth: usize) {
    indent(out, depth);
    match node {
        Node::EndOfFile { .. } => out.push_str("Node::EndOfFile"),
        Node::Token(token) => {
            let _ = write!(out, "{token}");
        }
        Node::Import(import) => {
            let _ = write!(out, "Node::Import({})", import.name);
            if let Some(alias) = &import.alias {
                let _ = write!(out, " as {alias}");
            }
        }
        Node::UnaryOp { .. } => out.push_str("Node::UnaryOp"),
        Node::BinaryOp { .. } => out.push_str("Node::BinaryOp"),
        Node::FnParamsDecl { .. } => out.push_str("Node::FnParamsDecl"),
        Node::Expr(expr) => {
            out.push_str("Node::Expr(");
            dump_list(out, &expr.items);
            out.push(')');
        }
        Node::VarDecl(decl) => {
            let marker = if decl.mutable { "mutable" } else { "immutable" };
            let _ = write!(out, "Node::VarDecl<{marker}>(Token::Ident('{}')", decl.name);
            if !decl.initializer.is_empty() {
                out.push_str(", ");
                dump_list(out, &decl.initializer);
            }
            out.push(')');
        }
        Node::Assignment(assign) => {
            out.push_str("Node::VarAssign(");
            ident(out, assign.name);
            out.push_str(", ");
            dump_list(out, &assign.initializer);
            out.push(')');
        }
        Node::FnDecl(decl) => {
            let _ = write!(out, "Node::FnDecl(Token::Ident('{}'), [", decl.name);
            dump_list(out, &decl.params);
            out.push_str("]) {\n");
            for stmt in &decl.body {
                dump_node(out, stmt, depth + 1);
                out.push('\n');
            }
            indent(out, depth);
            out.push('}');
        }
        Node::FnCall(call) => {
            out.push_str("Node::FnCall(");
            ident(out, call.name);
            out.push_str(", [");
            dump_list(out, &call.args);
            out.push_str("])");
        }
    }
}

/// Whether a token may appear as an expression operand.
#[must_use]
pub const fn is_operand(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier | TokenKind::Integer | TokenKind::Str
    )
}
