//! Streaming JavaScript generator.
//!
//! Each top-level node is rendered as soon as it is parsed and appended
//! to the output buffer. Text already emitted is never revisited, and a
//! statement that fails leaves the buffer untouched.

use std::fmt::{self, Write as _};

use log::debug;

use crate::ast::{self, Assignment, FnCall, FnDecl, Import, Node, VarDecl};
use crate::diagnostic::{Diagnostic, Note};
use crate::symbols::{Function, Scope, SymbolTable, Var};
use crate::token::{Location, Token, TokenKind};

/// The one builtin library the compiler knows about.
pub const CORE_IO: &str = "core:io";

const CORE_IO_VARS: [&str; 4] = ["stdin", "stdout", "stderr", "stdwarn"];
const CORE_IO_FNS: [&str; 4] = ["print", "println", "putchar", "flush"];

const PROLOGUE: &str = "\"use strict\";\n\n";

/// Buffered standard output. A line goes to `console.log` whenever a
/// newline is written or `flush` is called.
const CORE_IO_RUNTIME: &str = r"(function () {
  const decoder = new TextDecoder();
  const buffers = [null, '', '', ''];
  const stdin = 0, stdout = 1, stderr = 2, stdwarn = 3;
  globalThis.stdin = stdin; globalThis.stdout = stdout; globalThis.stderr = stderr; globalThis.stdwarn = stdwarn;
  const write = (text) => {
    const lines = `${text}`.split('\n');
    const last = lines.pop();
    for (const line of lines) {
      console.log(buffers[stdout] + line);
      buffers[stdout] = '';
    }
    buffers[stdout] += last;
  };
  const print = (...args) => { for (const arg of args) write(arg); };
  const println = (...args) => {
    print(...args);
    console.log(buffers[stdout]);
    buffers[stdout] = '';
  };
  const putchar = (...codes) => { write(decoder.decode(new Uint8Array(codes))); };
  const flush = () => {
    if (buffers[stdout]) console.log(buffers[stdout]);
    buffers[stdout] = '';
  };
  globalThis.print = print; globalThis.println = println; globalThis.putchar = putchar; globalThis.flush = flush;
})();";

/// Classifies a code generation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodegenErrorKind {
    /// Two variables with the same name in one table.
    Redeclaration { name: String },
    /// Two top-level functions with the same name.
    FunctionRedeclaration { name: String },
    /// Immutable declaration without an initializer.
    ConstantWithoutInitializer { name: String },
    /// Assignment whose target is a known immutable variable.
    AssignToConstant { name: String },
    /// Function declared inside a function body.
    NestedFunction { name: String },
    /// Something other than an operand or `+`/`-` inside an expression.
    UnsupportedInExpression { what: String },
    /// A construct that may only appear at the top level.
    Misplaced { what: &'static str },
    /// A builtin import clashes with an existing declaration.
    ImportConflict { library: &'static str, name: String },
    /// Reserved construct that is not built yet.
    Unimplemented { feature: String },
}

impl fmt::Display for CodegenErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Redeclaration { name } => {
                write!(f, "cannot redeclare existing variable `{name}`")
            }
            Self::FunctionRedeclaration { name } => {
                write!(f, "cannot redeclare existing function `{name}`")
            }
            Self::ConstantWithoutInitializer { name } => {
                write!(
                    f,
                    "constant variable `{name}` requires to be set on declaration"
                )
            }
            Self::AssignToConstant { name } => {
                write!(f, "cannot assign to immutable variable `{name}`")
            }
            Self::NestedFunction { name } => {
                write!(f, "closures are not supported yet: nested function `{name}`")
            }
            Self::UnsupportedInExpression { what } => {
                write!(f, "unsupported {what} in expression")
            }
            Self::Misplaced { what } => {
                write!(f, "{what} is not allowed inside a function body")
            }
            Self::ImportConflict { library, name } => {
                write!(f, "importing `{library}` would redeclare `{name}`")
            }
            Self::Unimplemented { feature } => {
                write!(f, "not implemented yet: {feature}")
            }
        }
    }
}

/// Error produced during code generation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{location}: {kind}")]
pub struct CodegenError {
    pub kind: CodegenErrorKind,
    pub location: Location,
    pub notes: Vec<Note>,
}

impl CodegenError {
    const fn new(kind: CodegenErrorKind, location: Location) -> Self {
        Self {
            kind,
            location,
            notes: Vec::new(),
        }
    }

    fn unimplemented(location: &Location, feature: impl Into<String>) -> Self {
        Self::new(
            CodegenErrorKind::Unimplemented {
                feature: feature.into(),
            },
            location.clone(),
        )
    }

    fn with_note(mut self, note: Note) -> Self {
        self.notes.push(note);
        self
    }

    #[must_use]
    pub const fn is_unimplemented(&self) -> bool {
        matches!(self.kind, CodegenErrorKind::Unimplemented { .. })
    }

    #[must_use]
    pub fn diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.location.clone(), self.kind.to_string()).with_notes(&self.notes)
    }
}

type CResult<T> = Result<T, CodegenError>;

/// State that outlives a single top-level statement.
#[derive(Debug, Default)]
pub struct Context {
    pub vars: SymbolTable<Var>,
    pub fns: SymbolTable<Function>,
    pub has_main: bool,
    /// Builtin libraries imported so far.
    pub imports: Vec<String>,
}

impl Context {
    #[must_use]
    pub fn has_imported(&self, library: &str) -> bool {
        self.imports.iter().any(|i| i == library)
    }
}

/// Append-only JavaScript emitter fed one top-level node at a time.
#[derive(Debug)]
pub struct JsGenerator {
    out: String,
    context: Context,
    warnings: Vec<Diagnostic>,
}

impl Default for JsGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl JsGenerator {
    /// Create a generator whose buffer already holds the strict-mode prologue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            out: PROLOGUE.to_string(),
            context: Context::default(),
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// Text emitted so far.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.out
    }

    #[must_use]
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Drain the warnings collected since the last call.
    pub fn take_warnings(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.warnings)
    }

    /// Generate one top-level node.
    ///
    /// # Errors
    ///
    /// Returns `CodegenError` on semantic errors; nothing is appended for
    /// the failing statement.
    pub fn generate(&mut self, node: &Node<'_>) -> CResult<()> {
        debug!("generating {} at {}", node.kind_name(), node.location());
        let mut text = String::new();

        match node {
            Node::EndOfFile { .. } => return Ok(()),
            Node::Token(token) => {
                self.warn(
                    token.location.clone(),
                    format!("dangling atom {} at top level", token.kind),
                );
                return Ok(());
            }
            Node::UnaryOp { location } | Node::BinaryOp { location } => {
                self.warn(
                    location.clone(),
                    format!("dangling molecule {} at top level", node.kind_name()),
                );
                return Ok(());
            }
            Node::FnParamsDecl { location } => {
                return Err(CodegenError::unimplemented(
                    location,
                    "dangling function parameter declaration",
                ));
            }
            Node::Import(import) => {
                if !self.import(&mut text, import)? {
                    return Ok(());
                }
            }
            Node::Expr(expr) => {
                self.warn(
                    expr.location.clone(),
                    "dangling expression with no usage found",
                );
                write_expr(&mut text, &expr.items)?;
                text.push(';');
            }
            Node::VarDecl(decl) => write_var_decl(&mut text, &mut self.context.vars, decl)?,
            Node::Assignment(assign) => {
                let scope = Scope {
                    local: None,
                    global: &self.context.vars,
                };
                write_assignment(&mut text, scope, assign)?;
            }
            Node::FnDecl(decl) => self.fn_decl(&mut text, decl)?,
            Node::FnCall(call) => write_call(&mut text, call)?,
        }

        self.out.push_str(&text);
        self.out.push('\n');
        Ok(())
    }

    /// Append the epilogue and return the whole program.
    #[must_use]
    pub fn finish(mut self) -> String {
        if self.context.has_main {
            self.out.push_str("\n{ const code = main(); ");
            if self.context.has_imported(CORE_IO) {
                self.out.push_str("flush(); ");
            }
            self.out.push_str(
                "if (typeof code === 'number' && code !== 0) { \
                 throw new Error(`Program exited with non-zero exit code: ${code}`); } }\n",
            );
        }
        self.out
    }

    fn warn(&mut self, location: Location, message: impl Into<String>) {
        self.warnings.push(Diagnostic::warning(location, message));
    }

    fn fn_decl(&mut self, out: &mut String, decl: &FnDecl<'_>) -> CResult<()> {
        if let Some(existing) = self.context.fns.find(decl.name) {
            return Err(CodegenError::new(
                CodegenErrorKind::FunctionRedeclaration {
                    name: decl.name.to_string(),
                },
                decl.location.clone(),
            )
            .with_note(origin_note(
                existing.location.as_ref(),
                existing.library,
                &decl.location,
                decl.name,
            )));
        }
        if let Some(param) = decl.params.first() {
            return Err(CodegenError::unimplemented(
                param.location(),
                "function parameters",
            ));
        }

        let mut locals = SymbolTable::new();
        let _ = writeln!(out, "function {}() {{", decl.name);
        for stmt in &decl.body {
            self.body_statement(out, &mut locals, stmt)?;
        }
        out.push('}');

        self.context.fns.declare(Function {
            name: decl.name.to_string(),
            library: None,
            location: Some(decl.location.clone()),
        });
        if decl.name == "main" {
            self.context.has_main = true;
        }
        Ok(())
    }

    fn body_statement(
        &mut self,
        out: &mut String,
        locals: &mut SymbolTable<Var>,
        node: &Node<'_>,
    ) -> CResult<()> {
        const INDENT: &str = "  ";

        match node {
            Node::Token(token) => {
                self.warn(
                    token.location.clone(),
                    format!(
                        "dangling atom {} with no operation or usage found",
                        token.kind
                    ),
                );
                if ast::is_operand(token.kind) {
                    out.push_str(INDENT);
                    write_operand(out, token);
                    out.push_str(";\n");
                }
            }
            Node::UnaryOp { location } | Node::BinaryOp { location } => {
                return Err(CodegenError::unimplemented(
                    location,
                    format!("compilation of {} molecules", node.kind_name()),
                ));
            }
            Node::FnParamsDecl { .. } => {
                return Err(CodegenError::new(
                    CodegenErrorKind::Misplaced {
                        what: "a function parameter declaration",
                    },
                    node.location().clone(),
                ));
            }
            Node::EndOfFile { location } => {
                return Err(CodegenError::new(
                    CodegenErrorKind::Misplaced {
                        what: "end of file",
                    },
                    location.clone(),
                ));
            }
            Node::Import(import) => {
                return Err(CodegenError::new(
                    CodegenErrorKind::Misplaced { what: "an import" },
                    import.location.clone(),
                ));
            }
            Node::Expr(expr) => {
                self.warn(
                    expr.location.clone(),
                    "dangling expression with no usage found",
                );
                out.push_str(INDENT);
                write_expr(out, &expr.items)?;
                out.push_str(";\n");
            }
            Node::VarDecl(decl) => {
                out.push_str(INDENT);
                write_var_decl(out, locals, decl)?;
                out.push('\n');
            }
            Node::Assignment(assign) => {
                let scope = Scope {
                    local: Some(locals),
                    global: &self.context.vars,
                };
                out.push_str(INDENT);
                write_assignment(out, scope, assign)?;
                out.push('\n');
            }
            Node::FnDecl(decl) => {
                return Err(CodegenError::new(
                    CodegenErrorKind::NestedFunction {
                        name: decl.name.to_string(),
                    },
                    decl.location.clone(),
                )
                .with_note(Note::new(
                    decl.location.clone(),
                    format!("function `{}` should be moved to the top level", decl.name),
                )));
            }
            Node::FnCall(call) => {
                out.push_str(INDENT);
                write_call(out, call)?;
                out.push('\n');
            }
        }
        Ok(())
    }

    /// Returns whether anything was emitted.
    fn import(&mut self, out: &mut String, import: &Import) -> CResult<bool> {
        if import.name != CORE_IO {
            return Err(CodegenError::unimplemented(
                &import.location,
                format!("imports other than `{CORE_IO}` (`{}`)", import.name),
            ));
        }
        if self.context.has_imported(CORE_IO) {
            self.warn(
                import.location.clone(),
                format!("`{CORE_IO}` is already imported"),
            );
            return Ok(false);
        }

        for name in CORE_IO_VARS {
            if let Some(existing) = self.context.vars.find(name) {
                return Err(import_conflict(import, name, existing.location.as_ref()));
            }
        }
        for name in CORE_IO_FNS {
            if let Some(existing) = self.context.fns.find(name) {
                return Err(import_conflict(import, name, existing.location.as_ref()));
            }
        }

        for name in CORE_IO_VARS {
            self.context.vars.declare(Var {
                name: name.to_string(),
                library: Some(CORE_IO),
                immutable: true,
                location: None,
            });
        }
        for name in CORE_IO_FNS {
            self.context.fns.declare(Function {
                name: name.to_string(),
                library: Some(CORE_IO),
                location: None,
            });
        }

        out.push_str(CORE_IO_RUNTIME);
        self.context.imports.push(CORE_IO.to_string());
        Ok(true)
    }
}

fn import_conflict(import: &Import, name: &str, existing: Option<&Location>) -> CodegenError {
    let err = CodegenError::new(
        CodegenErrorKind::ImportConflict {
            library: CORE_IO,
            name: name.to_string(),
        },
        import.location.clone(),
    );
    if let Some(location) = existing {
        return err.with_note(Note::new(location.clone(), "originally declared here"));
    }
    err
}

/// Note pointing at a previous declaration, or naming the library that
/// provides it.
fn origin_note(
    existing: Option<&Location>,
    library: Option<&str>,
    at: &Location,
    name: &str,
) -> Note {
    match (existing, library) {
        (Some(location), _) => Note::new(location.clone(), "originally declared here"),
        (None, Some(library)) => Note::new(at.clone(), format!("`{name}` is provided by `{library}`")),
        (None, None) => Note::new(at.clone(), format!("`{name}` was declared before")),
    }
}

fn write_var_decl(
    out: &mut String,
    table: &mut SymbolTable<Var>,
    decl: &VarDecl<'_>,
) -> CResult<()> {
    if let Some(existing) = table.find(decl.name) {
        return Err(CodegenError::new(
            CodegenErrorKind::Redeclaration {
                name: decl.name.to_string(),
            },
            decl.location.clone(),
        )
        .with_note(origin_note(
            existing.location.as_ref(),
            existing.library,
            &decl.location,
            decl.name,
        )));
    }
    if !decl.mutable && decl.initializer.is_empty() {
        return Err(CodegenError::new(
            CodegenErrorKind::ConstantWithoutInitializer {
                name: decl.name.to_string(),
            },
            decl.location.clone(),
        ));
    }

    out.push_str(if decl.mutable { "let " } else { "const " });
    out.push_str(decl.name);
    if !decl.initializer.is_empty() {
        out.push_str(" = ");
        write_expr(out, &decl.initializer)?;
    }
    out.push(';');

    table.declare(Var {
        name: decl.name.to_string(),
        library: None,
        immutable: !decl.mutable,
        location: Some(decl.location.clone()),
    });
    Ok(())
}

fn write_assignment(out: &mut String, scope: Scope<'_>, assign: &Assignment<'_>) -> CResult<()> {
    // Unknown names are let through; only known constants are rejected.
    if let Some(var) = scope.lookup(assign.name).filter(|v| v.immutable) {
        return Err(CodegenError::new(
            CodegenErrorKind::AssignToConstant {
                name: assign.name.to_string(),
            },
            assign.location.clone(),
        )
        .with_note(origin_note(
            var.location.as_ref(),
            var.library,
            &assign.location,
            assign.name,
        )));
    }

    out.push_str(assign.name);
    out.push_str(" = ");
    write_expr(out, &assign.initializer)?;
    out.push(';');
    Ok(())
}

fn write_call(out: &mut String, call: &FnCall<'_>) -> CResult<()> {
    out.push_str(call.name);
    out.push('(');
    for (i, arg) in call.args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        match arg {
            Node::Expr(expr) => write_expr(out, &expr.items)?,
            Node::Token(token) if ast::is_operand(token.kind) => write_operand(out, token),
            other => {
                return Err(unsupported(other).with_note(Note::new(
                    call.location.clone(),
                    "function call starts here",
                )));
            }
        }
    }
    out.push_str(");");
    Ok(())
}

/// Integer literals in decimal without leading zeros, other operands
/// verbatim.
///
/// Strict-mode JavaScript rejects `010`-style literals, and sloppy mode
/// would read them as octal.
fn write_operand(out: &mut String, token: &Token<'_>) {
    if token.kind == TokenKind::Integer {
        let digits = token.text.trim_start_matches('0');
        out.push_str(if digits.is_empty() { "0" } else { digits });
    } else {
        out.push_str(token.text);
    }
}

/// Operands, then `+`/`-` with surrounding spaces.
///
/// Both operators are left-associative with equal precedence in the
/// target too, so no parentheses are needed.
fn write_expr(out: &mut String, items: &[Node<'_>]) -> CResult<()> {
    for item in items {
        match item {
            Node::Token(token) if ast::is_operand(token.kind) => write_operand(out, token),
            Node::Token(token) if token.is_symbol("+") || token.is_symbol("-") => {
                out.push(' ');
                out.push_str(token.text);
                out.push(' ');
            }
            other => {
                let mut err = unsupported(other);
                if let Some(first) = items.first() {
                    err = err.with_note(Note::new(
                        first.location().clone(),
                        "expression starts here",
                    ));
                }
                return Err(err);
            }
        }
    }
    Ok(())
}

fn unsupported(node: &Node<'_>) -> CodegenError {
    let what = match node {
        Node::Token(token) => format!("{} `{}`", token.kind, token.text),
        other => other.kind_name().to_string(),
    };
    CodegenError::new(
        CodegenErrorKind::UnsupportedInExpression { what },
        node.location().clone(),
    )
}
