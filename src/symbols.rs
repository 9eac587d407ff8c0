//! Flat, insertion-ordered symbol tables.
//!
//! Lookup is a linear scan and the first record with a matching name wins.
//! Redeclaration checks are the caller's job: `declare` always appends.

use crate::token::Location;

/// Anything stored in a [`SymbolTable`].
pub trait Symbol {
    fn name(&self) -> &str;
}

/// A variable binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Var {
    pub name: String,
    /// Builtin library that provides the binding, e.g. `core:io`.
    pub library: Option<&'static str>,
    pub immutable: bool,
    /// `None` for library bindings.
    pub location: Option<Location>,
}

/// A function binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub library: Option<&'static str>,
    pub location: Option<Location>,
}

impl Symbol for Var {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Symbol for Function {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable<T> {
    entries: Vec<T>,
}

impl<T> Default for SymbolTable<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: Symbol> SymbolTable<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, even if the name already exists.
    pub fn declare(&mut self, symbol: T) {
        self.entries.push(symbol);
    }

    /// First record whose name equals `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&T> {
        self.entries.iter().find(|s| s.name() == name)
    }
}

/// Two-level variable scope: a function's locals over the globals.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub local: Option<&'a SymbolTable<Var>>,
    pub global: &'a SymbolTable<Var>,
}

impl<'a> Scope<'a> {
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&'a Var> {
        self.local
            .and_then(|local| local.find(name))
            .or_else(|| self.global.find(name))
    }
}
