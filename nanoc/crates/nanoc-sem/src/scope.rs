//! The two symbol tables: a flat function table and a stack of variable
//! scopes, innermost on top.
//!
//! Both tables are owned by the [`crate::analysis::Analyzer`] for the
//! duration of its single pass and dropped with it — these tables exist
//! only during semantic analysis.

use rustc_hash::FxHashMap;

use nanoc_util::Symbol;

/// An entry in the function table: just enough to check arity at call
/// sites — the function table has no other use in this dialect, since
/// there is no overloading and only one return type.
#[derive(Debug, Clone, Copy)]
pub struct FuncEntry {
    pub arity: usize,
}

/// An entry in a variable scope: the frame-slot index assigned at
/// declaration time. Positive for parameters, negative for locals.
#[derive(Debug, Clone, Copy)]
pub struct VarEntry {
    pub slot: i32,
}

/// A single lexical scope: one flat map from name to binding. Scopes
/// never look inside each other directly; [`ScopeStack::resolve`] walks
/// the stack from innermost to outermost on the caller's behalf.
#[derive(Debug, Default)]
pub struct Scope {
    vars: FxHashMap<Symbol, VarEntry>,
}

/// The variable-scope stack. Pushed on function entry and on every nested
/// block (including the un-braced then/else arm of an `if`), popped on
/// exit.
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    pub fn enter(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn exit(&mut self) {
        self.scopes.pop();
    }

    /// `true` if `name` is already bound in the *innermost* scope only —
    /// redeclaration is checked against this scope alone, not any
    /// enclosing one.
    pub fn declared_in_current_scope(&self, name: Symbol) -> bool {
        self.scopes
            .last()
            .is_some_and(|scope| scope.vars.contains_key(&name))
    }

    /// Bind `name` to `slot` in the innermost scope. Caller is responsible
    /// for having already rejected a redeclaration.
    pub fn declare(&mut self, name: Symbol, slot: i32) {
        self.scopes
            .last_mut()
            .expect("a scope must be entered before declaring into it")
            .vars
            .insert(name, VarEntry { slot });
    }

    /// Resolve `name` from innermost to outermost scope, returning the
    /// first binding found.
    pub fn resolve(&self, name: Symbol) -> Option<VarEntry> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.vars.get(&name).copied())
    }
}
