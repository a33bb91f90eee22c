//! The semantic analyzer: scoped name resolution, frame-slot assignment,
//! and arity checking, walking the AST top-down in a single pass and
//! decorating it in place.
//!
//! Functions are registered into the function table one at a time,
//! immediately before their own body is walked (not in a separate
//! forward-declaration pass), so a function may only call callees already
//! registered — itself and anything declared earlier in the file.

use rustc_hash::FxHashMap;

use nanoc_par::{Condition, Exp, Func, FuncCall, Program, Stmt};
use nanoc_util::symbol::Interner;
use nanoc_util::Symbol;

use crate::error::{SemError, SemResult};
use crate::scope::{FuncEntry, ScopeStack};

/// Analyze a whole program: populate the function table, resolve every
/// variable use and function call, and write frame-slot indices and each
/// function's `nbr_locals` back into the AST.
pub fn analyze(program: &Program, interner: &Interner) -> SemResult<()> {
    let mut analyzer = Analyzer::new(interner);
    for func in program {
        analyzer.analyze_func(func)?;
    }
    Ok(())
}

struct Analyzer<'i> {
    interner: &'i Interner,
    func_table: FxHashMap<Symbol, FuncEntry>,
    scopes: ScopeStack,
}

impl<'i> Analyzer<'i> {
    fn new(interner: &'i Interner) -> Self {
        let mut func_table = FxHashMap::default();
        // The one built-in callee, always arity 1.
        func_table.insert(interner.kw_print(), FuncEntry { arity: 1 });
        Self {
            interner,
            func_table,
            scopes: ScopeStack::new(),
        }
    }

    fn name_of(&self, sym: Symbol) -> String {
        self.interner.resolve(sym).unwrap_or("<?>").to_string()
    }

    fn declare_var(&mut self, name: Symbol, slot: i32) -> SemResult<()> {
        if self.func_table.contains_key(&name) {
            return Err(SemError::VariableShadowsFunction {
                name: self.name_of(name),
            });
        }
        if self.scopes.declared_in_current_scope(name) {
            return Err(SemError::VariableRedeclared {
                name: self.name_of(name),
            });
        }
        self.scopes.declare(name, slot);
        Ok(())
    }

    fn resolve_var(&self, name: Symbol) -> SemResult<i32> {
        self.scopes
            .resolve(name)
            .map(|entry| entry.slot)
            .ok_or_else(|| SemError::UndeclaredVariable {
                name: self.name_of(name),
            })
    }

    fn check_call(&self, call: &FuncCall) -> SemResult<()> {
        let entry = self
            .func_table
            .get(&call.name)
            .ok_or_else(|| SemError::UndeclaredFunction {
                name: self.name_of(call.name),
            })?;
        if entry.arity != call.args.len() {
            return Err(SemError::WrongArgumentCount {
                name: self.name_of(call.name),
                expected: entry.arity,
                found: call.args.len(),
            });
        }
        Ok(())
    }

    /// Register `func` in the function table, then walk its body in one
    /// scope shared by its parameters and top-level statements — a
    /// *nested* block within the body gets its own additional scope (see
    /// [`Self::analyze_stmt`]'s `Stmt::Block` arm), but the body itself
    /// does not push a second scope on top of the parameter scope (spec
    /// section 4.4: "a fresh scope is pushed on function entry").
    fn analyze_func(&mut self, func: &Func) -> SemResult<()> {
        if self.func_table.contains_key(&func.name) {
            return Err(SemError::FunctionRedeclared {
                name: self.name_of(func.name),
            });
        }
        self.func_table.insert(
            func.name,
            FuncEntry {
                arity: func.params.len(),
            },
        );

        self.scopes.enter();
        let mut next_param_slot: i32 = 2;
        for param in &func.params {
            self.declare_var(param.name, next_param_slot)?;
            param.slot.set(Some(next_param_slot));
            next_param_slot += 1;
        }

        let mut nbr_locals: u32 = 0;
        for stmt in &func.body.stmts {
            self.analyze_stmt(stmt, &mut nbr_locals)?;
        }
        self.scopes.exit();
        func.nbr_locals.set(Some(nbr_locals));
        Ok(())
    }

    fn analyze_stmt(&mut self, stmt: &Stmt, nbr_locals: &mut u32) -> SemResult<()> {
        match stmt {
            Stmt::Decl { name, init, slot, .. } => {
                *nbr_locals += 1;
                let this_slot = -(*nbr_locals as i32);
                self.declare_var(*name, this_slot)?;
                slot.set(Some(this_slot));
                if let Some(exp) = init {
                    self.analyze_exp(exp)?;
                }
            }
            Stmt::Assignment { name, exp, slot, .. } => {
                let resolved = self.resolve_var(*name)?;
                slot.set(Some(resolved));
                self.analyze_exp(exp)?;
            }
            Stmt::Call(call) => {
                self.check_call(call)?;
                for arg in &call.args {
                    self.analyze_exp(arg)?;
                }
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                self.analyze_condition(cond)?;
                self.analyze_branch(then_branch, nbr_locals)?;
                if let Some(else_branch) = else_branch {
                    self.analyze_branch(else_branch, nbr_locals)?;
                }
            }
            Stmt::Return { exp, .. } => self.analyze_exp(exp)?,
            Stmt::Block(block) => {
                self.scopes.enter();
                for stmt in &block.stmts {
                    self.analyze_stmt(stmt, nbr_locals)?;
                }
                self.scopes.exit();
            }
        }
        Ok(())
    }

    /// Analyze the then/else arm of an `if`, always under a single fresh
    /// scope — if the arm is itself a brace-delimited block, its
    /// statements are walked directly under *that* one scope rather than
    /// pushing a second, redundant one, even when the arm isn't itself
    /// wrapped in explicit braces.
    fn analyze_branch(&mut self, stmt: &Stmt, nbr_locals: &mut u32) -> SemResult<()> {
        self.scopes.enter();
        let result = match stmt {
            Stmt::Block(block) => {
                let mut result = Ok(());
                for stmt in &block.stmts {
                    result = self.analyze_stmt(stmt, nbr_locals);
                    if result.is_err() {
                        break;
                    }
                }
                result
            }
            other => self.analyze_stmt(other, nbr_locals),
        };
        self.scopes.exit();
        result
    }

    fn analyze_condition(&mut self, cond: &Condition) -> SemResult<()> {
        self.analyze_exp(&cond.left)?;
        if let Some((_, right)) = &cond.rel {
            self.analyze_exp(right)?;
        }
        Ok(())
    }

    fn analyze_exp(&mut self, exp: &Exp) -> SemResult<()> {
        match exp {
            Exp::Literal { .. } => Ok(()),
            Exp::Var { name, slot, .. } => {
                let resolved = self.resolve_var(*name)?;
                slot.set(Some(resolved));
                Ok(())
            }
            Exp::Call(call) => {
                self.check_call(call)?;
                for arg in &call.args {
                    self.analyze_exp(arg)?;
                }
                Ok(())
            }
            Exp::Binary { left, right, .. } => {
                self.analyze_exp(left)?;
                self.analyze_exp(right)?;
                Ok(())
            }
        }
    }
}
