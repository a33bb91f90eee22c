//! The semantic error taxonomy: redeclaration, undeclared function,
//! undeclared variable, wrong argument count. Every one of these is fatal
//! and carries no recovery path — the analyzer returns on the first
//! violation instead of accumulating diagnostics.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SemError {
    #[error("redeclaration of function `{name}`")]
    FunctionRedeclared { name: String },

    #[error("redeclaration of variable `{name}` in the same scope")]
    VariableRedeclared { name: String },

    #[error("`{name}` is already declared as a function and cannot be used as a variable")]
    VariableShadowsFunction { name: String },

    #[error("call to undeclared function `{name}`")]
    UndeclaredFunction { name: String },

    #[error("use of undeclared variable `{name}`")]
    UndeclaredVariable { name: String },

    #[error("`{name}` expects {expected} argument(s), found {found}")]
    WrongArgumentCount {
        name: String,
        expected: usize,
        found: usize,
    },
}

pub type SemResult<T> = Result<T, SemError>;
