//! Code generation errors: the generator assumes a well-formed,
//! semantically valid IR and does not re-check it, so
//! [`CodegenError::Malformed`] signals a compiler bug rather than a
//! user-reportable error. [`CodegenError::PrintHasNoValue`] is the one
//! exception — `print` carries no return value, and nothing earlier in
//! the pipeline rejects a program that uses it as one, so the generator
//! must catch it here.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodegenError {
    #[error("print() has no return value and cannot be used in an expression")]
    PrintHasNoValue,

    #[error("malformed IR: {0}")]
    Malformed(String),
}

pub type CodegenResult<T> = Result<T, CodegenError>;
