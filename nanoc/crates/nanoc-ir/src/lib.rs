//! Three-address IR translation: the flat instruction list handed off
//! between semantic analysis and code generation.
//!
//! This stage performs no optimization and builds no control-flow graph —
//! it is a direct, mechanical lowering of the decorated AST in a single
//! linear pass.

pub mod builder;
pub mod ir;

pub use builder::build;
pub use ir::{Instr, Opcode, Operand};
