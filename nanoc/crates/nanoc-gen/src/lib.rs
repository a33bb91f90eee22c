//! x86-64 code generation: a linear, stack-machine emitter that turns one
//! program's flat IR into GNU-assembler text for a freestanding Linux
//! executable.

pub mod asm;
pub mod error;
pub mod runtime;

pub use asm::generate;
pub use error::CodegenError;
