pub mod assembler;
pub mod backpatch;
pub mod config;
pub mod emit;
pub mod encoder;
pub mod error;
pub mod lexer;
pub mod operand;

pub mod isa {
    pub mod cond; // condition suffixes (.z, .nc, .nop, ...)
    pub mod reg;
}

pub use assembler::{assemble, Assembler, Program};
pub use config::{AsmConfig, OutputMode, PcAdvance};
pub use encoder::Instruction;
pub use error::{AsmError, Error};
