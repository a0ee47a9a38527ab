// hoax-vm - Bytecode compiler and virtual machine for the Hoax language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Bytecode compiler and stack-based virtual machine for Hoax.
//!
//! Expressions read into an [`ExprStore`](hoax_parser::ExprStore) are compiled
//! into a [`Module`] of single-byte opcodes, which a [`Vm`] then executes
//! against the global environment.

pub mod compiler;
pub mod disasm;
pub mod module;
pub mod opcode;
mod utils;
pub mod vm;

pub use compiler::{CompileError, CompileErrorKind, Compiler};
pub use disasm::disassemble;
pub use module::{MAX_CONSTANTS, Module};
pub use opcode::{DecodeError, Instruction, OpCode, decode};
pub use vm::{DEFAULT_STACK_SIZE, RuntimeError, Vm, VmConfig, VmState};
