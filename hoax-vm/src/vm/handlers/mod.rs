// hoax-vm - Bytecode compiler and virtual machine for the Hoax language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Opcode handlers, organised by category.

pub mod arithmetic;
pub mod builtins;
pub mod control;
pub mod heap;
pub mod variables;

use crate::opcode::OpCode;
use crate::vm::RuntimeError;

/// A handler was given an opcode from another category.
pub(crate) fn unexpected(handler: &str, op: OpCode) -> RuntimeError {
    RuntimeError::Internal(format!("{}: unexpected opcode {}", handler, op))
}
