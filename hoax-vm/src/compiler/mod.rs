// hoax-vm - Bytecode compiler and virtual machine for the Hoax language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Bytecode compiler: turns Hoax expressions into a [`Module`](crate::Module).
//!
//! Calls are resolved in two tiers. Heads found in the static built-in table
//! compile to a single opcode with a compile-time arity check. Every other
//! head compiles to a `CALL` that looks the name up in the global
//! environment when it runs.

pub mod builtins;
pub mod codegen;
pub mod emit;
pub mod types;

pub use builtins::{BUILTINS, Builtin, BuiltinTable};
pub use codegen::Compiler;
pub use emit::BytecodeEmitter;
pub use types::{CompileError, CompileErrorKind, Result};
