// hoax-vm - Bytecode compiler and virtual machine for the Hoax language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Runtime errors for the VM.

use hoax_core::EnvError;
use thiserror::Error;

use crate::opcode::{DecodeError, OpCode};

/// Runtime error during VM execution.
///
/// Every variant is recoverable: the VM can be run again afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("type error: {op} expected {expected}, got {got}")]
    TypeError {
        op: &'static str,
        expected: &'static str,
        got: &'static str,
    },

    #[error("stack underflow")]
    StackUnderflow,

    #[error("stack overflow (limit {limit})")]
    StackOverflow { limit: usize },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow in {op}")]
    IntegerOverflow { op: &'static str },

    #[error("undefined function: {0}")]
    UndefinedFunction(String),

    #[error("'{name}' is bound to a {got}, which is not callable")]
    NotCallable { name: String, got: &'static str },

    #[error("'{name}' expects {expected} argument(s), only {got} on the stack")]
    ArityError {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("truthiness of symbol '{0}' is undefined")]
    TruthinessUndefined(String),

    #[error("invalid opcode 0x{byte:02X} at offset {offset:04X}")]
    InvalidOpcode { offset: usize, byte: u8 },

    #[error("{op} at offset {offset:04X} is missing its operand")]
    TruncatedOperand { offset: usize, op: OpCode },

    #[error("ran past the end of the code at offset {offset:04X}")]
    EndOfCode { offset: usize },

    #[error("constant {idx} at offset {offset:04X} is not in the pool")]
    InvalidConstant { offset: usize, idx: u8 },

    #[error("the VM has halted; reset it before running again")]
    Halted,

    #[error("{name}: {message}")]
    Native { name: String, message: String },

    #[error(transparent)]
    GlobalsFull(#[from] EnvError),

    #[error("output error: {0}")]
    Output(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DecodeError> for RuntimeError {
    fn from(e: DecodeError) -> Self {
        match e {
            DecodeError::InvalidOpcode { offset, byte } => {
                RuntimeError::InvalidOpcode { offset, byte }
            }
            DecodeError::TruncatedOperand { offset, op } => {
                RuntimeError::TruncatedOperand { offset, op }
            }
            DecodeError::EndOfCode { offset } => RuntimeError::EndOfCode { offset },
        }
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(e: std::io::Error) -> Self {
        RuntimeError::Output(e.to_string())
    }
}

/// Result type for VM operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
