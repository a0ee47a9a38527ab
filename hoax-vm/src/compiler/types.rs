// hoax-vm - Bytecode compiler and virtual machine for the Hoax language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Shared types for the bytecode compiler.

use hoax_parser::{Location, MAX_NESTING_DEPTH, ReaderError};
use thiserror::Error;

use crate::module::MAX_CONSTANTS;

/// What went wrong during compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileErrorKind {
    #[error("unknown builtin '{0}'")]
    UnknownBuiltin(String),

    #[error("'{0}' is a literal and cannot be called")]
    UnknownFunction(String),

    #[error("expected a symbol at the head of the list, found {0}")]
    ExpectedSymbol(String),

    #[error("'{form}' expects {expected} argument(s), got {got}")]
    ArityMismatch {
        form: String,
        expected: usize,
        got: usize,
    },

    #[error("too many constants in one module (limit {MAX_CONSTANTS})")]
    TooManyConstants,

    #[error("jump of {0} bytes does not fit in 16 bits")]
    JumpTooLarge(usize),

    #[error("lists nested more than {MAX_NESTING_DEPTH} deep")]
    TooDeep,

    #[error(transparent)]
    Reader(#[from] ReaderError),
}

/// Error during compilation, located at the offending expression when known.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{kind}", .location.map(|l| format!("{}: error: ", l)).unwrap_or_default())]
pub struct CompileError {
    pub kind: CompileErrorKind,
    pub location: Option<Location>,
}

impl CompileError {
    pub fn new(kind: CompileErrorKind, location: Option<Location>) -> Self {
        CompileError { kind, location }
    }
}

impl From<CompileErrorKind> for CompileError {
    fn from(kind: CompileErrorKind) -> Self {
        CompileError {
            kind,
            location: None,
        }
    }
}

impl From<ReaderError> for CompileError {
    fn from(e: ReaderError) -> Self {
        CompileErrorKind::Reader(e).into()
    }
}

/// Result type for compilation.
pub type Result<T> = std::result::Result<T, CompileError>;
