// hoax-parser - Reader errors
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Errors raised while reading source text.

use thiserror::Error;

use crate::expr::{Location, MAX_NESTING_DEPTH, MAX_SYMBOL_LEN};

/// What went wrong while reading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReaderErrorKind {
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),

    #[error("unexpected ')'")]
    UnexpectedClosingParen,

    #[error("expected ')' to close the list opened at {open}, found end of input")]
    UnexpectedEof { open: Location },

    #[error("integer literal out of range: {0}")]
    IntegerOutOfRange(String),

    #[error("symbol is {0} bytes long, the limit is {MAX_SYMBOL_LEN}")]
    SymbolTooLong(usize),

    #[error("lists nested more than {MAX_NESTING_DEPTH} deep")]
    TooDeep,
}

/// Reader error with position information.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: error: {kind}")]
pub struct ReaderError {
    pub kind: ReaderErrorKind,
    pub location: Location,
}

impl ReaderError {
    pub fn new(kind: ReaderErrorKind, location: Location) -> Self {
        ReaderError { kind, location }
    }
}
