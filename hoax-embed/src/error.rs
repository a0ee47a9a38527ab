// hoax-embed - Embedding API for the Hoax language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Errors surfaced by the [`Engine`](crate::Engine).

use std::io;
use std::path::PathBuf;

use hoax_core::EnvError;
use hoax_vm::{CompileError, RuntimeError};
use thiserror::Error;

/// Any failure from reading, compiling or running Hoax code.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Whether this error came from a `quit` that has not been reset.
    pub fn is_halted(&self) -> bool {
        matches!(self, Error::Runtime(RuntimeError::Halted))
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
