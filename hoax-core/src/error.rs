// hoax-core - Error types for the global environment
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Error types for the global environment.

use thiserror::Error;

/// Errors raised by [`GlobalEnv`](crate::GlobalEnv) writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    /// Every slot is taken and the name is not already bound.
    #[error("global table is full ({capacity} slots), cannot bind '{name}'")]
    Full { name: String, capacity: usize },
}

/// Result type for environment operations.
pub type Result<T> = std::result::Result<T, EnvError>;
