// hoax-core - Global environment and natives for the Hoax language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # hoax-core
//!
//! Runtime state shared by compiled Hoax code: the global environment and
//! the native functions installed in it.

pub mod env;
pub mod error;
pub mod natives;

pub use env::{DEFAULT_CAPACITY, GlobalEnv};
pub use error::{EnvError, Result};
pub use natives::register_natives;

// Re-export parser types for convenience
pub use hoax_parser::{Expr, ExprStore, Handle, Native, NativeCtx, NativeFn, Symbol};
