// hoax-embed - Embedding API for the Hoax language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # hoax-embed
//!
//! A high-level embedding API for the Hoax language.
//!
//! This crate wires the reader, compiler, global environment and VM into a
//! single [`Engine`] that owns all of the session state.
//!
//! ## Quick Start
//!
//! ```rust
//! use hoax_embed::Engine;
//!
//! let mut engine = Engine::new().unwrap();
//! let result = engine.eval("(if 0 1 (- 10 3))").unwrap();
//! assert_eq!(engine.display(&result), "7");
//! ```
//!
//! ## Inspecting bytecode
//!
//! ```rust
//! use hoax_embed::Engine;
//!
//! let mut engine = Engine::new().unwrap();
//! let listing = engine.disassemble("(+ 1 2)").unwrap();
//! assert!(listing.contains("ADD"));
//! ```

mod engine;
mod error;

pub use engine::{Engine, EngineConfig, Evaluation};
pub use error::{Error, Result};

// Re-export core types for convenience
pub use hoax_core::{EnvError, GlobalEnv};
pub use hoax_parser::{Expr, ExprStore, Handle, Native, NativeCtx, NativeFn, Symbol};
pub use hoax_vm::{CompileError, Module, RuntimeError, Vm, VmConfig, VmState};
