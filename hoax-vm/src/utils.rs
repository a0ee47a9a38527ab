// hoax-vm - Bytecode compiler and virtual machine for the Hoax language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Utility functions for the VM.

use hoax_parser::{Expr, ExprStore, Handle};

use crate::vm::{Result, RuntimeError};

/// Store a stack value and return its handle. `nil` maps to the canonical
/// handle 0 instead of a fresh entry.
pub(crate) fn intern_value(store: &mut ExprStore, value: Expr) -> Handle {
    match value {
        Expr::Nil => Handle::NIL,
        other => store.intern(other),
    }
}

/// Truthiness of a value in a conditional jump.
pub(crate) fn is_truthy(store: &ExprStore, value: &Expr) -> Result<bool> {
    store
        .truthiness(value)
        .ok_or_else(|| RuntimeError::TruthinessUndefined(store.display(value).to_string()))
}

/// The integer inside `value`, or a type error naming `op`.
pub(crate) fn expect_integer(op: &'static str, value: &Expr) -> Result<i64> {
    value.as_integer().ok_or(RuntimeError::TypeError {
        op,
        expected: "integer",
        got: value.type_name(),
    })
}
