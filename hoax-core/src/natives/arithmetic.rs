// hoax-core - Arithmetic native functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Arithmetic natives: add
//!
//! Like the `+` opcode, `add` uses checked arithmetic and reports overflow
//! instead of wrapping.

use hoax_parser::{Expr, Handle, NativeCtx};

use super::int_arg;

/// (add a b) - sum of two integers
pub fn native_add(ctx: &mut NativeCtx<'_>, args: Handle) -> Result<Expr, String> {
    let a = int_arg(ctx.store, args, 0, "add")?;
    let b = int_arg(ctx.store, args, 1, "add")?;
    a.checked_add(b)
        .map(Expr::Integer)
        .ok_or_else(|| format!("add: integer overflow in {} + {}", a, b))
}
