// hoax-core - I/O native functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! I/O natives: display, hello

use std::io::Write;

use hoax_parser::{Expr, Handle, NativeCtx};

use super::arg;

/// Line printed by `hello`.
pub const GREETING: &str = "Hello from a Rust native!";

/// (display x) - print x followed by a newline, return nil
pub fn native_display(ctx: &mut NativeCtx<'_>, args: Handle) -> Result<Expr, String> {
    let value = arg(ctx.store, args, 0, "display")?;
    writeln!(ctx.out, "{}", ctx.store.display_handle(value))
        .map_err(|e| format!("display: {}", e))?;
    Ok(Expr::Nil)
}

/// (hello) - print a greeting, return nil
pub fn native_hello(ctx: &mut NativeCtx<'_>, _args: Handle) -> Result<Expr, String> {
    writeln!(ctx.out, "{}", GREETING).map_err(|e| format!("hello: {}", e))?;
    Ok(Expr::Nil)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoax_parser::ExprStore;

    fn call(
        f: hoax_parser::NativeFn,
        store: &mut ExprStore,
        args: Handle,
    ) -> (Result<Expr, String>, String) {
        let mut out = Vec::new();
        let result = {
            let mut ctx = NativeCtx {
                store,
                out: &mut out,
            };
            f(&mut ctx, args)
        };
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_display_prints_argument() {
        let mut store = ExprStore::new();
        let one = store.integer(1);
        let two = store.integer(2);
        let pair = store.cons(one, two);
        let args = store.list(&[pair]);

        let (result, out) = call(native_display, &mut store, args);
        assert_eq!(result, Ok(Expr::Nil));
        assert_eq!(out, "(1 . 2)\n");
    }

    #[test]
    fn test_display_without_argument() {
        let mut store = ExprStore::new();
        let (result, out) = call(native_display, &mut store, Handle::NIL);
        assert!(result.unwrap_err().contains("missing argument"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_hello() {
        let mut store = ExprStore::new();
        let (result, out) = call(native_hello, &mut store, Handle::NIL);
        assert_eq!(result, Ok(Expr::Nil));
        assert_eq!(out, format!("{}\n", GREETING));
    }
}
