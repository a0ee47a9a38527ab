// hoax-core - Native functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Native functions installed in every new global environment.
//!
//! Natives are reached through `CALL`, which hands them their arguments as a
//! proper list in source order. Arity is checked by the VM before the call.

mod arithmetic;
mod io;

use hoax_parser::{Expr, ExprStore, Handle, Native};

use crate::env::GlobalEnv;
use crate::error::Result;

pub use arithmetic::native_add;
pub use io::{GREETING, native_display, native_hello};

/// The natives installed by [`register_natives`].
pub fn natives() -> Vec<Native> {
    vec![
        Native::new("display", 1, native_display),
        Native::new("hello", 0, native_hello),
        Native::new("add", 2, native_add),
    ]
}

/// Register all native functions in the given environment.
pub fn register_natives(env: &mut GlobalEnv) -> Result<()> {
    for native in natives() {
        tracing::debug!(name = %native.name, arity = native.arity, "registering native");
        env.define_native(native)?;
    }
    Ok(())
}

// ============================================================================
// Argument helpers
// ============================================================================

/// The `n`th element of an argument list.
fn arg(
    store: &ExprStore,
    args: Handle,
    n: usize,
    name: &str,
) -> std::result::Result<Handle, String> {
    store
        .list_items(args)
        .get(n)
        .copied()
        .ok_or_else(|| format!("{}: missing argument {}", name, n + 1))
}

/// The `n`th element of an argument list, which must be an integer.
fn int_arg(
    store: &ExprStore,
    args: Handle,
    n: usize,
    name: &str,
) -> std::result::Result<i64, String> {
    let handle = arg(store, args, n, name)?;
    match store.get(handle) {
        Expr::Integer(value) => Ok(*value),
        other => Err(format!("{}: expected integer, got {}", name, other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_natives() {
        let mut env = GlobalEnv::new();
        register_natives(&mut env).unwrap();

        for (name, arity) in [("display", 1), ("hello", 0), ("add", 2)] {
            match env.get(name) {
                Some(Expr::Native(native)) => {
                    assert_eq!(native.name.as_str(), name);
                    assert_eq!(native.arity, arity);
                }
                other => panic!("{} not registered as a native: {:?}", name, other),
            }
        }
    }

    #[test]
    fn test_register_natives_into_small_table() {
        let mut env = GlobalEnv::with_capacity(2);
        assert!(register_natives(&mut env).is_err());
    }
}
