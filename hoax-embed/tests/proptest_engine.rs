// hoax-embed - Property-based tests for the engine
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Property-based tests for [`Engine`].
//!
//! Tests the following properties:
//! - Values bound with `set` are what the program sees, and `define`d values
//!   are what `get` returns
//! - Defining globals one line at a time tracks a running total
//! - Arithmetic agrees with checked i64 arithmetic, and a failed evaluation
//!   leaves the engine usable

use hoax_embed::{Engine, Error, Expr};
use proptest::prelude::*;

fn arb_name() -> impl Strategy<Value = String> {
    // Keep clear of builtins, natives and reserved literals
    "g-[a-z]{1,8}"
}

fn arb_op() -> impl Strategy<Value = (&'static str, fn(i64, i64) -> Option<i64>)> {
    prop_oneof![
        Just(("+", i64::checked_add as fn(i64, i64) -> Option<i64>)),
        Just(("-", i64::checked_sub as fn(i64, i64) -> Option<i64>)),
        Just(("*", i64::checked_mul as fn(i64, i64) -> Option<i64>)),
        Just(("/", i64::checked_div as fn(i64, i64) -> Option<i64>)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn set_values_are_visible_to_programs(name in arb_name(), value in any::<i64>()) {
        let mut engine = Engine::new().unwrap();
        engine.set(&name, Expr::Integer(value)).unwrap();
        prop_assert_eq!(engine.get(&name), Some(&Expr::Integer(value)));
        prop_assert_eq!(engine.eval(&name).unwrap(), Expr::Integer(value));
    }

    #[test]
    fn defined_values_are_visible_to_get(name in arb_name(), value in any::<i64>()) {
        let mut engine = Engine::new().unwrap();
        engine.eval(&format!("(define {} {})", name, value)).unwrap();
        prop_assert_eq!(engine.get(&name), Some(&Expr::Integer(value)));
    }

    #[test]
    fn running_total_across_lines(steps in prop::collection::vec(-1000i64..1000, 1..20)) {
        let mut engine = Engine::new().unwrap();
        engine.set("g-total", Expr::Integer(0)).unwrap();

        let mut total = 0i64;
        for step in &steps {
            total += step;
            let evaluation = engine
                .eval_line(&format!("(define g-total (+ g-total {}))", step))
                .unwrap()
                .unwrap();
            prop_assert_eq!(evaluation.value, total.to_string());
        }
        prop_assert_eq!(engine.get("g-total"), Some(&Expr::Integer(total)));
    }

    #[test]
    fn arithmetic_agrees_with_checked_ops(
        (symbol, apply) in arb_op(),
        a in any::<i64>(),
        b in prop_oneof![any::<i64>(), Just(0i64), Just(-1i64)],
    ) {
        let mut engine = Engine::new().unwrap();
        let result = engine.eval(&format!("({} {} {})", symbol, a, b));
        match apply(a, b) {
            Some(expected) => prop_assert_eq!(result.unwrap(), Expr::Integer(expected)),
            None => prop_assert!(matches!(result, Err(Error::Runtime(_))), "{:?}", result),
        }

        // The engine keeps working after either outcome
        prop_assert_eq!(engine.eval("(+ 1 2)").unwrap(), Expr::Integer(3));
    }
}
