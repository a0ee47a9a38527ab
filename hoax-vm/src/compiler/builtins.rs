// hoax-vm - Bytecode compiler and virtual machine for the Hoax language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Built-in operations that compile straight to a single opcode.
//!
//! A call whose head names a built-in has its argument count checked at
//! compile time. Any other head becomes a dynamic `CALL`, resolved through
//! the global environment at run time.

use std::collections::HashMap;

use crate::opcode::OpCode;

/// A built-in operation and the opcode it compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Builtin {
    pub name: &'static str,
    pub arity: usize,
    pub op: OpCode,
}

/// Every built-in, in the order they are documented.
pub static BUILTINS: &[Builtin] = &[
    Builtin {
        name: "+",
        arity: 2,
        op: OpCode::Add,
    },
    Builtin {
        name: "-",
        arity: 2,
        op: OpCode::Sub,
    },
    Builtin {
        name: "*",
        arity: 2,
        op: OpCode::Mul,
    },
    Builtin {
        name: "/",
        arity: 2,
        op: OpCode::Div,
    },
    Builtin {
        name: "car",
        arity: 1,
        op: OpCode::Car,
    },
    Builtin {
        name: "cdr",
        arity: 1,
        op: OpCode::Cdr,
    },
    Builtin {
        name: "cons",
        arity: 2,
        op: OpCode::Cons,
    },
    Builtin {
        name: "quit",
        arity: 0,
        op: OpCode::Halt,
    },
    Builtin {
        name: "display",
        arity: 1,
        op: OpCode::Display,
    },
    Builtin {
        name: "toggle-debug",
        arity: 0,
        op: OpCode::ToggleDebug,
    },
];

/// Name lookup over [`BUILTINS`], built once per compiler.
#[derive(Debug, Clone)]
pub struct BuiltinTable {
    by_name: HashMap<&'static str, Builtin>,
}

impl BuiltinTable {
    pub fn new() -> Self {
        BuiltinTable {
            by_name: BUILTINS.iter().map(|b| (b.name, *b)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Builtin> {
        self.by_name.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl Default for BuiltinTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_every_builtin() {
        let table = BuiltinTable::new();
        assert_eq!(table.len(), BUILTINS.len());
        assert_eq!(table.get("quit").map(|b| b.op), Some(OpCode::Halt));
        assert_eq!(table.get("toggle-debug").map(|b| b.arity), Some(0));
        assert_eq!(table.get("cons").map(|b| b.arity), Some(2));
        assert!(!table.contains("hello"));
    }
}
