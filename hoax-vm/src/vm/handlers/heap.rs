// hoax-vm - Bytecode compiler and virtual machine for the Hoax language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Heap opcode handlers: Cons, Car, Cdr.
//!
//! `CAR` and `CDR` leave the cons they read on the stack and push the field
//! above it, so both can be applied to the same cell.

use hoax_parser::{Expr, ExprStore, Handle};

use crate::opcode::OpCode;
use crate::utils::intern_value;
use crate::vm::{Result, RuntimeError, Vm};

use super::unexpected;

impl Vm {
    /// Execute a heap opcode.
    pub(crate) fn execute_heap(&mut self, op: OpCode, store: &mut ExprStore) -> Result<()> {
        match op {
            OpCode::Cons => {
                let second = self.stack.pop()?;
                let first = self.stack.pop()?;
                let car = intern_value(store, first);
                let cdr = intern_value(store, second);
                self.stack.push(Expr::Cons { car, cdr })
            }
            OpCode::Car => {
                let (car, _) = self.peek_cons(op)?;
                self.stack.push(store.get(car).clone())
            }
            OpCode::Cdr => {
                let (_, cdr) = self.peek_cons(op)?;
                self.stack.push(store.get(cdr).clone())
            }
            _ => Err(unexpected("execute_heap", op)),
        }
    }

    fn peek_cons(&self, op: OpCode) -> Result<(Handle, Handle)> {
        match self.stack.peek(0)? {
            Expr::Cons { car, cdr } => Ok((*car, *cdr)),
            other => Err(RuntimeError::TypeError {
                op: op.mnemonic(),
                expected: "cons",
                got: other.type_name(),
            }),
        }
    }
}
