// hoax-vm - Bytecode compiler and virtual machine for the Hoax language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Arithmetic opcode handlers: Add, Sub, Mul, Div.
//!
//! All four pop `a`, then `b`, and push `b op a`. Arithmetic is checked:
//! overflow is an error rather than wrapping.

use hoax_parser::Expr;

use crate::opcode::OpCode;
use crate::utils::expect_integer;
use crate::vm::{Result, RuntimeError, Vm};

use super::unexpected;

impl Vm {
    /// Execute an arithmetic opcode.
    pub(crate) fn execute_arithmetic(&mut self, op: OpCode) -> Result<()> {
        match op {
            OpCode::Add => self.binary_int_op(op, i64::checked_add),
            OpCode::Sub => self.binary_int_op(op, i64::checked_sub),
            OpCode::Mul => self.binary_int_op(op, i64::checked_mul),
            OpCode::Div => self.binary_int_op(op, i64::checked_div),
            _ => Err(unexpected("execute_arithmetic", op)),
        }
    }

    fn binary_int_op(&mut self, op: OpCode, f: fn(i64, i64) -> Option<i64>) -> Result<()> {
        let name = op.mnemonic();
        let a = self.stack.pop()?;
        let b = self.stack.pop()?;
        let b = expect_integer(name, &b)?;
        let a = expect_integer(name, &a)?;

        if op == OpCode::Div && a == 0 {
            return Err(RuntimeError::DivisionByZero);
        }
        let result = f(b, a).ok_or(RuntimeError::IntegerOverflow { op: name })?;
        self.stack.push(Expr::Integer(result))
    }
}
