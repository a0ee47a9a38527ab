// hoax-vm - Bytecode compiler and virtual machine for the Hoax language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Variable opcode handlers: LoadVar, StoreVar.

use hoax_parser::{Expr, Symbol};

use crate::opcode::OpCode;
use crate::vm::{Context, Result, RuntimeError, Vm};

use super::unexpected;

impl Vm {
    /// Execute a variable opcode.
    pub(crate) fn execute_variables(&mut self, op: OpCode, ctx: &mut Context<'_>) -> Result<()> {
        match op {
            OpCode::LoadVar => {
                let name = self.pop_name(op)?;
                let value = match ctx.globals.get(name.as_str()) {
                    Some(value) => value.clone(),
                    None => {
                        tracing::warn!(name = %name, "unbound variable, using nil");
                        Expr::Nil
                    }
                };
                self.stack.push(value)
            }
            OpCode::StoreVar => {
                let name = self.pop_name(op)?;
                let value = self.stack.pop()?;
                ctx.globals.set(name, value.clone())?;
                // define evaluates to the bound value
                self.stack.push(value)
            }
            _ => Err(unexpected("execute_variables", op)),
        }
    }

    /// Pop the symbol a variable or call instruction operates on.
    pub(crate) fn pop_name(&mut self, op: OpCode) -> Result<Symbol> {
        match self.stack.pop()? {
            Expr::Symbol(name) => Ok(name),
            other => Err(RuntimeError::TypeError {
                op: op.mnemonic(),
                expected: "symbol",
                got: other.type_name(),
            }),
        }
    }
}
