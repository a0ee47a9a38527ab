// hoax-vm - Bytecode compiler and virtual machine for the Hoax language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! VM builtin handlers: Display, ToggleDebug.

use std::io::Write;

use hoax_parser::{Expr, ExprStore};

use crate::opcode::OpCode;
use crate::vm::{Result, Vm};

use super::unexpected;

impl Vm {
    /// Execute a VM builtin opcode.
    pub(crate) fn execute_builtin(&mut self, op: OpCode, store: &ExprStore) -> Result<()> {
        match op {
            OpCode::Display => {
                let value = self.stack.pop()?;
                writeln!(self.out, "{}", store.display(&value))?;
                self.stack.push(Expr::Nil)
            }
            OpCode::ToggleDebug => {
                self.debug = !self.debug;
                tracing::info!(enabled = self.debug, "debug mode toggled");
                self.stack.push(Expr::Boolean(self.debug))
            }
            _ => Err(unexpected("execute_builtin", op)),
        }
    }
}
