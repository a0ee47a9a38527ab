// hoax-vm - Bytecode compiler and virtual machine for the Hoax language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Control flow opcode handlers: Jmp, Jmf, Call, Return, Halt.

use hoax_parser::{Expr, Handle, Native, NativeCtx};

use crate::opcode::{Instruction, OpCode};
use crate::utils::{intern_value, is_truthy};
use crate::vm::{Context, Result, RuntimeError, Vm, VmState};

use super::unexpected;

impl Vm {
    /// Execute a control flow instruction.
    pub(crate) fn execute_control(
        &mut self,
        instruction: Instruction,
        ctx: &mut Context<'_>,
    ) -> Result<ControlFlow> {
        match instruction {
            // Offsets are relative to the instruction after the jump, which
            // `ip` already points at
            Instruction::Jmp(offset) => {
                self.ip += offset as usize;
            }
            Instruction::Jmf(offset) => {
                let test = self.stack.pop()?;
                if !is_truthy(ctx.store, &test)? {
                    self.ip += offset as usize;
                }
            }

            Instruction::Call => self.call(ctx)?,

            Instruction::Return => {
                let result = self.stack.pop()?;
                self.state = VmState::Returned;
                return Ok(ControlFlow::Return(result));
            }
            Instruction::Halt => {
                let result = self.stack.pop().unwrap_or(Expr::Nil);
                self.state = VmState::Halted;
                tracing::debug!("halted");
                return Ok(ControlFlow::Return(result));
            }

            other => return Err(unexpected("execute_control", other.opcode())),
        }
        Ok(ControlFlow::Continue)
    }

    /// `CALL`: resolve the name on top of the stack to a native and apply it
    /// to the `arity` values beneath.
    fn call(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        let name = self.pop_name(OpCode::Call)?;
        let native = match ctx.globals.get(name.as_str()) {
            Some(Expr::Native(native)) => native.clone(),
            Some(other) => {
                return Err(RuntimeError::NotCallable {
                    name: name.to_string(),
                    got: other.type_name(),
                });
            }
            None => return Err(RuntimeError::UndefinedFunction(name.to_string())),
        };

        let arity = native.arity as usize;
        if self.stack.len() < arity {
            return Err(RuntimeError::ArityError {
                name: name.to_string(),
                expected: arity,
                got: self.stack.len(),
            });
        }

        let args = self.collect_args(ctx, arity)?;
        let result = invoke(&native, ctx, &mut *self.out, args)?;
        self.stack.push(result)
    }

    /// Pop `arity` values into a list in source order.
    ///
    /// Values come off the stack last argument first, so the accumulated list
    /// is reversed once at the end.
    fn collect_args(&mut self, ctx: &mut Context<'_>, arity: usize) -> Result<Handle> {
        let mut acc = Handle::NIL;
        for _ in 0..arity {
            let value = self.stack.pop()?;
            let item = intern_value(ctx.store, value);
            acc = ctx.store.cons_append(acc, item);
        }
        Ok(ctx.store.cons_reverse(acc))
    }
}

fn invoke(
    native: &Native,
    ctx: &mut Context<'_>,
    out: &mut dyn std::io::Write,
    args: Handle,
) -> Result<Expr> {
    tracing::debug!(name = %native.name, arity = native.arity, "calling native");
    let mut native_ctx = NativeCtx {
        store: &mut *ctx.store,
        out,
    };
    (native.func)(&mut native_ctx, args).map_err(|message| RuntimeError::Native {
        name: native.name.to_string(),
        message,
    })
}

/// Result of executing a control flow instruction.
#[derive(Debug)]
pub enum ControlFlow {
    /// Continue execution.
    Continue,
    /// Return from the VM with the given value.
    Return(Expr),
}
