// hoax-vm - Bytecode compiler and virtual machine for the Hoax language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Bytecode emission trait for compilers.
//!
//! Special forms are written against this trait so they only see "emit an
//! instruction" and "compile a sub-expression".

use hoax_parser::{Expr, Handle};

use crate::opcode::Instruction;

use super::types::Result;

/// Trait for types that can emit bytecode.
pub trait BytecodeEmitter {
    /// Emit an instruction.
    fn emit(&mut self, instruction: Instruction);

    /// Add a constant to the pool and emit `CONSTANT` for it.
    fn emit_constant(&mut self, value: Expr) -> Result<()>;

    /// Emit a jump with a placeholder offset and return the offset of its
    /// operand, for patching.
    fn emit_jump(&mut self, instruction: Instruction) -> usize;

    /// Point the jump whose operand is at `operand` at the current position.
    fn patch_jump(&mut self, operand: usize) -> Result<()>;

    /// Compile an expression.
    fn compile_expr(&mut self, expr: Handle) -> Result<()>;
}

/// Control flow compilation using the BytecodeEmitter trait.
pub mod control {
    use super::*;

    /// Compile `(if test then else)`.
    ///
    /// ```text
    ///     <test>
    ///     JMF else
    ///     <then>
    ///     JMP end
    /// else:
    ///     <else>
    /// end:
    /// ```
    pub fn compile_if<E: BytecodeEmitter>(
        emitter: &mut E,
        test: Handle,
        then: Handle,
        otherwise: Handle,
    ) -> Result<()> {
        emitter.compile_expr(test)?;
        let else_jump = emitter.emit_jump(Instruction::Jmf(0));

        emitter.compile_expr(then)?;
        let end_jump = emitter.emit_jump(Instruction::Jmp(0));

        emitter.patch_jump(else_jump)?;
        emitter.compile_expr(otherwise)?;
        emitter.patch_jump(end_jump)
    }
}
