// hoax-vm - Bytecode compiler and virtual machine for the Hoax language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Bytecode modules: a byte sequence plus its constant pool.

use hoax_parser::Expr;

use crate::opcode::{Instruction, OpCode};

/// Constant operands are one byte, so the pool holds at most this many entries.
pub const MAX_CONSTANTS: usize = 256;

/// A unit of compiled code.
///
/// Modules are cleared and refilled between REPL inputs rather than
/// reallocated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    /// The encoded instructions.
    code: Vec<u8>,

    /// Constant pool. Entries are never deduplicated.
    constants: Vec<Expr>,
}

/// A saved module length, for undoing a failed compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    code_len: usize,
    constants_len: usize,
}

impl Module {
    /// Create a new empty module.
    pub fn new() -> Self {
        Self::default()
    }

    /// The encoded instructions.
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// The constant pool.
    pub fn constants(&self) -> &[Expr] {
        &self.constants
    }

    /// Look up a constant by its operand.
    pub fn constant(&self, idx: u8) -> Option<&Expr> {
        self.constants.get(idx as usize)
    }

    /// Length of the code in bytes.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Append one raw byte.
    pub fn write_byte(&mut self, byte: u8) {
        self.code.push(byte);
    }

    /// Append an opcode with no operand.
    pub fn write_op(&mut self, op: OpCode) {
        self.code.push(op.into());
    }

    /// Append an encoded instruction.
    pub fn emit(&mut self, instruction: Instruction) {
        instruction.encode(&mut self.code);
    }

    /// Add a constant to the pool and return its index.
    ///
    /// Returns `None` if the pool already holds [`MAX_CONSTANTS`] entries.
    pub fn add_constant(&mut self, value: Expr) -> Option<u8> {
        let idx = u8::try_from(self.constants.len()).ok()?;
        self.constants.push(value);
        Some(idx)
    }

    /// Get the current code offset (for jump patching).
    pub fn current_offset(&self) -> usize {
        self.code.len()
    }

    /// Overwrite the two bytes at `at` with `value`, big-endian.
    pub fn patch_u16(&mut self, at: usize, value: u16) {
        self.code[at..at + 2].copy_from_slice(&value.to_be_bytes());
    }

    /// Remember the current length of code and constants.
    pub fn mark(&self) -> Mark {
        Mark {
            code_len: self.code.len(),
            constants_len: self.constants.len(),
        }
    }

    /// Drop everything added since `mark`.
    pub fn rollback(&mut self, mark: Mark) {
        self.code.truncate(mark.code_len);
        self.constants.truncate(mark.constants_len);
    }

    /// Empty the module, keeping its allocations.
    pub fn clear(&mut self) {
        self.code.clear();
        self.constants.clear();
    }
}
