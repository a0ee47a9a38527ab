// hoax-vm - Bytecode compiler and virtual machine for the Hoax language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Value stack for the VM.

use hoax_parser::Expr;

use super::{Result, RuntimeError};

/// The VM's operand stack, bounded at a fixed depth.
#[derive(Debug)]
pub struct ValueStack {
    values: Vec<Expr>,
    limit: usize,
}

impl ValueStack {
    /// Create a new empty stack holding at most `limit` values.
    pub fn new(limit: usize) -> Self {
        Self {
            values: Vec::with_capacity(limit),
            limit,
        }
    }

    /// Push a value onto the stack.
    #[inline]
    pub fn push(&mut self, value: Expr) -> Result<()> {
        if self.values.len() >= self.limit {
            return Err(RuntimeError::StackOverflow { limit: self.limit });
        }
        self.values.push(value);
        Ok(())
    }

    /// Pop a value from the stack.
    #[inline]
    pub fn pop(&mut self) -> Result<Expr> {
        self.values.pop().ok_or(RuntimeError::StackUnderflow)
    }

    /// Peek at a value on the stack without removing it.
    /// `distance` is the offset from the top (0 = top).
    #[inline]
    pub fn peek(&self, distance: usize) -> Result<&Expr> {
        if distance >= self.values.len() {
            return Err(RuntimeError::StackUnderflow);
        }
        Ok(&self.values[self.values.len() - 1 - distance])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Maximum depth.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// The values from bottom to top.
    pub fn as_slice(&self) -> &[Expr] {
        &self.values
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
