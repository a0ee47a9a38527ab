// hoax-vm - Bytecode compiler and virtual machine for the Hoax language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Bytecode instruction definitions and the shared decoder.
//!
//! Every instruction starts with a one-byte [`OpCode`]. `JMP` and `JMF` are
//! followed by a big-endian `u16` forward offset, measured from the byte after
//! the operand. `CONSTANT` is followed by a `u8` index into the constant pool.
//! Everything else has no operand.
//!
//! The VM and the disassembler both step through code with [`decode`].

use std::fmt;

use thiserror::Error;

/// One-byte operation codes, numbered from `0x00` in this order.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    // =========================================================================
    // Arithmetic
    // =========================================================================
    /// Pop `a`, pop `b`, push `b + a`.
    Add = 0x00,
    /// Pop `a`, pop `b`, push `b - a`.
    Sub,
    /// Pop `a`, pop `b`, push `b * a`.
    Mul,
    /// Pop `a`, pop `b`, push `b / a`.
    Div,

    // =========================================================================
    // Control Flow
    // =========================================================================
    /// Unconditional forward jump.
    Jmp,
    /// Pop and jump forward if falsy.
    Jmf,

    // =========================================================================
    // Heap
    // =========================================================================
    /// Pop the second operand, pop the first, push `(first . second)`.
    Cons,
    /// Push the `car` of the cons on top of the stack, leaving the cons in place.
    Car,
    /// Push the `cdr` of the cons on top of the stack, leaving the cons in place.
    Cdr,

    // =========================================================================
    // Literals
    // =========================================================================
    True,
    False,
    Nil,
    /// Push `constants[n]`.
    Constant,

    // =========================================================================
    // Variables
    // =========================================================================
    /// Pop a symbol, push its global binding (or nil if unbound).
    LoadVar,
    /// Pop a symbol, pop a value, bind it, push the value back.
    StoreVar,

    // =========================================================================
    // Calls & Termination
    // =========================================================================
    /// Pop a symbol naming a native, pop its arguments, push the result.
    Call,
    /// Pop and return the top of stack.
    Return,
    /// Stop the VM, returning the top of stack or nil.
    Halt,

    // =========================================================================
    // VM Builtins & Stack
    // =========================================================================
    /// Pop and print a value, push nil.
    Display,
    /// Flip debug tracing, push the new setting.
    ToggleDebug,
    /// Discard the top of stack.
    Pop,
}

impl OpCode {
    /// Every opcode, in byte order.
    pub const ALL: [OpCode; 21] = [
        OpCode::Add,
        OpCode::Sub,
        OpCode::Mul,
        OpCode::Div,
        OpCode::Jmp,
        OpCode::Jmf,
        OpCode::Cons,
        OpCode::Car,
        OpCode::Cdr,
        OpCode::True,
        OpCode::False,
        OpCode::Nil,
        OpCode::Constant,
        OpCode::LoadVar,
        OpCode::StoreVar,
        OpCode::Call,
        OpCode::Return,
        OpCode::Halt,
        OpCode::Display,
        OpCode::ToggleDebug,
        OpCode::Pop,
    ];

    /// Assembly name used by the disassembler.
    pub fn mnemonic(self) -> &'static str {
        match self {
            OpCode::Add => "ADD",
            OpCode::Sub => "SUB",
            OpCode::Mul => "MUL",
            OpCode::Div => "DIV",
            OpCode::Jmp => "JMP",
            OpCode::Jmf => "JMF",
            OpCode::Cons => "CONS",
            OpCode::Car => "CAR",
            OpCode::Cdr => "CDR",
            OpCode::True => "TRUE",
            OpCode::False => "FALSE",
            OpCode::Nil => "NIL",
            OpCode::Constant => "CONSTANT",
            OpCode::LoadVar => "LOAD_VAR",
            OpCode::StoreVar => "STORE_VAR",
            OpCode::Call => "CALL",
            OpCode::Return => "RETURN",
            OpCode::Halt => "HALT",
            OpCode::Display => "DISPLAY",
            OpCode::ToggleDebug => "TOGGLE_DEBUG",
            OpCode::Pop => "POP",
        }
    }

    /// Number of operand bytes following the opcode.
    pub fn operand_len(self) -> usize {
        match self {
            OpCode::Jmp | OpCode::Jmf => 2,
            OpCode::Constant => 1,
            _ => 0,
        }
    }

    /// Check if this instruction can transfer control.
    pub fn is_control_flow(self) -> bool {
        matches!(
            self,
            OpCode::Jmp | OpCode::Jmf | OpCode::Call | OpCode::Return | OpCode::Halt
        )
    }

    /// Net change in stack depth, or `None` where it depends on run-time data.
    pub fn stack_effect(self) -> Option<i8> {
        Some(match self {
            // Push 1
            OpCode::True
            | OpCode::False
            | OpCode::Nil
            | OpCode::Constant
            | OpCode::Car
            | OpCode::Cdr
            | OpCode::ToggleDebug => 1,

            // Neutral
            OpCode::Jmp | OpCode::LoadVar | OpCode::Display => 0,

            // Pop 1
            OpCode::Jmf | OpCode::StoreVar | OpCode::Pop | OpCode::Return => -1,

            // Pop 2, push 1
            OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::Div | OpCode::Cons => -1,

            // Depends on the callee's arity, or on whether the stack is empty
            OpCode::Call | OpCode::Halt => return None,
        })
    }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> u8 {
        op as u8
    }
}

impl TryFrom<u8> for OpCode {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, u8> {
        OpCode::ALL.get(byte as usize).copied().ok_or(byte)
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

// ============================================================================
// Decoded instructions
// ============================================================================

/// An opcode together with its decoded operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Add,
    Sub,
    Mul,
    Div,
    Jmp(u16),
    Jmf(u16),
    Cons,
    Car,
    Cdr,
    True,
    False,
    Nil,
    Constant(u8),
    LoadVar,
    StoreVar,
    Call,
    Return,
    Halt,
    Display,
    ToggleDebug,
    Pop,
}

impl Instruction {
    /// The instruction's opcode.
    pub fn opcode(self) -> OpCode {
        match self {
            Instruction::Add => OpCode::Add,
            Instruction::Sub => OpCode::Sub,
            Instruction::Mul => OpCode::Mul,
            Instruction::Div => OpCode::Div,
            Instruction::Jmp(_) => OpCode::Jmp,
            Instruction::Jmf(_) => OpCode::Jmf,
            Instruction::Cons => OpCode::Cons,
            Instruction::Car => OpCode::Car,
            Instruction::Cdr => OpCode::Cdr,
            Instruction::True => OpCode::True,
            Instruction::False => OpCode::False,
            Instruction::Nil => OpCode::Nil,
            Instruction::Constant(_) => OpCode::Constant,
            Instruction::LoadVar => OpCode::LoadVar,
            Instruction::StoreVar => OpCode::StoreVar,
            Instruction::Call => OpCode::Call,
            Instruction::Return => OpCode::Return,
            Instruction::Halt => OpCode::Halt,
            Instruction::Display => OpCode::Display,
            Instruction::ToggleDebug => OpCode::ToggleDebug,
            Instruction::Pop => OpCode::Pop,
        }
    }

    /// Encoded size in bytes.
    pub fn size(self) -> usize {
        1 + self.opcode().operand_len()
    }

    /// Append the instruction's bytes to `out`.
    pub fn encode(self, out: &mut Vec<u8>) {
        out.push(self.opcode().into());
        match self {
            Instruction::Jmp(offset) | Instruction::Jmf(offset) => {
                out.extend_from_slice(&offset.to_be_bytes())
            }
            Instruction::Constant(idx) => out.push(idx),
            _ => {}
        }
    }

    /// Build an operand-free instruction from its opcode.
    fn simple(op: OpCode) -> Instruction {
        match op {
            OpCode::Add => Instruction::Add,
            OpCode::Sub => Instruction::Sub,
            OpCode::Mul => Instruction::Mul,
            OpCode::Div => Instruction::Div,
            OpCode::Cons => Instruction::Cons,
            OpCode::Car => Instruction::Car,
            OpCode::Cdr => Instruction::Cdr,
            OpCode::True => Instruction::True,
            OpCode::False => Instruction::False,
            OpCode::Nil => Instruction::Nil,
            OpCode::LoadVar => Instruction::LoadVar,
            OpCode::StoreVar => Instruction::StoreVar,
            OpCode::Call => Instruction::Call,
            OpCode::Return => Instruction::Return,
            OpCode::Halt => Instruction::Halt,
            OpCode::Display => Instruction::Display,
            OpCode::ToggleDebug => Instruction::ToggleDebug,
            OpCode::Pop => Instruction::Pop,
            // Operand-carrying opcodes are built by `decode`
            OpCode::Jmp => Instruction::Jmp(0),
            OpCode::Jmf => Instruction::Jmf(0),
            OpCode::Constant => Instruction::Constant(0),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Jmp(offset) | Instruction::Jmf(offset) => {
                write!(f, "{} {}", self.opcode(), offset)
            }
            Instruction::Constant(idx) => write!(f, "{} {}", self.opcode(), idx),
            _ => write!(f, "{}", self.opcode()),
        }
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Why a byte sequence could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid opcode 0x{byte:02X} at offset {offset:04X}")]
    InvalidOpcode { offset: usize, byte: u8 },

    #[error("{op} at offset {offset:04X} is missing its operand")]
    TruncatedOperand { offset: usize, op: OpCode },

    #[error("no instruction at offset {offset:04X}, past the end of the code")]
    EndOfCode { offset: usize },
}

/// Decode the instruction starting at `offset`.
///
/// Returns the instruction and the offset of the next one.
pub fn decode(code: &[u8], offset: usize) -> Result<(Instruction, usize), DecodeError> {
    let byte = code
        .get(offset)
        .copied()
        .ok_or(DecodeError::EndOfCode { offset })?;
    let op = OpCode::try_from(byte).map_err(|byte| DecodeError::InvalidOpcode { offset, byte })?;

    let start = offset + 1;
    let end = start + op.operand_len();
    let operand = code
        .get(start..end)
        .ok_or(DecodeError::TruncatedOperand { offset, op })?;

    let instruction = match op {
        OpCode::Jmp => Instruction::Jmp(u16::from_be_bytes([operand[0], operand[1]])),
        OpCode::Jmf => Instruction::Jmf(u16::from_be_bytes([operand[0], operand[1]])),
        OpCode::Constant => Instruction::Constant(operand[0]),
        _ => Instruction::simple(op),
    };
    Ok((instruction, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_values_follow_declaration_order() {
        for (n, op) in OpCode::ALL.iter().enumerate() {
            assert_eq!(u8::from(*op) as usize, n);
            assert_eq!(OpCode::try_from(n as u8), Ok(*op));
        }
        assert_eq!(u8::from(OpCode::Add), 0x00);
        assert_eq!(u8::from(OpCode::Constant), 0x0C);
        assert_eq!(u8::from(OpCode::ToggleDebug), 0x13);
        assert_eq!(OpCode::try_from(0xFF), Err(0xFF));
    }

    #[test]
    fn test_encode_jump_is_big_endian() {
        let mut out = Vec::new();
        Instruction::Jmf(0x0102).encode(&mut out);
        assert_eq!(out, vec![u8::from(OpCode::Jmf), 0x01, 0x02]);
    }

    #[test]
    fn test_decode_steps_over_operands() {
        let mut code = Vec::new();
        Instruction::Constant(7).encode(&mut code);
        Instruction::Jmp(300).encode(&mut code);
        Instruction::Return.encode(&mut code);

        let (first, next) = decode(&code, 0).unwrap();
        assert_eq!((first, next), (Instruction::Constant(7), 2));
        let (second, next) = decode(&code, next).unwrap();
        assert_eq!((second, next), (Instruction::Jmp(300), 5));
        let (third, next) = decode(&code, next).unwrap();
        assert_eq!((third, next), (Instruction::Return, 6));
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(decode(&[], 0), Err(DecodeError::EndOfCode { offset: 0 }));
        assert_eq!(
            decode(&[0xEE], 0),
            Err(DecodeError::InvalidOpcode {
                offset: 0,
                byte: 0xEE
            })
        );
        assert_eq!(
            decode(&[u8::from(OpCode::Jmp), 0x00], 0),
            Err(DecodeError::TruncatedOperand {
                offset: 0,
                op: OpCode::Jmp
            })
        );
    }

    #[test]
    fn test_instruction_len_matches_encoding() {
        for op in OpCode::ALL {
            let instruction = Instruction::simple(op);
            let mut out = Vec::new();
            instruction.encode(&mut out);
            assert_eq!(out.len(), instruction.size());
        }
    }
}
