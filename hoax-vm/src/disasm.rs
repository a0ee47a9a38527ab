// hoax-vm - Bytecode compiler and virtual machine for the Hoax language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Human-readable listings of compiled modules.
//!
//! One line per instruction: the offset in hex, a tab, the mnemonic and any
//! operand. `CONSTANT` lines show the constant they load and jump lines show
//! where they land.
//!
//! ```text
//! 0000    CONSTANT 0 (0)
//! 0002    JMF 5 (-> 000A)
//! 0005    CONSTANT 1 (1)
//! 0007    JMP 2 (-> 000C)
//! 000A    CONSTANT 2 (2)
//! 000C    RETURN
//! ```

use std::fmt::Write;

use hoax_parser::ExprStore;

use crate::module::Module;
use crate::opcode::{DecodeError, Instruction, decode};

/// Decode every instruction in a module, paired with its offset.
pub fn instructions(module: &Module) -> Result<Vec<(usize, Instruction)>, DecodeError> {
    let code = module.code();
    let mut offset = 0;
    let mut out = Vec::new();
    while offset < code.len() {
        let (instruction, next) = decode(code, offset)?;
        out.push((offset, instruction));
        offset = next;
    }
    Ok(out)
}

/// Render one decoded instruction.
pub fn format_instruction(
    module: &Module,
    store: &ExprStore,
    offset: usize,
    instruction: Instruction,
) -> String {
    let mut line = format!("{:04X}\t{}", offset, instruction);
    match instruction {
        Instruction::Constant(idx) => match module.constant(idx) {
            Some(value) => {
                let _ = write!(line, " ({})", store.display(value));
            }
            None => line.push_str(" (<missing>)"),
        },
        Instruction::Jmp(distance) | Instruction::Jmf(distance) => {
            let target = offset + instruction.size() + distance as usize;
            let _ = write!(line, " (-> {:04X})", target);
        }
        _ => {}
    }
    line
}

/// Render a whole module, one instruction per line.
///
/// Undecodable bytes end the listing with an error line rather than failing.
pub fn disassemble(module: &Module, store: &ExprStore) -> String {
    let code = module.code();
    let mut out = String::new();
    let mut offset = 0;
    while offset < code.len() {
        match decode(code, offset) {
            Ok((instruction, next)) => {
                out.push_str(&format_instruction(module, store, offset, instruction));
                out.push('\n');
                offset = next;
            }
            Err(e) => {
                let _ = writeln!(out, "{:04X}\t<{}>", offset, e);
                break;
            }
        }
    }
    out
}
