//! Disassembly, driven by the tags in the opcode table.
//!
//! The operand-length table is derived from the dispatch table at
//! construction, so the disassembler can never disagree with the CPU about
//! how long an instruction is.

use std::collections::HashMap;
use std::fmt;

use super::super::bus::{Addr, Byte};
use super::super::mem::Memory;
use super::modes::operand_length;
use super::structs::{AddressingMode, Mnemonic};
use super::table::OPCODES;
use crate::bytes_to_addr;

/// One decoded instruction. Immutable once built, except for the metadata
/// bag, which debugger layers annotate (labels, symbols, comments).
#[derive(Debug, Clone)]
pub struct DisassembledInstruction {
    address: Addr,
    opcode: Byte,
    operands: Vec<Byte>,
    mnemonic: Mnemonic,
    mode: AddressingMode,
    pub metadata: HashMap<String, String>,
}

impl DisassembledInstruction {
    pub fn address(&self) -> Addr {
        self.address
    }

    pub fn opcode(&self) -> Byte {
        self.opcode
    }

    pub fn operands(&self) -> &[Byte] {
        &self.operands
    }

    pub fn mnemonic(&self) -> Mnemonic {
        self.mnemonic
    }

    pub fn mode(&self) -> AddressingMode {
        self.mode
    }

    /// Total encoded length: opcode plus operand bytes.
    pub fn len(&self) -> usize {
        1 + self.operands.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// The operand in classical 6502 syntax. Branch targets render as the
    /// absolute address they land on.
    pub fn operand_text(&self) -> String {
        match self.mode {
            AddressingMode::Implied => String::new(),
            AddressingMode::Accumulator => "A".to_string(),
            AddressingMode::Immediate => format!("#${:02X}", self.operands[0]),
            AddressingMode::ZeroPage => format!("${:02X}", self.operands[0]),
            AddressingMode::ZeroPageX => format!("${:02X},X", self.operands[0]),
            AddressingMode::ZeroPageY => format!("${:02X},Y", self.operands[0]),
            AddressingMode::ZeroPageIndirect => format!("(${:02X})", self.operands[0]),
            AddressingMode::Absolute => format!("${:04X}", self.operand_word()),
            AddressingMode::AbsoluteX | AddressingMode::AbsoluteXWrite => {
                format!("${:04X},X", self.operand_word())
            }
            AddressingMode::AbsoluteY | AddressingMode::AbsoluteYWrite => {
                format!("${:04X},Y", self.operand_word())
            }
            AddressingMode::Indirect => format!("(${:04X})", self.operand_word()),
            AddressingMode::AbsoluteIndexedIndirect => {
                format!("(${:04X},X)", self.operand_word())
            }
            AddressingMode::IndirectX => format!("(${:02X},X)", self.operands[0]),
            AddressingMode::IndirectY | AddressingMode::IndirectYWrite => {
                format!("(${:02X}),Y", self.operands[0])
            }
            AddressingMode::Relative => {
                let target = (self.address as u16)
                    .wrapping_add(2)
                    .wrapping_add(self.operands[0] as i8 as u16);
                format!("${:04X}", target)
            }
        }
    }

    fn operand_word(&self) -> u16 {
        bytes_to_addr!(self.operands[0], self.operands[1])
    }
}

impl fmt::Display for DisassembledInstruction {
    /// `$AAAA: BB BB BB    MNEMONIC OPERAND`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bytes = format!("{:02X}", self.opcode);
        for operand in &self.operands {
            bytes.push_str(&format!(" {:02X}", operand));
        }
        let operand_text = self.operand_text();
        if operand_text.is_empty() {
            write!(f, "${:04X}: {:<8}    {}", self.address, bytes, self.mnemonic)
        } else {
            write!(
                f,
                "${:04X}: {:<8}    {} {}",
                self.address, bytes, self.mnemonic, operand_text
            )
        }
    }
}

pub struct Disassembler {
    lengths: [u8; 256],
}

impl Disassembler {
    /// Build the operand-length table from the dispatch table's mode tags.
    pub fn new() -> Disassembler {
        let mut lengths = [0u8; 256];
        for (slot, op) in lengths.iter_mut().zip(OPCODES.iter()) {
            *slot = operand_length(op.mode) as u8;
        }
        Disassembler { lengths }
    }

    pub fn operand_lengths(&self) -> &[u8; 256] {
        &self.lengths
    }

    /// Decode the instruction at `addr`. Reads are side-effect free.
    pub fn disassemble(&self, mem: &Memory, addr: Addr) -> DisassembledInstruction {
        let opcode = mem.peek(addr);
        let entry = &OPCODES[usize::from(opcode)];
        let len = self.lengths[usize::from(opcode)];
        let operands = (0..u32::from(len))
            .map(|i| mem.peek(addr.wrapping_add(1 + i)))
            .collect();
        DisassembledInstruction {
            address: addr,
            opcode,
            operands,
            mnemonic: entry.mnemonic,
            mode: entry.mode,
            metadata: HashMap::new(),
        }
    }

    /// Walk memory from `start`, decoding `count` instructions.
    pub fn disassemble_range(
        &self,
        mem: &Memory,
        start: Addr,
        count: usize,
    ) -> Vec<DisassembledInstruction> {
        let mut out = Vec::with_capacity(count);
        let mut addr = start;
        for _ in 0..count {
            let instr = self.disassemble(mem, addr);
            addr = addr.wrapping_add(instr.len() as Addr);
            out.push(instr);
        }
        out
    }
}

impl Default for Disassembler {
    fn default() -> Self {
        Disassembler::new()
    }
}
