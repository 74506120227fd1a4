//! Addressing-mode resolution.
//!
//! One pure function: read operand bytes from the instruction stream,
//! advance the PC, charge the cycles the fetch costs, and hand back the
//! effective address. Instructions stay ignorant of where their operand
//! came from; the only mode-specific knowledge they keep is whether the
//! operand is the accumulator or a bus address.
//!
//! Cycle charges here cover the operand fetch and any indexing work. The
//! data access itself is charged by the instruction when it reads or writes
//! through the resolved address.

use super::super::bus::Addr;
use super::super::mem::Memory;
use super::structs::{AddressingMode, CpuState};
use crate::{adj_cycles, bus, bytes_to_addr};

/// Sentinel returned for Implied/Accumulator, which have no address.
pub const NO_ADDRESS: Addr = 0;

/// Read the next instruction byte and advance PC.
fn fetch(state: &mut CpuState, mem: &mut Memory) -> u8 {
    let byte = bus!(read state, mem, Addr::from(state.regs.pc));
    state.regs.pc = state.regs.pc.wrapping_add(1);
    byte
}

/// One extra cycle whenever the direct page is not page-aligned.
fn dp_penalty(state: &mut CpuState) {
    if state.regs.d & 0x00FF != 0 {
        adj_cycles!(state, 1);
    }
}

/// An offset into the direct page. The offset has already wrapped within
/// the page; `d` relocates the page itself (65816 native mode only).
fn dp_addr(state: &CpuState, offset: u8) -> Addr {
    Addr::from(state.regs.d.wrapping_add(u16::from(offset)))
}

/// Extend a 16-bit address with the data bank.
fn data_bank(state: &CpuState, addr: u16) -> Addr {
    (Addr::from(state.regs.dbr) << 16) | Addr::from(addr)
}

/// Read a 16-bit pointer out of the direct page, wrapping within it.
fn dp_pointer(state: &mut CpuState, mem: &mut Memory, offset: u8) -> u16 {
    let fst = bus!(read state, mem, dp_addr(state, offset));
    let snd = bus!(read state, mem, dp_addr(state, offset.wrapping_add(1)));
    bytes_to_addr!(fst, snd)
}

fn crosses_page(base: u16, addr: u16) -> bool {
    base & 0xFF00 != addr & 0xFF00
}

/// Absolute,X / Absolute,Y. Reads only pay the indexing cycle when the sum
/// crosses a page; writes (and read-modify-writes) always pay it.
fn absolute_indexed(
    state: &mut CpuState,
    mem: &mut Memory,
    index: u8,
    always_charge: bool,
) -> Addr {
    let fst = fetch(state, mem);
    let snd = fetch(state, mem);
    let base = bytes_to_addr!(fst, snd);
    let addr = base.wrapping_add(u16::from(index));
    if always_charge || crosses_page(base, addr) {
        adj_cycles!(state, 1);
    }
    data_bank(state, addr)
}

/// Resolve the operand address for `mode`, advancing PC past the operand
/// bytes and charging the fetch cycles.
pub fn resolve(state: &mut CpuState, mem: &mut Memory, mode: AddressingMode) -> Addr {
    match mode {
        AddressingMode::Implied | AddressingMode::Accumulator => NO_ADDRESS,
        AddressingMode::Immediate => {
            let addr = Addr::from(state.regs.pc);
            state.regs.pc = state.regs.pc.wrapping_add(1);
            addr
        }
        AddressingMode::ZeroPage => {
            let zp = fetch(state, mem);
            dp_penalty(state);
            dp_addr(state, zp)
        }
        AddressingMode::ZeroPageX => {
            let zp = fetch(state, mem);
            adj_cycles!(state, 1);
            dp_penalty(state);
            dp_addr(state, zp.wrapping_add(state.regs.x))
        }
        AddressingMode::ZeroPageY => {
            let zp = fetch(state, mem);
            adj_cycles!(state, 1);
            dp_penalty(state);
            dp_addr(state, zp.wrapping_add(state.regs.y))
        }
        AddressingMode::ZeroPageIndirect => {
            let zp = fetch(state, mem);
            dp_penalty(state);
            let ptr = dp_pointer(state, mem, zp);
            data_bank(state, ptr)
        }
        AddressingMode::Absolute => {
            let fst = fetch(state, mem);
            let snd = fetch(state, mem);
            data_bank(state, bytes_to_addr!(fst, snd))
        }
        AddressingMode::AbsoluteX => {
            let x = state.regs.x;
            absolute_indexed(state, mem, x, false)
        }
        AddressingMode::AbsoluteXWrite => {
            let x = state.regs.x;
            absolute_indexed(state, mem, x, true)
        }
        AddressingMode::AbsoluteY => {
            let y = state.regs.y;
            absolute_indexed(state, mem, y, false)
        }
        AddressingMode::AbsoluteYWrite => {
            let y = state.regs.y;
            absolute_indexed(state, mem, y, true)
        }
        AddressingMode::Indirect => {
            let fst = fetch(state, mem);
            let snd = fetch(state, mem);
            let ptr = bytes_to_addr!(fst, snd);
            // The 65C02 carries into the high byte here; the 6502 famously
            // did not.
            let lo = bus!(read state, mem, Addr::from(ptr));
            let hi = bus!(read state, mem, Addr::from(ptr.wrapping_add(1)));
            Addr::from(bytes_to_addr!(lo, hi))
        }
        AddressingMode::AbsoluteIndexedIndirect => {
            let fst = fetch(state, mem);
            let snd = fetch(state, mem);
            let ptr = bytes_to_addr!(fst, snd).wrapping_add(u16::from(state.regs.x));
            adj_cycles!(state, 1);
            let lo = bus!(read state, mem, Addr::from(ptr));
            let hi = bus!(read state, mem, Addr::from(ptr.wrapping_add(1)));
            Addr::from(bytes_to_addr!(lo, hi))
        }
        AddressingMode::IndirectX => {
            let zp = fetch(state, mem);
            adj_cycles!(state, 1);
            dp_penalty(state);
            let ptr = {
                let offset = zp.wrapping_add(state.regs.x);
                dp_pointer(state, mem, offset)
            };
            data_bank(state, ptr)
        }
        AddressingMode::IndirectY | AddressingMode::IndirectYWrite => {
            let zp = fetch(state, mem);
            dp_penalty(state);
            let base = dp_pointer(state, mem, zp);
            let addr = base.wrapping_add(u16::from(state.regs.y));
            if mode == AddressingMode::IndirectYWrite || crosses_page(base, addr) {
                adj_cycles!(state, 1);
            }
            data_bank(state, addr)
        }
        AddressingMode::Relative => {
            let offset = fetch(state, mem) as i8;
            Addr::from(state.regs.pc.wrapping_add(offset as u16))
        }
    }
}

/// Operand bytes that follow the opcode for a given mode.
pub fn operand_length(mode: AddressingMode) -> usize {
    match mode {
        AddressingMode::Implied | AddressingMode::Accumulator => 0,
        AddressingMode::Immediate
        | AddressingMode::ZeroPage
        | AddressingMode::ZeroPageX
        | AddressingMode::ZeroPageY
        | AddressingMode::ZeroPageIndirect
        | AddressingMode::IndirectX
        | AddressingMode::IndirectY
        | AddressingMode::IndirectYWrite
        | AddressingMode::Relative => 1,
        AddressingMode::Absolute
        | AddressingMode::AbsoluteX
        | AddressingMode::AbsoluteXWrite
        | AddressingMode::AbsoluteY
        | AddressingMode::AbsoluteYWrite
        | AddressingMode::Indirect
        | AddressingMode::AbsoluteIndexedIndirect => 2,
    }
}
