//! The 65C02 instruction set.
//!
//! Every handler has the same shape: resolve the operand address through the
//! addressing mode, do the work, charge whatever cycles the operation itself
//! costs beyond the bus traffic. Stack pushes and pulls are raw accesses;
//! each stack instruction charges its internal cycles explicitly.

use super::super::bus::{apple_memory_map, Addr};
use super::super::mem::Memory;
use super::modes::resolve;
use super::structs::{AddressingMode, CpuState, HaltState, Status};
use crate::{adj_cycles, bus, bytes_to_addr};

/// An opcode handler. The opcode byte has already been fetched; the mode is
/// the tag captured in the dispatch table entry.
pub type OpcodeHandler = fn(&mut CpuState, &mut Memory, AddressingMode);

macro_rules! op_fn {
    ($mnemonic: ident, $state: ident, $mem: ident, $mode: ident, $body: expr) => {
        pub fn $mnemonic($state: &mut CpuState, $mem: &mut Memory, $mode: AddressingMode) {
            $body
        }
    };
}

fn set_flag(state: &mut CpuState, flag: Status) {
    state.regs.status |= flag;
}

fn clear_flag(state: &mut CpuState, flag: Status) {
    state.regs.status &= !flag;
}

fn check_zero(state: &mut CpuState, val: u8) {
    state.regs.status.set(Status::ZERO, val == 0);
}

fn check_negative(state: &mut CpuState, val: u8) {
    state.regs.status.set(Status::NEGATIVE, val & 0x80 != 0);
}

/// Read the operand: the accumulator for accumulator mode, the bus
/// otherwise. Immediate mode resolved to the operand's own address, so it
/// needs no special case here.
fn read_operand(state: &mut CpuState, mem: &mut Memory, mode: AddressingMode, addr: Addr) -> u8 {
    match mode {
        AddressingMode::Accumulator => state.regs.a,
        _ => bus!(read state, mem, addr),
    }
}

fn write_operand(state: &mut CpuState, mem: &mut Memory, mode: AddressingMode, addr: Addr, data: u8) {
    match mode {
        AddressingMode::Accumulator => state.regs.a = data,
        _ => bus!(write state, mem, addr, data),
    }
}

/// Raw push; the stack lives in page 1 and the pointer wraps within it.
pub(super) fn push_stack(state: &mut CpuState, mem: &mut Memory, data: u8) {
    let addr = Addr::from(bytes_to_addr!(state.regs.sp, 0x01u8));
    mem.write(addr, data);
    state.regs.sp = state.regs.sp.wrapping_sub(1);
}

pub(super) fn pop_stack(state: &mut CpuState, mem: &mut Memory) -> u8 {
    state.regs.sp = state.regs.sp.wrapping_add(1);
    let addr = Addr::from(bytes_to_addr!(state.regs.sp, 0x01u8));
    mem.read(addr)
}

/// Take (or not) a branch whose target was already resolved. Taken costs a
/// cycle, crossing a page costs one more.
fn branch_if(state: &mut CpuState, addr: Addr, taken: bool) {
    if !taken {
        return;
    }
    let target = addr as u16;
    adj_cycles!(state, 1);
    if state.regs.pc & 0xFF00 != target & 0xFF00 {
        adj_cycles!(state, 1);
    }
    state.regs.pc = target;
}

//region Arithmetic

fn adc_binary(state: &mut CpuState, operand: u8) {
    let a = state.regs.a;
    let carry = u16::from(state.regs.status.contains(Status::CARRY));
    let sum = u16::from(a) + u16::from(operand) + carry;
    let result = sum as u8;
    state.regs.status.set(Status::CARRY, sum > 0xFF);
    state
        .regs
        .status
        .set(Status::OVERFLOW, (a ^ result) & (operand ^ result) & 0x80 != 0);
    state.regs.a = result;
    check_zero(state, result);
    check_negative(state, result);
}

/// BCD add. Each nibble is corrected by +6 when it overflows its decimal
/// digit; the 65C02 derives N, Z and V from the corrected result.
fn adc_decimal(state: &mut CpuState, operand: u8) {
    let a = state.regs.a;
    let carry = u8::from(state.regs.status.contains(Status::CARRY));
    let mut lo = (a & 0x0F) + (operand & 0x0F) + carry;
    let mut hi = (a >> 4) + (operand >> 4);
    if lo > 9 {
        lo += 6;
        hi += 1;
    }
    if hi > 9 {
        hi += 6;
    }
    let result = ((hi & 0x0F) << 4) | (lo & 0x0F);
    state.regs.status.set(Status::CARRY, hi > 15);
    state
        .regs
        .status
        .set(Status::OVERFLOW, (a ^ result) & (operand ^ result) & 0x80 != 0);
    state.regs.a = result;
    check_zero(state, result);
    check_negative(state, result);
}

fn sbc_binary(state: &mut CpuState, operand: u8) {
    let a = state.regs.a;
    let borrow = u16::from(!state.regs.status.contains(Status::CARRY));
    let diff = u16::from(a)
        .wrapping_sub(u16::from(operand))
        .wrapping_sub(borrow);
    let result = diff as u8;
    state.regs.status.set(Status::CARRY, diff < 0x100);
    state
        .regs
        .status
        .set(Status::OVERFLOW, (a ^ operand) & (a ^ result) & 0x80 != 0);
    state.regs.a = result;
    check_zero(state, result);
    check_negative(state, result);
}

/// BCD subtract, the -6 mirror of `adc_decimal`.
fn sbc_decimal(state: &mut CpuState, operand: u8) {
    let a = state.regs.a;
    let borrow = i16::from(!state.regs.status.contains(Status::CARRY));
    let mut lo = i16::from(a & 0x0F) - i16::from(operand & 0x0F) - borrow;
    let mut hi = i16::from(a >> 4) - i16::from(operand >> 4);
    if lo < 0 {
        lo = (lo - 6) & 0x0F;
        hi -= 1;
    }
    let carry = hi >= 0;
    if hi < 0 {
        hi = (hi - 6) & 0x0F;
    }
    let result = ((hi as u8) << 4) | (lo as u8 & 0x0F);
    state.regs.status.set(Status::CARRY, carry);
    state
        .regs
        .status
        .set(Status::OVERFLOW, (a ^ operand) & (a ^ result) & 0x80 != 0);
    state.regs.a = result;
    check_zero(state, result);
    check_negative(state, result);
}

op_fn!(op_adc, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    let operand = read_operand(state, mem, mode, addr);
    if state.regs.status.contains(Status::DECIMAL) {
        adc_decimal(state, operand);
    } else {
        adc_binary(state, operand);
    }
});

op_fn!(op_sbc, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    let operand = read_operand(state, mem, mode, addr);
    if state.regs.status.contains(Status::DECIMAL) {
        sbc_decimal(state, operand);
    } else {
        sbc_binary(state, operand);
    }
});

//endregion

//region Bitwise ops

op_fn!(op_and, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    state.regs.a &= read_operand(state, mem, mode, addr);
    let a = state.regs.a;
    check_zero(state, a);
    check_negative(state, a);
});

op_fn!(op_ora, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    state.regs.a |= read_operand(state, mem, mode, addr);
    let a = state.regs.a;
    check_zero(state, a);
    check_negative(state, a);
});

op_fn!(op_eor, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    state.regs.a ^= read_operand(state, mem, mode, addr);
    let a = state.regs.a;
    check_zero(state, a);
    check_negative(state, a);
});

op_fn!(op_bit, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    let operand = read_operand(state, mem, mode, addr);
    check_zero(state, state.regs.a & operand);
    // BIT # only touches Z on the 65C02
    if mode != AddressingMode::Immediate {
        state.regs.status.set(Status::NEGATIVE, operand & 0x80 != 0);
        state.regs.status.set(Status::OVERFLOW, operand & 0x40 != 0);
    }
});

op_fn!(op_tsb, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    let operand = bus!(read state, mem, addr);
    check_zero(state, state.regs.a & operand);
    adj_cycles!(state, 1);
    let merged = operand | state.regs.a;
    bus!(write state, mem, addr, merged);
});

op_fn!(op_trb, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    let operand = bus!(read state, mem, addr);
    check_zero(state, state.regs.a & operand);
    adj_cycles!(state, 1);
    let cleared = operand & !state.regs.a;
    bus!(write state, mem, addr, cleared);
});

//endregion

//region Shifts and rotates

op_fn!(op_asl, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    let operand = read_operand(state, mem, mode, addr);
    let wide = u16::from(operand) << 1;
    state.regs.status.set(Status::CARRY, wide & 0x0100 != 0);
    let result = wide as u8;
    check_zero(state, result);
    check_negative(state, result);
    adj_cycles!(state, 1);
    write_operand(state, mem, mode, addr, result);
});

op_fn!(op_lsr, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    let operand = read_operand(state, mem, mode, addr);
    state.regs.status.set(Status::CARRY, operand & 0x01 != 0);
    let result = operand >> 1;
    check_zero(state, result);
    check_negative(state, result);
    adj_cycles!(state, 1);
    write_operand(state, mem, mode, addr, result);
});

op_fn!(op_rol, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    let operand = read_operand(state, mem, mode, addr);
    let carry_in = u8::from(state.regs.status.contains(Status::CARRY));
    state.regs.status.set(Status::CARRY, operand & 0x80 != 0);
    let result = (operand << 1) | carry_in;
    check_zero(state, result);
    check_negative(state, result);
    adj_cycles!(state, 1);
    write_operand(state, mem, mode, addr, result);
});

op_fn!(op_ror, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    let operand = read_operand(state, mem, mode, addr);
    let carry_in = u8::from(state.regs.status.contains(Status::CARRY)) << 7;
    state.regs.status.set(Status::CARRY, operand & 0x01 != 0);
    let result = (operand >> 1) | carry_in;
    check_zero(state, result);
    check_negative(state, result);
    adj_cycles!(state, 1);
    write_operand(state, mem, mode, addr, result);
});

//endregion

//region Increment / decrement

op_fn!(op_inc, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    let result = read_operand(state, mem, mode, addr).wrapping_add(1);
    check_zero(state, result);
    check_negative(state, result);
    adj_cycles!(state, 1);
    write_operand(state, mem, mode, addr, result);
});

op_fn!(op_dec, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    let result = read_operand(state, mem, mode, addr).wrapping_sub(1);
    check_zero(state, result);
    check_negative(state, result);
    adj_cycles!(state, 1);
    write_operand(state, mem, mode, addr, result);
});

op_fn!(op_inx, state, _mem, _mode, {
    state.regs.x = state.regs.x.wrapping_add(1);
    let x = state.regs.x;
    check_zero(state, x);
    check_negative(state, x);
    adj_cycles!(state, 1);
});

op_fn!(op_iny, state, _mem, _mode, {
    state.regs.y = state.regs.y.wrapping_add(1);
    let y = state.regs.y;
    check_zero(state, y);
    check_negative(state, y);
    adj_cycles!(state, 1);
});

op_fn!(op_dex, state, _mem, _mode, {
    state.regs.x = state.regs.x.wrapping_sub(1);
    let x = state.regs.x;
    check_zero(state, x);
    check_negative(state, x);
    adj_cycles!(state, 1);
});

op_fn!(op_dey, state, _mem, _mode, {
    state.regs.y = state.regs.y.wrapping_sub(1);
    let y = state.regs.y;
    check_zero(state, y);
    check_negative(state, y);
    adj_cycles!(state, 1);
});

//endregion

//region Compares

fn compare(state: &mut CpuState, mem: &mut Memory, mode: AddressingMode, reg: u8) {
    let addr = resolve(state, mem, mode);
    let operand = read_operand(state, mem, mode, addr);
    let result = reg.wrapping_sub(operand);
    state.regs.status.set(Status::CARRY, reg >= operand);
    check_zero(state, result);
    check_negative(state, result);
}

op_fn!(op_cmp, state, mem, mode, {
    let a = state.regs.a;
    compare(state, mem, mode, a);
});

op_fn!(op_cpx, state, mem, mode, {
    let x = state.regs.x;
    compare(state, mem, mode, x);
});

op_fn!(op_cpy, state, mem, mode, {
    let y = state.regs.y;
    compare(state, mem, mode, y);
});

//endregion

//region Branches

op_fn!(op_bcc, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    let taken = !state.regs.status.contains(Status::CARRY);
    branch_if(state, addr, taken);
});

op_fn!(op_bcs, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    let taken = state.regs.status.contains(Status::CARRY);
    branch_if(state, addr, taken);
});

op_fn!(op_beq, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    let taken = state.regs.status.contains(Status::ZERO);
    branch_if(state, addr, taken);
});

op_fn!(op_bne, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    let taken = !state.regs.status.contains(Status::ZERO);
    branch_if(state, addr, taken);
});

op_fn!(op_bmi, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    let taken = state.regs.status.contains(Status::NEGATIVE);
    branch_if(state, addr, taken);
});

op_fn!(op_bpl, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    let taken = !state.regs.status.contains(Status::NEGATIVE);
    branch_if(state, addr, taken);
});

op_fn!(op_bvc, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    let taken = !state.regs.status.contains(Status::OVERFLOW);
    branch_if(state, addr, taken);
});

op_fn!(op_bvs, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    let taken = state.regs.status.contains(Status::OVERFLOW);
    branch_if(state, addr, taken);
});

op_fn!(op_bra, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    branch_if(state, addr, true);
});

//endregion

//region Jumps and returns

op_fn!(op_jmp, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    state.regs.pc = addr as u16;
});

op_fn!(op_jsr, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    let ret = state.regs.pc.wrapping_sub(1).to_le_bytes();
    push_stack(state, mem, ret[1]);
    push_stack(state, mem, ret[0]);
    state.regs.pc = addr as u16;
    adj_cycles!(state, 3);
});

op_fn!(op_rts, state, mem, _mode, {
    let fst = pop_stack(state, mem);
    let snd = pop_stack(state, mem);
    state.regs.pc = bytes_to_addr!(fst, snd).wrapping_add(1);
    adj_cycles!(state, 5);
});

op_fn!(op_rti, state, mem, _mode, {
    let flags = pop_stack(state, mem);
    state.regs.status =
        Status::from_bits_truncate(flags & !Status::BREAK.bits()) | Status::UNUSED;
    let fst = pop_stack(state, mem);
    let snd = pop_stack(state, mem);
    state.regs.pc = bytes_to_addr!(fst, snd);
    state.halt = HaltState::None;
    adj_cycles!(state, 5);
});

//endregion

//region Halts

op_fn!(op_brk, state, mem, _mode, {
    let ret = state.regs.pc.wrapping_add(1).to_le_bytes();
    push_stack(state, mem, ret[1]);
    push_stack(state, mem, ret[0]);
    let flags = state.regs.status | Status::BREAK | Status::UNUSED;
    push_stack(state, mem, flags.bits());
    set_flag(state, Status::IRQ_DISABLE);
    let fst = bus!(read state, mem, apple_memory_map::IRQ_VECTOR);
    let snd = bus!(read state, mem, apple_memory_map::IRQ_VECTOR + 1);
    state.regs.pc = bytes_to_addr!(fst, snd);
    state.halt = HaltState::Brk;
});

op_fn!(op_wai, state, _mem, _mode, {
    state.halt = HaltState::Wai;
    adj_cycles!(state, 1);
});

op_fn!(op_stp, state, _mem, _mode, {
    state.halt = HaltState::Stp;
    adj_cycles!(state, 1);
});

op_fn!(op_ill, state, _mem, _mode, {
    eprintln!(
        " [WARN] Illegal opcode at ${:04X}; stopping",
        state.regs.pc.wrapping_sub(1)
    );
    state.halt = HaltState::Stp;
    adj_cycles!(state, 1);
});

//endregion

//region Flag operations

op_fn!(op_clc, state, _mem, _mode, {
    clear_flag(state, Status::CARRY);
    adj_cycles!(state, 1);
});
op_fn!(op_sec, state, _mem, _mode, {
    set_flag(state, Status::CARRY);
    adj_cycles!(state, 1);
});
op_fn!(op_cli, state, _mem, _mode, {
    clear_flag(state, Status::IRQ_DISABLE);
    adj_cycles!(state, 1);
});
op_fn!(op_sei, state, _mem, _mode, {
    set_flag(state, Status::IRQ_DISABLE);
    adj_cycles!(state, 1);
});
op_fn!(op_cld, state, _mem, _mode, {
    clear_flag(state, Status::DECIMAL);
    adj_cycles!(state, 1);
});
op_fn!(op_sed, state, _mem, _mode, {
    set_flag(state, Status::DECIMAL);
    adj_cycles!(state, 1);
});
op_fn!(op_clv, state, _mem, _mode, {
    clear_flag(state, Status::OVERFLOW);
    adj_cycles!(state, 1);
});

//endregion

//region Loads and stores

op_fn!(op_lda, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    state.regs.a = read_operand(state, mem, mode, addr);
    let a = state.regs.a;
    check_zero(state, a);
    check_negative(state, a);
});

op_fn!(op_ldx, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    state.regs.x = read_operand(state, mem, mode, addr);
    let x = state.regs.x;
    check_zero(state, x);
    check_negative(state, x);
});

op_fn!(op_ldy, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    state.regs.y = read_operand(state, mem, mode, addr);
    let y = state.regs.y;
    check_zero(state, y);
    check_negative(state, y);
});

op_fn!(op_sta, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    let a = state.regs.a;
    write_operand(state, mem, mode, addr, a);
});

op_fn!(op_stx, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    let x = state.regs.x;
    write_operand(state, mem, mode, addr, x);
});

op_fn!(op_sty, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    let y = state.regs.y;
    write_operand(state, mem, mode, addr, y);
});

op_fn!(op_stz, state, mem, mode, {
    let addr = resolve(state, mem, mode);
    write_operand(state, mem, mode, addr, 0);
});

//endregion

//region Register transfers

op_fn!(op_tax, state, _mem, _mode, {
    state.regs.x = state.regs.a;
    let x = state.regs.x;
    check_zero(state, x);
    check_negative(state, x);
    adj_cycles!(state, 1);
});

op_fn!(op_tay, state, _mem, _mode, {
    state.regs.y = state.regs.a;
    let y = state.regs.y;
    check_zero(state, y);
    check_negative(state, y);
    adj_cycles!(state, 1);
});

op_fn!(op_txa, state, _mem, _mode, {
    state.regs.a = state.regs.x;
    let a = state.regs.a;
    check_zero(state, a);
    check_negative(state, a);
    adj_cycles!(state, 1);
});

op_fn!(op_tya, state, _mem, _mode, {
    state.regs.a = state.regs.y;
    let a = state.regs.a;
    check_zero(state, a);
    check_negative(state, a);
    adj_cycles!(state, 1);
});

op_fn!(op_tsx, state, _mem, _mode, {
    state.regs.x = state.regs.sp;
    let x = state.regs.x;
    check_zero(state, x);
    check_negative(state, x);
    adj_cycles!(state, 1);
});

op_fn!(op_txs, state, _mem, _mode, {
    state.regs.sp = state.regs.x;
    adj_cycles!(state, 1);
});

//endregion

//region Stack instructions

op_fn!(op_pha, state, mem, _mode, {
    let a = state.regs.a;
    push_stack(state, mem, a);
    adj_cycles!(state, 2);
});

op_fn!(op_phx, state, mem, _mode, {
    let x = state.regs.x;
    push_stack(state, mem, x);
    adj_cycles!(state, 2);
});

op_fn!(op_phy, state, mem, _mode, {
    let y = state.regs.y;
    push_stack(state, mem, y);
    adj_cycles!(state, 2);
});

op_fn!(op_php, state, mem, _mode, {
    let flags = state.regs.status | Status::BREAK | Status::UNUSED;
    push_stack(state, mem, flags.bits());
    adj_cycles!(state, 2);
});

op_fn!(op_pla, state, mem, _mode, {
    state.regs.a = pop_stack(state, mem);
    let a = state.regs.a;
    check_zero(state, a);
    check_negative(state, a);
    adj_cycles!(state, 3);
});

op_fn!(op_plx, state, mem, _mode, {
    state.regs.x = pop_stack(state, mem);
    let x = state.regs.x;
    check_zero(state, x);
    check_negative(state, x);
    adj_cycles!(state, 3);
});

op_fn!(op_ply, state, mem, _mode, {
    state.regs.y = pop_stack(state, mem);
    let y = state.regs.y;
    check_zero(state, y);
    check_negative(state, y);
    adj_cycles!(state, 3);
});

op_fn!(op_plp, state, mem, _mode, {
    let flags = pop_stack(state, mem);
    state.regs.status =
        Status::from_bits_truncate(flags & !Status::BREAK.bits()) | Status::UNUSED;
    adj_cycles!(state, 3);
});

//endregion

op_fn!(op_nop, state, _mem, _mode, {
    adj_cycles!(state, 1);
});

#[cfg(test)]
mod tests {
    use super::super::structs::POWERON_CPU_STATE;
    use super::*;

    fn fresh() -> (CpuState, Memory) {
        (POWERON_CPU_STATE, Memory::new())
    }

    #[test]
    fn decimal_adc_corrects_both_nibbles() {
        let (mut state, _) = fresh();
        state.regs.a = 0x25;
        adc_decimal(&mut state, 0x48);
        assert_eq!(state.regs.a, 0x73);
        assert!(!state.regs.status.contains(Status::CARRY));
        assert!(!state.regs.status.contains(Status::ZERO));
        assert!(!state.regs.status.contains(Status::NEGATIVE));
    }

    #[test]
    fn decimal_adc_wraps_at_one_hundred() {
        let (mut state, _) = fresh();
        state.regs.a = 0x99;
        set_flag(&mut state, Status::CARRY);
        adc_decimal(&mut state, 0x00);
        assert_eq!(state.regs.a, 0x00);
        assert!(state.regs.status.contains(Status::CARRY));
        assert!(state.regs.status.contains(Status::ZERO));
    }

    #[test]
    fn decimal_sbc_borrows_across_nibbles() {
        let (mut state, _) = fresh();
        state.regs.a = 0x73;
        set_flag(&mut state, Status::CARRY);
        sbc_decimal(&mut state, 0x48);
        assert_eq!(state.regs.a, 0x25);
        assert!(state.regs.status.contains(Status::CARRY));
    }

    #[test]
    fn decimal_sbc_underflow_clears_carry() {
        let (mut state, _) = fresh();
        state.regs.a = 0x25;
        set_flag(&mut state, Status::CARRY);
        sbc_decimal(&mut state, 0x48);
        assert_eq!(state.regs.a, 0x77);
        assert!(!state.regs.status.contains(Status::CARRY));
    }

    #[test]
    fn binary_adc_sets_overflow_on_sign_change() {
        let (mut state, _) = fresh();
        state.regs.a = 0x50;
        adc_binary(&mut state, 0x50);
        assert_eq!(state.regs.a, 0xA0);
        assert!(state.regs.status.contains(Status::OVERFLOW));
        assert!(state.regs.status.contains(Status::NEGATIVE));
        assert!(!state.regs.status.contains(Status::CARRY));
    }

    #[test]
    fn binary_sbc_borrow_chain() {
        let (mut state, _) = fresh();
        state.regs.a = 0x03;
        set_flag(&mut state, Status::CARRY);
        sbc_binary(&mut state, 0x05);
        assert_eq!(state.regs.a, 0xFE);
        assert!(!state.regs.status.contains(Status::CARRY));
        assert!(!state.regs.status.contains(Status::OVERFLOW));
    }

    #[test]
    fn stack_wraps_within_page_one() {
        let (mut state, mut mem) = fresh();
        state.regs.sp = 0x00;
        push_stack(&mut state, &mut mem, 0xAB);
        assert_eq!(state.regs.sp, 0xFF);
        assert_eq!(mem.peek(0x0100), 0xAB);
        assert_eq!(pop_stack(&mut state, &mut mem), 0xAB);
        assert_eq!(state.regs.sp, 0x00);
    }

    #[test]
    fn branch_charges_taken_and_crossing_cycles() {
        let (mut state, _) = fresh();
        state.regs.pc = 0x0302;
        branch_if(&mut state, 0x0310, false);
        assert_eq!(state.cycles, 0);
        branch_if(&mut state, 0x0310, true);
        assert_eq!(state.cycles, 1);
        state.regs.pc = 0x03F0;
        branch_if(&mut state, 0x0402, true);
        assert_eq!(state.cycles, 3);
    }
}
