//! The opcode dispatch table.
//!
//! One entry per opcode byte, each carrying its mnemonic and addressing mode
//! alongside the handler. The disassembler reads the tags straight out of
//! this table, so there is exactly one place where an opcode's identity is
//! defined. Unmapped slots (including the Rockwell bit ops) fall through to
//! the illegal-opcode handler, which stops the CPU.

use super::instructions::{self as ops, OpcodeHandler};
use super::structs::{AddressingMode, Mnemonic};

#[derive(Clone, Copy)]
pub struct Opcode {
    pub mnemonic: Mnemonic,
    pub mode: AddressingMode,
    pub exec: OpcodeHandler,
}

const fn entry(mnemonic: Mnemonic, mode: AddressingMode, exec: OpcodeHandler) -> Opcode {
    Opcode {
        mnemonic,
        mode,
        exec,
    }
}

const ILLEGAL: Opcode = entry(Mnemonic::ILL, AddressingMode::Implied, ops::op_ill);

pub static OPCODES: [Opcode; 256] = build_table();

#[rustfmt::skip]
const fn build_table() -> [Opcode; 256] {
    use AddressingMode::*;
    use Mnemonic as M;

    let mut t = [ILLEGAL; 256];

    // 0x0_
    t[0x00] = entry(M::BRK, Implied, ops::op_brk);
    t[0x01] = entry(M::ORA, IndirectX, ops::op_ora);
    t[0x04] = entry(M::TSB, ZeroPage, ops::op_tsb);
    t[0x05] = entry(M::ORA, ZeroPage, ops::op_ora);
    t[0x06] = entry(M::ASL, ZeroPage, ops::op_asl);
    t[0x08] = entry(M::PHP, Implied, ops::op_php);
    t[0x09] = entry(M::ORA, Immediate, ops::op_ora);
    t[0x0A] = entry(M::ASL, Accumulator, ops::op_asl);
    t[0x0C] = entry(M::TSB, Absolute, ops::op_tsb);
    t[0x0D] = entry(M::ORA, Absolute, ops::op_ora);
    t[0x0E] = entry(M::ASL, Absolute, ops::op_asl);

    // 0x1_
    t[0x10] = entry(M::BPL, Relative, ops::op_bpl);
    t[0x11] = entry(M::ORA, IndirectY, ops::op_ora);
    t[0x12] = entry(M::ORA, ZeroPageIndirect, ops::op_ora);
    t[0x14] = entry(M::TRB, ZeroPage, ops::op_trb);
    t[0x15] = entry(M::ORA, ZeroPageX, ops::op_ora);
    t[0x16] = entry(M::ASL, ZeroPageX, ops::op_asl);
    t[0x18] = entry(M::CLC, Implied, ops::op_clc);
    t[0x19] = entry(M::ORA, AbsoluteY, ops::op_ora);
    t[0x1A] = entry(M::INC, Accumulator, ops::op_inc);
    t[0x1C] = entry(M::TRB, Absolute, ops::op_trb);
    t[0x1D] = entry(M::ORA, AbsoluteX, ops::op_ora);
    t[0x1E] = entry(M::ASL, AbsoluteXWrite, ops::op_asl);

    // 0x2_
    t[0x20] = entry(M::JSR, Absolute, ops::op_jsr);
    t[0x21] = entry(M::AND, IndirectX, ops::op_and);
    t[0x24] = entry(M::BIT, ZeroPage, ops::op_bit);
    t[0x25] = entry(M::AND, ZeroPage, ops::op_and);
    t[0x26] = entry(M::ROL, ZeroPage, ops::op_rol);
    t[0x28] = entry(M::PLP, Implied, ops::op_plp);
    t[0x29] = entry(M::AND, Immediate, ops::op_and);
    t[0x2A] = entry(M::ROL, Accumulator, ops::op_rol);
    t[0x2C] = entry(M::BIT, Absolute, ops::op_bit);
    t[0x2D] = entry(M::AND, Absolute, ops::op_and);
    t[0x2E] = entry(M::ROL, Absolute, ops::op_rol);

    // 0x3_
    t[0x30] = entry(M::BMI, Relative, ops::op_bmi);
    t[0x31] = entry(M::AND, IndirectY, ops::op_and);
    t[0x32] = entry(M::AND, ZeroPageIndirect, ops::op_and);
    t[0x34] = entry(M::BIT, ZeroPageX, ops::op_bit);
    t[0x35] = entry(M::AND, ZeroPageX, ops::op_and);
    t[0x36] = entry(M::ROL, ZeroPageX, ops::op_rol);
    t[0x38] = entry(M::SEC, Implied, ops::op_sec);
    t[0x39] = entry(M::AND, AbsoluteY, ops::op_and);
    t[0x3A] = entry(M::DEC, Accumulator, ops::op_dec);
    t[0x3C] = entry(M::BIT, AbsoluteX, ops::op_bit);
    t[0x3D] = entry(M::AND, AbsoluteX, ops::op_and);
    t[0x3E] = entry(M::ROL, AbsoluteXWrite, ops::op_rol);

    // 0x4_
    t[0x40] = entry(M::RTI, Implied, ops::op_rti);
    t[0x41] = entry(M::EOR, IndirectX, ops::op_eor);
    t[0x45] = entry(M::EOR, ZeroPage, ops::op_eor);
    t[0x46] = entry(M::LSR, ZeroPage, ops::op_lsr);
    t[0x48] = entry(M::PHA, Implied, ops::op_pha);
    t[0x49] = entry(M::EOR, Immediate, ops::op_eor);
    t[0x4A] = entry(M::LSR, Accumulator, ops::op_lsr);
    t[0x4C] = entry(M::JMP, Absolute, ops::op_jmp);
    t[0x4D] = entry(M::EOR, Absolute, ops::op_eor);
    t[0x4E] = entry(M::LSR, Absolute, ops::op_lsr);

    // 0x5_
    t[0x50] = entry(M::BVC, Relative, ops::op_bvc);
    t[0x51] = entry(M::EOR, IndirectY, ops::op_eor);
    t[0x52] = entry(M::EOR, ZeroPageIndirect, ops::op_eor);
    t[0x55] = entry(M::EOR, ZeroPageX, ops::op_eor);
    t[0x56] = entry(M::LSR, ZeroPageX, ops::op_lsr);
    t[0x58] = entry(M::CLI, Implied, ops::op_cli);
    t[0x59] = entry(M::EOR, AbsoluteY, ops::op_eor);
    t[0x5A] = entry(M::PHY, Implied, ops::op_phy);
    t[0x5D] = entry(M::EOR, AbsoluteX, ops::op_eor);
    t[0x5E] = entry(M::LSR, AbsoluteXWrite, ops::op_lsr);

    // 0x6_
    t[0x60] = entry(M::RTS, Implied, ops::op_rts);
    t[0x61] = entry(M::ADC, IndirectX, ops::op_adc);
    t[0x64] = entry(M::STZ, ZeroPage, ops::op_stz);
    t[0x65] = entry(M::ADC, ZeroPage, ops::op_adc);
    t[0x66] = entry(M::ROR, ZeroPage, ops::op_ror);
    t[0x68] = entry(M::PLA, Implied, ops::op_pla);
    t[0x69] = entry(M::ADC, Immediate, ops::op_adc);
    t[0x6A] = entry(M::ROR, Accumulator, ops::op_ror);
    t[0x6C] = entry(M::JMP, Indirect, ops::op_jmp);
    t[0x6D] = entry(M::ADC, Absolute, ops::op_adc);
    t[0x6E] = entry(M::ROR, Absolute, ops::op_ror);

    // 0x7_
    t[0x70] = entry(M::BVS, Relative, ops::op_bvs);
    t[0x71] = entry(M::ADC, IndirectY, ops::op_adc);
    t[0x72] = entry(M::ADC, ZeroPageIndirect, ops::op_adc);
    t[0x74] = entry(M::STZ, ZeroPageX, ops::op_stz);
    t[0x75] = entry(M::ADC, ZeroPageX, ops::op_adc);
    t[0x76] = entry(M::ROR, ZeroPageX, ops::op_ror);
    t[0x78] = entry(M::SEI, Implied, ops::op_sei);
    t[0x79] = entry(M::ADC, AbsoluteY, ops::op_adc);
    t[0x7A] = entry(M::PLY, Implied, ops::op_ply);
    t[0x7C] = entry(M::JMP, AbsoluteIndexedIndirect, ops::op_jmp);
    t[0x7D] = entry(M::ADC, AbsoluteX, ops::op_adc);
    t[0x7E] = entry(M::ROR, AbsoluteXWrite, ops::op_ror);

    // 0x8_
    t[0x80] = entry(M::BRA, Relative, ops::op_bra);
    t[0x81] = entry(M::STA, IndirectX, ops::op_sta);
    t[0x84] = entry(M::STY, ZeroPage, ops::op_sty);
    t[0x85] = entry(M::STA, ZeroPage, ops::op_sta);
    t[0x86] = entry(M::STX, ZeroPage, ops::op_stx);
    t[0x88] = entry(M::DEY, Implied, ops::op_dey);
    t[0x89] = entry(M::BIT, Immediate, ops::op_bit);
    t[0x8A] = entry(M::TXA, Implied, ops::op_txa);
    t[0x8C] = entry(M::STY, Absolute, ops::op_sty);
    t[0x8D] = entry(M::STA, Absolute, ops::op_sta);
    t[0x8E] = entry(M::STX, Absolute, ops::op_stx);

    // 0x9_
    t[0x90] = entry(M::BCC, Relative, ops::op_bcc);
    t[0x91] = entry(M::STA, IndirectYWrite, ops::op_sta);
    t[0x92] = entry(M::STA, ZeroPageIndirect, ops::op_sta);
    t[0x94] = entry(M::STY, ZeroPageX, ops::op_sty);
    t[0x95] = entry(M::STA, ZeroPageX, ops::op_sta);
    t[0x96] = entry(M::STX, ZeroPageY, ops::op_stx);
    t[0x98] = entry(M::TYA, Implied, ops::op_tya);
    t[0x99] = entry(M::STA, AbsoluteYWrite, ops::op_sta);
    t[0x9A] = entry(M::TXS, Implied, ops::op_txs);
    t[0x9C] = entry(M::STZ, Absolute, ops::op_stz);
    t[0x9D] = entry(M::STA, AbsoluteXWrite, ops::op_sta);
    t[0x9E] = entry(M::STZ, AbsoluteXWrite, ops::op_stz);

    // 0xA_
    t[0xA0] = entry(M::LDY, Immediate, ops::op_ldy);
    t[0xA1] = entry(M::LDA, IndirectX, ops::op_lda);
    t[0xA2] = entry(M::LDX, Immediate, ops::op_ldx);
    t[0xA4] = entry(M::LDY, ZeroPage, ops::op_ldy);
    t[0xA5] = entry(M::LDA, ZeroPage, ops::op_lda);
    t[0xA6] = entry(M::LDX, ZeroPage, ops::op_ldx);
    t[0xA8] = entry(M::TAY, Implied, ops::op_tay);
    t[0xA9] = entry(M::LDA, Immediate, ops::op_lda);
    t[0xAA] = entry(M::TAX, Implied, ops::op_tax);
    t[0xAC] = entry(M::LDY, Absolute, ops::op_ldy);
    t[0xAD] = entry(M::LDA, Absolute, ops::op_lda);
    t[0xAE] = entry(M::LDX, Absolute, ops::op_ldx);

    // 0xB_
    t[0xB0] = entry(M::BCS, Relative, ops::op_bcs);
    t[0xB1] = entry(M::LDA, IndirectY, ops::op_lda);
    t[0xB2] = entry(M::LDA, ZeroPageIndirect, ops::op_lda);
    t[0xB4] = entry(M::LDY, ZeroPageX, ops::op_ldy);
    t[0xB5] = entry(M::LDA, ZeroPageX, ops::op_lda);
    t[0xB6] = entry(M::LDX, ZeroPageY, ops::op_ldx);
    t[0xB8] = entry(M::CLV, Implied, ops::op_clv);
    t[0xB9] = entry(M::LDA, AbsoluteY, ops::op_lda);
    t[0xBA] = entry(M::TSX, Implied, ops::op_tsx);
    t[0xBC] = entry(M::LDY, AbsoluteX, ops::op_ldy);
    t[0xBD] = entry(M::LDA, AbsoluteX, ops::op_lda);
    t[0xBE] = entry(M::LDX, AbsoluteY, ops::op_ldx);

    // 0xC_
    t[0xC0] = entry(M::CPY, Immediate, ops::op_cpy);
    t[0xC1] = entry(M::CMP, IndirectX, ops::op_cmp);
    t[0xC4] = entry(M::CPY, ZeroPage, ops::op_cpy);
    t[0xC5] = entry(M::CMP, ZeroPage, ops::op_cmp);
    t[0xC6] = entry(M::DEC, ZeroPage, ops::op_dec);
    t[0xC8] = entry(M::INY, Implied, ops::op_iny);
    t[0xC9] = entry(M::CMP, Immediate, ops::op_cmp);
    t[0xCA] = entry(M::DEX, Implied, ops::op_dex);
    t[0xCB] = entry(M::WAI, Implied, ops::op_wai);
    t[0xCC] = entry(M::CPY, Absolute, ops::op_cpy);
    t[0xCD] = entry(M::CMP, Absolute, ops::op_cmp);
    t[0xCE] = entry(M::DEC, Absolute, ops::op_dec);

    // 0xD_
    t[0xD0] = entry(M::BNE, Relative, ops::op_bne);
    t[0xD1] = entry(M::CMP, IndirectY, ops::op_cmp);
    t[0xD2] = entry(M::CMP, ZeroPageIndirect, ops::op_cmp);
    t[0xD5] = entry(M::CMP, ZeroPageX, ops::op_cmp);
    t[0xD6] = entry(M::DEC, ZeroPageX, ops::op_dec);
    t[0xD8] = entry(M::CLD, Implied, ops::op_cld);
    t[0xD9] = entry(M::CMP, AbsoluteY, ops::op_cmp);
    t[0xDA] = entry(M::PHX, Implied, ops::op_phx);
    t[0xDB] = entry(M::STP, Implied, ops::op_stp);
    t[0xDD] = entry(M::CMP, AbsoluteX, ops::op_cmp);
    t[0xDE] = entry(M::DEC, AbsoluteXWrite, ops::op_dec);

    // 0xE_
    t[0xE0] = entry(M::CPX, Immediate, ops::op_cpx);
    t[0xE1] = entry(M::SBC, IndirectX, ops::op_sbc);
    t[0xE4] = entry(M::CPX, ZeroPage, ops::op_cpx);
    t[0xE5] = entry(M::SBC, ZeroPage, ops::op_sbc);
    t[0xE6] = entry(M::INC, ZeroPage, ops::op_inc);
    t[0xE8] = entry(M::INX, Implied, ops::op_inx);
    t[0xE9] = entry(M::SBC, Immediate, ops::op_sbc);
    t[0xEA] = entry(M::NOP, Implied, ops::op_nop);
    t[0xEC] = entry(M::CPX, Absolute, ops::op_cpx);
    t[0xED] = entry(M::SBC, Absolute, ops::op_sbc);
    t[0xEE] = entry(M::INC, Absolute, ops::op_inc);

    // 0xF_
    t[0xF0] = entry(M::BEQ, Relative, ops::op_beq);
    t[0xF1] = entry(M::SBC, IndirectY, ops::op_sbc);
    t[0xF2] = entry(M::SBC, ZeroPageIndirect, ops::op_sbc);
    t[0xF5] = entry(M::SBC, ZeroPageX, ops::op_sbc);
    t[0xF6] = entry(M::INC, ZeroPageX, ops::op_inc);
    t[0xF8] = entry(M::SED, Implied, ops::op_sed);
    t[0xF9] = entry(M::SBC, AbsoluteY, ops::op_sbc);
    t[0xFA] = entry(M::PLX, Implied, ops::op_plx);
    t[0xFD] = entry(M::SBC, AbsoluteX, ops::op_sbc);
    t[0xFE] = entry(M::INC, AbsoluteXWrite, ops::op_inc);

    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_slot_count() {
        let mapped = OPCODES
            .iter()
            .filter(|op| op.mnemonic != Mnemonic::ILL)
            .count();
        // 151 documented 6502 opcodes + 29 65C02 additions
        assert_eq!(mapped, 180);
    }

    #[test]
    fn spot_checks() {
        assert_eq!(OPCODES[0xEA].mnemonic, Mnemonic::NOP);
        assert_eq!(OPCODES[0xA9].mnemonic, Mnemonic::LDA);
        assert_eq!(OPCODES[0xA9].mode, AddressingMode::Immediate);
        assert_eq!(OPCODES[0x6C].mode, AddressingMode::Indirect);
        assert_eq!(OPCODES[0x9D].mode, AddressingMode::AbsoluteXWrite);
        assert_eq!(OPCODES[0xF2].mode, AddressingMode::ZeroPageIndirect);
        assert_eq!(OPCODES[0x02].mnemonic, Mnemonic::ILL);
    }

    #[test]
    fn branches_are_all_relative() {
        for op in [0x10, 0x30, 0x50, 0x70, 0x80, 0x90, 0xB0, 0xD0, 0xF0] {
            assert_eq!(OPCODES[op].mode, AddressingMode::Relative);
        }
    }
}
