use std::fmt;

bitflags! {
    /// The processor status register.
    ///
    /// UNUSED reads back as 1 on real silicon; M, X_WIDTH and the emulation
    /// flag only have meaning once a 65816 leaves emulation mode.
    pub struct Status: u8 {
        const CARRY = 0x01;
        const ZERO = 0x02;
        const IRQ_DISABLE = 0x04;
        const DECIMAL = 0x08;
        const BREAK = 0x10;
        const UNUSED = 0x20;
        const OVERFLOW = 0x40;
        const NEGATIVE = 0x80;
    }
}

/// Why the CPU is no longer executing, if it isn't.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum HaltState {
    /// Running normally
    None,
    /// A BRK instruction was executed
    Brk,
    /// WAI: waiting for an interrupt
    Wai,
    /// STP: stopped until reset. Also used for illegal opcodes and
    /// cooperative stop requests.
    Stp,
}

/// The register file.
///
/// `d`, `dbr` and `pbr` are 65816 extensions; they stay zero in emulation
/// mode, which is the only mode this core runs in. The addressing-mode layer
/// already honors them so that a native-mode core can slot in later.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub struct Registers {
    /// The accumulator
    pub a: u8,

    /// X index register
    pub x: u8,

    /// Y index register
    pub y: u8,

    /// The stack pointer, an offset into page 1. The 6502 stack grows down
    /// and wraps within the page.
    pub sp: u8,

    /// The program counter
    pub pc: u16,

    /// 65816 direct-page base. A nonzero low byte costs one cycle on every
    /// direct-page access.
    pub d: u16,

    /// 65816 data bank, the high byte of absolute addresses
    pub dbr: u8,

    /// 65816 program bank
    pub pbr: u8,

    /// Whether the CPU is in 6502 emulation mode. Always true here.
    pub emulation: bool,

    /// The status register
    pub status: Status,
}

/// What the last instruction looked like, for debuggers.
///
/// Populated only while a debugger is attached; the running core does not
/// pay for it otherwise.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub struct InstructionTrace {
    pub mnemonic: Mnemonic,
    pub mode: AddressingMode,
    pub operands: [u8; 2],
    pub operand_len: u8,
    /// Cycles consumed by this one instruction
    pub cycles: u8,
}

/// A snapshot of everything the CPU knows about itself.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct CpuState {
    pub regs: Registers,

    /// Total cycles since reset. Monotonic; only the host ever resets it.
    pub cycles: u64,

    pub halt: HaltState,

    /// Last decoded instruction, when a debugger is attached
    pub trace: Option<InstructionTrace>,
}

/// How an instruction finds its operand.
///
/// The `*Write` variants are the same bit patterns as their read twins, but
/// charge the indexing cycle unconditionally: stores and read-modify-write
/// ops always pay it, where pure reads only pay on a page crossing.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum AddressingMode {
    /// No operand at all
    Implied,
    /// The operand is the accumulator
    Accumulator,
    /// The operand byte follows the opcode
    Immediate,
    /// One-byte address within the direct page
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    /// 65C02: pointer in the direct page, no index
    ZeroPageIndirect,
    /// Two-byte address, extended by the data bank
    Absolute,
    AbsoluteX,
    AbsoluteXWrite,
    AbsoluteY,
    AbsoluteYWrite,
    /// JMP (abs). The 65C02 reads the pointer across page boundaries
    /// correctly; the 6502 page-wrap bug is not reproduced.
    Indirect,
    /// 65C02: JMP (abs,X)
    AbsoluteIndexedIndirect,
    /// (zp,X)
    IndirectX,
    /// (zp),Y
    IndirectY,
    IndirectYWrite,
    /// Branch offset, signed
    Relative,
}

/// The CPU opcode mnemonic. The 65C02 additions are included; Rockwell bit
/// ops are not.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
#[allow(clippy::upper_case_acronyms)]
pub enum Mnemonic {
    ADC, AND, ASL, BCC, BCS, BEQ, BIT, BMI, BNE, BPL, BRA, BRK, BVC, BVS,
    CLC, CLD, CLI, CLV, CMP, CPX, CPY, DEC, DEX, DEY, EOR, INC, INX, INY,
    JMP, JSR, LDA, LDX, LDY, LSR, NOP, ORA, PHA, PHP, PHX, PHY, PLA, PLP,
    PLX, PLY, ROL, ROR, RTI, RTS, SBC, SEC, SED, SEI, STA, STP, STX, STY,
    STZ, TAX, TAY, TRB, TSB, TSX, TXA, TXS, TYA, WAI,
    /// Unmapped opcode
    ILL,
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mnemonic::ILL => write!(f, "???"),
            other => write!(f, "{:?}", other),
        }
    }
}

pub const POWERON_CPU_STATE: CpuState = CpuState {
    regs: Registers {
        a: 0,
        x: 0,
        y: 0,
        sp: 0xFD,
        pc: 0,
        d: 0,
        dbr: 0,
        pbr: 0,
        emulation: true,
        status: Status::from_bits_truncate(0x24),
    },
    cycles: 0,
    halt: HaltState::None,
    trace: None,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poweron_state_matches_reset_contract() {
        let state = POWERON_CPU_STATE;
        assert_eq!(state.regs.sp, 0xFD);
        assert_eq!(state.regs.status.bits(), 0x24);
        assert_eq!(state.halt, HaltState::None);
        assert!(state.regs.emulation);
    }

    #[test]
    fn illegal_mnemonic_renders_as_question_marks() {
        assert_eq!(format!("{}", Mnemonic::ILL), "???");
        assert_eq!(format!("{}", Mnemonic::LDA), "LDA");
    }
}
