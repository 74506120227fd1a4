//! The 65C02 execution engine.
//!
//! `step` runs exactly one instruction: fetch the opcode, dispatch through
//! the table, and report how many cycles it cost. Nothing here ever blocks;
//! cancellation is a flag checked at the step boundary, so a stop request is
//! honored within one instruction.

use super::super::bus::{apple_memory_map, Addr, Word};
use super::super::mem::Memory;
use super::instructions::push_stack;
use super::modes::operand_length;
use super::structs::{
    CpuState, HaltState, InstructionTrace, Status, POWERON_CPU_STATE,
};
use super::table::OPCODES;
use crate::bus;

/// Called after every instruction with the state the instruction left
/// behind. Runs on the CPU thread; must not block.
pub type StepListener = Box<dyn FnMut(&CpuState)>;

pub struct Cpu {
    pub state: CpuState,
    stop_requested: bool,
    trace_enabled: bool,
    step_listener: Option<StepListener>,
}

impl Cpu {
    pub fn new() -> Cpu {
        Cpu {
            state: POWERON_CPU_STATE,
            stop_requested: false,
            trace_enabled: false,
            step_listener: None,
        }
    }

    /// While a debugger is attached, each step records an
    /// `InstructionTrace` into the state.
    pub fn attach_debugger(&mut self) {
        self.trace_enabled = true;
    }

    pub fn detach_debugger(&mut self) {
        self.trace_enabled = false;
        self.state.trace = None;
    }

    pub fn set_step_listener(&mut self, listener: StepListener) {
        self.step_listener = Some(listener);
    }

    pub fn clear_step_listener(&mut self) {
        self.step_listener = None;
    }

    /// Ask the CPU to stop at the next instruction boundary.
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    pub fn halted(&self) -> bool {
        self.state.halt != HaltState::None
    }

    /// Copy out the whole CPU state, e.g. for a save state.
    pub fn snapshot(&self) -> CpuState {
        self.state
    }

    pub fn restore(&mut self, state: CpuState) {
        self.state = state;
    }

    /// Run one instruction and return the cycles it consumed. Returns 0
    /// when the CPU is halted (or a stop was requested), without touching
    /// memory.
    pub fn step(&mut self, mem: &mut Memory) -> u64 {
        if self.stop_requested {
            self.stop_requested = false;
            self.state.halt = HaltState::Stp;
            return 0;
        }
        if self.halted() {
            return 0;
        }

        let start_cycles = self.state.cycles;
        let pc = self.state.regs.pc;
        let opcode = bus!(read self.state, mem, Addr::from(pc));
        self.state.regs.pc = pc.wrapping_add(1);

        let entry = &OPCODES[usize::from(opcode)];
        (entry.exec)(&mut self.state, mem, entry.mode);

        let spent = self.state.cycles - start_cycles;
        if self.trace_enabled {
            let len = operand_length(entry.mode);
            let mut operands = [0u8; 2];
            for (i, slot) in operands.iter_mut().enumerate().take(len) {
                *slot = mem.peek(Addr::from(pc.wrapping_add(1 + i as u16)));
            }
            self.state.trace = Some(InstructionTrace {
                mnemonic: entry.mnemonic,
                mode: entry.mode,
                operands,
                operand_len: len as u8,
                cycles: spent as u8,
            });
        }
        if let Some(listener) = self.step_listener.as_mut() {
            listener(&self.state);
        }
        spent
    }

    /// Jump to `start` and run until the CPU halts.
    pub fn execute(&mut self, start: Word, mem: &mut Memory) {
        self.state.regs.pc = start;
        self.state.halt = HaltState::None;
        while self.step(mem) > 0 {}
    }

    /// Hardware reset: registers to power-on values, PC from the reset
    /// vector, cycle counter rewound.
    pub fn reset(&mut self, mem: &mut Memory) {
        let pc = mem.read_word(apple_memory_map::RESET_VECTOR);
        self.state = POWERON_CPU_STATE;
        self.state.regs.pc = pc;
        self.stop_requested = false;
    }

    /// Maskable interrupt. Ignored while I is set.
    pub fn irq(&mut self, mem: &mut Memory) {
        if self.state.regs.status.contains(Status::IRQ_DISABLE) {
            return;
        }
        self.interrupt(mem, apple_memory_map::IRQ_VECTOR);
    }

    /// Non-maskable interrupt.
    pub fn nmi(&mut self, mem: &mut Memory) {
        self.interrupt(mem, apple_memory_map::NMI_VECTOR);
    }

    fn interrupt(&mut self, mem: &mut Memory, vector: Addr) {
        let ret = self.state.regs.pc.to_le_bytes();
        push_stack(&mut self.state, mem, ret[1]);
        push_stack(&mut self.state, mem, ret[0]);
        let flags = (self.state.regs.status | Status::UNUSED) & !Status::BREAK;
        push_stack(&mut self.state, mem, flags.bits());
        self.state.regs.status |= Status::IRQ_DISABLE;
        self.state.regs.pc = mem.read_word(vector);
        // WAI wakes up when an interrupt arrives
        if self.state.halt == HaltState::Wai {
            self.state.halt = HaltState::None;
        }
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Cpu::new()
    }
}

#[cfg(test)]
mod tests {
    use super::super::structs::Registers;
    use super::*;

    fn cpu_with(program: &[u8]) -> (Cpu, Memory) {
        let mut mem = Memory::new();
        mem.load_data(0x0300, program).unwrap();
        let mut cpu = Cpu::new();
        cpu.state.regs.pc = 0x0300;
        (cpu, mem)
    }

    #[test]
    fn every_step_costs_at_least_two_cycles() {
        // NOP, the cheapest instruction there is
        let (mut cpu, mut mem) = cpu_with(&[0xEA]);
        assert_eq!(cpu.step(&mut mem), 2);
    }

    #[test]
    fn halted_cpu_does_not_step() {
        let (mut cpu, mut mem) = cpu_with(&[0xEA, 0xEA]);
        cpu.state.halt = HaltState::Stp;
        assert_eq!(cpu.step(&mut mem), 0);
        assert_eq!(cpu.state.regs.pc, 0x0300);
    }

    #[test]
    fn stop_request_marks_stp_at_the_boundary() {
        let (mut cpu, mut mem) = cpu_with(&[0xEA, 0xEA]);
        cpu.step(&mut mem);
        cpu.request_stop();
        assert_eq!(cpu.step(&mut mem), 0);
        assert_eq!(cpu.state.halt, HaltState::Stp);
    }

    #[test]
    fn illegal_opcode_stops_without_panicking() {
        let (mut cpu, mut mem) = cpu_with(&[0x02]);
        cpu.step(&mut mem);
        assert_eq!(cpu.state.halt, HaltState::Stp);
    }

    #[test]
    fn reset_loads_the_vector_and_rewinds() {
        let (mut cpu, mut mem) = cpu_with(&[]);
        mem.load_data(0xFFFC, &[0x00, 0x03]).unwrap();
        cpu.state.regs = Registers {
            a: 0xFF,
            x: 0xFF,
            y: 0xFF,
            ..POWERON_CPU_STATE.regs
        };
        cpu.state.cycles = 1234;
        cpu.reset(&mut mem);
        assert_eq!(cpu.state.regs.pc, 0x0300);
        assert_eq!(cpu.state.regs.sp, 0xFD);
        assert_eq!(cpu.state.regs.status.bits(), 0x24);
        assert_eq!(cpu.state.cycles, 0);
        assert!(!cpu.halted());
    }

    #[test]
    fn trace_is_captured_only_with_a_debugger() {
        let (mut cpu, mut mem) = cpu_with(&[0xA9, 0x42, 0xA9, 0x43]);
        cpu.step(&mut mem);
        assert!(cpu.state.trace.is_none());

        cpu.attach_debugger();
        cpu.step(&mut mem);
        let trace = cpu.state.trace.expect("trace should be recorded");
        assert_eq!(trace.mnemonic, crate::devices::cpu::Mnemonic::LDA);
        assert_eq!(trace.operands[0], 0x43);
        assert_eq!(trace.cycles, 2);
    }

    #[test]
    fn step_listener_sees_completed_instructions() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_by_listener = seen.clone();
        let (mut cpu, mut mem) = cpu_with(&[0xA9, 0x42, 0x00]);
        cpu.set_step_listener(Box::new(move |state: &CpuState| {
            seen_by_listener.borrow_mut().push(state.regs.a);
        }));
        cpu.execute(0x0300, &mut mem);
        assert_eq!(*seen.borrow(), vec![0x42, 0x42]);
    }
}
