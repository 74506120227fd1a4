/// WASM front-end for the BASIC interpreter
use std::panic;

use js_sys::Array;
use wasm_bindgen::prelude::*;

use crate::basic::{BufferIo, Interpreter};
use crate::devices::cpu::Disassembler;

#[wasm_bindgen]
pub struct BasicConsole {
    interp: Interpreter,
}

#[wasm_bindgen]
impl BasicConsole {
    #[wasm_bindgen(constructor)]
    pub fn new() -> BasicConsole {
        BasicConsole {
            interp: Interpreter::new(),
        }
    }

    /// Run a BASIC source listing with scripted input lines; returns the
    /// captured transcript.
    #[wasm_bindgen]
    pub fn run(&mut self, source: &str, input: Array) -> String {
        let lines: Vec<String> = input
            .iter()
            .filter_map(|value| value.as_string())
            .collect();
        let mut io = BufferIo::new(lines);
        let handle = io.output_handle();
        self.interp.run_source(source, &mut io);
        let transcript = handle.borrow().clone();
        transcript
    }

    /// PEEK, for host-side inspection panels.
    #[wasm_bindgen]
    pub fn peek(&self, addr: u32) -> u8 {
        self.interp.mem.peek(addr)
    }

    /// Disassemble a window of memory into display lines.
    #[wasm_bindgen]
    pub fn disassemble(&self, start: u32, count: usize) -> Array {
        let disasm = Disassembler::new();
        disasm
            .disassemble_range(&self.interp.mem, start, count)
            .iter()
            .map(|instr| JsValue::from_str(&instr.to_string()))
            .collect()
    }
}

/// Installs a global panic handler to make debugging easier
#[wasm_bindgen]
pub fn init_debug_hooks() {
    panic::set_hook(Box::new(console_error_panic_hook::hook));
}
