//! Shared harness for the end-to-end tests: run a BASIC listing against a
//! scripted console and hand back the transcript (and the interpreter, for
//! tests that want to inspect memory afterwards).

use applesoft_core::basic::{BufferIo, Interpreter};

pub fn run_program(source: &str) -> String {
    run_with_input(source, &[]).1
}

pub fn run_with_input(source: &str, input: &[&str]) -> (Interpreter, String) {
    let mut interp = Interpreter::new();
    let output = run_on(&mut interp, source, input);
    (interp, output)
}

pub fn run_on(interp: &mut Interpreter, source: &str, input: &[&str]) -> String {
    let mut io = BufferIo::new(input.iter().map(|s| s.to_string()));
    let handle = io.output_handle();
    interp.run_source(source, &mut io);
    let output = handle.borrow().clone();
    output
}
