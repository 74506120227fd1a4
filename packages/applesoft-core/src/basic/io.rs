//! The interpreter's console seam.
//!
//! PRINT, INPUT, HTAB/VTAB, INVERSE/FLASH/NORMAL and HOME all land here.
//! `ConsoleIo` maps them onto a real terminal; `BufferIo` scripts the input
//! and captures the output for tests and the wasm bindings.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMode {
    Normal,
    Inverse,
    Flash,
}

pub trait BasicIo {
    fn write(&mut self, text: &str);
    fn write_line(&mut self, text: &str);
    /// Show the prompt and read one line (without its newline).
    fn read_line(&mut self, prompt: &str) -> String;
    /// One keypress, for GET.
    fn read_char(&mut self) -> char;
    fn set_cursor_position(&mut self, col: u32, row: u32);
    fn cursor_column(&self) -> u32;
    fn cursor_row(&self) -> u32;
    fn set_text_mode(&mut self, mode: TextMode);
    fn clear_screen(&mut self);
}

/// Track the cursor column the way a dumb 40-column terminal would.
fn advance_cursor(col: &mut u32, row: &mut u32, text: &str) {
    for c in text.chars() {
        if c == '\n' {
            *col = 0;
            *row += 1;
        } else {
            *col += 1;
        }
    }
}

/// Real stdin/stdout, with ANSI escapes for the screen modes.
#[derive(Default)]
pub struct ConsoleIo {
    col: u32,
    row: u32,
}

impl ConsoleIo {
    pub fn new() -> ConsoleIo {
        ConsoleIo::default()
    }
}

impl BasicIo for ConsoleIo {
    fn write(&mut self, text: &str) {
        print!("{text}");
        let _ = io::stdout().flush();
        advance_cursor(&mut self.col, &mut self.row, text);
    }

    fn write_line(&mut self, text: &str) {
        println!("{text}");
        self.col = 0;
        self.row += 1;
    }

    fn read_line(&mut self, prompt: &str) -> String {
        self.write(prompt);
        let mut line = String::new();
        let _ = io::stdin().lock().read_line(&mut line);
        self.col = 0;
        self.row += 1;
        line.trim_end_matches(['\n', '\r']).to_string()
    }

    fn read_char(&mut self) -> char {
        // no raw terminal mode here; take the first key of a line
        self.read_line("").chars().next().unwrap_or('\r')
    }

    fn set_cursor_position(&mut self, col: u32, row: u32) {
        // ANSI cursor addressing is 1-based
        print!("\x1b[{};{}H", row + 1, col + 1);
        let _ = io::stdout().flush();
        self.col = col;
        self.row = row;
    }

    fn cursor_column(&self) -> u32 {
        self.col
    }

    fn cursor_row(&self) -> u32 {
        self.row
    }

    fn set_text_mode(&mut self, mode: TextMode) {
        let code = match mode {
            TextMode::Normal => "\x1b[0m",
            TextMode::Inverse => "\x1b[7m",
            TextMode::Flash => "\x1b[5m",
        };
        print!("{code}");
        let _ = io::stdout().flush();
    }

    fn clear_screen(&mut self) {
        print!("\x1b[2J\x1b[H");
        let _ = io::stdout().flush();
        self.col = 0;
        self.row = 0;
    }
}

/// Scripted I/O. Output accumulates into a shared string handle so the
/// caller can keep a clone and read the transcript after the run.
pub struct BufferIo {
    input: VecDeque<String>,
    pending_chars: VecDeque<char>,
    output: Rc<RefCell<String>>,
    col: u32,
    row: u32,
    mode: TextMode,
}

impl BufferIo {
    pub fn new<I, S>(input: I) -> BufferIo
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BufferIo {
            input: input.into_iter().map(Into::into).collect(),
            pending_chars: VecDeque::new(),
            output: Rc::new(RefCell::new(String::new())),
            col: 0,
            row: 0,
            mode: TextMode::Normal,
        }
    }

    pub fn empty() -> BufferIo {
        BufferIo::new(Vec::<String>::new())
    }

    /// A handle onto the transcript; clones stay live after the run.
    pub fn output_handle(&self) -> Rc<RefCell<String>> {
        self.output.clone()
    }

    pub fn output(&self) -> String {
        self.output.borrow().clone()
    }

    pub fn text_mode(&self) -> TextMode {
        self.mode
    }
}

impl BasicIo for BufferIo {
    fn write(&mut self, text: &str) {
        self.output.borrow_mut().push_str(text);
        advance_cursor(&mut self.col, &mut self.row, text);
    }

    fn write_line(&mut self, text: &str) {
        self.write(text);
        self.write("\n");
    }

    fn read_line(&mut self, prompt: &str) -> String {
        self.write(prompt);
        let line = self.input.pop_front().unwrap_or_default();
        // echo, like a terminal would
        self.write(&line);
        self.write("\n");
        line
    }

    fn read_char(&mut self) -> char {
        if let Some(c) = self.pending_chars.pop_front() {
            return c;
        }
        match self.input.pop_front() {
            Some(line) => {
                self.pending_chars = line.chars().collect();
                self.pending_chars.pop_front().unwrap_or('\r')
            }
            None => '\r',
        }
    }

    fn set_cursor_position(&mut self, col: u32, row: u32) {
        // pad forward when moving right on the same row; a transcript has
        // no way to move backwards
        if row == self.row && col > self.col {
            let pad = " ".repeat((col - self.col) as usize);
            self.write(&pad);
        } else {
            self.col = col;
            self.row = row;
        }
    }

    fn cursor_column(&self) -> u32 {
        self.col
    }

    fn cursor_row(&self) -> u32 {
        self.row
    }

    fn set_text_mode(&mut self, mode: TextMode) {
        self.mode = mode;
    }

    fn clear_screen(&mut self) {
        self.col = 0;
        self.row = 0;
    }
}
