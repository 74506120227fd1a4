//! The tree-walking interpreter.
//!
//! Control flow is a pair of indices, `(line_index, statement_index)`, into
//! the sorted program. GOTO/GOSUB resolve BASIC line numbers through a map
//! built at load time; FOR frames capture the position right after the FOR
//! so NEXT can resume there. PEEK/POKE/CALL/USR/`&` reach through to the
//! CPU core and the shared memory bus.

use std::collections::{HashMap, VecDeque};

use super::ast::{
    BinaryOp, Builtin, Expr, PrintItem, Program, Statement, Target, UnaryOp,
};
use super::error::{BasicError, BasicErrorKind};
use super::io::{BasicIo, TextMode};
use super::parser;
use super::runtime::{
    canonical_name, var_type, ArrayManager, DataManager, ForFrame, ForStack, FunctionManager,
    GosubStack, VarType, VariableManager,
};
use super::value::{format_number, parse_leading_number, Value};
use crate::devices::bus::{apple_memory_map, Addr};
use crate::devices::cpu::Cpu;
use crate::devices::mem::Memory;
use crate::devices::speaker::SpeakerHandle;
use crate::float::mbf;

/// PRINT comma zones are 16 columns wide.
const PRINT_ZONE: u32 = 16;

/// Where a statement sends the interpreter next.
enum Flow {
    Next,
    NextLine,
    Jump { line: usize, statement: usize },
    End,
}

/// What TEXT/GR/HGR/HGR2 last selected. Hosts with a real screen read this
/// to decide which memory page to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Text,
    Lores,
    Hires,
}

pub struct Interpreter {
    program: Program,
    line_map: HashMap<u16, usize>,
    vars: VariableManager,
    arrays: ArrayManager,
    data: DataManager,
    for_stack: ForStack,
    gosub_stack: GosubStack,
    functions: FunctionManager,
    pub cpu: Cpu,
    pub mem: Memory,
    speaker: Option<SpeakerHandle>,
    display: DisplayMode,
    lores_color: u8,
    hires_color: u8,
    hires_page: Addr,
    last_hplot: (i64, i64),
    lomem: u16,
    himem: u16,
    rng_state: u64,
    rng_last: f64,
}

impl Interpreter {
    pub fn new() -> Interpreter {
        Interpreter {
            program: Program::default(),
            line_map: HashMap::new(),
            vars: VariableManager::new(),
            arrays: ArrayManager::new(),
            data: DataManager::new(),
            for_stack: ForStack::new(),
            gosub_stack: GosubStack::new(),
            functions: FunctionManager::new(),
            cpu: Cpu::new(),
            mem: Memory::new(),
            speaker: None,
            display: DisplayMode::Text,
            lores_color: 0,
            hires_color: 3,
            hires_page: apple_memory_map::HIRES_PAGE1.start(),
            last_hplot: (0, 0),
            lomem: apple_memory_map::RAM.start() as u16,
            himem: 0x9600,
            rng_state: 0x2545_F491_4F6C_DD1D,
            rng_last: 0.0,
        }
    }

    /// Attach the speaker: the bus clicks it, CALL BELL beeps it.
    pub fn set_speaker(&mut self, speaker: SpeakerHandle) {
        self.mem.set_speaker(speaker.clone());
        self.speaker = Some(speaker);
    }

    /// Parse a source listing and make it the current program.
    pub fn load(&mut self, source: &str) -> Result<(), BasicError> {
        self.program = parser::parse(source)?;
        self.line_map = self
            .program
            .lines
            .iter()
            .enumerate()
            .map(|(index, line)| (line.number, index))
            .collect();
        self.data.load(&self.program.data_values);
        Ok(())
    }

    /// RUN. Any runtime error is printed through the I/O collaborator and
    /// ends the run; it never propagates.
    pub fn run(&mut self, io: &mut dyn BasicIo) {
        self.reset_run_state();
        if let Err(err) = self.run_program(io) {
            io.write_line(&err.to_string());
        }
    }

    /// Convenience for hosts: load then run.
    pub fn run_source(&mut self, source: &str, io: &mut dyn BasicIo) {
        match self.load(source) {
            Ok(()) => self.run(io),
            Err(err) => io.write_line(&err.to_string()),
        }
    }

    fn reset_run_state(&mut self) {
        self.vars.clear();
        self.arrays.clear();
        self.for_stack.clear();
        self.gosub_stack.clear();
        self.functions.clear();
        self.data.restore();
        self.display = DisplayMode::Text;
        self.last_hplot = (0, 0);
    }

    fn run_program(&mut self, io: &mut dyn BasicIo) -> Result<(), BasicError> {
        let mut line = 0usize;
        let mut statement = 0usize;
        loop {
            if line >= self.program.lines.len() {
                return Ok(());
            }
            if statement >= self.program.lines[line].statements.len() {
                line += 1;
                statement = 0;
                continue;
            }
            let number = self.program.lines[line].number;
            let current = self.program.lines[line].statements[statement].clone();
            let flow = self.exec(&current, line, statement, io).map_err(|mut err| {
                if err.line.is_none() {
                    err.line = Some(number);
                }
                err
            })?;
            match flow {
                Flow::Next => statement += 1,
                Flow::NextLine => {
                    line += 1;
                    statement = 0;
                }
                Flow::Jump {
                    line: l,
                    statement: s,
                } => {
                    line = l;
                    statement = s;
                }
                Flow::End => return Ok(()),
            }
        }
    }

    //region Test and host accessors

    pub fn var(&self, name: &str) -> Value {
        self.vars.get(name)
    }

    pub fn gosub_depth(&self) -> usize {
        self.gosub_stack.depth()
    }

    pub fn for_depth(&self) -> usize {
        self.for_stack.depth()
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display
    }

    //endregion

    fn exec(
        &mut self,
        statement: &Statement,
        line_index: usize,
        statement_index: usize,
        io: &mut dyn BasicIo,
    ) -> Result<Flow, BasicError> {
        match statement {
            Statement::Print(items) => self.exec_print(items, io),
            Statement::Input { prompt, targets } => self.exec_input(prompt, targets, io),
            Statement::Get(target) => {
                let key = io.read_char();
                let value = match var_type(target.name()) {
                    VarType::Str => {
                        let text = if key == '\r' { String::new() } else { key.to_string() };
                        Value::Str(text)
                    }
                    _ => Value::Number(key.to_digit(10).map_or(0.0, f64::from)),
                };
                self.assign(target, value, io)?;
                Ok(Flow::Next)
            }
            Statement::Let { target, value } => {
                let value = self.eval(value, io)?;
                self.assign(target, value, io)?;
                Ok(Flow::Next)
            }
            Statement::Dim(arrays) => {
                for (name, dims) in arrays {
                    let bounds = self.indices(dims, io)?;
                    self.arrays.dim(name, bounds)?;
                }
                Ok(Flow::Next)
            }
            Statement::For {
                var,
                from,
                to,
                step,
            } => {
                let start = self.eval(from, io)?.as_number();
                let end = self.eval(to, io)?.as_number();
                let step = match step {
                    Some(expr) => self.eval(expr, io)?.as_number(),
                    None => 1.0,
                };
                self.vars.set(var, Value::Number(start))?;
                self.for_stack.push(ForFrame {
                    var: canonical_name(var),
                    end,
                    step,
                    line_index,
                    statement_index: statement_index + 1,
                });
                Ok(Flow::Next)
            }
            Statement::Next(vars) => {
                if vars.is_empty() {
                    return self.step_loop(None);
                }
                for var in vars {
                    if let Flow::Jump { line, statement } = self.step_loop(Some(var))? {
                        return Ok(Flow::Jump { line, statement });
                    }
                }
                Ok(Flow::Next)
            }
            Statement::If(condition) => {
                if self.eval(condition, io)?.is_truthy() {
                    Ok(Flow::Next)
                } else {
                    Ok(Flow::NextLine)
                }
            }
            Statement::Goto(number) => Ok(Flow::Jump {
                line: self.line_index_of(*number)?,
                statement: 0,
            }),
            Statement::Gosub(number) => {
                let target = self.line_index_of(*number)?;
                self.gosub_stack.push(line_index, statement_index + 1);
                Ok(Flow::Jump {
                    line: target,
                    statement: 0,
                })
            }
            Statement::Return => match self.gosub_stack.pop() {
                Some((line, statement)) => Ok(Flow::Jump { line, statement }),
                None => Err(BasicError::new(BasicErrorKind::ReturnWithoutGosub)),
            },
            Statement::On {
                selector,
                targets,
                gosub,
            } => {
                let n = self.eval(selector, io)?.as_integer();
                if n < 1 || n as usize > targets.len() {
                    return Ok(Flow::Next);
                }
                let target = self.line_index_of(targets[(n - 1) as usize])?;
                if *gosub {
                    self.gosub_stack.push(line_index, statement_index + 1);
                }
                Ok(Flow::Jump {
                    line: target,
                    statement: 0,
                })
            }
            Statement::Read(targets) => {
                for target in targets {
                    let datum = self.data.read()?;
                    let value = match var_type(target.name()) {
                        VarType::Str => Value::Str(datum.as_basic_string()),
                        _ => Value::Number(datum.as_number()),
                    };
                    self.assign(target, value, io)?;
                }
                Ok(Flow::Next)
            }
            Statement::Data => Ok(Flow::Next),
            Statement::Restore(line) => {
                match line {
                    Some(number) => self.data.restore_to_line(*number),
                    None => self.data.restore(),
                }
                Ok(Flow::Next)
            }
            Statement::DefFn { name, param, body } => {
                self.functions.define(name, param.clone(), body.clone());
                Ok(Flow::Next)
            }
            Statement::End => Ok(Flow::End),
            Statement::Stop => Err(BasicError::new(BasicErrorKind::Break)),
            Statement::Clear => {
                self.vars.clear();
                self.arrays.clear();
                self.for_stack.clear();
                self.gosub_stack.clear();
                self.functions.clear();
                self.data.restore();
                Ok(Flow::Next)
            }
            Statement::Home => {
                io.clear_screen();
                Ok(Flow::Next)
            }
            Statement::Text => {
                self.display = DisplayMode::Text;
                Ok(Flow::Next)
            }
            Statement::Gr => {
                self.display = DisplayMode::Lores;
                self.clear_screen_memory(apple_memory_map::TEXT_PAGE1.start(), 0x0400);
                Ok(Flow::Next)
            }
            Statement::Hgr => {
                self.display = DisplayMode::Hires;
                self.hires_page = apple_memory_map::HIRES_PAGE1.start();
                self.clear_screen_memory(self.hires_page, 0x2000);
                Ok(Flow::Next)
            }
            Statement::Hgr2 => {
                self.display = DisplayMode::Hires;
                self.hires_page = apple_memory_map::HIRES_PAGE2.start();
                self.clear_screen_memory(self.hires_page, 0x2000);
                Ok(Flow::Next)
            }
            Statement::Color(expr) => {
                let color = self.quantity(expr, 0, 255, io)?;
                self.lores_color = (color & 0x0F) as u8;
                Ok(Flow::Next)
            }
            Statement::Hcolor(expr) => {
                let color = self.quantity(expr, 0, 7, io)?;
                self.hires_color = color as u8;
                Ok(Flow::Next)
            }
            Statement::Plot { x, y } => {
                let x = self.quantity(x, 0, 39, io)?;
                let y = self.quantity(y, 0, 47, io)?;
                self.plot_lores(x as u32, y as u32);
                Ok(Flow::Next)
            }
            Statement::Hplot { from_last, points } => self.exec_hplot(*from_last, points, io),
            Statement::Draw { shape, at } | Statement::Xdraw { shape, at } => {
                // shape tables live in user memory and are not interpreted;
                // validate the arguments and move on
                self.quantity(shape, 0, 255, io)?;
                if let Some((x, y)) = at {
                    self.quantity(x, 0, 279, io)?;
                    self.quantity(y, 0, 191, io)?;
                }
                Ok(Flow::Next)
            }
            Statement::Htab(expr) => {
                let col = self.quantity(expr, 1, 255, io)?;
                io.set_cursor_position(col as u32 - 1, io.cursor_row());
                Ok(Flow::Next)
            }
            Statement::Vtab(expr) => {
                let row = self.quantity(expr, 1, 24, io)?;
                io.set_cursor_position(io.cursor_column(), row as u32 - 1);
                Ok(Flow::Next)
            }
            Statement::Inverse => {
                io.set_text_mode(TextMode::Inverse);
                Ok(Flow::Next)
            }
            Statement::Flash => {
                io.set_text_mode(TextMode::Flash);
                Ok(Flow::Next)
            }
            Statement::Normal => {
                io.set_text_mode(TextMode::Normal);
                Ok(Flow::Next)
            }
            Statement::Poke { addr, value } => {
                let addr = self.address(addr, io)?;
                let value = self.quantity(value, 0, 255, io)?;
                self.mem.write(addr, value as u8);
                Ok(Flow::Next)
            }
            Statement::Call(expr) => {
                let addr = self.address(expr, io)?;
                self.call_machine(addr);
                Ok(Flow::Next)
            }
            Statement::Sleep(expr) => {
                let millis = self.eval(expr, io)?.as_integer();
                if millis < 0 {
                    return Err(BasicError::new(BasicErrorKind::IllegalQuantity));
                }
                #[cfg(not(target_arch = "wasm32"))]
                std::thread::sleep(std::time::Duration::from_millis(millis as u64));
                Ok(Flow::Next)
            }
            Statement::Rem(_) => Ok(Flow::Next),
            Statement::Ampersand => {
                self.cpu.execute(
                    apple_memory_map::AMPERSAND_VECTOR as u16,
                    &mut self.mem,
                );
                Ok(Flow::Next)
            }
            Statement::Lomem(expr) => {
                self.lomem = self.address(expr, io)? as u16;
                Ok(Flow::Next)
            }
            Statement::Himem(expr) => {
                self.himem = self.address(expr, io)? as u16;
                Ok(Flow::Next)
            }
        }
    }

    /// NEXT: bump the loop variable, test, and either resume after the FOR
    /// or drop the frame and fall through.
    fn step_loop(&mut self, var: Option<&str>) -> Result<Flow, BasicError> {
        let frame = match var {
            None => self.for_stack.top().cloned(),
            Some(name) => self.for_stack.unwind_to(&canonical_name(name)).cloned(),
        }
        .ok_or_else(|| BasicError::new(BasicErrorKind::NextWithoutFor))?;

        let current = self.vars.get(&frame.var).as_number() + frame.step;
        self.vars.set(&frame.var, Value::Number(current))?;
        let done = if frame.step >= 0.0 {
            current > frame.end
        } else {
            current < frame.end
        };
        if done {
            self.for_stack.pop();
            Ok(Flow::Next)
        } else {
            Ok(Flow::Jump {
                line: frame.line_index,
                statement: frame.statement_index,
            })
        }
    }

    fn exec_print(
        &mut self,
        items: &[PrintItem],
        io: &mut dyn BasicIo,
    ) -> Result<Flow, BasicError> {
        let mut newline = true;
        for item in items {
            match item {
                PrintItem::Value(expr) => {
                    let value = self.eval(expr, io)?;
                    io.write(&value.print_format());
                    newline = true;
                }
                PrintItem::Semicolon => newline = false,
                PrintItem::Comma => {
                    let col = io.cursor_column();
                    let next_zone = (col / PRINT_ZONE + 1) * PRINT_ZONE;
                    io.write(&" ".repeat((next_zone - col) as usize));
                    newline = false;
                }
                PrintItem::Tab(expr) => {
                    let target = self.quantity(expr, 1, 255, io)? as u32 - 1;
                    let col = io.cursor_column();
                    if target > col {
                        io.write(&" ".repeat((target - col) as usize));
                    }
                    newline = false;
                }
                PrintItem::Spc(expr) => {
                    let count = self.quantity(expr, 0, 255, io)?;
                    io.write(&" ".repeat(count as usize));
                    newline = false;
                }
            }
        }
        if newline {
            io.write("\n");
        }
        Ok(Flow::Next)
    }

    fn exec_input(
        &mut self,
        prompt: &Option<String>,
        targets: &[Target],
        io: &mut dyn BasicIo,
    ) -> Result<Flow, BasicError> {
        'redo: loop {
            let first_prompt = prompt.clone().unwrap_or_else(|| "?".to_string());
            let mut fields: VecDeque<String> = split_input_fields(&io.read_line(&first_prompt));

            for target in targets {
                let field = loop {
                    match fields.pop_front() {
                        Some(field) => break field,
                        None => fields = split_input_fields(&io.read_line("??")),
                    }
                };
                let value = match var_type(target.name()) {
                    VarType::Str => Value::Str(field),
                    _ => {
                        let trimmed = field.trim();
                        let number = if trimmed.is_empty() {
                            0.0
                        } else {
                            match trimmed.parse::<f64>() {
                                Ok(n) => n,
                                Err(_) => {
                                    io.write_line("??REDO FROM START");
                                    continue 'redo;
                                }
                            }
                        };
                        Value::Number(number)
                    }
                };
                self.assign(target, value, io)?;
            }
            return Ok(Flow::Next);
        }
    }

    fn exec_hplot(
        &mut self,
        from_last: bool,
        points: &[(Expr, Expr)],
        io: &mut dyn BasicIo,
    ) -> Result<Flow, BasicError> {
        let mut resolved = Vec::with_capacity(points.len());
        for (x, y) in points {
            let x = self.quantity(x, 0, 279, io)?;
            let y = self.quantity(y, 0, 191, io)?;
            resolved.push((x, y));
        }

        let mut cursor = if from_last {
            self.last_hplot
        } else {
            let first = resolved.remove(0);
            self.plot_hires(first.0, first.1);
            first
        };
        for point in resolved {
            self.line_hires(cursor, point);
            cursor = point;
        }
        self.last_hplot = cursor;
        Ok(Flow::Next)
    }

    //region Screen memory

    fn clear_screen_memory(&mut self, base: Addr, len: usize) {
        // the loader path skips the soft switches, which is what we want
        // for a block fill
        let zeroes = vec![0u8; len];
        let _ = self.mem.load_data(base, &zeroes);
    }

    /// One LORES block: two pixels per text cell, low nibble on top.
    fn plot_lores(&mut self, x: u32, y: u32) {
        let row = y / 2;
        let base = apple_memory_map::TEXT_PAGE1.start()
            + (row % 8) * 0x80
            + (row / 8) * 0x28;
        let addr = base + x;
        let cell = self.mem.peek(addr);
        let cell = if y % 2 == 0 {
            (cell & 0xF0) | self.lores_color
        } else {
            (cell & 0x0F) | (self.lores_color << 4)
        };
        self.mem.write(addr, cell);
    }

    /// One HIRES pixel, honoring the interleaved row layout. Black colors
    /// clear the bit, everything else sets it; the palette bit follows the
    /// color group.
    fn plot_hires(&mut self, x: i64, y: i64) {
        let (x, y) = (x as Addr, y as Addr);
        let addr = self.hires_page
            + (y & 7) * 0x400
            + ((y >> 3) & 7) * 0x80
            + (y >> 6) * 0x28
            + x / 7;
        let bit = 1u8 << (x % 7);
        let mut byte = self.mem.peek(addr);
        if self.hires_color == 0 || self.hires_color == 4 {
            byte &= !bit;
        } else {
            byte |= bit;
        }
        if self.hires_color >= 4 {
            byte |= 0x80;
        } else {
            byte &= 0x7F;
        }
        self.mem.write(addr, byte);
    }

    /// Bresenham between two in-range points.
    fn line_hires(&mut self, from: (i64, i64), to: (i64, i64)) {
        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let sx = if x < to.0 { 1 } else { -1 };
        let sy = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.plot_hires(x, y);
            if (x, y) == to {
                break;
            }
            let doubled = 2 * err;
            if doubled >= dy {
                err += dy;
                x += sx;
            }
            if doubled <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    //endregion

    //region CPU bridges

    /// CALL. The ROM BELL entry short-circuits to the speaker; everything
    /// else really runs on the CPU until it halts.
    fn call_machine(&mut self, addr: Addr) {
        if addr == apple_memory_map::BELL {
            if let Some(speaker) = &self.speaker {
                speaker.borrow_mut().beep();
            }
            return;
        }
        self.cpu.execute(addr as u16, &mut self.mem);
    }

    /// USR(x): stage the argument in the FAC, run the USR vector, read the
    /// FAC back as the result.
    fn usr(&mut self, value: f64) -> Value {
        mbf::write_to_memory(
            &mut self.mem,
            apple_memory_map::FAC,
            apple_memory_map::FAC_SIGN,
            value,
        );
        self.cpu
            .execute(apple_memory_map::USR_VECTOR as u16, &mut self.mem);
        Value::Number(mbf::read_from_memory(
            &self.mem,
            apple_memory_map::FAC,
            apple_memory_map::FAC_SIGN,
        ))
    }

    //endregion

    fn line_index_of(&self, number: u16) -> Result<usize, BasicError> {
        self.line_map
            .get(&number)
            .copied()
            .ok_or_else(|| BasicError::new(BasicErrorKind::UndefdStatement))
    }

    fn assign(
        &mut self,
        target: &Target,
        value: Value,
        io: &mut dyn BasicIo,
    ) -> Result<(), BasicError> {
        match target {
            Target::Scalar(name) => self.vars.set(name, value),
            Target::Element { name, indices } => {
                let indices = self.indices(indices, io)?;
                self.arrays.set(name, &indices, value)
            }
        }
    }

    fn indices(
        &mut self,
        exprs: &[Expr],
        io: &mut dyn BasicIo,
    ) -> Result<Vec<usize>, BasicError> {
        exprs
            .iter()
            .map(|expr| {
                let index = self.eval(expr, io)?.as_integer();
                if index < 0 {
                    Err(BasicError::new(BasicErrorKind::IllegalQuantity))
                } else {
                    Ok(index as usize)
                }
            })
            .collect()
    }

    /// Evaluate an integer quantity within an inclusive range.
    fn quantity(
        &mut self,
        expr: &Expr,
        min: i64,
        max: i64,
        io: &mut dyn BasicIo,
    ) -> Result<i64, BasicError> {
        let value = self.eval(expr, io)?.as_integer();
        if !(min..=max).contains(&value) {
            return Err(BasicError::new(BasicErrorKind::IllegalQuantity));
        }
        Ok(value)
    }

    /// A bus address. Negative values wrap the Applesoft way, so
    /// PEEK(-16336) hits the speaker at $C030.
    fn address(&mut self, expr: &Expr, io: &mut dyn BasicIo) -> Result<Addr, BasicError> {
        let value = self.eval(expr, io)?.as_integer();
        let value = if (-65535..0).contains(&value) {
            value + 65536
        } else {
            value
        };
        if !(0..=65535).contains(&value) {
            return Err(BasicError::new(BasicErrorKind::IllegalQuantity));
        }
        Ok(value as Addr)
    }

    //region Expression evaluation

    fn eval(&mut self, expr: &Expr, io: &mut dyn BasicIo) -> Result<Value, BasicError> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Var(name) => Ok(self.vars.get(name)),
            Expr::Element { name, indices } => {
                let indices = self.indices(indices, io)?;
                self.arrays.get(name, &indices)
            }
            Expr::Unary { op, operand } => {
                let value = self.eval(operand, io)?;
                Ok(match op {
                    UnaryOp::Negate => Value::Number(-value.as_number()),
                    UnaryOp::Not => Value::Number(if value.is_truthy() { 0.0 } else { 1.0 }),
                })
            }
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.eval(lhs, io)?;
                let rhs = self.eval(rhs, io)?;
                self.apply_binary(*op, lhs, rhs)
            }
            Expr::Call { func, args } => self.call_builtin(*func, args, io),
            Expr::FnCall { name, arg } => {
                let function = self
                    .functions
                    .lookup(name)
                    .cloned()
                    .ok_or_else(|| BasicError::new(BasicErrorKind::UndefdFunction))?;
                let argument = self.eval(arg, io)?.as_number();
                // bind the parameter, evaluate, restore: FN scoping is one
                // shadowed scalar
                let saved = self.vars.get(&function.param);
                self.vars.set(&function.param, Value::Number(argument))?;
                let result = self.eval(&function.body, io);
                self.vars.set(&function.param, saved)?;
                result
            }
        }
    }

    fn apply_binary(
        &mut self,
        op: BinaryOp,
        lhs: Value,
        rhs: Value,
    ) -> Result<Value, BasicError> {
        use std::cmp::Ordering;

        let value = match op {
            BinaryOp::Add => {
                if lhs.is_string() || rhs.is_string() {
                    Value::Str(format!("{}{}", lhs.as_basic_string(), rhs.as_basic_string()))
                } else {
                    Value::Number(lhs.as_number() + rhs.as_number())
                }
            }
            BinaryOp::Subtract => Value::Number(lhs.as_number() - rhs.as_number()),
            BinaryOp::Multiply => Value::Number(lhs.as_number() * rhs.as_number()),
            BinaryOp::Divide => {
                let divisor = rhs.as_number();
                if divisor == 0.0 {
                    return Err(BasicError::new(BasicErrorKind::DivisionByZero));
                }
                Value::Number(lhs.as_number() / divisor)
            }
            BinaryOp::Power => {
                let base = lhs.as_number();
                let exponent = rhs.as_number();
                if base < 0.0 && exponent.fract() != 0.0 {
                    return Err(BasicError::new(BasicErrorKind::IllegalQuantity));
                }
                let result = base.powf(exponent);
                if !result.is_finite() {
                    return Err(BasicError::new(BasicErrorKind::Overflow));
                }
                Value::Number(result)
            }
            BinaryOp::And => {
                Value::Number(if lhs.is_truthy() && rhs.is_truthy() { 1.0 } else { 0.0 })
            }
            BinaryOp::Or => {
                Value::Number(if lhs.is_truthy() || rhs.is_truthy() { 1.0 } else { 0.0 })
            }
            BinaryOp::Equal
            | BinaryOp::NotEqual
            | BinaryOp::Less
            | BinaryOp::LessEqual
            | BinaryOp::Greater
            | BinaryOp::GreaterEqual => {
                let ordering = lhs.compare(&rhs);
                let result = match op {
                    BinaryOp::Equal => ordering == Ordering::Equal,
                    BinaryOp::NotEqual => ordering != Ordering::Equal,
                    BinaryOp::Less => ordering == Ordering::Less,
                    BinaryOp::LessEqual => ordering != Ordering::Greater,
                    BinaryOp::Greater => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                };
                Value::Number(if result { 1.0 } else { 0.0 })
            }
        };
        Ok(value)
    }

    fn call_builtin(
        &mut self,
        func: Builtin,
        args: &[Expr],
        io: &mut dyn BasicIo,
    ) -> Result<Value, BasicError> {
        let arity_ok = match func {
            Builtin::MidS => args.len() == 2 || args.len() == 3,
            Builtin::LeftS | Builtin::RightS => args.len() == 2,
            _ => args.len() == 1,
        };
        if !arity_ok {
            return Err(BasicError::new(BasicErrorKind::Syntax));
        }

        let value = match func {
            Builtin::Abs => Value::Number(self.number_arg(&args[0], io)?.abs()),
            Builtin::Sgn => {
                let n = self.number_arg(&args[0], io)?;
                Value::Number(if n > 0.0 {
                    1.0
                } else if n < 0.0 {
                    -1.0
                } else {
                    0.0
                })
            }
            Builtin::Int => Value::Number(self.number_arg(&args[0], io)?.floor()),
            Builtin::Rnd => {
                let n = self.number_arg(&args[0], io)?;
                Value::Number(self.rnd(n))
            }
            Builtin::Sin => Value::Number(self.number_arg(&args[0], io)?.sin()),
            Builtin::Cos => Value::Number(self.number_arg(&args[0], io)?.cos()),
            Builtin::Tan => Value::Number(self.number_arg(&args[0], io)?.tan()),
            Builtin::Atn => Value::Number(self.number_arg(&args[0], io)?.atan()),
            Builtin::Log => {
                let n = self.number_arg(&args[0], io)?;
                if n <= 0.0 {
                    return Err(BasicError::new(BasicErrorKind::IllegalQuantity));
                }
                Value::Number(n.ln())
            }
            Builtin::Exp => {
                let result = self.number_arg(&args[0], io)?.exp();
                if !result.is_finite() {
                    return Err(BasicError::new(BasicErrorKind::Overflow));
                }
                Value::Number(result)
            }
            Builtin::Sqr => {
                let n = self.number_arg(&args[0], io)?;
                if n < 0.0 {
                    return Err(BasicError::new(BasicErrorKind::IllegalQuantity));
                }
                Value::Number(n.sqrt())
            }
            Builtin::Len => {
                let s = self.string_arg(&args[0], io)?;
                Value::Number(s.len() as f64)
            }
            Builtin::Asc => {
                let s = self.string_arg(&args[0], io)?;
                match s.bytes().next() {
                    Some(byte) => Value::Number(f64::from(byte)),
                    None => return Err(BasicError::new(BasicErrorKind::IllegalQuantity)),
                }
            }
            Builtin::ChrS => {
                let code = self.quantity(&args[0], 0, 255, io)?;
                Value::Str((code as u8 as char).to_string())
            }
            Builtin::StrS => {
                let n = self.number_arg(&args[0], io)?;
                Value::Str(format_number(n))
            }
            Builtin::Val => {
                let s = self.string_arg(&args[0], io)?;
                Value::Number(parse_leading_number(&s))
            }
            Builtin::LeftS => {
                let s = self.string_arg(&args[0], io)?;
                let n = self.quantity(&args[1], 0, 255, io)? as usize;
                Value::Str(s.chars().take(n).collect())
            }
            Builtin::RightS => {
                let s = self.string_arg(&args[0], io)?;
                let n = self.quantity(&args[1], 0, 255, io)? as usize;
                let skip = s.chars().count().saturating_sub(n);
                Value::Str(s.chars().skip(skip).collect())
            }
            Builtin::MidS => {
                let s = self.string_arg(&args[0], io)?;
                let start = self.quantity(&args[1], 1, 255, io)? as usize;
                let len = match args.get(2) {
                    Some(expr) => self.quantity(expr, 0, 255, io)? as usize,
                    None => usize::MAX,
                };
                Value::Str(s.chars().skip(start - 1).take(len).collect())
            }
            Builtin::Peek => {
                let addr = self.address(&args[0], io)?;
                Value::Number(f64::from(self.mem.read(addr)))
            }
            Builtin::Pos => {
                self.eval(&args[0], io)?;
                Value::Number(f64::from(io.cursor_column()))
            }
            Builtin::Fre => {
                self.eval(&args[0], io)?;
                Value::Number(f64::from(self.himem.saturating_sub(self.lomem)))
            }
            Builtin::Usr => {
                let argument = self.number_arg(&args[0], io)?;
                self.usr(argument)
            }
        };
        Ok(value)
    }

    fn number_arg(&mut self, expr: &Expr, io: &mut dyn BasicIo) -> Result<f64, BasicError> {
        Ok(self.eval(expr, io)?.as_number())
    }

    fn string_arg(&mut self, expr: &Expr, io: &mut dyn BasicIo) -> Result<String, BasicError> {
        match self.eval(expr, io)? {
            Value::Str(s) => Ok(s),
            Value::Number(_) => Err(BasicError::new(BasicErrorKind::TypeMismatch)),
        }
    }

    /// Applesoft RND convention: positive draws the next value, zero
    /// repeats the last one, negative reseeds deterministically.
    fn rnd(&mut self, x: f64) -> f64 {
        if x < 0.0 {
            self.rng_state = x.to_bits() | 1;
            return self.next_random();
        }
        if x == 0.0 {
            return self.rng_last;
        }
        self.next_random()
    }

    fn next_random(&mut self) -> f64 {
        // 64-bit LCG, top 53 bits as the fraction
        self.rng_state = self
            .rng_state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let value = (self.rng_state >> 11) as f64 / (1u64 << 53) as f64;
        self.rng_last = value;
        value
    }

    //endregion
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

/// INPUT fields: comma-separated, with quoted fields kept whole.
fn split_input_fields(line: &str) -> VecDeque<String> {
    let mut fields = VecDeque::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push_back(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(c),
        }
    }
    fields.push_back(current.trim().to_string());
    fields
}

#[cfg(test)]
mod tests {
    use super::super::io::BufferIo;
    use super::*;

    fn run(source: &str) -> String {
        let mut interp = Interpreter::new();
        let mut io = BufferIo::empty();
        interp.run_source(source, &mut io);
        io.output()
    }

    #[test]
    fn arithmetic_precedence_in_print() {
        assert_eq!(run("10 PRINT 2+3*4"), " 14\n");
    }

    #[test]
    fn division_by_zero_reports_the_line() {
        assert_eq!(run("10 PRINT 1/0"), "?DIVISION BY ZERO ERROR IN 10\n");
    }

    #[test]
    fn goto_unknown_line_is_undefd() {
        assert_eq!(run("10 GOTO 99"), "?UNDEF'D STATEMENT ERROR IN 10\n");
    }

    #[test]
    fn string_concatenation_mixes_numbers() {
        assert_eq!(run("10 PRINT \"N=\" + 5"), "N=5\n");
    }

    #[test]
    fn if_false_skips_the_rest_of_the_line() {
        let out = run("10 IF 0 THEN PRINT \"NO\": PRINT \"NEVER\"\n20 PRINT \"YES\"");
        assert_eq!(out, "YES\n");
    }

    #[test]
    fn peek_poke_round_trip() {
        let out = run("10 POKE 768, 200\n20 PRINT PEEK(768)");
        assert_eq!(out, " 200\n");
    }

    #[test]
    fn negative_addresses_wrap() {
        let out = run("10 POKE -256, 7\n20 PRINT PEEK(65280)");
        assert_eq!(out, " 7\n");
    }

    #[test]
    fn rnd_zero_repeats_and_negative_reseeds() {
        let out = run(
            "10 A = RND(-3): B = RND(0)\n20 IF A = B THEN PRINT \"SAME\"\n30 C = RND(-3)\n40 IF A = C THEN PRINT \"SEEDED\"",
        );
        assert_eq!(out, "SAME\nSEEDED\n");
    }

    #[test]
    fn input_redo_on_bad_number() {
        let mut interp = Interpreter::new();
        let mut io = BufferIo::new(["ABC", "12"]);
        interp.run_source("10 INPUT A\n20 PRINT A", &mut io);
        let out = io.output();
        assert!(out.contains("??REDO FROM START"));
        assert!(out.ends_with(" 12\n"));
    }
}
