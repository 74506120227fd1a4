//! The Applesoft BASIC front end and runtime: lexer, parser, AST, the
//! runtime managers, and the tree-walking interpreter that drives the CPU
//! core for PEEK/POKE/CALL/USR/`&`.

pub mod ast;
pub mod error;
pub mod interpreter;
pub mod io;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod token;
pub mod value;

pub use error::{BasicError, BasicErrorKind};
pub use interpreter::{DisplayMode, Interpreter};
pub use io::{BasicIo, BufferIo, ConsoleIo, TextMode};
pub use value::Value;
