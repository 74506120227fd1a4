//! Runtime and parse errors, spelled the way Applesoft spelled them.

use std::{error, fmt};

use crate::float::FloatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicErrorKind {
    Syntax,
    TypeMismatch,
    DivisionByZero,
    OutOfData,
    NextWithoutFor,
    ReturnWithoutGosub,
    UndefdStatement,
    UndefdFunction,
    OutOfMemory,
    IllegalQuantity,
    RedimdArray,
    Overflow,
    /// STOP, or a cooperative stop request
    Break,
}

impl BasicErrorKind {
    fn message(&self) -> &'static str {
        match self {
            Self::Syntax => "SYNTAX",
            Self::TypeMismatch => "TYPE MISMATCH",
            Self::DivisionByZero => "DIVISION BY ZERO",
            Self::OutOfData => "OUT OF DATA",
            Self::NextWithoutFor => "NEXT WITHOUT FOR",
            Self::ReturnWithoutGosub => "RETURN WITHOUT GOSUB",
            Self::UndefdStatement => "UNDEF'D STATEMENT",
            Self::UndefdFunction => "UNDEF'D FUNCTION",
            Self::OutOfMemory => "OUT OF MEMORY",
            Self::IllegalQuantity => "ILLEGAL QUANTITY",
            Self::RedimdArray => "REDIM'D ARRAY",
            Self::Overflow => "OVERFLOW",
            Self::Break => "BREAK",
        }
    }
}

/// A BASIC runtime failure. Caught at the top of `run` and printed through
/// the I/O collaborator; it never propagates out of the interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicError {
    pub kind: BasicErrorKind,
    /// The BASIC line the failure happened on, once known
    pub line: Option<u16>,
}

impl BasicError {
    pub fn new(kind: BasicErrorKind) -> BasicError {
        BasicError { kind, line: None }
    }

    pub fn with_line(kind: BasicErrorKind, line: u16) -> BasicError {
        BasicError {
            kind,
            line: Some(line),
        }
    }
}

impl fmt::Display for BasicError {
    /// `?SYNTAX ERROR IN 10`, or `BREAK IN 10` for a break.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == BasicErrorKind::Break {
            write!(f, "BREAK")?;
        } else {
            write!(f, "?{} ERROR", self.kind.message())?;
        }
        if let Some(line) = self.line {
            write!(f, " IN {line}")?;
        }
        Ok(())
    }
}

impl error::Error for BasicError {}

impl From<FloatError> for BasicError {
    fn from(err: FloatError) -> Self {
        match err {
            FloatError::Overflow => BasicError::new(BasicErrorKind::Overflow),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_applesoft_messages() {
        assert_eq!(
            format!("{}", BasicError::with_line(BasicErrorKind::Syntax, 10)),
            "?SYNTAX ERROR IN 10"
        );
        assert_eq!(
            format!("{}", BasicError::new(BasicErrorKind::TypeMismatch)),
            "?TYPE MISMATCH ERROR"
        );
        assert_eq!(
            format!("{}", BasicError::with_line(BasicErrorKind::Break, 30)),
            "BREAK IN 30"
        );
    }
}
