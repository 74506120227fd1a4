//! The program tree the parser builds and the interpreter walks.

use super::value::Value;

/// A parsed program: lines sorted by line number, plus every DATA constant
/// in program order (tagged with its defining line for `RESTORE n`).
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub lines: Vec<Line>,
    pub data_values: Vec<DataValue>,
}

#[derive(Debug, Clone)]
pub struct DataValue {
    pub line_number: u16,
    pub value: Value,
}

#[derive(Debug, Clone)]
pub struct Line {
    pub number: u16,
    pub statements: Vec<Statement>,
}

/// An assignment or READ/INPUT target: a scalar or an array element.
#[derive(Debug, Clone)]
pub enum Target {
    Scalar(String),
    Element { name: String, indices: Vec<Expr> },
}

impl Target {
    pub fn name(&self) -> &str {
        match self {
            Target::Scalar(name) => name,
            Target::Element { name, .. } => name,
        }
    }
}

/// One PRINT list entry.
#[derive(Debug, Clone)]
pub enum PrintItem {
    Value(Expr),
    /// `TAB(n)`: move right to column n
    Tab(Expr),
    /// `SPC(n)`: emit n spaces
    Spc(Expr),
    /// `,`: advance to the next 16-column zone
    Comma,
    /// `;`: no separation, and at the end, no newline
    Semicolon,
}

#[derive(Debug, Clone)]
pub enum Statement {
    Print(Vec<PrintItem>),
    Input {
        prompt: Option<String>,
        targets: Vec<Target>,
    },
    Get(Target),
    Let {
        target: Target,
        value: Expr,
    },
    Dim(Vec<(String, Vec<Expr>)>),
    For {
        var: String,
        from: Expr,
        to: Expr,
        step: Option<Expr>,
    },
    Next(Vec<String>),
    /// The guard of IF...THEN. The THEN tail is flattened into the same
    /// statement list right after this, so a false guard skips to the next
    /// line and a true one simply falls through.
    If(Expr),
    Goto(u16),
    Gosub(u16),
    Return,
    On {
        selector: Expr,
        targets: Vec<u16>,
        gosub: bool,
    },
    Read(Vec<Target>),
    /// DATA is inert at runtime; its constants were collected at parse time
    Data,
    Restore(Option<u16>),
    DefFn {
        name: String,
        param: String,
        body: Expr,
    },
    End,
    Stop,
    Clear,
    Home,
    Text,
    Gr,
    Hgr,
    Hgr2,
    Color(Expr),
    Hcolor(Expr),
    Plot {
        x: Expr,
        y: Expr,
    },
    Hplot {
        /// HPLOT TO x,y continues from the previous point
        from_last: bool,
        points: Vec<(Expr, Expr)>,
    },
    Draw {
        shape: Expr,
        at: Option<(Expr, Expr)>,
    },
    Xdraw {
        shape: Expr,
        at: Option<(Expr, Expr)>,
    },
    Htab(Expr),
    Vtab(Expr),
    Inverse,
    Flash,
    Normal,
    Poke {
        addr: Expr,
        value: Expr,
    },
    Call(Expr),
    Sleep(Expr),
    Rem(String),
    /// `&`: jump the CPU through the ampersand vector
    Ampersand,
    Lomem(Expr),
    Himem(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

/// The built-in function set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Abs, Sgn, Int, Rnd, Sin, Cos, Tan, Atn, Log, Exp, Sqr,
    Len, Asc, ChrS, StrS, Val, MidS, LeftS, RightS,
    Peek, Pos, Fre, Usr,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Number(f64),
    Str(String),
    Var(String),
    /// `A(I)` or `A$(I,J)`: array element
    Element { name: String, indices: Vec<Expr> },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        func: Builtin,
        args: Vec<Expr>,
    },
    /// `FN NAME(expr)`
    FnCall { name: String, arg: Box<Expr> },
}
