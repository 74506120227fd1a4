//! Tokens and the closed keyword set.

/// Every reserved word the lexer collapses. Like the original tokenizer,
/// keywords are recognized greedily anywhere in the text, which is why an
/// Applesoft variable could never be called `SCORE` (it crunches to
/// `SC OR E`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    // statements
    Print, Input, Get, Let, Dim, For, To, Step, Next, If, Then, Goto, Gosub,
    Return, On, Read, Data, Restore, Def, Fn, End, Stop, Clear, Home, Text,
    Gr, Hgr, Hgr2, Color, Hcolor, Plot, Hplot, Draw, Xdraw, At, Htab, Vtab,
    Inverse, Flash, Normal, Poke, Call, Sleep, Rem, Lomem, Himem,
    // operators
    And, Or, Not,
    // print-positioning functions
    Tab, Spc,
    // built-in functions
    Abs, Sgn, Int, Rnd, Sin, Cos, Tan, Atn, Log, Exp, Sqr, Len, Asc, ChrS,
    StrS, Val, MidS, LeftS, RightS, Peek, Pos, Fre, Usr,
}

/// Keyword lexemes, longest first so that the greedy scan takes the
/// longest match (ATN before AT, HGR2 before HGR, INVERSE before INT).
pub const KEYWORDS: &[(&str, Keyword)] = &[
    ("INVERSE", Keyword::Inverse),
    ("RESTORE", Keyword::Restore),
    ("HCOLOR", Keyword::Hcolor),
    ("NORMAL", Keyword::Normal),
    ("RETURN", Keyword::Return),
    ("RIGHT$", Keyword::RightS),
    ("CLEAR", Keyword::Clear),
    ("COLOR", Keyword::Color),
    ("FLASH", Keyword::Flash),
    ("GOSUB", Keyword::Gosub),
    ("HIMEM", Keyword::Himem),
    ("HPLOT", Keyword::Hplot),
    ("INPUT", Keyword::Input),
    ("LEFT$", Keyword::LeftS),
    ("LOMEM", Keyword::Lomem),
    ("PRINT", Keyword::Print),
    ("SLEEP", Keyword::Sleep),
    ("XDRAW", Keyword::Xdraw),
    ("CALL", Keyword::Call),
    ("CHR$", Keyword::ChrS),
    ("DATA", Keyword::Data),
    ("DRAW", Keyword::Draw),
    ("GOTO", Keyword::Goto),
    ("HGR2", Keyword::Hgr2),
    ("HOME", Keyword::Home),
    ("HTAB", Keyword::Htab),
    ("MID$", Keyword::MidS),
    ("NEXT", Keyword::Next),
    ("PEEK", Keyword::Peek),
    ("PLOT", Keyword::Plot),
    ("POKE", Keyword::Poke),
    ("READ", Keyword::Read),
    ("STEP", Keyword::Step),
    ("STOP", Keyword::Stop),
    ("STR$", Keyword::StrS),
    ("TEXT", Keyword::Text),
    ("THEN", Keyword::Then),
    ("VTAB", Keyword::Vtab),
    ("ABS", Keyword::Abs),
    ("AND", Keyword::And),
    ("ASC", Keyword::Asc),
    ("ATN", Keyword::Atn),
    ("COS", Keyword::Cos),
    ("DEF", Keyword::Def),
    ("DIM", Keyword::Dim),
    ("END", Keyword::End),
    ("EXP", Keyword::Exp),
    ("FOR", Keyword::For),
    ("FRE", Keyword::Fre),
    ("GET", Keyword::Get),
    ("HGR", Keyword::Hgr),
    ("INT", Keyword::Int),
    ("LEN", Keyword::Len),
    ("LET", Keyword::Let),
    ("LOG", Keyword::Log),
    ("NOT", Keyword::Not),
    ("POS", Keyword::Pos),
    ("REM", Keyword::Rem),
    ("RND", Keyword::Rnd),
    ("SGN", Keyword::Sgn),
    ("SIN", Keyword::Sin),
    ("SPC", Keyword::Spc),
    ("SQR", Keyword::Sqr),
    ("TAB", Keyword::Tab),
    ("TAN", Keyword::Tan),
    ("USR", Keyword::Usr),
    ("VAL", Keyword::Val),
    ("AT", Keyword::At),
    ("FN", Keyword::Fn),
    ("GR", Keyword::Gr),
    ("IF", Keyword::If),
    ("ON", Keyword::On),
    ("OR", Keyword::Or),
    ("TO", Keyword::To),
];

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A numeric literal, scientific notation included
    Number(f64),
    /// A double-quoted string literal
    Str(String),
    /// Unquoted text: REM commentary and bare DATA items
    Raw(String),
    /// An identifier, upper-cased, `$`/`%` suffix attached
    Ident(String),
    Keyword(Keyword),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Equal,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    NotEqual,
    LParen,
    RParen,
    Comma,
    Colon,
    Semicolon,
    Ampersand,
}
