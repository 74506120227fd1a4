//! The line-by-line parser.
//!
//! Two passes, like the original: tokenize, then consume statements line by
//! line. Lines are kept sorted by line number and duplicates replace their
//! predecessor. DATA constants are collected during the parse, in line
//! order, so READ never has to walk the tree.
//!
//! IF...THEN flattens into the enclosing statement list: the `If` guard is
//! followed by its tail statements, so the interpreter's
//! `(line_index, statement_index)` addressing stays uniform (a FOR inside a
//! THEN tail resumes exactly like any other FOR).

use std::collections::BTreeMap;

use super::ast::{
    BinaryOp, Builtin, DataValue, Expr, Line, PrintItem, Program, Statement, Target, UnaryOp,
};
use super::error::{BasicError, BasicErrorKind};
use super::lexer;
use super::token::{Keyword, Token};
use super::value::Value;

/// Parse a whole source listing into a program.
pub fn parse(source: &str) -> Result<Program, BasicError> {
    let mut lines: BTreeMap<u16, (Vec<Statement>, Vec<Value>)> = BTreeMap::new();

    for raw in source.lines() {
        if raw.trim().is_empty() {
            continue;
        }
        let number = leading_line_number(raw);
        let parsed = parse_line(raw).map_err(|mut err| {
            if err.line.is_none() {
                err.line = number;
            }
            err
        })?;
        lines.insert(parsed.0, (parsed.1, parsed.2));
    }

    let mut program = Program::default();
    for (number, (statements, data)) in lines {
        for value in data {
            program.data_values.push(DataValue {
                line_number: number,
                value,
            });
        }
        program.lines.push(Line { number, statements });
    }
    Ok(program)
}

/// Best-effort line number for error reporting, before the line parses.
fn leading_line_number(raw: &str) -> Option<u16> {
    let digits: String = raw
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn parse_line(raw: &str) -> Result<(u16, Vec<Statement>, Vec<Value>), BasicError> {
    let tokens = lexer::tokenize(raw)?;
    let mut cursor = Cursor::new(&tokens);

    let number = match cursor.next() {
        Some(Token::Number(n)) if n.fract() == 0.0 && (1.0..=63999.0).contains(n) => *n as u16,
        _ => return Err(BasicError::new(BasicErrorKind::Syntax)),
    };

    let mut statements = Vec::new();
    let mut data = Vec::new();
    loop {
        while cursor.eat(&Token::Colon) {}
        if cursor.at_end() {
            break;
        }
        cursor.statement(&mut statements, &mut data)?;
        if !cursor.at_end() && !cursor.eat(&Token::Colon) {
            return Err(BasicError::new(BasicErrorKind::Syntax));
        }
    }
    Ok((number, statements, data))
}

struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token]) -> Cursor<'a> {
        Cursor { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<(), BasicError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(syntax())
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), BasicError> {
        self.expect(&Token::Keyword(keyword))
    }

    fn ident(&mut self) -> Result<String, BasicError> {
        match self.next() {
            Some(Token::Ident(name)) => Ok(name.clone()),
            _ => Err(syntax()),
        }
    }

    fn line_number(&mut self) -> Result<u16, BasicError> {
        match self.next() {
            Some(Token::Number(n)) if n.fract() == 0.0 && (0.0..=63999.0).contains(n) => {
                Ok(*n as u16)
            }
            _ => Err(syntax()),
        }
    }

    /// One statement (plus, for IF, its flattened tail).
    fn statement(
        &mut self,
        out: &mut Vec<Statement>,
        data: &mut Vec<Value>,
    ) -> Result<(), BasicError> {
        let token = self.next().ok_or_else(syntax)?;
        match token {
            Token::Keyword(Keyword::Print) => {
                let items = self.print_items()?;
                out.push(Statement::Print(items));
            }
            Token::Keyword(Keyword::Input) => {
                let prompt = match self.peek() {
                    Some(Token::Str(text)) => {
                        let text = text.clone();
                        self.pos += 1;
                        self.expect(&Token::Semicolon)?;
                        Some(text)
                    }
                    _ => None,
                };
                let targets = self.target_list()?;
                out.push(Statement::Input { prompt, targets });
            }
            Token::Keyword(Keyword::Get) => {
                let target = self.target()?;
                out.push(Statement::Get(target));
            }
            Token::Keyword(Keyword::Let) => {
                let statement = self.assignment()?;
                out.push(statement);
            }
            Token::Ident(name) => {
                let name = name.clone();
                let statement = self.assignment_to(name)?;
                out.push(statement);
            }
            Token::Keyword(Keyword::Dim) => {
                let mut arrays = Vec::new();
                loop {
                    let name = self.ident()?;
                    self.expect(&Token::LParen)?;
                    let dims = self.expr_list()?;
                    self.expect(&Token::RParen)?;
                    arrays.push((name, dims));
                    if !self.eat(&Token::Comma) {
                        break;
                    }
                }
                out.push(Statement::Dim(arrays));
            }
            Token::Keyword(Keyword::For) => {
                let var = self.ident()?;
                if var.ends_with('$') || var.ends_with('%') {
                    return Err(syntax());
                }
                self.expect(&Token::Equal)?;
                let from = self.expr()?;
                self.expect_keyword(Keyword::To)?;
                let to = self.expr()?;
                let step = if self.eat(&Token::Keyword(Keyword::Step)) {
                    Some(self.expr()?)
                } else {
                    None
                };
                out.push(Statement::For {
                    var,
                    from,
                    to,
                    step,
                });
            }
            Token::Keyword(Keyword::Next) => {
                let mut vars = Vec::new();
                if matches!(self.peek(), Some(Token::Ident(_))) {
                    loop {
                        vars.push(self.ident()?);
                        if !self.eat(&Token::Comma) {
                            break;
                        }
                    }
                }
                out.push(Statement::Next(vars));
            }
            Token::Keyword(Keyword::If) => {
                let condition = self.expr()?;
                out.push(Statement::If(condition));
                if self.eat(&Token::Keyword(Keyword::Goto)) {
                    out.push(Statement::Goto(self.line_number()?));
                    return Ok(());
                }
                self.expect_keyword(Keyword::Then)?;
                if matches!(self.peek(), Some(Token::Number(_))) {
                    out.push(Statement::Goto(self.line_number()?));
                    return Ok(());
                }
                // the whole tail of the line belongs to the THEN arm
                loop {
                    self.statement(out, data)?;
                    if !self.eat(&Token::Colon) {
                        break;
                    }
                    while self.eat(&Token::Colon) {}
                    if self.at_end() {
                        break;
                    }
                }
            }
            Token::Keyword(Keyword::Goto) => {
                out.push(Statement::Goto(self.line_number()?));
            }
            Token::Keyword(Keyword::Gosub) => {
                out.push(Statement::Gosub(self.line_number()?));
            }
            Token::Keyword(Keyword::Return) => out.push(Statement::Return),
            Token::Keyword(Keyword::On) => {
                let selector = self.expr()?;
                let gosub = if self.eat(&Token::Keyword(Keyword::Gosub)) {
                    true
                } else {
                    self.expect_keyword(Keyword::Goto)?;
                    false
                };
                let mut targets = vec![self.line_number()?];
                while self.eat(&Token::Comma) {
                    targets.push(self.line_number()?);
                }
                out.push(Statement::On {
                    selector,
                    targets,
                    gosub,
                });
            }
            Token::Keyword(Keyword::Read) => {
                let targets = self.target_list()?;
                out.push(Statement::Read(targets));
            }
            Token::Keyword(Keyword::Data) => {
                self.data_constants(data)?;
                out.push(Statement::Data);
            }
            Token::Keyword(Keyword::Restore) => {
                let line = if matches!(self.peek(), Some(Token::Number(_))) {
                    Some(self.line_number()?)
                } else {
                    None
                };
                out.push(Statement::Restore(line));
            }
            Token::Keyword(Keyword::Def) => {
                self.expect_keyword(Keyword::Fn)?;
                let name = self.ident()?;
                self.expect(&Token::LParen)?;
                let param = self.ident()?;
                self.expect(&Token::RParen)?;
                self.expect(&Token::Equal)?;
                let body = self.expr()?;
                out.push(Statement::DefFn { name, param, body });
            }
            Token::Keyword(Keyword::End) => out.push(Statement::End),
            Token::Keyword(Keyword::Stop) => out.push(Statement::Stop),
            Token::Keyword(Keyword::Clear) => out.push(Statement::Clear),
            Token::Keyword(Keyword::Home) => out.push(Statement::Home),
            Token::Keyword(Keyword::Text) => out.push(Statement::Text),
            Token::Keyword(Keyword::Gr) => out.push(Statement::Gr),
            Token::Keyword(Keyword::Hgr) => out.push(Statement::Hgr),
            Token::Keyword(Keyword::Hgr2) => out.push(Statement::Hgr2),
            Token::Keyword(Keyword::Color) => {
                self.expect(&Token::Equal)?;
                out.push(Statement::Color(self.expr()?));
            }
            Token::Keyword(Keyword::Hcolor) => {
                self.expect(&Token::Equal)?;
                out.push(Statement::Hcolor(self.expr()?));
            }
            Token::Keyword(Keyword::Plot) => {
                let x = self.expr()?;
                self.expect(&Token::Comma)?;
                let y = self.expr()?;
                out.push(Statement::Plot { x, y });
            }
            Token::Keyword(Keyword::Hplot) => {
                let from_last = self.eat(&Token::Keyword(Keyword::To));
                let mut points = vec![self.point()?];
                while self.eat(&Token::Keyword(Keyword::To)) {
                    points.push(self.point()?);
                }
                out.push(Statement::Hplot { from_last, points });
            }
            Token::Keyword(Keyword::Draw) => {
                let (shape, at) = self.shape_args()?;
                out.push(Statement::Draw { shape, at });
            }
            Token::Keyword(Keyword::Xdraw) => {
                let (shape, at) = self.shape_args()?;
                out.push(Statement::Xdraw { shape, at });
            }
            Token::Keyword(Keyword::Htab) => out.push(Statement::Htab(self.expr()?)),
            Token::Keyword(Keyword::Vtab) => out.push(Statement::Vtab(self.expr()?)),
            Token::Keyword(Keyword::Inverse) => out.push(Statement::Inverse),
            Token::Keyword(Keyword::Flash) => out.push(Statement::Flash),
            Token::Keyword(Keyword::Normal) => out.push(Statement::Normal),
            Token::Keyword(Keyword::Poke) => {
                let addr = self.expr()?;
                self.expect(&Token::Comma)?;
                let value = self.expr()?;
                out.push(Statement::Poke { addr, value });
            }
            Token::Keyword(Keyword::Call) => out.push(Statement::Call(self.expr()?)),
            Token::Keyword(Keyword::Sleep) => out.push(Statement::Sleep(self.expr()?)),
            Token::Keyword(Keyword::Rem) => {
                let text = match self.next() {
                    Some(Token::Raw(text)) => text.clone(),
                    _ => String::new(),
                };
                out.push(Statement::Rem(text));
            }
            Token::Ampersand => {
                // whatever follows the ampersand belongs to the machine
                // language handler, not to BASIC
                while !self.at_end() && self.peek() != Some(&Token::Colon) {
                    self.pos += 1;
                }
                out.push(Statement::Ampersand);
            }
            Token::Keyword(Keyword::Lomem) => {
                self.eat(&Token::Colon);
                out.push(Statement::Lomem(self.expr()?));
            }
            Token::Keyword(Keyword::Himem) => {
                self.eat(&Token::Colon);
                out.push(Statement::Himem(self.expr()?));
            }
            _ => return Err(syntax()),
        }
        Ok(())
    }

    fn assignment(&mut self) -> Result<Statement, BasicError> {
        let name = self.ident()?;
        self.assignment_to(name)
    }

    fn assignment_to(&mut self, name: String) -> Result<Statement, BasicError> {
        let target = self.target_from(name)?;
        self.expect(&Token::Equal)?;
        let value = self.expr()?;
        Ok(Statement::Let { target, value })
    }

    fn target(&mut self) -> Result<Target, BasicError> {
        let name = self.ident()?;
        self.target_from(name)
    }

    fn target_from(&mut self, name: String) -> Result<Target, BasicError> {
        if self.eat(&Token::LParen) {
            let indices = self.expr_list()?;
            self.expect(&Token::RParen)?;
            Ok(Target::Element { name, indices })
        } else {
            Ok(Target::Scalar(name))
        }
    }

    fn target_list(&mut self) -> Result<Vec<Target>, BasicError> {
        let mut targets = vec![self.target()?];
        while self.eat(&Token::Comma) {
            targets.push(self.target()?);
        }
        Ok(targets)
    }

    fn point(&mut self) -> Result<(Expr, Expr), BasicError> {
        let x = self.expr()?;
        self.expect(&Token::Comma)?;
        let y = self.expr()?;
        Ok((x, y))
    }

    fn shape_args(&mut self) -> Result<(Expr, Option<(Expr, Expr)>), BasicError> {
        let shape = self.expr()?;
        let at = if self.eat(&Token::Keyword(Keyword::At)) {
            Some(self.point()?)
        } else {
            None
        };
        Ok((shape, at))
    }

    fn print_items(&mut self) -> Result<Vec<PrintItem>, BasicError> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None | Some(Token::Colon) => break,
                Some(Token::Comma) => {
                    self.pos += 1;
                    items.push(PrintItem::Comma);
                }
                Some(Token::Semicolon) => {
                    self.pos += 1;
                    items.push(PrintItem::Semicolon);
                }
                Some(Token::Keyword(Keyword::Tab)) => {
                    self.pos += 1;
                    self.expect(&Token::LParen)?;
                    let n = self.expr()?;
                    self.expect(&Token::RParen)?;
                    items.push(PrintItem::Tab(n));
                }
                Some(Token::Keyword(Keyword::Spc)) => {
                    self.pos += 1;
                    self.expect(&Token::LParen)?;
                    let n = self.expr()?;
                    self.expect(&Token::RParen)?;
                    items.push(PrintItem::Spc(n));
                }
                _ => items.push(PrintItem::Value(self.expr()?)),
            }
        }
        Ok(items)
    }

    /// DATA constants: quoted strings stay strings, bare chunks become
    /// numbers when they parse as one.
    fn data_constants(&mut self, data: &mut Vec<Value>) -> Result<(), BasicError> {
        let mut expecting_item = true;
        loop {
            match self.peek() {
                None | Some(Token::Colon) => {
                    if expecting_item {
                        data.push(Value::Str(String::new()));
                    }
                    break;
                }
                Some(Token::Comma) => {
                    if expecting_item {
                        data.push(Value::Str(String::new()));
                    }
                    expecting_item = true;
                    self.pos += 1;
                }
                Some(Token::Str(text)) => {
                    data.push(Value::Str(text.clone()));
                    expecting_item = false;
                    self.pos += 1;
                }
                Some(Token::Raw(text)) => {
                    let trimmed = text.trim();
                    let value = match trimmed.parse::<f64>() {
                        Ok(n) => Value::Number(n),
                        Err(_) => Value::Str(trimmed.to_string()),
                    };
                    data.push(value);
                    expecting_item = false;
                    self.pos += 1;
                }
                _ => return Err(syntax()),
            }
        }
        Ok(())
    }

    fn expr_list(&mut self) -> Result<Vec<Expr>, BasicError> {
        let mut exprs = vec![self.expr()?];
        while self.eat(&Token::Comma) {
            exprs.push(self.expr()?);
        }
        Ok(exprs)
    }

    //region Expression parsing, loosest binding first

    fn expr(&mut self) -> Result<Expr, BasicError> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Expr, BasicError> {
        let mut lhs = self.and_expr()?;
        while self.eat(&Token::Keyword(Keyword::Or)) {
            let rhs = self.and_expr()?;
            lhs = binary(BinaryOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Expr, BasicError> {
        let mut lhs = self.comparison()?;
        while self.eat(&Token::Keyword(Keyword::And)) {
            let rhs = self.comparison()?;
            lhs = binary(BinaryOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn comparison(&mut self) -> Result<Expr, BasicError> {
        let mut lhs = self.additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Equal) => BinaryOp::Equal,
                Some(Token::NotEqual) => BinaryOp::NotEqual,
                Some(Token::Less) => BinaryOp::Less,
                Some(Token::LessEqual) => BinaryOp::LessEqual,
                Some(Token::Greater) => BinaryOp::Greater,
                Some(Token::GreaterEqual) => BinaryOp::GreaterEqual,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.additive()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn additive(&mut self) -> Result<Expr, BasicError> {
        let mut lhs = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Subtract,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.multiplicative()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn multiplicative(&mut self) -> Result<Expr, BasicError> {
        let mut lhs = self.power()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Multiply,
                Some(Token::Slash) => BinaryOp::Divide,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.power()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn power(&mut self) -> Result<Expr, BasicError> {
        let mut lhs = self.unary()?;
        while self.eat(&Token::Caret) {
            let rhs = self.unary()?;
            lhs = binary(BinaryOp::Power, lhs, rhs);
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, BasicError> {
        if self.eat(&Token::Minus) {
            let operand = self.unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Negate,
                operand: Box::new(operand),
            });
        }
        if self.eat(&Token::Plus) {
            return self.unary();
        }
        if self.eat(&Token::Keyword(Keyword::Not)) {
            let operand = self.unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, BasicError> {
        let token = self.next().ok_or_else(syntax)?;
        match token {
            Token::Number(n) => Ok(Expr::Number(*n)),
            Token::Str(text) => Ok(Expr::Str(text.clone())),
            Token::LParen => {
                let inner = self.expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Token::Ident(name) => {
                let name = name.clone();
                if self.eat(&Token::LParen) {
                    let indices = self.expr_list()?;
                    self.expect(&Token::RParen)?;
                    Ok(Expr::Element { name, indices })
                } else {
                    Ok(Expr::Var(name))
                }
            }
            Token::Keyword(Keyword::Fn) => {
                let name = self.ident()?;
                self.expect(&Token::LParen)?;
                let arg = self.expr()?;
                self.expect(&Token::RParen)?;
                Ok(Expr::FnCall {
                    name,
                    arg: Box::new(arg),
                })
            }
            Token::Keyword(keyword) => {
                let func = builtin_for(*keyword).ok_or_else(syntax)?;
                self.expect(&Token::LParen)?;
                let args = self.expr_list()?;
                self.expect(&Token::RParen)?;
                Ok(Expr::Call { func, args })
            }
            _ => Err(syntax()),
        }
    }

    //endregion
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

fn builtin_for(keyword: Keyword) -> Option<Builtin> {
    Some(match keyword {
        Keyword::Abs => Builtin::Abs,
        Keyword::Sgn => Builtin::Sgn,
        Keyword::Int => Builtin::Int,
        Keyword::Rnd => Builtin::Rnd,
        Keyword::Sin => Builtin::Sin,
        Keyword::Cos => Builtin::Cos,
        Keyword::Tan => Builtin::Tan,
        Keyword::Atn => Builtin::Atn,
        Keyword::Log => Builtin::Log,
        Keyword::Exp => Builtin::Exp,
        Keyword::Sqr => Builtin::Sqr,
        Keyword::Len => Builtin::Len,
        Keyword::Asc => Builtin::Asc,
        Keyword::ChrS => Builtin::ChrS,
        Keyword::StrS => Builtin::StrS,
        Keyword::Val => Builtin::Val,
        Keyword::MidS => Builtin::MidS,
        Keyword::LeftS => Builtin::LeftS,
        Keyword::RightS => Builtin::RightS,
        Keyword::Peek => Builtin::Peek,
        Keyword::Pos => Builtin::Pos,
        Keyword::Fre => Builtin::Fre,
        Keyword::Usr => Builtin::Usr,
        _ => return None,
    })
}

fn syntax() -> BasicError {
    BasicError::new(BasicErrorKind::Syntax)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_line(source: &str) -> Line {
        parse(source).unwrap().lines.into_iter().next().unwrap()
    }

    #[test]
    fn lines_sort_and_duplicates_replace() {
        let program = parse("20 PRINT 2\n10 PRINT 1\n20 PRINT 3").unwrap();
        let numbers: Vec<u16> = program.lines.iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![10, 20]);
        assert!(matches!(
            program.lines[1].statements[0],
            Statement::Print(_)
        ));
    }

    #[test]
    fn precedence_follows_the_ladder() {
        let line = first_line("10 A = 2+3*4");
        let Statement::Let { value, .. } = &line.statements[0] else {
            panic!("expected assignment");
        };
        // 2 + (3 * 4)
        let Expr::Binary { op, rhs, .. } = value else {
            panic!("expected binary expr");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(
            **rhs,
            Expr::Binary {
                op: BinaryOp::Multiply,
                ..
            }
        ));
    }

    #[test]
    fn comparisons_bind_looser_than_arithmetic() {
        let line = first_line("10 A = 1+2 < 3*4 AND 1");
        let Statement::Let { value, .. } = &line.statements[0] else {
            panic!("expected assignment");
        };
        assert!(matches!(
            value,
            Expr::Binary {
                op: BinaryOp::And,
                ..
            }
        ));
    }

    #[test]
    fn if_then_flattens_into_the_line() {
        let line = first_line("10 IF A = 1 THEN PRINT \"YES\": PRINT \"MORE\"");
        assert_eq!(line.statements.len(), 3);
        assert!(matches!(line.statements[0], Statement::If(_)));
        assert!(matches!(line.statements[1], Statement::Print(_)));
        assert!(matches!(line.statements[2], Statement::Print(_)));
    }

    #[test]
    fn if_then_line_number_is_a_goto() {
        let line = first_line("10 IF A THEN 100");
        assert!(matches!(line.statements[0], Statement::If(_)));
        assert!(matches!(line.statements[1], Statement::Goto(100)));

        let line = first_line("10 IF A GOTO 200");
        assert!(matches!(line.statements[1], Statement::Goto(200)));
    }

    #[test]
    fn data_constants_collect_in_line_order() {
        let program = parse("30 DATA 3, THREE\n10 DATA 1, \"ONE,TWO\"").unwrap();
        let values: Vec<&Value> = program.data_values.iter().map(|d| &d.value).collect();
        assert_eq!(
            values,
            vec![
                &Value::Number(1.0),
                &Value::Str("ONE,TWO".into()),
                &Value::Number(3.0),
                &Value::Str("THREE".into()),
            ]
        );
        assert_eq!(program.data_values[0].line_number, 10);
        assert_eq!(program.data_values[3].line_number, 30);
    }

    #[test]
    fn implicit_let_and_array_targets() {
        let line = first_line("10 A(3) = 7");
        let Statement::Let { target, .. } = &line.statements[0] else {
            panic!("expected assignment");
        };
        assert!(matches!(target, Target::Element { .. }));
    }

    #[test]
    fn on_goto_collects_targets() {
        let line = first_line("10 ON X GOTO 100, 200, 300");
        let Statement::On {
            targets, gosub, ..
        } = &line.statements[0]
        else {
            panic!("expected ON");
        };
        assert_eq!(targets, &vec![100, 200, 300]);
        assert!(!gosub);
    }

    #[test]
    fn missing_line_number_is_a_syntax_error() {
        let err = parse("PRINT 5").unwrap_err();
        assert_eq!(err.kind, BasicErrorKind::Syntax);
    }

    #[test]
    fn hplot_to_chains() {
        let line = first_line("10 HPLOT 0,0 TO 100,100 TO 200,50");
        let Statement::Hplot { from_last, points } = &line.statements[0] else {
            panic!("expected HPLOT");
        };
        assert!(!from_last);
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn def_fn_parses() {
        let line = first_line("10 DEF FN SQ(X) = X * X");
        assert!(matches!(line.statements[0], Statement::DefFn { .. }));
    }
}
