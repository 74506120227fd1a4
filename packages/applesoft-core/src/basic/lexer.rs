//! The tokenizer.
//!
//! Faithful to the Applesoft "cruncher": keywords collapse greedily anywhere
//! in the text, whitespace is only a separator, `?` is PRINT, and REM and
//! DATA switch to raw scanning for the rest of their reach. Identifiers
//! fold to upper case.

use super::error::{BasicError, BasicErrorKind};
use super::token::{Keyword, Token, KEYWORDS};

pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(line: &'a str) -> Lexer<'a> {
        Lexer {
            src: line.as_bytes(),
            pos: 0,
        }
    }

    /// Tokenize one source line (without its terminating LF).
    pub fn tokenize(mut self) -> Result<Vec<Token>, BasicError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_spaces();
            let Some(c) = self.peek() else { break };
            let token = match c {
                b'0'..=b'9' | b'.' => self.number()?,
                b'"' => Token::Str(self.string_literal()),
                b'+' => self.take(Token::Plus),
                b'-' => self.take(Token::Minus),
                b'*' => self.take(Token::Star),
                b'/' => self.take(Token::Slash),
                b'^' => self.take(Token::Caret),
                b'(' => self.take(Token::LParen),
                b')' => self.take(Token::RParen),
                b',' => self.take(Token::Comma),
                b':' => self.take(Token::Colon),
                b';' => self.take(Token::Semicolon),
                b'&' => self.take(Token::Ampersand),
                b'=' => self.take(Token::Equal),
                b'?' => self.take(Token::Keyword(Keyword::Print)),
                b'<' => self.angle_bracket(b'<'),
                b'>' => self.angle_bracket(b'>'),
                c if c.is_ascii_alphabetic() => self.word(),
                _ => return Err(BasicError::new(BasicErrorKind::Syntax)),
            };

            match token {
                Token::Keyword(Keyword::Rem) => {
                    tokens.push(token);
                    tokens.push(Token::Raw(self.rest_of_line()));
                    break;
                }
                Token::Keyword(Keyword::Data) => {
                    tokens.push(token);
                    self.data_items(&mut tokens);
                }
                other => tokens.push(other),
            }
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn take(&mut self, token: Token) -> Token {
        self.pos += 1;
        token
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(b' ') | Some(b'\t') | Some(b'\r')) {
            self.pos += 1;
        }
    }

    fn angle_bracket(&mut self, open: u8) -> Token {
        self.pos += 1;
        self.skip_spaces();
        match (open, self.peek()) {
            (b'<', Some(b'=')) => self.take(Token::LessEqual),
            (b'<', Some(b'>')) => self.take(Token::NotEqual),
            (b'>', Some(b'=')) => self.take(Token::GreaterEqual),
            (b'<', _) => Token::Less,
            (_, _) => Token::Greater,
        }
    }

    /// Longest keyword starting exactly at `pos`, if any.
    fn keyword_at(&self, pos: usize) -> Option<(Keyword, usize)> {
        let rest = &self.src[pos..];
        for (lexeme, keyword) in KEYWORDS {
            let bytes = lexeme.as_bytes();
            if rest.len() >= bytes.len()
                && rest[..bytes.len()].eq_ignore_ascii_case(bytes)
            {
                return Some((*keyword, bytes.len()));
            }
        }
        None
    }

    /// A keyword or an identifier. The identifier ends as soon as a keyword
    /// could begin; that is the crunching quirk.
    fn word(&mut self) -> Token {
        if let Some((keyword, len)) = self.keyword_at(self.pos) {
            self.pos += len;
            return Token::Keyword(keyword);
        }
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !c.is_ascii_alphanumeric() || self.keyword_at(self.pos).is_some() {
                break;
            }
            self.pos += 1;
        }
        let mut name = String::from_utf8_lossy(&self.src[start..self.pos]).to_ascii_uppercase();
        if matches!(self.peek(), Some(b'$') | Some(b'%')) {
            name.push(self.src[self.pos] as char);
            self.pos += 1;
        }
        Token::Ident(name)
    }

    fn number(&mut self) -> Result<Token, BasicError> {
        let start = self.pos;
        let mut seen_dot = false;
        while let Some(c) = self.peek() {
            match c {
                b'0'..=b'9' => self.pos += 1,
                b'.' if !seen_dot => {
                    seen_dot = true;
                    self.pos += 1;
                }
                b'E' | b'e' => {
                    // exponent only when well-formed; otherwise it is the
                    // start of a word ("1END" is 1 END)
                    let mut probe = self.pos + 1;
                    if matches!(self.src.get(probe), Some(b'+') | Some(b'-')) {
                        probe += 1;
                    }
                    if !matches!(self.src.get(probe), Some(d) if d.is_ascii_digit()) {
                        break;
                    }
                    self.pos = probe + 1;
                    while matches!(self.peek(), Some(d) if d.is_ascii_digit()) {
                        self.pos += 1;
                    }
                    break;
                }
                _ => break,
            }
        }
        let text = std::str::from_utf8(&self.src[start..self.pos])
            .map_err(|_| BasicError::new(BasicErrorKind::Syntax))?;
        text.parse()
            .map(Token::Number)
            .map_err(|_| BasicError::new(BasicErrorKind::Syntax))
    }

    /// A double-quoted string. A missing closing quote closes at end of
    /// line, the way the ROM tokenizer behaved.
    fn string_literal(&mut self) -> String {
        self.pos += 1; // opening quote
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == b'"' {
                break;
            }
            self.pos += 1;
        }
        let text = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();
        if self.peek() == Some(b'"') {
            self.pos += 1;
        }
        text
    }

    fn rest_of_line(&mut self) -> String {
        let text = String::from_utf8_lossy(&self.src[self.pos..]).into_owned();
        self.pos = self.src.len();
        text.trim_start().to_string()
    }

    /// Raw DATA scanning: quoted strings keep their spelling, bare items
    /// run to the next comma, colon, or end of line.
    fn data_items(&mut self, tokens: &mut Vec<Token>) {
        loop {
            self.skip_spaces();
            match self.peek() {
                None => break,
                Some(b':') => {
                    tokens.push(self.take(Token::Colon));
                    break;
                }
                Some(b',') => {
                    tokens.push(self.take(Token::Comma));
                }
                Some(b'"') => {
                    let text = self.string_literal();
                    tokens.push(Token::Str(text));
                }
                Some(_) => {
                    let start = self.pos;
                    while let Some(c) = self.peek() {
                        if c == b',' || c == b':' {
                            break;
                        }
                        self.pos += 1;
                    }
                    let text = String::from_utf8_lossy(&self.src[start..self.pos])
                        .trim_end()
                        .to_string();
                    tokens.push(Token::Raw(text));
                }
            }
        }
    }
}

/// Tokenize a full line in one call.
pub fn tokenize(line: &str) -> Result<Vec<Token>, BasicError> {
    Lexer::new(line).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crunches_keywords_out_of_running_text() {
        let tokens = tokenize("FORI=1TO3").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Keyword(Keyword::For),
                Token::Ident("I".into()),
                Token::Equal,
                Token::Number(1.0),
                Token::Keyword(Keyword::To),
                Token::Number(3.0),
            ]
        );
    }

    #[test]
    fn identifiers_break_at_embedded_keywords() {
        // the famous one: SCORE contains OR
        let tokens = tokenize("SCORE").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("SC".into()),
                Token::Keyword(Keyword::Or),
                Token::Ident("E".into()),
            ]
        );
    }

    #[test]
    fn question_mark_is_print() {
        let tokens = tokenize("? 5").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Keyword(Keyword::Print), Token::Number(5.0)]
        );
    }

    #[test]
    fn numbers_support_scientific_notation() {
        assert_eq!(tokenize("1.5E10").unwrap(), vec![Token::Number(1.5e10)]);
        assert_eq!(tokenize("2E-3").unwrap(), vec![Token::Number(0.002)]);
        // but 1END is the number 1 followed by END
        assert_eq!(
            tokenize("1END").unwrap(),
            vec![Token::Number(1.0), Token::Keyword(Keyword::End)]
        );
    }

    #[test]
    fn strings_and_suffixes() {
        let tokens = tokenize("A$ = \"HELLO: WORLD\"").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("A$".into()),
                Token::Equal,
                Token::Str("HELLO: WORLD".into()),
            ]
        );
        assert_eq!(tokenize("X%").unwrap(), vec![Token::Ident("X%".into())]);
    }

    #[test]
    fn rem_swallows_the_rest() {
        let tokens = tokenize("REM PRINT 5 : GOTO 10").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Keyword(Keyword::Rem),
                Token::Raw("PRINT 5 : GOTO 10".into()),
            ]
        );
    }

    #[test]
    fn data_items_stay_raw() {
        let tokens = tokenize("DATA 1, TWO, \"THREE, FOUR\": PRINT").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Keyword(Keyword::Data),
                Token::Raw("1".into()),
                Token::Comma,
                Token::Raw("TWO".into()),
                Token::Comma,
                Token::Str("THREE, FOUR".into()),
                Token::Colon,
                Token::Keyword(Keyword::Print),
            ]
        );
    }

    #[test]
    fn relational_digraphs() {
        let tokens = tokenize("A<=B:A<>B:A>=B").unwrap();
        assert!(tokens.contains(&Token::LessEqual));
        assert!(tokens.contains(&Token::NotEqual));
        assert!(tokens.contains(&Token::GreaterEqual));
    }

    #[test]
    fn lowercase_folds_upper() {
        let tokens = tokenize("print hello$").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Keyword(Keyword::Print), Token::Ident("HELLO$".into())]
        );
    }
}
