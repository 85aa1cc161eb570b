// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Arithmetic expression evaluator for the `calculate` tool.
//!
//! A hand-written recursive-descent parser over a closed grammar:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '%') unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary ('**' unary)?
//! primary := NUMBER | FUNC '(' args ')' | '(' expr ')'
//! FUNC    := abs | max | min | pow | round | sum
//! ```
//!
//! Nothing outside this grammar is accepted. There are no variables, no
//! attribute access, no strings and no way to reach anything but `f64`
//! arithmetic.

use thiserror::Error;

/// Longest accepted expression, in bytes.
pub const MAX_EXPRESSION_LEN: usize = 1024;

/// Deepest accepted nesting of parentheses and unary operators.
const MAX_DEPTH: usize = 64;

const FUNCTIONS: &[&str] = &["abs", "max", "min", "pow", "round", "sum"];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("expression is empty")]
    Empty,
    #[error("expression is longer than {MAX_EXPRESSION_LEN} characters")]
    TooLong,
    #[error("expression is nested too deeply")]
    TooDeep,
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("name '{0}' is not allowed")]
    UnknownName(String),
    #[error("{0}() must be called with parentheses")]
    BareFunction(String),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("unexpected {found}, expected {expected}")]
    Syntax { found: String, expected: &'static str },
    #[error("{func}() {message}")]
    Arity { func: &'static str, message: &'static str },
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not a finite number")]
    NotFinite,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    LParen,
    RParen,
    Comma,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {n}"),
            Token::Ident(name) => format!("name '{name}'"),
            Token::Plus => "'+'".into(),
            Token::Minus => "'-'".into(),
            Token::Star => "'*'".into(),
            Token::StarStar => "'**'".into(),
            Token::Slash => "'/'".into(),
            Token::Percent => "'%'".into(),
            Token::LParen => "'('".into(),
            Token::RParen => "')'".into(),
            Token::Comma => "','".into(),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, CalcError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // Optional exponent: 1e3, 2.5E-4.
                if i < chars.len() && matches!(chars[i], 'e' | 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && matches!(chars[j], '+' | '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        while j < chars.len() && chars[j].is_ascii_digit() {
                            j += 1;
                        }
                        i = j;
                    }
                }
                let text: String = chars[start..i].iter().collect();
                let value = text
                    .parse::<f64>()
                    .map_err(|_| CalcError::InvalidNumber(text.clone()))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::StarStar);
                i += 2;
            }
            '+' | '-' | '*' | '/' | '%' | '(' | ')' | ',' => {
                tokens.push(match c {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    '%' => Token::Percent,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    _ => Token::Comma,
                });
                i += 1;
            }
            other => return Err(CalcError::UnexpectedChar { ch: other, pos: i }),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, want: Token, expected: &'static str) -> Result<(), CalcError> {
        match self.next() {
            Some(t) if t == want => Ok(()),
            Some(t) => Err(CalcError::Syntax {
                found: t.describe(),
                expected,
            }),
            None => Err(CalcError::Syntax {
                found: "end of expression".into(),
                expected,
            }),
        }
    }

    fn enter(&mut self) -> Result<(), CalcError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CalcError::TooDeep);
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    value *= self.unary()?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    if rhs == 0.0 {
                        return Err(CalcError::DivisionByZero);
                    }
                    value /= rhs;
                }
                Some(Token::Percent) => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    if rhs == 0.0 {
                        return Err(CalcError::DivisionByZero);
                    }
                    // Result takes the sign of the divisor.
                    value -= rhs * (value / rhs).floor();
                }
                _ => return Ok(value),
            }
        }
    }

    fn unary(&mut self) -> Result<f64, CalcError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                self.enter()?;
                let v = -self.unary()?;
                self.depth -= 1;
                Ok(v)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.enter()?;
                let v = self.unary()?;
                self.depth -= 1;
                Ok(v)
            }
            _ => self.power(),
        }
    }

    /// `**` binds tighter than unary minus on its left and is
    /// right-associative: `-2 ** 2 == -4`, `2 ** 3 ** 2 == 512`.
    fn power(&mut self) -> Result<f64, CalcError> {
        let base = self.primary()?;
        if self.peek() == Some(&Token::StarStar) {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64, CalcError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::LParen) => {
                self.enter()?;
                let v = self.expr()?;
                self.expect(Token::RParen, "')'")?;
                self.depth -= 1;
                Ok(v)
            }
            Some(Token::Ident(name)) => {
                let Some(func) = FUNCTIONS.iter().copied().find(|f| *f == name) else {
                    return Err(CalcError::UnknownName(name));
                };
                if self.peek() != Some(&Token::LParen) {
                    return Err(CalcError::BareFunction(name));
                }
                self.pos += 1;
                self.enter()?;
                let args = self.args()?;
                self.depth -= 1;
                call(func, &args)
            }
            Some(t) => Err(CalcError::Syntax {
                found: t.describe(),
                expected: "a number, function call or '('",
            }),
            None => Err(CalcError::Syntax {
                found: "end of expression".into(),
                expected: "a number, function call or '('",
            }),
        }
    }

    /// Comma-separated arguments after an opening parenthesis, through the
    /// closing one.
    fn args(&mut self) -> Result<Vec<f64>, CalcError> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.pos += 1;
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            match self.next() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => return Ok(args),
                Some(t) => {
                    return Err(CalcError::Syntax {
                        found: t.describe(),
                        expected: "',' or ')'",
                    });
                }
                None => {
                    return Err(CalcError::Syntax {
                        found: "end of expression".into(),
                        expected: "')'",
                    });
                }
            }
        }
    }
}

fn call(func: &'static str, args: &[f64]) -> Result<f64, CalcError> {
    let arity = |message| CalcError::Arity { func, message };
    match (func, args) {
        ("abs", [x]) => Ok(x.abs()),
        ("abs", _) => Err(arity("takes exactly one argument")),
        ("pow", [x, y]) => Ok(x.powf(*y)),
        ("pow", _) => Err(arity("takes exactly two arguments")),
        ("round", [x]) => Ok(x.round_ties_even()),
        ("round", [x, digits]) => {
            if digits.fract() != 0.0 {
                return Err(arity("digits must be an integer"));
            }
            let scale = 10f64.powi(*digits as i32);
            Ok((x * scale).round_ties_even() / scale)
        }
        ("round", _) => Err(arity("takes one or two arguments")),
        ("max", [first, rest @ ..]) => Ok(rest.iter().copied().fold(*first, f64::max)),
        ("min", [first, rest @ ..]) => Ok(rest.iter().copied().fold(*first, f64::min)),
        ("max" | "min", []) => Err(arity("expects at least one argument")),
        ("sum", values) => Ok(values.iter().sum()),
        _ => Err(CalcError::UnknownName(func.to_string())),
    }
}

/// Evaluates `input` under the grammar above.
pub fn evaluate(input: &str) -> Result<f64, CalcError> {
    if input.len() > MAX_EXPRESSION_LEN {
        return Err(CalcError::TooLong);
    }
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(CalcError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if let Some(extra) = parser.peek() {
        return Err(CalcError::Syntax {
            found: extra.describe(),
            expected: "end of expression",
        });
    }
    if !value.is_finite() {
        return Err(CalcError::NotFinite);
    }
    Ok(value)
}
