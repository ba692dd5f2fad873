//! Calculator tool: evaluates arithmetic expressions.
//!
//! Supports `+`, `-`, `*`, `/`, parentheses, decimals and unary minus.
//! Takes the action input verbatim, e.g. `Action Input: (2 + 3) * 4`.
//! Nesting is capped at [`MAX_DEPTH`] so hostile input fails as a tool
//! error instead of exhausting the stack.

use std::iter::Peekable;
use std::str::Chars;

use async_trait::async_trait;
use rustedreason_core::error::ToolError;
use rustedreason_core::tool::Tool;

/// Deepest allowed nesting of parentheses and unary minus combined.
pub const MAX_DEPTH: usize = 256;

pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluate a mathematical expression. Supports +, -, *, /, parentheses, and decimal numbers. Input: the expression, e.g. (2 + 3) * 4"
    }

    async fn call(&self, input: &str) -> Result<String, ToolError> {
        let expr = input.trim().trim_matches(|c| c == '"' || c == '`' || c == '\'');
        if expr.is_empty() {
            return Err(ToolError::InvalidInput("empty expression".into()));
        }

        let value = evaluate(expr)?;
        Ok(render(value))
    }
}

/// Integers print without a trailing `.0`.
fn render(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Why an expression could not be evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// The text is not a well-formed expression, or divides by zero.
    Malformed(String),
    /// Nesting went past [`MAX_DEPTH`].
    TooDeep,
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::Malformed(msg) => f.write_str(msg),
            EvalError::TooDeep => f.write_str("expression nested too deeply"),
        }
    }
}

impl From<EvalError> for ToolError {
    fn from(err: EvalError) -> Self {
        match err {
            EvalError::TooDeep => ToolError::InvalidInput(err.to_string()),
            EvalError::Malformed(msg) => ToolError::Failed(msg),
        }
    }
}

fn malformed(msg: impl Into<String>) -> EvalError {
    EvalError::Malformed(msg.into())
}

/// Evaluate an arithmetic expression.
pub fn evaluate(expr: &str) -> Result<f64, EvalError> {
    let tokens = Lexer::new(expr).collect::<Result<Vec<_>, _>>()?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    match parser.peek() {
        None => Ok(value),
        Some(tok) => Err(malformed(format!(
            "Unexpected token at position {}: {tok:?}",
            parser.pos
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Op(char),
    Open,
    Close,
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn number(&mut self, first: char) -> Result<Token, EvalError> {
        let mut text = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if !(c.is_ascii_digit() || c == '.') {
                break;
            }
            text.push(c);
            self.chars.next();
        }
        text.parse()
            .map(Token::Num)
            .map_err(|_| malformed(format!("Invalid number: {text}")))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, EvalError>;

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.chars.by_ref().find(|c| !c.is_whitespace())?;
        Some(match c {
            '+' | '-' | '*' | '/' => Ok(Token::Op(c)),
            '(' => Ok(Token::Open),
            ')' => Ok(Token::Close),
            c if c.is_ascii_digit() || c == '.' => self.number(c),
            c => Err(malformed(format!("Unexpected character: '{c}'"))),
        })
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let tok = self.peek();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn descend(&mut self) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::TooDeep);
        }
        Ok(())
    }

    // expr = term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, EvalError> {
        let mut acc = self.term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek() {
            self.bump();
            let rhs = self.term()?;
            acc = if op == '+' { acc + rhs } else { acc - rhs };
        }
        Ok(acc)
    }

    // term = unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<f64, EvalError> {
        let mut acc = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/'))) = self.peek() {
            self.bump();
            let rhs = self.unary()?;
            if op == '*' {
                acc *= rhs;
            } else if rhs == 0.0 {
                return Err(malformed("Division by zero"));
            } else {
                acc /= rhs;
            }
        }
        Ok(acc)
    }

    // unary = '-' unary | atom
    fn unary(&mut self) -> Result<f64, EvalError> {
        if self.peek() != Some(Token::Op('-')) {
            return self.atom();
        }
        self.bump();
        self.descend()?;
        let value = self.unary()?;
        self.depth -= 1;
        Ok(-value)
    }

    // atom = NUMBER | '(' expr ')'
    fn atom(&mut self) -> Result<f64, EvalError> {
        match self.bump() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::Open) => {
                self.descend()?;
                let value = self.expr()?;
                self.depth -= 1;
                match self.bump() {
                    Some(Token::Close) => Ok(value),
                    _ => Err(malformed("Expected closing parenthesis")),
                }
            }
            Some(tok) => Err(malformed(format!("Unexpected token: {tok:?}"))),
            None => Err(malformed("Unexpected end of expression")),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
