//! Recursive-Descent Expression Parser
//!
//! Builds an [`Expr`] tree from the token stream. The whole input is parsed
//! before anything is evaluated, so a syntax error anywhere in the input is
//! reported even when another part of it would fail at runtime.
//!
//! ## Grammar
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | postfix
//! postfix := primary ('(' expr? ')')*
//! primary := NUMBER | '(' expr ')'
//! ```
//!
//! There are no identifiers in the grammar. A `postfix` group such as `2(3)`
//! is accepted syntactically as a call, but evaluating it always fails since
//! numbers are not callable.

use crate::eval::lexer::{tokenize, Token};
use crate::eval::number::Number;
use crate::eval::EvalError;
use num_bigint::BigInt;
use thiserror::Error;

/// Maximum nesting depth for parentheses and unary signs (prevents stack overflow)
pub const MAX_NESTING_DEPTH: usize = 256;

/// Reasons an expression fails to parse.
///
/// These never reach the client individually; they all collapse into
/// [`EvalError::InvalidSyntax`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("unexpected byte: {0:#04x}")]
    UnexpectedByte(u8),

    #[error("malformed number literal")]
    MalformedNumber,

    #[error("leading zeros in decimal integer literal")]
    LeadingZero,

    #[error("unexpected token: {0:?}")]
    UnexpectedToken(Token),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("maximum nesting depth exceeded: {0}")]
    TooDeep(usize),
}

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Number),
    Neg(Box<Expr>),
    Pos(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// A value followed by a parenthesised group, e.g. `2(3)`
    Call {
        callee: Box<Expr>,
        arg: Option<Box<Expr>>,
    },
}

impl Expr {
    /// Evaluates the tree, left operand before right.
    pub fn eval(&self) -> Result<Number, EvalError> {
        match self {
            Expr::Literal(n) => Ok(n.clone()),
            Expr::Neg(inner) => inner.eval()?.neg(),
            Expr::Pos(inner) => inner.eval(),
            Expr::Binary { op, lhs, rhs } => {
                let lhs = lhs.eval()?;
                let rhs = rhs.eval()?;
                match op {
                    BinaryOp::Add => lhs.add(rhs),
                    BinaryOp::Sub => lhs.sub(rhs),
                    BinaryOp::Mul => lhs.mul(rhs),
                    BinaryOp::Div => lhs.div(rhs),
                }
            }
            Expr::Call { callee, arg } => {
                callee.eval()?;
                if let Some(arg) = arg {
                    arg.eval()?;
                }
                Err(EvalError::Other("TypeError"))
            }
        }
    }
}

/// Parses a complete expression.
pub fn parse(input: &str) -> Result<Expr, EvalError> {
    let tokens = tokenize(input).map_err(|_| EvalError::InvalidSyntax)?;
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expr()?;

    match parser.peek() {
        None => Ok(expr),
        Some(_) => Err(EvalError::InvalidSyntax),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Result<Token, SyntaxError> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(SyntaxError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(token)
    }

    fn expect_rparen(&mut self) -> Result<(), SyntaxError> {
        match self.next()? {
            Token::RParen => Ok(()),
            other => Err(SyntaxError::UnexpectedToken(other)),
        }
    }

    fn descend(&mut self) -> Result<(), SyntaxError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(SyntaxError::TooDeep(MAX_NESTING_DEPTH));
        }
        Ok(())
    }

    fn parse_expr(&mut self) -> Result<Expr, EvalError> {
        self.expr().map_err(|_| EvalError::InvalidSyntax)
    }

    fn expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut lhs = self.term()?;

        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn term(&mut self) -> Result<Expr, SyntaxError> {
        let mut lhs = self.unary()?;

        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn unary(&mut self) -> Result<Expr, SyntaxError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                self.descend()?;
                let inner = self.unary()?;
                self.depth -= 1;
                Ok(Expr::Neg(Box::new(inner)))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.descend()?;
                let inner = self.unary()?;
                self.depth -= 1;
                Ok(Expr::Pos(Box::new(inner)))
            }
            _ => self.postfix(),
        }
    }

    fn postfix(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.primary()?;

        while let Some(Token::LParen) = self.peek() {
            self.pos += 1;
            let arg = if let Some(Token::RParen) = self.peek() {
                None
            } else {
                self.descend()?;
                let arg = self.expr()?;
                self.depth -= 1;
                Some(Box::new(arg))
            };
            self.expect_rparen()?;
            expr = Expr::Call {
                callee: Box::new(expr),
                arg,
            };
        }

        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, SyntaxError> {
        match self.next()? {
            Token::Int(text) => text
                .parse::<BigInt>()
                .map(|n| Expr::Literal(Number::Int(n)))
                .map_err(|_| SyntaxError::MalformedNumber),
            Token::Float(value) => Ok(Expr::Literal(Number::Float(value))),
            Token::LParen => {
                self.descend()?;
                let inner = self.expr()?;
                self.depth -= 1;
                self.expect_rparen()?;
                Ok(inner)
            }
            other => Err(SyntaxError::UnexpectedToken(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Box<Expr> {
        Box::new(Expr::Literal(Number::from(n)))
    }

    #[test]
    fn test_precedence() {
        let expr = parse("1+2*3").unwrap();
        assert_eq!(
            expr,
            Expr::Binary {
                op: BinaryOp::Add,
                lhs: int(1),
                rhs: Box::new(Expr::Binary {
                    op: BinaryOp::Mul,
                    lhs: int(2),
                    rhs: int(3),
                }),
            }
        );
    }

    #[test]
    fn test_left_associative() {
        let expr = parse("8-2-1").unwrap();
        assert_eq!(
            expr,
            Expr::Binary {
                op: BinaryOp::Sub,
                lhs: Box::new(Expr::Binary {
                    op: BinaryOp::Sub,
                    lhs: int(8),
                    rhs: int(2),
                }),
                rhs: int(1),
            }
        );
    }

    #[test]
    fn test_unary_chain() {
        let expr = parse("-+-5").unwrap();
        assert_eq!(
            expr,
            Expr::Neg(Box::new(Expr::Pos(Box::new(Expr::Neg(int(5))))))
        );
    }

    #[test]
    fn test_call_syntax() {
        let expr = parse("2(3)").unwrap();
        assert_eq!(
            expr,
            Expr::Call {
                callee: int(2),
                arg: Some(int(3)),
            }
        );
        assert!(matches!(parse("(1)()"), Ok(Expr::Call { arg: None, .. })));
    }

    #[test]
    fn test_malformed() {
        for input in ["(1+2", "1+2)", "1+", "*2", "1 2", "()", "2**3", "7//2", "1.2.3"] {
            assert_eq!(parse(input), Err(EvalError::InvalidSyntax), "{input}");
        }
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}1{}", "(".repeat(1000), ")".repeat(1000));
        assert_eq!(parse(&deep), Err(EvalError::InvalidSyntax));

        let shallow = format!("{}1{}", "(".repeat(50), ")".repeat(50));
        assert!(parse(&shallow).is_ok());
    }

    #[test]
    fn test_syntax_error_wins_over_runtime_error() {
        // Parsing fails before (1-1) is ever divided by.
        assert_eq!(parse("5/(1-1)+"), Err(EvalError::InvalidSyntax));
    }
}
