//! Restricted Arithmetic Evaluator
//!
//! This module turns client-supplied text into a result string. It is a pure
//! function: no I/O, no shared state, safe to call from any number of
//! connection tasks at once.
//!
//! ## Pipeline
//!
//! ```text
//!  raw text
//!     │ trim
//!     ▼
//!  empty? ─────────────────────────> EmptyExpression
//!     │
//!     ▼
//!  only 0-9 + - * / ( ) . space? ──> InvalidCharacters
//!     │
//!     ▼
//!  "/0" in space-stripped text? ───> DivisionByZero
//!     │
//!     ▼
//!  lexer ─> parser ─> Expr ────────> InvalidSyntax
//!                      │
//!                      ▼
//!                    eval ─────────> DivisionByZero / Other
//!                      │
//!                      ▼
//!                   render
//! ```
//!
//! The `/0` check is purely textual and runs before any parsing. It flags
//! `1/0.5` as a division by zero and misses `1/(0)`, which is caught later by
//! the runtime check instead. Both mechanisms are kept.
//!
//! ## Example
//!
//! ```
//! use netcalc::eval::{evaluate, response_text, EvalError};
//!
//! assert_eq!(evaluate("2*(3+4)"), Ok("14".to_string()));
//! assert_eq!(evaluate("5/0"), Err(EvalError::DivisionByZero));
//! assert_eq!(response_text(&evaluate("2+a")), "Error: Invalid characters detected");
//! ```

pub mod lexer;
pub mod number;
pub mod parser;

pub use number::Number;
pub use parser::{parse, Expr};

use thiserror::Error;

/// Characters an expression may contain after trimming.
pub const ALLOWED_CHARS: &str = "0123456789+-*/(). ";

/// Classified evaluation failures.
///
/// The `Display` text is the human-readable reason sent after `Error: `.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EvalError {
    #[error("Empty expression")]
    EmptyExpression,

    #[error("Invalid characters detected")]
    InvalidCharacters,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid syntax")]
    InvalidSyntax,

    /// Any other failure, tagged with a short category name
    #[error("{0}")]
    Other(&'static str),
}

/// Outcome of evaluating one expression: rendered value or classified error.
pub type Evaluation = Result<String, EvalError>;

/// Evaluates an arithmetic expression.
pub fn evaluate(expression: &str) -> Evaluation {
    let expression = expression.trim();

    if expression.is_empty() {
        return Err(EvalError::EmptyExpression);
    }

    if !expression.chars().all(|c| ALLOWED_CHARS.contains(c)) {
        return Err(EvalError::InvalidCharacters);
    }

    if expression.replace(' ', "").contains("/0") {
        return Err(EvalError::DivisionByZero);
    }

    parse(expression)?.eval()?.render()
}

/// Formats an evaluation as the text sent back to the client.
pub fn response_text(evaluation: &Evaluation) -> String {
    match evaluation {
        Ok(value) => value.clone(),
        Err(e) => format!("Error: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(evaluate("2+2"), Ok("4".to_string()));
        assert_eq!(evaluate("10/4"), Ok("2.5".to_string()));
        assert_eq!(evaluate("2*(3+4)"), Ok("14".to_string()));
        assert_eq!(evaluate("3*3"), Ok("9".to_string()));
        assert_eq!(evaluate("10-2*3"), Ok("4".to_string()));
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        assert_eq!(evaluate("  1 + 2 \n"), Ok("3".to_string()));
        assert_eq!(evaluate("\t7 * 6\r\n"), Ok("42".to_string()));
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(evaluate("-5+3"), Ok("-2".to_string()));
        assert_eq!(evaluate("--5"), Ok("5".to_string()));
        assert_eq!(evaluate("+4"), Ok("4".to_string()));
        assert_eq!(evaluate("-(2+3)*2"), Ok("-10".to_string()));
    }

    #[test]
    fn test_float_results() {
        assert_eq!(evaluate("1.5+1.5"), Ok("3".to_string()));
        assert_eq!(evaluate("1/3"), Ok("0.3333333333".to_string()));
        assert_eq!(evaluate(".5*3"), Ok("1.5".to_string()));
        assert_eq!(evaluate("0.1+0.2"), Ok("0.3".to_string()));
        assert_eq!(evaluate("1/100000"), Ok("1e-05".to_string()));
    }

    #[test]
    fn test_empty_expression() {
        assert_eq!(evaluate(""), Err(EvalError::EmptyExpression));
        assert_eq!(evaluate("   "), Err(EvalError::EmptyExpression));
        assert_eq!(evaluate("\n\t"), Err(EvalError::EmptyExpression));
    }

    #[test]
    fn test_invalid_characters() {
        for input in ["2+a", "2^3", "abs(1)", "1,5", "__import__('os')", "1\t+2", "2 % 3", "٣"] {
            assert_eq!(evaluate(input), Err(EvalError::InvalidCharacters), "{input}");
        }
    }

    #[test]
    fn test_division_by_zero_heuristic() {
        assert_eq!(evaluate("5/0"), Err(EvalError::DivisionByZero));
        assert_eq!(evaluate("7 / 0"), Err(EvalError::DivisionByZero));
        assert_eq!(evaluate("10/0+1"), Err(EvalError::DivisionByZero));
        // The textual check fires even though the divisor is non-zero.
        assert_eq!(evaluate("1/0.5"), Err(EvalError::DivisionByZero));
        assert_eq!(evaluate("4/05.0"), Err(EvalError::DivisionByZero));
        // ...and before syntax is looked at.
        assert_eq!(evaluate("1/0)"), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn test_runtime_division_by_zero() {
        assert_eq!(evaluate("5/(0)"), Err(EvalError::DivisionByZero));
        assert_eq!(evaluate("5/(1-1)"), Err(EvalError::DivisionByZero));
        assert_eq!(evaluate("1/(0.0*3)"), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn test_invalid_syntax() {
        for input in ["(1+2", "1+", "*3", "2**3", "8//3", "1 2", "()", ".", "007", "1..2"] {
            assert_eq!(evaluate(input), Err(EvalError::InvalidSyntax), "{input}");
        }
    }

    #[test]
    fn test_other_failures() {
        assert_eq!(evaluate("2(3)"), Err(EvalError::Other("TypeError")));
        assert_eq!(evaluate("(1+1)()"), Err(EvalError::Other("TypeError")));
    }

    #[test]
    fn test_large_integers_stay_exact() {
        assert_eq!(
            evaluate("99999999999999999999999999999999999999999*2"),
            Ok("199999999999999999999999999999999999999998".to_string())
        );
        assert_eq!(
            evaluate("170141183460469231731687303715884105727+1-1"),
            Ok("170141183460469231731687303715884105727".to_string())
        );
        // Only a conversion to float can overflow
        let expr = format!("{}+0.5", "9".repeat(400));
        assert_eq!(evaluate(&expr), Err(EvalError::Other("OverflowError")));
        let expr = format!("{}/3", "9".repeat(400));
        assert_eq!(evaluate(&expr), Err(EvalError::Other("OverflowError")));
    }

    #[test]
    fn test_float_overflow() {
        let huge = format!("{}.0", "9".repeat(300));
        let expr = format!("{huge}*{huge}");
        assert_eq!(evaluate(&expr), Err(EvalError::Other("OverflowError")));
    }

    #[test]
    fn test_idempotent() {
        for input in ["2+2", "10/4", "(1+2", "5/0", "2+a", "", "1/3"] {
            assert_eq!(evaluate(input), evaluate(input));
        }
    }

    #[test]
    fn test_response_text() {
        assert_eq!(response_text(&evaluate("2+2")), "4");
        assert_eq!(response_text(&evaluate("7/0")), "Error: Division by zero");
        assert_eq!(response_text(&evaluate("(1+2")), "Error: Invalid syntax");
        assert_eq!(response_text(&evaluate("")), "Error: Empty expression");
        assert_eq!(
            response_text(&evaluate("2+a")),
            "Error: Invalid characters detected"
        );
        assert_eq!(response_text(&evaluate("2(3)")), "Error: TypeError");
    }
}
