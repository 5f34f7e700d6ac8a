//! Numeric values and their canonical rendering.
//!
//! Integer-only arithmetic stays exact in a `BigInt`, however large the
//! result. True division and any operation touching a float convert to
//! `f64`; an integer too large for that conversion is an overflow.

use crate::eval::EvalError;
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

/// Significant digits used when rendering non-integral floats.
pub const SIGNIFICANT_DIGITS: usize = 10;

/// An intermediate or final arithmetic value.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Int(BigInt),
    Float(f64),
}

impl Number {
    fn to_f64(&self) -> Result<f64, EvalError> {
        match self {
            Number::Int(n) => n.to_f64().filter(|f| f.is_finite()).ok_or(OVERFLOW),
            Number::Float(f) => Ok(*f),
        }
    }

    pub fn neg(self) -> Result<Number, EvalError> {
        match self {
            Number::Int(n) => Ok(Number::Int(-n)),
            Number::Float(f) => Ok(Number::Float(-f)),
        }
    }

    pub fn add(self, rhs: Number) -> Result<Number, EvalError> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => Ok(Number::Int(a + b)),
            (a, b) => Ok(Number::Float(a.to_f64()? + b.to_f64()?)),
        }
    }

    pub fn sub(self, rhs: Number) -> Result<Number, EvalError> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => Ok(Number::Int(a - b)),
            (a, b) => Ok(Number::Float(a.to_f64()? - b.to_f64()?)),
        }
    }

    pub fn mul(self, rhs: Number) -> Result<Number, EvalError> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => Ok(Number::Int(a * b)),
            (a, b) => Ok(Number::Float(a.to_f64()? * b.to_f64()?)),
        }
    }

    /// True division. Always yields a float.
    ///
    /// A zero integer divisor is reported before either operand is converted.
    pub fn div(self, rhs: Number) -> Result<Number, EvalError> {
        if let Number::Int(b) = &rhs {
            if b.is_zero() {
                return Err(EvalError::DivisionByZero);
            }
        }

        let divisor = rhs.to_f64()?;
        let dividend = self.to_f64()?;
        if divisor == 0.0 {
            return Err(EvalError::DivisionByZero);
        }
        Ok(Number::Float(dividend / divisor))
    }

    /// Renders the value as response text.
    ///
    /// Integral floats print as integers; other floats follow `%.10g`.
    /// Non-finite floats cannot be rendered and are classified as errors.
    pub fn render(&self) -> Result<String, EvalError> {
        match *self {
            Number::Int(ref n) => Ok(n.to_string()),
            Number::Float(f) if f.is_nan() => Err(EvalError::Other("ValueError")),
            Number::Float(f) if f.is_infinite() => Err(OVERFLOW),
            Number::Float(f) if f == 0.0 => Ok("0".to_string()),
            Number::Float(f) if f.fract() == 0.0 => Ok(format!("{:.0}", f)),
            Number::Float(f) => Ok(format_general(f, SIGNIFICANT_DIGITS)),
        }
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::Int(BigInt::from(n))
    }
}

const OVERFLOW: EvalError = EvalError::Other("OverflowError");

/// C-style `%.{precision}g` formatting with trailing zeros removed.
pub fn format_general(value: f64, precision: usize) -> String {
    let precision = precision.max(1);

    // Round to the requested significant digits first; the exponent of the
    // rounded value decides between fixed and scientific notation.
    let sci = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some(parts) => parts,
        None => return sci,
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
