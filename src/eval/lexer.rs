//! Tokenizer for arithmetic expressions.
//!
//! The lexer only ever sees text that already passed the character-set check,
//! so every byte is one of `0-9 + - * / ( ) .` or a space. Spaces separate
//! tokens and are otherwise dropped.

use crate::eval::parser::SyntaxError;

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Integer literal, kept as text so overflow can be classified later
    Int(String),
    /// Literal containing a decimal point
    Float(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

/// Splits an expression into tokens.
///
/// Number literals are scanned greedily: a run of digits with at most one
/// `.`. So `1.2.3` lexes as `1.2` followed by `.3`, which the parser then
/// rejects as two adjacent operands.
pub fn tokenize(input: &str) -> Result<Vec<Token>, SyntaxError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let token = match bytes[pos] {
            b' ' => {
                pos += 1;
                continue;
            }
            b'+' => Token::Plus,
            b'-' => Token::Minus,
            b'*' => Token::Star,
            b'/' => Token::Slash,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b'0'..=b'9' | b'.' => {
                let (token, consumed) = scan_number(&bytes[pos..])?;
                tokens.push(token);
                pos += consumed;
                continue;
            }
            other => return Err(SyntaxError::UnexpectedByte(other)),
        };

        tokens.push(token);
        pos += 1;
    }

    Ok(tokens)
}

/// Scans one number literal from the start of `buf`.
fn scan_number(buf: &[u8]) -> Result<(Token, usize), SyntaxError> {
    let mut end = 0;
    let mut seen_dot = false;

    while end < buf.len() {
        match buf[end] {
            b'0'..=b'9' => end += 1,
            b'.' if !seen_dot => {
                seen_dot = true;
                end += 1;
            }
            _ => break,
        }
    }

    // All bytes are ASCII here.
    let text = std::str::from_utf8(&buf[..end]).map_err(|_| SyntaxError::MalformedNumber)?;

    if !text.bytes().any(|b| b.is_ascii_digit()) {
        return Err(SyntaxError::MalformedNumber);
    }

    if seen_dot {
        let value: f64 = text.parse().map_err(|_| SyntaxError::MalformedNumber)?;
        return Ok((Token::Float(value), end));
    }

    // Decimal integers may not carry leading zeros, except for an all-zero run.
    if text.len() > 1 && text.starts_with('0') && text.bytes().any(|b| b != b'0') {
        return Err(SyntaxError::LeadingZero);
    }

    Ok((Token::Int(text.to_string()), end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_operators() {
        let tokens = tokenize("( + - * / )").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::LParen,
                Token::Plus,
                Token::Minus,
                Token::Star,
                Token::Slash,
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_tokenize_numbers() {
        let tokens = tokenize("12+3.5*.25-7.").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Int("12".to_string()),
                Token::Plus,
                Token::Float(3.5),
                Token::Star,
                Token::Float(0.25),
                Token::Minus,
                Token::Float(7.0),
            ]
        );
    }

    #[test]
    fn test_spaces_split_numbers() {
        let tokens = tokenize("1 2").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Int("1".to_string()), Token::Int("2".to_string())]
        );
    }

    #[test]
    fn test_second_dot_starts_new_number() {
        let tokens = tokenize("1.2.3").unwrap();
        assert_eq!(tokens, vec![Token::Float(1.2), Token::Float(0.3)]);
    }

    #[test]
    fn test_lone_dot_rejected() {
        assert_eq!(tokenize("1+."), Err(SyntaxError::MalformedNumber));
    }

    #[test]
    fn test_leading_zero() {
        assert_eq!(tokenize("007"), Err(SyntaxError::LeadingZero));
        assert_eq!(tokenize("00").unwrap(), vec![Token::Int("00".to_string())]);
        assert_eq!(tokenize("05.5").unwrap(), vec![Token::Float(5.5)]);
    }
}
