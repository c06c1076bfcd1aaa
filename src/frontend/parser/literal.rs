use crate::frontend::{
    diagnostic::Diagnostic, error_codes::INVALID_NUMBER, expression::Expression,
};

use super::Parser;

impl Parser {
    pub(super) fn parse_identifier(&mut self) -> Option<Expression> {
        Some(Expression::Identifier {
            name: self.current_token.literal.clone(),
            position: self.current_token.position,
        })
    }

    pub(super) fn parse_integer(&mut self) -> Option<Expression> {
        let position = self.current_token.position;
        match parse_int_literal(&self.current_token.literal) {
            Some(value) => Some(Expression::Integer { value, position }),
            None => {
                self.invalid_number("an integer");
                None
            }
        }
    }

    pub(super) fn parse_float(&mut self) -> Option<Expression> {
        let position = self.current_token.position;
        match self.current_token.literal.replace('_', "").parse::<f64>() {
            Ok(value) => Some(Expression::Float { value, position }),
            Err(_) => {
                self.invalid_number("a float");
                None
            }
        }
    }

    pub(super) fn parse_string(&mut self) -> Option<Expression> {
        Some(Expression::String {
            value: self.current_token.literal.clone(),
            position: self.current_token.position,
        })
    }

    pub(super) fn parse_bytes(&mut self) -> Option<Expression> {
        // The lexer stores each byte as the char with the same code point.
        Some(Expression::Bytes {
            value: self.current_token.literal.chars().map(|c| c as u8).collect(),
            position: self.current_token.position,
        })
    }

    fn invalid_number(&mut self, what: &str) {
        self.errors.push(
            Diagnostic::from_code(&INVALID_NUMBER)
                .with_position(self.current_token.position)
                .with_message(format!(
                    "Could not parse `{}` as {}.",
                    self.current_token.literal, what
                )),
        );
    }
}

/// Decimal, `0x` hex or `0b` binary, with `_` separators.
fn parse_int_literal(literal: &str) -> Option<i64> {
    let digits = literal.replace('_', "");
    let (radix, body) = match digits.get(..2) {
        Some("0x" | "0X") => (16, &digits[2..]),
        Some("0b" | "0B") => (2, &digits[2..]),
        _ => (10, digits.as_str()),
    };
    if body.is_empty() {
        return None;
    }
    i64::from_str_radix(body, radix).ok()
}
