//! Number literal lexing (integers and floats)
//!
//! Supports:
//! - Decimal integers: 42, 1_000_000
//! - Decimal floats: 3.14, 2.5e10, 1.5e-3
//! - Hexadecimal: 0xFF, 0x1A_BC
//! - Binary: 0b1010, 0b1111_0000
//!
//! The token keeps the source text; the parser converts it.

use super::Lexer;

impl Lexer {
    /// Returns the literal text and whether it is a float.
    pub(super) fn read_number(&mut self) -> (String, bool) {
        let start = self.position;

        if self.current_char == Some('0') && matches!(self.peek_char(), Some('x' | 'X' | 'b' | 'B'))
        {
            self.read_char(); // '0'
            self.read_char(); // radix marker
            while self
                .current_char
                .is_some_and(|c| c.is_ascii_hexdigit() || c == '_')
            {
                self.read_char();
            }
            return (self.input[start..self.position].iter().collect(), false);
        }

        self.consume_decimal_run();
        let mut is_float = false;

        // `1..5` is a range, not a float.
        if self.current_char == Some('.') && self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.read_char();
            self.consume_decimal_run();
        }

        if matches!(self.current_char, Some('e' | 'E')) {
            let after = self.peek_char();
            let signed_digit = matches!(after, Some('+' | '-'))
                && self
                    .input
                    .get(self.read_position + 1)
                    .is_some_and(|c| c.is_ascii_digit());
            if after.is_some_and(|c| c.is_ascii_digit()) || signed_digit {
                is_float = true;
                self.read_char();
                if matches!(self.current_char, Some('+' | '-')) {
                    self.read_char();
                }
                self.consume_decimal_run();
            }
        }

        (self.input[start..self.position].iter().collect(), is_float)
    }

    fn consume_decimal_run(&mut self) {
        while self
            .current_char
            .is_some_and(|c| c.is_ascii_digit() || c == '_')
        {
            self.read_char();
        }
    }
}
