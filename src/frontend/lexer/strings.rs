//! String and byte-string literal lexing

use crate::frontend::token::Token;
use crate::frontend::token_type::TokenType;

use super::{Lexer, LexerWarning};

impl Lexer {
    /// Reads a literal starting at its opening quote.
    ///
    /// For byte strings every byte of the cooked contents is stored as the
    /// `char` with the same code point (0..=255).
    pub(super) fn read_string(&mut self, bytes: bool) -> Token {
        let start = self.cursor_position();
        // A byte string's position is that of its `b` prefix.
        let (line, column) = if bytes {
            (start.line, start.column.saturating_sub(1))
        } else {
            (start.line, start.column)
        };
        self.read_char(); // opening quote

        let mut content = String::new();
        loop {
            match self.current_char {
                None | Some('\n') => {
                    return Token::new(TokenType::UnterminatedString, content, line, column);
                }
                Some('"') => {
                    self.read_char();
                    break;
                }
                Some('\\') => {
                    self.read_char();
                    if let Some(ch) = self.read_escape_sequence(bytes) {
                        content.push(ch);
                    }
                }
                Some(ch) => {
                    if bytes && !ch.is_ascii() {
                        let mut buf = [0u8; 4];
                        content.extend(ch.encode_utf8(&mut buf).bytes().map(char::from));
                    } else {
                        content.push(ch);
                    }
                    self.read_char();
                }
            }
        }

        let token_type = if bytes {
            TokenType::Bytes
        } else {
            TokenType::String
        };
        Token::new(token_type, content, line, column)
    }

    /// Process an escape sequence after seeing backslash
    fn read_escape_sequence(&mut self, bytes: bool) -> Option<char> {
        let result = match self.current_char {
            Some('n') => Some('\n'),
            Some('t') => Some('\t'),
            Some('r') => Some('\r'),
            Some('0') => Some('\0'),
            Some('\\') => Some('\\'),
            Some('"') => Some('"'),
            Some('x') if bytes => return self.read_hex_escape(),
            Some(c) => {
                // Unknown escape - emit warning and return the character as-is
                self.warnings.push(LexerWarning {
                    message: format!(
                        "Unknown escape sequence '\\{}'. Valid escapes are: \\n \\t \\r \\0 \\\\ \\\"",
                        c
                    ),
                    position: self.cursor_position(),
                });
                Some(c)
            }
            None => None,
        };
        if self.current_char.is_some() {
            self.read_char();
        }
        result
    }

    /// `\xNN` inside a byte string; the cursor is on the `x`.
    fn read_hex_escape(&mut self) -> Option<char> {
        let position = self.cursor_position();
        self.read_char(); // 'x'
        let mut value = 0u32;
        for _ in 0..2 {
            match self.current_char.and_then(|c| c.to_digit(16)) {
                Some(digit) => {
                    value = value * 16 + digit;
                    self.read_char();
                }
                None => {
                    self.warnings.push(LexerWarning {
                        message: "Invalid \\x escape: expected two hex digits".to_string(),
                        position,
                    });
                    return None;
                }
            }
        }
        char::from_u32(value)
    }
}
