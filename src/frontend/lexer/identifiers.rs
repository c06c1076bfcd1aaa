use crate::frontend::{
    token::Token,
    token_type::{TokenType, lookup_ident},
};

use super::Lexer;

/// ASCII letter or underscore.
pub(super) fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

impl Lexer {
    pub(super) fn read_identifier(&mut self) -> String {
        let start = self.position;
        while self
            .current_char
            .is_some_and(|c| is_ident_start(c) || c.is_ascii_digit())
        {
            self.read_char();
        }
        self.input[start..self.position].iter().collect()
    }

    /// Identifier or keyword starting at the current character.
    pub(super) fn read_word(&mut self, line: usize, col: usize) -> Token {
        let ident = self.read_identifier();
        Token::new(lookup_ident(&ident), ident, line, col)
    }

    /// `@name` declaration; only `@required` is known.
    pub(super) fn read_declaration(&mut self, line: usize, col: usize) -> Token {
        self.read_char();
        let ident = self.read_identifier();
        let token_type = match ident.as_str() {
            "required" => TokenType::Required,
            _ => TokenType::Illegal,
        };
        Token::new(token_type, format!("@{}", ident), line, col)
    }
}
