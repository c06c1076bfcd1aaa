use std::fmt;

use super::position::Position;
use super::token_type::TokenType;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    /// Source text, or the cooked contents for string and byte literals.
    pub literal: String,
    pub position: Position,
}

impl Token {
    pub fn new(
        token_type: TokenType,
        literal: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            token_type,
            literal: literal.into(),
            position: Position::new(line, column),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token({}, {:?}, {})",
            self.token_type, self.literal, self.position
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_new() {
        let tok = Token::new(TokenType::While, "while", 1, 5);
        assert_eq!(tok.token_type, TokenType::While);
        assert_eq!(tok.literal, "while");
        assert_eq!(tok.position.line, 1);
        assert_eq!(tok.position.column, 5);
    }

    #[test]
    fn test_token_display() {
        let tok = Token::new(TokenType::Ident, "A", 1, 5);
        let s = format!("{}", tok);
        assert!(s.contains("\"A\""));
        assert!(s.contains("1:5"));
    }
}
