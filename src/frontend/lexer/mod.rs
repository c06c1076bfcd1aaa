//! The XLang lexer - tokenizes source code into tokens

mod identifiers;
mod numbers;
mod strings;

use crate::frontend::position::Position;
use crate::frontend::token::Token;
use crate::frontend::token_type::TokenType;

use identifiers::is_ident_start;

/// Warning emitted during lexing
#[derive(Debug, Clone)]
pub struct LexerWarning {
    pub message: String,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    read_position: usize,
    current_char: Option<char>,
    line: usize,
    column: usize,
    warnings: Vec<LexerWarning>,
}

impl Lexer {
    pub fn new(input: impl Into<String>) -> Self {
        let mut lexer = Self {
            input: input.into().chars().collect(),
            position: 0,
            read_position: 0,
            current_char: None,
            line: 1,
            column: 0,
            warnings: Vec::new(),
        };
        lexer.read_char();
        lexer
    }

    /// Get warnings collected during lexing
    pub fn warnings(&self) -> &[LexerWarning] {
        &self.warnings
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Token {
        self.skip_ignorable();

        let line = self.line;
        let col = self.column;

        let token = match self.current_char {
            // Two-character operators
            Some('=') if self.peek_char() == Some('=') => {
                self.read_char();
                Token::new(TokenType::Eq, "==", line, col)
            }
            Some('=') if self.peek_char() == Some('>') => {
                self.read_char();
                Token::new(TokenType::FatArrow, "=>", line, col)
            }
            Some(':') if self.peek_char() == Some('=') => {
                self.read_char();
                Token::new(TokenType::Define, ":=", line, col)
            }
            Some('!') if self.peek_char() == Some('=') => {
                self.read_char();
                Token::new(TokenType::NotEq, "!=", line, col)
            }
            Some('<') if self.peek_char() == Some('=') => {
                self.read_char();
                Token::new(TokenType::Lte, "<=", line, col)
            }
            Some('>') if self.peek_char() == Some('=') => {
                self.read_char();
                Token::new(TokenType::Gte, ">=", line, col)
            }
            Some('-') if self.peek_char() == Some('>') => {
                self.read_char();
                Token::new(TokenType::Arrow, "->", line, col)
            }
            Some('.') if self.peek_char() == Some('.') => {
                self.read_char();
                Token::new(TokenType::DotDot, "..", line, col)
            }
            // Logical operators
            Some('&') if self.peek_char() == Some('&') => {
                self.read_char();
                Token::new(TokenType::And, "&&", line, col)
            }
            Some('|') if self.peek_char() == Some('|') => {
                self.read_char();
                Token::new(TokenType::Or, "||", line, col)
            }
            // Single-character operators and delimiters
            Some('=') => Token::new(TokenType::Assign, "=", line, col),
            Some('!') => Token::new(TokenType::Bang, "!", line, col),
            Some('+') => Token::new(TokenType::Plus, "+", line, col),
            Some('-') => Token::new(TokenType::Minus, "-", line, col),
            Some('*') => Token::new(TokenType::Asterisk, "*", line, col),
            Some('/') => Token::new(TokenType::Slash, "/", line, col),
            Some('%') => Token::new(TokenType::Percent, "%", line, col),
            Some('<') => Token::new(TokenType::Lt, "<", line, col),
            Some('>') => Token::new(TokenType::Gt, ">", line, col),
            Some('(') => Token::new(TokenType::LParen, "(", line, col),
            Some(')') => Token::new(TokenType::RParen, ")", line, col),
            Some('{') => Token::new(TokenType::LBrace, "{", line, col),
            Some('}') => Token::new(TokenType::RBrace, "}", line, col),
            Some('[') => Token::new(TokenType::LBracket, "[", line, col),
            Some(']') => Token::new(TokenType::RBracket, "]", line, col),
            Some(',') => Token::new(TokenType::Comma, ",", line, col),
            Some(';') => Token::new(TokenType::Semicolon, ";", line, col),
            Some('.') => Token::new(TokenType::Dot, ".", line, col),

            // Declarations
            Some('@') => return self.read_declaration(line, col),

            // String and byte-string literals
            Some('"') => {
                return self.read_string(false);
            }
            Some('b') if self.peek_char() == Some('"') => {
                self.read_char();
                return self.read_string(true);
            }

            // End of file
            None => Token::new(TokenType::Eof, "", line, col),

            // Identifiers and keywords
            Some(ch) if is_ident_start(ch) => return self.read_word(line, col),

            // Numbers
            Some(ch) if ch.is_ascii_digit() => {
                let (num, is_float) = self.read_number();
                let token_type = if is_float {
                    TokenType::Float
                } else {
                    TokenType::Int
                };
                return Token::new(token_type, num, line, col);
            }

            // Illegal character
            Some(ch) => Token::new(TokenType::Illegal, ch.to_string(), line, col),
        };

        self.read_char();
        token
    }

    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let is_eof = token.token_type == TokenType::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn read_char(&mut self) {
        // Column tracks the position of current_char, so advance it before moving on.
        if self.current_char == Some('\n') {
            self.line += 1;
            self.column = 0;
        } else if self.current_char.is_some() {
            self.column += 1;
        }

        self.current_char = self.input.get(self.read_position).copied();
        self.position = self.read_position;
        self.read_position += 1;
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.read_position).copied()
    }

    fn cursor_position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn skip_ignorable(&mut self) {
        loop {
            while matches!(self.current_char, Some(' ' | '\t' | '\r' | '\n')) {
                self.read_char();
            }

            let line_comment = match self.current_char {
                Some('#') => true,
                Some('/') => self.peek_char() == Some('/'),
                _ => false,
            };
            if !line_comment {
                break;
            }
            while self.current_char.is_some() && self.current_char != Some('\n') {
                self.read_char();
            }
        }
    }
}
