use crate::frontend::{
    block::Block,
    diagnostic::Diagnostic,
    error_codes::{EXPECTED_EXPRESSION, ILLEGAL_CHARACTER, UNEXPECTED_TOKEN, UNTERMINATED_STRING},
    expression::Expression,
    precedence::{Precedence, token_precedence},
    token_type::TokenType,
};

use super::Parser;

impl Parser {
    // Token navigation
    pub(super) fn next_token(&mut self) {
        self.current_token = std::mem::replace(&mut self.peek_token, self.lexer.next_token());
    }

    pub(super) fn is_current_token(&self, token_type: TokenType) -> bool {
        self.current_token.token_type == token_type
    }

    pub(super) fn is_peek_token(&self, token_type: TokenType) -> bool {
        self.peek_token.token_type == token_type
    }

    pub(super) fn expect_peek(&mut self, token_type: TokenType) -> bool {
        if self.is_peek_token(token_type) {
            self.next_token();
            true
        } else {
            self.peek_error(token_type);
            false
        }
    }

    /// Consumes the `;` ending a simple statement. It may be omitted before
    /// `}` and at end of input.
    pub(super) fn expect_statement_end(&mut self) -> bool {
        match self.peek_token.token_type {
            TokenType::Semicolon => {
                self.next_token();
                true
            }
            TokenType::RBrace | TokenType::Eof => true,
            _ => {
                self.peek_error(TokenType::Semicolon);
                self.synchronize_after_error();
                false
            }
        }
    }

    // Precedence helpers
    pub(super) fn peek_precedence(&self) -> Precedence {
        token_precedence(&self.peek_token.token_type)
    }

    pub(super) fn parse_block(&mut self) -> Block {
        let mut statements = Vec::new();
        self.next_token();

        while !self.is_current_token(TokenType::RBrace) && !self.is_current_token(TokenType::Eof) {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }

        if self.is_current_token(TokenType::Eof) {
            self.errors.push(
                Diagnostic::from_code(&UNEXPECTED_TOKEN)
                    .with_position(self.current_token.position)
                    .with_message("Expected `}` before end of input."),
            );
        }

        Block { statements }
    }

    pub(super) fn parse_expression_list(&mut self, end: TokenType) -> Option<Vec<Expression>> {
        let mut list = Vec::new();

        if self.is_peek_token(end) {
            self.next_token();
            return Some(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.is_peek_token(TokenType::Comma) {
            self.next_token();
            if self.is_peek_token(end) {
                break;
            }
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(end) {
            return None;
        }

        Some(list)
    }

    // Error handling
    pub(super) fn no_prefix_parse_error(&mut self) {
        let token = &self.current_token;
        let diag = match token.token_type {
            TokenType::UnterminatedString => Diagnostic::from_code(&UNTERMINATED_STRING)
                .with_message("String literal is missing its closing `\"`."),
            TokenType::Illegal => Diagnostic::from_code(&ILLEGAL_CHARACTER)
                .with_message(format!("Unexpected `{}`.", token.literal)),
            _ => Diagnostic::from_code(&EXPECTED_EXPRESSION)
                .with_message(format!("Expected an expression, got {}.", token.token_type)),
        };
        self.errors.push(diag.with_position(token.position));
    }

    pub(super) fn unexpected_current(&mut self, message: impl Into<String>) {
        self.errors.push(
            Diagnostic::from_code(&UNEXPECTED_TOKEN)
                .with_position(self.current_token.position)
                .with_message(message),
        );
    }

    pub(super) fn synchronize_after_error(&mut self) {
        // Advance to a reasonable boundary to avoid cascading errors.
        while !matches!(
            self.peek_token.token_type,
            TokenType::Semicolon | TokenType::RBrace | TokenType::Eof
        ) {
            self.next_token();
        }
        if self.is_peek_token(TokenType::Semicolon) {
            self.next_token();
        }
    }

    pub(super) fn peek_error(&mut self, expected: TokenType) {
        let mut diag = Diagnostic::from_code(&UNEXPECTED_TOKEN)
            .with_position(self.peek_token.position)
            .with_message(format!(
                "Expected {}, got {}.",
                expected, self.peek_token.token_type
            ));
        if expected == TokenType::Semicolon {
            diag = diag.with_hint("Separate statements with `;`.");
        }
        self.errors.push(diag);
    }
}
