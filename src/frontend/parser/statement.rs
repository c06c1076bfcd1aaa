use crate::frontend::{
    block::Block, precedence::Precedence, statement::Statement, token_type::TokenType,
};

use super::Parser;

impl Parser {
    pub(super) fn parse_statement(&mut self) -> Option<Statement> {
        match self.current_token.token_type {
            TokenType::Required => self.parse_required_statement(),
            TokenType::While => self.parse_while_statement(),
            TokenType::If => self.parse_if_statement(),
            TokenType::Return => self.parse_return_statement(),
            TokenType::Break | TokenType::Continue => self.parse_loop_control_statement(),
            TokenType::Semicolon => None,
            TokenType::Ident if self.is_peek_token(TokenType::Define) => {
                self.parse_binding_statement(true)
            }
            TokenType::Ident if self.is_peek_token(TokenType::Assign) => {
                self.parse_binding_statement(false)
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_required_statement(&mut self) -> Option<Statement> {
        let position = self.current_token.position;
        if !self.expect_peek(TokenType::Ident) {
            self.synchronize_after_error();
            return None;
        }
        let name = self.current_token.literal.clone();
        self.expect_statement_end().then_some(Statement::Required { name, position })
    }

    /// `NAME := value` when `define`, else `NAME = value`.
    fn parse_binding_statement(&mut self, define: bool) -> Option<Statement> {
        let position = self.current_token.position;
        let name = self.current_token.literal.clone();
        self.next_token(); // `:=` or `=`
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_statement_end() {
            return None;
        }
        Some(if define {
            Statement::Define {
                name,
                value,
                position,
            }
        } else {
            Statement::Assign {
                name,
                value,
                position,
            }
        })
    }

    fn parse_while_statement(&mut self) -> Option<Statement> {
        let position = self.current_token.position;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenType::LBrace) {
            return None;
        }
        let body = self.parse_block();
        Some(Statement::While {
            condition,
            body,
            position,
        })
    }

    fn parse_if_statement(&mut self) -> Option<Statement> {
        let position = self.current_token.position;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenType::LBrace) {
            return None;
        }
        let consequence = self.parse_block();

        let alternative = if self.is_peek_token(TokenType::Else) {
            self.next_token();
            if self.is_peek_token(TokenType::If) {
                self.next_token();
                let nested = self.parse_if_statement()?;
                Some(Block {
                    statements: vec![nested],
                })
            } else {
                if !self.expect_peek(TokenType::LBrace) {
                    return None;
                }
                Some(self.parse_block())
            }
        } else {
            None
        };

        Some(Statement::If {
            condition,
            consequence,
            alternative,
            position,
        })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        let position = self.current_token.position;
        let value = if matches!(
            self.peek_token.token_type,
            TokenType::Semicolon | TokenType::RBrace | TokenType::Eof
        ) {
            None
        } else {
            self.next_token();
            Some(self.parse_expression(Precedence::Lowest)?)
        };
        if !self.expect_statement_end() {
            return None;
        }
        Some(Statement::Return { value, position })
    }

    fn parse_loop_control_statement(&mut self) -> Option<Statement> {
        let position = self.current_token.position;
        let statement = if self.is_current_token(TokenType::Break) {
            Statement::Break { position }
        } else {
            Statement::Continue { position }
        };
        self.expect_statement_end().then_some(statement)
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expression = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_statement_end() {
            return None;
        }
        Some(Statement::Expression { expression })
    }
}
