use crate::frontend::{
    block::Block,
    diagnostic::Diagnostic,
    error_codes::{INVALID_NAMED_PAIR, INVALID_PARAMETER},
    expression::{Expression, Parameter},
    position::Position,
    precedence::{Precedence, rhs_precedence_for_infix},
    token_type::TokenType,
};

use super::Parser;

impl Parser {
    pub(super) fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let mut left = self.parse_prefix()?;

        while !self.is_peek_token(TokenType::Semicolon) && precedence < self.peek_precedence() {
            self.next_token();
            left = self.parse_infix(left)?;
        }

        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expression> {
        let position = self.current_token.position;
        match self.current_token.token_type {
            TokenType::Ident => self.parse_identifier(),
            TokenType::Int => self.parse_integer(),
            TokenType::Float => self.parse_float(),
            TokenType::String => self.parse_string(),
            TokenType::Bytes => self.parse_bytes(),
            TokenType::True | TokenType::False => Some(Expression::Boolean {
                value: self.is_current_token(TokenType::True),
                position,
            }),
            TokenType::Null => Some(Expression::Null { position }),
            TokenType::Bang | TokenType::Minus => self.parse_prefix_expression(),
            TokenType::LParen => self.parse_parenthesized(),
            _ => {
                self.no_prefix_parse_error();
                None
            }
        }
    }

    fn parse_infix(&mut self, left: Expression) -> Option<Expression> {
        match self.current_token.token_type {
            TokenType::LParen => self.parse_call_expression(left),
            TokenType::LBracket => self.parse_index_expression(left),
            TokenType::Dot => self.parse_member_access(left),
            TokenType::FatArrow => self.parse_named_expression(left),
            _ => self.parse_infix_expression(left),
        }
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let position = self.current_token.position;
        let operator = self.current_token.token_type.to_string();
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expression::Prefix {
            operator,
            right: Box::new(right),
            position,
        })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let token_type = self.current_token.token_type;
        let position = self.current_token.position;
        let precedence = rhs_precedence_for_infix(&token_type).unwrap_or(Precedence::Lowest);
        self.next_token();
        let right = self.parse_expression(precedence)?;
        Some(Expression::Infix {
            left: Box::new(left),
            // `and`, `or` share the token type (and display) of `&&`, `||`.
            operator: token_type.to_string(),
            right: Box::new(right),
            position,
        })
    }

    fn parse_named_expression(&mut self, left: Expression) -> Option<Expression> {
        let position = left.position();
        let name = match left {
            Expression::Identifier { name, .. } | Expression::String { value: name, .. } => name,
            other => {
                self.errors.push(
                    Diagnostic::from_code(&INVALID_NAMED_PAIR)
                        .with_position(position)
                        .with_message(format!(
                            "The left side of `=>` must be a name or string, got `{}`.",
                            other
                        )),
                );
                return None;
            }
        };
        let precedence =
            rhs_precedence_for_infix(&TokenType::FatArrow).unwrap_or(Precedence::Lowest);
        self.next_token();
        let value = self.parse_expression(precedence)?;
        Some(Expression::Named {
            name,
            value: Box::new(value),
            position,
        })
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let position = self.current_token.position;
        let arguments = self.parse_expression_list(TokenType::RParen)?;
        Some(Expression::Call {
            function: Box::new(function),
            arguments,
            position,
        })
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        let position = self.current_token.position;
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenType::RBracket) {
            return None;
        }
        Some(Expression::Index {
            left: Box::new(left),
            index: Box::new(index),
            position,
        })
    }

    fn parse_member_access(&mut self, object: Expression) -> Option<Expression> {
        let position = self.current_token.position;
        if !self.expect_peek(TokenType::Ident) {
            return None;
        }
        Some(Expression::MemberAccess {
            object: Box::new(object),
            member: self.current_token.literal.clone(),
            position,
        })
    }

    /// `(e)`, `()`, `(a,)`, `(a, b)`, or a lambda `(params) -> body`.
    fn parse_parenthesized(&mut self) -> Option<Expression> {
        let position = self.current_token.position;
        let mut elements = Vec::new();
        let mut is_tuple = true;

        if self.is_peek_token(TokenType::RParen) {
            self.next_token();
        } else {
            self.next_token();
            elements.push(self.parse_expression(Precedence::Lowest)?);
            if self.is_peek_token(TokenType::Comma) {
                while self.is_peek_token(TokenType::Comma) {
                    self.next_token();
                    if self.is_peek_token(TokenType::RParen) {
                        break;
                    }
                    self.next_token();
                    elements.push(self.parse_expression(Precedence::Lowest)?);
                }
            } else {
                is_tuple = false;
            }
            if !self.expect_peek(TokenType::RParen) {
                return None;
            }
        }

        if self.is_peek_token(TokenType::Arrow) {
            self.next_token();
            return self.parse_lambda(elements, position);
        }

        if is_tuple {
            Some(Expression::Tuple { elements, position })
        } else {
            elements.pop()
        }
    }

    fn parse_lambda(&mut self, heads: Vec<Expression>, position: Position) -> Option<Expression> {
        let mut parameters = Vec::with_capacity(heads.len());
        for head in heads {
            match head {
                Expression::Identifier { name, .. } => {
                    parameters.push(Parameter {
                        name,
                        default: None,
                    });
                }
                Expression::Named { name, value, .. } if is_literal(&value) => {
                    parameters.push(Parameter {
                        name,
                        default: Some(*value),
                    });
                }
                other => {
                    self.errors.push(
                        Diagnostic::from_code(&INVALID_PARAMETER)
                            .with_position(other.position())
                            .with_message(format!(
                                "Lambda parameters are names or `name => literal`, got `{}`.",
                                other
                            )),
                    );
                    return None;
                }
            }
        }

        let body = if self.is_peek_token(TokenType::LBrace) {
            self.next_token();
            self.parse_block()
        } else {
            self.next_token();
            let expression = self.parse_expression(Precedence::Named)?;
            Block::from_expression(expression)
        };

        Some(Expression::Lambda {
            parameters,
            body,
            position,
        })
    }
}

fn is_literal(expression: &Expression) -> bool {
    match expression {
        Expression::Integer { .. }
        | Expression::Float { .. }
        | Expression::String { .. }
        | Expression::Bytes { .. }
        | Expression::Boolean { .. }
        | Expression::Null { .. } => true,
        Expression::Prefix {
            operator, right, ..
        } => {
            operator == "-"
                && matches!(
                    right.as_ref(),
                    Expression::Integer { .. } | Expression::Float { .. }
                )
        }
        _ => false,
    }
}
