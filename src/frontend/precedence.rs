use std::sync::LazyLock;

use crate::frontend::token_type::TokenType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Named,       // name => value
    LogicalOr,   // || or
    LogicalAnd,  // && and
    Equals,      // ==, !=
    LessGreater, // <, >, <=, >=
    Range,       // a..b
    Sum,         // +, -
    Product,     // *, /, %
    Prefix,      // -x, !x, not x
    Call,        // fn(x)
    Index,       // t[i], t.name
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixity {
    Prefix,
    Infix,
    Postfix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpInfo {
    pub token: TokenType,
    pub precedence: Precedence,
    pub associativity: Assoc,
    pub fixity: Fixity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfixInfo {
    pub precedence: Precedence,
    pub associativity: Assoc,
    pub fixity: Fixity,
}

const fn infix(token: TokenType, precedence: Precedence) -> OpInfo {
    OpInfo {
        token,
        precedence,
        associativity: Assoc::Left,
        fixity: Fixity::Infix,
    }
}

const fn postfix(token: TokenType, precedence: Precedence) -> OpInfo {
    OpInfo {
        token,
        precedence,
        associativity: Assoc::Left,
        fixity: Fixity::Postfix,
    }
}

const fn prefix(token: TokenType) -> OpInfo {
    OpInfo {
        token,
        precedence: Precedence::Prefix,
        associativity: Assoc::Right,
        fixity: Fixity::Prefix,
    }
}

// Single source of truth for operator precedence + associativity.
pub const OPERATOR_TABLE: &[OpInfo] = &[
    // Infix operators
    OpInfo {
        token: TokenType::FatArrow,
        precedence: Precedence::Named,
        associativity: Assoc::Right,
        fixity: Fixity::Infix,
    },
    infix(TokenType::Or, Precedence::LogicalOr),
    infix(TokenType::And, Precedence::LogicalAnd),
    infix(TokenType::Eq, Precedence::Equals),
    infix(TokenType::NotEq, Precedence::Equals),
    infix(TokenType::Lt, Precedence::LessGreater),
    infix(TokenType::Gt, Precedence::LessGreater),
    infix(TokenType::Lte, Precedence::LessGreater),
    infix(TokenType::Gte, Precedence::LessGreater),
    infix(TokenType::DotDot, Precedence::Range),
    infix(TokenType::Plus, Precedence::Sum),
    infix(TokenType::Minus, Precedence::Sum),
    infix(TokenType::Asterisk, Precedence::Product),
    infix(TokenType::Slash, Precedence::Product),
    infix(TokenType::Percent, Precedence::Product),
    // Postfix operators handled by Pratt infix dispatch
    postfix(TokenType::LParen, Precedence::Call),
    postfix(TokenType::LBracket, Precedence::Index),
    postfix(TokenType::Dot, Precedence::Index),
    // Prefix operators
    prefix(TokenType::Bang),
    prefix(TokenType::Minus),
];

pub static INFIX_TABLE: LazyLock<[Option<InfixInfo>; TokenType::COUNT]> = LazyLock::new(|| {
    let mut table = [None; TokenType::COUNT];
    for info in OPERATOR_TABLE {
        match info.fixity {
            Fixity::Infix | Fixity::Postfix => {
                let index = info.token.as_usize();
                debug_assert!(
                    table[index].is_none(),
                    "duplicate infix/postfix operator table entry for token {:?}",
                    info.token
                );
                table[index] = Some(InfixInfo {
                    precedence: info.precedence,
                    associativity: info.associativity,
                    fixity: info.fixity,
                });
            }
            Fixity::Prefix => {}
        }
    }
    table
});

pub fn infix_op(token_type: &TokenType) -> Option<InfixInfo> {
    INFIX_TABLE[token_type.as_usize()]
}

pub fn is_prefix_op(token_type: &TokenType) -> bool {
    OPERATOR_TABLE
        .iter()
        .any(|info| info.fixity == Fixity::Prefix && info.token == *token_type)
}

fn precedence_below(precedence: &Precedence) -> Precedence {
    match precedence {
        Precedence::Lowest => Precedence::Lowest,
        Precedence::Named => Precedence::Lowest,
        Precedence::LogicalOr => Precedence::Named,
        Precedence::LogicalAnd => Precedence::LogicalOr,
        Precedence::Equals => Precedence::LogicalAnd,
        Precedence::LessGreater => Precedence::Equals,
        Precedence::Range => Precedence::LessGreater,
        Precedence::Sum => Precedence::Range,
        Precedence::Product => Precedence::Sum,
        Precedence::Prefix => Precedence::Product,
        Precedence::Call => Precedence::Prefix,
        Precedence::Index => Precedence::Call,
    }
}

/// Precedence used to parse the right operand of an infix operator.
pub fn rhs_precedence_for_infix(token_type: &TokenType) -> Option<Precedence> {
    let op = infix_op(token_type)?;
    Some(match op.associativity {
        Assoc::Left => op.precedence,
        Assoc::Right => precedence_below(&op.precedence),
    })
}

pub fn token_precedence(token_type: &TokenType) -> Precedence {
    infix_op(token_type)
        .map(|op| op.precedence)
        .unwrap_or(Precedence::Lowest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_binds_loosest_and_is_right_associative() {
        assert!(token_precedence(&TokenType::FatArrow) < token_precedence(&TokenType::Or));
        assert_eq!(
            rhs_precedence_for_infix(&TokenType::FatArrow),
            Some(Precedence::Lowest)
        );
        assert_eq!(
            rhs_precedence_for_infix(&TokenType::Plus),
            Some(Precedence::Sum)
        );
    }

    #[test]
    fn range_sits_between_comparison_and_sum() {
        let range = token_precedence(&TokenType::DotDot);
        assert!(range > token_precedence(&TokenType::Lt));
        assert!(range < token_precedence(&TokenType::Plus));
    }

    #[test]
    fn prefix_operators() {
        assert!(is_prefix_op(&TokenType::Bang));
        assert!(is_prefix_op(&TokenType::Minus));
        assert!(!is_prefix_op(&TokenType::Plus));
    }
}
