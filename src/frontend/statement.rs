use std::fmt;

use crate::frontend::{block::Block, expression::Expression, position::Position};

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `@required NAME;`
    Required {
        name: String,
        position: Position,
    },
    /// `NAME := value;`
    Define {
        name: String,
        value: Expression,
        position: Position,
    },
    /// `NAME = value;`
    Assign {
        name: String,
        value: Expression,
        position: Position,
    },
    While {
        condition: Expression,
        body: Block,
        position: Position,
    },
    If {
        condition: Expression,
        consequence: Block,
        alternative: Option<Block>,
        position: Position,
    },
    Return {
        value: Option<Expression>,
        position: Position,
    },
    Break {
        position: Position,
    },
    Continue {
        position: Position,
    },
    Expression {
        expression: Expression,
    },
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Required { name, .. } => write!(f, "@required {};", name),
            Statement::Define { name, value, .. } => write!(f, "{} := {};", name, value),
            Statement::Assign { name, value, .. } => write!(f, "{} = {};", name, value),
            Statement::While {
                condition, body, ..
            } => write!(f, "while {} {}", condition, body),
            Statement::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                write!(f, "if {} {}", condition, consequence)?;
                if let Some(alt) = alternative {
                    write!(f, " else {}", alt)?;
                }
                Ok(())
            }
            Statement::Return { value: Some(v), .. } => write!(f, "return {};", v),
            Statement::Return { value: None, .. } => write!(f, "return;"),
            Statement::Break { .. } => write!(f, "break;"),
            Statement::Continue { .. } => write!(f, "continue;"),
            Statement::Expression { expression } => write!(f, "{}", expression),
        }
    }
}
