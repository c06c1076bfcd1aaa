use std::fmt;

use crate::frontend::{expression::Expression, statement::Statement};

/// Braced statement list; also the body of every lambda literal.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

impl Block {
    /// Body of an expression-bodied lambda: `(x) -> x + 1`.
    pub fn from_expression(expression: Expression) -> Self {
        Self {
            statements: vec![Statement::Expression { expression }],
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{ ")?;
        for statement in &self.statements {
            write!(f, "{} ", statement)?;
        }
        f.write_str("}")
    }
}
