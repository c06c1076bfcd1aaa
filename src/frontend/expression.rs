use std::fmt;

use crate::frontend::{block::Block, position::Position};

/// A lambda parameter: `name` or `name => literal`.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub default: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier {
        name: String,
        position: Position,
    },
    Integer {
        value: i64,
        position: Position,
    },
    Float {
        value: f64,
        position: Position,
    },
    String {
        value: String,
        position: Position,
    },
    Bytes {
        value: Vec<u8>,
        position: Position,
    },
    Boolean {
        value: bool,
        position: Position,
    },
    Null {
        position: Position,
    },
    Prefix {
        operator: String,
        right: Box<Expression>,
        position: Position,
    },
    Infix {
        left: Box<Expression>,
        operator: String,
        right: Box<Expression>,
        position: Position,
    },
    /// `name => value`
    Named {
        name: String,
        value: Box<Expression>,
        position: Position,
    },
    Tuple {
        elements: Vec<Expression>,
        position: Position,
    },
    Lambda {
        parameters: Vec<Parameter>,
        body: Block,
        position: Position,
    },
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
        position: Position,
    },
    Index {
        left: Box<Expression>,
        index: Box<Expression>,
        position: Position,
    },
    MemberAccess {
        object: Box<Expression>,
        member: String,
        position: Position,
    },
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier { name, .. } => write!(f, "{}", name),
            Expression::Integer { value, .. } => write!(f, "{}", value),
            Expression::Float { value, .. } => write!(f, "{:?}", value),
            Expression::String { value, .. } => write!(f, "{:?}", value),
            Expression::Bytes { value, .. } => {
                write!(f, "b\"")?;
                for byte in value {
                    match byte {
                        b'"' => write!(f, "\\\"")?,
                        b'\\' => write!(f, "\\\\")?,
                        32..=126 => write!(f, "{}", *byte as char)?,
                        _ => write!(f, "\\x{:02x}", byte)?,
                    }
                }
                write!(f, "\"")
            }
            Expression::Boolean { value, .. } => write!(f, "{}", value),
            Expression::Null { .. } => write!(f, "null"),
            Expression::Prefix {
                operator, right, ..
            } => {
                write!(f, "({}{})", operator, right)
            }
            Expression::Infix {
                left,
                operator,
                right,
                ..
            } => {
                write!(f, "({} {} {})", left, operator, right)
            }
            Expression::Named { name, value, .. } => write!(f, "({} => {})", name, value),
            Expression::Tuple { elements, .. } => {
                let elems: Vec<String> = elements.iter().map(|e| e.to_string()).collect();
                if elems.len() == 1 {
                    write!(f, "({},)", elems[0])
                } else {
                    write!(f, "({})", elems.join(", "))
                }
            }
            Expression::Lambda {
                parameters, body, ..
            } => {
                let params: Vec<String> = parameters.iter().map(|p| p.to_string()).collect();
                write!(f, "({}) -> {}", params.join(", "), body)
            }
            Expression::Call {
                function,
                arguments,
                ..
            } => {
                let args: Vec<String> = arguments.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", function, args.join(", "))
            }
            Expression::Index { left, index, .. } => {
                write!(f, "({}[{}])", left, index)
            }
            Expression::MemberAccess { object, member, .. } => {
                write!(f, "{}.{}", object, member)
            }
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.default {
            Some(default) => write!(f, "{} => {}", self.name, default),
            None => write!(f, "{}", self.name),
        }
    }
}

impl Expression {
    pub fn position(&self) -> Position {
        match self {
            Expression::Identifier { position, .. }
            | Expression::Integer { position, .. }
            | Expression::Float { position, .. }
            | Expression::String { position, .. }
            | Expression::Bytes { position, .. }
            | Expression::Boolean { position, .. }
            | Expression::Null { position }
            | Expression::Prefix { position, .. }
            | Expression::Infix { position, .. }
            | Expression::Named { position, .. }
            | Expression::Tuple { position, .. }
            | Expression::Lambda { position, .. }
            | Expression::Call { position, .. }
            | Expression::Index { position, .. }
            | Expression::MemberAccess { position, .. } => *position,
        }
    }
}
