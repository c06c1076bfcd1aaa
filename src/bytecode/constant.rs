use std::{fmt, rc::Rc};

use crate::bytecode::bytecode::Bytecode;

/// Compile-time constant referenced by `OpConstant` and `OpLambda`.
///
/// Constants are plain data; the VM mints a fresh heap value each time one
/// is pushed, so a program never holds heap handles.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Integer(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Body of a script lambda.
    Function(Rc<Bytecode>),
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Integer(v) => write!(f, "{}", v),
            Constant::Float(v) => write!(f, "{}", v),
            Constant::String(v) => write!(f, "{:?}", v),
            Constant::Bytes(v) => write!(f, "b{:?}", String::from_utf8_lossy(v)),
            Constant::Function(program) => {
                write!(f, "<function/{}>", program.parameters.join(","))
            }
        }
    }
}
