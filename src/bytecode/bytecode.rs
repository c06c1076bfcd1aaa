use crate::bytecode::{constant::Constant, debug_info::FunctionDebugInfo, op_code::Instructions};

/// A compiled program or script-lambda body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bytecode {
    pub instructions: Instructions,
    pub constants: Vec<Constant>,
    /// Binding names referenced by name-carrying instructions.
    pub names: Vec<String>,
    /// `@required` names in declaration order, without duplicates.
    pub required: Vec<String>,
    /// Parameter names of a script lambda; empty for a top-level program.
    pub parameters: Vec<String>,
    pub debug_info: Option<FunctionDebugInfo>,
}
