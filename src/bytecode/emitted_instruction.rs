use crate::bytecode::op_code::OpCode;

/// Opcode and offset of the most recent instruction written to a scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmittedInstruction {
    pub opcode: Option<OpCode>,
    pub position: usize,
}
