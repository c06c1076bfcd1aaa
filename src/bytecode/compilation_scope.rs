use std::collections::HashMap;

use crate::bytecode::{
    constant::Constant, debug_info::InstructionLocation,
    emitted_instruction::EmittedInstruction, op_code::Instructions,
};

/// Jump bookkeeping for one enclosing `while`.
#[derive(Debug, Clone)]
pub struct LoopContext {
    pub start: usize,
    pub break_jumps: Vec<usize>,
}

/// Everything being emitted for one program or lambda body.
#[derive(Debug, Clone, Default)]
pub struct CompilationScope {
    pub instructions: Instructions,
    pub constants: Vec<Constant>,
    pub names: Vec<String>,
    pub name_indices: HashMap<String, usize>,
    pub required: Vec<String>,
    pub locations: Vec<InstructionLocation>,
    pub loops: Vec<LoopContext>,
    pub last_instruction: EmittedInstruction,
}

impl CompilationScope {
    pub fn new() -> Self {
        Self::default()
    }
}
