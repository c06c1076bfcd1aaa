use crate::{
    bytecode::{
        constant::Constant,
        debug_info::InstructionLocation,
        emitted_instruction::EmittedInstruction,
        op_code::{Instructions, OpCode, make},
    },
    frontend::{
        diagnostic::Diagnostic,
        error_codes::{ErrorCode, PROGRAM_TOO_LARGE, TOO_MANY_CONSTANTS},
        position::Position,
    },
};

use super::{CompileResult, Compiler};

/// Largest index a two-byte operand can carry.
const MAX_OPERAND: usize = u16::MAX as usize;
/// Largest instruction offset a jump can reach.
const MAX_JUMP_TARGET: usize = u32::MAX as usize;

impl Compiler {
    pub(super) fn emit(&mut self, op_code: OpCode, operands: &[usize]) -> usize {
        let instruction = make(op_code, operands);
        let pos = self.add_instruction(&instruction);
        self.set_last_instruction(op_code, pos);
        pos
    }

    fn add_instruction(&mut self, instruction: &[u8]) -> usize {
        let position = self.current_position;
        let scope = self.scope();
        let pos = scope.instructions.len();
        scope.instructions.extend_from_slice(instruction);
        scope.locations.push(InstructionLocation {
            offset: pos,
            position,
        });
        pos
    }

    fn set_last_instruction(&mut self, op_code: OpCode, pos: usize) {
        self.scope().last_instruction = EmittedInstruction {
            opcode: Some(op_code),
            position: pos,
        };
    }

    pub(super) fn last_instruction_is(&self, op_code: OpCode) -> bool {
        self.scopes[self.scope_index].last_instruction.opcode == Some(op_code)
    }

    pub(super) fn error_at(
        &self,
        code: &ErrorCode,
        position: Position,
        message: impl Into<String>,
    ) -> Box<Diagnostic> {
        Box::new(
            Diagnostic::from_code(code)
                .with_file(self.file_path.clone())
                .with_position(position)
                .with_message(message),
        )
    }

    fn operand_overflow(&self, what: &str) -> Box<Diagnostic> {
        self.error_at(
            &TOO_MANY_CONSTANTS,
            self.current_position.unwrap_or_default(),
            format!("A single program may hold at most {} {}.", MAX_OPERAND + 1, what),
        )
    }

    pub(super) fn add_constant(&mut self, constant: Constant) -> CompileResult<usize> {
        let scope = self.scope();
        if let Some(index) = scope.constants.iter().position(|c| match (c, &constant) {
            // Functions are never merged; equal bodies still get distinct slots.
            (Constant::Function(_), _) => false,
            _ => *c == constant,
        }) {
            return Ok(index);
        }
        if scope.constants.len() > MAX_OPERAND {
            return Err(self.operand_overflow("constants"));
        }
        let scope = self.scope();
        scope.constants.push(constant);
        Ok(scope.constants.len() - 1)
    }

    pub(super) fn emit_constant(&mut self, constant: Constant) -> CompileResult<()> {
        let index = self.add_constant(constant)?;
        self.emit(OpCode::OpConstant, &[index]);
        Ok(())
    }

    /// Index of `name` in the current scope's name table, adding it if new.
    pub(super) fn name_index(&mut self, name: &str) -> CompileResult<usize> {
        if let Some(index) = self.scope().name_indices.get(name) {
            return Ok(*index);
        }
        if self.scope().names.len() > MAX_OPERAND {
            return Err(self.operand_overflow("distinct names"));
        }
        let scope = self.scope();
        let index = scope.names.len();
        scope.names.push(name.to_string());
        scope.name_indices.insert(name.to_string(), index);
        Ok(index)
    }

    pub(super) fn current_instructions(&self) -> &Instructions {
        &self.scopes[self.scope_index].instructions
    }

    pub(super) fn change_operand(&mut self, op_pos: usize, operand: usize) {
        let Ok(op_code) = OpCode::try_from(self.current_instructions()[op_pos]) else {
            return;
        };
        self.replace_instruction(op_pos, make(op_code, &[operand]));
    }

    /// Emits a jump to a known `target` (a loop start).
    pub(super) fn emit_jump(&mut self, op_code: OpCode, target: usize) -> CompileResult<usize> {
        self.check_jump_target(target)?;
        Ok(self.emit(op_code, &[target]))
    }

    /// Points the jump at `op_pos` to the next instruction to be emitted.
    pub(super) fn patch_jump(&mut self, op_pos: usize) -> CompileResult<()> {
        let target = self.current_instructions().len();
        self.check_jump_target(target)?;
        self.change_operand(op_pos, target);
        Ok(())
    }

    fn check_jump_target(&self, target: usize) -> CompileResult<()> {
        if target > MAX_JUMP_TARGET {
            return Err(self.error_at(
                &PROGRAM_TOO_LARGE,
                self.current_position.unwrap_or_default(),
                format!(
                    "Jump target {} is beyond the addressable {} bytes.",
                    target, MAX_JUMP_TARGET
                ),
            ));
        }
        Ok(())
    }

    /// Emits `OpTuple` for `count` operands already on the stack.
    pub(super) fn emit_tuple(&mut self, count: usize) -> CompileResult<()> {
        if count > MAX_OPERAND {
            return Err(self.error_at(
                &PROGRAM_TOO_LARGE,
                self.current_position.unwrap_or_default(),
                format!(
                    "A tuple literal may hold at most {} elements, got {}.",
                    MAX_OPERAND, count
                ),
            ));
        }
        self.emit(OpCode::OpTuple, &[count]);
        Ok(())
    }

    fn replace_instruction(&mut self, pos: usize, new_instruction: Instructions) {
        let scope = self.scope();
        for (i, byte) in new_instruction.iter().enumerate() {
            scope.instructions[pos + i] = *byte;
        }
    }
}
