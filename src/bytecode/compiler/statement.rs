use crate::{
    bytecode::{compilation_scope::LoopContext, compiler::Compiler, op_code::OpCode},
    frontend::{
        block::Block, diagnostic::Diagnostic, error_codes::LOOP_CONTROL_OUTSIDE_LOOP,
        expression::Expression, position::Position, statement::Statement,
    },
};

use super::CompileResult;

impl Compiler {
    pub(super) fn compile_statement(&mut self, statement: &Statement) -> CompileResult<()> {
        let previous_position = self.current_position;
        self.current_position = statement_position(statement);
        let result = self.compile_statement_inner(statement);
        self.current_position = previous_position;
        result
    }

    fn compile_statement_inner(&mut self, statement: &Statement) -> CompileResult<()> {
        match statement {
            Statement::Expression { expression } => {
                self.compile_expression(expression)?;
                self.emit(OpCode::OpPop, &[]);
            }
            Statement::Required { name, .. } => {
                let scope = self.scope();
                if !scope.required.contains(name) {
                    scope.required.push(name.clone());
                }
            }
            Statement::Define { name, value, .. } => {
                self.compile_expression(value)?;
                let index = self.name_index(name)?;
                self.emit(OpCode::OpDefine, &[index]);
            }
            Statement::Assign { name, value, .. } => {
                self.compile_expression(value)?;
                let index = self.name_index(name)?;
                self.emit(OpCode::OpSetName, &[index]);
            }
            Statement::While {
                condition, body, ..
            } => self.compile_while_statement(condition, body)?,
            Statement::If {
                condition,
                consequence,
                alternative,
                ..
            } => self.compile_if_statement(condition, consequence, alternative.as_ref())?,
            Statement::Return { value, .. } => match value {
                Some(expr) => {
                    self.compile_expression(expr)?;
                    self.emit(OpCode::OpReturnValue, &[]);
                }
                None => {
                    self.emit(OpCode::OpReturn, &[]);
                }
            },
            Statement::Break { position } => {
                if self.scope().loops.is_empty() {
                    return Err(self.loop_control_error("break", *position));
                }
                let jump = self.emit(OpCode::OpJump, &[9999]);
                if let Some(current) = self.scope().loops.last_mut() {
                    current.break_jumps.push(jump);
                }
            }
            Statement::Continue { position } => {
                let Some(start) = self.scope().loops.last().map(|l| l.start) else {
                    return Err(self.loop_control_error("continue", *position));
                };
                // Backward jump: the VM polls run conditions here.
                self.emit_jump(OpCode::OpJump, start)?;
            }
        }
        Ok(())
    }

    fn compile_while_statement(
        &mut self,
        condition: &Expression,
        body: &Block,
    ) -> CompileResult<()> {
        let start = self.current_instructions().len();
        self.compile_expression(condition)?;
        let exit_jump = self.emit(OpCode::OpPopJumpIfFalse, &[9999]);

        self.scope().loops.push(LoopContext {
            start,
            break_jumps: Vec::new(),
        });
        let body_result = self.compile_block(body);
        let context = self.scope().loops.pop();
        body_result?;

        self.emit_jump(OpCode::OpJump, start)?;
        self.patch_jump(exit_jump)?;
        for jump in context.map(|c| c.break_jumps).unwrap_or_default() {
            self.patch_jump(jump)?;
        }
        Ok(())
    }

    fn compile_if_statement(
        &mut self,
        condition: &Expression,
        consequence: &Block,
        alternative: Option<&Block>,
    ) -> CompileResult<()> {
        self.compile_expression(condition)?;
        let else_jump = self.emit(OpCode::OpPopJumpIfFalse, &[9999]);
        self.compile_block(consequence)?;

        match alternative {
            Some(alternative) => {
                let end_jump = self.emit(OpCode::OpJump, &[9999]);
                self.patch_jump(else_jump)?;
                self.compile_block(alternative)?;
                self.patch_jump(end_jump)?;
            }
            None => self.patch_jump(else_jump)?,
        }
        Ok(())
    }

    pub(super) fn compile_block(&mut self, block: &Block) -> CompileResult<()> {
        for statement in &block.statements {
            self.compile_statement(statement)?;
        }
        Ok(())
    }

    fn loop_control_error(&self, keyword: &str, position: Position) -> Box<Diagnostic> {
        self.error_at(
            &LOOP_CONTROL_OUTSIDE_LOOP,
            position,
            format!("`{}` can only be used inside a `while` loop.", keyword),
        )
    }
}

fn statement_position(statement: &Statement) -> Option<Position> {
    match statement {
        Statement::Required { position, .. }
        | Statement::Define { position, .. }
        | Statement::Assign { position, .. }
        | Statement::While { position, .. }
        | Statement::If { position, .. }
        | Statement::Return { position, .. }
        | Statement::Break { position }
        | Statement::Continue { position } => Some(*position),
        Statement::Expression { expression } => Some(expression.position()),
    }
}
