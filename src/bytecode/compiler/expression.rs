use std::{collections::HashSet, rc::Rc};

use crate::{
    bytecode::{compiler::Compiler, constant::Constant, op_code::OpCode},
    frontend::{
        block::Block,
        error_codes::{
            DUPLICATE_PARAMETER, NON_CONSTANT_DEFAULT, TOO_MANY_ARGUMENTS, UNEXPECTED_TOKEN,
        },
        expression::{Expression, Parameter},
        position::Position,
    },
};

use super::CompileResult;

/// `OpCall` carries its argument count in one byte.
const MAX_CALL_ARGUMENTS: usize = u8::MAX as usize;

impl Compiler {
    pub(super) fn compile_expression(&mut self, expression: &Expression) -> CompileResult<()> {
        let previous_position = self.current_position;
        self.current_position = Some(expression.position());
        let result = self.compile_expression_inner(expression);
        self.current_position = previous_position;
        result
    }

    fn compile_expression_inner(&mut self, expression: &Expression) -> CompileResult<()> {
        match expression {
            Expression::Integer { value, .. } => self.emit_constant(Constant::Integer(*value))?,
            Expression::Float { value, .. } => self.emit_constant(Constant::Float(*value))?,
            Expression::String { value, .. } => {
                self.emit_constant(Constant::String(value.clone()))?
            }
            Expression::Bytes { value, .. } => self.emit_constant(Constant::Bytes(value.clone()))?,
            Expression::Boolean { value, .. } => {
                if *value {
                    self.emit(OpCode::OpTrue, &[]);
                } else {
                    self.emit(OpCode::OpFalse, &[]);
                }
            }
            Expression::Null { .. } => {
                self.emit(OpCode::OpNull, &[]);
            }
            Expression::Identifier { name, .. } => {
                let index = self.name_index(name)?;
                self.emit(OpCode::OpGetName, &[index]);
            }
            Expression::Prefix {
                operator, right, ..
            } => {
                self.compile_expression(right)?;
                match operator.as_str() {
                    "-" => self.emit(OpCode::OpMinus, &[]),
                    // `not` shares the `!` token.
                    _ => self.emit(OpCode::OpBang, &[]),
                };
            }
            Expression::Infix {
                left,
                operator,
                right,
                ..
            } => self.compile_infix_expression(left, operator, right)?,
            Expression::Named { name, value, .. } => {
                self.compile_expression(value)?;
                let index = self.name_index(name)?;
                self.emit(OpCode::OpNamed, &[index]);
            }
            Expression::Tuple { elements, .. } => {
                for element in elements {
                    self.compile_expression(element)?;
                }
                self.emit_tuple(elements.len())?;
            }
            Expression::Lambda {
                parameters,
                body,
                position,
            } => self.compile_lambda_literal(parameters, body, *position)?,
            Expression::Call {
                function,
                arguments,
                position,
            } => {
                if arguments.len() > MAX_CALL_ARGUMENTS {
                    return Err(self.error_at(
                        &TOO_MANY_ARGUMENTS,
                        *position,
                        format!(
                            "A call may pass at most {} arguments, got {}.",
                            MAX_CALL_ARGUMENTS,
                            arguments.len()
                        ),
                    ));
                }
                self.compile_expression(function)?;
                for argument in arguments {
                    self.compile_expression(argument)?;
                }
                self.emit(OpCode::OpCall, &[arguments.len()]);
            }
            Expression::Index { left, index, .. } => {
                self.compile_expression(left)?;
                self.compile_expression(index)?;
                self.emit(OpCode::OpIndex, &[]);
            }
            Expression::MemberAccess { object, member, .. } => {
                self.compile_expression(object)?;
                let index = self.name_index(member)?;
                self.emit(OpCode::OpMember, &[index]);
            }
        }
        Ok(())
    }

    fn compile_infix_expression(
        &mut self,
        left: &Expression,
        operator: &str,
        right: &Expression,
    ) -> CompileResult<()> {
        // a && b: if a is falsy, result is a (short-circuit); otherwise result is b
        // OpJumpNotTruthy: peeks value, jumps if falsy (keeps value), pops if truthy
        if operator == "&&" {
            self.compile_expression(left)?;
            let jump_pos = self.emit(OpCode::OpJumpNotTruthy, &[9999]);
            self.compile_expression(right)?;
            self.patch_jump(jump_pos)?;
            return Ok(());
        }
        // a || b: if a is truthy, result is a (short-circuit); otherwise result is b
        if operator == "||" {
            self.compile_expression(left)?;
            let jump_pos = self.emit(OpCode::OpJumpTruthy, &[9999]);
            self.compile_expression(right)?;
            self.patch_jump(jump_pos)?;
            return Ok(());
        }

        self.compile_expression(left)?;
        self.compile_expression(right)?;

        let op = match operator {
            "+" => OpCode::OpAdd,
            "-" => OpCode::OpSub,
            "*" => OpCode::OpMul,
            "/" => OpCode::OpDiv,
            "%" => OpCode::OpMod,
            "==" => OpCode::OpEqual,
            "!=" => OpCode::OpNotEqual,
            ">" => OpCode::OpGreaterThan,
            ">=" => OpCode::OpGreaterThanOrEqual,
            "<" => OpCode::OpLessThan,
            "<=" => OpCode::OpLessThanOrEqual,
            ".." => OpCode::OpRange,
            other => {
                return Err(self.error_at(
                    &UNEXPECTED_TOKEN,
                    left.position(),
                    format!("Unknown infix operator `{}`.", other),
                ));
            }
        };
        self.emit(op, &[]);
        Ok(())
    }

    /// Emits the defaults tuple, then `OpLambda` over the compiled body.
    ///
    /// Parameters without a default get a null slot and become required
    /// names of the body.
    fn compile_lambda_literal(
        &mut self,
        parameters: &[Parameter],
        body: &Block,
        position: Position,
    ) -> CompileResult<()> {
        let mut seen = HashSet::new();
        for parameter in parameters {
            if !seen.insert(parameter.name.as_str()) {
                return Err(self.error_at(
                    &DUPLICATE_PARAMETER,
                    position,
                    format!("Parameter `{}` is declared more than once.", parameter.name),
                ));
            }
        }

        for parameter in parameters {
            match &parameter.default {
                Some(default) if is_constant_default(default) => self.compile_expression(default)?,
                Some(default) => {
                    return Err(self.error_at(
                        &NON_CONSTANT_DEFAULT,
                        default.position(),
                        format!(
                            "Default of `{}` must be a literal, got `{}`.",
                            parameter.name, default
                        ),
                    ));
                }
                None => {
                    self.emit(OpCode::OpNull, &[]);
                }
            }
            let index = self.name_index(&parameter.name)?;
            self.emit(OpCode::OpNamed, &[index]);
        }
        self.emit_tuple(parameters.len())?;

        self.enter_scope();
        self.scope().required = parameters
            .iter()
            .filter(|p| p.default.is_none())
            .map(|p| p.name.clone())
            .collect();
        self.compile_body(&body.statements);
        let Some(scope) = self.leave_scope() else {
            return Ok(());
        };

        let names = parameters.iter().map(|p| p.name.clone()).collect();
        let function = Self::scope_to_bytecode(scope, "<lambda>", names);
        let index = self.add_constant(Constant::Function(Rc::new(function)))?;
        self.emit(OpCode::OpLambda, &[index]);
        Ok(())
    }
}

fn is_constant_default(expression: &Expression) -> bool {
    match expression {
        Expression::Integer { .. }
        | Expression::Float { .. }
        | Expression::String { .. }
        | Expression::Bytes { .. }
        | Expression::Boolean { .. }
        | Expression::Null { .. } => true,
        Expression::Prefix {
            operator, right, ..
        } => operator == "-" && is_constant_default(right),
        _ => false,
    }
}
