use crate::{
    bytecode::{
        constant::Constant,
        op_code::{OpCode, read_u8, read_u16, read_u32},
    },
    runtime::value::ValueKind,
};

use super::{Flow, VM};

impl VM {
    pub(super) fn dispatch_instruction(
        &mut self,
        instructions: &[u8],
        ip: usize,
        op: OpCode,
    ) -> Result<Flow, String> {
        match op {
            OpCode::OpConstant => {
                let idx = read_u16(instructions, ip + 1) as usize;
                let value = self.constant_value(idx)?;
                self.push(value)?;
            }
            OpCode::OpNull => {
                let value = self.heap.new_null();
                self.push(value)?;
            }
            OpCode::OpTrue | OpCode::OpFalse => {
                let value = self.heap.new_bool(op == OpCode::OpTrue);
                self.push(value)?;
            }
            OpCode::OpPop => {
                self.pop()?;
            }
            OpCode::OpGetName => {
                let idx = read_u16(instructions, ip + 1) as usize;
                let name = self.name(idx)?;
                let value = self
                    .frame
                    .get(name)
                    .cloned()
                    .ok_or_else(|| format!("unbound name `{}`", name))?;
                self.push(value)?;
            }
            OpCode::OpDefine => {
                let idx = read_u16(instructions, ip + 1) as usize;
                let value = self.pop()?;
                let name = self.name(idx)?.to_string();
                self.frame.insert(name, value);
            }
            OpCode::OpSetName => {
                let idx = read_u16(instructions, ip + 1) as usize;
                let value = self.pop()?;
                let name = self.name(idx)?.to_string();
                match self.frame.get_mut(&name) {
                    Some(slot) => *slot = value,
                    None => return Err(format!("cannot assign to unbound name `{}`", name)),
                }
            }
            OpCode::OpAdd | OpCode::OpSub | OpCode::OpMul | OpCode::OpDiv | OpCode::OpMod => {
                self.execute_binary_operation(op)?;
            }
            OpCode::OpEqual
            | OpCode::OpNotEqual
            | OpCode::OpGreaterThan
            | OpCode::OpGreaterThanOrEqual
            | OpCode::OpLessThan
            | OpCode::OpLessThanOrEqual => {
                self.execute_comparison(op)?;
            }
            OpCode::OpMinus => {
                let operand = self.pop()?;
                let negated = match (operand.as_int(), operand.as_float()) {
                    (Some(v), _) => self.heap.new_int(
                        v.checked_neg()
                            .ok_or_else(|| "integer overflow in negation".to_string())?,
                    ),
                    (_, Some(v)) => self.heap.new_float(-v),
                    _ => {
                        return Err(format!(
                            "unsupported type for negation: {}",
                            operand.type_name()
                        ));
                    }
                };
                self.push(negated)?;
            }
            OpCode::OpBang => {
                let operand = self.pop()?;
                let value = self.heap.new_bool(!operand.is_truthy());
                self.push(value)?;
            }
            OpCode::OpRange => {
                let end = self.pop()?;
                let start = self.pop()?;
                let (Some(s), Some(e)) = (start.as_int(), end.as_int()) else {
                    return Err(format!(
                        "range bounds must be Int, got {} and {}",
                        start.type_name(),
                        end.type_name()
                    ));
                };
                let range = self.heap.new_range(s, e, 1).map_err(|err| err.message())?;
                self.push(range)?;
            }
            OpCode::OpNamed => {
                let idx = read_u16(instructions, ip + 1) as usize;
                let value = self.pop()?;
                let name = self.name(idx)?.to_string();
                let named = self
                    .heap
                    .new_named(name, &value)
                    .map_err(|err| err.message())?;
                self.push(named)?;
            }
            OpCode::OpTuple => {
                let count = read_u16(instructions, ip + 1) as usize;
                let elements = self.pop_n(count)?;
                let tuple = self
                    .heap
                    .new_tuple(&elements)
                    .map_err(|err| err.message())?;
                self.push(tuple)?;
            }
            OpCode::OpIndex => {
                let index = self.pop()?;
                let left = self.pop()?;
                self.execute_index_expression(&left, &index)?;
            }
            OpCode::OpMember => {
                let idx = read_u16(instructions, ip + 1) as usize;
                let object = self.pop()?;
                let name = self.name(idx)?.to_string();
                self.execute_member_access(&object, &name)?;
            }
            OpCode::OpCall => {
                let num_args = read_u8(instructions, ip + 1) as usize;
                self.execute_call(num_args)?;
            }
            OpCode::OpJump => {
                let target = read_u32(instructions, ip + 1) as usize;
                if target <= ip {
                    self.probes.poll()?;
                }
                return Ok(Flow::Jump(target));
            }
            OpCode::OpJumpNotTruthy | OpCode::OpJumpTruthy => {
                let target = read_u32(instructions, ip + 1) as usize;
                let truthy = self.peek()?.is_truthy();
                if truthy == (op == OpCode::OpJumpTruthy) {
                    return Ok(Flow::Jump(target));
                }
                self.pop()?;
            }
            OpCode::OpPopJumpIfFalse => {
                let target = read_u32(instructions, ip + 1) as usize;
                if !self.pop()?.is_truthy() {
                    return Ok(Flow::Jump(target));
                }
            }
            OpCode::OpLambda => {
                let idx = read_u16(instructions, ip + 1) as usize;
                let defaults = self.pop()?;
                if defaults.kind() != ValueKind::Tuple {
                    return Err(format!(
                        "lambda defaults must be a Tuple, got {}",
                        defaults.type_name()
                    ));
                }
                let Constant::Function(function) = self.constant(idx)? else {
                    return Err(format!("constant {} is not a function", idx));
                };
                let function = function.clone();
                let lambda = self.heap.new_lambda();
                let (target, defaults_handle) = (lambda.handle(), defaults.handle());
                self.heap
                    .core
                    .with_gc(|gc| gc.set_program(target, function, defaults_handle, None))?;
                self.push(lambda)?;
            }
            OpCode::OpReturnValue => return Ok(Flow::Return(self.pop()?)),
            OpCode::OpReturn => return Ok(Flow::Return(self.heap.new_null())),
        }
        Ok(Flow::Next)
    }
}
