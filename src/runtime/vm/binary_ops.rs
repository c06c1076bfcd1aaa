use crate::{
    bytecode::op_code::OpCode,
    runtime::{gc::HeapObject, value::ValueKind},
};

use super::VM;

impl VM {
    pub(crate) fn execute_binary_operation(&mut self, op: OpCode) -> Result<(), String> {
        let right = self.pop()?;
        let left = self.pop()?;

        let (l, r) = (left.handle(), right.handle());
        let object = self
            .heap
            .core
            .with_gc(|gc| binary_result(op, gc.get(l), gc.get(r)))?;
        // `left` and `right` stay rooted until the result holds their children.
        let result = self.heap.alloc(object);
        drop((left, right));
        self.push(result)
    }
}

fn binary_result(op: OpCode, left: &HeapObject, right: &HeapObject) -> Result<HeapObject, String> {
    match (left, right) {
        (HeapObject::Integer(l), HeapObject::Integer(r)) => integer_op(op, *l, *r),
        (HeapObject::Float(l), HeapObject::Float(r)) => float_op(op, *l, *r),
        (HeapObject::Integer(l), HeapObject::Float(r)) => float_op(op, *l as f64, *r),
        (HeapObject::Float(l), HeapObject::Integer(r)) => float_op(op, *l, *r as f64),
        (HeapObject::String(l), HeapObject::String(r)) if op == OpCode::OpAdd => {
            Ok(HeapObject::String(format!("{}{}", l, r)))
        }
        (HeapObject::Bytes(l), HeapObject::Bytes(r)) if op == OpCode::OpAdd => {
            Ok(HeapObject::Bytes([l.as_slice(), r.as_slice()].concat()))
        }
        (HeapObject::Tuple(l), HeapObject::Tuple(r)) if op == OpCode::OpAdd => {
            Ok(HeapObject::Tuple([l.as_slice(), r.as_slice()].concat()))
        }
        _ => Err(format!(
            "cannot {} {} and {}",
            op_name(op),
            ValueKind::of(left),
            ValueKind::of(right)
        )),
    }
}

fn integer_op(op: OpCode, l: i64, r: i64) -> Result<HeapObject, String> {
    if r == 0 && (op == OpCode::OpDiv || op == OpCode::OpMod) {
        return Err("division by zero".to_string());
    }
    let result = match op {
        OpCode::OpAdd => l.checked_add(r),
        OpCode::OpSub => l.checked_sub(r),
        OpCode::OpMul => l.checked_mul(r),
        OpCode::OpDiv => l.checked_div(r),
        OpCode::OpMod => l.checked_rem(r),
        _ => return Err(format!("unknown integer operator: {:?}", op)),
    };
    result
        .map(HeapObject::Integer)
        .ok_or_else(|| format!("integer overflow in {}", op_name(op)))
}

fn float_op(op: OpCode, l: f64, r: f64) -> Result<HeapObject, String> {
    if r == 0.0 && (op == OpCode::OpDiv || op == OpCode::OpMod) {
        return Err("division by zero".to_string());
    }
    let result = match op {
        OpCode::OpAdd => l + r,
        OpCode::OpSub => l - r,
        OpCode::OpMul => l * r,
        OpCode::OpDiv => l / r,
        OpCode::OpMod => l % r,
        _ => return Err(format!("unknown float operator: {:?}", op)),
    };
    Ok(HeapObject::Float(result))
}

fn op_name(op: OpCode) -> &'static str {
    match op {
        OpCode::OpAdd => "add",
        OpCode::OpSub => "subtract",
        OpCode::OpMul => "multiply",
        OpCode::OpDiv => "divide",
        OpCode::OpMod => "modulo",
        _ => "operate on",
    }
}
