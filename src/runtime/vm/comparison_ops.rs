use std::cmp::Ordering;

use crate::{
    bytecode::op_code::OpCode,
    runtime::{
        gc::HeapObject,
        value::{ValueKind, values_equal},
    },
};

use super::VM;

impl VM {
    pub(crate) fn execute_comparison(&mut self, opcode: OpCode) -> Result<(), String> {
        let right = self.pop()?;
        let left = self.pop()?;
        let (l, r) = (left.handle(), right.handle());

        let result = self
            .heap
            .core
            .with_gc(|gc| -> Result<bool, String> {
                match opcode {
                    OpCode::OpEqual => Ok(values_equal(gc, l, r)),
                    OpCode::OpNotEqual => Ok(!values_equal(gc, l, r)),
                    _ => {
                        let (left, right) = (gc.get(l), gc.get(r));
                        let ordering = compare(left, right).ok_or_else(|| {
                            format!(
                                "cannot compare {} and {}",
                                ValueKind::of(left),
                                ValueKind::of(right)
                            )
                        })?;
                        // NaN compares as unordered: every ordering test is false.
                        Ok(ordering.is_some_and(|ordering| match opcode {
                            OpCode::OpGreaterThan => ordering == Ordering::Greater,
                            OpCode::OpGreaterThanOrEqual => ordering != Ordering::Less,
                            OpCode::OpLessThan => ordering == Ordering::Less,
                            _ => ordering != Ordering::Greater,
                        }))
                    }
                }
            })?;

        let value = self.heap.new_bool(result);
        self.push(value)
    }
}

/// `None` when the kinds cannot be ordered; `Some(None)` for NaN operands.
fn compare(left: &HeapObject, right: &HeapObject) -> Option<Option<Ordering>> {
    match (left, right) {
        (HeapObject::Integer(l), HeapObject::Integer(r)) => Some(Some(l.cmp(r))),
        (HeapObject::Float(l), HeapObject::Float(r)) => Some(l.partial_cmp(r)),
        (HeapObject::Integer(l), HeapObject::Float(r)) => Some((*l as f64).partial_cmp(r)),
        (HeapObject::Float(l), HeapObject::Integer(r)) => Some(l.partial_cmp(&(*r as f64))),
        (HeapObject::String(l), HeapObject::String(r)) => Some(Some(l.cmp(r))),
        (HeapObject::Bytes(l), HeapObject::Bytes(r)) => Some(Some(l.cmp(r))),
        _ => None,
    }
}
