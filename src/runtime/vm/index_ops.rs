use crate::runtime::{
    gc::HeapObject,
    value::{Value, ValueKind, lookup_member, normalize_index, range_element, range_len},
};

use super::VM;

/// Outcome of an index read taken under one heap borrow.
enum Indexed {
    Existing(crate::runtime::gc::GcHandle),
    New(HeapObject),
}

impl VM {
    pub(crate) fn execute_index_expression(
        &mut self,
        left: &Value,
        index: &Value,
    ) -> Result<(), String> {
        let (l, i) = (left.handle(), index.handle());
        let indexed = self.heap.core.with_gc(|gc| {
            let out_of_range = |idx: i64, kind: ValueKind| {
                format!("{} index {} out of range", kind.type_name(), idx)
            };
            match (gc.get(l), gc.get(i)) {
                (HeapObject::Tuple(elements), HeapObject::Integer(idx)) => {
                    normalize_index(*idx, elements.len())
                        .map(|pos| Indexed::Existing(elements[pos]))
                        .ok_or_else(|| out_of_range(*idx, ValueKind::Tuple))
                }
                (HeapObject::Tuple(_), HeapObject::String(name)) => lookup_member(gc, l, name)
                    .map(Indexed::Existing)
                    .ok_or_else(|| format!("tuple has no member `{}`", name)),
                (HeapObject::String(s), HeapObject::Integer(idx)) => {
                    let len = s.chars().count();
                    normalize_index(*idx, len)
                        .and_then(|pos| s.chars().nth(pos))
                        .map(|ch| Indexed::New(HeapObject::String(ch.to_string())))
                        .ok_or_else(|| out_of_range(*idx, ValueKind::String))
                }
                (HeapObject::Bytes(b), HeapObject::Integer(idx)) => normalize_index(*idx, b.len())
                    .map(|pos| Indexed::New(HeapObject::Integer(b[pos] as i64)))
                    .ok_or_else(|| out_of_range(*idx, ValueKind::Bytes)),
                (HeapObject::Range { start, end, step }, HeapObject::Integer(idx)) => {
                    normalize_index(*idx, range_len(*start, *end, *step))
                        .and_then(|pos| range_element(*start, *step, pos))
                        .map(|element| Indexed::New(HeapObject::Integer(element)))
                        .ok_or_else(|| out_of_range(*idx, ValueKind::Range))
                }
                (left, index) => Err(format!(
                    "index operator not supported: {}[{}]",
                    ValueKind::of(left),
                    ValueKind::of(index)
                )),
            }
        })?;

        let value = match indexed {
            Indexed::Existing(handle) => left.sibling(handle),
            Indexed::New(object) => self.heap.alloc(object),
        };
        self.push(value)
    }

    pub(crate) fn execute_member_access(&mut self, object: &Value, name: &str) -> Result<(), String> {
        let value = match (object.kind(), name) {
            (ValueKind::Tuple, _) => object.attr(name).map_err(|err| err.message())?,
            (ValueKind::Named, "name") => {
                let name = object.name().map_err(|err| err.message())?;
                self.heap.new_string(name)
            }
            (ValueKind::Named | ValueKind::KeyVal | ValueKind::Wrapper, "value") => {
                object.get_value().map_err(|err| err.message())?
            }
            (ValueKind::KeyVal, "key") => object.get_key().map_err(|err| err.message())?,
            (ValueKind::Range, "start" | "end" | "step") => {
                let (start, end, step) = object
                    .as_range()
                    .ok_or_else(|| "expected a Range".to_string())?;
                self.heap.new_int(match name {
                    "start" => start,
                    "end" => end,
                    _ => step,
                })
            }
            (kind, _) => return Err(format!("{} has no member `{}`", kind, name)),
        };
        self.push(value)
    }
}
