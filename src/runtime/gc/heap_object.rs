use std::rc::Rc;

use crate::{
    bytecode::bytecode::Bytecode,
    runtime::{gc::GcHandle, lambda::Probe, native_function::NativeFunction},
};

/// Objects that live on the GC-managed heap.
///
/// Every runtime value is one of these. Composite variants refer to their
/// children by [`GcHandle`]; those edges are counted by the heap.
#[derive(Debug)]
pub enum HeapObject {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    Bytes(Vec<u8>),
    Null,
    Tuple(Vec<GcHandle>),
    KeyVal {
        key: GcHandle,
        value: GcHandle,
    },
    Named {
        name: String,
        value: GcHandle,
    },
    Range {
        start: i64,
        end: i64,
        step: i64,
    },
    /// Mutable box around one value.
    Wrapper {
        value: GcHandle,
    },
    /// Host callable exposed to scripts. `function` is `None` until wrapped.
    NativeFunction {
        function: Option<Rc<NativeFunction>>,
        contract: Option<GcHandle>,
    },
    /// Executable unit. `program` is `None` until loaded.
    Lambda {
        program: Option<Rc<Bytecode>>,
        defaults: Option<GcHandle>,
        probe: Option<Probe>,
    },
}

impl HeapObject {
    /// Pushes every outgoing heap edge of this object onto `out`.
    pub fn push_children(&self, out: &mut Vec<GcHandle>) {
        match self {
            HeapObject::Tuple(elements) => out.extend_from_slice(elements),
            HeapObject::KeyVal { key, value } => {
                out.push(*key);
                out.push(*value);
            }
            HeapObject::Named { value, .. } | HeapObject::Wrapper { value } => out.push(*value),
            HeapObject::NativeFunction { contract, .. } => out.extend(contract.iter().copied()),
            HeapObject::Lambda { defaults, .. } => out.extend(defaults.iter().copied()),
            HeapObject::Integer(_)
            | HeapObject::Float(_)
            | HeapObject::Boolean(_)
            | HeapObject::String(_)
            | HeapObject::Bytes(_)
            | HeapObject::Null
            | HeapObject::Range { .. } => {}
        }
    }

    pub fn children(&self) -> Vec<GcHandle> {
        let mut out = Vec::new();
        self.push_children(&mut out);
        out
    }
}
