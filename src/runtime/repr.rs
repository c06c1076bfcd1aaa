//! Canonical structural text for values.
//!
//! The format is `TypeName(payload)` with composites recursing into the same
//! rule, e.g. `VMKeyVal(VMString("root"), VMTuple((VMInt(1), VMNull())))`.
//! Rendering reads the heap only; reference counts are untouched. A container
//! met again while its own text is still open prints as `...`.

use std::{collections::HashSet, fmt::Write};

use crate::runtime::gc::{GcHandle, GcHeap, HeapObject};

enum Step {
    Visit(GcHandle),
    Text(&'static str),
    Leave(GcHandle),
}

pub fn repr(gc: &GcHeap, handle: GcHandle) -> String {
    let mut out = String::new();
    let mut steps = vec![Step::Visit(handle)];
    // Containers whose text is still open; a revisit prints `...`.
    let mut on_path: HashSet<GcHandle> = HashSet::new();

    while let Some(step) = steps.pop() {
        match step {
            Step::Text(text) => out.push_str(text),
            Step::Leave(handle) => {
                on_path.remove(&handle);
            }
            Step::Visit(handle) => write_object(gc, handle, &mut out, &mut steps, &mut on_path),
        }
    }
    out
}

fn write_object(
    gc: &GcHeap,
    handle: GcHandle,
    out: &mut String,
    steps: &mut Vec<Step>,
    on_path: &mut HashSet<GcHandle>,
) {
    let Some(object) = gc.try_get(handle) else {
        out.push_str("<freed>");
        return;
    };
    let is_container = matches!(
        object,
        HeapObject::Tuple(_)
            | HeapObject::KeyVal { .. }
            | HeapObject::Named { .. }
            | HeapObject::Wrapper { .. }
    );
    if is_container {
        if !on_path.insert(handle) {
            out.push_str("...");
            return;
        }
        steps.push(Step::Leave(handle));
    }

    match object {
        HeapObject::Integer(v) => {
            let _ = write!(out, "VMInt({})", v);
        }
        HeapObject::Float(v) => {
            let _ = write!(out, "VMFloat({})", v);
        }
        HeapObject::Boolean(v) => {
            let _ = write!(out, "VMBoolean({})", v);
        }
        HeapObject::String(s) => {
            let _ = write!(out, "VMString({:?})", s);
        }
        HeapObject::Bytes(bytes) => {
            out.push_str("VMBytes(");
            write_byte_literal(bytes, out);
            out.push(')');
        }
        HeapObject::Null => out.push_str("VMNull()"),
        HeapObject::Tuple(elements) => {
            out.push_str("VMTuple((");
            steps.push(Step::Text("))"));
            if elements.len() == 1 {
                steps.push(Step::Text(","));
            }
            for (i, element) in elements.iter().enumerate().rev() {
                steps.push(Step::Visit(*element));
                if i > 0 {
                    steps.push(Step::Text(", "));
                }
            }
        }
        HeapObject::KeyVal { key, value } => {
            out.push_str("VMKeyVal(");
            steps.push(Step::Text(")"));
            steps.push(Step::Visit(*value));
            steps.push(Step::Text(", "));
            steps.push(Step::Visit(*key));
        }
        HeapObject::Named { name, value } => {
            let _ = write!(out, "VMNamed({:?} => ", name);
            steps.push(Step::Text(")"));
            steps.push(Step::Visit(*value));
        }
        HeapObject::Wrapper { value } => {
            out.push_str("VMWrapper(");
            steps.push(Step::Text(")"));
            steps.push(Step::Visit(*value));
        }
        HeapObject::Range { start, end, step } => {
            if *step == 1 {
                let _ = write!(out, "VMRange({}, {})", start, end);
            } else {
                let _ = write!(out, "VMRange({}, {}, {})", start, end, step);
            }
        }
        HeapObject::NativeFunction { function, .. } => match function {
            Some(function) => {
                let _ = write!(out, "VMNativeFunction({})", function.name());
            }
            None => out.push_str("VMNativeFunction()"),
        },
        HeapObject::Lambda { program, .. } => {
            let required = program
                .as_ref()
                .map(|program| program.required.join(", "))
                .unwrap_or_default();
            let _ = write!(out, "VMLambda({})", required);
        }
    }
}

/// Writes `b"..."` with printable ASCII verbatim and everything else as `\xNN`.
fn write_byte_literal(bytes: &[u8], out: &mut String) {
    out.push_str("b\"");
    for &byte in bytes {
        match byte {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            32..=126 => out.push(byte as char),
            _ => {
                let _ = write!(out, "\\x{:02x}", byte);
            }
        }
    }
    out.push('"');
}
