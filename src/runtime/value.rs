use std::{collections::HashSet, fmt, rc::Rc};

use crate::runtime::{
    error::{Error, Result},
    gc::{GcHandle, GcHeap, HeapObject},
    heap::{Heap, HeapCore},
    repr,
};

/// Tag of a runtime value. Never changes after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int,
    Float,
    Boolean,
    String,
    Bytes,
    Null,
    Tuple,
    KeyVal,
    Named,
    Range,
    Wrapper,
    NativeFunction,
    Lambda,
}

impl ValueKind {
    pub(crate) fn of(object: &HeapObject) -> Self {
        match object {
            HeapObject::Integer(_) => ValueKind::Int,
            HeapObject::Float(_) => ValueKind::Float,
            HeapObject::Boolean(_) => ValueKind::Boolean,
            HeapObject::String(_) => ValueKind::String,
            HeapObject::Bytes(_) => ValueKind::Bytes,
            HeapObject::Null => ValueKind::Null,
            HeapObject::Tuple(_) => ValueKind::Tuple,
            HeapObject::KeyVal { .. } => ValueKind::KeyVal,
            HeapObject::Named { .. } => ValueKind::Named,
            HeapObject::Range { .. } => ValueKind::Range,
            HeapObject::Wrapper { .. } => ValueKind::Wrapper,
            HeapObject::NativeFunction { .. } => ValueKind::NativeFunction,
            HeapObject::Lambda { .. } => ValueKind::Lambda,
        }
    }

    /// Returns the canonical runtime type label used in error messages.
    ///
    /// These labels are user-visible and are expected to remain stable.
    pub fn type_name(self) -> &'static str {
        match self {
            ValueKind::Int => "Int",
            ValueKind::Float => "Float",
            ValueKind::Boolean => "Boolean",
            ValueKind::String => "String",
            ValueKind::Bytes => "Bytes",
            ValueKind::Null => "Null",
            ValueKind::Tuple => "Tuple",
            ValueKind::KeyVal => "KeyVal",
            ValueKind::Named => "Named",
            ValueKind::Range => "Range",
            ValueKind::Wrapper => "Wrapper",
            ValueKind::NativeFunction => "NativeFunction",
            ValueKind::Lambda => "Lambda",
        }
    }

    pub fn is_callable(self) -> bool {
        matches!(self, ValueKind::NativeFunction | ValueKind::Lambda)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Counted handle to a value on a [`Heap`].
///
/// Cloning adds a reference and dropping removes one; the value is freed when
/// no handle and no container refers to it any more (or, for cycles, at the
/// next [`Heap::collect`]). Equality is identity: two handles are equal when
/// they name the same heap slot.
pub struct Value {
    pub(crate) core: Rc<HeapCore>,
    handle: GcHandle,
}

impl Value {
    /// Wraps a handle whose external reference was already taken.
    pub(crate) fn from_retained(core: Rc<HeapCore>, handle: GcHandle) -> Self {
        Self { core, handle }
    }

    pub(crate) fn handle(&self) -> GcHandle {
        self.handle
    }

    pub(crate) fn with_object<R>(&self, f: impl FnOnce(&GcHeap, &HeapObject) -> R) -> R {
        let handle = self.handle;
        self.core.with_gc(|gc| {
            let gc: &GcHeap = gc;
            f(gc, gc.get(handle))
        })
    }

    /// Reads a child handle out of this value and returns a counted reference to it.
    fn child(&self, pick: impl FnOnce(&HeapObject) -> Option<GcHandle>) -> Option<Value> {
        let handle = self.handle;
        let child = self.core.with_gc(|gc| {
            let child = pick(gc.get(handle))?;
            gc.retain(child);
            Some(child)
        })?;
        Some(Value::from_retained(self.core.clone(), child))
    }

    /// Returns a new counted reference to `handle` on the same heap.
    pub(crate) fn sibling(&self, handle: GcHandle) -> Value {
        self.core.retain(handle);
        Value::from_retained(self.core.clone(), handle)
    }

    pub fn heap(&self) -> Heap {
        Heap {
            core: self.core.clone(),
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.with_object(|_, object| ValueKind::of(object))
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().type_name()
    }

    pub fn is_null(&self) -> bool {
        self.kind() == ValueKind::Null
    }

    pub fn as_int(&self) -> Option<i64> {
        self.with_object(|_, object| match object {
            HeapObject::Integer(v) => Some(*v),
            _ => None,
        })
    }

    pub fn as_float(&self) -> Option<f64> {
        self.with_object(|_, object| match object {
            HeapObject::Float(v) => Some(*v),
            _ => None,
        })
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.with_object(|_, object| match object {
            HeapObject::Boolean(v) => Some(*v),
            _ => None,
        })
    }

    pub fn as_string(&self) -> Option<String> {
        self.with_object(|_, object| match object {
            HeapObject::String(v) => Some(v.clone()),
            _ => None,
        })
    }

    pub fn as_bytes(&self) -> Option<Vec<u8>> {
        self.with_object(|_, object| match object {
            HeapObject::Bytes(v) => Some(v.clone()),
            _ => None,
        })
    }

    /// `(start, end, step)` of a range.
    pub fn as_range(&self) -> Option<(i64, i64, i64)> {
        self.with_object(|_, object| match object {
            HeapObject::Range { start, end, step } => Some((*start, *end, *step)),
            _ => None,
        })
    }

    /// Key slot of a key-value pair.
    pub fn get_key(&self) -> Result<Value> {
        self.child(|object| match object {
            HeapObject::KeyVal { key, .. } => Some(*key),
            _ => None,
        })
        .ok_or_else(|| self.kind_error("get_key", "KeyVal"))
    }

    /// Value slot of a key-value pair, named pair or wrapper.
    pub fn get_value(&self) -> Result<Value> {
        self.child(|object| match object {
            HeapObject::KeyVal { value, .. }
            | HeapObject::Named { value, .. }
            | HeapObject::Wrapper { value } => Some(*value),
            _ => None,
        })
        .ok_or_else(|| self.kind_error("get_value", "KeyVal, Named or Wrapper"))
    }

    /// A new wrapper around the same inner value. The inner value is shared.
    pub fn shallow_copy(&self) -> Result<Value> {
        if self.kind() != ValueKind::Wrapper {
            return Err(self.kind_error("shallow_copy", "Wrapper"));
        }
        let inner = self.get_value()?;
        self.heap().new_wrapper(&inner)
    }

    pub fn set_key(&self, key: &Value) -> Result<()> {
        let key = self.heap().check_owned(key)?;
        let pair = self.handle;
        self.core
            .with_gc(|gc| gc.set_key(pair, key))
            .map_err(Error::execution)
    }

    pub fn set_value(&self, value: &Value) -> Result<()> {
        let value = self.heap().check_owned(value)?;
        let pair = self.handle;
        self.core
            .with_gc(|gc| gc.set_value(pair, value))
            .map_err(Error::execution)
    }

    /// Name of a named pair.
    pub fn name(&self) -> Result<String> {
        self.with_object(|_, object| match object {
            HeapObject::Named { name, .. } => Some(name.clone()),
            _ => None,
        })
        .ok_or_else(|| self.kind_error("name", "Named"))
    }

    pub fn set_name(&self, name: impl Into<String>) -> Result<()> {
        let pair = self.handle;
        let name = name.into();
        self.core
            .with_gc(|gc| gc.set_name(pair, name))
            .map_err(Error::execution)
    }

    /// Number of elements of a tuple, characters of a string, bytes of a
    /// byte string, or steps of a range.
    pub fn len(&self) -> Option<usize> {
        self.with_object(|_, object| match object {
            HeapObject::Tuple(elements) => Some(elements.len()),
            HeapObject::String(s) => Some(s.chars().count()),
            HeapObject::Bytes(b) => Some(b.len()),
            HeapObject::Range { start, end, step } => Some(range_len(*start, *end, *step)),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Element `index` of a tuple. Negative indices count from the end.
    pub fn get(&self, index: i64) -> Result<Value> {
        let kind = self.kind();
        if kind != ValueKind::Tuple {
            return Err(self.kind_error("get", "Tuple"));
        }
        self.child(|object| match object {
            HeapObject::Tuple(elements) => {
                normalize_index(index, elements.len()).map(|idx| elements[idx])
            }
            _ => None,
        })
        .ok_or_else(|| Error::execution(format!("tuple index {} out of range", index)))
    }

    /// Counted references to every element of a tuple.
    pub fn elements(&self) -> Result<Vec<Value>> {
        let handle = self.handle;
        let handles = self
            .core
            .with_gc(|gc| {
                let elements = match gc.get(handle) {
                    HeapObject::Tuple(elements) => elements.clone(),
                    _ => return None,
                };
                for element in &elements {
                    gc.retain(*element);
                }
                Some(elements)
            })
            .ok_or_else(|| self.kind_error("elements", "Tuple"))?;
        Ok(handles
            .into_iter()
            .map(|h| Value::from_retained(self.core.clone(), h))
            .collect())
    }

    /// Looks up `name` among the named pairs (or string-keyed key-value pairs)
    /// of a tuple.
    pub fn attr(&self, name: &str) -> Result<Value> {
        if self.kind() != ValueKind::Tuple {
            return Err(self.kind_error("attr", "Tuple"));
        }
        let handle = self.handle;
        let found = self.core.with_gc(|gc| {
            let found = lookup_member(gc, handle, name)?;
            gc.retain(found);
            Some(found)
        });
        found
            .map(|h| Value::from_retained(self.core.clone(), h))
            .ok_or_else(|| Error::execution(format!("tuple has no member `{}`", name)))
    }

    /// Canonical structural text, e.g. `VMKeyVal(VMInt(10), VMString("hello"))`.
    pub fn repr(&self) -> String {
        let handle = self.handle;
        self.core.with_gc(|gc| repr::repr(gc, handle))
    }

    /// Structural equality: scalars by value, pairs and tuples element-wise,
    /// callables by identity.
    pub fn structural_eq(&self, other: &Value) -> bool {
        if !Rc::ptr_eq(&self.core, &other.core) {
            return false;
        }
        let (a, b) = (self.handle, other.handle);
        self.core.with_gc(|gc| values_equal(gc, a, b))
    }

    /// Truthiness used by `if`, `while`, `and`, `or` and `!`.
    pub fn is_truthy(&self) -> bool {
        self.with_object(|_, object| match object {
            HeapObject::Null => false,
            HeapObject::Boolean(b) => *b,
            HeapObject::Integer(i) => *i != 0,
            HeapObject::Float(f) => *f != 0.0,
            HeapObject::String(s) => !s.is_empty(),
            HeapObject::Bytes(b) => !b.is_empty(),
            HeapObject::Tuple(elements) => !elements.is_empty(),
            _ => true,
        })
    }

    fn kind_error(&self, op: &str, expected: &str) -> Error {
        Error::execution(format!(
            "{}: expected {}, got {}",
            op,
            expected,
            self.type_name()
        ))
    }
}

pub(crate) fn range_len(start: i64, end: i64, step: i64) -> usize {
    let (start, end, step) = (start as i128, end as i128, step as i128);
    let span = if step > 0 { end - start } else { start - end };
    if span <= 0 {
        0
    } else {
        let step = step.abs();
        usize::try_from((span + step - 1) / step).unwrap_or(usize::MAX)
    }
}

/// Element `pos` of a range, or `None` when it would leave `i64`.
pub(crate) fn range_element(start: i64, step: i64, pos: usize) -> Option<i64> {
    let value = (start as i128).checked_add((pos as i128).checked_mul(step as i128)?)?;
    i64::try_from(value).ok()
}

/// Resolves a possibly negative `index` against `len`.
pub(crate) fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i128;
    let idx = if index < 0 {
        len + index as i128
    } else {
        index as i128
    };
    if (0..len).contains(&idx) {
        usize::try_from(idx).ok()
    } else {
        None
    }
}

/// First named pair called `name`, or key-value pair keyed by that string.
pub(crate) fn lookup_member(gc: &GcHeap, tuple: GcHandle, name: &str) -> Option<GcHandle> {
    let HeapObject::Tuple(elements) = gc.get(tuple) else {
        return None;
    };
    elements.iter().find_map(|element| match gc.get(*element) {
        HeapObject::Named { name: n, value } if n == name => Some(*value),
        HeapObject::KeyVal { key, value } => match gc.get(*key) {
            HeapObject::String(k) if k == name => Some(*value),
            _ => None,
        },
        _ => None,
    })
}

/// Structural equality over the heap graph.
///
/// Walks pairs of handles with an explicit stack. A pair already under
/// comparison is assumed equal, so cyclic graphs terminate.
pub(crate) fn values_equal(gc: &GcHeap, a: GcHandle, b: GcHandle) -> bool {
    let mut pending = vec![(a, b)];
    let mut seen: HashSet<(GcHandle, GcHandle)> = HashSet::new();

    while let Some((a, b)) = pending.pop() {
        if a == b || !seen.insert((a, b)) {
            continue;
        }
        let equal = match (gc.get(a), gc.get(b)) {
            (HeapObject::Integer(x), HeapObject::Integer(y)) => x == y,
            (HeapObject::Float(x), HeapObject::Float(y)) => x == y,
            (HeapObject::Integer(x), HeapObject::Float(y))
            | (HeapObject::Float(y), HeapObject::Integer(x)) => (*x as f64) == *y,
            (HeapObject::Boolean(x), HeapObject::Boolean(y)) => x == y,
            (HeapObject::String(x), HeapObject::String(y)) => x == y,
            (HeapObject::Bytes(x), HeapObject::Bytes(y)) => x == y,
            (HeapObject::Null, HeapObject::Null) => true,
            (
                HeapObject::Range {
                    start: s1,
                    end: e1,
                    step: t1,
                },
                HeapObject::Range {
                    start: s2,
                    end: e2,
                    step: t2,
                },
            ) => s1 == s2 && e1 == e2 && t1 == t2,
            (HeapObject::Tuple(xs), HeapObject::Tuple(ys)) => {
                pending.extend(xs.iter().copied().zip(ys.iter().copied()));
                xs.len() == ys.len()
            }
            (HeapObject::KeyVal { key: k1, value: v1 }, HeapObject::KeyVal { key: k2, value: v2 }) => {
                pending.push((*k1, *k2));
                pending.push((*v1, *v2));
                true
            }
            (
                HeapObject::Named { name: n1, value: v1 },
                HeapObject::Named { name: n2, value: v2 },
            ) => {
                pending.push((*v1, *v2));
                n1 == n2
            }
            _ => false,
        };
        if !equal {
            return false;
        }
    }
    true
}

impl Clone for Value {
    fn clone(&self) -> Self {
        self.core.retain(self.handle);
        Self {
            core: self.core.clone(),
            handle: self.handle,
        }
    }
}

impl Drop for Value {
    fn drop(&mut self) {
        self.core.release(self.handle);
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.core, &other.core) && self.handle == other.handle
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value#{}({})", self.handle.index(), self.repr())
    }
}
