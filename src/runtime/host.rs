//! Conversion between runtime values and plain host data.
//!
//! [`HostValue`] is what bridged functions receive and return. Lowering into
//! the heap (`Heap::from_host`) and lifting out of it (`Value::to_host`) both
//! walk an explicit work stack, so nesting depth is not limited by the call
//! stack. Host structures are acyclic by construction.

use std::{collections::HashSet, rc::Rc};

use crate::runtime::{
    error::{Error, Result},
    gc::{GcHandle, GcHeap, HeapObject},
    heap::{Heap, HeapCore},
    value::Value,
};

/// Host-side mirror of a runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    /// Lowers to a tuple.
    List(Vec<HostValue>),
    /// Ordered mapping; lowers to a tuple of named pairs.
    Map(Vec<(String, HostValue)>),
    Named(String, Box<HostValue>),
    KeyVal(Box<HostValue>, Box<HostValue>),
    Range { start: i64, end: i64, step: i64 },
    /// A runtime value passed through untouched (functions, lambdas, wrappers, or
    /// anything the host wants to keep as a handle).
    Value(Value),
}

impl HostValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            HostValue::Null => "null",
            HostValue::Bool(_) => "bool",
            HostValue::Int(_) => "int",
            HostValue::Float(_) => "float",
            HostValue::Str(_) => "str",
            HostValue::Bytes(_) => "bytes",
            HostValue::List(_) => "list",
            HostValue::Map(_) => "map",
            HostValue::Named(..) => "named",
            HostValue::KeyVal(..) => "keyval",
            HostValue::Range { .. } => "range",
            HostValue::Value(_) => "value",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            HostValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Float, or an int widened to float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            HostValue::Float(v) => Some(*v),
            HostValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HostValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[HostValue]> {
        match self {
            HostValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            HostValue::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Value of the first map entry or named element called `name`.
    pub fn get(&self, name: &str) -> Option<&HostValue> {
        match self {
            HostValue::Map(entries) => entries.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            HostValue::List(items) => items.iter().find_map(|item| match item {
                HostValue::Named(n, v) if n == name => Some(v.as_ref()),
                _ => None,
            }),
            _ => None,
        }
    }

    pub fn named(name: impl Into<String>, value: impl Into<HostValue>) -> Self {
        HostValue::Named(name.into(), Box::new(value.into()))
    }

    pub fn keyval(key: impl Into<HostValue>, value: impl Into<HostValue>) -> Self {
        HostValue::KeyVal(Box::new(key.into()), Box::new(value.into()))
    }

    /// JSON rendering. Bytes become arrays of numbers, named pairs become
    /// single-entry objects, key-value pairs two-element arrays, and
    /// pass-through values their repr.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            HostValue::Null => Json::Null,
            HostValue::Bool(b) => Json::Bool(*b),
            HostValue::Int(i) => Json::from(*i),
            HostValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            HostValue::Str(s) => Json::String(s.clone()),
            HostValue::Bytes(bytes) => Json::Array(bytes.iter().map(|b| Json::from(*b)).collect()),
            HostValue::List(items) => Json::Array(items.iter().map(HostValue::to_json).collect()),
            HostValue::Map(entries) => Json::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            HostValue::Named(name, value) => {
                let mut object = serde_json::Map::new();
                object.insert(name.clone(), value.to_json());
                Json::Object(object)
            }
            HostValue::KeyVal(key, value) => Json::Array(vec![key.to_json(), value.to_json()]),
            HostValue::Range { start, end, step } => serde_json::json!({
                "start": start,
                "end": end,
                "step": step,
            }),
            HostValue::Value(value) => Json::String(value.repr()),
        }
    }
}

impl From<serde_json::Value> for HostValue {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => HostValue::Null,
            Json::Bool(b) => HostValue::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => HostValue::Int(i),
                None => HostValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => HostValue::Str(s),
            Json::Array(items) => HostValue::List(items.into_iter().map(HostValue::from).collect()),
            Json::Object(entries) => HostValue::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, HostValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<()> for HostValue {
    fn from(_: ()) -> Self {
        HostValue::Null
    }
}

impl From<bool> for HostValue {
    fn from(v: bool) -> Self {
        HostValue::Bool(v)
    }
}

impl From<i64> for HostValue {
    fn from(v: i64) -> Self {
        HostValue::Int(v)
    }
}

impl From<i32> for HostValue {
    fn from(v: i32) -> Self {
        HostValue::Int(v as i64)
    }
}

impl From<f64> for HostValue {
    fn from(v: f64) -> Self {
        HostValue::Float(v)
    }
}

impl From<&str> for HostValue {
    fn from(v: &str) -> Self {
        HostValue::Str(v.to_string())
    }
}

impl From<String> for HostValue {
    fn from(v: String) -> Self {
        HostValue::Str(v)
    }
}

impl From<&[u8]> for HostValue {
    fn from(v: &[u8]) -> Self {
        HostValue::Bytes(v.to_vec())
    }
}

impl From<Vec<HostValue>> for HostValue {
    fn from(items: Vec<HostValue>) -> Self {
        HostValue::List(items)
    }
}

impl From<Value> for HostValue {
    fn from(v: Value) -> Self {
        HostValue::Value(v)
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(HostValue::Null)
    }
}

impl Heap {
    /// Lowers host data into the heap (`from_pydict`).
    ///
    /// Maps become tuples of named pairs in insertion order, lists become
    /// tuples, scalars the matching scalar value. Nesting depth is bounded
    /// only by memory.
    pub fn from_host(&self, host: HostValue) -> Result<Value> {
        let mut tasks = vec![Lower::Visit(host)];
        let mut built: Vec<Value> = Vec::new();

        while let Some(task) = tasks.pop() {
            match task {
                Lower::Visit(host) => match host {
                    HostValue::Null => built.push(self.new_null()),
                    HostValue::Bool(b) => built.push(self.new_bool(b)),
                    HostValue::Int(i) => built.push(self.new_int(i)),
                    HostValue::Float(f) => built.push(self.new_float(f)),
                    HostValue::Str(s) => built.push(self.new_string(s)),
                    HostValue::Bytes(b) => built.push(self.new_bytes(b)),
                    HostValue::List(items) => {
                        tasks.push(Lower::Tuple(items.len()));
                        tasks.extend(items.into_iter().rev().map(Lower::Visit));
                    }
                    HostValue::Map(entries) => {
                        let (names, items): (Vec<_>, Vec<_>) = entries.into_iter().unzip();
                        tasks.push(Lower::Map(names));
                        tasks.extend(items.into_iter().rev().map(Lower::Visit));
                    }
                    HostValue::Named(name, item) => {
                        tasks.push(Lower::Named(name));
                        tasks.push(Lower::Visit(*item));
                    }
                    HostValue::KeyVal(key, value) => {
                        tasks.push(Lower::KeyVal);
                        tasks.push(Lower::Visit(*value));
                        tasks.push(Lower::Visit(*key));
                    }
                    HostValue::Range { start, end, step } => {
                        built.push(self.new_range(start, end, step)?)
                    }
                    HostValue::Value(value) => {
                        self.check_owned(&value)?;
                        built.push(value);
                    }
                },
                Lower::Tuple(count) => {
                    let elements = take_last(&mut built, count)?;
                    built.push(self.new_tuple(&elements)?);
                }
                Lower::Map(names) => {
                    let values = take_last(&mut built, names.len())?;
                    let elements = names
                        .into_iter()
                        .zip(values.iter())
                        .map(|(name, value)| self.new_named(name, value))
                        .collect::<Result<Vec<_>>>()?;
                    built.push(self.new_tuple(&elements)?);
                }
                Lower::Named(name) => {
                    let value = pop_built(&mut built)?;
                    built.push(self.new_named(name, &value)?);
                }
                Lower::KeyVal => {
                    let value = pop_built(&mut built)?;
                    let key = pop_built(&mut built)?;
                    built.push(self.new_keyval(&key, &value)?);
                }
            }
        }

        pop_built(&mut built)
    }

    /// Lowers parsed JSON; objects keep their key order.
    pub fn from_json(&self, json: &serde_json::Value) -> Result<Value> {
        self.from_host(HostValue::from(json.clone()))
    }
}

/// Pending work while lowering: visit a host node, or assemble a container
/// from the values its children left on the output stack.
enum Lower {
    Visit(HostValue),
    Tuple(usize),
    Map(Vec<String>),
    Named(String),
    KeyVal,
}

fn take_last(built: &mut Vec<Value>, count: usize) -> Result<Vec<Value>> {
    let at = built
        .len()
        .checked_sub(count)
        .ok_or_else(|| Error::marshal("lowering lost track of its operands"))?;
    Ok(built.split_off(at))
}

fn pop_built(built: &mut Vec<Value>) -> Result<Value> {
    built
        .pop()
        .ok_or_else(|| Error::marshal("lowering lost track of its operands"))
}

impl Value {
    /// Lifts this value into host data.
    ///
    /// Scalars unwrap, tuples become lists, pairs and ranges keep their
    /// shape, and callables and wrappers pass through as [`HostValue::Value`]. Shared
    /// children are copied once per reference; a cycle is a marshal error.
    pub fn to_host(&self) -> Result<HostValue> {
        let handle = self.handle();
        let core = self.core.clone();
        self.core.with_gc(|gc| lift(gc, &core, handle))
    }
}

enum Lift {
    Visit(GcHandle),
    List(GcHandle, usize),
    KeyVal(GcHandle),
    Named(GcHandle, String),
}

fn lift(gc: &mut GcHeap, core: &Rc<HeapCore>, root: GcHandle) -> Result<HostValue> {
    let mut tasks = vec![Lift::Visit(root)];
    let mut lifted: Vec<HostValue> = Vec::new();
    // Containers currently being lifted; meeting one again means a cycle.
    let mut on_path: HashSet<GcHandle> = HashSet::new();

    while let Some(task) = tasks.pop() {
        match task {
            Lift::Visit(handle) => {
                if matches!(
                    gc.get(handle),
                    HeapObject::NativeFunction { .. }
                        | HeapObject::Lambda { .. }
                        | HeapObject::Wrapper { .. }
                ) {
                    gc.retain(handle);
                    lifted.push(HostValue::Value(Value::from_retained(core.clone(), handle)));
                    continue;
                }
                let object = gc.get(handle);
                let is_container = matches!(
                    object,
                    HeapObject::Tuple(_) | HeapObject::KeyVal { .. } | HeapObject::Named { .. }
                );
                if is_container && !on_path.insert(handle) {
                    return Err(Error::marshal("cannot marshal a cyclic value graph"));
                }
                match object {
                    HeapObject::Integer(i) => lifted.push(HostValue::Int(*i)),
                    HeapObject::Float(f) => lifted.push(HostValue::Float(*f)),
                    HeapObject::Boolean(b) => lifted.push(HostValue::Bool(*b)),
                    HeapObject::String(s) => lifted.push(HostValue::Str(s.clone())),
                    HeapObject::Bytes(b) => lifted.push(HostValue::Bytes(b.clone())),
                    HeapObject::Null => lifted.push(HostValue::Null),
                    HeapObject::Range { start, end, step } => lifted.push(HostValue::Range {
                        start: *start,
                        end: *end,
                        step: *step,
                    }),
                    HeapObject::Tuple(elements) => {
                        tasks.push(Lift::List(handle, elements.len()));
                        tasks.extend(elements.iter().rev().map(|e| Lift::Visit(*e)));
                    }
                    HeapObject::KeyVal { key, value } => {
                        tasks.push(Lift::KeyVal(handle));
                        tasks.push(Lift::Visit(*value));
                        tasks.push(Lift::Visit(*key));
                    }
                    HeapObject::Named { name, value } => {
                        tasks.push(Lift::Named(handle, name.clone()));
                        tasks.push(Lift::Visit(*value));
                    }
                    HeapObject::NativeFunction { .. }
                    | HeapObject::Lambda { .. }
                    | HeapObject::Wrapper { .. } => {}
                }
            }
            Lift::List(handle, count) => {
                on_path.remove(&handle);
                let at = lifted.len().saturating_sub(count);
                let items = lifted.split_off(at);
                lifted.push(HostValue::List(items));
            }
            Lift::KeyVal(handle) => {
                on_path.remove(&handle);
                let value = lifted.pop().unwrap_or(HostValue::Null);
                let key = lifted.pop().unwrap_or(HostValue::Null);
                lifted.push(HostValue::keyval(key, value));
            }
            Lift::Named(handle, name) => {
                on_path.remove(&handle);
                let value = lifted.pop().unwrap_or(HostValue::Null);
                lifted.push(HostValue::Named(name, Box::new(value)));
            }
        }
    }

    Ok(lifted.pop().unwrap_or(HostValue::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::value::ValueKind;

    fn sample() -> HostValue {
        HostValue::Map(vec![
            ("A".into(), 1.into()),
            ("B".into(), 2.5.into()),
            ("C".into(), "hello".into()),
            ("D".into(), HostValue::Null),
            ("E".into(), HostValue::Bytes(b"binary".to_vec())),
            (
                "F".into(),
                HostValue::List(vec![
                    1.into(),
                    2.into(),
                    HostValue::Map(vec![("G".into(), 3.14.into()), ("H".into(), "world".into())]),
                ]),
            ),
        ])
    }

    #[test]
    fn maps_lower_to_tuples_of_named_pairs() {
        let heap = Heap::new();
        let value = heap.from_host(sample()).unwrap();
        assert_eq!(value.kind(), ValueKind::Tuple);
        assert_eq!(value.len(), Some(6));

        let third = value.get(2).unwrap();
        assert_eq!(third.name().unwrap(), "C");
        assert_eq!(
            third.get_value().unwrap().as_string().as_deref(),
            Some("hello")
        );

        let nested = value.attr("F").unwrap().get(2).unwrap();
        assert_eq!(nested.attr("H").unwrap().as_string().as_deref(), Some("world"));
    }

    #[test]
    fn lift_preserves_shape() {
        let heap = Heap::new();
        let value = heap.from_host(sample()).unwrap();
        let host = value.to_host().unwrap();
        let HostValue::List(items) = &host else {
            panic!("expected list, got {:?}", host);
        };
        assert_eq!(items[0], HostValue::named("A", 1));
        assert_eq!(host.get("C"), Some(&HostValue::Str("hello".into())));
    }

    #[test]
    fn callables_pass_through() {
        let heap = Heap::new();
        let lambda = heap.new_lambda();
        let host = lambda.to_host().unwrap();
        assert_eq!(host.as_value(), Some(&lambda));
        let back = heap.from_host(host).unwrap();
        assert_eq!(back, lambda);
    }

    #[test]
    fn json_objects_keep_key_order() {
        let heap = Heap::new();
        let json: serde_json::Value =
            serde_json::from_str(r#"{"z": 1, "a": [true, null], "m": {"k": "v"}}"#).unwrap();
        let value = heap.from_json(&json).unwrap();
        assert_eq!(value.get(0).unwrap().name().unwrap(), "z");
        assert_eq!(value.get(1).unwrap().name().unwrap(), "a");
        assert_eq!(value.to_host().unwrap().to_json(), serde_json::json!([
            {"z": 1},
            {"a": [true, null]},
            {"m": [{"k": "v"}]}
        ]));
    }

    #[test]
    fn foreign_pass_through_is_a_marshal_error() {
        let heap = Heap::new();
        let other = Heap::new();
        let err = heap
            .from_host(HostValue::Value(other.new_int(1)))
            .unwrap_err();
        assert!(matches!(err, Error::Marshal { .. }));
    }

    #[test]
    fn lowering_and_dropping_returns_to_baseline() {
        let heap = Heap::new();
        let baseline = heap.object_count();
        let value = heap.from_host(sample()).unwrap();
        assert!(heap.object_count() > baseline);
        drop(value);
        assert_eq!(heap.object_count(), baseline);
    }

    fn nested_list(depth: usize) -> HostValue {
        let mut host = HostValue::Int(7);
        for _ in 0..depth {
            host = HostValue::List(vec![host]);
        }
        host
    }

    #[test]
    fn deep_host_structures_lower_and_lift_losslessly() {
        let heap = Heap::new();
        let baseline = heap.object_count();
        let value = heap.from_host(nested_list(5_000)).unwrap();

        let mut cursor = value.clone();
        for _ in 0..5_000 {
            assert_eq!(cursor.len(), Some(1));
            cursor = cursor.get(0).unwrap();
        }
        assert_eq!(cursor.as_int(), Some(7));

        let mut host = value.to_host().unwrap();
        let mut levels = 0;
        while let HostValue::List(mut items) = host {
            assert_eq!(items.len(), 1);
            host = items.pop().unwrap();
            levels += 1;
        }
        assert_eq!(levels, 5_000);
        assert_eq!(host, HostValue::Int(7));

        drop((cursor, value));
        assert_eq!(heap.object_count(), baseline);
    }

    #[test]
    fn shared_children_lift_once_per_reference() {
        let heap = Heap::new();
        let shared = heap.new_string("s");
        let tuple = heap.new_tuple(&[shared.clone(), shared]).unwrap();
        assert_eq!(
            tuple.to_host().unwrap(),
            HostValue::List(vec!["s".into(), "s".into()])
        );
    }

    #[test]
    fn cyclic_graph_does_not_lift() {
        let heap = Heap::new();
        let pair = heap.new_keyval(&heap.new_null(), &heap.new_null()).unwrap();
        pair.set_value(&pair).unwrap();
        let err = pair.to_host().unwrap_err();
        assert!(matches!(err, Error::Marshal { .. }));
        drop(pair);
        heap.collect();
        assert_eq!(heap.object_count(), 0);
    }
}
