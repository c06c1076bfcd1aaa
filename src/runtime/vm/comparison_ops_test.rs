use std::rc::Rc;

use crate::{
    bytecode::{bytecode::Bytecode, op_code::OpCode},
    runtime::{callable::ProbeChain, heap::Heap, lambda::Bindings, value::Value, vm::VM},
};

fn compare(heap: &Heap, op: OpCode, left: Value, right: Value) -> Result<bool, String> {
    let mut vm = VM::new(
        heap.clone(),
        Rc::new(Bytecode::default()),
        Bindings::new(),
        ProbeChain::new(),
    );
    vm.push(left)?;
    vm.push(right)?;
    vm.execute_comparison(op)?;
    Ok(vm.pop()?.as_bool().unwrap())
}

#[test]
fn integers_and_floats_order_together() {
    let heap = Heap::new();
    assert!(compare(&heap, OpCode::OpLessThan, heap.new_int(1), heap.new_float(1.5)).unwrap());
    assert!(
        compare(&heap, OpCode::OpGreaterThanOrEqual, heap.new_float(2.0), heap.new_int(2)).unwrap()
    );
}

#[test]
fn strings_compare_lexically() {
    let heap = Heap::new();
    assert!(
        compare(&heap, OpCode::OpLessThan, heap.new_string("abc"), heap.new_string("abd"))
            .unwrap()
    );
}

#[test]
fn nan_is_unordered() {
    let heap = Heap::new();
    for op in [
        OpCode::OpLessThan,
        OpCode::OpLessThanOrEqual,
        OpCode::OpGreaterThan,
        OpCode::OpGreaterThanOrEqual,
    ] {
        assert!(!compare(&heap, op, heap.new_float(f64::NAN), heap.new_float(1.0)).unwrap());
    }
}

#[test]
fn equality_is_structural() {
    let heap = Heap::new();
    let a = heap.new_tuple(&[heap.new_int(1), heap.new_string("x")]).unwrap();
    let b = heap.new_tuple(&[heap.new_int(1), heap.new_string("x")]).unwrap();
    assert!(compare(&heap, OpCode::OpEqual, a, b).unwrap());
    assert!(compare(&heap, OpCode::OpNotEqual, heap.new_int(1), heap.new_string("1")).unwrap());
}

#[test]
fn ordering_unrelated_kinds_fails() {
    let heap = Heap::new();
    let err = compare(&heap, OpCode::OpLessThan, heap.new_null(), heap.new_int(1)).unwrap_err();
    assert_eq!(err, "cannot compare Null and Int");
}
