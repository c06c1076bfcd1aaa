use std::rc::Rc;

use crate::{
    bytecode::bytecode::Bytecode,
    runtime::{
        callable::ProbeChain,
        heap::Heap,
        host::HostValue,
        lambda::{Bindings, Lambda, Probe},
        vm::VM,
    },
};

fn new_vm(heap: &Heap, probes: ProbeChain) -> VM {
    VM::new(heap.clone(), Rc::new(Bytecode::default()), Bindings::new(), probes)
}

fn contract(heap: &Heap, names: &[&str]) -> crate::runtime::value::Value {
    let slots: Vec<_> = names
        .iter()
        .map(|name| heap.new_named(*name, &heap.new_null()).unwrap())
        .collect();
    heap.new_tuple(&slots).unwrap()
}

#[test]
fn calls_native_function_with_positional_args() {
    let heap = Heap::new();
    let add = heap
        .wrap_function(
            "add",
            |_, args| {
                let a = args.get("a").and_then(HostValue::as_int).unwrap_or(0);
                let b = args.get("b").and_then(HostValue::as_int).unwrap_or(0);
                Ok(HostValue::Int(a + b))
            },
            &contract(&heap, &["a", "b"]),
        )
        .unwrap();

    let mut vm = new_vm(&heap, ProbeChain::new());
    vm.push(add).unwrap();
    vm.push(heap.new_int(4)).unwrap();
    vm.push(heap.new_int(5)).unwrap();
    vm.execute_call(2).unwrap();

    assert_eq!(vm.pop().unwrap().as_int(), Some(9));
}

#[test]
fn calls_lambda_binding_named_argument() {
    let heap = Heap::new();
    let lambda = Lambda::new(&heap);
    let defaults = heap
        .new_tuple(&[heap.new_named("x", &heap.new_int(1)).unwrap()])
        .unwrap();
    lambda.load("@required x; x * 3", &defaults, None).unwrap();

    let mut vm = new_vm(&heap, ProbeChain::new());
    vm.push(lambda.value().clone()).unwrap();
    vm.push(heap.new_named("x", &heap.new_int(7)).unwrap()).unwrap();
    vm.execute_call(1).unwrap();

    assert_eq!(vm.pop().unwrap().as_int(), Some(21));
}

#[test]
fn calling_a_non_callable_fails() {
    let heap = Heap::new();
    let mut vm = new_vm(&heap, ProbeChain::new());
    vm.push(heap.new_int(1)).unwrap();
    let err = vm.execute_call(0).unwrap_err();
    assert_eq!(err, "not callable: Int");
}

#[test]
fn failing_probe_stops_the_call() {
    let heap = Heap::new();
    let probe = Probe::new(Box::new(|| Err("stop".to_string())));
    let probes = ProbeChain::new().extended(Some(&probe));
    let mut vm = new_vm(&heap, probes);
    vm.push(heap.new_native_function()).unwrap();
    let err = vm.execute_call(0).unwrap_err();
    assert_eq!(err, "run condition failed: stop");
}
