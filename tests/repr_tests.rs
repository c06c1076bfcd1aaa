use insta::assert_snapshot;
use xlang::{Heap, HostValue};

#[test]
fn keyval_of_scalars() {
    let heap = Heap::new();
    let pair = heap
        .new_keyval(&heap.new_int(10), &heap.new_string("hello"))
        .unwrap();
    assert_snapshot!(pair.repr(), @r#"VMKeyVal(VMInt(10), VMString("hello"))"#);
}

#[test]
fn identical_structure_gives_identical_text() {
    let heap = Heap::new();
    let build = || {
        heap.from_host(HostValue::List(vec![
            HostValue::keyval("a", 1),
            HostValue::named("b", HostValue::Null),
        ]))
        .unwrap()
    };
    assert_eq!(build().repr(), build().repr());
}

#[test]
fn tuple_of_pairs() {
    let heap = Heap::new();
    let value = heap
        .from_host(HostValue::List(vec![
            HostValue::keyval("a", 1),
            HostValue::named("b", HostValue::Null),
            HostValue::Bytes(b"\x01z".to_vec()),
        ]))
        .unwrap();
    assert_snapshot!(
        value.repr(),
        @r#"VMTuple((VMKeyVal(VMString("a"), VMInt(1)), VMNamed("b" => VMNull()), VMBytes(b"\x01z")))"#
    );
}

#[test]
fn single_element_tuple_and_ranges() {
    let heap = Heap::new();
    let value = heap
        .new_tuple(&[
            heap.new_tuple(&[heap.new_bool(false)]).unwrap(),
            heap.new_range(0, 10, 2).unwrap(),
            heap.new_range(1, 4, 1).unwrap(),
        ])
        .unwrap();
    assert_snapshot!(
        value.repr(),
        @"VMTuple((VMTuple((VMBoolean(false),)), VMRange(0, 10, 2), VMRange(1, 4)))"
    );
}

#[test]
fn callables_show_their_contract() {
    let heap = Heap::new();
    let lambda = xlang::Lambda::new(&heap);
    assert_eq!(lambda.value().repr(), "VMLambda()");
    lambda
        .load("@required A; @required B; A", &heap.new_tuple(&[]).unwrap(), None)
        .unwrap();
    assert_eq!(lambda.value().repr(), "VMLambda(A, B)");

    let function = heap
        .wrap_function("noop", |_, _| Ok(HostValue::Null), &heap.new_tuple(&[]).unwrap())
        .unwrap();
    assert_eq!(function.repr(), "VMNativeFunction(noop)");
}
