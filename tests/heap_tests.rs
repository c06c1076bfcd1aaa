use xlang::{Heap, Value, ValueKind};

fn nested(heap: &Heap) -> Value {
    let inner = heap
        .new_keyval(&heap.new_int(10), &heap.new_string("hello"))
        .unwrap();
    let named = heap.new_named("x", &heap.new_float(1.5)).unwrap();
    heap.new_tuple(&[inner, named, heap.new_range(0, 3, 1).unwrap()])
        .unwrap()
}

#[test]
fn acyclic_graph_returns_to_baseline_on_drop() {
    let heap = Heap::new();
    let baseline = heap.object_count();

    let value = nested(&heap);
    assert!(heap.object_count() > baseline);

    drop(value);
    assert_eq!(heap.object_count(), baseline);
}

#[test]
fn shared_children_survive_until_last_holder_drops() {
    let heap = Heap::new();
    let baseline = heap.object_count();

    let shared = heap.new_string("shared");
    let a = heap.new_tuple(&[shared.clone()]).unwrap();
    let b = heap.new_tuple(&[shared.clone(), shared]).unwrap();

    drop(a);
    assert_eq!(b.get(0).unwrap().as_string().as_deref(), Some("shared"));
    drop(b);
    assert_eq!(heap.object_count(), baseline);
}

#[test]
fn cycle_is_reclaimed_only_by_collect() {
    let heap = Heap::new();
    let baseline = heap.object_count();

    let pair = heap
        .new_keyval(&heap.new_string("root"), &heap.new_null())
        .unwrap();
    let tuple = heap
        .new_tuple(&[heap.new_int(1), pair.clone()])
        .unwrap();
    pair.set_value(&tuple).unwrap();

    drop(pair);
    drop(tuple);
    assert!(heap.object_count() > baseline);

    heap.collect();
    assert_eq!(heap.object_count(), baseline);
}

#[test]
fn collect_keeps_everything_the_host_still_holds() {
    let heap = Heap::new();
    let pair = heap
        .new_keyval(&heap.new_string("k"), &heap.new_null())
        .unwrap();
    let tuple = heap.new_tuple(&[pair.clone()]).unwrap();
    pair.set_value(&tuple).unwrap();
    drop(tuple);

    heap.collect();
    let inner = pair.get_value().unwrap();
    assert_eq!(inner.kind(), ValueKind::Tuple);
    assert_eq!(inner.get(0).unwrap(), pair);
}

#[test]
fn values_from_another_heap_are_rejected() {
    let a = Heap::new();
    let b = Heap::new();
    let foreign = b.new_int(1);
    let err = a.new_tuple(&[foreign]).unwrap_err();
    assert!(matches!(err, xlang::Error::Marshal { .. }));
}

#[test]
fn disabled_auto_collect_still_frees_acyclic_values() {
    let heap = Heap::with_config(xlang::RuntimeConfig {
        auto_collect: false,
        ..Default::default()
    });
    for i in 0..5_000 {
        let _ = heap.new_tuple(&[heap.new_int(i)]).unwrap();
    }
    assert_eq!(heap.object_count(), 0);
    assert_eq!(heap.total_collections(), 0);
}

#[test]
fn wrapper_cycle_through_a_tuple_needs_collect() {
    let heap = Heap::new();
    let baseline = heap.object_count();

    let wrapper = heap.new_wrapper(&heap.new_null()).unwrap();
    let tuple = heap.new_tuple(&[wrapper.clone()]).unwrap();
    wrapper.set_value(&tuple).unwrap();
    assert_eq!(wrapper.kind(), ValueKind::Wrapper);
    assert_eq!(wrapper.repr(), "VMWrapper(VMTuple((...,)))");

    drop((wrapper, tuple));
    assert!(heap.object_count() > baseline);
    heap.collect();
    assert_eq!(heap.object_count(), baseline);
}
