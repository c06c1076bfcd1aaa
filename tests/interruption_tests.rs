use std::{
    cell::Cell,
    rc::Rc,
    time::{Duration, Instant},
};

use xlang::{Error, Heap, Lambda};

#[test]
fn probe_stops_an_unbounded_loop() {
    let heap = Heap::new();
    let baseline = heap.object_count();

    let started = Instant::now();
    let lambda = Lambda::new(&heap);
    let defaults = heap.new_tuple(&[]).unwrap();
    lambda
        .load(
            "i := 0; while true { i = i + 1; }",
            &defaults,
            Some(Box::new(move || {
                if started.elapsed() > Duration::from_millis(50) {
                    Err("timed out".to_string())
                } else {
                    Ok(())
                }
            })),
        )
        .unwrap();

    let err = lambda.call(&[]).unwrap_err();
    assert_eq!(err, Error::execution("run condition failed: timed out"));

    drop(defaults);
    drop(lambda);
    heap.collect();
    assert_eq!(heap.object_count(), baseline);
}

#[test]
fn probe_is_polled_once_per_iteration() {
    let heap = Heap::new();
    let polls = Rc::new(Cell::new(0));
    let counter = polls.clone();
    let lambda = Lambda::new(&heap);
    lambda
        .load(
            "i := 0; while i < 10 { i = i + 1; } i",
            &heap.new_tuple(&[]).unwrap(),
            Some(Box::new(move || {
                counter.set(counter.get() + 1);
                Ok(())
            })),
        )
        .unwrap();

    assert_eq!(lambda.call(&[]).unwrap().as_int(), Some(10));
    assert_eq!(polls.get(), 10);
}

#[test]
fn outer_probe_reaches_nested_script_lambdas() {
    let heap = Heap::new();
    let polls = Rc::new(Cell::new(0));
    let counter = polls.clone();
    let lambda = Lambda::new(&heap);
    lambda
        .load(
            "spin := () -> { while true { } }; spin()",
            &heap.new_tuple(&[]).unwrap(),
            Some(Box::new(move || {
                counter.set(counter.get() + 1);
                if counter.get() >= 100 {
                    Err("enough".to_string())
                } else {
                    Ok(())
                }
            })),
        )
        .unwrap();

    let err = lambda.call(&[]).unwrap_err();
    assert_eq!(err, Error::execution("run condition failed: enough"));
    assert_eq!(polls.get(), 100);
}

#[test]
fn lambda_is_reusable_after_an_abort() {
    let heap = Heap::new();
    let armed = Rc::new(Cell::new(true));
    let flag = armed.clone();
    let lambda = Lambda::new(&heap);
    lambda
        .load(
            "@required n; total := 0; while n > 0 { total = total + n; n = n - 1; } total",
            &heap
                .new_tuple(&[heap.new_named("n", &heap.new_int(4)).unwrap()])
                .unwrap(),
            Some(Box::new(move || {
                if flag.get() {
                    Err("armed".to_string())
                } else {
                    Ok(())
                }
            })),
        )
        .unwrap();

    assert!(lambda.call(&[]).is_err());
    armed.set(false);
    assert_eq!(lambda.call(&[]).unwrap().as_int(), Some(10));
}
