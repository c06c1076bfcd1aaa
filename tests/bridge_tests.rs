use xlang::{
    Error, Heap, HostValue, Lambda, ParamSpec, TypeHint, Value, contract_from_params,
};

fn add_function(heap: &Heap) -> Value {
    let contract = contract_from_params(
        heap,
        &[
            ParamSpec::receiver(),
            ParamSpec::new("a").with_hint(TypeHint::Int),
            ParamSpec::new("b").with_hint(TypeHint::Int),
        ],
    )
    .unwrap();
    heap.wrap_function(
        "add",
        |_, args| {
            let a = args.get("a").and_then(HostValue::as_int).ok_or("a must be an int")?;
            let b = args.get("b").and_then(HostValue::as_int).ok_or("b must be an int")?;
            Ok(HostValue::Int(a + b))
        },
        &contract,
    )
    .unwrap()
}

#[test]
fn script_calls_wrapped_host_function() {
    let heap = Heap::new();
    let add = add_function(&heap);
    let defaults = heap.new_tuple(&[heap.new_named("add", &add).unwrap()]).unwrap();

    let lambda = Lambda::new(&heap);
    lambda.load("@required add; add(1, 2)", &defaults, None).unwrap();
    assert_eq!(lambda.call(&[]).unwrap().as_int(), Some(3));
}

#[test]
fn receiver_is_not_part_of_the_contract() {
    let heap = Heap::new();
    let contract = contract_from_params(
        &heap,
        &[
            ParamSpec::receiver(),
            ParamSpec::new("x").with_default(5),
            ParamSpec::var_positional("args"),
            ParamSpec::var_keyword("kwargs"),
        ],
    )
    .unwrap();
    assert_eq!(contract.repr(), r#"VMTuple((VMNamed("x" => VMInt(5)),))"#);
}

#[test]
fn hints_give_zero_defaults() {
    let heap = Heap::new();
    let add = add_function(&heap);
    assert_eq!(add.invoke(&[heap.new_int(4)]).unwrap().as_int(), Some(4));
    assert_eq!(add.invoke(&[]).unwrap().as_int(), Some(0));
}

#[test]
fn named_arguments_bind_by_name() {
    let heap = Heap::new();
    let sub = heap
        .wrap_function(
            "sub",
            |_, args| {
                let positional = args.positional();
                match (positional[0].as_int(), positional[1].as_int()) {
                    (Some(a), Some(b)) => Ok(HostValue::Int(a - b)),
                    _ => Err("expected ints".to_string()),
                }
            },
            &contract_from_params(&heap, &[ParamSpec::new("a"), ParamSpec::new("b")]).unwrap(),
        )
        .unwrap();
    let defaults = heap.new_tuple(&[heap.new_named("sub", &sub).unwrap()]).unwrap();

    let lambda = Lambda::new(&heap);
    lambda.load("sub(b => 1, a => 10)", &defaults, None).unwrap();
    assert_eq!(lambda.call(&[]).unwrap().as_int(), Some(9));
}

#[test]
fn host_errors_surface_as_execution_errors() {
    let heap = Heap::new();
    let add = add_function(&heap);
    let err = add.invoke(&[heap.new_string("x")]).unwrap_err();
    assert_eq!(
        err,
        Error::execution("native function `add` failed: a must be an int")
    );
}

#[test]
fn host_functions_can_return_runtime_values() {
    let heap = Heap::new();
    let pair = heap
        .wrap_function(
            "pair",
            |heap, args| {
                let key = heap.from_host(args.get("k").cloned().unwrap_or(HostValue::Null))
                    .map_err(|err| err.to_string())?;
                let value = heap.new_int(args.len() as i64);
                let kv = heap.new_keyval(&key, &value).map_err(|err| err.to_string())?;
                Ok(HostValue::Value(kv))
            },
            &contract_from_params(&heap, &[ParamSpec::new("k")]).unwrap(),
        )
        .unwrap();
    let result = pair.invoke(&[heap.new_string("key")]).unwrap();
    assert_eq!(result.repr(), r#"VMKeyVal(VMString("key"), VMInt(1))"#);
}

#[test]
fn lambdas_are_callable_from_the_host() {
    let heap = Heap::new();
    let lambda = Lambda::new(&heap);
    let defaults = heap
        .new_tuple(&[heap.new_named("n", &heap.new_int(1)).unwrap()])
        .unwrap();
    lambda.load("@required n; n * 10", &defaults, None).unwrap();

    let seven = heap.new_named("n", &heap.new_int(7)).unwrap();
    assert_eq!(lambda.value().invoke(&[seven]).unwrap().as_int(), Some(70));
    assert_eq!(lambda.value().invoke(&[heap.new_int(3)]).unwrap().as_int(), Some(30));
}

#[test]
fn deeply_nested_arguments_reach_the_host() {
    let heap = Heap::new();
    let contract = contract_from_params(&heap, &[ParamSpec::new("v")]).unwrap();
    let depth = heap
        .wrap_function(
            "depth",
            |_, args| {
                let mut levels = 0;
                let mut current = args.get("v").ok_or("missing v")?;
                while let HostValue::List(items) = current {
                    levels += 1;
                    current = items.first().ok_or("empty level")?;
                }
                Ok(HostValue::Int(levels))
            },
            &contract,
        )
        .unwrap();

    let mut nested = heap.new_int(0);
    for _ in 0..300 {
        nested = heap.new_tuple(&[nested]).unwrap();
    }
    assert_eq!(depth.invoke(&[nested]).unwrap().as_int(), Some(300));
}
