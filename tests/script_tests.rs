use xlang::{Error, Heap, Lambda, RuntimeConfig, Value};

fn eval_with(heap: &Heap, source: &str) -> Result<Value, Error> {
    let lambda = Lambda::new(heap);
    lambda.load(source, &heap.new_tuple(&[])?, None)?;
    lambda.call(&[])
}

fn eval(source: &str) -> Result<Value, Error> {
    eval_with(&Heap::new(), source)
}

fn int(source: &str) -> i64 {
    eval(source)
        .unwrap_or_else(|err| panic!("{}\n{}", source, err))
        .as_int()
        .unwrap_or_else(|| panic!("`{}` did not produce an Int", source))
}

fn truthy(source: &str) -> bool {
    eval(source)
        .unwrap_or_else(|err| panic!("{}\n{}", source, err))
        .is_truthy()
}

#[test]
fn if_else_chains() {
    let source = "x := 15; r := 0; if x > 20 { r = 1; } else if x > 10 { r = 2; } else { r = 3; } r";
    assert_eq!(int(source), 2);
}

#[test]
fn while_with_break_and_continue() {
    let source = "
        i := 0;
        odd := 0;
        while true {
            i = i + 1;
            if i > 9 { break; }
            if i % 2 == 0 { continue; }
            odd = odd + i;
        }
        odd
    ";
    assert_eq!(int(source), 1 + 3 + 5 + 7 + 9);
}

#[test]
fn logical_operators_short_circuit() {
    assert_eq!(int("0 || 7"), 7);
    assert_eq!(int("3 && 4"), 4);
    assert!(!truthy("null and missing"));
    assert!(truthy("true or missing"));
    assert!(truthy("not ()"));
    assert!(!truthy("!\"text\""));
}

#[test]
fn truthiness_of_empty_values() {
    for falsy in ["null", "false", "0", "0.0", "\"\"", "b\"\"", "()"] {
        assert!(!truthy(falsy), "{} should be falsy", falsy);
    }
    for truthy_source in ["1", "-0.5", "\"a\"", "(0,)", "0..1"] {
        assert!(truthy(truthy_source), "{} should be truthy", truthy_source);
    }
}

#[test]
fn comparisons_and_equality() {
    assert!(truthy("1 < 1.5 and \"a\" < \"b\""));
    assert!(truthy("(1, (a => 2)) == (1, (a => 2))"));
    assert!(truthy("(1, 2) != (2, 1)"));
}

#[test]
fn return_ends_the_program_early() {
    assert_eq!(int("x := 1; if x { return 10; } 20"), 10);
    assert!(eval("x := 1;").unwrap().is_null());
}

#[test]
fn lambdas_with_defaults_and_named_arguments() {
    assert_eq!(int("f := (x, y => 10) -> x + y; f(1)"), 11);
    assert_eq!(int("f := (x, y => 10) -> x + y; f(1, 2)"), 3);
    assert_eq!(int("f := (x, y => 10) -> x * y; f(y => 5, x => 2)"), 10);
}

#[test]
fn lambda_parameters_without_defaults_are_required() {
    let err = eval("f := (x, y => 1) -> x; f(y => 2)").unwrap_err();
    assert_eq!(err, Error::execution("missing required binding `x`"));
}

#[test]
fn lambdas_see_only_their_parameters() {
    let err = eval("outer := 5; f := () -> outer; f()").unwrap_err();
    assert_eq!(err, Error::execution("unbound name `outer`"));
}

#[test]
fn block_bodied_lambdas_and_recursion_by_argument() {
    let source = "
        fact := (self, n) -> {
            if n <= 1 { return 1; }
            return n * self(self, n - 1);
        };
        fact(fact, 10)
    ";
    assert_eq!(int(source), 3_628_800);
}

#[test]
fn runaway_recursion_hits_the_depth_limit() {
    let heap = Heap::with_config(RuntimeConfig {
        max_call_depth: 32,
        ..RuntimeConfig::default()
    });
    let err = eval_with(&heap, "f := (f) -> f(f); f(f)").unwrap_err();
    assert_eq!(err, Error::execution("maximum call depth of 32 exceeded"));
}

#[test]
fn lambda_values_have_a_repr() {
    let value = eval("(a, b => 1) -> a").unwrap();
    assert_eq!(value.repr(), "VMLambda(a)");
}

#[test]
fn program_values_are_released_after_the_call() {
    let heap = Heap::new();
    let baseline = heap.object_count();
    {
        let lambda = Lambda::new(&heap);
        let defaults = heap.new_tuple(&[]).unwrap();
        lambda
            .load(
                "t := (); i := 0; while i < 50 { t = t + (i,); i = i + 1; } t[49]",
                &defaults,
                None,
            )
            .unwrap();
        let result = lambda.call(&[]).unwrap();
        assert_eq!(result.as_int(), Some(49));
    }
    assert_eq!(heap.object_count(), baseline);
}

#[test]
fn loops_after_a_long_prelude_still_jump_correctly() {
    let mut source: String = (0..12_000).map(|i| format!("x{} := {};\n", i, i)).collect();
    source.push_str("n := 0; while n < 3 { n = n + 1; } if n == 3 { n = n * 10; } n");
    assert_eq!(int(&source), 30);
}
