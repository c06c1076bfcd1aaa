use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use xlang::{Heap, HostValue, Lambda, ParamSpec, contract_from_params};

struct Scenario {
    name: &'static str,
    source: &'static str,
    n: i64,
}

const COUNTING_LOOP: &str = "
@required n;
i := 0;
total := 0;
while i < n {
    total = total + i % 7;
    i = i + 1;
}
total
";

const SCRIPT_CALLS: &str = "
@required n;
step := (acc, x => 1) -> acc + x;
i := 0;
acc := 0;
while i < n {
    acc = step(acc, x => i);
    i = i + 1;
}
acc
";

const HOST_CALLS: &str = "
@required n;
@required add;
i := 0;
acc := 0;
while i < n {
    acc = add(acc, i);
    i = i + 1;
}
acc
";

fn build_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "counting_loop_10k",
            source: COUNTING_LOOP,
            n: 10_000,
        },
        Scenario {
            name: "script_calls_2k",
            source: SCRIPT_CALLS,
            n: 2_000,
        },
        Scenario {
            name: "host_calls_2k",
            source: HOST_CALLS,
            n: 2_000,
        },
    ]
}

fn load(heap: &Heap, source: &str) -> Lambda {
    let add = heap
        .wrap_function(
            "add",
            |_, args| {
                let a = args.get("a").and_then(HostValue::as_int).unwrap_or(0);
                let b = args.get("b").and_then(HostValue::as_int).unwrap_or(0);
                Ok(HostValue::Int(a + b))
            },
            &contract_from_params(heap, &[ParamSpec::new("a"), ParamSpec::new("b")]).unwrap(),
        )
        .unwrap();
    let defaults = heap
        .new_tuple(&[heap.new_named("add", &add).unwrap()])
        .unwrap();
    let lambda = Lambda::new(heap);
    lambda.load(source, &defaults, None).unwrap();
    lambda
}

fn bench_vm(c: &mut Criterion) {
    let mut group = c.benchmark_group("vm/run");

    for scenario in build_scenarios() {
        let heap = Heap::new();
        let lambda = load(&heap, scenario.source);
        let n = heap.new_int(scenario.n);
        group.throughput(Throughput::Elements(scenario.n as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(scenario.name),
            &n,
            |b, n| {
                b.iter(|| {
                    let result = lambda.call(&[("n", n)]).unwrap();
                    black_box(result);
                });
            },
        );
    }

    group.finish();
}

fn bench_load(c: &mut Criterion) {
    c.bench_function("vm/load_uncached", |b| {
        b.iter(|| {
            let heap = Heap::new();
            black_box(load(&heap, black_box(SCRIPT_CALLS)));
        });
    });
}

criterion_group!(benches, bench_vm, bench_load);
criterion_main!(benches);
