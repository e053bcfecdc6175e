//! Benchmarks for spark-mvvm
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use spark_mvvm::compiler::tokenizer::parse_text;
use spark_mvvm::{Node, ReactiveObject, Scope, Value, Vm, Watcher};

// =============================================================================
// STORE BENCHMARKS
// =============================================================================

fn bench_observe(c: &mut Criterion) {
    let data = json!({
        "user": { "name": "ada", "tags": ["a", "b", "c"] },
        "todos": [{ "text": "milk" }, { "text": "eggs" }]
    });
    c.bench_function("observe_nested", |b| {
        b.iter(|| black_box(Value::from_json(data.clone())))
    });
}

fn bench_object_set(c: &mut Criterion) {
    let data = ReactiveObject::from_json(json!({ "n": 0 }));
    let mut n = 0i64;
    c.bench_function("object_set_unwatched", |b| {
        b.iter(|| {
            n += 1;
            data.set("n", black_box(n)).unwrap()
        })
    });
}

// =============================================================================
// WATCHER BENCHMARKS
// =============================================================================

fn bench_watcher_create(c: &mut Criterion) {
    let scope = Scope::new(ReactiveObject::from_json(json!({ "a": { "b": { "c": 1 } } })));
    c.bench_function("watcher_create_depth3", |b| {
        b.iter(|| black_box(Watcher::new(scope.clone(), "a.b.c", |_, _, _| Ok(())).unwrap()))
    });
}

fn bench_watcher_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("watcher_fanout");
    for count in [1usize, 10, 100] {
        let data = ReactiveObject::from_json(json!({ "n": 0 }));
        let _watchers: Vec<Watcher> = (0..count)
            .map(|_| Watcher::new(Scope::new(data.clone()), "n", |_, _, _| Ok(())).unwrap())
            .collect();
        let mut n = 0i64;

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                n += 1;
                data.set("n", n).unwrap()
            })
        });
    }
    group.finish();
}

// =============================================================================
// COMPILER BENCHMARKS
// =============================================================================

fn bench_tokenize(c: &mut Criterion) {
    let text = "Hello {{user.name}}, you have {{count}} new {{{markup}}} messages";
    c.bench_function("parse_text", |b| b.iter(|| black_box(parse_text(black_box(text)))));
}

fn bench_list_rerender(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_push_rerender");
    for len in [10usize, 100] {
        let items: Vec<_> = (0..len).map(|i| json!({ "text": i })).collect();
        let vm = Vm::new(json!({ "items": items })).unwrap();
        let root = Node::element("ul").with_child(
            Node::element("li")
                .with_attr("v-for", "item in items")
                .with_child(Node::text("{{$index}}: {{item.text}}")),
        );
        let _view = vm.mount(&root).unwrap();
        let list = vm.get("items").unwrap();
        let list = list.as_array().unwrap().clone();

        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, _| {
            b.iter(|| {
                list.push(json!({ "text": "new" })).unwrap();
                list.pop().unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(store_benches, bench_observe, bench_object_set);

criterion_group!(watcher_benches, bench_watcher_create, bench_watcher_fanout);

criterion_group!(compiler_benches, bench_tokenize, bench_list_rerender);

criterion_main!(store_benches, watcher_benches, compiler_benches);
