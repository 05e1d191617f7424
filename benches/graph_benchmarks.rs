use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use refgraph::{Defaults, Graph, NodeId};

/// Benchmark edge creation throughput through the reference API
fn bench_edge_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("edge_insertion");

    for size in [100, 1_000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let mut graph = Graph::new();
                let scene = graph
                    .create_node("Scene", Defaults::new().ref_list("nodes"))
                    .unwrap();
                for _ in 0..size {
                    let mesh = graph.create_node("Mesh", Defaults::new()).unwrap();
                    graph.add_ref(scene, "nodes", mesh).unwrap();
                }
                criterion::black_box(graph.edge_count());
            });
        });
    }
    group.finish();
}

/// Benchmark parent/child index queries
fn bench_child_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("child_query");

    for size in [100, 1_000, 10_000].iter() {
        let mut graph = Graph::new();
        let scene = graph
            .create_node("Scene", Defaults::new().ref_list("nodes"))
            .unwrap();
        let mut last = scene;
        for _ in 0..*size {
            let mesh = graph.create_node("Mesh", Defaults::new()).unwrap();
            graph.add_ref(scene, "nodes", mesh).unwrap();
            last = mesh;
        }

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                criterion::black_box(graph.children(scene).len());
                criterion::black_box(graph.parents(last).len());
            });
        });
    }
    group.finish();
}

fn deep_composition(depth: usize) -> (Graph, NodeId) {
    let mut graph = Graph::new();
    let mut child = graph.create_node("Leaf", Defaults::new()).unwrap();
    for _ in 0..depth {
        child = graph
            .create_node("Group", Defaults::new().child("inner", child))
            .unwrap();
    }
    (graph, child)
}

/// Benchmark cascading disposal of a deep chain of composed children
fn bench_dispose_cascade(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispose_cascade");

    for depth in [10, 100, 500].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(depth), depth, |b, &depth| {
            b.iter_batched(
                || deep_composition(depth),
                |(mut graph, root)| {
                    graph.dispose_node(root);
                    criterion::black_box(graph.edge_count());
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_edge_insertion,
    bench_child_query,
    bench_dispose_cascade
);
criterion_main!(benches);
