//! # Graph Benchmarks
//!
//! Performance benchmarks for wysiwym-core clone and anchor operations.
//!
//! Run with: `cargo bench -p wysiwym-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use wysiwym_core::{
    ClassProperty, ClassSpec, ContentGraph, ContentValue, EdgeKind, Schema, clone_subgraph,
    snapshot,
};

/// Sizes stay well inside the identifier space: a chain of N nodes uses
/// 2N - 1 identifiers and its copy another 2N - 1.
const SIZES: [usize; 3] = [100, 1000, 4000];

fn person_schema() -> Schema {
    Schema::new().with_class(
        "Person",
        ClassSpec::new()
            .property(ClassProperty::new("hasName").min(1).max(1))
            .property(ClassProperty::new("knows")),
    )
}

/// Create a chain of N `Person` nodes linked by `knows`.
fn create_chain(size: usize) -> ContentGraph {
    let mut graph = ContentGraph::new();
    let mut previous = None;
    for _ in 0..size {
        let person = match previous {
            None => graph.create_root("Person", ContentValue::Resource),
            Some(_) => graph.create_node("Person", ContentValue::Resource),
        }
        .expect("node");
        if let Some(prev) = previous {
            graph
                .attach(prev, "knows", person, EdgeKind::Plain)
                .expect("edge");
        }
        previous = Some(person);
    }
    graph
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");

    for size in &SIZES {
        let graph = create_chain(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(snapshot(&graph).expect("snapshot")));
        });
    }

    group.finish();
}

fn bench_clone_subgraph(c: &mut Criterion) {
    let mut group = c.benchmark_group("clone_subgraph");

    for size in &SIZES {
        let graph = create_chain(*size);
        let root = graph.root().expect("root");
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(clone_subgraph(&graph, root).expect("clone")));
        });
    }

    group.finish();
}

fn bench_refresh_anchors(c: &mut Criterion) {
    let mut group = c.benchmark_group("refresh_anchors");
    let ontology = person_schema();

    for size in &SIZES {
        let mut graph = create_chain(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(graph.refresh_anchors(&ontology).expect("refresh")));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_snapshot,
    bench_clone_subgraph,
    bench_refresh_anchors,
);

criterion_main!(benches);
