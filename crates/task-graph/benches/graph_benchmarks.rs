//! Benchmarks for dependency graph ordering
//!
//! Run with: cargo bench -p devkit-task-graph

#![allow(clippy::unwrap_used)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use devkit_task_graph::{DependencyGraph, task_order};
use std::hint::black_box;
use std::sync::Arc;

type BenchGraph = DependencyGraph<Arc<str>>;

fn add(graph: &mut BenchGraph, id: &str, deps: &[String]) {
    graph.add_node(id, Arc::from(id)).unwrap();
    for dep in deps {
        graph.add_dependency(id, dep).unwrap();
    }
}

/// Many nodes depending on a single root
fn generate_wide_graph(count: usize) -> BenchGraph {
    let mut graph = DependencyGraph::new();
    add(&mut graph, "root", &[]);
    let root = vec!["root".to_string()];
    for i in 0..count {
        add(&mut graph, &format!("pkg_{i}"), &root);
    }
    graph
}

/// Linear dependency chain
fn generate_deep_graph(depth: usize) -> BenchGraph {
    let mut graph = DependencyGraph::new();
    add(&mut graph, "pkg_0", &[]);
    for i in 1..depth {
        add(&mut graph, &format!("pkg_{i}"), &[format!("pkg_{}", i - 1)]);
    }
    graph
}

/// Fan-out then fan-in
fn generate_diamond_graph(width: usize, depth: usize) -> BenchGraph {
    let mut graph = DependencyGraph::new();
    add(&mut graph, "root", &[]);

    let mut prev_level = vec!["root".to_string()];
    for level in 0..depth {
        let current_level: Vec<String> = (0..width)
            .map(|w| format!("level_{level}_pkg_{w}"))
            .collect();
        for id in &current_level {
            add(&mut graph, id, &prev_level);
        }
        prev_level = current_level;
    }

    add(&mut graph, "final", &prev_level);
    graph
}

fn benchmark_task_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("task_order_wide");

    for count in [50, 100, 200, 500] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let graph = generate_wide_graph(count);
            b.iter(|| black_box(task_order(&graph).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_deep_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("task_order_deep");

    for depth in [10, 20, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            let graph = generate_deep_graph(depth);
            b.iter(|| black_box(task_order(&graph).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_diamond_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("diamond_graph");

    for (width, depth) in [(5, 5), (10, 5), (5, 10), (10, 10)] {
        let label = format!("w{width}_d{depth}");
        group.bench_with_input(
            BenchmarkId::from_parameter(&label),
            &(width, depth),
            |b, &(width, depth)| {
                let graph = generate_diamond_graph(width, depth);
                b.iter(|| black_box(task_order(&graph).unwrap()));
            },
        );
    }

    group.finish();
}

fn benchmark_overall_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("overall_order");

    for count in [100, 500, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let graph = generate_wide_graph(count);
            b.iter(|| black_box(graph.overall_order(false).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_graph_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_construction");

    for count in [100, 500, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| black_box(generate_wide_graph(count)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_task_order,
    benchmark_deep_chain,
    benchmark_diamond_graph,
    benchmark_overall_order,
    benchmark_graph_construction,
);

criterion_main!(benches);
