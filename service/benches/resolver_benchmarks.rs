//! Benchmarks for dependency ordering, schema synthesis and record validation

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use schematic_service::prelude::*;
use serde_json::Value;
use std::fmt::Display;

/// Helper that panics with context when a benchmark setup step fails.
fn require_ok<T, E>(result: Result<T, E>, context: &str) -> T
where
    E: Display,
{
    match result {
        Ok(value) => value,
        Err(err) => panic!("{context}: {err}"),
    }
}

/// A layered model: each attribute depends on up to three attributes of the
/// next layer, and every fifth attribute gates one extra attribute on a value.
fn layered_model(layers: usize, width: usize) -> RelationshipGraph {
    let mut builder = SchemaGraphBuilder::new();
    builder.add_node(Node::class("Root"));

    let label = |layer: usize, i: usize| format!("L{layer}A{i}");
    for layer in 0..layers {
        for i in 0..width {
            builder.add_node(Node::property(label(layer, i)).required(layer % 2 == 0));
        }
    }
    for i in 0..width {
        builder.add_edge("Root", label(0, i), Relationship::RequiresDependency);
    }
    for layer in 0..layers.saturating_sub(1) {
        for i in 0..width {
            for offset in 0..3 {
                builder.add_edge(
                    label(layer, i),
                    label(layer + 1, (i + offset) % width),
                    Relationship::RequiresDependency,
                );
            }
        }
    }
    for i in (0..width).step_by(5) {
        let value = format!("Value{i}");
        let gated = format!("Gated{i}");
        builder.add_node(Node::class(value.as_str()));
        builder.add_node(Node::property(gated.as_str()).required(true));
        builder.add_edge(label(0, i), value.as_str(), Relationship::RangeIncludes);
        builder.add_edge(value.as_str(), gated, Relationship::RequiresDependency);
    }

    require_ok(builder.build(), "Failed to build benchmark graph")
}

fn records_for(document: &ConstraintDocument, count: usize) -> Vec<Record> {
    (0..count)
        .map(|row| {
            document
                .properties
                .keys()
                .map(|field| (field.clone(), Value::String(format!("v{row}"))))
                .collect()
        })
        .collect()
}

fn bench_ordering(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordered_descendants");
    for layers in [4, 8, 16] {
        let graph = layered_model(layers, 50);
        group.throughput(Throughput::Elements(graph.node_count() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(layers), &graph, |b, graph| {
            b.iter(|| {
                ordered_descendants(
                    black_box(graph),
                    black_box("Root"),
                    Relationship::RequiresDependency,
                )
            });
        });
    }
    group.finish();
}

fn bench_synthesis(c: &mut Criterion) {
    let graph = layered_model(8, 50);
    c.bench_function("build_schema", |b| {
        b.iter(|| build_schema(black_box(&graph), black_box("Root")));
    });
}

fn bench_validation(c: &mut Criterion) {
    let graph = layered_model(4, 25);
    let document = require_ok(build_schema(&graph, "Root"), "Failed to build schema");

    let mut group = c.benchmark_group("validate");
    for count in [100, 1_000, 10_000] {
        let records = records_for(&document, count);
        group.throughput(Throughput::Elements(count as u64));

        let sequential = require_ok(
            RecordValidator::with_options(ValidationOptions {
                parallel: false,
                ..ValidationOptions::default()
            }),
            "Failed to create validator",
        );
        group.bench_with_input(BenchmarkId::new("sequential", count), &records, |b, records| {
            b.iter(|| sequential.validate(black_box(records), &document));
        });

        let parallel = RecordValidator::new();
        group.bench_with_input(BenchmarkId::new("parallel", count), &records, |b, records| {
            b.iter(|| parallel.validate(black_box(records), &document));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_ordering, bench_synthesis, bench_validation);
criterion_main!(benches);
