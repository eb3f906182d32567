//! Criterion benchmarks for the block compiler.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure full compilation runs over representative block
//! trees: flat event bodies, nested control flow, and filter chains.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;

use block_compiler::categories::fields::FieldSetterData;
use block_compiler::categories::logic::{operands, ComparisonData};
use block_compiler::categories::values::literal;
use block_compiler::categories::{element_prop, prop};
use block_compiler::compiler::compile_groups;
use block_compiler::core::block::{Block, BlockGroup, Property};
use block_compiler::core::registry::BlockKind;
use block_compiler::core::types::ExpressionType;
use block_compiler::filter::restrict_block;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn label_setter(element_id: &str, text: &str) -> Block {
    Block::new(
        BlockKind::FieldSetter,
        FieldSetterData {
            target: element_prop().holding(literal(ExpressionType::Element, element_id)),
            key: "label".to_string(),
            label: "Label".to_string(),
            value: Property::new("Label", ExpressionType::Text)
                .holding(literal(ExpressionType::Text, text)),
            toggleable: None,
            toggling: false,
        },
    )
}

fn comparison(left: i64, right: i64) -> Block {
    Block::new(
        BlockKind::Comparison,
        ComparisonData {
            left: prop("Value", ExpressionType::Any)
                .holding(literal(ExpressionType::number(), left)),
            right: prop("Value", ExpressionType::Any)
                .holding(literal(ExpressionType::number(), right)),
            operand: operands()[0].clone(),
        },
    )
}

/// An on-ready group with `statements` flat setter statements.
fn flat_program(statements: usize) -> Vec<BlockGroup> {
    let mut blocks = vec![Block::bare(BlockKind::OnReady)];
    for index in 0..statements {
        blocks.push(label_setter(&format!("#text{index}"), "hello"));
    }
    vec![BlockGroup::new(blocks)]
}

/// An on-ready group of if-statements nested `depth` levels deep.
fn nested_program(depth: usize) -> Vec<BlockGroup> {
    let mut body = BlockGroup::single(label_setter("#inner", "done"));
    for level in 0..depth {
        let if_block = Block::new(
            BlockKind::IfBlock,
            json!({
                "cond": prop("Condition", ExpressionType::Boolean)
                    .holding(comparison(level as i64 + 1, 1)),
                "then": body,
            }),
        );
        body = BlockGroup::single(if_block);
    }
    let mut blocks = vec![Block::bare(BlockKind::OnReady)];
    blocks.extend(body.blocks);
    vec![BlockGroup::new(blocks)]
}

/// A filter chain with `clauses` equality clauses.
fn filter_program(clauses: usize) -> Vec<BlockGroup> {
    let filters: Vec<Property> = (0..clauses)
        .map(|index| {
            let clause = Block::new(
                BlockKind::Comparison,
                ComparisonData {
                    left: prop("Value", ExpressionType::Any)
                        .holding(literal(ExpressionType::Text, &format!("field{index}"))),
                    right: prop("Value", ExpressionType::Any)
                        .holding(literal(ExpressionType::number(), index as i64)),
                    operand: operands()[4].clone(),
                },
            );
            prop("Filter", ExpressionType::Void).holding(restrict_block(&clause))
        })
        .collect();
    let create_filter = Block::new(BlockKind::CreateFilter, json!({ "filters": filters }));
    let set_filter = Block::new(
        BlockKind::SetFilter,
        FieldSetterData {
            target: prop("Dataset", ExpressionType::Element)
                .holding(literal(ExpressionType::Element, "#dataset1")),
            key: "setFilter".to_string(),
            label: "Filter".to_string(),
            value: prop("Filter", ExpressionType::Any).holding(create_filter),
            toggleable: None,
            toggling: false,
        },
    );
    vec![BlockGroup::new(vec![
        Block::bare(BlockKind::OnReady),
        set_filter,
    ])]
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_flat_bodies(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_flat");
    for count in [10, 100, 1_000] {
        let groups = flat_program(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &groups, |b, groups| {
            b.iter(|| black_box(compile_groups(groups).unwrap().code.len()));
        });
    }
    group.finish();
}

fn bench_nested_control_flow(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_nested");
    for depth in [4, 16, 64] {
        let groups = nested_program(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &groups, |b, groups| {
            b.iter(|| black_box(compile_groups(groups).unwrap().code.len()));
        });
    }
    group.finish();
}

fn bench_filter_chains(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_filter");
    for clauses in [2, 8, 32] {
        let groups = filter_program(clauses);
        group.bench_with_input(BenchmarkId::from_parameter(clauses), &groups, |b, groups| {
            b.iter(|| black_box(compile_groups(groups).unwrap().code.len()));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_flat_bodies,
    bench_nested_control_flow,
    bench_filter_chains
);
criterion_main!(benches);
