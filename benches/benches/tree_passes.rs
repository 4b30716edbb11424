//! Benchmarks for tree walks and type inference on generated programs.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use shadeform_core::{Hooks, Meta, Node, TypeTag, rewrite, transform_expr, type_of};

/// `(add (add (add ... 0) 0) 0)`, `depth` levels deep.
fn deep_tree(depth: usize) -> Node {
    let mut tree = Node::int(0);
    for _ in 0..depth {
        tree = Node::form("add", [tree, Node::int(0)]);
    }
    tree
}

/// `count` assignments where each variable is defined from the previous one,
/// so inference resolves one variable per round.
fn chained_program(count: usize) -> Node {
    let mut body = vec![Node::form("assign", [Node::symbol("v0"), Node::float(1.0)])];
    for i in 1..count {
        body.push(Node::form(
            "assign",
            [Node::symbol(format!("v{i}")), Node::symbol(format!("v{}", i - 1))],
        ));
    }
    Node::vector(body)
}

fn chained_backend() -> Hooks {
    Hooks::new("bench", |expr: &Node| Ok(expr.to_string()))
        .with_tagger(|node| {
            Ok(match node.children() {
                [head, var, value] if head.is_symbol("assign") => Some(
                    Node::list(vec![
                        head.clone(),
                        var.clone().merge_meta(Meta::assignment()),
                        value.clone(),
                    ])
                    .with_meta(Meta::defining(var.as_symbol().unwrap_or_default())),
                ),
                _ => None,
            })
        })
        .with_inspector(|node| {
            Ok(match node.children() {
                [head, _, value] if head.is_symbol("assign") => {
                    value.tag().cloned().or_else(|| type_of(value))
                }
                [] => type_of(node),
                _ => None,
            })
        })
}

fn bench_rewrite(c: &mut Criterion) {
    let mut group = c.benchmark_group("rewrite");
    for depth in [1_000, 5_000] {
        let tree = deep_tree(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &tree, |b, tree| {
            b.iter(|| {
                rewrite(black_box(tree.clone()), |node| {
                    node.is_symbol("add").then(|| Node::symbol("plus"))
                })
            })
        });
    }
    group.finish();
}

fn bench_inference(c: &mut Criterion) {
    let backend = chained_backend();
    let mut group = c.benchmark_group("transform_expr");
    for count in [10, 50] {
        let program = chained_program(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &program, |b, program| {
            b.iter(|| {
                let typed = transform_expr(&backend, black_box(program.clone())).unwrap();
                assert_eq!(typed.children()[0].tag(), Some(&TypeTag::float()));
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rewrite, bench_inference);
criterion_main!(benches);
