use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use cpg_query::graph::{GraphStore, Label, NodeBuilder};
use cpg_query::query::executor::{ExecutorConfig, QueryExecutor};
use cpg_query::query::parser::parse_query;

/// `size` variable declarations plus one function per ten variables, each
/// with two parameters
fn build_graph(size: usize) -> GraphStore {
    let mut store = GraphStore::with_capacity(size + size / 10 * 3);
    for i in 0..size {
        let name = format!("var{}", i);
        store.add(NodeBuilder::new_variable_declaration(&name, &format!("int {} = {};", name, i)));
    }
    for i in 0..size / 10 {
        let func = store.add(NodeBuilder::new_function_declaration(
            &format!("func{}", i),
            &format!("void func{}(int a, int b)", i),
        ));
        for (index, param) in ["a", "b"].iter().enumerate() {
            let id = store.add(NodeBuilder::new_method_parameter(param, &format!("int {}", param), index, false));
            store.add_parameter(func, id).unwrap();
        }
    }
    store
}

/// Benchmark node insertion throughput
fn bench_node_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("node_insertion");

    for size in [100, 1000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let store = build_graph(size);
                criterion::black_box(store.size());
            });
        });
    }
    group.finish();
}

/// Benchmark label scan performance
fn bench_label_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("label_scan");

    for size in [100, 1000, 10_000].iter() {
        let store = build_graph(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let nodes = store.nodes_by_label(&Label::new("FunctionDeclaration"));
                criterion::black_box(nodes.len());
            });
        });
    }
    group.finish();
}

/// Benchmark one-step pattern matching
fn bench_traversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("traversal");
    let store = build_graph(10_000);

    group.bench_function("parameters", |b| {
        let query = parse_query(
            "MATCH (n:FunctionDeclaration)-[:PARAMETERS]->(m:ParamVariableDeclaration) RETURN n",
        )
        .unwrap();
        b.iter(|| {
            let result = QueryExecutor::new(&store).execute(&query).unwrap();
            criterion::black_box(result.len());
        });
    });

    group.bench_function("parameters_where_far_end", |b| {
        let query = parse_query(
            "MATCH (n:FunctionDeclaration)-[:PARAMETERS]->(m:ParamVariableDeclaration) \
             WHERE m.argument_index = 1 RETURN n",
        )
        .unwrap();
        b.iter(|| {
            let result = QueryExecutor::new(&store).execute(&query).unwrap();
            criterion::black_box(result.len());
        });
    });

    group.finish();
}

/// Benchmark sequential against parallel execution of the same scan
fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("strategies");
    let store = build_graph(100_000);
    let query = parse_query("MATCH (n:VariableDeclaration) WHERE n.name ENDS WITH '7' RETURN n").unwrap();

    for (name, config) in [
        ("sequential", ExecutorConfig::sequential()),
        ("parallel", ExecutorConfig::parallel()),
    ] {
        group.bench_function(name, |b| {
            let executor = QueryExecutor::with_config(&store, config.clone());
            b.iter(|| {
                let result = executor.execute(&query).unwrap();
                criterion::black_box(result.len());
            });
        });
    }

    group.finish();
}

/// Benchmark Cypher parse time
fn bench_cypher_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("cypher_parse");

    group.bench_function("simple_match", |b| {
        b.iter(|| {
            criterion::black_box(parse_query("MATCH (n:VariableDeclaration) RETURN n").unwrap());
        });
    });

    group.bench_function("match_where_return", |b| {
        b.iter(|| {
            criterion::black_box(parse_query(
                "MATCH (n:FunctionDeclaration)-[:PARAMETERS]->(m) WHERE m.name = 'a' AND n.code CONTAINS 'int' RETURN n LIMIT 25"
            ).unwrap());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_node_insertion,
    bench_label_scan,
    bench_traversal,
    bench_strategies,
    bench_cypher_parse,
);
criterion_main!(benches);
