use anyhow::Context;
use cpg_query::{ExecutorConfig, GraphStore, NodeBuilder, QueryEngine};

const DEMO_QUERIES: &[&str] = &[
    "MATCH (n:FunctionDeclaration)-[:PARAMETERS]->(m:ParamVariableDeclaration) RETURN n",
    "MATCH (n:FunctionDeclaration)-[:PARAMETERS]->(m:ParamVariableDeclaration) RETURN m",
    "MATCH (n:FunctionDeclaration)-[:PARAMETERS]->(m:ParamVariableDeclaration) WHERE m.name = 'argv' RETURN n",
    "MATCH (n:VariableDeclaration) WHERE n.name = 'counter' RETURN n",
    "MATCH (n:Declaration) RETURN n LIMIT 3",
];

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("CPG Query v{}", cpg_query::version());
    println!("==========================================");

    let config = ExecutorConfig::from_env();
    println!("Execution strategy: {}", config.strategy);

    let store = demo_graph()?;
    println!("Graph: {} nodes, {} edges", store.size(), store.edge_count());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let queries: Vec<&str> = if args.is_empty() {
        DEMO_QUERIES.to_vec()
    } else {
        args.iter().map(String::as_str).collect()
    };

    let engine = QueryEngine::with_config(config);
    for query in queries {
        println!("\n{}", query);
        match engine.execute(query, &store) {
            Ok(result) => {
                let json = serde_json::to_string_pretty(&result).context("serializing result")?;
                println!("  → {} nodes", result.len());
                println!("{}", json);
            }
            Err(e) => println!("  ✗ {}", e),
        }
    }

    Ok(())
}

/// A small program: `int counter;`, `int main(int argc, char **argv)`,
/// `void log(const char *fmt, ...)` and a `Point` record with two fields
fn demo_graph() -> anyhow::Result<GraphStore> {
    let mut store = GraphStore::new();

    store.add(NodeBuilder::new_variable_declaration("counter", "int counter;"));

    let main = store.add(NodeBuilder::new_function_declaration(
        "main",
        "int main(int argc, char **argv)",
    ));
    let argc = store.add(NodeBuilder::new_method_parameter("argc", "int argc", 0, false));
    let argv = store.add(NodeBuilder::new_method_parameter("argv", "char **argv", 1, false));
    store.add_parameter(main, argc)?;
    store.add_parameter(main, argv)?;

    let log = store.add(NodeBuilder::new_function_declaration(
        "log",
        "void log(const char *fmt, ...)",
    ));
    let fmt = store.add(NodeBuilder::new_method_parameter("fmt", "const char *fmt", 0, false));
    let rest = store.add(NodeBuilder::new_method_parameter("args", "...", 1, true));
    store.add_parameter(log, fmt)?;
    store.add_parameter(log, rest)?;

    let point = store.add(NodeBuilder::new_record_declaration("Point", "struct Point { int x; int y; }"));
    for field in ["x", "y"] {
        let id = store.add(NodeBuilder::new_field_declaration(field, &format!("int {};", field)));
        store.add_edge(point, "fields", id, cpg_query::EdgeDirection::Outgoing)?;
    }

    let call = store.add(NodeBuilder::new_call_expression("log", "log(\"%d\", counter)"));
    store.add_edge(call, "invokes", log, cpg_query::EdgeDirection::Outgoing)?;

    Ok(store)
}
