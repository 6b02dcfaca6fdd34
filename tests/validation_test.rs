/// Queries outside the supported subset are rejected before any scan.
use cpg_query::{ExecutionError, GraphStore, NodeBuilder, QueryEngine, QueryError};

fn store() -> GraphStore {
    let mut store = GraphStore::new();
    let func = store.add(NodeBuilder::new_function_declaration("f", "void f(int a)"));
    let param = store.add(NodeBuilder::new_method_parameter("a", "int a", 0, false));
    store.add_parameter(func, param).unwrap();
    store
}

fn execution_error(query: &str) -> ExecutionError {
    match QueryEngine::new().execute(query, &store()) {
        Err(QueryError::Execution(e)) => e,
        Err(e) => panic!("{}: expected an execution error, got {}", query, e),
        Ok(result) => panic!("{}: expected an error, got {} rows", query, result.len()),
    }
}

fn unsupported(query: &str) -> String {
    match execution_error(query) {
        ExecutionError::UnsupportedFeature(feature) => feature,
        other => panic!("{}: expected UnsupportedFeature, got {:?}", query, other),
    }
}

#[test]
fn test_undeclared_variables() {
    assert_eq!(
        execution_error("MATCH (n) RETURN m"),
        ExecutionError::UndeclaredVariable("m".to_string())
    );
    assert_eq!(
        execution_error("MATCH (n)-->(m) WHERE x.name = 'a' RETURN n"),
        ExecutionError::UndeclaredVariable("x".to_string())
    );
}

#[test]
fn test_write_clauses_are_unsupported() {
    assert!(unsupported("CREATE (n:FunctionDeclaration {name: 'g'})").contains("CREATE"));
    assert!(unsupported("MATCH (n) DETACH DELETE n").contains("DELETE"));
    assert!(unsupported("MATCH (n) SET n.name = 'g' RETURN n").contains("SET"));
    assert!(unsupported("MERGE (n:FunctionDeclaration)").contains("MERGE"));
}

#[test]
fn test_result_shaping_is_unsupported() {
    assert!(unsupported("MATCH (n) RETURN n ORDER BY n.name").contains("ORDER BY"));
    assert!(unsupported("MATCH (n) RETURN n SKIP 1").contains("SKIP"));
    assert!(unsupported("MATCH (n)-->(m) RETURN n, m").contains("multiple RETURN"));
    assert!(unsupported("MATCH (n) RETURN n.name").contains("n.name"));
    assert!(unsupported("MATCH (n) RETURN count(n)").contains("count"));
}

#[test]
fn test_pattern_shapes_are_unsupported() {
    assert!(unsupported("MATCH (n), (m) RETURN n").contains("comma-separated"));
    assert!(unsupported("MATCH (n) MATCH (m) RETURN n").contains("multiple MATCH"));
    assert!(unsupported("OPTIONAL MATCH (n) RETURN n").contains("OPTIONAL"));
    assert!(unsupported("MATCH (n)-[:PARAMETERS*1..2]->(m) RETURN n").contains("variable-length"));
    assert!(unsupported("MATCH (n)-[r:PARAMETERS]->(m) RETURN r").contains("relationship variable"));
}

#[test]
fn test_missing_clauses_are_planning_errors() {
    assert!(matches!(execution_error("MATCH (n)"), ExecutionError::PlanningError(_)));
    assert!(matches!(execution_error(""), ExecutionError::PlanningError(_)));
    assert!(matches!(execution_error("RETURN 1"), ExecutionError::PlanningError(_)));
}

#[test]
fn test_parse_errors() {
    let store = store();
    let engine = QueryEngine::new();
    for query in ["MATCH (n RETURN n", "MATCH (n) RETURN n LIMIT -1", "MATCH (n) WHERE RETURN n"] {
        assert!(
            matches!(engine.execute(query, &store), Err(QueryError::Parse(_))),
            "{}",
            query
        );
    }
}

#[test]
fn test_keywords_are_case_insensitive() {
    let store = store();
    let result = QueryEngine::new()
        .execute("match (n:FunctionDeclaration)-[:parameters]->(m) where m.name = 'a' return n limit 1", &store)
        .unwrap();
    assert_eq!(result.names(), vec!["f"]);
}
