//! Query processing module
//!
//! Supports a read-only subset of Cypher over the code property graph:
//! - one linear MATCH pattern with labels, edge groups and directions
//! - WHERE with comparisons, string predicates and AND/OR/XOR/NOT
//! - RETURN of a single node variable, optionally aliased
//! - LIMIT
//!
//! Everything else the grammar accepts is rejected at validation time with
//! [`ExecutionError::UnsupportedFeature`].

pub mod ast;
pub mod executor;
pub mod parser;

// Re-export main types
pub use ast::Query;
pub use executor::{
    Bindings, ExecutionError, ExecutionResult, ExecutionStrategy, ExecutorConfig, NodeRow,
    QueryExecutor, QueryResult,
};
pub use parser::{parse_query, ParseError, ParseResult};

use crate::graph::GraphStore;
use thiserror::Error;
use tracing::debug;

/// Error from parsing or executing a query string
#[derive(Error, Debug)]
pub enum QueryError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

/// Query engine - high-level interface for executing queries
#[derive(Debug, Clone, Default)]
pub struct QueryEngine {
    config: ExecutorConfig,
}

impl QueryEngine {
    /// Create a new query engine with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExecutorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Parse and execute a query against `store`
    pub fn execute<'a>(&self, query_str: &str, store: &'a GraphStore) -> Result<QueryResult<'a>, QueryError> {
        debug!("Executing query: {}", query_str);
        let query = parse_query(query_str)?;
        Ok(self.execute_query(&query, store)?)
    }

    /// Execute an already parsed query against `store`
    pub fn execute_query<'a>(&self, query: &Query, store: &'a GraphStore) -> ExecutionResult<QueryResult<'a>> {
        QueryExecutor::with_config(store, self.config.clone()).execute(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeBuilder;

    fn sample() -> GraphStore {
        let mut store = GraphStore::new();
        let func = store.add(NodeBuilder::new_function_declaration("main", "int main(int argc)"));
        let argc = store.add(NodeBuilder::new_method_parameter("argc", "int argc", 0, false));
        store.add_parameter(func, argc).unwrap();
        store
    }

    #[test]
    fn test_engine_executes_query_string() {
        let store = sample();
        let engine = QueryEngine::new();
        let result = engine
            .execute("MATCH (f:FunctionDeclaration)-[:PARAMETERS]->(p) RETURN p", &store)
            .unwrap();
        assert_eq!(result.names(), vec!["argc"]);
    }

    #[test]
    fn test_engine_reports_parse_errors() {
        let store = sample();
        let err = QueryEngine::new().execute("MATCH (n RETURN n", &store).unwrap_err();
        assert!(matches!(err, QueryError::Parse(_)));
    }

    #[test]
    fn test_engine_reports_execution_errors() {
        let store = sample();
        let err = QueryEngine::new()
            .execute("MATCH (n) WHERE x.name = 'main' RETURN n", &store)
            .unwrap_err();
        assert!(matches!(
            err,
            QueryError::Execution(ExecutionError::UndeclaredVariable(ref v)) if v == "x"
        ));
        assert_eq!(err.to_string(), "Undeclared variable: x");
    }

    #[test]
    fn test_engine_uses_its_config() {
        let store = sample();
        let engine = QueryEngine::with_config(ExecutorConfig::parallel().with_chunk_size(1));
        assert_eq!(engine.config().strategy, ExecutionStrategy::Parallel);
        assert_eq!(engine.execute("MATCH (n) RETURN n", &store).unwrap().len(), 2);
    }
}
