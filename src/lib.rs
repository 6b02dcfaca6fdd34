//! Code property graph queries
//!
//! An in-memory code property graph (nodes for declarations, statements and
//! expressions, wired by named edge groups) and a read-only Cypher subset to
//! query it.
//!
//! # Architecture
//!
//! - [`graph`]: node arena, label index, edge groups, node kinds and builders
//! - [`query::parser`]: pest grammar and Pratt expression parser
//! - [`query::executor`]: validation, chain matching, predicate evaluation
//!   and projection, run sequentially or over the rayon pool
//!
//! ## Example Usage
//!
//! ```rust
//! use cpg_query::{GraphStore, NodeBuilder, QueryEngine};
//!
//! let mut store = GraphStore::new();
//! let func = store.add(NodeBuilder::new_function_declaration("func1", "void func1(int a)"));
//! let param = store.add(NodeBuilder::new_method_parameter("a", "int a", 0, false));
//! store.add_parameter(func, param).unwrap();
//!
//! let engine = QueryEngine::new();
//! let result = engine
//!     .execute(
//!         "MATCH (n:FunctionDeclaration)-[:PARAMETERS]->(m:ParamVariableDeclaration) RETURN n",
//!         &store,
//!     )
//!     .unwrap();
//! assert_eq!(result.names(), vec!["func1"]);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod graph;
pub mod query;

// Re-export main types for convenience
pub use graph::{
    Edge, EdgeDirection, EdgeGroup, GraphError, GraphResult, GraphStore, Label, Node,
    NodeBuilder, NodeId, NodeKind, PropertyMap, PropertyValue,
};

pub use query::{
    parse_query, ExecutionError, ExecutionStrategy, ExecutorConfig, Query, QueryEngine,
    QueryError, QueryExecutor, QueryResult,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
