//! Query execution
//!
//! A parsed [`Query`] is validated and lowered to a chain
//! ([`validate::compile`]), matched against the store
//! ([`matcher::PatternMatcher`]) and projected onto the RETURN variable.

pub mod config;
pub mod eval;
pub mod matcher;
pub mod record;
pub mod validate;

pub use config::{ExecutionStrategy, ExecutorConfig};
pub use eval::Evaluator;
pub use matcher::{ChainMatch, PatternMatcher};
pub use record::{Bindings, NodeRow, QueryResult, Value};
pub use validate::{compile, CompiledQuery};

use crate::graph::GraphStore;
use crate::query::ast::Query;
use thiserror::Error;
use tracing::{debug, info};

/// Execution errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    /// A variable used in WHERE or RETURN is not declared in MATCH
    #[error("Undeclared variable: {0}")]
    UndeclaredVariable(String),

    /// Parsed, but outside what the executor runs
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// The query has no runnable shape
    #[error("Planning error: {0}")]
    PlanningError(String),
}

pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Read-only query executor over one graph store
pub struct QueryExecutor<'a> {
    store: &'a GraphStore,
    config: ExecutorConfig,
}

impl<'a> QueryExecutor<'a> {
    /// Create an executor with the default configuration
    pub fn new(store: &'a GraphStore) -> Self {
        Self::with_config(store, ExecutorConfig::default())
    }

    pub fn with_config(store: &'a GraphStore, config: ExecutorConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Execute `query` and return the nodes bound to its RETURN variable
    pub fn execute(&self, query: &Query) -> ExecutionResult<QueryResult<'a>> {
        let compiled = compile(query)?;
        Ok(self.execute_compiled(&compiled))
    }

    /// Execute an already validated query
    pub fn execute_compiled(&self, compiled: &CompiledQuery) -> QueryResult<'a> {
        let matched = PatternMatcher::new(self.store, &self.config).run(compiled);

        let position = compiled
            .chain
            .positions_of(&compiled.return_variable)
            .first()
            .copied()
            .unwrap_or(0);
        let ids = matched.positions.get(position).map(Vec::as_slice).unwrap_or_default();
        let take = compiled.limit.unwrap_or(usize::MAX);

        let nodes: Vec<_> = ids
            .iter()
            .take(take)
            .filter_map(|id| self.store.get_node(*id))
            .collect();

        info!(
            "Query returned {} nodes for `{}` ({} strategy)",
            nodes.len(),
            compiled.column,
            self.config.strategy
        );
        QueryResult::new(compiled.column.clone(), nodes)
    }

    /// Per-variable node sets of `query`'s pattern, before projection and LIMIT
    pub fn bindings(&self, query: &Query) -> ExecutionResult<Bindings> {
        let mut compiled = compile(query)?;
        compiled.limit = None;
        let matched = PatternMatcher::new(self.store, &self.config).run(&compiled);
        debug!("Bound {} variables", compiled.chain.variables().len());
        Ok(matched.bindings(&compiled.chain))
    }
}
