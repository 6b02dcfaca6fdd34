//! Executor configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

pub const ENV_STRATEGY: &str = "CPG_QUERY_STRATEGY";
pub const ENV_PARALLEL_THRESHOLD: &str = "CPG_QUERY_PARALLEL_THRESHOLD";
pub const ENV_CHUNK_SIZE: &str = "CPG_QUERY_CHUNK_SIZE";

/// How the scan phases of a query are run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStrategy {
    /// Single thread, chunk after chunk
    Sequential,
    /// Chunks fanned out over the rayon pool
    Parallel,
    /// Parallel once a scanned list reaches `parallel_threshold`
    #[default]
    Auto,
}

impl ExecutionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStrategy::Sequential => "sequential",
            ExecutionStrategy::Parallel => "parallel",
            ExecutionStrategy::Auto => "auto",
        }
    }
}

impl fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "seq" => Ok(ExecutionStrategy::Sequential),
            "parallel" | "par" => Ok(ExecutionStrategy::Parallel),
            "auto" => Ok(ExecutionStrategy::Auto),
            other => Err(format!("unknown execution strategy '{}'", other)),
        }
    }
}

/// Executor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Sequential, parallel or size-based choice
    pub strategy: ExecutionStrategy,
    /// Minimum list length for `Auto` to go parallel
    pub parallel_threshold: usize,
    /// Items per work unit; also the granularity of the sequential path
    pub chunk_size: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            strategy: ExecutionStrategy::Auto,
            parallel_threshold: 4096,
            chunk_size: 1024,
        }
    }
}

impl ExecutorConfig {
    pub fn sequential() -> Self {
        Self {
            strategy: ExecutionStrategy::Sequential,
            ..Self::default()
        }
    }

    pub fn parallel() -> Self {
        Self {
            strategy: ExecutionStrategy::Parallel,
            ..Self::default()
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Defaults overridden by `CPG_QUERY_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    ///
    /// Unparsable values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_STRATEGY) {
            match raw.parse() {
                Ok(strategy) => config.strategy = strategy,
                Err(e) => warn!("Ignoring {}: {}", ENV_STRATEGY, e),
            }
        }

        if let Some(raw) = lookup(ENV_PARALLEL_THRESHOLD) {
            match raw.trim().parse() {
                Ok(threshold) => config.parallel_threshold = threshold,
                Err(_) => warn!("Ignoring {}: '{}' is not a count", ENV_PARALLEL_THRESHOLD, raw),
            }
        }

        if let Some(raw) = lookup(ENV_CHUNK_SIZE) {
            match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => config.chunk_size = size,
                _ => warn!("Ignoring {}: '{}' is not a positive count", ENV_CHUNK_SIZE, raw),
            }
        }

        config
    }

    /// Whether a list of `len` items should be processed in parallel
    pub fn use_parallel(&self, len: usize) -> bool {
        match self.strategy {
            ExecutionStrategy::Sequential => false,
            ExecutionStrategy::Parallel => true,
            ExecutionStrategy::Auto => len >= self.parallel_threshold,
        }
    }

    /// Chunk size, never zero
    pub fn chunk_len(&self) -> usize {
        self.chunk_size.max(1)
    }
}
