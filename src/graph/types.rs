//! Core type definitions for the code property graph

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a node
///
/// Identities are handed out by [`GraphStore::add`](super::GraphStore::add) and
/// equal the node's position in the arena, so ordering by id is insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Placeholder carried by a node that has not been added to a graph yet
    pub const UNASSIGNED: NodeId = NodeId(u64::MAX);

    pub fn new(id: u64) -> Self {
        NodeId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Arena slot of this node
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    pub fn is_assigned(&self) -> bool {
        *self != Self::UNASSIGNED
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        NodeId(id)
    }
}

/// Node label (e.g., "FunctionDeclaration", "Declaration")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Label(String);

impl Label {
    pub fn new(label: impl Into<String>) -> Self {
        Label(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label(s)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label(s.to_string())
    }
}

/// Name of an edge group (e.g., "parameters", "body")
///
/// Groups are stored under the exact name given by the graph builder, but
/// pattern lookups compare them ASCII case-insensitively so that a query
/// may spell `:PARAMETERS` for the `parameters` group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct EdgeGroup(String);

impl EdgeGroup {
    pub fn new(group: impl Into<String>) -> Self {
        EdgeGroup(group.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison used by pattern matching
    pub fn matches(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }
}

impl fmt::Display for EdgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EdgeGroup {
    fn from(s: String) -> Self {
        EdgeGroup(s)
    }
}

impl From<&str> for EdgeGroup {
    fn from(s: &str) -> Self {
        EdgeGroup(s.to_string())
    }
}
