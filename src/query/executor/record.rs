//! Values, bindings and results of query execution

use crate::graph::{GraphStore, Node, NodeId, NodeKind, PropertyMap, PropertyValue};
use indexmap::IndexMap;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Value of an expression operand during predicate evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    /// A bound node
    NodeRef(NodeId),
    /// A property or literal value, borrowed from the graph or the query
    Property(&'a PropertyValue),
    /// Null
    Null,
}

impl<'a> Value<'a> {
    /// Wrap a property, mapping `PropertyValue::Null` to `Value::Null`
    pub fn from_property(value: &'a PropertyValue) -> Self {
        if value.is_null() {
            Value::Null
        } else {
            Value::Property(value)
        }
    }

    /// Get as property if this is a property value
    pub fn as_property(&self) -> Option<&'a PropertyValue> {
        match self {
            Value::Property(prop) => Some(prop),
            _ => None,
        }
    }

    /// Check if this is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            Value::NodeRef(id) => Some(*id),
            _ => None,
        }
    }

    /// Look `property` up on the node this value refers to
    pub fn resolve_property(&self, property: &str, store: &'a GraphStore) -> Value<'a> {
        match self {
            Value::NodeRef(id) => store
                .get_property(*id, property)
                .map(Value::from_property)
                .unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }
}

/// Per-variable node sets produced by the matcher
///
/// Variables appear in pattern order; every set is in insertion order
/// without duplicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    sets: IndexMap<String, Vec<NodeId>>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, variable: impl Into<String>, nodes: Vec<NodeId>) {
        self.sets.insert(variable.into(), nodes);
    }

    /// Nodes bound to `variable`
    pub fn get(&self, variable: &str) -> Option<&[NodeId]> {
        self.sets.get(variable).map(Vec::as_slice)
    }

    /// Check if a variable is bound
    pub fn has(&self, variable: &str) -> bool {
        self.sets.contains_key(variable)
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[NodeId])> {
        self.sets.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// Ordered node list returned by a query
#[derive(Debug, Clone)]
pub struct QueryResult<'a> {
    /// Column name: the RETURN alias, else the variable
    pub column: String,
    /// Result nodes in graph insertion order
    pub nodes: Vec<&'a Node>,
}

impl<'a> QueryResult<'a> {
    pub fn new(column: impl Into<String>, nodes: Vec<&'a Node>) -> Self {
        Self {
            column: column.into(),
            nodes,
        }
    }

    /// Get number of result nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Node> + '_ {
        self.nodes.iter().copied()
    }

    /// Get a node by position
    pub fn get(&self, index: usize) -> Option<&'a Node> {
        self.nodes.get(index).copied()
    }

    /// Ids of the result nodes
    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    /// `name` property of each node, where present
    pub fn names(&self) -> Vec<&'a str> {
        self.nodes.iter().filter_map(|n| n.name()).collect()
    }

    /// Serializable view of each node
    pub fn rows(&self) -> Vec<NodeRow<'a>> {
        self.nodes.iter().map(|n| NodeRow::from(*n)).collect()
    }
}

/// Serializable summary of a result node
#[derive(Debug, Serialize)]
pub struct NodeRow<'a> {
    pub id: NodeId,
    pub kind: NodeKind,
    pub labels: Vec<&'a str>,
    pub properties: &'a PropertyMap,
}

impl<'a> From<&'a Node> for NodeRow<'a> {
    fn from(node: &'a Node) -> Self {
        NodeRow {
            id: node.id,
            kind: node.kind(),
            labels: node.labels().map(|l| l.as_str()).collect(),
            properties: &node.properties,
        }
    }
}

impl Serialize for QueryResult<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("QueryResult", 2)?;
        state.serialize_field("column", &self.column)?;
        state.serialize_field("rows", &self.rows())?;
        state.end()
    }
}
