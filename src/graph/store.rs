//! In-memory graph storage implementation
//!
//! The store is an append-only arena: a node's [`NodeId`] is its slot in the
//! arena, nodes are never removed, and scans visit nodes in insertion order.
//! Edges are kept on both endpoints so that either side can be expanded
//! without a global edge table.

use super::edge::{Edge, EdgeDirection};
use super::node::Node;
use super::property::PropertyValue;
use super::types::{EdgeGroup, Label, NodeId};
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;
use tracing::{debug, trace};

/// Errors that can occur during graph construction
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Invalid edge: target node {0} does not exist")]
    InvalidEdgeTarget(NodeId),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Name of the edge group wiring a function to its parameters
pub const PARAMETERS: &str = "parameters";

/// In-memory graph storage
///
/// - nodes: arena indexed by `NodeId`
/// - label_index: Label -> ids in insertion order, for label scans
#[derive(Debug, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,

    label_index: FxHashMap<Label, Vec<NodeId>>,

    edge_count: usize,
}

impl GraphStore {
    /// Create a new empty graph store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with room for `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Self {
        GraphStore {
            nodes: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Append a node and assign its identity
    pub fn add(&mut self, mut node: Node) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u64);
        if node.id.is_assigned() {
            debug!("Re-assigning {} to {} on add", node.id, id);
        }
        node.id = id;

        for label in node.labels() {
            self.label_index.entry(label.clone()).or_default().push(id);
        }

        trace!("Added {} node {}", node.kind(), id);
        self.nodes.push(node);
        id
    }

    /// Number of nodes in the graph
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Get a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Check if node exists
    pub fn has_node(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Set a property on an existing node, returning the previous value
    pub fn set_property(
        &mut self,
        id: NodeId,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> GraphResult<Option<PropertyValue>> {
        let node = self
            .nodes
            .get_mut(id.index())
            .ok_or(GraphError::NodeNotFound(id))?;
        Ok(node.set_property(key, value))
    }

    /// Get a property of a node; `None` if the node or property is absent
    pub fn get_property(&self, id: NodeId, key: &str) -> Option<&PropertyValue> {
        self.get_node(id).and_then(|n| n.get_property(key))
    }

    /// Connect `owner` to `target` under `group`.
    ///
    /// The entry lands in the owner's list for `direction` and in the
    /// target's list for the reverse direction, so `Outgoing` records the
    /// edge `owner -> target` and `Incoming` records `target -> owner`.
    pub fn add_edge(
        &mut self,
        owner: NodeId,
        group: impl Into<EdgeGroup>,
        target: NodeId,
        direction: EdgeDirection,
    ) -> GraphResult<()> {
        if !self.has_node(owner) {
            return Err(GraphError::NodeNotFound(owner));
        }
        if !self.has_node(target) {
            return Err(GraphError::InvalidEdgeTarget(target));
        }

        let group = group.into();
        let (source, sink) = match direction {
            EdgeDirection::Outgoing => (owner, target),
            EdgeDirection::Incoming => (target, owner),
        };

        self.nodes[owner.index()].push_edge(direction, source, sink, &group);
        self.nodes[target.index()].push_edge(direction.reverse(), source, sink, &group);
        self.edge_count += 1;

        trace!("Added edge {} -[{}]-> {}", source, group, sink);
        Ok(())
    }

    /// Wire `parameter` into `function` with a `parameters` edge
    pub fn add_parameter(&mut self, function: NodeId, parameter: NodeId) -> GraphResult<()> {
        self.add_edge(function, PARAMETERS, parameter, EdgeDirection::Outgoing)
    }

    /// Edges of `id` in `direction`, for one group or all of them.
    ///
    /// Unknown nodes and unknown groups give an empty list.
    pub fn get_edges(&self, id: NodeId, group: Option<&str>, direction: EdgeDirection) -> Vec<&Edge> {
        match self.get_node(id) {
            Some(node) => node.edges(group, direction),
            None => Vec::new(),
        }
    }

    /// Distinct far ends of `id`'s edges over `directions`, in edge order.
    ///
    /// `groups` are alternatives; an empty slice means every group.
    pub fn far_ends(&self, id: NodeId, groups: &[String], directions: &[EdgeDirection]) -> Vec<NodeId> {
        let Some(node) = self.get_node(id) else {
            return Vec::new();
        };

        let mut seen = FxHashSet::default();
        let mut ends = Vec::new();
        for &direction in directions {
            let edges = if groups.is_empty() {
                node.edges(None, direction)
            } else {
                groups
                    .iter()
                    .flat_map(|g| node.edges(Some(g), direction))
                    .collect()
            };
            for edge in edges {
                let end = edge.far_end(direction);
                if seen.insert(end) {
                    ends.push(end);
                }
            }
        }
        ends
    }

    /// Ids of nodes carrying `label`, in insertion order
    pub fn label_ids(&self, label: &Label) -> &[NodeId] {
        self.label_index.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Get all nodes with a specific label
    pub fn nodes_by_label(&self, label: &Label) -> Vec<&Node> {
        self.label_ids(label)
            .iter()
            .filter_map(|id| self.get_node(*id))
            .collect()
    }

    /// Number of edges added so far (each counted once)
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::kind::NodeKind;

    fn named(kind: NodeKind, name: &str) -> Node {
        let mut node = Node::new(kind);
        node.set_property("name", name);
        node
    }

    #[test]
    fn test_add_assigns_sequential_ids() {
        let mut store = GraphStore::new();
        let a = store.add(named(NodeKind::VariableDeclaration, "a"));
        let b = store.add(named(NodeKind::VariableDeclaration, "b"));

        assert_eq!(a, NodeId::new(0));
        assert_eq!(b, NodeId::new(1));
        assert_eq!(store.size(), 2);
        assert_eq!(store.get_node(b).unwrap().id, b);
        assert_eq!(store.get_node(b).unwrap().name(), Some("b"));
        assert!(store.get_node(NodeId::new(2)).is_none());
    }

    #[test]
    fn test_nodes_by_label_uses_hierarchy() {
        let mut store = GraphStore::new();
        store.add(named(NodeKind::VariableDeclaration, "v"));
        store.add(named(NodeKind::FunctionDeclaration, "f"));
        store.add(named(NodeKind::Literal, "1"));

        let decls = store.nodes_by_label(&Label::new("Declaration"));
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].name(), Some("v"));
        assert_eq!(decls[1].name(), Some("f"));

        assert_eq!(store.nodes_by_label(&Label::new("Node")).len(), 3);
        assert!(store.nodes_by_label(&Label::new("RecordDeclaration")).is_empty());
    }

    #[test]
    fn test_add_edge_updates_both_endpoints() {
        let mut store = GraphStore::new();
        let func = store.add(named(NodeKind::FunctionDeclaration, "f"));
        let param = store.add(named(NodeKind::ParamVariableDeclaration, "p"));

        store.add_parameter(func, param).unwrap();
        assert_eq!(store.edge_count(), 1);

        let out = store.get_edges(func, Some(PARAMETERS), EdgeDirection::Outgoing);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source, func);
        assert_eq!(out[0].target, param);

        let inc = store.get_edges(param, Some(PARAMETERS), EdgeDirection::Incoming);
        assert_eq!(inc.len(), 1);
        assert_eq!(inc[0].far_end(EdgeDirection::Incoming), func);

        assert!(store.get_edges(func, None, EdgeDirection::Incoming).is_empty());
        assert!(store.get_edges(param, None, EdgeDirection::Outgoing).is_empty());
    }

    #[test]
    fn test_incoming_edge_is_reversed() {
        let mut store = GraphStore::new();
        let param = store.add(named(NodeKind::ParamVariableDeclaration, "p"));
        let func = store.add(named(NodeKind::FunctionDeclaration, "f"));

        // recorded from the parameter's side
        store
            .add_edge(param, "parameters", func, EdgeDirection::Incoming)
            .unwrap();

        let out = store.get_edges(func, Some("parameters"), EdgeDirection::Outgoing);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source, func);
        assert_eq!(out[0].target, param);
    }

    #[test]
    fn test_edge_validation() {
        let mut store = GraphStore::new();
        let node = store.add(Node::new(NodeKind::Literal));
        let invalid = NodeId::new(999);

        let result = store.add_edge(invalid, "ast", node, EdgeDirection::Outgoing);
        assert_eq!(result, Err(GraphError::NodeNotFound(invalid)));

        let result = store.add_edge(node, "ast", invalid, EdgeDirection::Outgoing);
        assert_eq!(result, Err(GraphError::InvalidEdgeTarget(invalid)));

        assert_eq!(store.edge_count(), 0);
        assert!(store.get_edges(node, None, EdgeDirection::Outgoing).is_empty());
    }

    #[test]
    fn test_get_edges_all_groups_in_group_order() {
        let mut store = GraphStore::new();
        let f = store.add(named(NodeKind::FunctionDeclaration, "f"));
        let p = store.add(named(NodeKind::ParamVariableDeclaration, "p"));
        let body = store.add(Node::new(NodeKind::CompoundStatement));
        let q = store.add(named(NodeKind::ParamVariableDeclaration, "q"));

        store.add_parameter(f, p).unwrap();
        store.add_edge(f, "body", body, EdgeDirection::Outgoing).unwrap();
        store.add_parameter(f, q).unwrap();

        let targets: Vec<NodeId> = store
            .get_edges(f, None, EdgeDirection::Outgoing)
            .iter()
            .map(|e| e.target)
            .collect();
        assert_eq!(targets, vec![p, q, body]);
        assert!(store.get_edges(NodeId::new(42), None, EdgeDirection::Outgoing).is_empty());
    }

    #[test]
    fn test_far_ends_dedups_and_filters_groups() {
        let mut store = GraphStore::new();
        let f = store.add(named(NodeKind::FunctionDeclaration, "f"));
        let p = store.add(named(NodeKind::ParamVariableDeclaration, "p"));
        let body = store.add(Node::new(NodeKind::CompoundStatement));

        store.add_parameter(f, p).unwrap();
        store.add_parameter(f, p).unwrap();
        store.add_edge(f, "body", body, EdgeDirection::Outgoing).unwrap();

        let all = store.far_ends(f, &[], &[EdgeDirection::Outgoing]);
        assert_eq!(all, vec![p, body]);

        let params = store.far_ends(f, &["PARAMETERS".to_string()], &[EdgeDirection::Outgoing]);
        assert_eq!(params, vec![p]);

        let both = store.far_ends(p, &[], &[EdgeDirection::Outgoing, EdgeDirection::Incoming]);
        assert_eq!(both, vec![f]);
    }

    #[test]
    fn test_set_and_get_property() {
        let mut store = GraphStore::new();
        let id = store.add(Node::new(NodeKind::VariableDeclaration));

        assert_eq!(store.set_property(id, "name", "x"), Ok(None));
        assert_eq!(
            store.set_property(id, "name", "y"),
            Ok(Some(PropertyValue::from("x")))
        );
        assert_eq!(store.get_property(id, "name").unwrap().as_string(), Some("y"));
        assert!(store.get_property(id, "code").is_none());

        let missing = NodeId::new(5);
        assert_eq!(
            store.set_property(missing, "name", "z"),
            Err(GraphError::NodeNotFound(missing))
        );
    }
}
