//! Node implementation for the code property graph

use super::edge::{Edge, EdgeDirection};
use super::kind::NodeKind;
use super::property::{PropertyMap, PropertyValue};
use super::types::{EdgeGroup, Label, NodeId};
use indexmap::{IndexMap, IndexSet};

/// A node in the property graph
///
/// Nodes have:
/// - An identity assigned when the node is added to a [`GraphStore`](super::GraphStore)
/// - A concrete kind and the label set derived from it
/// - Properties (key-value pairs)
/// - Outgoing and incoming edge lists, grouped by edge-group name
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique identifier for this node
    pub id: NodeId,

    kind: NodeKind,

    /// Kind label first, then every ancestor label
    labels: IndexSet<Label>,

    /// Properties associated with this node
    pub properties: PropertyMap,

    outgoing: IndexMap<EdgeGroup, Vec<Edge>>,

    incoming: IndexMap<EdgeGroup, Vec<Edge>>,
}

impl Node {
    /// Create a detached node of the given kind
    pub fn new(kind: NodeKind) -> Self {
        Node {
            id: NodeId::UNASSIGNED,
            kind,
            labels: kind.labels().into_iter().collect(),
            properties: PropertyMap::new(),
            outgoing: IndexMap::new(),
            incoming: IndexMap::new(),
        }
    }

    /// Create a detached node with properties
    pub fn new_with_properties(kind: NodeKind, properties: PropertyMap) -> Self {
        let mut node = Self::new(kind);
        node.properties = properties;
        node
    }

    /// Concrete kind, fixed at construction along with the labels
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Check if node has a specific label
    pub fn has_label(&self, label: &Label) -> bool {
        self.labels.contains(label)
    }

    /// Check if node carries every label in `labels`
    pub fn has_labels(&self, labels: &[Label]) -> bool {
        labels.iter().all(|l| self.labels.contains(l))
    }

    /// Labels in order, most specific first
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    /// Get number of labels
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// Set a property value
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Option<PropertyValue> {
        self.properties.insert(key.into(), value.into())
    }

    /// Get a property value
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Check if property exists
    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Get number of properties
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Shortcut for the `name` property
    pub fn name(&self) -> Option<&str> {
        self.get_property("name").and_then(|v| v.as_string())
    }

    /// Edges in `direction`, restricted to `group` when given.
    ///
    /// Group names compare case-insensitively. Without a group the lists of
    /// all groups are concatenated in the order the groups were first used.
    pub fn edges(&self, group: Option<&str>, direction: EdgeDirection) -> Vec<&Edge> {
        let lists = self.edge_lists(direction);
        match group {
            Some(name) => lists
                .iter()
                .filter(|(g, _)| g.matches(name))
                .flat_map(|(_, edges)| edges.iter())
                .collect(),
            None => lists.values().flatten().collect(),
        }
    }

    /// Names of the edge groups present in `direction`
    pub fn edge_groups(&self, direction: EdgeDirection) -> impl Iterator<Item = &EdgeGroup> {
        self.edge_lists(direction).keys()
    }

    /// Number of edges in `direction` over all groups
    pub fn degree(&self, direction: EdgeDirection) -> usize {
        self.edge_lists(direction).values().map(Vec::len).sum()
    }

    fn edge_lists(&self, direction: EdgeDirection) -> &IndexMap<EdgeGroup, Vec<Edge>> {
        match direction {
            EdgeDirection::Outgoing => &self.outgoing,
            EdgeDirection::Incoming => &self.incoming,
        }
    }

    /// Append an edge entry; the store keeps both endpoints in sync.
    pub(crate) fn push_edge(&mut self, direction: EdgeDirection, source: NodeId, target: NodeId, group: &EdgeGroup) {
        let lists = match direction {
            EdgeDirection::Outgoing => &mut self.outgoing,
            EdgeDirection::Incoming => &mut self.incoming,
        };
        let list = lists.entry(group.clone()).or_default();
        let index = list.len();
        list.push(Edge::new(source, target, group.clone(), index));
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
