//! Edge entries of the code property graph
//!
//! An edge is recorded twice: once in the source node's outgoing list and once
//! in the target node's incoming list, under the same group name. Edges refer
//! to nodes by [`NodeId`] only; nodes own their edge lists, never each other.

use super::types::{EdgeGroup, NodeId};
use serde::{Deserialize, Serialize};

/// Direction of an edge list relative to its owning node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeDirection {
    Outgoing,
    Incoming,
}

impl EdgeDirection {
    pub fn reverse(&self) -> Self {
        match self {
            EdgeDirection::Outgoing => EdgeDirection::Incoming,
            EdgeDirection::Incoming => EdgeDirection::Outgoing,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeDirection::Outgoing => "OUTGOING",
            EdgeDirection::Incoming => "INCOMING",
        }
    }
}

/// A directed edge as seen from one of its endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Source node (edge goes FROM this node)
    pub source: NodeId,

    /// Target node (edge goes TO this node)
    pub target: NodeId,

    /// Group the edge belongs to (e.g., "parameters")
    pub group: EdgeGroup,

    /// Position of this entry within its owner's group list
    pub index: usize,
}

impl Edge {
    pub fn new(source: NodeId, target: NodeId, group: impl Into<EdgeGroup>, index: usize) -> Self {
        Edge {
            source,
            target,
            group: group.into(),
            index,
        }
    }

    /// Endpoint on the far side when the entry is read from a list in `direction`
    pub fn far_end(&self, direction: EdgeDirection) -> NodeId {
        match direction {
            EdgeDirection::Outgoing => self.target,
            EdgeDirection::Incoming => self.source,
        }
    }

    /// Check if this edge goes FROM a specific node
    pub fn starts_from(&self, node: NodeId) -> bool {
        self.source == node
    }

    /// Check if this edge goes TO a specific node
    pub fn ends_at(&self, node: NodeId) -> bool {
        self.target == node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_direction() {
        let edge = Edge::new(NodeId::new(10), NodeId::new(20), "parameters", 0);

        assert!(edge.starts_from(NodeId::new(10)));
        assert!(edge.ends_at(NodeId::new(20)));
        assert!(!edge.starts_from(NodeId::new(20)));
        assert!(!edge.ends_at(NodeId::new(10)));
    }

    #[test]
    fn test_far_end() {
        let edge = Edge::new(NodeId::new(1), NodeId::new(2), "body", 3);
        assert_eq!(edge.far_end(EdgeDirection::Outgoing), NodeId::new(2));
        assert_eq!(edge.far_end(EdgeDirection::Incoming), NodeId::new(1));
        assert_eq!(edge.index, 3);
        assert_eq!(edge.group.as_str(), "body");
    }

    #[test]
    fn test_reverse() {
        assert_eq!(EdgeDirection::Outgoing.reverse(), EdgeDirection::Incoming);
        assert_eq!(EdgeDirection::Incoming.reverse(), EdgeDirection::Outgoing);
        assert_eq!(EdgeDirection::Incoming.as_str(), "INCOMING");
    }
}
