//! Code property graph
//!
//! This module implements the property graph data model with:
//! - Nodes of a closed set of code-analysis kinds, labeled by kind and ancestors
//! - Directed edges organized in named edge groups (e.g. `parameters`)
//! - Append-only in-memory storage indexed by node identity and label

pub mod builder;
pub mod edge;
pub mod kind;
pub mod node;
pub mod property;
pub mod store;
pub mod types;

// Re-export main types
pub use builder::NodeBuilder;
pub use edge::{Edge, EdgeDirection};
pub use kind::NodeKind;
pub use node::Node;
pub use property::{PropertyMap, PropertyValue};
pub use store::{GraphError, GraphResult, GraphStore, PARAMETERS};
pub use types::{EdgeGroup, Label, NodeId};
