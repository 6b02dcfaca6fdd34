//! Helpers for creating code-analysis nodes
//!
//! Every builder returns a detached [`Node`]; hand it to
//! [`GraphStore::add`](super::GraphStore::add) to give it an identity.

use super::kind::NodeKind;
use super::node::Node;
use super::property::PropertyMap;

/// Factory for the node kinds produced by source-code frontends
pub struct NodeBuilder;

impl NodeBuilder {
    /// A node of any kind with `name` and `code` set
    pub fn new_node(kind: NodeKind, name: &str, code: &str) -> Node {
        let mut properties = PropertyMap::with_capacity(2);
        properties.insert("name".to_string(), name.into());
        properties.insert("code".to_string(), code.into());
        Node::new_with_properties(kind, properties)
    }

    pub fn new_variable_declaration(name: &str, code: &str) -> Node {
        Self::new_node(NodeKind::VariableDeclaration, name, code)
    }

    pub fn new_field_declaration(name: &str, code: &str) -> Node {
        Self::new_node(NodeKind::FieldDeclaration, name, code)
    }

    pub fn new_function_declaration(name: &str, code: &str) -> Node {
        Self::new_node(NodeKind::FunctionDeclaration, name, code)
    }

    pub fn new_method_declaration(name: &str, code: &str) -> Node {
        Self::new_node(NodeKind::MethodDeclaration, name, code)
    }

    pub fn new_record_declaration(name: &str, code: &str) -> Node {
        Self::new_node(NodeKind::RecordDeclaration, name, code)
    }

    /// A parameter of a function; `argument_index` is its position in the
    /// signature and `is_variadic` marks a trailing `...` parameter
    pub fn new_method_parameter(name: &str, code: &str, argument_index: usize, is_variadic: bool) -> Node {
        let mut node = Self::new_node(NodeKind::ParamVariableDeclaration, name, code);
        node.set_property("argument_index", argument_index);
        node.set_property("is_variadic", is_variadic);
        node
    }

    /// A literal expression; `value` is stored under the `value` property
    pub fn new_literal(code: &str, value: impl Into<super::PropertyValue>) -> Node {
        let mut node = Node::new(NodeKind::Literal);
        node.set_property("code", code);
        node.set_property("value", value);
        node
    }

    pub fn new_call_expression(name: &str, code: &str) -> Node {
        Self::new_node(NodeKind::CallExpression, name, code)
    }
}
