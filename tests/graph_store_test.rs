/// Graph construction: identities, labels, edge groups and edge integrity.
use cpg_query::{
    EdgeDirection, GraphError, GraphStore, Label, Node, NodeBuilder, NodeId, NodeKind, PropertyValue,
};

#[test]
fn test_ids_follow_insertion_order() {
    let mut store = GraphStore::new();
    let ids: Vec<NodeId> = (0..5)
        .map(|i| store.add(NodeBuilder::new_variable_declaration(&format!("v{}", i), "int v;")))
        .collect();

    assert_eq!(ids, (0..5).map(NodeId::new).collect::<Vec<_>>());
    assert_eq!(store.size(), 5);
    assert!(store.nodes().iter().zip(&ids).all(|(n, id)| n.id == *id));
}

#[test]
fn test_labels_follow_kind_hierarchy() {
    let mut store = GraphStore::new();
    let method = store.add(NodeBuilder::new_method_declaration("run", "void run()"));
    let node = store.get_node(method).unwrap();

    for label in ["MethodDeclaration", "FunctionDeclaration", "ValueDeclaration", "Declaration", "Node"] {
        assert!(node.has_label(&Label::new(label)), "{}", label);
    }
    assert!(!node.has_label(&Label::new("VariableDeclaration")));
    assert!(NodeKind::ConstructorDeclaration.is_a(NodeKind::FunctionDeclaration));
    assert_eq!(store.nodes_by_label(&Label::new("Declaration")).len(), 1);
}

#[test]
fn test_edges_are_visible_from_both_ends() {
    let mut store = GraphStore::new();
    let func = store.add(NodeBuilder::new_function_declaration("f", "void f(int a)"));
    let param = store.add(NodeBuilder::new_method_parameter("a", "int a", 0, false));
    store.add_parameter(func, param).unwrap();

    let out = store.get_edges(func, Some("PARAMETERS"), EdgeDirection::Outgoing);
    assert_eq!(out.len(), 1);
    assert_eq!((out[0].source, out[0].target), (func, param));

    let back = store.get_edges(param, Some("parameters"), EdgeDirection::Incoming);
    assert_eq!(back.len(), 1);
    assert_eq!(back[0].far_end(EdgeDirection::Incoming), func);

    assert!(store.get_edges(func, Some("calls"), EdgeDirection::Outgoing).is_empty());
    assert!(store.get_edges(param, None, EdgeDirection::Outgoing).is_empty());
    assert_eq!(store.edge_count(), 1);
}

#[test]
fn test_incoming_edge_is_recorded_reversed() {
    let mut store = GraphStore::new();
    let decl = store.add(NodeBuilder::new_variable_declaration("x", "int x;"));
    let usage = store.add(Node::new(NodeKind::DeclaredReferenceExpression));
    store.add_edge(decl, "refers_to", usage, EdgeDirection::Incoming).unwrap();

    let edges = store.get_edges(usage, Some("refers_to"), EdgeDirection::Outgoing);
    assert_eq!(edges.len(), 1);
    assert_eq!((edges[0].source, edges[0].target), (usage, decl));
}

#[test]
fn test_edge_to_missing_node_is_rejected() {
    let mut store = GraphStore::new();
    let func = store.add(NodeBuilder::new_function_declaration("f", "void f()"));
    let ghost = NodeId::new(42);

    assert_eq!(
        store.add_parameter(func, ghost),
        Err(GraphError::InvalidEdgeTarget(ghost))
    );
    assert_eq!(
        store.add_parameter(ghost, func),
        Err(GraphError::NodeNotFound(ghost))
    );
    assert_eq!(store.edge_count(), 0);
    assert!(store.get_edges(func, None, EdgeDirection::Outgoing).is_empty());
}

#[test]
fn test_properties() {
    let mut store = GraphStore::new();
    let lit = store.add(NodeBuilder::new_literal("3.5", 3.5));

    assert_eq!(store.get_property(lit, "value"), Some(&PropertyValue::Float(3.5)));
    assert_eq!(store.get_property(lit, "name"), None);

    let previous = store.set_property(lit, "name", "pi-ish").unwrap();
    assert_eq!(previous, None);
    assert_eq!(store.get_node(lit).and_then(Node::name), Some("pi-ish"));
    assert!(store.set_property(NodeId::new(9), "name", "x").is_err());
}
