//! Node kinds of the code property graph
//!
//! Every node has exactly one concrete kind. A kind's label set is the kind
//! itself followed by all of its ancestors, so a `MethodDeclaration` node also
//! matches `:FunctionDeclaration`, `:ValueDeclaration`, `:Declaration` and `:Node`.

use super::types::Label;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Node,

    // Declarations
    Declaration,
    TranslationUnitDeclaration,
    RecordDeclaration,
    ValueDeclaration,
    VariableDeclaration,
    ParamVariableDeclaration,
    FieldDeclaration,
    FunctionDeclaration,
    MethodDeclaration,
    ConstructorDeclaration,

    // Statements
    Statement,
    CompoundStatement,
    ReturnStatement,
    DeclarationStatement,

    // Expressions
    Expression,
    Literal,
    DeclaredReferenceExpression,
    CallExpression,
    ConstructExpression,
    InitializerListExpression,
}

impl NodeKind {
    /// Every kind, parents before children
    pub const ALL: [NodeKind; 21] = [
        NodeKind::Node,
        NodeKind::Declaration,
        NodeKind::TranslationUnitDeclaration,
        NodeKind::RecordDeclaration,
        NodeKind::ValueDeclaration,
        NodeKind::VariableDeclaration,
        NodeKind::ParamVariableDeclaration,
        NodeKind::FieldDeclaration,
        NodeKind::FunctionDeclaration,
        NodeKind::MethodDeclaration,
        NodeKind::ConstructorDeclaration,
        NodeKind::Statement,
        NodeKind::CompoundStatement,
        NodeKind::ReturnStatement,
        NodeKind::DeclarationStatement,
        NodeKind::Expression,
        NodeKind::Literal,
        NodeKind::DeclaredReferenceExpression,
        NodeKind::CallExpression,
        NodeKind::ConstructExpression,
        NodeKind::InitializerListExpression,
    ];

    /// Label name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Node => "Node",
            NodeKind::Declaration => "Declaration",
            NodeKind::TranslationUnitDeclaration => "TranslationUnitDeclaration",
            NodeKind::RecordDeclaration => "RecordDeclaration",
            NodeKind::ValueDeclaration => "ValueDeclaration",
            NodeKind::VariableDeclaration => "VariableDeclaration",
            NodeKind::ParamVariableDeclaration => "ParamVariableDeclaration",
            NodeKind::FieldDeclaration => "FieldDeclaration",
            NodeKind::FunctionDeclaration => "FunctionDeclaration",
            NodeKind::MethodDeclaration => "MethodDeclaration",
            NodeKind::ConstructorDeclaration => "ConstructorDeclaration",
            NodeKind::Statement => "Statement",
            NodeKind::CompoundStatement => "CompoundStatement",
            NodeKind::ReturnStatement => "ReturnStatement",
            NodeKind::DeclarationStatement => "DeclarationStatement",
            NodeKind::Expression => "Expression",
            NodeKind::Literal => "Literal",
            NodeKind::DeclaredReferenceExpression => "DeclaredReferenceExpression",
            NodeKind::CallExpression => "CallExpression",
            NodeKind::ConstructExpression => "ConstructExpression",
            NodeKind::InitializerListExpression => "InitializerListExpression",
        }
    }

    /// Direct supertype, `None` for the root
    pub fn parent(&self) -> Option<NodeKind> {
        use NodeKind::*;
        match self {
            Node => None,
            Declaration | Statement => Some(Node),
            TranslationUnitDeclaration | RecordDeclaration | ValueDeclaration => Some(Declaration),
            VariableDeclaration | ParamVariableDeclaration | FieldDeclaration
            | FunctionDeclaration => Some(ValueDeclaration),
            MethodDeclaration => Some(FunctionDeclaration),
            ConstructorDeclaration => Some(MethodDeclaration),
            CompoundStatement | ReturnStatement | DeclarationStatement | Expression => {
                Some(Statement)
            }
            Literal | DeclaredReferenceExpression | CallExpression | ConstructExpression
            | InitializerListExpression => Some(Expression),
        }
    }

    /// This kind followed by its ancestors, most specific first
    pub fn lineage(&self) -> Vec<NodeKind> {
        let mut chain = vec![*self];
        let mut current = *self;
        while let Some(parent) = current.parent() {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// Labels carried by a node of this kind
    pub fn labels(&self) -> Vec<Label> {
        self.lineage().into_iter().map(|k| Label::new(k.as_str())).collect()
    }

    /// True if `self` is `other` or one of its subtypes
    pub fn is_a(&self, other: NodeKind) -> bool {
        self.lineage().contains(&other)
    }

    /// Look a kind up by its label name
    pub fn from_name(name: &str) -> Option<NodeKind> {
        Self::ALL.iter().copied().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lineage_ends_at_root() {
        for kind in NodeKind::ALL {
            let lineage = kind.lineage();
            assert_eq!(lineage[0], kind);
            assert_eq!(*lineage.last().unwrap(), NodeKind::Node);
        }
    }

    #[test]
    fn test_constructor_labels() {
        let labels: Vec<String> = NodeKind::ConstructorDeclaration
            .labels()
            .into_iter()
            .map(|l| l.as_str().to_string())
            .collect();
        assert_eq!(
            labels,
            vec![
                "ConstructorDeclaration",
                "MethodDeclaration",
                "FunctionDeclaration",
                "ValueDeclaration",
                "Declaration",
                "Node",
            ]
        );
    }

    #[test]
    fn test_is_a() {
        assert!(NodeKind::Literal.is_a(NodeKind::Statement));
        assert!(NodeKind::ParamVariableDeclaration.is_a(NodeKind::Declaration));
        assert!(!NodeKind::ParamVariableDeclaration.is_a(NodeKind::VariableDeclaration));
        assert!(!NodeKind::Declaration.is_a(NodeKind::FunctionDeclaration));
    }

    #[test]
    fn test_from_name_round_trips_every_kind() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(NodeKind::from_name("Person"), None);
    }
}
