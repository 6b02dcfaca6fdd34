//! Abstract Syntax Tree for the supported OpenCypher subset
//!
//! The tree can represent more than the executor runs (ORDER BY, SKIP,
//! write clauses, functions) so that the validator can name what it rejects.

use crate::graph::{EdgeGroup, Label, PropertyValue};
use std::collections::HashMap;

/// A parsed query, including clauses the executor will refuse
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    /// MATCH parts in source order
    pub match_clauses: Vec<MatchClause>,
    /// WHERE predicate; several WHERE parts are ANDed into one
    pub where_clause: Option<WhereClause>,
    pub return_clause: Option<ReturnClause>,
    pub order_by: Option<OrderByClause>,
    pub skip: Option<usize>,
    /// Maximum result size
    pub limit: Option<usize>,
    /// CREATE / MERGE / DELETE / SET clauses in query order
    pub write_clauses: Vec<WriteClause>,
}

/// MATCH clause: MATCH (n:FunctionDeclaration)-[:PARAMETERS]->(m)
#[derive(Debug, Clone, PartialEq)]
pub struct MatchClause {
    pub pattern: Pattern,
    /// `OPTIONAL MATCH`
    pub optional: bool,
}

/// Comma-separated paths of one MATCH
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    /// Comma-separated path patterns in this clause
    pub paths: Vec<PathPattern>,
}

/// Path pattern: (n:FunctionDeclaration)-[:PARAMETERS]->(m:ParamVariableDeclaration)
#[derive(Debug, Clone, PartialEq)]
pub struct PathPattern {
    pub start: NodePattern,
    /// Each relationship with the node it leads to
    pub segments: Vec<PathSegment>,
}

/// One hop of a path
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    pub edge: EdgePattern,
    pub node: NodePattern,
}

/// Node pattern: (n:VariableDeclaration {name: "myVar"})
#[derive(Debug, Clone, PartialEq)]
pub struct NodePattern {
    /// `None` for `()`
    pub variable: Option<String>,
    /// Labels; a node must carry all of them
    pub labels: Vec<Label>,
    /// Inline property constraints
    pub properties: Option<HashMap<String, PropertyValue>>,
}

/// Edge pattern: -[:PARAMETERS|BODY]->
#[derive(Debug, Clone, PartialEq)]
pub struct EdgePattern {
    pub variable: Option<String>,
    /// Alternative edge groups; empty matches every group
    pub groups: Vec<EdgeGroup>,
    pub direction: Direction,
    /// `*min..max`, only ever rejected
    pub length: Option<LengthPattern>,
    /// `{k: v}` on a relationship, only ever rejected
    pub properties: Option<HashMap<String, PropertyValue>>,
}

/// Edge direction as written in a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `-->`
    Outgoing,
    /// `<--`
    Incoming,
    /// Both: -
    Both,
}

/// Path length bounds of `*`, `*3` or `*1..5`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthPattern {
    pub min: Option<usize>,
    /// `None` means unbounded
    pub max: Option<usize>,
}

/// WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub predicate: Expression,
}

/// Expression tree of WHERE predicates and RETURN items
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `n.name`
    Property {
        variable: String,
        property: String,
    },
    Literal(PropertyValue),
    /// Bare variable, evaluating to the bound node
    Variable(String),
    Binary {
        left: Box<Expression>,
        op: BinaryOp,
        right: Box<Expression>,
    },
    Unary { op: UnaryOp, expr: Box<Expression> },
    /// Function call; parsed so that it can be rejected
    Function { name: String, args: Vec<Expression> },
}

/// Infix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    /// `<>` or `!=`
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Xor,
    StartsWith,
    EndsWith,
    Contains,
}

impl BinaryOp {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }
}

/// Prefix and postfix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    IsNull,
    IsNotNull,
}

/// RETURN clause; the executor needs exactly one item
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnClause {
    pub items: Vec<ReturnItem>,
    /// `RETURN DISTINCT`; results are already duplicate-free
    pub distinct: bool,
}

/// Return item: n, n AS fn, n.name
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnItem {
    pub expression: Expression,
    /// `AS` name, used as the result column
    pub alias: Option<String>,
}

/// ORDER BY, parsed so it can be rejected
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByClause {
    pub items: Vec<OrderByItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expression: Expression,
    /// False for DESC
    pub ascending: bool,
}

/// Clauses that would mutate the graph
#[derive(Debug, Clone, PartialEq)]
pub enum WriteClause {
    Create(Pattern),
    Merge(Pattern),
    Delete { variables: Vec<String>, detach: bool },
    Set(Vec<SetItem>),
}

impl WriteClause {
    /// Keyword that introduces the clause
    pub fn keyword(&self) -> &'static str {
        match self {
            WriteClause::Create(_) => "CREATE",
            WriteClause::Merge(_) => "MERGE",
            WriteClause::Delete { detach: true, .. } => "DETACH DELETE",
            WriteClause::Delete { .. } => "DELETE",
            WriteClause::Set(_) => "SET",
        }
    }
}

/// SET item: n.name = "x"
#[derive(Debug, Clone, PartialEq)]
pub struct SetItem {
    pub variable: String,
    pub property: String,
    pub value: Expression,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build `MATCH <path> [WHERE <predicate>] RETURN <variable>`
    pub fn matching(path: PathPattern, predicate: Option<Expression>, variable: &str) -> Self {
        Query {
            match_clauses: vec![MatchClause {
                pattern: Pattern { paths: vec![path] },
                optional: false,
            }],
            where_clause: predicate.map(|predicate| WhereClause { predicate }),
            return_clause: Some(ReturnClause {
                items: vec![ReturnItem {
                    expression: Expression::Variable(variable.to_string()),
                    alias: None,
                }],
                distinct: false,
            }),
            ..Self::default()
        }
    }

    /// Set the LIMIT
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True if no write clause is present
    pub fn is_read_only(&self) -> bool {
        self.write_clauses.is_empty()
    }
}

impl NodePattern {
    /// `(variable:Label1:Label2)`
    pub fn new(variable: &str, labels: &[&str]) -> Self {
        NodePattern {
            variable: Some(variable.to_string()),
            labels: labels.iter().map(|l| Label::new(*l)).collect(),
            properties: None,
        }
    }

    /// `()` with no variable and no labels
    pub fn anonymous() -> Self {
        NodePattern {
            variable: None,
            labels: Vec::new(),
            properties: None,
        }
    }
}

impl EdgePattern {
    /// `-[:g1|g2]->`, `<-[:g]-` or `-[:g]-`
    pub fn new(groups: &[&str], direction: Direction) -> Self {
        EdgePattern {
            variable: None,
            groups: groups.iter().map(|g| EdgeGroup::new(*g)).collect(),
            direction,
            length: None,
            properties: None,
        }
    }
}

impl PathPattern {
    pub fn node(start: NodePattern) -> Self {
        PathPattern {
            start,
            segments: Vec::new(),
        }
    }

    /// Append `edge` and `node` to the end of the path
    pub fn then(mut self, edge: EdgePattern, node: NodePattern) -> Self {
        self.segments.push(PathSegment { edge, node });
        self
    }

    /// Node patterns from start to end
    pub fn nodes(&self) -> impl Iterator<Item = &NodePattern> {
        std::iter::once(&self.start).chain(self.segments.iter().map(|s| &s.node))
    }
}

impl Expression {
    pub fn literal(value: impl Into<PropertyValue>) -> Self {
        Expression::Literal(value.into())
    }

    pub fn property(variable: &str, property: &str) -> Self {
        Expression::Property {
            variable: variable.to_string(),
            property: property.to_string(),
        }
    }

    pub fn binary(left: Expression, op: BinaryOp, right: Expression) -> Self {
        Expression::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, expr: Expression) -> Self {
        Expression::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    /// Variables referenced anywhere in the expression, first use first
    pub fn variables(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expression::Property { variable, .. } | Expression::Variable(variable) => {
                if !out.contains(&variable.as_str()) {
                    out.push(variable);
                }
            }
            Expression::Literal(_) => {}
            Expression::Binary { left, right, .. } => {
                left.collect_variables(out);
                right.collect_variables(out);
            }
            Expression::Unary { expr, .. } => expr.collect_variables(out),
            Expression::Function { args, .. } => {
                for arg in args {
                    arg.collect_variables(out);
                }
            }
        }
    }

    /// True if the expression references no variable
    pub fn is_constant(&self) -> bool {
        self.variables().is_empty()
    }

    /// First function call in the expression, if any
    pub fn find_function(&self) -> Option<&str> {
        match self {
            Expression::Function { name, .. } => Some(name),
            Expression::Binary { left, right, .. } => {
                left.find_function().or_else(|| right.find_function())
            }
            Expression::Unary { expr, .. } => expr.find_function(),
            _ => None,
        }
    }
}
