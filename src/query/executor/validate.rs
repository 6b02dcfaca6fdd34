//! Query validation
//!
//! Turns a parsed [`Query`] into a [`CompiledQuery`] the matcher can run, or
//! rejects it before the graph is touched. Inline node property maps are
//! folded into the WHERE predicate here.

use super::{ExecutionError, ExecutionResult};
use crate::graph::{Label, PropertyValue};
use crate::query::ast::*;
use rustc_hash::FxHashSet;
use tracing::debug;

/// One node position of a chain
#[derive(Debug, Clone, PartialEq)]
pub struct ChainNode {
    /// Declared variable, or a generated name for `()`
    pub variable: String,
    /// Labels the bound node must all carry
    pub labels: Vec<Label>,
    /// True for `()` positions, which are never reported
    pub anonymous: bool,
}

/// Relationship between two consecutive chain positions
#[derive(Debug, Clone, PartialEq)]
pub struct ChainStep {
    /// Alternative edge groups; empty means any
    pub groups: Vec<String>,
    pub direction: Direction,
}

/// A linear pattern: `nodes.len() == steps.len() + 1`
#[derive(Debug, Clone, PartialEq)]
pub struct PatternChain {
    pub nodes: Vec<ChainNode>,
    pub steps: Vec<ChainStep>,
}

impl PatternChain {
    /// Positions bound to `variable`, in chain order
    pub fn positions_of(&self, variable: &str) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.variable == variable)
            .map(|(i, _)| i)
            .collect()
    }

    /// Distinct variables in first-appearance order
    pub fn variables(&self) -> Vec<&str> {
        let mut vars: Vec<&str> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !vars.contains(&node.variable.as_str()) {
                vars.push(&node.variable);
            }
        }
        vars
    }

    /// True if some variable occupies more than one position
    pub fn has_reused_variables(&self) -> bool {
        self.variables().len() < self.nodes.len()
    }
}

/// A query the executor can run
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub chain: PatternChain,
    /// WHERE plus inline property constraints
    pub predicate: Option<Expression>,
    /// Variable named by the RETURN item
    pub return_variable: String,
    /// Output column name (alias if given)
    pub column: String,
    pub limit: Option<usize>,
}

/// Validate `query` and lower it to a [`CompiledQuery`]
pub fn compile(query: &Query) -> ExecutionResult<CompiledQuery> {
    if let Some(clause) = query.write_clauses.first() {
        return Err(ExecutionError::UnsupportedFeature(format!("{} clause", clause.keyword())));
    }
    if query.order_by.is_some() {
        return Err(ExecutionError::UnsupportedFeature("ORDER BY".to_string()));
    }
    if query.skip.is_some() {
        return Err(ExecutionError::UnsupportedFeature("SKIP".to_string()));
    }

    let match_clause = match query.match_clauses.as_slice() {
        [] => {
            return Err(ExecutionError::PlanningError(
                "Query must have a MATCH clause".to_string(),
            ))
        }
        [single] => single,
        _ => return Err(ExecutionError::UnsupportedFeature("multiple MATCH clauses".to_string())),
    };
    if match_clause.optional {
        return Err(ExecutionError::UnsupportedFeature("OPTIONAL MATCH".to_string()));
    }
    let path = match match_clause.pattern.paths.as_slice() {
        [single] => single,
        [] => return Err(ExecutionError::PlanningError("Empty MATCH pattern".to_string())),
        _ => {
            return Err(ExecutionError::UnsupportedFeature(
                "comma-separated patterns".to_string(),
            ))
        }
    };

    let (chain, edge_variables, inline) = build_chain(path)?;
    let node_variables: FxHashSet<&str> = path
        .nodes()
        .filter_map(|n| n.variable.as_deref())
        .collect();

    let check_variable = |name: &str, context: &str| -> ExecutionResult<()> {
        if node_variables.contains(name) {
            Ok(())
        } else if edge_variables.contains(name) {
            Err(ExecutionError::UnsupportedFeature(format!(
                "relationship variable `{}` in {}",
                name, context
            )))
        } else {
            Err(ExecutionError::UndeclaredVariable(name.to_string()))
        }
    };

    let return_clause = query
        .return_clause
        .as_ref()
        .ok_or_else(|| ExecutionError::PlanningError("Query must have a RETURN clause".to_string()))?;
    let item = match return_clause.items.as_slice() {
        [single] => single,
        [] => return Err(ExecutionError::PlanningError("Empty RETURN clause".to_string())),
        _ => return Err(ExecutionError::UnsupportedFeature("multiple RETURN items".to_string())),
    };
    let return_variable = match &item.expression {
        Expression::Variable(name) => {
            check_variable(name, "RETURN")?;
            name.clone()
        }
        Expression::Property { variable, property } => {
            return Err(ExecutionError::UnsupportedFeature(format!(
                "property projection `{}.{}`",
                variable, property
            )))
        }
        Expression::Function { name, .. } => {
            return Err(ExecutionError::UnsupportedFeature(format!("function `{}` in RETURN", name)))
        }
        _ => {
            return Err(ExecutionError::UnsupportedFeature(
                "RETURN of anything but a node variable".to_string(),
            ))
        }
    };

    if let Some(where_clause) = &query.where_clause {
        if let Some(name) = where_clause.predicate.find_function() {
            return Err(ExecutionError::UnsupportedFeature(format!("function `{}` in WHERE", name)));
        }
        for name in where_clause.predicate.variables() {
            check_variable(name, "WHERE")?;
        }
    }

    let predicate = inline
        .into_iter()
        .chain(query.where_clause.as_ref().map(|w| w.predicate.clone()))
        .reduce(|acc, next| Expression::binary(acc, BinaryOp::And, next));

    debug!(
        "Compiled chain of {} nodes, predicate: {}, return: {}",
        chain.nodes.len(),
        predicate.is_some(),
        return_variable
    );

    Ok(CompiledQuery {
        chain,
        predicate,
        column: item.alias.clone().unwrap_or_else(|| return_variable.clone()),
        return_variable,
        limit: query.limit,
    })
}

type ChainParts<'a> = (PatternChain, FxHashSet<&'a str>, Vec<Expression>);

fn build_chain(path: &PathPattern) -> ExecutionResult<ChainParts<'_>> {
    let mut nodes = Vec::with_capacity(path.segments.len() + 1);
    let mut steps = Vec::with_capacity(path.segments.len());
    let mut edge_variables = FxHashSet::default();
    let mut inline = Vec::new();

    for (position, node) in path.nodes().enumerate() {
        // Generated names contain a space, so they never collide with a parsed identifier
        let variable = node
            .variable
            .clone()
            .unwrap_or_else(|| format!("anon {}", position));

        if let Some(props) = &node.properties {
            let mut keys: Vec<&String> = props.keys().collect();
            keys.sort();
            for key in keys {
                let value: PropertyValue = props[key].clone();
                inline.push(Expression::binary(
                    Expression::property(&variable, key),
                    BinaryOp::Eq,
                    Expression::Literal(value),
                ));
            }
        }

        nodes.push(ChainNode {
            variable,
            labels: node.labels.clone(),
            anonymous: node.variable.is_none(),
        });
    }

    for segment in &path.segments {
        let edge = &segment.edge;
        if edge.length.is_some() {
            return Err(ExecutionError::UnsupportedFeature(
                "variable-length relationships".to_string(),
            ));
        }
        if edge.properties.as_ref().is_some_and(|p| !p.is_empty()) {
            return Err(ExecutionError::UnsupportedFeature(
                "relationship property maps".to_string(),
            ));
        }
        if let Some(name) = &edge.variable {
            if nodes.iter().any(|n| &n.variable == name) {
                return Err(ExecutionError::PlanningError(format!(
                    "Variable `{}` used as both node and relationship",
                    name
                )));
            }
            edge_variables.insert(name.as_str());
        }
        steps.push(ChainStep {
            groups: edge.groups.iter().map(|g| g.as_str().to_string()).collect(),
            direction: edge.direction,
        });
    }

    Ok((PatternChain { nodes, steps }, edge_variables, inline))
}
