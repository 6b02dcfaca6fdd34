//! WHERE predicate evaluation
//!
//! Predicates are fail-closed: a comparison involving an absent value or
//! operands of different types is `false`, never an error. Only rows whose
//! predicate is `true` pass the filter.

use super::record::Value;
use crate::graph::{GraphStore, NodeId, PropertyValue};
use crate::query::ast::{BinaryOp, Expression, UnaryOp};
use std::cmp::Ordering;

static TRUE: PropertyValue = PropertyValue::Boolean(true);
static FALSE: PropertyValue = PropertyValue::Boolean(false);

fn bool_value(b: bool) -> Value<'static> {
    Value::Property(if b { &TRUE } else { &FALSE })
}

/// Evaluates expressions against one row of variable bindings
pub struct Evaluator<'a, F> {
    store: &'a GraphStore,
    lookup: F,
}

impl<'a, F> Evaluator<'a, F>
where
    F: Fn(&str) -> Option<NodeId>,
{
    /// `lookup` maps a variable to the node bound to it in the current row
    pub fn new(store: &'a GraphStore, lookup: F) -> Self {
        Self { store, lookup }
    }

    /// Whether `expr` holds for the current row
    pub fn matches(&self, expr: &'a Expression) -> bool {
        match expr {
            Expression::Binary { left, op, right } => match op {
                BinaryOp::And => self.matches(left) && self.matches(right),
                BinaryOp::Or => self.matches(left) || self.matches(right),
                BinaryOp::Xor => self.matches(left) != self.matches(right),
                _ => compare(*op, self.value(left), self.value(right)),
            },
            Expression::Unary { op, expr } => match op {
                UnaryOp::Not => !self.matches(expr),
                UnaryOp::IsNull => self.value(expr).is_null(),
                UnaryOp::IsNotNull => !self.value(expr).is_null(),
            },
            _ => matches!(self.value(expr), Value::Property(PropertyValue::Boolean(true))),
        }
    }

    /// Operand value of `expr`
    pub fn value(&self, expr: &'a Expression) -> Value<'a> {
        match expr {
            Expression::Literal(v) => Value::from_property(v),
            Expression::Variable(name) => match (self.lookup)(name) {
                Some(id) => Value::NodeRef(id),
                None => Value::Null,
            },
            Expression::Property { variable, property } => match (self.lookup)(variable) {
                Some(id) => Value::NodeRef(id).resolve_property(property, self.store),
                None => Value::Null,
            },
            Expression::Binary { .. } | Expression::Unary { .. } => bool_value(self.matches(expr)),
            Expression::Function { .. } => Value::Null,
        }
    }
}

/// Evaluate an expression that references no variable
pub fn evaluate_constant(expr: &Expression, store: &GraphStore) -> bool {
    Evaluator::new(store, |_: &str| None).matches(expr)
}

fn same_type(l: &PropertyValue, r: &PropertyValue) -> bool {
    let numeric = |v: &PropertyValue| matches!(v, PropertyValue::Integer(_) | PropertyValue::Float(_));
    (numeric(l) && numeric(r)) || std::mem::discriminant(l) == std::mem::discriminant(r)
}

fn compare(op: BinaryOp, left: Value<'_>, right: Value<'_>) -> bool {
    let (l, r) = match (left, right) {
        (Value::NodeRef(a), Value::NodeRef(b)) => {
            return match op {
                BinaryOp::Eq => a == b,
                BinaryOp::Ne => a != b,
                _ => false,
            }
        }
        (Value::Property(l), Value::Property(r)) => (l, r),
        _ => return false,
    };

    match op {
        BinaryOp::Eq => l.loose_eq(r).unwrap_or(false),
        BinaryOp::Ne => same_type(l, r) && l.loose_eq(r).map_or(false, |eq| !eq),
        BinaryOp::Lt => ordered(l, r, |o| o == Ordering::Less),
        BinaryOp::Le => ordered(l, r, |o| o != Ordering::Greater),
        BinaryOp::Gt => ordered(l, r, |o| o == Ordering::Greater),
        BinaryOp::Ge => ordered(l, r, |o| o != Ordering::Less),
        BinaryOp::StartsWith => strings(l, r, |a, b| a.starts_with(b)),
        BinaryOp::EndsWith => strings(l, r, |a, b| a.ends_with(b)),
        BinaryOp::Contains => strings(l, r, |a, b| a.contains(b)),
        BinaryOp::And | BinaryOp::Or | BinaryOp::Xor => false,
    }
}

fn ordered(l: &PropertyValue, r: &PropertyValue, test: impl Fn(Ordering) -> bool) -> bool {
    l.loose_cmp(r).map_or(false, test)
}

fn strings(l: &PropertyValue, r: &PropertyValue, test: impl Fn(&str, &str) -> bool) -> bool {
    match (l.as_string(), r.as_string()) {
        (Some(a), Some(b)) => test(a, b),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeBuilder;
    use crate::query::parser::parse_query;

    fn where_of(query: &str) -> Expression {
        parse_query(query).unwrap().where_clause.unwrap().predicate
    }

    fn constant(predicate: &str) -> bool {
        let expr = where_of(&format!("MATCH (n) WHERE {} RETURN n", predicate));
        evaluate_constant(&expr, &GraphStore::new())
    }

    #[test]
    fn test_constant_predicates() {
        assert!(constant("1=1"));
        assert!(!constant("1='a'"));
        assert!(!constant("1<0"));
        assert!(!constant("0>1"));
        assert!(constant("1 = 1.0"));
        assert!(constant("2 >= 1.5"));
        assert!(constant("'abc' < 'abd'"));
        assert!(constant("false < true"));
    }

    #[test]
    fn test_type_mismatch_is_false() {
        assert!(!constant("1 <> 'a'"));
        assert!(!constant("1 < 'a'"));
        assert!(!constant("true = 1"));
        assert!(!constant("1 STARTS WITH 'a'"));
        assert!(constant("1 <> 2"));
        assert!(constant("NOT 1 = 'a'"));
    }

    #[test]
    fn test_null_comparisons_are_false() {
        assert!(!constant("null = null"));
        assert!(!constant("1 < null"));
        assert!(!constant("1 <> null"));
        assert!(constant("NOT (1 = null)"));
        assert!(constant("null IS NULL"));
        assert!(constant("1 IS NOT NULL"));
    }

    #[test]
    fn test_connectives() {
        assert!(!constant("1 = null AND 1 = 1"));
        assert!(constant("1 = null OR 1 = 1"));
        assert!(!constant("1 = null OR 1 = 2"));
        assert!(constant("1 = 1 XOR 1 = 2"));
        assert!(!constant("1 = 1 XOR 2 = 2"));
        assert!(constant("1 = 1 XOR 1 = null"));
        assert!(constant("NOT 1 = 2"));
    }

    #[test]
    fn test_nested_predicate_as_operand() {
        assert!(constant("(1 = 1) = true"));
        assert!(constant("(1 = null) = false"));
    }

    #[test]
    fn test_property_predicates() {
        let mut store = GraphStore::new();
        let param = store.add(NodeBuilder::new_method_parameter("paramB", "int paramB", 0, false));
        let func = store.add(NodeBuilder::new_function_declaration("func2", "void func2(int paramB)"));

        let lookup = |var: &str| match var {
            "m" => Some(param),
            "n" => Some(func),
            _ => None,
        };
        let eval = |predicate: &str| {
            let expr = where_of(&format!("MATCH (n)-->(m) WHERE {} RETURN n", predicate));
            Evaluator::new(&store, lookup).matches(&expr)
        };

        assert!(eval("m.name = 'paramB'"));
        assert!(!eval("m.name = 'paramA'"));
        assert!(eval("m.argument_index = 0"));
        assert!(!eval("m.is_variadic"));
        assert!(eval("NOT m.is_variadic"));
        assert!(!eval("m.missing = 'x'"));
        assert!(!eval("m.missing <> 'x'"));
        assert!(eval("NOT m.missing = 'x'"));
        assert!(!eval("m.missing"));
        assert!(eval("NOT m.missing"));
        assert!(eval("m.missing IS NULL"));
        assert!(eval("n.code CONTAINS 'paramB'"));
        assert!(eval("n.name STARTS WITH 'func' AND m.name ENDS WITH 'B'"));
        assert!(!eval("n = m"));
        assert!(eval("n <> m"));
        assert!(!eval("n.name"));
    }
}
