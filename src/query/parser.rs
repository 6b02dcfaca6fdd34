//! OpenCypher query parser using Pest
//!
//! Produces a [`Query`] for the read subset the executor runs. Clauses the
//! executor does not run (ORDER BY, SKIP, write clauses) are still parsed
//! into the AST so that they are rejected with a precise error instead of a
//! syntax error.

use crate::graph::{EdgeGroup, Label, PropertyValue};
use crate::query::ast::*;
use pest::iterators::Pair;
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest::Parser;
use pest_derive::Parser;
use std::collections::HashMap;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Parser)]
#[grammar = "query/cypher.pest"]
struct CypherParser;

// Lowest precedence first
static PRATT_PARSER: LazyLock<PrattParser<Rule>> = LazyLock::new(|| {
    PrattParser::new()
        .op(Op::infix(Rule::or_op, Assoc::Left))
        .op(Op::infix(Rule::xor_op, Assoc::Left))
        .op(Op::infix(Rule::and_op, Assoc::Left))
        .op(Op::prefix(Rule::not_op))
        .op(Op::infix(Rule::comparison_op, Assoc::Left) | Op::infix(Rule::string_op, Assoc::Left))
        .op(Op::postfix(Rule::is_not_null_op) | Op::postfix(Rule::is_null_op))
});

/// Parser errors
#[derive(Error, Debug)]
pub enum ParseError {
    /// Pest parsing error
    #[error("Parse error: {0}")]
    PestError(#[from] Box<pest::error::Error<Rule>>),

    /// Semantic error
    #[error("Semantic error: {0}")]
    SemanticError(String),
}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        ParseError::PestError(Box::new(err))
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parse a Cypher query string into an AST
pub fn parse_query(input: &str) -> ParseResult<Query> {
    let pairs = CypherParser::parse(Rule::query, input)?;

    let mut query = Query::new();

    for pair in pairs {
        if pair.as_rule() == Rule::query {
            for inner in pair.into_inner() {
                match inner.as_rule() {
                    Rule::statement => parse_statement(inner, &mut query)?,
                    Rule::EOI => break,
                    _ => {}
                }
            }
        }
    }

    Ok(query)
}

fn parse_statement(pair: Pair<Rule>, query: &mut Query) -> ParseResult<()> {
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::match_clause | Rule::optional_match_clause => {
                let optional = inner.as_rule() == Rule::optional_match_clause;
                for mc_inner in inner.into_inner() {
                    if mc_inner.as_rule() == Rule::pattern {
                        query.match_clauses.push(MatchClause {
                            pattern: parse_pattern(mc_inner)?,
                            optional,
                        });
                    }
                }
            }
            Rule::where_clause => {
                let clause = parse_where_clause(inner)?;
                // One WHERE per MATCH; several MATCH parts conjoin their filters
                query.where_clause = Some(match query.where_clause.take() {
                    Some(existing) => WhereClause {
                        predicate: Expression::binary(existing.predicate, BinaryOp::And, clause.predicate),
                    },
                    None => clause,
                });
            }
            Rule::create_clause => {
                for create_inner in inner.into_inner() {
                    if create_inner.as_rule() == Rule::pattern {
                        query.write_clauses.push(WriteClause::Create(parse_pattern(create_inner)?));
                    }
                }
            }
            Rule::merge_clause => {
                for merge_inner in inner.into_inner() {
                    if merge_inner.as_rule() == Rule::pattern {
                        query.write_clauses.push(WriteClause::Merge(parse_pattern(merge_inner)?));
                    }
                }
            }
            Rule::delete_clause => {
                query.write_clauses.push(parse_delete_clause(inner));
            }
            Rule::set_clause => {
                query.write_clauses.push(parse_set_clause(inner)?);
            }
            Rule::return_clause => {
                query.return_clause = Some(parse_return_clause(inner)?);
            }
            Rule::order_by_clause => {
                query.order_by = Some(parse_order_by_clause(inner)?);
            }
            Rule::skip_clause => {
                query.skip = Some(parse_count(inner, "SKIP")?);
            }
            Rule::limit_clause => {
                query.limit = Some(parse_count(inner, "LIMIT")?);
            }
            _ => {}
        }
    }

    Ok(())
}

/// Non-negative integer argument of SKIP / LIMIT
fn parse_count(pair: Pair<Rule>, clause: &str) -> ParseResult<usize> {
    for inner in pair.into_inner() {
        if inner.as_rule() == Rule::integer {
            let value = parse_integer(inner.as_str())?;
            return usize::try_from(value).map_err(|_| {
                ParseError::SemanticError(format!("{} must be a non-negative integer, got {}", clause, value))
            });
        }
    }
    Err(ParseError::SemanticError(format!("Missing {} count", clause)))
}

fn parse_integer(text: &str) -> ParseResult<i64> {
    text.parse()
        .map_err(|_| ParseError::SemanticError(format!("Integer out of range: {}", text)))
}

fn parse_delete_clause(pair: Pair<Rule>) -> WriteClause {
    let mut detach = false;
    let mut variables = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::DETACH => detach = true,
            Rule::variable => variables.push(inner.as_str().to_string()),
            _ => {}
        }
    }

    WriteClause::Delete { variables, detach }
}

fn parse_set_clause(pair: Pair<Rule>) -> ParseResult<WriteClause> {
    let mut items = Vec::new();

    for inner in pair.into_inner() {
        if inner.as_rule() == Rule::set_item {
            let mut target = None;
            let mut value = None;

            for si in inner.into_inner() {
                match si.as_rule() {
                    Rule::property_access => target = Some(parse_property_access(si)?),
                    Rule::expression => value = Some(parse_expression(si)?),
                    _ => {}
                }
            }

            match (target, value) {
                (Some(Expression::Property { variable, property }), Some(value)) => {
                    items.push(SetItem { variable, property, value });
                }
                _ => return Err(ParseError::SemanticError("Invalid SET item".to_string())),
            }
        }
    }

    Ok(WriteClause::Set(items))
}

fn parse_pattern(pair: Pair<Rule>) -> ParseResult<Pattern> {
    let mut paths = Vec::new();

    for inner in pair.into_inner() {
        if inner.as_rule() == Rule::path {
            paths.push(parse_path(inner)?);
        }
    }

    Ok(Pattern { paths })
}

fn parse_path(pair: Pair<Rule>) -> ParseResult<PathPattern> {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::node => nodes.push(parse_node(inner)?),
            Rule::edge_pattern => edges.push(parse_edge(inner)?),
            _ => {}
        }
    }

    let mut nodes = nodes.into_iter();
    let start = nodes
        .next()
        .ok_or_else(|| ParseError::SemanticError("Path must have at least one node".to_string()))?;

    let segments = edges
        .into_iter()
        .zip(nodes)
        .map(|(edge, node)| PathSegment { edge, node })
        .collect();

    Ok(PathPattern { start, segments })
}

fn parse_node(pair: Pair<Rule>) -> ParseResult<NodePattern> {
    let mut variable = None;
    let mut labels = Vec::new();
    let mut properties = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::variable => {
                variable = Some(inner.as_str().to_string());
            }
            Rule::labels => {
                for label_pair in inner.into_inner() {
                    if label_pair.as_rule() == Rule::label {
                        labels.push(Label::new(label_pair.as_str()));
                    }
                }
            }
            Rule::properties => {
                properties = Some(parse_properties(inner)?);
            }
            _ => {}
        }
    }

    Ok(NodePattern {
        variable,
        labels,
        properties,
    })
}

fn parse_edge(pair: Pair<Rule>) -> ParseResult<EdgePattern> {
    let edge_str = pair.as_str();
    let direction = match (edge_str.starts_with('<'), edge_str.ends_with('>')) {
        (true, false) => Direction::Incoming,
        (false, true) => Direction::Outgoing,
        _ => Direction::Both,
    };

    let mut variable = None;
    let mut groups = Vec::new();
    let mut length = None;
    let mut properties = None;

    for inner in pair.into_inner() {
        if inner.as_rule() == Rule::edge_detail {
            for detail in inner.into_inner() {
                match detail.as_rule() {
                    Rule::variable => {
                        variable = Some(detail.as_str().to_string());
                    }
                    Rule::edge_groups => {
                        for group_pair in detail.into_inner() {
                            if group_pair.as_rule() == Rule::edge_group {
                                groups.push(EdgeGroup::new(group_pair.as_str()));
                            }
                        }
                    }
                    Rule::length_pattern => {
                        length = Some(parse_length_pattern(detail)?);
                    }
                    Rule::properties => {
                        properties = Some(parse_properties(detail)?);
                    }
                    _ => {}
                }
            }
        }
    }

    Ok(EdgePattern {
        variable,
        groups,
        direction,
        length,
        properties,
    })
}

fn parse_length_pattern(pair: Pair<Rule>) -> ParseResult<LengthPattern> {
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::range_pattern => {
                let (min, max) = inner.as_str().split_once("..").unwrap_or(("", ""));
                let bound = |s: &str| -> ParseResult<Option<usize>> {
                    if s.is_empty() {
                        Ok(None)
                    } else {
                        s.parse()
                            .map(Some)
                            .map_err(|_| ParseError::SemanticError(format!("Invalid path length: {}", s)))
                    }
                };
                return Ok(LengthPattern {
                    min: bound(min)?.or(Some(1)),
                    max: bound(max)?,
                });
            }
            Rule::integer => {
                let exact = usize::try_from(parse_integer(inner.as_str())?).map_err(|_| {
                    ParseError::SemanticError(format!("Invalid path length: {}", inner.as_str()))
                })?;
                return Ok(LengthPattern {
                    min: Some(exact),
                    max: Some(exact),
                });
            }
            _ => {}
        }
    }

    // Just * means 1..unbounded
    Ok(LengthPattern {
        min: Some(1),
        max: None,
    })
}

fn parse_properties(pair: Pair<Rule>) -> ParseResult<HashMap<String, PropertyValue>> {
    let mut props = HashMap::new();

    for inner in pair.into_inner() {
        if inner.as_rule() == Rule::property_list {
            for prop in inner.into_inner() {
                if prop.as_rule() == Rule::property {
                    let mut key = String::new();
                    let mut value = PropertyValue::Null;

                    for part in prop.into_inner() {
                        match part.as_rule() {
                            Rule::property_key => key = part.as_str().to_string(),
                            Rule::value => value = parse_value(part)?,
                            _ => {}
                        }
                    }

                    props.insert(key, value);
                }
            }
        }
    }

    Ok(props)
}

fn parse_value(pair: Pair<Rule>) -> ParseResult<PropertyValue> {
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::null => return Ok(PropertyValue::Null),
            Rule::boolean => {
                let val = inner.as_str().eq_ignore_ascii_case("true");
                return Ok(PropertyValue::Boolean(val));
            }
            Rule::integer => {
                return Ok(PropertyValue::Integer(parse_integer(inner.as_str())?));
            }
            Rule::float => {
                let val = inner
                    .as_str()
                    .parse()
                    .map_err(|_| ParseError::SemanticError(format!("Invalid float: {}", inner.as_str())))?;
                return Ok(PropertyValue::Float(val));
            }
            Rule::string => {
                let body = inner.into_inner().next().map(|p| p.as_str()).unwrap_or("");
                return Ok(PropertyValue::String(unescape(body)));
            }
            _ => {}
        }
    }

    Ok(PropertyValue::Null)
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn parse_where_clause(pair: Pair<Rule>) -> ParseResult<WhereClause> {
    for inner in pair.into_inner() {
        if inner.as_rule() == Rule::expression {
            return Ok(WhereClause {
                predicate: parse_expression(inner)?,
            });
        }
    }
    Err(ParseError::SemanticError("Invalid WHERE clause".to_string()))
}

fn parse_return_clause(pair: Pair<Rule>) -> ParseResult<ReturnClause> {
    let mut distinct = false;
    let mut items = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::DISTINCT => {
                distinct = true;
            }
            Rule::return_items => {
                for item_pair in inner.into_inner() {
                    if item_pair.as_rule() == Rule::return_item {
                        items.push(parse_return_item(item_pair)?);
                    }
                }
            }
            _ => {}
        }
    }

    Ok(ReturnClause { items, distinct })
}

fn parse_return_item(pair: Pair<Rule>) -> ParseResult<ReturnItem> {
    let mut expression = None;
    let mut alias = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::expression => {
                expression = Some(parse_expression(inner)?);
            }
            Rule::variable => {
                alias = Some(inner.as_str().to_string());
            }
            _ => {}
        }
    }

    Ok(ReturnItem {
        expression: expression
            .ok_or_else(|| ParseError::SemanticError("Missing expression in RETURN".to_string()))?,
        alias,
    })
}

fn parse_order_by_clause(pair: Pair<Rule>) -> ParseResult<OrderByClause> {
    let mut items = Vec::new();

    for inner in pair.into_inner() {
        if inner.as_rule() == Rule::order_items {
            for item_pair in inner.into_inner() {
                if item_pair.as_rule() == Rule::order_item {
                    items.push(parse_order_item(item_pair)?);
                }
            }
        }
    }

    Ok(OrderByClause { items })
}

fn parse_order_item(pair: Pair<Rule>) -> ParseResult<OrderByItem> {
    let mut expression = None;
    let mut ascending = true;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::expression => {
                expression = Some(parse_expression(inner)?);
            }
            Rule::order_direction => {
                let dir = inner.as_str();
                ascending = dir.eq_ignore_ascii_case("ASC") || dir.eq_ignore_ascii_case("ASCENDING");
            }
            _ => {}
        }
    }

    Ok(OrderByItem {
        expression: expression
            .ok_or_else(|| ParseError::SemanticError("Missing expression in ORDER BY".to_string()))?,
        ascending,
    })
}

fn parse_expression(pair: Pair<Rule>) -> ParseResult<Expression> {
    PRATT_PARSER
        .map_primary(parse_term)
        .map_prefix(|op, rhs| match op.as_rule() {
            Rule::not_op => Ok(Expression::unary(UnaryOp::Not, rhs?)),
            rule => Err(ParseError::SemanticError(format!("Unexpected prefix operator: {:?}", rule))),
        })
        .map_postfix(|lhs, op| match op.as_rule() {
            Rule::is_null_op => Ok(Expression::unary(UnaryOp::IsNull, lhs?)),
            Rule::is_not_null_op => Ok(Expression::unary(UnaryOp::IsNotNull, lhs?)),
            rule => Err(ParseError::SemanticError(format!("Unexpected postfix operator: {:?}", rule))),
        })
        .map_infix(|left, op, right| {
            let left = left?;
            let right = right?;

            let op = match op.as_rule() {
                Rule::or_op => BinaryOp::Or,
                Rule::xor_op => BinaryOp::Xor,
                Rule::and_op => BinaryOp::And,
                Rule::comparison_op | Rule::string_op => parse_op_str(op.as_str())?,
                rule => {
                    return Err(ParseError::SemanticError(format!("Unexpected operator: {:?}", rule)))
                }
            };

            Ok(Expression::binary(left, op, right))
        })
        .parse(pair.into_inner())
}

fn parse_op_str(op_str: &str) -> ParseResult<BinaryOp> {
    // STARTS WITH / ENDS WITH may carry any whitespace between the words
    let normalized = op_str.split_whitespace().collect::<Vec<_>>().join(" ");
    Ok(match normalized.as_str() {
        "=" => BinaryOp::Eq,
        "!=" | "<>" => BinaryOp::Ne,
        "<" => BinaryOp::Lt,
        "<=" => BinaryOp::Le,
        ">" => BinaryOp::Gt,
        ">=" => BinaryOp::Ge,
        s if s.eq_ignore_ascii_case("STARTS WITH") => BinaryOp::StartsWith,
        s if s.eq_ignore_ascii_case("ENDS WITH") => BinaryOp::EndsWith,
        s if s.eq_ignore_ascii_case("CONTAINS") => BinaryOp::Contains,
        _ => return Err(ParseError::SemanticError(format!("Unknown operator: {}", op_str))),
    })
}

fn parse_term(pair: Pair<Rule>) -> ParseResult<Expression> {
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::property_access => return parse_property_access(inner),
            Rule::function_call => return parse_function_call(inner),
            Rule::variable => return Ok(Expression::Variable(inner.as_str().to_string())),
            Rule::value => return Ok(Expression::Literal(parse_value(inner)?)),
            Rule::expression => return parse_expression(inner),
            _ => {}
        }
    }
    Err(ParseError::SemanticError("Invalid term".to_string()))
}

fn parse_property_access(pair: Pair<Rule>) -> ParseResult<Expression> {
    let mut variable = None;
    let mut property = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::variable => variable = Some(inner.as_str().to_string()),
            Rule::property_key => property = Some(inner.as_str().to_string()),
            _ => {}
        }
    }

    match (variable, property) {
        (Some(variable), Some(property)) => Ok(Expression::Property { variable, property }),
        _ => Err(ParseError::SemanticError("Invalid property access".to_string())),
    }
}

fn parse_function_call(pair: Pair<Rule>) -> ParseResult<Expression> {
    let mut name = String::new();
    let mut args = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::function_name => name = inner.as_str().to_string(),
            Rule::expression => args.push(parse_expression(inner)?),
            _ => {}
        }
    }

    Ok(Expression::Function { name, args })
}
