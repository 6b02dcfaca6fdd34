//! Chain pattern matching
//!
//! A compiled chain is matched in three phases:
//!
//! 1. **Scan**: the first position is filled from the smallest label index
//!    list of its labels (or the whole store for an unlabeled node).
//! 2. **Expand**: each step follows edges from the previous candidate set,
//!    recording `(prev, next)` pairs and the next candidate set.
//! 3. **Prune**: pairs and candidate sets are shrunk to a fixpoint so that
//!    every surviving node lies on at least one complete chain.
//!
//! A predicate over one variable is applied as a filter while scanning and
//! expanding. A predicate over several variables, or a chain that repeats a
//! variable, is checked per complete chain after pruning.
//!
//! Scan and expand run over fixed-size chunks, either in order on the
//! calling thread or fanned out over the rayon pool. Chunk results are
//! concatenated in chunk order, so both strategies produce the same output.

use super::config::ExecutorConfig;
use super::eval::{evaluate_constant, Evaluator};
use super::record::Bindings;
use super::validate::{ChainNode, ChainStep, CompiledQuery, PatternChain};
use crate::graph::{EdgeDirection, GraphStore, Node, NodeId};
use crate::query::ast::{Direction, Expression};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

/// Candidate sets and partner pairs of a matched chain
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainMatch {
    /// Candidate set per chain position, ascending by id
    pub positions: Vec<Vec<NodeId>>,
    /// `(prev, next)` pairs per step
    pub pairs: Vec<Vec<(NodeId, NodeId)>>,
}

impl ChainMatch {
    fn empty(chain: &PatternChain) -> Self {
        Self {
            positions: vec![Vec::new(); chain.nodes.len()],
            pairs: vec![Vec::new(); chain.steps.len()],
        }
    }

    /// Per-variable node sets, skipping anonymous positions
    pub fn bindings(&self, chain: &PatternChain) -> Bindings {
        let mut bindings = Bindings::new();
        for (position, node) in chain.nodes.iter().enumerate() {
            if node.anonymous || bindings.has(&node.variable) {
                continue;
            }
            bindings.bind(node.variable.clone(), self.positions[position].clone());
        }
        bindings
    }

    /// True if no complete chain matched
    pub fn is_empty(&self) -> bool {
        self.positions.iter().any(Vec::is_empty)
    }
}

/// Matches compiled chains against a graph store
pub struct PatternMatcher<'a> {
    store: &'a GraphStore,
    config: &'a ExecutorConfig,
}

impl<'a> PatternMatcher<'a> {
    pub fn new(store: &'a GraphStore, config: &'a ExecutorConfig) -> Self {
        Self { store, config }
    }

    /// Match `query`'s chain and apply its predicate
    pub fn run(&self, query: &CompiledQuery) -> ChainMatch {
        let chain = &query.chain;
        let mut predicate = query.predicate.as_ref();

        // Every step joins two consecutive positions
        if chain.nodes.is_empty() || chain.nodes.len() != chain.steps.len() + 1 {
            debug!(
                "Malformed chain of {} nodes and {} steps, nothing matches",
                chain.nodes.len(),
                chain.steps.len()
            );
            return ChainMatch::empty(chain);
        }

        if let Some(expr) = predicate {
            if expr.is_constant() {
                if !evaluate_constant(expr, self.store) {
                    debug!("Constant predicate is not true, nothing matches");
                    return ChainMatch::empty(chain);
                }
                predicate = None;
            }
        }

        // A single-variable predicate filters candidates in place; anything
        // wider needs whole rows.
        let (filter, row_predicate) = match predicate {
            Some(expr) => match expr.variables().as_slice() {
                [variable] => (Some((*variable, expr)), None),
                _ => (None, Some(expr)),
            },
            None => (None, None),
        };
        let filter_for = |node: &ChainNode| {
            filter
                .filter(|(variable, _)| *variable == node.variable)
                .map(|(_, expr)| expr)
        };

        // Only a lone node can stop at LIMIT before the whole set is known
        let limit = if chain.steps.is_empty() { query.limit } else { None };

        let first = &chain.nodes[0];
        let mut positions = vec![self.scan(first, filter_for(first), limit)];
        let mut pairs = Vec::with_capacity(chain.steps.len());
        trace!("Position 0 ({}): {} candidates", first.variable, positions[0].len());

        for (i, step) in chain.steps.iter().enumerate() {
            let next = &chain.nodes[i + 1];
            let step_pairs = self.expand(&positions[i], step, next, filter_for(next));
            let mut ends: Vec<NodeId> = step_pairs.iter().map(|(_, q)| *q).collect();
            sort_unique(&mut ends);
            trace!(
                "Step {} ({}): {} pairs, {} candidates",
                i,
                next.variable,
                step_pairs.len(),
                ends.len()
            );
            positions.push(ends);
            pairs.push(step_pairs);
        }

        let mut matched = ChainMatch { positions, pairs };
        if !chain.steps.is_empty() {
            prune(chain, &mut matched);
        }

        if row_predicate.is_some() || chain.has_reused_variables() {
            self.filter_rows(chain, row_predicate, &mut matched);
            prune(chain, &mut matched);
        }

        debug!(
            "Matched chain of {} positions: {:?}",
            chain.nodes.len(),
            matched.positions.iter().map(Vec::len).collect::<Vec<_>>()
        );
        matched
    }

    /// Candidates for a chain position with no incoming step
    fn scan(&self, node: &ChainNode, filter: Option<&Expression>, limit: Option<usize>) -> Vec<NodeId> {
        let smallest = node
            .labels
            .iter()
            .map(|label| self.store.label_ids(label))
            .min_by_key(|ids| ids.len());

        match smallest {
            Some(ids) => self.collect_chunked(ids, limit, |id: &NodeId| {
                self.accepts(*id, node, filter).then_some(*id)
            }),
            None => self.collect_chunked(self.store.nodes(), limit, |n: &Node| {
                self.accepts(n.id, node, filter).then_some(n.id)
            }),
        }
    }

    /// `(prev, next)` pairs for one step out of `prev`
    fn expand(
        &self,
        prev: &[NodeId],
        step: &ChainStep,
        next: &ChainNode,
        filter: Option<&Expression>,
    ) -> Vec<(NodeId, NodeId)> {
        let directions: &[EdgeDirection] = match step.direction {
            Direction::Outgoing => &[EdgeDirection::Outgoing],
            Direction::Incoming => &[EdgeDirection::Incoming],
            Direction::Both => &[EdgeDirection::Outgoing, EdgeDirection::Incoming],
        };

        self.run_chunked(prev, |chunk| {
            let mut out = Vec::new();
            for &p in chunk {
                for q in self.store.far_ends(p, &step.groups, directions) {
                    if self.accepts(q, next, filter) {
                        out.push((p, q));
                    }
                }
            }
            out
        })
    }

    /// Keep only positions that lie on a complete, consistent chain passing
    /// `predicate`
    fn filter_rows(&self, chain: &PatternChain, predicate: Option<&Expression>, matched: &mut ChainMatch) {
        let width = chain.nodes.len();
        let adjacency: Vec<FxHashMap<NodeId, Vec<NodeId>>> = matched
            .pairs
            .iter()
            .map(|step_pairs| {
                let mut map: FxHashMap<NodeId, Vec<NodeId>> = FxHashMap::default();
                for &(p, q) in step_pairs {
                    map.entry(p).or_default().push(q);
                }
                map
            })
            .collect();

        // For each position, the first position holding the same variable
        let first_of: Vec<usize> = chain
            .nodes
            .iter()
            .map(|n| chain.positions_of(&n.variable)[0])
            .collect();
        let mut slot: FxHashMap<&str, usize> = FxHashMap::default();
        for (position, node) in chain.nodes.iter().enumerate() {
            slot.entry(node.variable.as_str()).or_insert(position);
        }

        let partials = self.run_chunked(&matched.positions[0], |starts| {
            let mut survivors: Vec<Vec<NodeId>> = vec![Vec::new(); width];
            let mut row = Vec::with_capacity(width);
            for &start in starts {
                row.clear();
                row.push(start);
                walk(&adjacency, &first_of, &mut row, &mut |row| {
                    let lookup = |variable: &str| slot.get(variable).map(|&k| row[k]);
                    let passes = predicate
                        .map_or(true, |p| Evaluator::new(self.store, lookup).matches(p));
                    if passes {
                        for (k, id) in row.iter().enumerate() {
                            survivors[k].push(*id);
                        }
                    }
                });
            }
            vec![survivors]
        });

        let mut positions = vec![Vec::new(); width];
        for partial in partials {
            for (k, ids) in partial.into_iter().enumerate() {
                positions[k].extend(ids);
            }
        }
        for set in &mut positions {
            sort_unique(set);
        }
        matched.positions = positions;
    }

    fn accepts(&self, id: NodeId, node: &ChainNode, filter: Option<&Expression>) -> bool {
        let Some(candidate) = self.store.get_node(id) else {
            return false;
        };
        if !candidate.has_labels(&node.labels) {
            return false;
        }
        match filter {
            Some(expr) => {
                let lookup = |variable: &str| (variable == node.variable).then_some(id);
                Evaluator::new(self.store, lookup).matches(expr)
            }
            None => true,
        }
    }

    /// Like [`Self::run_chunked`] over a per-item filter, stopping early at
    /// `limit` when the work stays on this thread
    fn collect_chunked<T, R, F>(&self, items: &[T], limit: Option<usize>, f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> Option<R> + Sync + Send,
    {
        if let Some(limit) = limit {
            if !self.config.use_parallel(items.len()) {
                return items.iter().filter_map(&f).take(limit).collect();
            }
        }

        let mut out = self.run_chunked(items, |chunk| chunk.iter().filter_map(&f).collect());
        if let Some(limit) = limit {
            out.truncate(limit);
        }
        out
    }

    /// Apply `f` to each chunk of `items` and concatenate in chunk order
    fn run_chunked<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&[T]) -> Vec<R> + Sync + Send,
    {
        let size = self.config.chunk_len();
        let partials: Vec<Vec<R>> = if self.config.use_parallel(items.len()) {
            items.par_chunks(size).map(&f).collect()
        } else {
            items.chunks(size).map(&f).collect()
        };
        partials.into_iter().flatten().collect()
    }
}

/// Visit every complete chain extending `row` along `adjacency`
fn walk(
    adjacency: &[FxHashMap<NodeId, Vec<NodeId>>],
    first_of: &[usize],
    row: &mut Vec<NodeId>,
    visit: &mut impl FnMut(&[NodeId]),
) {
    let k = row.len();
    if k == first_of.len() {
        visit(row);
        return;
    }
    let Some(nexts) = adjacency[k - 1].get(&row[k - 1]) else {
        return;
    };
    for &next in nexts {
        // A reused variable must bind the same node at each position
        if first_of[k] < k && row[first_of[k]] != next {
            continue;
        }
        row.push(next);
        walk(adjacency, first_of, row, visit);
        row.pop();
    }
}

/// Shrink pairs and candidate sets until every candidate lies on a complete chain
fn prune(chain: &PatternChain, matched: &mut ChainMatch) {
    let shared: Vec<Vec<usize>> = chain
        .variables()
        .into_iter()
        .map(|v| chain.positions_of(v))
        .filter(|p| p.len() > 1)
        .collect();
    let last = matched.positions.len() - 1;

    let mut rounds = 0;
    loop {
        rounds += 1;
        let mut changed = false;

        for (i, step_pairs) in matched.pairs.iter_mut().enumerate() {
            let (prev, next) = (&matched.positions[i], &matched.positions[i + 1]);
            let before = step_pairs.len();
            step_pairs.retain(|(p, q)| contains(prev, p) && contains(next, q));
            changed |= step_pairs.len() != before;
        }

        for k in 0..=last {
            let before = matched.positions[k].len();
            if k > 0 {
                let mut ends: Vec<NodeId> = matched.pairs[k - 1].iter().map(|(_, q)| *q).collect();
                sort_unique(&mut ends);
                intersect(&mut matched.positions[k], &ends);
            }
            if k < last {
                let mut starts: Vec<NodeId> = matched.pairs[k].iter().map(|(p, _)| *p).collect();
                sort_unique(&mut starts);
                intersect(&mut matched.positions[k], &starts);
            }
            changed |= matched.positions[k].len() != before;
        }

        for group in &shared {
            let mut common = matched.positions[group[0]].clone();
            for &k in &group[1..] {
                intersect(&mut common, &matched.positions[k]);
            }
            for &k in group {
                changed |= matched.positions[k].len() != common.len();
                matched.positions[k].clone_from(&common);
            }
        }

        if !changed {
            break;
        }
    }
    trace!("Pruning settled after {} rounds", rounds);
}

fn contains(sorted: &[NodeId], id: &NodeId) -> bool {
    sorted.binary_search(id).is_ok()
}

fn intersect(set: &mut Vec<NodeId>, sorted: &[NodeId]) {
    set.retain(|id| contains(sorted, id));
}

fn sort_unique(ids: &mut Vec<NodeId>) {
    ids.sort_unstable();
    ids.dedup();
}
