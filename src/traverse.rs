//! Single-pass traversal driver.
//!
//! All queries run together over one depth-first walk of the arena.
//! Pending matchers are kept in per-depth frames: `child` matchers
//! apply to nodes exactly one level below the node that registered
//! them, `descendant` matchers to everything beneath it. Entering a
//! node records matches and registers follow-up matchers one frame
//! down; leaving it finalizes the recorded matches, after which the
//! frame is discarded.
//!
//! Matchers write into shared result slots. A selector chain threads
//! one slot through all its steps, and a filtered selector gives its
//! chain a fresh slot that is only copied into the real result once
//! the filter has passed.

use tracing::debug;

use crate::ast::{Axis, QueryNode};
use crate::evaluator::{self, EvalError, Memo};
use crate::path::{NodeId, Session};
use crate::value::QueryValue;

/// Index into the result-slot slab of a [`TravState`].
pub(crate) type Slot = usize;

/// Index into the matcher slab of a [`TravState`].
pub(crate) type FNodeIdx = usize;

/// A pending matcher: one query step waiting for nodes, writing into
/// a shared result slot.
pub(crate) struct FNode<'q> {
    pub qnode: &'q QueryNode,
    pub result: Slot,
}

/// Compiled form of one filter expression, with matcher leaves.
pub(crate) enum FilterTree {
    Leaf(FNodeIdx),
    Cond {
        kind: crate::ast::ConditionKind,
        left: Box<FilterTree>,
        right: Box<FilterTree>,
    },
}

/// One activation of a filtered selector: the filter tree plus the
/// result slot its chain accumulates into while the filter is still
/// undecided.
pub(crate) struct FilterInstance<'q> {
    pub qnode: &'q QueryNode,
    pub node: NodeId,
    pub tree: FilterTree,
    pub result: Slot,
}

/// Mutable traversal state shared by all queries of one walk.
pub(crate) struct TravState<'q> {
    pub depth: usize,
    pub fnodes: Vec<FNode<'q>>,
    pub results: Vec<Vec<QueryValue>>,
    pub child: Vec<Vec<FNodeIdx>>,
    pub descendant: Vec<Vec<FNodeIdx>>,
    pub filters: Vec<Vec<FilterInstance<'q>>>,
    pub matches: Vec<Vec<(FNodeIdx, NodeId)>>,
}

impl<'q> TravState<'q> {
    fn new() -> Self {
        TravState {
            depth: 0,
            fnodes: Vec::new(),
            results: Vec::new(),
            // one frame for the root plus one for its children
            child: vec![Vec::new(), Vec::new()],
            descendant: vec![Vec::new(), Vec::new()],
            filters: vec![Vec::new(), Vec::new()],
            matches: vec![Vec::new()],
        }
    }

    pub fn new_slot(&mut self) -> Slot {
        self.results.push(Vec::new());
        self.results.len() - 1
    }

    /// Appends a value to a slot. Nodes already present in the slot are
    /// skipped; primitives always append.
    pub fn push_value(&mut self, slot: Slot, value: QueryValue) {
        if matches!(value, QueryValue::Node(_)) && self.results[slot].contains(&value) {
            return;
        }
        self.results[slot].push(value);
    }

    pub fn extend_values(&mut self, slot: Slot, values: Vec<QueryValue>) {
        for value in values {
            self.push_value(slot, value);
        }
    }

    /// Creates a matcher and registers it one frame below the current
    /// depth when its axis makes it matchable. Parent-axis steps and
    /// non-selectors are resolved lazily and never registered.
    pub fn add_fnode(&mut self, qnode: &'q QueryNode, result: Slot) -> FNodeIdx {
        let idx = self.fnodes.len();
        self.fnodes.push(FNode { qnode, result });
        if let QueryNode::Selector(sel) = qnode {
            match sel.axis {
                Axis::Child => self.child[self.depth + 1].push(idx),
                Axis::Descendant => self.descendant[self.depth + 1].push(idx),
                Axis::Parent => {}
            }
        }
        idx
    }

    /// Instantiates a filter expression. Literal leaves get a slot
    /// pre-filled with their value; selector leaves register as
    /// matchers with empty slots that fill up during the subtree walk.
    pub fn create_filter(&mut self, qnode: &'q QueryNode) -> FilterTree {
        match qnode {
            QueryNode::Condition { kind, left, right } => FilterTree::Cond {
                kind: *kind,
                left: Box::new(self.create_filter(left)),
                right: Box::new(self.create_filter(right)),
            },
            QueryNode::Literal(value) => {
                let slot = self.new_slot();
                self.results[slot].push(QueryValue::Str(value.clone()));
                FilterTree::Leaf(self.add_fnode(qnode, slot))
            }
            _ => {
                let slot = self.new_slot();
                FilterTree::Leaf(self.add_fnode(qnode, slot))
            }
        }
    }
}

enum Step {
    Enter(NodeId),
    Exit(NodeId),
}

/// Runs `queries` against the subtree under `root` and returns one
/// result list per query, in query order.
///
/// The root itself is never a match candidate; it only contributes
/// primitive field values to attribute steps. Sub-queries spawned by
/// direct resolution re-enter here with their own state, memoized per
/// query step and start node.
pub(crate) fn run_traversal<'q>(
    session: &Session<'_>,
    memo: &mut Memo,
    queries: &[&'q QueryNode],
    root: NodeId,
) -> Result<Vec<Vec<QueryValue>>, EvalError> {
    let mut state = TravState::new();
    let mut roots: Vec<Slot> = Vec::new();

    for &qnode in queries {
        let slot = state.new_slot();
        if matches!(qnode, QueryNode::FunctionCall { .. }) {
            // a bare function call evaluates against the root directly
            let values = evaluator::resolve_function_call(session, memo, qnode, root)?;
            state.results[slot] = values;
        } else {
            state.add_fnode(qnode, slot);
        }
        roots.push(slot);
    }

    // primitive fields of the root are not visited by the walk
    for fidx in state.child[state.depth + 1].clone() {
        evaluator::add_primitive_attribute_if_match(session, &mut state, fidx, root);
    }
    for frame in 0..=state.depth {
        for fidx in state.descendant[frame].clone() {
            evaluator::add_primitive_attribute_if_match(session, &mut state, fidx, root);
        }
    }

    let mut walk: Vec<Step> = session
        .children(root)
        .iter()
        .rev()
        .map(|&c| Step::Enter(c))
        .collect();

    while let Some(step) = walk.pop() {
        match step {
            Step::Enter(node) => {
                walk.push(Step::Exit(node));
                for &c in session.children(node).iter().rev() {
                    walk.push(Step::Enter(c));
                }
                enter(session, &mut state, node);
            }
            Step::Exit(node) => exit(session, memo, &mut state, node)?,
        }
    }

    Ok(roots
        .into_iter()
        .map(|slot| std::mem::take(&mut state.results[slot]))
        .collect())
}

fn enter(session: &Session<'_>, state: &mut TravState<'_>, node: NodeId) {
    state.depth += 1;
    state.child.push(Vec::new());
    state.descendant.push(Vec::new());
    state.filters.push(Vec::new());
    state.matches.push(Vec::new());

    for fidx in state.child[state.depth].clone() {
        evaluator::add_if_token_match(session, state, fidx, node);
    }
    // every descendant frame from the root down applies here; matchers
    // registered by this very node sit one frame lower and do not
    for frame in 0..=state.depth {
        for fidx in state.descendant[frame].clone() {
            evaluator::add_if_token_match(session, state, fidx, node);
        }
    }
}

fn exit(
    session: &Session<'_>,
    memo: &mut Memo,
    state: &mut TravState<'_>,
    node: NodeId,
) -> Result<(), EvalError> {
    // primitive fields never show up as visited nodes, so attribute
    // steps are checked against the exiting node here
    for fidx in state.child[state.depth + 1].clone() {
        evaluator::add_primitive_attribute_if_match(session, state, fidx, node);
    }
    for frame in 0..state.descendant.len() {
        for fidx in state.descendant[frame].clone() {
            evaluator::add_primitive_attribute_if_match(session, state, fidx, node);
        }
    }

    let finalized = std::mem::take(&mut state.matches[state.depth]);
    if !finalized.is_empty() {
        debug!(count = finalized.len(), "finalizing matches");
    }
    for (fidx, matched) in finalized {
        evaluator::add_result_if_token_match(session, memo, state, fidx, matched)?;
    }

    state.child.pop();
    state.descendant.pop();
    state.filters.pop();
    state.matches.pop();
    state.depth -= 1;
    Ok(())
}
