//! Match evaluation and result resolution.
//!
//! The traversal driver calls in here at three points: when a node is
//! entered (does a pending matcher apply, and what does its match
//! register), when a node is exited (primitive attribute collection
//! and match finalization), and lazily whenever a filter or a binding
//! chain needs values that the walk itself cannot provide. The lazy
//! paths run bounded sub-traversals, memoized per query step and
//! start node.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::ast::{Axis, ConditionKind, FnName, QueryNode, Selector};
use crate::path::{Lookup, NodeId, Session};
use crate::traverse::{self, FNodeIdx, FilterTree, TravState};
use crate::value::QueryValue;

/// Errors produced while evaluating a compiled query.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// A built-in function called with the wrong number of parameters
    WrongArgumentCount {
        function: &'static str,
        expected: usize,
        found: usize,
    },

    /// A built-in function parameter resolved to an unusable value
    WrongArgumentType {
        function: &'static str,
        expected: &'static str,
    },
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::WrongArgumentCount {
                function,
                expected,
                found,
            } => write!(
                f,
                "fn:{} expects {} parameter(s), found {}",
                function, expected, found
            ),
            EvalError::WrongArgumentType { function, expected } => {
                write!(f, "fn:{} expects {}", function, expected)
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// Sub-query cache for one session, keyed by query step identity and
/// start node. Direct resolution repeatedly re-runs the same step from
/// the same node; the walk result never changes within a session.
#[derive(Default)]
pub(crate) struct Memo {
    map: HashMap<(usize, usize), Vec<QueryValue>>,
}

fn qnode_key(qnode: &QueryNode) -> usize {
    qnode as *const QueryNode as usize
}

/// Whether a matcher applies to a node. Attribute steps compare the
/// field the node hangs off (or its array index); node steps compare
/// the type name, with `*` matching everything.
fn is_match(session: &Session<'_>, sel: &Selector, node: NodeId) -> bool {
    let entry = session.node(node);
    if sel.attribute {
        return entry.field.is_some_and(|f| f == sel.value)
            || entry.index.is_some_and(|i| i.to_string() == sel.value);
    }
    sel.value == "*" || sel.value == entry.node_type
}

/// Records a match of `fidx` against an entered node and registers the
/// follow-up work: the filter instance and, unless this step redirects
/// through a binding, the next chain step one frame down.
pub(crate) fn add_if_token_match<'q>(
    session: &Session<'_>,
    state: &mut TravState<'q>,
    fidx: FNodeIdx,
    node: NodeId,
) {
    let qnode: &'q QueryNode = state.fnodes[fidx].qnode;
    let Some(sel) = qnode.as_selector() else {
        return;
    };
    if !is_match(session, sel, node) {
        return;
    }
    debug!(value = %sel.value, node = session.node(node).node_type, "match");
    let depth = state.depth;
    state.matches[depth].push((fidx, node));

    if let Some(filter) = sel.filter.as_deref() {
        // the chain accumulates into a provisional slot until the
        // filter verdict is known at exit
        let slot = state.new_slot();
        let tree = state.create_filter(filter);
        state.filters[depth].push(traverse::FilterInstance {
            qnode,
            node,
            tree,
            result: slot,
        });
        if let Some(child) = sel.child.as_deref() {
            state.add_fnode(child, slot);
        }
    } else if let Some(child) = sel.child.as_deref()
        && !sel.binding
        && !sel.resolve
    {
        // binding and resolve steps run their chain at finalization
        let result = state.fnodes[fidx].result;
        state.add_fnode(child, result);
    }
}

/// Collects primitive field values for a terminal attribute matcher.
/// Primitives are never entered by the walk, so this runs against
/// every exiting node (and once against the traversal root).
pub(crate) fn add_primitive_attribute_if_match(
    session: &Session<'_>,
    state: &mut TravState<'_>,
    fidx: FNodeIdx,
    node: NodeId,
) {
    let fnode = &state.fnodes[fidx];
    let Some(sel) = fnode.qnode.as_selector() else {
        return;
    };
    if !sel.attribute || sel.value.is_empty() || sel.child.is_some() || sel.filter.is_some() {
        return;
    }
    let slot = fnode.result;
    let values: Vec<QueryValue> = session
        .lookup(node, &sel.value)
        .into_iter()
        .filter_map(|item| match item {
            Lookup::Value(v) => QueryValue::from_json(v),
            Lookup::Node(_) => None,
        })
        .collect();
    if !values.is_empty() {
        debug!(field = %sel.value, count = values.len(), "primitive attribute");
        state.extend_values(slot, values);
    }
}

/// Finalizes one recorded match at node exit: applies the filter
/// verdict, then routes the result through the binding redirect, the
/// plain node push, a terminal function call, or the filter-slot copy.
pub(crate) fn add_result_if_token_match(
    session: &Session<'_>,
    memo: &mut Memo,
    state: &mut TravState<'_>,
    fidx: FNodeIdx,
    node: NodeId,
) -> Result<(), EvalError> {
    let qnode = state.fnodes[fidx].qnode;
    let slot = state.fnodes[fidx].result;
    let Some(sel) = qnode.as_selector() else {
        return Ok(());
    };

    let depth = state.depth;
    let mut has_instances = false;
    let mut matching_slots = Vec::new();
    for i in 0..state.filters[depth].len() {
        let inst = &state.filters[depth][i];
        if !std::ptr::eq(inst.qnode, qnode) || inst.node != node {
            continue;
        }
        has_instances = true;
        let verdict = evaluate_filter(session, memo, state, &state.filters[depth][i].tree, node)?;
        if !verdict.is_empty() {
            matching_slots.push(state.filters[depth][i].result);
        }
    }
    if has_instances && matching_slots.is_empty() {
        return Ok(());
    }

    if sel.resolve {
        // follow the initializer of the declaration, falling back to
        // the matched node when there is nothing to follow
        let init: Vec<Lookup<'_>> = resolve_binding(session, node)
            .map(|b| session.lookup(b, "init"))
            .unwrap_or_default();
        if let Some(child) = sel.child.as_deref() {
            let values = match init.first() {
                Some(Lookup::Node(n)) => resolve_directly(session, memo, child, *n)?,
                Some(Lookup::Value(_)) => Vec::new(),
                None => resolve_directly(session, memo, child, node)?,
            };
            state.extend_values(slot, values);
        } else if init.is_empty() {
            state.push_value(slot, QueryValue::Node(node));
        } else {
            for item in init {
                match item {
                    Lookup::Node(n) => state.push_value(slot, QueryValue::Node(n)),
                    Lookup::Value(v) => {
                        if let Some(value) = QueryValue::from_json(v) {
                            state.push_value(slot, value);
                        }
                    }
                }
            }
        }
    } else if sel.binding {
        if let Some(binding) = resolve_binding(session, node) {
            if let Some(child) = sel.child.as_deref() {
                let values = resolve_directly(session, memo, child, binding)?;
                state.extend_values(slot, values);
            } else {
                state.push_value(slot, QueryValue::Node(binding));
            }
        }
    } else if sel.child.is_none() {
        state.push_value(slot, QueryValue::Node(node));
    } else if let Some(call @ QueryNode::FunctionCall { .. }) = sel.child.as_deref() {
        let values = resolve_function_call(session, memo, call, node)?;
        state.extend_values(slot, values);
    } else if !matching_slots.is_empty() {
        let values: Vec<QueryValue> = matching_slots
            .iter()
            .flat_map(|s| state.results[*s].clone())
            .collect();
        state.extend_values(slot, values);
    }
    Ok(())
}

/// Evaluates a filter tree against the node that carries the filter.
/// `&&` and `||` short-circuit on emptiness; `==` keeps the left-hand
/// values also present on the right (node identity for nodes, value
/// equality for primitives).
fn evaluate_filter(
    session: &Session<'_>,
    memo: &mut Memo,
    state: &TravState<'_>,
    tree: &FilterTree,
    node: NodeId,
) -> Result<Vec<QueryValue>, EvalError> {
    match tree {
        FilterTree::Cond { kind, left, right } => match kind {
            ConditionKind::And => {
                if evaluate_filter(session, memo, state, left, node)?.is_empty() {
                    Ok(Vec::new())
                } else {
                    evaluate_filter(session, memo, state, right, node)
                }
            }
            ConditionKind::Or => {
                let l = evaluate_filter(session, memo, state, left, node)?;
                if !l.is_empty() {
                    Ok(l)
                } else {
                    evaluate_filter(session, memo, state, right, node)
                }
            }
            ConditionKind::Equals => {
                let l = evaluate_filter(session, memo, state, left, node)?;
                let r = evaluate_filter(session, memo, state, right, node)?;
                Ok(l.into_iter().filter(|x| r.contains(x)).collect())
            }
        },
        FilterTree::Leaf(fidx) => {
            let fnode = &state.fnodes[*fidx];
            match fnode.qnode {
                QueryNode::Selector(sel) if sel.axis == Axis::Parent => {
                    resolve_filter_with_parent(session, memo, fnode.qnode, node)
                }
                call @ QueryNode::FunctionCall { .. } => {
                    resolve_function_call(session, memo, call, node)
                }
                _ => Ok(state.results[fnode.result].clone()),
            }
        }
    }
}

/// Finds the declaration the matched node's name resolves to. Nodes
/// without a `name`, and names with no binding in scope, yield `None`.
fn resolve_binding(session: &Session<'_>, node: NodeId) -> Option<NodeId> {
    let entry = session.node(node);
    let name = entry.value.get("name")?.as_str()?;
    let binding = session.lookup_binding(entry.scope, name);
    debug!(name, found = binding.is_some(), "binding lookup");
    binding
}

/// Resolves a parent-axis filter leaf: steps up one AST level per
/// parent step, then resolves the rest of the chain from there.
fn resolve_filter_with_parent(
    session: &Session<'_>,
    memo: &mut Memo,
    qnode: &QueryNode,
    node: NodeId,
) -> Result<Vec<QueryValue>, EvalError> {
    let mut current = qnode;
    let mut at = node;
    while let QueryNode::Selector(sel) = current
        && sel.axis == Axis::Parent
    {
        let Some(child) = sel.child.as_deref() else {
            return Ok(Vec::new());
        };
        let Some(parent) = session.parent(at) else {
            return Ok(Vec::new());
        };
        current = child;
        at = parent;
    }
    resolve_directly(session, memo, current, at)
}

/// A value in flight during direct resolution: an arena node or a raw
/// JSON value reached by attribute stepping.
enum Item<'a> {
    Node(NodeId),
    Raw(&'a Value),
}

/// Resolves a chain starting at a known node without waiting for the
/// main walk: attribute steps walk fields directly, non-attribute
/// steps spawn a memoized sub-traversal, and function calls evaluate
/// in place. Binding and resolve redirects apply after each attribute
/// step, mirroring their behavior during the walk.
pub(crate) fn resolve_directly<'a>(
    session: &Session<'a>,
    memo: &mut Memo,
    qnode: &QueryNode,
    start: NodeId,
) -> Result<Vec<QueryValue>, EvalError> {
    let mut node = qnode;
    let mut items: Vec<Item<'a>> = vec![Item::Node(start)];

    loop {
        match node {
            QueryNode::Literal(value) => return Ok(vec![QueryValue::Str(value.clone())]),
            call @ QueryNode::FunctionCall { .. } => {
                let mut out = Vec::new();
                for item in &items {
                    if let Item::Node(id) = item {
                        out.extend(resolve_function_call(session, memo, call, *id)?);
                    }
                }
                return Ok(out);
            }
            QueryNode::Condition { .. } => return Ok(Vec::new()),
            QueryNode::Selector(sel) if sel.attribute => {
                let mut next = Vec::new();
                for item in &items {
                    if let Item::Node(id) = item {
                        for looked_up in session.lookup(*id, &sel.value) {
                            next.push(match looked_up {
                                Lookup::Node(n) => Item::Node(n),
                                Lookup::Value(v) => Item::Raw(v),
                            });
                        }
                    }
                }
                if next.is_empty() {
                    return Ok(Vec::new());
                }
                items = next;

                if sel.resolve {
                    let resolved: Vec<Item<'a>> = items
                        .iter()
                        .filter_map(|item| match item {
                            Item::Node(id) => resolve_binding(session, *id),
                            Item::Raw(_) => None,
                        })
                        .flat_map(|binding| session.lookup(binding, "init"))
                        .map(|looked_up| match looked_up {
                            Lookup::Node(n) => Item::Node(n),
                            Lookup::Value(v) => Item::Raw(v),
                        })
                        .collect();
                    if !resolved.is_empty() {
                        items = resolved;
                    }
                } else if sel.binding {
                    items = items
                        .iter()
                        .filter_map(|item| match item {
                            Item::Node(id) => resolve_binding(session, *id).map(Item::Node),
                            Item::Raw(_) => None,
                        })
                        .collect();
                }

                match sel.child.as_deref() {
                    Some(child) => node = child,
                    None => {
                        return Ok(items
                            .into_iter()
                            .filter_map(|item| match item {
                                Item::Node(id) => Some(QueryValue::Node(id)),
                                Item::Raw(v) => QueryValue::from_json(v),
                            })
                            .collect());
                    }
                }
            }
            sub @ QueryNode::Selector(_) => {
                // a structural step needs a real walk of the subtree
                let mut out = Vec::new();
                for item in &items {
                    let Item::Node(id) = item else { continue };
                    let key = (qnode_key(sub), id.0);
                    if let Some(hit) = memo.map.get(&key) {
                        debug!(node = id.0, "sub-query memo hit");
                        out.extend(hit.iter().cloned());
                        continue;
                    }
                    let values = traverse::run_traversal(session, memo, &[sub], *id)?
                        .pop()
                        .unwrap_or_default();
                    memo.map.insert(key, values.clone());
                    out.extend(values);
                }
                return Ok(out);
            }
        }
    }
}

/// Evaluates a built-in function call rooted at `node`. Parameters are
/// resolved to value lists first; the function then combines them.
/// Arity and parameter types are checked here, at evaluation time.
pub(crate) fn resolve_function_call(
    session: &Session<'_>,
    memo: &mut Memo,
    call: &QueryNode,
    node: NodeId,
) -> Result<Vec<QueryValue>, EvalError> {
    let QueryNode::FunctionCall { name, params } = call else {
        return Ok(Vec::new());
    };
    let mut args = Vec::with_capacity(params.len());
    for param in params {
        args.push(resolve_directly(session, memo, param, node)?);
    }
    debug!(function = name.as_str(), params = args.len(), "function call");

    match name {
        FnName::Join => {
            expect_arity(*name, &args, 2)?;
            let separator = single_string(*name, &args[1])?;
            if args[0].is_empty() {
                return Ok(Vec::new());
            }
            let parts = rendered(*name, &args[0])?;
            Ok(vec![QueryValue::Str(parts.join(&separator))])
        }
        FnName::Concat => {
            if args.is_empty() {
                return Err(EvalError::WrongArgumentCount {
                    function: "concat",
                    expected: 1,
                    found: 0,
                });
            }
            // one empty parameter voids the whole concatenation
            if args.iter().any(Vec::is_empty) {
                return Ok(Vec::new());
            }
            let mut out = String::new();
            for arg in &args {
                out.push_str(&rendered(*name, arg)?.concat());
            }
            Ok(vec![QueryValue::Str(out)])
        }
        FnName::First => {
            expect_arity(*name, &args, 1)?;
            Ok(args[0].first().cloned().into_iter().collect())
        }
        FnName::NthChild => {
            expect_arity(*name, &args, 2)?;
            let index = numeric_index(*name, &args[1])?;
            Ok(args[0].get(index).cloned().into_iter().collect())
        }
    }
}

fn expect_arity(name: FnName, args: &[Vec<QueryValue>], expected: usize) -> Result<(), EvalError> {
    if args.len() != expected {
        return Err(EvalError::WrongArgumentCount {
            function: name.as_str(),
            expected,
            found: args.len(),
        });
    }
    Ok(())
}

fn single_string(name: FnName, values: &[QueryValue]) -> Result<String, EvalError> {
    match values {
        [QueryValue::Str(s)] => Ok(s.clone()),
        _ => Err(EvalError::WrongArgumentType {
            function: name.as_str(),
            expected: "a single string",
        }),
    }
}

fn rendered(name: FnName, values: &[QueryValue]) -> Result<Vec<String>, EvalError> {
    values
        .iter()
        .map(|v| {
            v.render().ok_or(EvalError::WrongArgumentType {
                function: name.as_str(),
                expected: "primitive values",
            })
        })
        .collect()
}

/// The index parameter of `nthchild` may be a number or a string that
/// parses as one.
fn numeric_index(name: FnName, values: &[QueryValue]) -> Result<usize, EvalError> {
    let err = EvalError::WrongArgumentType {
        function: name.as_str(),
        expected: "a numeric index",
    };
    match values {
        [QueryValue::Num(n)] => n.as_u64().map(|v| v as usize).ok_or(err),
        [QueryValue::Str(s)] => s.parse::<usize>().map_err(|_| err),
        _ => Err(err),
    }
}
