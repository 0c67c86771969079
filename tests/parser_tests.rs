//! Query compilation: tree shapes and rejection cases.

use treek::{Axis, ConditionKind, FnName, ParseError, QueryNode, Selector};

fn parse(input: &str) -> QueryNode {
    treek::parser::parse(input).unwrap()
}

fn parse_err(input: &str) -> ParseError {
    treek::parser::parse(input).unwrap_err()
}

fn selector(node: &QueryNode) -> &Selector {
    node.as_selector().expect("expected a selector")
}

#[test]
fn test_simple_child_selector() {
    let node = parse("/FunctionDeclaration");
    let sel = selector(&node);
    assert_eq!(sel.axis, Axis::Child);
    assert_eq!(sel.value, "FunctionDeclaration");
    assert!(!sel.attribute && !sel.binding && !sel.resolve);
    assert!(sel.filter.is_none() && sel.child.is_none());
}

#[test]
fn test_descendant_chain() {
    let node = parse("//AssignmentExpression/:right");
    let sel = selector(&node);
    assert_eq!(sel.axis, Axis::Descendant);
    let child = selector(sel.child.as_deref().unwrap());
    assert_eq!(child.axis, Axis::Child);
    assert!(child.attribute);
    assert_eq!(child.value, "right");
}

#[test]
fn test_binding_and_resolve_modifiers() {
    let node = parse("/$:right");
    assert!(selector(&node).binding);
    assert!(!selector(&node).resolve);

    let node = parse("/$$:right");
    assert!(selector(&node).resolve);
    assert!(!selector(&node).binding);
}

#[test]
fn test_conflicting_modifiers_are_rejected() {
    assert_eq!(parse_err("/$$$:right"), ParseError::ConflictingModifiers);
}

#[test]
fn test_wildcard() {
    let node = parse("/*");
    assert_eq!(selector(&node).value, "*");
}

#[test]
fn test_numeric_attribute_index() {
    let node = parse("/:1");
    let sel = selector(&node);
    assert!(sel.attribute);
    assert_eq!(sel.value, "1");
}

#[test]
fn test_numeric_value_requires_attribute() {
    assert!(matches!(parse_err("/1"), ParseError::UnexpectedToken(_)));
}

#[test]
fn test_unknown_node_type_is_rejected() {
    assert_eq!(
        parse_err("/Banana"),
        ParseError::UnsupportedIdentifier("Banana".to_string())
    );
}

#[test]
fn test_attribute_names_are_not_validated() {
    // attribute values are field names, not node types
    let node = parse("/:banana");
    assert_eq!(selector(&node).value, "banana");
}

#[test]
fn test_filter_shape() {
    let node = parse("/FunctionDeclaration[/:id/:name == 'a']");
    let sel = selector(&node);
    let QueryNode::Condition { kind, left, right } = sel.filter.as_deref().unwrap() else {
        panic!("expected a condition filter");
    };
    assert_eq!(*kind, ConditionKind::Equals);
    assert!(selector(left).attribute);
    assert_eq!(**right, QueryNode::Literal("a".to_string()));
}

#[test]
fn test_equals_binds_before_and() {
    // a == b && c reads as (a == b) && c
    let node = parse("/FunctionDeclaration[/:id == 'a' && /:name]");
    let sel = selector(&node);
    let QueryNode::Condition { kind, left, .. } = sel.filter.as_deref().unwrap() else {
        panic!("expected a condition filter");
    };
    assert_eq!(*kind, ConditionKind::And);
    assert!(matches!(
        left.as_ref(),
        QueryNode::Condition {
            kind: ConditionKind::Equals,
            ..
        }
    ));
}

#[test]
fn test_equals_binds_before_or() {
    let node = parse("/FunctionDeclaration[/:id == 'a' || /:name]");
    let sel = selector(&node);
    let QueryNode::Condition { kind, left, .. } = sel.filter.as_deref().unwrap() else {
        panic!("expected a condition filter");
    };
    assert_eq!(*kind, ConditionKind::Or);
    assert!(matches!(
        left.as_ref(),
        QueryNode::Condition {
            kind: ConditionKind::Equals,
            ..
        }
    ));
}

#[test]
fn test_chained_equality_is_rejected() {
    assert_eq!(
        parse_err("/FunctionDeclaration[/:id == 'a' == 'b']"),
        ParseError::EqualsInEquals
    );
}

#[test]
fn test_parent_steps_inside_filters() {
    let node = parse("../../:params");
    let sel = selector(&node);
    assert_eq!(sel.axis, Axis::Parent);
    let inner = selector(sel.child.as_deref().unwrap());
    assert_eq!(inner.axis, Axis::Parent);
    let leaf = selector(inner.child.as_deref().unwrap());
    assert!(leaf.attribute);
    assert_eq!(leaf.value, "params");
}

#[test]
fn test_parent_without_step_is_rejected() {
    assert_eq!(parse_err(".."), ParseError::ParentWithoutStep);
}

#[test]
fn test_function_call() {
    let node = parse("/fn:join(/:a, '.')");
    let QueryNode::FunctionCall { name, params } = node else {
        panic!("expected a function call");
    };
    assert_eq!(name, FnName::Join);
    assert_eq!(params.len(), 2);
    assert_eq!(params[1], QueryNode::Literal(".".to_string()));
}

#[test]
fn test_function_call_as_chain_child() {
    let node = parse("//ObjectExpression/fn:first(/:properties)");
    let sel = selector(&node);
    assert!(matches!(
        sel.child.as_deref(),
        Some(QueryNode::FunctionCall {
            name: FnName::First,
            ..
        })
    ));
}

#[test]
fn test_unknown_function_is_rejected() {
    assert_eq!(
        parse_err("/fn:frobnicate(/:a)"),
        ParseError::UnknownFunction("frobnicate".to_string())
    );
}

#[test]
fn test_wrong_arity_is_not_a_parse_error() {
    // arity problems surface at evaluation time
    assert!(treek::parser::parse("/fn:join(/:a)").is_ok());
}

#[test]
fn test_unexpected_end() {
    assert_eq!(parse_err("/"), ParseError::UnexpectedEnd);
}

#[test]
fn test_trailing_tokens_are_rejected() {
    assert!(matches!(
        parse_err("/FunctionDeclaration]"),
        ParseError::UnexpectedToken(_)
    ));
}

#[test]
fn test_lex_errors_are_wrapped() {
    assert!(matches!(parse_err("/Fun#"), ParseError::Lex(_)));
}
