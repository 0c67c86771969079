//! Hand-built ESTree fixtures shared by the test suites.
//!
//! The builders mirror what a JavaScript parser would emit for the
//! snippets named in the individual tests, trimmed to the fields the
//! engine reads.

#![allow(dead_code)]

use serde_json::{json, Value};

pub fn program(body: Vec<Value>) -> Value {
    json!({ "type": "Program", "body": body })
}

pub fn ident(name: &str) -> Value {
    json!({ "type": "Identifier", "name": name })
}

pub fn num(value: i64) -> Value {
    json!({ "type": "Literal", "value": value })
}

pub fn block(body: Vec<Value>) -> Value {
    json!({ "type": "BlockStatement", "body": body })
}

pub fn expr_stmt(expression: Value) -> Value {
    json!({ "type": "ExpressionStatement", "expression": expression })
}

pub fn ret(argument: Value) -> Value {
    json!({ "type": "ReturnStatement", "argument": argument })
}

pub fn assign(left: Value, right: Value) -> Value {
    json!({
        "type": "AssignmentExpression",
        "operator": "=",
        "left": left,
        "right": right,
    })
}

pub fn member(object: Value, property: Value) -> Value {
    json!({
        "type": "MemberExpression",
        "computed": false,
        "object": object,
        "property": property,
    })
}

pub fn binary(operator: &str, left: Value, right: Value) -> Value {
    json!({
        "type": "BinaryExpression",
        "operator": operator,
        "left": left,
        "right": right,
    })
}

pub fn declarator(name: &str, init: Value) -> Value {
    json!({
        "type": "VariableDeclarator",
        "id": ident(name),
        "init": init,
    })
}

pub fn var_decl(kind: &str, declarations: Vec<Value>) -> Value {
    json!({
        "type": "VariableDeclaration",
        "kind": kind,
        "declarations": declarations,
    })
}

pub fn func_decl(name: &str, params: Vec<Value>, body: Vec<Value>) -> Value {
    json!({
        "type": "FunctionDeclaration",
        "id": ident(name),
        "params": params,
        "body": block(body),
    })
}

pub fn property(key: &str, value: Value) -> Value {
    json!({
        "type": "Property",
        "kind": "init",
        "computed": false,
        "shorthand": false,
        "key": ident(key),
        "value": value,
    })
}

pub fn object(properties: Vec<Value>) -> Value {
    json!({ "type": "ObjectExpression", "properties": properties })
}

/// ```text
/// function a(x) {
///   let b = 2;
///   let c = 3;
///   b = c;
///   x.y = 25;
///   return b + c;
/// }
/// ```
pub fn function_fixture() -> Value {
    program(vec![func_decl(
        "a",
        vec![ident("x")],
        vec![
            var_decl("let", vec![declarator("b", num(2))]),
            var_decl("let", vec![declarator("c", num(3))]),
            expr_stmt(assign(ident("b"), ident("c"))),
            expr_stmt(assign(member(ident("x"), ident("y")), num(25))),
            ret(binary("+", ident("b"), ident("c"))),
        ],
    )])
}

/// `var a = { b: 1, c: 2 }`
pub fn object_fixture() -> Value {
    program(vec![var_decl(
        "var",
        vec![declarator(
            "a",
            object(vec![property("b", num(1)), property("c", num(2))]),
        )],
    )])
}
