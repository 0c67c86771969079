use serde_json::{Number, Value};

use crate::path::{NodeId, Session};

/// A value flowing through query evaluation.
///
/// Nodes stay as arena ids until results are materialized, so equality
/// inside filters and deduplication compare node identity, while
/// primitives compare by value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum QueryValue {
    Node(NodeId),
    Str(String),
    Num(Number),
    Bool(bool),
}

impl QueryValue {
    /// Converts a raw JSON primitive. Objects, arrays and `null` carry
    /// no value and yield `None`.
    pub fn from_json(value: &Value) -> Option<QueryValue> {
        match value {
            Value::String(s) => Some(QueryValue::Str(s.clone())),
            Value::Number(n) => Some(QueryValue::Num(n.clone())),
            Value::Bool(b) => Some(QueryValue::Bool(*b)),
            _ => None,
        }
    }

    /// String form used by `join` and `concat`. Integers render without
    /// a decimal point. Nodes have no string form.
    pub fn render(&self) -> Option<String> {
        match self {
            QueryValue::Str(s) => Some(s.clone()),
            QueryValue::Num(n) => Some(n.to_string()),
            QueryValue::Bool(b) => Some(b.to_string()),
            QueryValue::Node(_) => None,
        }
    }

    /// Materializes into an owned public result. Nodes clone their
    /// JSON subtree out of the session.
    pub fn materialize(&self, session: &Session<'_>) -> QueryResult {
        match self {
            QueryValue::Node(id) => QueryResult::Node(session.node(*id).value.clone()),
            QueryValue::Str(s) => QueryResult::String(s.clone()),
            QueryValue::Num(n) => QueryResult::Number(n.clone()),
            QueryValue::Bool(b) => QueryResult::Boolean(*b),
        }
    }
}

/// One query result: a matched AST node or a derived primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// A matched AST node, as its JSON subtree
    Node(Value),
    String(String),
    Number(Number),
    Boolean(bool),
}

impl QueryResult {
    pub fn as_node(&self) -> Option<&Value> {
        match self {
            QueryResult::Node(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryResult::String(s) => Some(s),
            _ => None,
        }
    }
}
