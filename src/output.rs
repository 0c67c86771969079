//! JSON output serialization for query results.
//!
//! Matched nodes are already JSON subtrees, so conversion is a thin
//! wrapper: a result list becomes a JSON array with nodes inlined and
//! primitives as JSON primitives.

use serde_json::Value;

use crate::value::QueryResult;

pub fn result_to_json(result: &QueryResult) -> Value {
    match result {
        QueryResult::Node(node) => node.clone(),
        QueryResult::String(s) => Value::String(s.clone()),
        QueryResult::Number(n) => Value::Number(n.clone()),
        QueryResult::Boolean(b) => Value::Bool(*b),
    }
}

pub fn results_to_json(results: &[QueryResult]) -> Value {
    Value::Array(results.iter().map(result_to_json).collect())
}

/// Compact JSON text for a result list.
pub fn to_json(results: &[QueryResult]) -> String {
    results_to_json(results).to_string()
}

/// Pretty-printed JSON text for a result list.
pub fn to_json_pretty(results: &[QueryResult]) -> String {
    serde_json::to_string_pretty(&results_to_json(results)).unwrap_or_else(|_| to_json(results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mixed_results_serialize_to_an_array() {
        let results = vec![
            QueryResult::String("x".to_string()),
            QueryResult::Number(serde_json::Number::from(2)),
            QueryResult::Node(json!({ "type": "Identifier", "name": "a" })),
        ];
        assert_eq!(
            results_to_json(&results),
            json!(["x", 2, { "type": "Identifier", "name": "a" }])
        );
        assert_eq!(to_json(&[]), "[]");
    }
}
