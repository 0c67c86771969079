//! # Treek - path-expression queries over ECMAScript ASTs
//!
//! Treek compiles compact, XPath-like selector strings into query
//! trees and evaluates them against an ESTree-shaped JSON AST in a
//! single traversal, resolving lexical bindings on the fly.
//!
//! ```text
//! /FunctionDeclaration/:params/:name        parameter names
//! //AssignmentExpression[/:left/:name == 'b']/:right
//! //AssignmentExpression/$$:right/:value    value behind the binding
//! //ObjectExpression/fn:join(/:properties/:value/:value, '.')
//! ```
//!
//! Treek does not parse JavaScript itself. Hand it a ready AST, or
//! give a [`QueryEngine`] a parser callback and query source text:
//!
//! ```
//! use serde_json::json;
//!
//! let ast = json!({
//!     "type": "Program",
//!     "body": [{
//!         "type": "FunctionDeclaration",
//!         "id": { "type": "Identifier", "name": "a" },
//!         "params": [],
//!         "body": { "type": "BlockStatement", "body": [] },
//!     }],
//! });
//!
//! let results = treek::query(&ast, "/FunctionDeclaration/:id/:name").unwrap();
//! assert_eq!(results[0].as_str(), Some("a"));
//! ```

pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
mod evaluator;
pub mod lexer;
pub mod output;
pub mod parser;
mod path;
mod scope;
pub mod shape;
mod traverse;
mod value;

use std::borrow::Cow;
use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

pub use ast::{Axis, ConditionKind, FnName, QueryNode, Selector, Token};
pub use evaluator::EvalError;
pub use lexer::LexError;
pub use parser::ParseError;
pub use value::QueryResult;

use evaluator::Memo;
use path::Session;

/// Errors surfaced by the public query entry points.
#[derive(Debug)]
pub enum QueryError {
    /// The selector string failed to compile
    Parse(ParseError),
    /// Query evaluation failed
    Eval(EvalError),
    /// The input value is not an AST node (no `type` string)
    InvalidAst,
    /// The configured source parser rejected the source text
    Source(String),
    /// Source text given to an engine without a parser callback
    NoParser,
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::Parse(e) => write!(f, "Parse error: {}", e),
            QueryError::Eval(e) => write!(f, "Evaluation error: {}", e),
            QueryError::InvalidAst => write!(f, "Input is not an AST node"),
            QueryError::Source(msg) => write!(f, "Could not parse source: {}", msg),
            QueryError::NoParser => write!(f, "No source parser configured"),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueryError::Parse(e) => Some(e),
            QueryError::Eval(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for QueryError {
    fn from(e: ParseError) -> Self {
        QueryError::Parse(e)
    }
}

impl From<EvalError> for QueryError {
    fn from(e: EvalError) -> Self {
        QueryError::Eval(e)
    }
}

/// Runs one selector against an AST and returns its matches in
/// document order.
pub fn query(ast: &Value, selector: &str) -> Result<Vec<QueryResult>, QueryError> {
    let compiled = parser::parse(selector)?;
    let mut results = run_compiled(ast, &[&compiled])?;
    Ok(results.pop().unwrap_or_default())
}

/// Runs several named selectors over a single traversal of the AST.
pub fn multi_query(
    ast: &Value,
    queries: &[(&str, &str)],
) -> Result<HashMap<String, Vec<QueryResult>>, QueryError> {
    let compiled = queries
        .iter()
        .map(|(name, selector)| Ok((*name, parser::parse(selector)?)))
        .collect::<Result<Vec<_>, ParseError>>()?;
    let refs: Vec<&QueryNode> = compiled.iter().map(|(_, q)| q).collect();
    let results = run_compiled(ast, &refs)?;
    Ok(compiled
        .iter()
        .map(|(name, _)| name.to_string())
        .zip(results)
        .collect())
}

fn run_compiled(ast: &Value, queries: &[&QueryNode]) -> Result<Vec<Vec<QueryResult>>, QueryError> {
    let session = Session::build(ast).ok_or(QueryError::InvalidAst)?;
    debug!(queries = queries.len(), "running queries");
    let mut memo = Memo::default();
    let raw = traverse::run_traversal(&session, &mut memo, queries, session.root())?;
    Ok(raw
        .into_iter()
        .map(|values| values.iter().map(|v| v.materialize(&session)).collect())
        .collect())
}

/// The input side of a [`QueryEngine`] call: a ready AST or source
/// text for the configured parser callback.
pub enum QueryInput<'a> {
    Ast(&'a Value),
    Source(&'a str),
}

type SourceParser = dyn Fn(&str) -> Result<Value, String>;

/// Query front end that can also accept source text.
///
/// Treek never bundles a JavaScript parser; an engine is constructed
/// with a callback that turns source text into an ESTree JSON value,
/// and queries then accept either form of input.
#[derive(Default)]
pub struct QueryEngine {
    parser: Option<Box<SourceParser>>,
}

impl QueryEngine {
    /// An engine that only accepts ready ASTs.
    pub fn new() -> Self {
        QueryEngine::default()
    }

    /// An engine that parses source text through `parser`.
    pub fn with_parser(parser: impl Fn(&str) -> Result<Value, String> + 'static) -> Self {
        QueryEngine {
            parser: Some(Box::new(parser)),
        }
    }

    pub fn query(
        &self,
        input: QueryInput<'_>,
        selector: &str,
    ) -> Result<Vec<QueryResult>, QueryError> {
        let ast = self.resolve(input)?;
        query(&ast, selector)
    }

    pub fn multi_query(
        &self,
        input: QueryInput<'_>,
        queries: &[(&str, &str)],
    ) -> Result<HashMap<String, Vec<QueryResult>>, QueryError> {
        let ast = self.resolve(input)?;
        multi_query(&ast, queries)
    }

    /// Like [`query`](QueryEngine::query), but also returns the AST the
    /// query ran against. Useful when the engine parsed the source and
    /// the caller wants to relate results back to the tree.
    pub fn query_with_ast(
        &self,
        input: QueryInput<'_>,
        selector: &str,
    ) -> Result<(Value, Vec<QueryResult>), QueryError> {
        let ast = self.resolve(input)?;
        let results = query(&ast, selector)?;
        Ok((ast.into_owned(), results))
    }

    fn resolve<'a>(&self, input: QueryInput<'a>) -> Result<Cow<'a, Value>, QueryError> {
        match input {
            QueryInput::Ast(ast) => Ok(Cow::Borrowed(ast)),
            QueryInput::Source(source) => {
                let parser = self.parser.as_ref().ok_or(QueryError::NoParser)?;
                let ast = parser(source).map_err(QueryError::Source)?;
                Ok(Cow::Owned(ast))
            }
        }
    }
}
