//! # Treek Query Language - Abstract Syntax Tree
//!
//! This module defines the token and node types for the treek selector
//! language, a compact path-expression language (akin to XPath over
//! code) for locating syntactic patterns in ECMAScript ASTs.
//!
//! ## Query Structure
//!
//! Every query is a chain of steps. A step starts with an axis (`/` for
//! children, `//` for descendants, `..` for the parent inside filters)
//! followed by a selector:
//!
//! ```text
//! /FunctionDeclaration          direct children matching a node type
//! //Identifier                  any descendant matching a node type
//! /:id                          the `id` field of the current node
//! /*                            any direct child
//! ```
//!
//! ## Filters
//!
//! A selector may carry a boolean filter in brackets. Filters are
//! sub-queries combined with `&&`, `||` and `==`:
//!
//! ```text
//! /FunctionDeclaration[/:id/:name == "a"]
//! //AssignmentExpression[/:left/:name == 'b' || /:left/:name == 'c']
//! ```
//!
//! `==` binds greedily into `&&`/`||` chains: `a == b && c` parses as
//! `(a == b) && c`. Chained equality is rejected.
//!
//! ## Bindings
//!
//! `$` redirects a matched identifier to its declaration; `$$`
//! additionally follows the declaration's initializer:
//!
//! ```text
//! //AssignmentExpression/$:right          the declarator of the rhs
//! //AssignmentExpression/$$:right/:value  the initializer's value
//! ```
//!
//! ## Functions
//!
//! Terminal steps may invoke a result-combining function with `fn:`:
//!
//! ```text
//! //ObjectExpression/fn:join(/:properties/:value/:value, '.')
//! //ObjectExpression/fn:concat(/fn:first(/:properties/:value/:value), 'ms')
//! ```
pub mod nodes;
pub mod tokens;

pub use nodes::{Axis, ConditionKind, FnName, QueryNode, Selector};
pub use tokens::Token;
