//! CLI support for treek.
//!
//! Provides programmatic access to the CLI behavior for embedding in
//! other tools; the `treek` binary is a thin argument-parsing shell
//! around [`execute`].

use std::io;

use serde_json::Value;

use crate::{output, QueryError};

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Query compilation or evaluation error
    Query(QueryError),
    /// The input was not valid JSON
    Json(serde_json::Error),
    /// IO error
    Io(io::Error),
    /// No AST input provided
    NoInput,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Query(e) => write!(f, "{}", e),
            CliError::Json(e) => write!(f, "Invalid JSON input: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => {
                write!(f, "No input provided. Use --input or pipe ESTree JSON to stdin.")
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Query(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::NoInput => None,
        }
    }
}

impl From<QueryError> for CliError {
    fn from(e: QueryError) -> Self {
        CliError::Query(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

/// One CLI invocation.
pub struct RunOptions {
    /// The selector to compile and run
    pub query: String,
    /// ESTree JSON text, if any was provided
    pub input: Option<String>,
    /// Pretty-print the result array
    pub pretty: bool,
    /// Stop after compiling the selector
    pub syntax_only: bool,
}

pub enum RunResult {
    SyntaxValid,
    Success(String),
}

pub fn execute(options: &RunOptions) -> Result<RunResult, CliError> {
    crate::parser::parse(&options.query).map_err(QueryError::Parse)?;
    if options.syntax_only {
        return Ok(RunResult::SyntaxValid);
    }

    let Some(input) = &options.input else {
        return Err(CliError::NoInput);
    };
    let ast: Value = serde_json::from_str(input)?;
    let results = crate::query(&ast, &options.query)?;

    let text = if options.pretty {
        output::to_json_pretty(&results)
    } else {
        output::to_json(&results)
    };
    Ok(RunResult::Success(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(query: &str, input: Option<Value>, syntax_only: bool) -> RunOptions {
        RunOptions {
            query: query.to_string(),
            input: input.map(|v| v.to_string()),
            pretty: false,
            syntax_only,
        }
    }

    #[test]
    fn syntax_only_stops_before_needing_input() {
        let result = execute(&options("/FunctionDeclaration", None, true));
        assert!(matches!(result, Ok(RunResult::SyntaxValid)));
    }

    #[test]
    fn missing_input_is_reported() {
        let result = execute(&options("/FunctionDeclaration", None, false));
        assert!(matches!(result, Err(CliError::NoInput)));
    }

    #[test]
    fn queries_run_against_json_input() {
        let ast = json!({
            "type": "Program",
            "body": [{
                "type": "FunctionDeclaration",
                "id": { "type": "Identifier", "name": "a" },
                "params": [],
                "body": { "type": "BlockStatement", "body": [] },
            }],
        });
        let result = execute(&options("/FunctionDeclaration/:id/:name", Some(ast), false));
        let Ok(RunResult::Success(text)) = result else {
            panic!("query should succeed");
        };
        assert_eq!(text, r#"["a"]"#);
    }

    #[test]
    fn bad_selectors_fail_before_input_parsing() {
        let result = execute(&options("/NotANodeType", None, true));
        assert!(matches!(
            result,
            Err(CliError::Query(QueryError::Parse(_)))
        ));
    }
}
