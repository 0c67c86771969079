//! Tokenizer behavior for the selector language.

use treek::lexer::{tokenize, LexError};
use treek::Token;

#[test]
fn test_axes_and_selectors() {
    let tokens = tokenize("//AssignmentExpression/:left/$:right/$$:init").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Descendant,
            Token::Identifier("AssignmentExpression".to_string()),
            Token::Child,
            Token::AttributeSelector,
            Token::Identifier("left".to_string()),
            Token::Child,
            Token::BindingSelector,
            Token::AttributeSelector,
            Token::Identifier("right".to_string()),
            Token::Child,
            Token::ResolveSelector,
            Token::AttributeSelector,
            Token::Identifier("init".to_string()),
            Token::Eof,
        ]
    );
}

#[test]
fn test_filter_tokens() {
    let tokens = tokenize("[/:a == 'x' && /:b || /:c]").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::FilterBegin,
            Token::Child,
            Token::AttributeSelector,
            Token::Identifier("a".to_string()),
            Token::Eq,
            Token::Literal("x".to_string()),
            Token::And,
            Token::Child,
            Token::AttributeSelector,
            Token::Identifier("b".to_string()),
            Token::Or,
            Token::Child,
            Token::AttributeSelector,
            Token::Identifier("c".to_string()),
            Token::FilterEnd,
            Token::Eof,
        ]
    );
}

#[test]
fn test_parent_axis() {
    let tokens = tokenize("../../:params").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Parent,
            Token::Child,
            Token::Parent,
            Token::Child,
            Token::AttributeSelector,
            Token::Identifier("params".to_string()),
            Token::Eof,
        ]
    );
}

#[test]
fn test_function_prefix_and_parameters() {
    let tokens = tokenize("/fn:join(/:a, '.')").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Child,
            Token::Function,
            Token::Identifier("join".to_string()),
            Token::ParametersBegin,
            Token::Child,
            Token::AttributeSelector,
            Token::Identifier("a".to_string()),
            Token::Separator,
            Token::Literal(".".to_string()),
            Token::ParametersEnd,
            Token::Eof,
        ]
    );
}

#[test]
fn test_fn_without_colon_is_an_identifier() {
    let tokens = tokenize("fn").unwrap();
    assert_eq!(tokens, vec![Token::Identifier("fn".to_string()), Token::Eof]);
}

#[test]
fn test_digit_runs_are_literals() {
    let tokens = tokenize(":1").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::AttributeSelector,
            Token::Literal("1".to_string()),
            Token::Eof,
        ]
    );
}

#[test]
fn test_both_quote_styles() {
    assert_eq!(
        tokenize("'abc'").unwrap(),
        vec![Token::Literal("abc".to_string()), Token::Eof]
    );
    assert_eq!(
        tokenize("\"abc\"").unwrap(),
        vec![Token::Literal("abc".to_string()), Token::Eof]
    );
}

#[test]
fn test_whitespace_between_tokens() {
    let tokens = tokenize("  /  * \n ").unwrap();
    assert_eq!(tokens, vec![Token::Child, Token::Wildcard, Token::Eof]);
}

#[test]
fn test_unexpected_character() {
    assert_eq!(tokenize("/#"), Err(LexError::UnexpectedChar('#', 1)));
}

#[test]
fn test_unterminated_literal() {
    assert_eq!(tokenize("'abc"), Err(LexError::UnterminatedLiteral(0)));
}

#[test]
fn test_single_ampersand_is_rejected() {
    assert!(matches!(tokenize("/a & b"), Err(LexError::UnexpectedChar('&', _))));
}
