use crate::{
    ast::{Axis, ConditionKind, FnName, QueryNode, Selector, Token},
    lexer::{self, LexError},
    shape,
};

/// Errors produced while parsing a token stream into a query tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Tokenization failed
    Lex(LexError),

    /// A token that cannot start or continue the current construct
    UnexpectedToken(Token),

    /// Ran out of tokens mid-construct
    UnexpectedEnd,

    /// A selector identifier that names no known AST node type
    UnsupportedIdentifier(String),

    /// An `fn:` call with a name that is not a built-in function
    UnknownFunction(String),

    /// Chained equality (`a == b == c`) is not supported
    EqualsInEquals,

    /// A `..` step with nothing after it
    ParentWithoutStep,

    /// `$` and `$$` on the same step
    ConflictingModifiers,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Lex(e) => write!(f, "{}", e),
            ParseError::UnexpectedToken(t) => write!(f, "Unexpected token: {:?}", t),
            ParseError::UnexpectedEnd => write!(f, "Unexpected end of input"),
            ParseError::UnsupportedIdentifier(name) => {
                write!(f, "Unsupported identifier: {}", name)
            }
            ParseError::UnknownFunction(name) => write!(f, "Unknown function: fn:{}", name),
            ParseError::EqualsInEquals => write!(f, "Unexpected equals in equals"),
            ParseError::ParentWithoutStep => write!(f, "Parent step must be followed by a step"),
            ParseError::ConflictingModifiers => {
                write!(f, "Binding ($) and resolve ($$) are mutually exclusive")
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError::Lex(e)
    }
}

/// Recursive-descent parser over an immutable token list.
///
/// The parser advances an integer cursor rather than consuming the
/// token list, so a parse never mutates shared state and can be
/// restarted cheaply.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            position: 0,
        }
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(token)
    }

    fn expect(&mut self, expected: Token) -> Result<Token, ParseError> {
        if !self.check(&expected) {
            return Err(ParseError::UnexpectedToken(self.current().clone()));
        }
        Ok(self.advance())
    }

    /// Parses one complete query and requires the input to end there.
    pub fn parse(&mut self) -> Result<QueryNode, ParseError> {
        let node = self.parse_tree()?;
        self.expect(Token::Eof)?;
        Ok(node)
    }

    /// Parses a path, a literal, or a function call step.
    fn parse_tree(&mut self) -> Result<QueryNode, ParseError> {
        match self.advance() {
            Token::Parent => self.parse_parent(),
            axis @ (Token::Child | Token::Descendant) => {
                // `/..` behaves like a bare parent step
                if self.check(&Token::Parent) {
                    self.advance();
                    return self.parse_parent();
                }
                if self.check(&Token::Function) {
                    self.advance();
                    return self.parse_function_call();
                }
                let axis = if axis == Token::Child {
                    Axis::Child
                } else {
                    Axis::Descendant
                };
                self.parse_selector(axis)
            }
            Token::Literal(value) => Ok(QueryNode::Literal(value)),
            Token::Eof => Err(ParseError::UnexpectedEnd),
            token => Err(ParseError::UnexpectedToken(token)),
        }
    }

    fn parse_parent(&mut self) -> Result<QueryNode, ParseError> {
        if !(self.check(&Token::Child)
            || self.check(&Token::Descendant)
            || self.check(&Token::Parent))
        {
            return Err(ParseError::ParentWithoutStep);
        }
        let child = self.parse_tree()?;
        Ok(QueryNode::Selector(Selector {
            axis: Axis::Parent,
            value: String::new(),
            attribute: false,
            binding: false,
            resolve: false,
            filter: None,
            child: Some(Box::new(child)),
        }))
    }

    fn parse_selector(&mut self, axis: Axis) -> Result<QueryNode, ParseError> {
        let mut attribute = false;
        let mut binding = false;
        let mut resolve = false;

        loop {
            match self.current() {
                Token::AttributeSelector => {
                    attribute = true;
                    self.advance();
                }
                Token::BindingSelector => {
                    binding = true;
                    self.advance();
                }
                Token::ResolveSelector => {
                    resolve = true;
                    self.advance();
                }
                _ => break,
            }
        }
        if binding && resolve {
            return Err(ParseError::ConflictingModifiers);
        }

        let value = match self.advance() {
            Token::Identifier(name) => {
                if !attribute && !shape::is_node_type(&name) {
                    return Err(ParseError::UnsupportedIdentifier(name));
                }
                name
            }
            Token::Wildcard => "*".to_string(),
            // numeric array index, only meaningful as an attribute
            Token::Literal(digits) if attribute && digits.chars().all(|c| c.is_ascii_digit()) => {
                digits
            }
            Token::Eof => return Err(ParseError::UnexpectedEnd),
            token => return Err(ParseError::UnexpectedToken(token)),
        };

        let filter = if self.check(&Token::FilterBegin) {
            Some(Box::new(self.parse_filter()?))
        } else {
            None
        };

        let child = if self.check(&Token::Child) || self.check(&Token::Descendant) {
            Some(Box::new(self.parse_tree()?))
        } else {
            None
        };

        Ok(QueryNode::Selector(Selector {
            axis,
            value,
            attribute,
            binding,
            resolve,
            filter,
            child,
        }))
    }

    fn parse_filter(&mut self) -> Result<QueryNode, ParseError> {
        self.expect(Token::FilterBegin)?;
        let expr = self.parse_filter_expr()?;
        self.expect(Token::FilterEnd)?;
        Ok(expr)
    }

    /// Parses a filter expression right-associatively. `==` binds its
    /// right-hand side greedily and is folded back into `&&`/`||`
    /// chains: `a == b && c` parses as `(a == b) && c`.
    fn parse_filter_expr(&mut self) -> Result<QueryNode, ParseError> {
        let left = self.parse_tree()?;

        match self.current() {
            Token::And => {
                self.advance();
                let right = self.parse_filter_expr()?;
                Ok(condition(ConditionKind::And, left, right))
            }
            Token::Or => {
                self.advance();
                let right = self.parse_filter_expr()?;
                Ok(condition(ConditionKind::Or, left, right))
            }
            Token::Eq => {
                self.advance();
                let right = self.parse_filter_expr()?;
                match right {
                    QueryNode::Condition {
                        kind: ConditionKind::Equals,
                        ..
                    } => Err(ParseError::EqualsInEquals),
                    QueryNode::Condition { kind, left: l, right: r } => Ok(condition(
                        kind,
                        condition(ConditionKind::Equals, left, *l),
                        *r,
                    )),
                    other => Ok(condition(ConditionKind::Equals, left, other)),
                }
            }
            _ => Ok(left),
        }
    }

    fn parse_function_call(&mut self) -> Result<QueryNode, ParseError> {
        let name = match self.advance() {
            Token::Identifier(name) => FnName::from_str(&name)
                .ok_or(ParseError::UnknownFunction(name))?,
            Token::Eof => return Err(ParseError::UnexpectedEnd),
            token => return Err(ParseError::UnexpectedToken(token)),
        };

        self.expect(Token::ParametersBegin)?;
        let mut params = vec![self.parse_tree()?];
        while self.check(&Token::Separator) {
            self.advance();
            params.push(self.parse_tree()?);
        }
        self.expect(Token::ParametersEnd)?;

        Ok(QueryNode::FunctionCall { name, params })
    }
}

fn condition(kind: ConditionKind, left: QueryNode, right: QueryNode) -> QueryNode {
    QueryNode::Condition {
        kind,
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// Compiles a query string into its [`QueryNode`] tree.
pub fn parse(input: &str) -> Result<QueryNode, ParseError> {
    let tokens = lexer::tokenize(input)?;
    Parser::new(tokens).parse()
}
