use crate::ast::Token;

/// Errors produced while tokenizing a query string.
#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    /// A character with no meaning in the query language
    UnexpectedChar(char, usize),

    /// A string literal with no closing quote
    UnterminatedLiteral(usize),
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexError::UnexpectedChar(ch, pos) => {
                write!(f, "Unexpected character '{}' at position {}", ch, pos)
            }
            LexError::UnterminatedLiteral(pos) => {
                write!(f, "Unterminated string literal starting at position {}", pos)
            }
        }
    }
}

impl std::error::Error for LexError {}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphabetic() {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_digits(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Reads a quoted literal. The quote character cannot be escaped.
    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let start = self.position;
        self.advance(); // consume opening quote

        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch == quote {
                self.advance();
                return Ok(result);
            }
            result.push(ch);
            self.advance();
        }

        Err(LexError::UnterminatedLiteral(start))
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();

        match self.current_char() {
            None => Ok(Token::Eof),
            Some('/') => {
                if self.peek_char(1) == Some('/') {
                    self.advance();
                    self.advance();
                    Ok(Token::Descendant)
                } else {
                    self.advance();
                    Ok(Token::Child)
                }
            }
            Some('.') if self.peek_char(1) == Some('.') => {
                self.advance();
                self.advance();
                Ok(Token::Parent)
            }
            Some(':') => {
                self.advance();
                Ok(Token::AttributeSelector)
            }
            Some('$') => {
                if self.peek_char(1) == Some('$') {
                    self.advance();
                    self.advance();
                    Ok(Token::ResolveSelector)
                } else {
                    self.advance();
                    Ok(Token::BindingSelector)
                }
            }
            Some('[') => {
                self.advance();
                Ok(Token::FilterBegin)
            }
            Some(']') => {
                self.advance();
                Ok(Token::FilterEnd)
            }
            Some('&') if self.peek_char(1) == Some('&') => {
                self.advance();
                self.advance();
                Ok(Token::And)
            }
            Some('|') if self.peek_char(1) == Some('|') => {
                self.advance();
                self.advance();
                Ok(Token::Or)
            }
            Some('=') if self.peek_char(1) == Some('=') => {
                self.advance();
                self.advance();
                Ok(Token::Eq)
            }
            Some('*') => {
                self.advance();
                Ok(Token::Wildcard)
            }
            Some('(') => {
                self.advance();
                Ok(Token::ParametersBegin)
            }
            Some(')') => {
                self.advance();
                Ok(Token::ParametersEnd)
            }
            Some(',') => {
                self.advance();
                Ok(Token::Separator)
            }
            Some(quote @ ('"' | '\'')) => Ok(Token::Literal(self.read_string(quote)?)),
            Some(ch) if ch.is_ascii_digit() => Ok(Token::Literal(self.read_digits())),
            Some(ch) if ch.is_ascii_alphabetic() => {
                let ident = self.read_identifier();
                // `fn` immediately followed by `:` introduces a function call
                if ident == "fn" && self.current_char() == Some(':') {
                    self.advance();
                    Ok(Token::Function)
                } else {
                    Ok(Token::Identifier(ident))
                }
            }
            Some(ch) => Err(LexError::UnexpectedChar(ch, self.position)),
        }
    }
}

/// Tokenizes a whole query string up to and including [`Token::Eof`].
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token == Token::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

#[test]
fn test_axes() {
    let mut lexer = Lexer::new("/ // ..");
    assert_eq!(lexer.next_token(), Ok(Token::Child));
    assert_eq!(lexer.next_token(), Ok(Token::Descendant));
    assert_eq!(lexer.next_token(), Ok(Token::Parent));
    assert_eq!(lexer.next_token(), Ok(Token::Eof));
}

#[test]
fn test_function_prefix() {
    let mut lexer = Lexer::new("/fn:join(");
    assert_eq!(lexer.next_token(), Ok(Token::Child));
    assert_eq!(lexer.next_token(), Ok(Token::Function));
    assert_eq!(lexer.next_token(), Ok(Token::Identifier("join".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::ParametersBegin));
}
