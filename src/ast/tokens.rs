#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Axes
    /// Child step
    ///
    /// # Examples
    /// ```text
    /// /FunctionDeclaration
    /// ```
    Child,

    /// Descendant step
    ///
    /// # Examples
    /// ```text
    /// //Identifier
    /// ```
    Descendant,

    /// Parent step, only meaningful inside filters
    ///
    /// # Examples
    /// ```text
    /// ../../:params
    /// ```
    Parent,

    // Modifiers
    /// Attribute selector marker
    ///
    /// Selects a field of the current node rather than descending into a
    /// node type.
    ///
    /// # Examples
    /// ```text
    /// /:id
    /// /:params
    /// ```
    AttributeSelector,

    /// Binding selector marker
    ///
    /// Redirects the match to the declaration of an identifier.
    ///
    /// # Examples
    /// ```text
    /// /$:right
    /// ```
    BindingSelector,

    /// Resolve selector marker
    ///
    /// Like `$`, but additionally follows the declaration's initializer.
    ///
    /// # Examples
    /// ```text
    /// /$$:right/:value
    /// ```
    ResolveSelector,

    // Filters
    /// Start of a filter expression (`[`)
    FilterBegin,

    /// End of a filter expression (`]`)
    FilterEnd,

    // Conditions
    /// Logical AND inside a filter (`&&`)
    And,

    /// Logical OR inside a filter (`||`)
    Or,

    /// Equality comparison inside a filter (`==`)
    Eq,

    // Values
    /// String literal (single or double quoted, no escapes) or a run of
    /// decimal digits
    ///
    /// # Examples
    /// ```text
    /// "a"
    /// '12 3'
    /// 25
    /// ```
    Literal(String),

    /// Run of ASCII letters: a node-type name or a field name
    ///
    /// # Examples
    /// ```text
    /// FunctionDeclaration
    /// name
    /// ```
    Identifier(String),

    /// Wildcard selector matching any node type (`*`)
    Wildcard,

    // Function calls
    /// Function keyword prefix (`fn:`)
    ///
    /// # Examples
    /// ```text
    /// /fn:join(/:properties/:value/:value, '.')
    /// ```
    Function,

    /// Start of a parameter list (`(`)
    ParametersBegin,

    /// End of a parameter list (`)`)
    ParametersEnd,

    /// Parameter separator (`,`)
    Separator,

    /// End of input
    Eof,
}
