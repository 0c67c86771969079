/// Direction of a selector step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Direct children of the current node (`/`)
    Child,
    /// Any descendant of the current node (`//`)
    Descendant,
    /// The parent of the current node (`..`), valid inside filters
    Parent,
}

/// Boolean connective of a filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    /// Both sides must yield a non-empty result (`&&`)
    And,
    /// Either side must yield a non-empty result (`||`)
    Or,
    /// The intersection of both result sets must be non-empty (`==`)
    Equals,
}

/// Built-in result-combining functions callable with `fn:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FnName {
    /// `join(values, separator)` - concatenate values with a separator
    Join,
    /// `concat(p1, ...)` - concatenate all parameter results
    Concat,
    /// `first(values)` - the first value, or nothing
    First,
    /// `nthchild(values, index)` - the value at the given index
    NthChild,
}

impl FnName {
    /// Resolves a function name from query text. Unknown names are a
    /// parse error, handled by the caller.
    pub fn from_str(name: &str) -> Option<FnName> {
        match name {
            "join" => Some(FnName::Join),
            "concat" => Some(FnName::Concat),
            "first" => Some(FnName::First),
            "nthchild" => Some(FnName::NthChild),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FnName::Join => "join",
            FnName::Concat => "concat",
            FnName::First => "first",
            FnName::NthChild => "nthchild",
        }
    }
}

/// A single step of a selector chain.
///
/// Steps form a singly linked list through `child`. A `Parent` step
/// always carries a `child`; `binding` and `resolve` are mutually
/// exclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    /// Step direction
    pub axis: Axis,
    /// Node-type name, field name, numeric array index (as string), or `*`
    pub value: String,
    /// Selects a field of the node instead of descending into a node type
    pub attribute: bool,
    /// Redirect the match to the declaration of the matched identifier (`$`)
    pub binding: bool,
    /// Redirect and follow the declaration's initializer (`$$`)
    pub resolve: bool,
    /// Boolean sub-query restricting which matches are kept
    pub filter: Option<Box<QueryNode>>,
    /// Next step in the chain, or a function call
    pub child: Option<Box<QueryNode>>,
}

impl Selector {
    /// A plain node-type or wildcard step with no modifiers.
    pub fn node(axis: Axis, value: impl Into<String>) -> Selector {
        Selector {
            axis,
            value: value.into(),
            attribute: false,
            binding: false,
            resolve: false,
            filter: None,
            child: None,
        }
    }
}

/// A parsed query.
///
/// The compiled form of one path expression: a chain of [`Selector`]
/// steps, with [`Condition`](QueryNode::Condition) trees hanging off
/// filter positions and [`FunctionCall`](QueryNode::FunctionCall) nodes
/// in terminal positions.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    /// A selector step
    Selector(Selector),

    /// A boolean filter condition
    Condition {
        kind: ConditionKind,
        left: Box<QueryNode>,
        right: Box<QueryNode>,
    },

    /// A string (or digit-run) literal inside a filter or parameter list
    Literal(String),

    /// A call to a built-in result function
    FunctionCall {
        name: FnName,
        params: Vec<QueryNode>,
    },
}

impl QueryNode {
    pub fn as_selector(&self) -> Option<&Selector> {
        match self {
            QueryNode::Selector(s) => Some(s),
            _ => None,
        }
    }
}
