//! Static shape table for ESTree nodes.
//!
//! Maps every supported node type to the ordered list of its
//! child-bearing field names. Scope resolution and traversal both read
//! this table, so they always agree on structure. Field order here is
//! visit order.

/// Returns the child-bearing fields of a node type, or `None` for an
/// unknown type.
pub fn visitor_keys(node_type: &str) -> Option<&'static [&'static str]> {
    let keys: &'static [&'static str] = match node_type {
        "ArrayExpression" => &["elements"],
        "ArrayPattern" => &["elements"],
        "ArrowFunctionExpression" => &["params", "body"],
        "AssignmentExpression" => &["left", "right"],
        "AssignmentPattern" => &["left", "right"],
        "AwaitExpression" => &["argument"],
        "BinaryExpression" => &["left", "right"],
        "BlockStatement" => &["body"],
        "BreakStatement" => &[],
        "CallExpression" => &["callee", "arguments"],
        "CatchClause" => &["param", "body"],
        "ChainExpression" => &["expression"],
        "ClassBody" => &["body"],
        "ClassDeclaration" => &["id", "superClass", "body"],
        "ClassExpression" => &["id", "superClass", "body"],
        "ConditionalExpression" => &["test", "consequent", "alternate"],
        "ContinueStatement" => &[],
        "DebuggerStatement" => &[],
        "Decorator" => &["expression"],
        "DoWhileStatement" => &["body", "test"],
        "EmptyStatement" => &[],
        "ExportAllDeclaration" => &["source"],
        "ExportDefaultDeclaration" => &["declaration"],
        "ExportNamedDeclaration" => &["declaration", "specifiers", "source"],
        "ExportSpecifier" => &["local", "exported"],
        "ExpressionStatement" => &["expression"],
        "ForInStatement" => &["left", "right", "body"],
        "ForOfStatement" => &["left", "right", "body"],
        "ForStatement" => &["init", "test", "update", "body"],
        "FunctionDeclaration" => &["id", "params", "body"],
        "FunctionExpression" => &["id", "params", "body"],
        "Identifier" => &[],
        "IfStatement" => &["test", "consequent", "alternate"],
        "Import" => &["source"],
        "ImportDeclaration" => &["specifiers", "source"],
        "ImportDefaultSpecifier" => &["local"],
        "ImportExpression" => &["source"],
        "ImportNamespaceSpecifier" => &["local"],
        "ImportSpecifier" => &["local", "imported"],
        "LabeledStatement" => &["label", "body"],
        "Literal" => &[],
        "LogicalExpression" => &["left", "right"],
        "MemberExpression" => &["object", "property"],
        "MetaProperty" => &["meta", "property"],
        "MethodDefinition" => &["key", "value"],
        "NewExpression" => &["callee", "arguments"],
        "ObjectExpression" => &["properties"],
        "ObjectPattern" => &["properties"],
        "ParenthesizedExpression" => &["expression"],
        "PrivateIdentifier" => &[],
        "Program" => &["body"],
        "Property" => &["key", "value"],
        "PropertyDefinition" => &["key", "value"],
        "RestElement" => &["argument"],
        "ReturnStatement" => &["argument"],
        "SequenceExpression" => &["expressions"],
        "SpreadElement" => &["argument"],
        "StaticBlock" => &["body"],
        "Super" => &[],
        "SwitchCase" => &["test", "consequent"],
        "SwitchStatement" => &["discriminant", "cases"],
        "TaggedTemplateExpression" => &["tag", "quasi"],
        "TemplateElement" => &[],
        "TemplateLiteral" => &["quasis", "expressions"],
        "ThisExpression" => &[],
        "ThrowStatement" => &["argument"],
        "TryStatement" => &["block", "handler", "finalizer"],
        "UnaryExpression" => &["argument"],
        "UpdateExpression" => &["argument"],
        "VariableDeclaration" => &["declarations"],
        "VariableDeclarator" => &["id", "init"],
        "WhileStatement" => &["test", "body"],
        "WithStatement" => &["object", "body"],
        "YieldExpression" => &["argument"],
        _ => return None,
    };
    Some(keys)
}

/// Whether a name is a recognized AST node type. Used by the query
/// parser to reject unknown selector identifiers early.
pub fn is_node_type(name: &str) -> bool {
    visitor_keys(name).is_some()
}
