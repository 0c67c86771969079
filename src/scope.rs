//! Lexical scope and binding tables.
//!
//! Scopes form a chain through parent ids. Most block scopes never bind
//! anything, so a scope starts as an empty placeholder and is upgraded
//! in place the first time a name is bound in it.
//!
//! This emulates the JavaScript scoping rules needed for "find the
//! declaration of this identifier" queries (function-scope `var`
//! hoisting vs. block-scoped `let`/`const`, declaration vs. reference
//! identifiers). It is not a full semantic analyzer: no temporal dead
//! zone, no strict-mode diagnostics.

use std::collections::HashMap;

use crate::path::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ScopeId(pub(crate) usize);

#[derive(Debug)]
enum Scope {
    /// Allocated eagerly for every scope-introducing node, never bound
    Placeholder { parent: Option<ScopeId> },
    /// Upgraded from a placeholder on first binding
    Populated {
        parent: Option<ScopeId>,
        bindings: HashMap<String, NodeId>,
    },
}

impl Scope {
    fn parent(&self) -> Option<ScopeId> {
        match self {
            Scope::Placeholder { parent } => *parent,
            Scope::Populated { parent, .. } => *parent,
        }
    }
}

/// All scopes of one traversal session, indexed by [`ScopeId`].
#[derive(Debug, Default)]
pub(crate) struct ScopeTable {
    scopes: Vec<Scope>,
}

impl ScopeTable {
    pub fn new() -> Self {
        ScopeTable::default()
    }

    pub fn new_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope::Placeholder { parent });
        id
    }

    /// Binds `name` in `scope`, upgrading a placeholder in place. A
    /// later binding of the same name in the same scope wins.
    pub fn bind(&mut self, scope: ScopeId, name: &str, node: NodeId) {
        let slot = &mut self.scopes[scope.0];
        match slot {
            Scope::Populated { bindings, .. } => {
                bindings.insert(name.to_string(), node);
            }
            Scope::Placeholder { parent } => {
                let mut bindings = HashMap::new();
                bindings.insert(name.to_string(), node);
                *slot = Scope::Populated {
                    parent: *parent,
                    bindings,
                };
            }
        }
    }

    /// Walks the scope chain outward and returns the first binding of
    /// `name`. A miss is "no binding", never an error.
    pub fn lookup(&self, from: ScopeId, name: &str) -> Option<NodeId> {
        let mut current = Some(from);
        while let Some(id) = current {
            let scope = &self.scopes[id.0];
            if let Scope::Populated { bindings, .. } = scope
                && let Some(node) = bindings.get(name)
            {
                return Some(*node);
            }
            current = scope.parent();
        }
        None
    }

    #[cfg(test)]
    fn is_placeholder(&self, id: ScopeId) -> bool {
        matches!(self.scopes[id.0], Scope::Placeholder { .. })
    }
}

/// Whether a node introduces a new lexical scope for its children.
///
/// A block directly under a function or catch clause shares the scope
/// that construct already introduced (params and body bindings live
/// together).
pub(crate) fn introduces_scope(node_type: &str, parent_type: Option<&str>) -> bool {
    match node_type {
        "BlockStatement" => !matches!(
            parent_type,
            Some(
                "FunctionDeclaration"
                    | "FunctionExpression"
                    | "ArrowFunctionExpression"
                    | "CatchClause"
            )
        ),
        "Program"
        | "FunctionDeclaration"
        | "FunctionExpression"
        | "ArrowFunctionExpression"
        | "CatchClause"
        | "ForStatement"
        | "ForInStatement"
        | "ForOfStatement"
        | "WhileStatement"
        | "DoWhileStatement"
        | "SwitchStatement"
        | "MethodDefinition"
        | "ClassDeclaration"
        | "ClassExpression"
        | "StaticBlock" => true,
        _ => false,
    }
}

/// Whether a node's introduced scope is a function scope, i.e. the
/// hoisting target for `var` declarations beneath it.
pub(crate) fn is_function_like(node_type: &str) -> bool {
    matches!(
        node_type,
        "Program"
            | "FunctionDeclaration"
            | "FunctionExpression"
            | "ArrowFunctionExpression"
            | "StaticBlock"
    )
}

/// Fields of a parent node type that hold declared names rather than
/// references. Assignment targets, member-expression accesses, update
/// operands and export-specifier locals are deliberately absent: those
/// identifiers are references, not declarations.
pub(crate) fn binding_fields(parent_type: &str) -> &'static [&'static str] {
    match parent_type {
        "VariableDeclarator" => &["id"],
        "FunctionDeclaration" | "FunctionExpression" => &["id", "params"],
        "ArrowFunctionExpression" => &["params"],
        "ClassDeclaration" | "ClassExpression" => &["id"],
        "CatchClause" => &["param"],
        "ImportSpecifier" | "ImportDefaultSpecifier" | "ImportNamespaceSpecifier" => &["local"],
        "ArrayPattern" => &["elements"],
        "ObjectPattern" => &["properties"],
        "RestElement" => &["argument"],
        "AssignmentPattern" => &["left"],
        "Property" => &["value"],
        _ => &[],
    }
}

/// Node types that only forward pattern structure; binding placement
/// walks through them to the construct that actually declares.
pub(crate) fn is_pattern_type(node_type: &str) -> bool {
    matches!(
        node_type,
        "ObjectPattern" | "ArrayPattern" | "Property" | "RestElement" | "AssignmentPattern"
    )
}
