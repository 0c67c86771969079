//! Per-query-session view of a parsed AST.
//!
//! A [`Session`] flattens the input JSON tree into an arena of
//! [`NodeEntry`] records in document (pre-order) order, each carrying
//! its parent link, the field it hangs off, its array index when the
//! field is a list, and its lexical scope. The arena is built once per
//! input AST and shared by every query evaluated against it; node
//! identity is the arena index, so result deduplication and filter
//! equality never compare JSON values structurally.
//!
//! The input AST is borrowed immutably for the whole session. Nothing
//! is ever written back into the JSON.

use serde_json::Value;

use crate::scope::{self, ScopeId, ScopeTable};
use crate::shape;

/// Identity of one AST node within a [`Session`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(pub(crate) usize);

/// One flattened AST node.
#[derive(Debug)]
pub(crate) struct NodeEntry<'a> {
    /// The underlying JSON object
    pub value: &'a Value,
    /// The node's `type` string
    pub node_type: &'a str,
    pub parent: Option<NodeId>,
    /// Field of the parent this node hangs off (`None` for the root)
    pub field: Option<&'static str>,
    /// Position within the parent field when that field is an array
    pub index: Option<usize>,
    /// Scope the node lives in
    pub scope: ScopeId,
    /// Nearest enclosing function scope, the `var` hoisting target
    pub fn_scope: ScopeId,
    /// Child nodes in visit order
    pub children: Vec<NodeId>,
}

/// Result of stepping into a field of a node: either another arena
/// node or a raw JSON value (a primitive, or a non-node object such as
/// a regex descriptor).
#[derive(Debug, Clone, Copy)]
pub(crate) enum Lookup<'a> {
    Node(NodeId),
    Value(&'a Value),
}

fn is_node_like(value: &Value) -> bool {
    value.get("type").is_some_and(Value::is_string)
}

/// Arena, scope table and parent/field links for one input AST.
pub(crate) struct Session<'a> {
    entries: Vec<NodeEntry<'a>>,
    scopes: ScopeTable,
}

impl<'a> Session<'a> {
    /// Flattens `root` and resolves all scopes and bindings. Returns
    /// `None` when the value is not a node (no `type` string).
    pub fn build(root: &'a Value) -> Option<Session<'a>> {
        if !is_node_like(root) {
            return None;
        }

        let mut entries: Vec<NodeEntry<'a>> = Vec::new();
        let mut stack: Vec<(&'a Value, Option<NodeId>, Option<&'static str>, Option<usize>)> =
            vec![(root, None, None, None)];

        while let Some((value, parent, field, index)) = stack.pop() {
            let id = NodeId(entries.len());
            let node_type = value
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or_default();
            entries.push(NodeEntry {
                value,
                node_type,
                parent,
                field,
                index,
                scope: ScopeId(0),
                fn_scope: ScopeId(0),
                children: Vec::new(),
            });
            if let Some(pid) = parent {
                entries[pid.0].children.push(id);
            }

            let Some(keys) = shape::visitor_keys(node_type) else {
                continue;
            };
            // pushed in reverse so the first field pops first
            for &key in keys.iter().rev() {
                match value.get(key) {
                    Some(Value::Array(items)) => {
                        for (i, item) in items.iter().enumerate().rev() {
                            if is_node_like(item) {
                                stack.push((item, Some(id), Some(key), Some(i)));
                            }
                        }
                    }
                    Some(v) if is_node_like(v) => stack.push((v, Some(id), Some(key), None)),
                    _ => {}
                }
            }
        }

        let scopes = resolve_scopes(&mut entries);
        Some(Session { entries, scopes })
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &NodeEntry<'a> {
        &self.entries[id.0]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entries[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.entries[id.0].children
    }

    /// Finds the declaration the scope chain associates with `name`,
    /// starting from `scope`.
    pub fn lookup_binding(&self, scope: ScopeId, name: &str) -> Option<NodeId> {
        self.scopes.lookup(scope, name)
    }

    /// Steps into a field of a node. Array fields yield one item per
    /// element, `null` entries are dropped, and values without an arena
    /// entry come back as raw JSON.
    pub fn lookup(&self, id: NodeId, field: &str) -> Vec<Lookup<'a>> {
        let entry = self.node(id);
        let Some(raw) = entry.value.get(field) else {
            return Vec::new();
        };
        match raw {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| {
                    if item.is_null() {
                        None
                    } else if is_node_like(item) {
                        Some(
                            self.child_at(id, field, Some(i))
                                .map(Lookup::Node)
                                .unwrap_or(Lookup::Value(item)),
                        )
                    } else {
                        Some(Lookup::Value(item))
                    }
                })
                .collect(),
            Value::Null => Vec::new(),
            v if is_node_like(v) => vec![
                self.child_at(id, field, None)
                    .map(Lookup::Node)
                    .unwrap_or(Lookup::Value(v)),
            ],
            v => vec![Lookup::Value(v)],
        }
    }

    fn child_at(&self, id: NodeId, field: &str, index: Option<usize>) -> Option<NodeId> {
        self.entries[id.0]
            .children
            .iter()
            .copied()
            .find(|&c| self.entries[c.0].field == Some(field) && self.entries[c.0].index == index)
    }
}

/// Second pass over the arena: assigns every node its scope, creates
/// scopes for scope-introducing nodes, and registers declared names.
/// Runs in arena (document) order, so a later declaration of a name
/// shadows an earlier one in the same scope.
fn resolve_scopes(entries: &mut [NodeEntry<'_>]) -> ScopeTable {
    let mut table = ScopeTable::new();
    // scope and fn-scope a node hands to its children
    let mut child_scope = vec![ScopeId(0); entries.len()];
    let mut child_fn = vec![ScopeId(0); entries.len()];

    for i in 0..entries.len() {
        let id = NodeId(i);
        let (scope, fn_scope) = match entries[i].parent {
            None => {
                let root = table.new_scope(None);
                (root, root)
            }
            Some(pid) => (child_scope[pid.0], child_fn[pid.0]),
        };
        entries[i].scope = scope;
        entries[i].fn_scope = fn_scope;

        let parent_type = entries[i].parent.map(|pid| entries[pid.0].node_type);
        let ty = entries[i].node_type;
        child_scope[i] = if scope::introduces_scope(ty, parent_type) {
            table.new_scope(Some(scope))
        } else {
            scope
        };
        child_fn[i] = if scope::is_function_like(ty) {
            child_scope[i]
        } else {
            fn_scope
        };

        if ty == "Identifier" {
            register_binding(entries, &child_scope, &mut table, id);
        }
    }

    table
}

/// Registers an identifier as a declared name when its position in the
/// parent marks it as a declaration. References never register.
fn register_binding(
    entries: &[NodeEntry<'_>],
    child_scope: &[ScopeId],
    table: &mut ScopeTable,
    id: NodeId,
) {
    let entry = &entries[id.0];
    let Some(name) = entry.value.get("name").and_then(Value::as_str) else {
        return;
    };
    let Some(pid) = entry.parent else { return };
    let Some(field) = entry.field else { return };
    let parent = &entries[pid.0];
    if !scope::binding_fields(parent.node_type).contains(&field) {
        return;
    }

    match (parent.node_type, field) {
        // `var` hoists to the nearest function scope, `let`/`const`
        // stay in the declaring block; the declarator is the bound node
        ("VariableDeclarator", "id") => {
            let scope = if declaration_kind_is_var(entries, pid) {
                entry.fn_scope
            } else {
                entry.scope
            };
            table.bind(scope, name, pid);
        }
        // parameters live in the scope the function introduces
        (
            "FunctionDeclaration" | "FunctionExpression" | "ArrowFunctionExpression",
            "params",
        ) => table.bind(child_scope[pid.0], name, id),
        // a declaration's name is visible in the surrounding scope
        ("FunctionDeclaration" | "ClassDeclaration", "id") => {
            table.bind(parent.scope, name, id)
        }
        // a named expression only sees its own name inside itself
        ("FunctionExpression" | "ClassExpression", "id") => {
            table.bind(child_scope[pid.0], name, id)
        }
        ("CatchClause", "param") => table.bind(child_scope[pid.0], name, id),
        // imports bind at module level; the specifier is the bound node
        (
            "ImportSpecifier" | "ImportDefaultSpecifier" | "ImportNamespaceSpecifier",
            "local",
        ) => table.bind(entry.scope, name, pid),
        // destructuring: the innermost carrier is the bound node and
        // placement follows the construct that owns the whole pattern
        ("ArrayPattern", "elements") => {
            table.bind(pattern_scope(entries, child_scope, id), name, id)
        }
        ("Property", "value") if grandparent_is(entries, pid, "ObjectPattern") => {
            table.bind(pattern_scope(entries, child_scope, id), name, pid)
        }
        ("RestElement", "argument") | ("AssignmentPattern", "left") => {
            if in_pattern_position(entries, pid) {
                table.bind(pattern_scope(entries, child_scope, id), name, pid);
            }
        }
        _ => {}
    }
}

fn declaration_kind_is_var(entries: &[NodeEntry<'_>], declarator: NodeId) -> bool {
    entries[declarator.0]
        .parent
        .map(|pid| &entries[pid.0])
        .and_then(|decl| decl.value.get("kind"))
        .and_then(Value::as_str)
        == Some("var")
}

fn grandparent_is(entries: &[NodeEntry<'_>], parent: NodeId, ty: &str) -> bool {
    entries[parent.0]
        .parent
        .is_some_and(|gid| entries[gid.0].node_type == ty)
}

/// Whether a carrier node sits in a declaring position: under another
/// pattern, in a parameter list, or as a declarator id. `RestElement`
/// and `AssignmentPattern` shapes also occur in non-declaring spots.
fn in_pattern_position(entries: &[NodeEntry<'_>], carrier: NodeId) -> bool {
    let entry = &entries[carrier.0];
    if let Some(pid) = entry.parent {
        let parent = &entries[pid.0];
        if scope::is_pattern_type(parent.node_type) {
            return true;
        }
        return matches!(
            (parent.node_type, entry.field),
            (
                "FunctionDeclaration" | "FunctionExpression" | "ArrowFunctionExpression",
                Some("params"),
            ) | ("VariableDeclarator", Some("id"))
                | ("CatchClause", Some("param")),
        );
    }
    false
}

/// Walks out of nested pattern nodes to the construct declaring the
/// whole pattern and returns the scope its names land in.
fn pattern_scope(
    entries: &[NodeEntry<'_>],
    child_scope: &[ScopeId],
    id: NodeId,
) -> ScopeId {
    let mut prev = id;
    while let Some(pid) = entries[prev.0].parent {
        let parent = &entries[pid.0];
        if scope::is_pattern_type(parent.node_type) {
            prev = pid;
            continue;
        }
        let via = entries[prev.0].field;
        return match (parent.node_type, via) {
            ("VariableDeclarator", Some("id")) => {
                if declaration_kind_is_var(entries, pid) {
                    entries[id.0].fn_scope
                } else {
                    entries[id.0].scope
                }
            }
            (
                "FunctionDeclaration" | "FunctionExpression" | "ArrowFunctionExpression",
                Some("params"),
            ) => child_scope[pid.0],
            ("CatchClause", Some("param")) => child_scope[pid.0],
            _ => entries[id.0].scope,
        };
    }
    entries[id.0].scope
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ident(name: &str) -> Value {
        json!({ "type": "Identifier", "name": name })
    }

    fn program(body: Vec<Value>) -> Value {
        json!({ "type": "Program", "body": body })
    }

    fn declaration(kind: &str, name: &str, init: Value) -> Value {
        json!({
            "type": "VariableDeclaration",
            "kind": kind,
            "declarations": [{
                "type": "VariableDeclarator",
                "id": ident(name),
                "init": init,
            }],
        })
    }

    #[test]
    fn arena_is_preorder_with_parent_and_field_links() {
        let ast = program(vec![declaration(
            "let",
            "x",
            json!({ "type": "Literal", "value": 1 }),
        )]);
        let session = Session::build(&ast).unwrap();

        let root = session.node(session.root());
        assert_eq!(root.node_type, "Program");
        assert_eq!(root.parent, None);

        let decl = session.children(session.root())[0];
        assert_eq!(session.node(decl).node_type, "VariableDeclaration");
        assert_eq!(session.node(decl).field, Some("body"));
        assert_eq!(session.node(decl).index, Some(0));

        let declarator = session.children(decl)[0];
        let kids = session.children(declarator);
        assert_eq!(session.node(kids[0]).node_type, "Identifier");
        assert_eq!(session.node(kids[0]).field, Some("id"));
        assert_eq!(session.node(kids[1]).node_type, "Literal");
        assert_eq!(session.node(kids[1]).field, Some("init"));
    }

    #[test]
    fn lookup_steps_into_fields_and_primitives() {
        let ast = program(vec![declaration(
            "let",
            "x",
            json!({ "type": "Literal", "value": 42 }),
        )]);
        let session = Session::build(&ast).unwrap();

        let decl = session.children(session.root())[0];
        let declarator = session.children(decl)[0];

        let init = session.lookup(declarator, "init");
        assert!(matches!(init[..], [Lookup::Node(_)]));

        let Lookup::Node(literal) = init[0] else {
            unreachable!()
        };
        let value = session.lookup(literal, "value");
        assert!(matches!(value[..], [Lookup::Value(v)] if v == &json!(42)));

        assert!(session.lookup(declarator, "nothing").is_empty());
    }

    #[test]
    fn var_in_block_hoists_to_the_function_scope() {
        // function f() { { var x = 1; } x; }
        let reference = json!({ "type": "ExpressionStatement", "expression": ident("x") });
        let ast = program(vec![json!({
            "type": "FunctionDeclaration",
            "id": ident("f"),
            "params": [],
            "body": {
                "type": "BlockStatement",
                "body": [
                    {
                        "type": "BlockStatement",
                        "body": [declaration("var", "x", json!({ "type": "Literal", "value": 1 }))],
                    },
                    reference,
                ],
            },
        })]);
        let session = Session::build(&ast).unwrap();

        // the trailing `x` reference sits outside the inner block
        let reference = NodeId(session.entries.len() - 1);
        assert_eq!(session.node(reference).node_type, "Identifier");
        let bound = session
            .lookup_binding(session.node(reference).scope, "x")
            .expect("var must be visible outside the inner block");
        assert_eq!(session.node(bound).node_type, "VariableDeclarator");
    }

    #[test]
    fn let_in_block_stays_in_the_block() {
        // { let x = 1; } x;
        let ast = program(vec![
            json!({
                "type": "BlockStatement",
                "body": [declaration("let", "x", json!({ "type": "Literal", "value": 1 }))],
            }),
            json!({ "type": "ExpressionStatement", "expression": ident("x") }),
        ]);
        let session = Session::build(&ast).unwrap();

        let reference = NodeId(session.entries.len() - 1);
        assert_eq!(session.node(reference).node_type, "Identifier");
        assert_eq!(
            session.lookup_binding(session.node(reference).scope, "x"),
            None
        );
    }

    #[test]
    fn parameters_bind_in_the_function_scope() {
        // function f(x) { x; }
        let ast = program(vec![json!({
            "type": "FunctionDeclaration",
            "id": ident("f"),
            "params": [ident("x")],
            "body": {
                "type": "BlockStatement",
                "body": [{ "type": "ExpressionStatement", "expression": ident("x") }],
            },
        })]);
        let session = Session::build(&ast).unwrap();

        let reference = NodeId(session.entries.len() - 1);
        let bound = session
            .lookup_binding(session.node(reference).scope, "x")
            .expect("parameter must be visible in the body");
        assert_eq!(session.node(bound).node_type, "Identifier");
        assert_eq!(session.node(bound).field, Some("params"));
    }

    #[test]
    fn export_specifiers_do_not_shadow_declarations() {
        // let a = 1; export { a };
        let ast = program(vec![
            declaration("let", "a", json!({ "type": "Literal", "value": 1 })),
            json!({
                "type": "ExportNamedDeclaration",
                "declaration": null,
                "specifiers": [{
                    "type": "ExportSpecifier",
                    "local": ident("a"),
                    "exported": ident("a"),
                }],
                "source": null,
            }),
        ]);
        let session = Session::build(&ast).unwrap();

        let reference = NodeId(session.entries.len() - 1);
        let bound = session
            .lookup_binding(session.node(reference).scope, "a")
            .expect("declaration must stay visible");
        assert_eq!(session.node(bound).node_type, "VariableDeclarator");
    }

    #[test]
    fn non_node_input_is_rejected() {
        assert!(Session::build(&json!({ "foo": 1 })).is_none());
        assert!(Session::build(&json!(42)).is_none());
    }
}
