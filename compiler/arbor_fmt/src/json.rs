//! Structured dump as JSON.
//!
//! Every node becomes an object with a `type` (the kind name), a `range`
//! (`[start, end]` byte offsets; `[0, 0]` for synthesized nodes), a
//! `modifiers` list when any flag is set, and one field per child slot.
//! Keys are sorted, so the output is deterministic.

use arbor_ir::{IrResult, NodeArena, NodeData, NodeFlags, NodeId, NodeRef};
use arbor_stack::ensure_sufficient_stack;
use serde_json::{json, Map, Value};

/// Pretty-printed JSON for the tree under `root`.
pub fn dump_json(arena: &NodeArena, root: NodeId) -> IrResult<String> {
    let value = to_json_value(arena, root)?;
    Ok(format!("{value:#}"))
}

/// The JSON tree itself, for callers that want to query it.
pub fn to_json_value(arena: &NodeArena, root: NodeId) -> IrResult<Value> {
    Ok(node_value(arena.handle(root)?))
}

fn modifiers(flags: NodeFlags) -> Vec<&'static str> {
    let mut names = Vec::new();
    for (flag, name) in [
        (NodeFlags::EXPORT, "export"),
        (NodeFlags::DEFAULT, "default"),
        (NodeFlags::TYPE_ONLY, "type"),
        (NodeFlags::DECLARE, "declare"),
        (NodeFlags::CONST, "const"),
        (NodeFlags::STATIC, "static"),
    ] {
        if flags.contains(flag) {
            names.push(name);
        }
    }
    names
}

fn node_value(node: NodeRef<'_>) -> Value {
    ensure_sufficient_stack(|| {
        let one = |id: NodeId| node_value(node.at(id));
        let many = |ids: &[NodeId]| Value::Array(ids.iter().map(|&id| one(id)).collect());
        let opt = |id: Option<NodeId>| id.map_or(Value::Null, &one);

        let mut object = Map::new();
        object.insert("type".into(), json!(node.kind().as_str()));
        let span = node.span();
        object.insert("range".into(), json!([span.start, span.end]));
        let flags = modifiers(node.flags());
        if !flags.is_empty() {
            object.insert("modifiers".into(), json!(flags));
        }

        let fields: Vec<(&str, Value)> = match node.data() {
            NodeData::Module { statements } | NodeData::Block { statements } => {
                vec![("statements", many(statements))]
            }
            NodeData::ImportDeclaration { source, specifiers } => {
                vec![("source", one(*source)), ("specifiers", many(specifiers))]
            }
            NodeData::ImportSpecifier { imported, local } => {
                vec![("imported", one(*imported)), ("local", one(*local))]
            }
            NodeData::ImportDefaultSpecifier { local }
            | NodeData::ImportNamespaceSpecifier { local } => vec![("local", one(*local))],
            NodeData::ExportNamedDeclaration { specifiers, source } => {
                vec![("specifiers", many(specifiers)), ("source", opt(*source))]
            }
            NodeData::ExportSpecifier { local, exported } => {
                vec![("local", one(*local)), ("exported", one(*exported))]
            }
            NodeData::FunctionDeclaration { name, params, body }
            | NodeData::MethodDefinition { name, params, body } => vec![
                ("id", one(*name)),
                ("params", many(params)),
                ("body", one(*body)),
            ],
            NodeData::ClassDeclaration { name, members } => {
                vec![("id", one(*name)), ("members", many(members))]
            }
            NodeData::Parameter { name } => vec![("name", one(*name))],
            NodeData::VariableDeclaration { name, init } => {
                vec![("id", one(*name)), ("init", opt(*init))]
            }
            NodeData::ReturnStatement { argument } => vec![("argument", opt(*argument))],
            NodeData::ExpressionStatement { expression } => {
                vec![("expression", one(*expression))]
            }
            NodeData::CallExpression { callee, arguments }
            | NodeData::NewExpression { callee, arguments } => {
                vec![("callee", one(*callee)), ("arguments", many(arguments))]
            }
            NodeData::MemberExpression { object, property } => {
                vec![("object", one(*object)), ("property", one(*property))]
            }
            NodeData::Identifier { .. } => vec![("name", json!(node.text()))],
            NodeData::StringLiteral { .. } => vec![("value", json!(node.text()))],
            NodeData::NumberLiteral { bits } => vec![("value", json!(f64::from_bits(*bits)))],
            NodeData::BooleanLiteral { value } => vec![("value", json!(value))],
        };
        for (key, value) in fields {
            object.insert(key.into(), value);
        }
        Value::Object(object)
    })
}
