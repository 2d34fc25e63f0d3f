//! Lowering a syntax tree to a compiled unit.

use serde::{Deserialize, Serialize};

use arbor_ir::{IrResult, NodeArena, NodeData, NodeFlags, NodeId, NodeRef};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledUnit {
    /// Program name the unit was emitted for.
    pub module: String,
    pub imports: Vec<ImportRecord>,
    /// Exported names, in declaration order.
    pub exports: Vec<String>,
    pub functions: Vec<FunctionRecord>,
    pub classes: Vec<ClassRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub source: String,
    /// Imported names; `default` for a default import, `*` for a namespace.
    pub names: Vec<String>,
    pub type_only: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    /// `name`, or `Class.name` for methods.
    pub name: String,
    pub arity: u32,
    /// Callee paths in call order, e.g. `print` or `console.log`.
    pub calls: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub name: String,
    pub methods: Vec<String>,
}

/// Summarize the program rooted at `root`.
#[tracing::instrument(level = "debug", skip(arena, root))]
pub fn lower(arena: &NodeArena, root: NodeId, module: &str) -> IrResult<CompiledUnit> {
    let root = arena.handle(root)?;
    let mut unit = CompiledUnit {
        module: module.to_owned(),
        ..CompiledUnit::default()
    };

    for statement in root.children() {
        match statement.data() {
            NodeData::ImportDeclaration { source, specifiers } => {
                unit.imports.push(ImportRecord {
                    source: text(statement.at(*source)),
                    names: specifiers
                        .iter()
                        .map(|&s| imported_name(statement.at(s)))
                        .collect(),
                    type_only: statement.flags().contains(NodeFlags::TYPE_ONLY),
                });
            }
            NodeData::ExportNamedDeclaration { specifiers, .. } => {
                for &specifier in specifiers {
                    if let NodeData::ExportSpecifier { exported, .. } =
                        statement.at(specifier).data()
                    {
                        unit.exports.push(text(statement.at(*exported)));
                    }
                }
            }
            NodeData::FunctionDeclaration { name, params, body } => {
                record_export(&mut unit, statement);
                unit.functions
                    .push(function_record(text(statement.at(*name)), params, statement.at(*body)));
            }
            NodeData::ClassDeclaration { name, members } => {
                record_export(&mut unit, statement);
                let class_name = text(statement.at(*name));
                let mut methods = Vec::with_capacity(members.len());
                for &member in members {
                    let method = statement.at(member);
                    if let NodeData::MethodDefinition { name, params, body } = method.data() {
                        let method_name = text(method.at(*name));
                        unit.functions.push(function_record(
                            format!("{class_name}.{method_name}"),
                            params,
                            method.at(*body),
                        ));
                        methods.push(method_name);
                    }
                }
                unit.classes.push(ClassRecord {
                    name: class_name,
                    methods,
                });
            }
            NodeData::VariableDeclaration { .. } => record_export(&mut unit, statement),
            _ => {}
        }
    }
    Ok(unit)
}

fn record_export(unit: &mut CompiledUnit, declaration: NodeRef<'_>) {
    let flags = declaration.flags();
    if flags.contains(NodeFlags::DEFAULT) {
        unit.exports.push("default".to_owned());
    } else if flags.contains(NodeFlags::EXPORT) {
        unit.exports.push(declaration.name().unwrap_or_default().to_owned());
    }
}

fn function_record(name: String, params: &[NodeId], body: NodeRef<'_>) -> FunctionRecord {
    let calls = body
        .descendants()
        .filter_map(|node| match node.data() {
            NodeData::CallExpression { callee, .. } => callee_path(node.at(*callee)),
            _ => None,
        })
        .collect();
    FunctionRecord {
        name,
        arity: u32::try_from(params.len()).unwrap_or(u32::MAX),
        calls,
    }
}

/// `a`, `a.b.c`; `None` for computed callees such as `f()()`.
fn callee_path(node: NodeRef<'_>) -> Option<String> {
    match node.data() {
        NodeData::Identifier { .. } => node.text().map(str::to_owned),
        NodeData::MemberExpression { object, property } => {
            let object = callee_path(node.at(*object))?;
            Some(format!("{object}.{}", node.at(*property).text()?))
        }
        _ => None,
    }
}

fn imported_name(specifier: NodeRef<'_>) -> String {
    match specifier.data() {
        NodeData::ImportSpecifier { imported, .. } => text(specifier.at(*imported)),
        NodeData::ImportDefaultSpecifier { .. } => "default".to_owned(),
        _ => "*".to_owned(),
    }
}

fn text(node: NodeRef<'_>) -> String {
    node.text().unwrap_or_default().to_owned()
}
