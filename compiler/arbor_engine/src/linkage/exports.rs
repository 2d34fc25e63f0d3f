//! What a program exports.

use rustc_hash::FxHashMap;

use arbor_ir::{NodeData, NodeFlags, NodeId, NodeRef};

/// Where an exported name leads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportTarget {
    /// A declaration of the exporting program itself.
    Local(NodeId),
    /// `export { name } from "source"`, or an imported name exported again.
    ReExport { source: String, name: String },
}

/// Exported names of one program, keyed by the name importers use.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportTable {
    entries: FxHashMap<String, ExportTarget>,
}

impl ExportTable {
    /// Scan the top-level statements of `module`.
    ///
    /// Recognized forms: `export` and `export default` on a declaration,
    /// local export lists and re-export lists. A local export list naming
    /// something that is neither declared nor imported is skipped; the
    /// checker reports it.
    pub fn collect(module: NodeRef<'_>) -> Self {
        let mut declarations: FxHashMap<&str, NodeId> = FxHashMap::default();
        let mut imports: FxHashMap<&str, (&str, &str)> = FxHashMap::default();
        let mut entries = FxHashMap::default();

        for &statement in module.statements() {
            let node = module.at(statement);
            match node.data() {
                NodeData::FunctionDeclaration { .. }
                | NodeData::ClassDeclaration { .. }
                | NodeData::VariableDeclaration { .. } => {
                    let Some(name) = node.name() else { continue };
                    declarations.insert(name, statement);
                    let flags = node.flags();
                    if flags.contains(NodeFlags::DEFAULT) {
                        entries.insert("default".to_owned(), ExportTarget::Local(statement));
                    } else if flags.contains(NodeFlags::EXPORT) {
                        entries.insert(name.to_owned(), ExportTarget::Local(statement));
                    }
                }
                NodeData::ImportDeclaration { source, specifiers } => {
                    let source = node.at(*source).text().unwrap_or_default();
                    for &specifier in specifiers {
                        let spec = node.at(specifier);
                        let (local, imported) = match spec.data() {
                            NodeData::ImportSpecifier { imported, local } => {
                                (*local, spec.at(*imported).text().unwrap_or_default())
                            }
                            NodeData::ImportDefaultSpecifier { local } => (*local, "default"),
                            _ => continue,
                        };
                        if let Some(local) = spec.at(local).text() {
                            imports.insert(local, (source, imported));
                        }
                    }
                }
                _ => {}
            }
        }

        for &statement in module.statements() {
            let node = module.at(statement);
            let NodeData::ExportNamedDeclaration { specifiers, source } = node.data() else {
                continue;
            };
            let source = (*source).and_then(|s| node.at(s).text());
            for &specifier in specifiers {
                let NodeData::ExportSpecifier { local, exported } = node.at(specifier).data() else {
                    continue;
                };
                let (Some(local), Some(exported)) = (node.at(*local).text(), node.at(*exported).text())
                else {
                    continue;
                };
                let target = match source {
                    Some(source) => ExportTarget::ReExport {
                        source: source.to_owned(),
                        name: local.to_owned(),
                    },
                    None => match (declarations.get(local), imports.get(local)) {
                        (Some(&declaration), _) => ExportTarget::Local(declaration),
                        (None, Some(&(source, name))) => ExportTarget::ReExport {
                            source: source.to_owned(),
                            name: name.to_owned(),
                        },
                        (None, None) => continue,
                    },
                };
                entries.insert(exported.to_owned(), target);
            }
        }

        ExportTable { entries }
    }

    pub fn get(&self, name: &str) -> Option<&ExportTarget> {
        self.entries.get(name)
    }

    /// Exported names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
