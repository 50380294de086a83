use indexmap::{IndexMap, IndexSet};
use log::warn;

use crate::naming::{Identifier, IdentifierCase, IdentifierRequest, IdentifierTable};

/// Everything needed to create a file in the registry.
#[derive(Debug, Clone)]
pub struct FileSpec {
    pub id: String,
    /// Relative path under the configured output root; directory structure
    /// is preserved by the finalizer.
    pub path: String,
    pub case: IdentifierCase,
    pub export_from_index: bool,
}

/// An owned output file: ordered top-level declarations, deduplicated
/// imports, and the per-file identifier table.
#[derive(Debug)]
pub struct GeneratedFile {
    pub id: String,
    pub path: String,
    pub case: IdentifierCase,
    pub export_from_index: bool,
    nodes: Vec<String>,
    imports: IndexMap<String, IndexSet<String>>,
    identifiers: IdentifierTable,
}

impl GeneratedFile {
    fn new(spec: FileSpec) -> Self {
        GeneratedFile {
            id: spec.id,
            path: spec.path,
            case: spec.case,
            export_from_index: spec.export_from_index,
            nodes: Vec::new(),
            imports: IndexMap::new(),
            identifiers: IdentifierTable::default(),
        }
    }

    /// Append a top-level declaration. Declaration order is append order.
    pub fn add(&mut self, node: impl Into<String>) {
        self.nodes.push(node.into());
    }

    /// Record an import; duplicates are collapsed.
    pub fn import(&mut self, module: &str, symbol: &str) {
        self.imports
            .entry(module.to_string())
            .or_default()
            .insert(symbol.to_string());
    }

    /// Resolve an identifier against this file's table, defaulting to the
    /// file's case convention.
    pub fn identifier(&mut self, request: IdentifierRequest<'_>) -> Identifier {
        self.identifiers.identifier(self.case, request)
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Render the file: deduplicated imports at the head, then declarations
    /// in append order.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (module, symbols) in &self.imports {
            let list: Vec<&str> = symbols.iter().map(String::as_str).collect();
            out.push_str(&format!("import {{ {} }} from \"{}\";\n", list.join(", "), module));
        }
        if !self.imports.is_empty() && !self.nodes.is_empty() {
            out.push('\n');
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(node);
            out.push('\n');
        }
        out
    }
}

/// Owns every emitted file for the run. File ids are unique; duplicate
/// creation keeps the existing file.
#[derive(Debug, Default)]
pub struct FileRegistry {
    files: IndexMap<String, GeneratedFile>,
}

impl FileRegistry {
    /// Create a file, or return the existing one when the id is already
    /// taken (a programmer error, surfaced as a warning).
    pub fn create_file(&mut self, spec: FileSpec) -> &mut GeneratedFile {
        if self.files.contains_key(&spec.id) {
            warn!("file '{}' already exists; keeping the existing file", spec.id);
            return self.files.get_mut(&spec.id).expect("checked above");
        }
        let id = spec.id.clone();
        self.files.insert(id.clone(), GeneratedFile::new(spec));
        self.files.get_mut(&id).expect("just inserted")
    }

    pub fn file(&self, id: &str) -> Option<&GeneratedFile> {
        self.files.get(id)
    }

    pub fn file_mut(&mut self, id: &str) -> Option<&mut GeneratedFile> {
        self.files.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratedFile> {
        self.files.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::Namespace;

    fn spec(id: &str) -> FileSpec {
        FileSpec {
            id: id.to_string(),
            path: format!("{id}.ts"),
            case: IdentifierCase::PascalCase,
            export_from_index: true,
        }
    }

    #[test]
    fn duplicate_creation_keeps_existing() {
        let mut registry = FileRegistry::default();
        registry.create_file(spec("main")).add("first");
        let again = registry.create_file(spec("main"));
        assert_eq!(again.nodes(), ["first"]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn imports_are_deduplicated() {
        let mut registry = FileRegistry::default();
        let file = registry.create_file(spec("main"));
        file.import("zod", "z");
        file.import("zod", "z");
        file.add("const A = z.string();");
        assert_eq!(
            file.render(),
            "import { z } from \"zod\";\n\nconst A = z.string();\n"
        );
    }

    #[test]
    fn nodes_render_in_append_order() {
        let mut registry = FileRegistry::default();
        let file = registry.create_file(spec("main"));
        file.add("const A = 1;");
        file.add("const B = 2;");
        assert_eq!(file.render(), "const A = 1;\n\nconst B = 2;\n");
    }

    #[test]
    fn identifier_uses_file_case_by_default() {
        let mut registry = FileRegistry::default();
        let file = registry.create_file(FileSpec {
            case: IdentifierCase::SnakeCase,
            ..spec("main")
        });
        let id = file.identifier(IdentifierRequest {
            ref_path: "#/components/schemas/PetStore",
            namespace: Namespace::Value,
            create: true,
            case: None,
            transform: None,
        });
        assert_eq!(id.name, "pet_store");
    }
}
