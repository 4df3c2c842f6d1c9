use protoenv_schema::{EnumDef, Message, ProtoFile};
use serde::Serialize;

/// The file being compiled plus everything it imports, transitively.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaSet {
    pub root:    ProtoFile,
    pub imports: Vec<ProtoFile>,
}

/// A type name resolved to its definition.
#[derive(Debug, Clone, Copy)]
pub enum TypeRef<'a> {
    Message(&'a ProtoFile, &'a Message),
    Enum(&'a ProtoFile, &'a EnumDef),
}

impl SchemaSet {
    pub fn new(root: ProtoFile) -> SchemaSet {
        SchemaSet { root, imports: Vec::new() }
    }

    /// Root file first, then imports in load order.
    pub fn files(&self) -> impl Iterator<Item = &ProtoFile> {
        std::iter::once(&self.root).chain(self.imports.iter())
    }

    /// Resolves `type_name` as written in the root file.
    pub fn resolve(&self, type_name: &str) -> Option<TypeRef<'_>> {
        self.resolve_from(&self.root, type_name)
    }

    /// Resolves `type_name` as written in `file`, following protobuf
    /// scoping: a leading dot means fully qualified, otherwise the name is
    /// tried against the file's package and each of its parent scopes.
    pub fn resolve_from(&self, file: &ProtoFile, type_name: &str) -> Option<TypeRef<'_>> {
        if let Some(full) = type_name.strip_prefix('.') {
            return self.find_qualified(full);
        }

        let mut scope = file.package.clone().unwrap_or_default();
        loop {
            let candidate = if scope.is_empty() {
                type_name.to_string()
            } else {
                format!("{}.{}", scope, type_name)
            };
            if let Some(found) = self.find_qualified(&candidate) {
                return Some(found);
            }
            if scope.is_empty() {
                return None;
            }
            scope = match scope.rfind('.') {
                Some(pos) => scope[..pos].to_string(),
                None => String::new(),
            };
        }
    }

    pub fn resolve_message(&self, type_name: &str) -> Option<&Message> {
        match self.resolve(type_name)? {
            TypeRef::Message(_, message) => Some(message),
            TypeRef::Enum(..) => None,
        }
    }

    pub fn resolve_enum(&self, type_name: &str) -> Option<&EnumDef> {
        match self.resolve(type_name)? {
            TypeRef::Enum(_, def) => Some(def),
            TypeRef::Message(..) => None,
        }
    }

    fn find_qualified(&self, full: &str) -> Option<TypeRef<'_>> {
        for file in self.files() {
            let local = match &file.package {
                Some(package) => match full.strip_prefix(package.as_str()) {
                    Some(rest) => match rest.strip_prefix('.') {
                        Some(local) => local,
                        None => continue,
                    },
                    None => continue,
                },
                None => full,
            };
            if let Some(message) = file.message(local) {
                return Some(TypeRef::Message(file, message));
            }
            if let Some(def) = file.enum_def(local) {
                return Some(TypeRef::Enum(file, def));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_schema;

    fn set() -> SchemaSet {
        let root = compile_schema(
            "root.proto",
            "package acme.config.v1; message Root { Color c = 1; } enum Color { RED = 0; }",
        )
        .unwrap();
        let shared = compile_schema(
            "shared.proto",
            "package acme.shared; message Shared { string s = 1; }",
        )
        .unwrap();
        let bare = compile_schema("bare.proto", "message Bare { string s = 1; }").unwrap();
        SchemaSet { root, imports: vec![shared, bare] }
    }

    #[test]
    fn resolves_through_parent_scopes() {
        let set = set();
        assert!(matches!(set.resolve("Color"), Some(TypeRef::Enum(_, e)) if e.name == "Color"));
        assert!(set.resolve_message("Root").is_some());
        assert!(set.resolve_message("shared.Shared").is_some());
        assert!(set.resolve_message("acme.shared.Shared").is_some());
        assert!(set.resolve_message(".acme.shared.Shared").is_some());
        assert!(set.resolve_message("Bare").is_some());
        assert!(set.resolve_message("Shared").is_none());
        assert!(set.resolve_enum("Root").is_none());
    }

    #[test]
    fn resolves_relative_to_the_declaring_file() {
        let set = set();
        let shared = &set.imports[0];
        assert!(set.resolve("Shared").is_none());
        assert!(matches!(
            set.resolve_from(shared, "Shared"),
            Some(TypeRef::Message(file, m)) if file.name == "shared.proto" && m.name == "Shared"
        ));
    }
}
