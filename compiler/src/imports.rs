use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{
    compiler::compile_schema,
    error::CompileError,
    traits::ImportProvider,
    types::SchemaSet,
};

/// Import paths under this prefix are the protobuf well-known types.
pub const WELL_KNOWN_PREFIX: &str = "google/protobuf/";

const BUILTIN_WRAPPERS: &str = include_str!("../proto/google/protobuf/wrappers.proto");

/// Well-known modules compiled into the binary, used when no vendored copy
/// exists on disk.
pub fn builtin_module(module: &str) -> Option<&'static str> {
    match module {
        "google/protobuf/wrappers.proto" => Some(BUILTIN_WRAPPERS),
        _ => None,
    }
}

/// Resolves imports relative to a root directory. Well-known modules are
/// looked up under `<root>/protobuf/src/`, then in the built-in copies.
#[derive(Debug, Clone)]
pub struct FsImportProvider {
    root: PathBuf,
}

impl FsImportProvider {
    pub fn new(root: impl Into<PathBuf>) -> FsImportProvider {
        FsImportProvider { root: root.into() }
    }

    pub fn module_path(&self, module: &str) -> PathBuf {
        if module.starts_with(WELL_KNOWN_PREFIX) {
            self.root.join("protobuf").join("src").join(module)
        } else {
            self.root.join(module)
        }
    }
}

impl ImportProvider for FsImportProvider {
    fn resolve(&self, module: &str) -> Result<Box<dyn Read + '_>, std::io::Error> {
        let path = self.module_path(module);
        match File::open(&path) {
            Ok(file) => Ok(Box::new(file)),
            Err(err) => match builtin_module(module) {
                Some(text) => {
                    debug!(module, "using built-in copy of well-known module");
                    Ok(Box::new(Cursor::new(text.as_bytes())))
                }
                None => Err(err),
            },
        }
    }
}

/// In-memory modules keyed by import path. Falls back to the built-in
/// well-known modules.
#[derive(Debug, Clone, Default)]
pub struct MemoryImportProvider {
    modules: HashMap<String, String>,
}

impl MemoryImportProvider {
    pub fn new() -> MemoryImportProvider {
        MemoryImportProvider::default()
    }

    pub fn with_module(mut self, module: &str, text: &str) -> MemoryImportProvider {
        self.modules.insert(module.to_string(), text.to_string());
        self
    }
}

impl ImportProvider for MemoryImportProvider {
    fn resolve(&self, module: &str) -> Result<Box<dyn Read + '_>, std::io::Error> {
        let text = self
            .modules
            .get(module)
            .map(String::as_str)
            .or_else(|| builtin_module(module))
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, format!("no module {}", module))
            })?;
        Ok(Box::new(Cursor::new(text.as_bytes())))
    }
}

fn read_module(provider: &dyn ImportProvider, module: &str) -> Result<String, CompileError> {
    let mut text = String::new();
    provider
        .resolve(module)
        .and_then(|mut reader| reader.read_to_string(&mut text))
        .map_err(|source| CompileError::Import {
            module: module.to_string(),
            source,
        })?;
    Ok(text)
}

/// Compiles `text` as module `name` and loads its imports transitively,
/// each module once.
pub fn load_schema_text(
    name: &str,
    text: &str,
    provider: &dyn ImportProvider,
) -> Result<SchemaSet, CompileError> {
    let root = compile_schema(name, text)?;

    let mut seen: BTreeSet<String> = BTreeSet::new();
    seen.insert(name.to_string());
    let mut queue: VecDeque<String> = root.imports.iter().map(|i| i.path.clone()).collect();
    let mut set = SchemaSet::new(root);

    while let Some(module) = queue.pop_front() {
        if !seen.insert(module.clone()) {
            continue;
        }
        debug!(module = %module, "loading import");
        let text = read_module(provider, &module)?;
        let file = compile_schema(&module, &text)?;
        queue.extend(file.imports.iter().map(|i| i.path.clone()));
        set.imports.push(file);
    }

    Ok(set)
}

/// Reads the schema at `path` and loads it with [`load_schema_text`]. The
/// root module is named after the file's base name.
pub fn load_schema(path: &Path, provider: &dyn ImportProvider) -> Result<SchemaSet, CompileError> {
    let text = std::fs::read_to_string(path).map_err(|source| CompileError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    load_schema_text(&name, &text, provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_modules_are_redirected() {
        let provider = FsImportProvider::new("/schemas");
        assert_eq!(
            provider.module_path("google/protobuf/wrappers.proto"),
            PathBuf::from("/schemas/protobuf/src/google/protobuf/wrappers.proto")
        );
        assert_eq!(
            provider.module_path("common/base.proto"),
            PathBuf::from("/schemas/common/base.proto")
        );
    }

    #[test]
    fn fs_provider_falls_back_to_builtin_wrappers() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FsImportProvider::new(dir.path());

        let mut text = String::new();
        provider
            .resolve("google/protobuf/wrappers.proto")
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert!(text.contains("message Int32Value"));

        assert!(provider.resolve("missing.proto").is_err());
    }

    #[test]
    fn fs_provider_prefers_vendored_copy() {
        let dir = tempfile::tempdir().unwrap();
        let vendored = dir.path().join("protobuf/src/google/protobuf");
        std::fs::create_dir_all(&vendored).unwrap();
        std::fs::write(vendored.join("wrappers.proto"), "package google.protobuf; message Int32Value { int32 value = 1; }").unwrap();

        let set = load_schema_text(
            "a.proto",
            "import \"google/protobuf/wrappers.proto\"; message A { google.protobuf.Int32Value v = 1; }",
            &FsImportProvider::new(dir.path()),
        )
        .unwrap();
        assert_eq!(set.imports.len(), 1);
        assert_eq!(set.imports[0].messages.len(), 1);
    }

    #[test]
    fn imports_load_transitively_once() {
        let provider = MemoryImportProvider::new()
            .with_module("b.proto", "import \"c.proto\"; message B { C c = 1; }")
            .with_module("c.proto", "import \"b.proto\"; message C { string s = 1; }");

        let set = load_schema_text(
            "a.proto",
            "import \"b.proto\"; import \"c.proto\"; message A { B b = 1; }",
            &provider,
        )
        .unwrap();

        let names: Vec<&str> = set.imports.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b.proto", "c.proto"]);
    }

    #[test]
    fn unresolved_import_is_reported() {
        let err = load_schema_text(
            "a.proto",
            "import \"nowhere.proto\"; message A { string s = 1; }",
            &MemoryImportProvider::new(),
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::Import { ref module, .. } if module == "nowhere.proto"));
    }
}
