use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use protoenv_schema::{ProtoFile, TargetId};
use tracing::{debug, info, warn};

use crate::{
    error::CompileError,
    format::{CommandFormatter, NoopFormatter},
    gen_go::GoRenderer,
    gen_rust::RustRenderer,
    imports::{load_schema, FsImportProvider},
    ir::emit_unit,
    parser::parse_schema,
    targets::resolve_targets,
    tokenizer::tokenize_schema,
    traits::{Formatter, Renderer},
    types::SchemaSet,
    verifier::verify_schema,
};

/// Compile one textual schema module into a [`ProtoFile`] with its targets
/// resolved. Imports are not followed; see [`crate::imports::load_schema_text`].
pub fn compile_schema(name: &str, text: &str) -> Result<ProtoFile, CompileError> {
    let tokens = tokenize_schema(text)?;
    let mut file = parse_schema(name, &tokens)?;
    resolve_targets(&mut file);
    Ok(file)
}

/// Output language of the generated loaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Rust,
    Go,
}

impl Language {
    pub fn renderer(self) -> Box<dyn Renderer> {
        match self {
            Language::Rust => Box::new(RustRenderer),
            Language::Go => Box::new(GoRenderer),
        }
    }

    pub fn formatter(self) -> CommandFormatter {
        match self {
            Language::Rust => CommandFormatter::rustfmt(),
            Language::Go => CommandFormatter::gofmt(),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Language, String> {
        match s.to_ascii_lowercase().as_str() {
            "rust" | "rs" => Ok(Language::Rust),
            "go" | "golang" => Ok(Language::Go),
            other => Err(format!("unknown language \"{}\", expected rust or go", other)),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Rust => f.write_str("rust"),
            Language::Go => f.write_str("go"),
        }
    }
}

/// Settings for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    pub language: Language,
    /// Runtime the loaders are generated for; fields and messages that
    /// belong to other runtimes are skipped.
    pub target:   TargetId,
    /// Run the language's formatter over the output.
    pub format:   bool,
}

impl Default for GenerateOptions {
    fn default() -> GenerateOptions {
        GenerateOptions {
            language: Language::Rust,
            target:   TargetId::new("rust"),
            format:   true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub file_name: String,
    pub module:    String,
    pub content:   String,
}

/// `dir/config.proto` with suffix `.pbloader.go` becomes `config.pbloader.go`.
pub fn output_file_name(source: &str, suffix: &str) -> String {
    let base = source.rsplit(['/', '\\']).next().unwrap_or(source);
    let stem = base.strip_suffix(".proto").unwrap_or(base);
    format!("{}{}", stem, suffix)
}

/// Verifies `set`, emits the loader procedures of its root file and renders
/// them. A formatter failure is not fatal: the unformatted text is kept.
pub fn generate(
    set: &SchemaSet,
    renderer: &dyn Renderer,
    formatter: &dyn Formatter,
    target: &TargetId,
) -> Result<GeneratedFile, CompileError> {
    verify_schema(set)?;
    let unit = emit_unit(set, target)?;
    let module = renderer.module_name(&set.root);
    debug!(module = %module, procedures = unit.procedures.len(), "rendering loaders");

    let text = renderer.render(&unit, &module);
    let content = match formatter.format(&text) {
        Ok(formatted) => formatted,
        Err(err) => {
            warn!("failed to format the content, writing unformatted: {}", err);
            text
        }
    };

    Ok(GeneratedFile {
        file_name: output_file_name(&set.root.name, renderer.file_suffix()),
        module,
        content,
    })
}

/// [`generate`] with the renderer and formatter picked by `options`.
pub fn generate_with(set: &SchemaSet, options: &GenerateOptions) -> Result<GeneratedFile, CompileError> {
    let renderer = options.language.renderer();
    if options.format {
        generate(set, renderer.as_ref(), &options.language.formatter(), &options.target)
    } else {
        generate(set, renderer.as_ref(), &NoopFormatter, &options.target)
    }
}

pub fn write_generated(out_dir: &Path, file: &GeneratedFile) -> Result<PathBuf, CompileError> {
    let path = out_dir.join(&file.file_name);
    std::fs::write(&path, &file.content).map_err(|source| CompileError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Loads `schema` with imports resolved under `proto_path`, or under the
/// schema's own directory.
pub fn load_schema_file(schema: &Path, proto_path: Option<&Path>) -> Result<SchemaSet, CompileError> {
    let root = match proto_path {
        Some(dir) => dir.to_path_buf(),
        None => schema.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    load_schema(schema, &FsImportProvider::new(root))
}

/// Loads `schema`, generates its loaders and writes them into `out_dir`.
/// Nothing is written if any step fails.
pub fn run(
    schema: &Path,
    proto_path: Option<&Path>,
    out_dir: &Path,
    options: &GenerateOptions,
) -> Result<PathBuf, CompileError> {
    let set = load_schema_file(schema, proto_path)?;
    let file = generate_with(&set, options)?;
    let path = write_generated(out_dir, &file)?;
    info!(path = %path.display(), language = %options.language, target = %options.target, "wrote loaders");
    Ok(path)
}
