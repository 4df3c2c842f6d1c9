use std::io::Read;

use protoenv_schema::ProtoFile;

use crate::error::CompileError;
use crate::ir::LoaderUnit;

/// Looks up imported `.proto` modules by their import path.
pub trait ImportProvider {
    fn resolve(&self, module: &str) -> Result<Box<dyn Read + '_>, std::io::Error>;
}

/// Prints a [`LoaderUnit`] as source code of one output language.
pub trait Renderer {
    /// Suffix replacing the `.proto` extension of the schema file name.
    fn file_suffix(&self) -> &'static str;

    /// File option naming the output module.
    fn package_option(&self) -> &'static str;

    /// Output module name for `file`.
    fn module_name(&self, file: &ProtoFile) -> String;

    fn render(&self, unit: &LoaderUnit, module: &str) -> String;
}

/// Pretty-prints rendered source.
pub trait Formatter {
    fn format(&self, source: &str) -> Result<String, CompileError>;
}
