//! protoenv-compiler
//!
//! This crate implements:
//!  1) A tokenizer + parser for the proto3 subset used by configuration schemas,
//!  2) Import loading, with `google/protobuf/` modules redirected to a vendored tree,
//!  3) Target resolution (`(targets)` options and `<runtime>agent` names),
//!  4) A schema verifier (duplicate types and fields, undefined types, recursive nesting),
//!  5) Field classification and loader procedure emission (`ir`),
//!  6) Rust and Go renderers plus external formatters,
//!  7) An interpreter for loader procedures over dynamic values (`eval`),
//!  8) Error types (`CompileError`).

pub mod classify;
pub mod compiler;
pub mod error;
pub mod eval;
pub mod format;
pub mod gen_go;
pub mod gen_rust;
pub mod imports;
pub mod ir;
pub mod naming;
pub mod parser;
pub mod targets;
pub mod tokenizer;
pub mod traits;
pub mod types;
pub mod utils;
pub mod verifier;

pub use compiler::{compile_schema, generate, generate_with, load_schema_file, run, GenerateOptions, GeneratedFile, Language};
pub use error::CompileError;
pub use imports::{load_schema, load_schema_text, FsImportProvider, MemoryImportProvider};
pub use ir::{emit_unit, LoaderUnit};
pub use types::SchemaSet;
