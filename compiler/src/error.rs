use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unable to open the proto file {}: {source}", path.display())]
    Open {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error at line {line}, column {column}: {msg}")]
    ParseError {
        msg:    String,
        line:   usize,
        column: usize,
    },

    #[error("Unable to resolve import \"{module}\": {source}")]
    Import {
        module: String,
        source: std::io::Error,
    },

    #[error("Verifier error: {0}")]
    VerifierError(String),

    #[error(
        "Field \"{field}\" of message \"{message}\" has unsupported map type map<{key},{value}>, \
         only map<string,string> can be loaded"
    )]
    UnsupportedMap {
        message: String,
        field:   String,
        key:     String,
        value:   String,
    },

    #[error("Field \"{field}\" of message \"{message}\" has unsupported type \"{type_name}\"")]
    UnsupportedType {
        message:   String,
        field:     String,
        type_name: String,
    },

    #[error(
        "Fields \"{first}\" and \"{second}\" of message \"{message}\" both map to environment variable suffix {env}"
    )]
    DuplicateEnvVar {
        message: String,
        env:     String,
        first:   String,
        second:  String,
    },

    #[error("Failed to format generated code: {0}")]
    Format(String),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path:   PathBuf,
        source: std::io::Error,
    },
}
