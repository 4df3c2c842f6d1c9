use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use std::process::ExitCode;

use protoenv_compiler::{load_schema_file, run, CompileError, GenerateOptions, Language};
use protoenv_schema::TargetId;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "protoenv-gen", version)]
#[command(about = "Parse a proto schema and generate environment-variable loaders for its messages", long_about = None)]
struct Cli {
    /// Input `.proto` schema
    schema: Option<PathBuf>,

    /// Directory the generated `<name>.pbloader.<ext>` file is written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Import root; `google/protobuf/` imports are read from `<DIR>/protobuf/src/`
    /// (defaults to the schema's directory)
    #[arg(short = 'I', long)]
    proto_path: Option<PathBuf>,

    /// Output language: rust or go
    #[arg(short, long, default_value = "rust")]
    lang: Language,

    /// Runtime to generate for; fields and messages of other runtimes are skipped
    #[arg(short, long, env = "PROTOENV_TARGET", default_value = "rust")]
    target: String,

    /// Write the generated code without running rustfmt / gofmt
    #[arg(long)]
    no_format: bool,

    /// Print the loaded schema as JSON instead of generating code
    #[arg(long)]
    dump_schema: bool,

    /// More logging (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// What a successful invocation did.
#[derive(Debug, PartialEq)]
enum Outcome {
    Usage,
    Dumped(String),
    Generated(PathBuf),
}

fn execute(cli: &Cli) -> Result<Outcome, CompileError> {
    let Some(schema) = &cli.schema else {
        return Ok(Outcome::Usage);
    };

    if cli.dump_schema {
        let set = load_schema_file(schema, cli.proto_path.as_deref())?;
        let json = serde_json::to_string_pretty(&set).map_err(|e| CompileError::Io(e.into()))?;
        return Ok(Outcome::Dumped(json));
    }

    let options = GenerateOptions {
        language: cli.lang,
        target:   TargetId::new(&cli.target),
        format:   !cli.no_format,
    };
    debug!(?options, schema = %schema.display(), "generating");
    let path = run(schema, cli.proto_path.as_deref(), &cli.out_dir, &options)?;
    Ok(Outcome::Generated(path))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match execute(&cli) {
        Ok(Outcome::Usage) => {
            let _ = Cli::command().print_help();
            println!();
            ExitCode::SUCCESS
        }
        Ok(Outcome::Dumped(json)) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Ok(Outcome::Generated(path)) => {
            println!("Generated {}", path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SCHEMA: &str = r#"
        syntax = "proto3";
        option go_package = "github.com/acme/config";
        import "google/protobuf/wrappers.proto";
        message Agent { string name = 1; google.protobuf.BoolValue enabled = 2; }
    "#;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("protoenv-gen").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = cli(&[]);
        assert_eq!(cli.schema, None);
        assert_eq!(cli.out_dir, PathBuf::from("."));
        assert_eq!(cli.lang, Language::Rust);
        assert!(!cli.no_format);
        assert_eq!(execute(&cli).unwrap(), Outcome::Usage);
    }

    #[test]
    fn test_rejects_unknown_language() {
        assert!(Cli::try_parse_from(["protoenv-gen", "--lang", "cobol", "a.proto"]).is_err());
    }

    #[test]
    fn test_generates_go() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("agent.proto");
        fs::write(&schema, SCHEMA).unwrap();
        let out = dir.path().to_str().unwrap();

        let cli = cli(&["-o", out, "--lang", "go", "--target", "go", "--no-format", schema.to_str().unwrap()]);
        let outcome = execute(&cli).unwrap();
        let path = dir.path().join("agent.pbloader.go");
        assert_eq!(outcome, Outcome::Generated(path.clone()));

        let code = fs::read_to_string(path).unwrap();
        assert!(code.contains("package config\n"));
        assert!(code.contains("func (x *Agent) loadFromEnv(prefix string, defaultValues *Agent) error {"));
    }

    #[test]
    fn test_dump_schema() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("agent.proto");
        fs::write(&schema, SCHEMA).unwrap();

        let cli = cli(&["--dump-schema", schema.to_str().unwrap()]);
        match execute(&cli).unwrap() {
            Outcome::Dumped(json) => {
                let value: serde_json::Value = serde_json::from_str(&json).unwrap();
                assert_eq!(value["root"]["messages"][0]["name"], "Agent");
                assert_eq!(value["imports"][0]["name"], "google/protobuf/wrappers.proto");
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(!dir.path().join("agent.pbloader.rs").exists());
    }

    #[test]
    fn test_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("bad.proto");
        fs::write(&schema, "message Bad { map<string, int32> counts = 1; }").unwrap();

        let cli = cli(&["-o", dir.path().to_str().unwrap(), "--no-format", schema.to_str().unwrap()]);
        let err = execute(&cli).unwrap_err();
        assert!(err.to_string().contains("counts"));
        assert!(!dir.path().join("bad.pbloader.rs").exists());
    }
}
