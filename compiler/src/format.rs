use std::io::Write;
use std::process::{Command, Stdio};

use crate::{error::CompileError, traits::Formatter};

/// Pipes source through an external pretty printer (`rustfmt`, `gofmt`)
/// and returns its standard output.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    program: String,
    args:    Vec<String>,
}

impl CommandFormatter {
    pub fn new(program: &str, args: &[&str]) -> CommandFormatter {
        CommandFormatter {
            program: program.to_string(),
            args:    args.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn rustfmt() -> CommandFormatter {
        CommandFormatter::new("rustfmt", &["--edition", "2021", "--emit", "stdout"])
    }

    pub fn gofmt() -> CommandFormatter {
        CommandFormatter::new("gofmt", &[])
    }
}

impl Formatter for CommandFormatter {
    fn format(&self, source: &str) -> Result<String, CompileError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CompileError::Format(format!("failed to run {}: {}", self.program, e)))?;

        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(source.as_bytes()),
            None => Ok(()),
        };
        if let Err(e) = written {
            // reap the child before reporting
            let _ = child.wait_with_output();
            return Err(CompileError::Format(format!("failed to feed {}: {}", self.program, e)));
        }

        let output = child
            .wait_with_output()
            .map_err(|e| CompileError::Format(format!("{} did not finish: {}", self.program, e)))?;
        if !output.status.success() {
            return Err(CompileError::Format(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| CompileError::Format(format!("{} produced invalid UTF-8: {}", self.program, e)))
    }
}

/// Leaves source untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFormatter;

impl Formatter for NoopFormatter {
    fn format(&self, source: &str) -> Result<String, CompileError> {
        Ok(source.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_a_format_error() {
        let formatter = CommandFormatter::new("protoenv-no-such-formatter", &[]);
        assert!(matches!(formatter.format("x"), Err(CompileError::Format(_))));
    }

    #[cfg(unix)]
    #[test]
    fn formatter_exiting_early_is_a_format_error() {
        // `false` exits without reading stdin, so the write may fail with a broken pipe.
        let formatter = CommandFormatter::new("false", &[]);
        let source = "x".repeat(1 << 20);
        assert!(matches!(formatter.format(&source), Err(CompileError::Format(_))));
    }

    #[test]
    fn noop_keeps_text() {
        assert_eq!(NoopFormatter.format("fn a() {}").unwrap(), "fn a() {}");
    }
}
