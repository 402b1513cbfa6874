//! Invocation of short-lived external command-line tools.
//!
//! Every call is logged with its full command line. A tool that is not
//! installed is reported as `ToolError::Missing` so callers can tell an
//! absent backend apart from one that ran and failed.

use std::fmt;
use std::io;
use std::process::{Command, ExitStatus, Stdio};

#[derive(Debug)]
pub enum ToolError {
    /// The program is not installed (or not on `PATH`).
    Missing(String),
    /// The program ran and exited unsuccessfully.
    Failed { program: String, status: ExitStatus },
    Io { program: String, source: io::Error },
}

impl ToolError {
    pub fn is_missing(&self) -> bool {
        matches!(self, ToolError::Missing(_))
    }

    fn from_io(program: &str, e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::NotFound {
            ToolError::Missing(program.to_string())
        } else {
            ToolError::Io { program: program.to_string(), source: e }
        }
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolError::Missing(program) => write!(f, "{} not found", program),
            ToolError::Failed { program, status } => write!(f, "{} failed ({})", program, status),
            ToolError::Io { program, source } => write!(f, "{}: {}", program, source),
        }
    }
}

impl std::error::Error for ToolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ToolError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Space-joined command line, for logs.
pub fn command_line<S: AsRef<str>>(program: &str, args: &[S]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg.as_ref());
    }
    line
}

/// Run a tool to completion, discarding its output.
pub fn run_tool<S: AsRef<str>>(program: &str, args: &[S]) -> Result<(), ToolError> {
    log::debug!(target: "tools", "{}", command_line(program, args));
    let status = Command::new(program)
        .args(args.iter().map(|a| a.as_ref()))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| ToolError::from_io(program, e))?;
    if status.success() {
        Ok(())
    } else {
        Err(ToolError::Failed { program: program.to_string(), status })
    }
}

/// Run a tool and capture its stdout (lossily decoded).
pub fn tool_output<S: AsRef<str>>(program: &str, args: &[S]) -> Result<String, ToolError> {
    log::debug!(target: "tools", "{}", command_line(program, args));
    let output = Command::new(program)
        .args(args.iter().map(|a| a.as_ref()))
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| ToolError::from_io(program, e))?;
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Err(ToolError::Failed { program: program.to_string(), status: output.status })
    }
}

/// Fire-and-forget: run a tool and log (not return) any failure.
pub fn run_logged<S: AsRef<str>>(program: &str, args: &[S]) {
    if let Err(e) = run_tool(program, args) {
        log::warn!(target: "tools", "{}: {}", command_line(program, args), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_joins_args() {
        assert_eq!(
            command_line("midisend", &["1", "0", "80", "1"]),
            "midisend 1 0 80 1"
        );
        assert_eq!(command_line::<&str>("aconnect", &[]), "aconnect");
    }

    #[test]
    fn missing_program_is_distinguished() {
        let err = run_tool("pedalboard-no-such-tool", &["--list"]).unwrap_err();
        assert!(err.is_missing());
    }

    #[test]
    fn failing_program_reports_status() {
        let err = run_tool::<&str>("false", &[]).unwrap_err();
        assert!(matches!(err, ToolError::Failed { .. }));
    }

    #[test]
    fn output_is_captured() {
        let out = tool_output("echo", &["card 0: PCH"]).unwrap();
        assert_eq!(out.trim(), "card 0: PCH");
    }
}
