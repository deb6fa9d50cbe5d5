//! External Process Execution
//!
//! Every external tool (the Miniconda installer, `conda` itself) runs through
//! [`ProcessRunner`] so that the setup flow can be exercised without
//! spawning real processes.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, error};
use thiserror::Error;
use tokio::process::Command;

/// A failed external command.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with code {code:?}: {output}")]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        output: String,
    },
}

/// A program plus its ordered argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    /// Appends a single argument, kept intact even if it contains spaces.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends a free-form argument line such as `"numpy=1.2 scipy"`.
    ///
    /// The line is split on whitespace; double quotes group words into one
    /// argument.
    pub fn line(mut self, line: &str) -> Self {
        self.args.extend(split_argument_line(line));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program.display().to_string()))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(arg: &str) -> String {
    if arg.is_empty() || arg.contains(char::is_whitespace) {
        format!("\"{}\"", arg)
    } else {
        arg.to_string()
    }
}

/// Splits an argument line on whitespace, honoring double-quoted groups.
pub fn split_argument_line(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if has_token {
        args.push(current);
    }
    args
}

/// Runs external commands to completion.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs `command` and waits for it; a nonzero exit is an error.
    async fn run(&self, command: &CommandLine) -> Result<(), ProcessError>;
}

/// Runs commands as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, command: &CommandLine) -> Result<(), ProcessError> {
        let program = command.program().display().to_string();
        debug!("Running: {}", command);

        let output = Command::new(command.program())
            .args(command.args())
            .output()
            .await
            .map_err(|source| ProcessError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            debug!("{} output:\n{}", program, stdout);
        }

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = if stderr.trim().is_empty() {
            stdout.trim().to_string()
        } else {
            stderr.trim().to_string()
        };

        error!(
            "'{}' failed with exit code: {:?}",
            program,
            output.status.code()
        );

        Err(ProcessError::NonZeroExit {
            program,
            code: output.status.code(),
            output: detail,
        })
    }
}
