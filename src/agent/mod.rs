//! Build Agent Integration
//!
//! The setup flow talks to the build agent only through the [`Agent`] and
//! [`Downloader`] traits. [`PipelineAgent`] is the production implementation:
//! it publishes state to later pipeline steps with logging commands written
//! to stdout and mirrors the same changes into this process's environment.

pub mod download;

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use log::{debug, warn};

pub use download::{Downloader, HttpDownloader};

/// Agent variable holding the agent-scoped tool cache directory.
pub const TOOLS_DIRECTORY_VAR: &str = "AGENT_TOOLSDIRECTORY";

/// Agent variable holding the agent-scoped temporary directory.
pub const TEMP_DIRECTORY_VAR: &str = "AGENT_TEMPDIRECTORY";

/// Capabilities the build agent provides to a task.
pub trait Agent: Send + Sync {
    /// Resolves an executable name against the current PATH.
    fn resolve_on_path(&self, executable: &str) -> Option<PathBuf>;

    /// Reads a variable; empty values count as unset.
    fn get_variable(&self, name: &str) -> Option<String>;

    /// Sets a variable for this step and every later step in the job.
    fn set_variable(&self, name: &str, value: &str);

    fn temp_directory(&self) -> PathBuf;

    fn tools_directory(&self) -> PathBuf;

    /// Prepends an entry to PATH for this step and every later step.
    fn prepend_path(&self, entry: &Path);
}

/// Agent backed by the real process environment and the pipeline's
/// stdout logging-command channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct PipelineAgent;

impl Agent for PipelineAgent {
    fn resolve_on_path(&self, executable: &str) -> Option<PathBuf> {
        match which::which(executable) {
            Ok(path) => Some(path),
            Err(e) => {
                debug!("'{}' not found on PATH: {}", executable, e);
                None
            }
        }
    }

    fn get_variable(&self, name: &str) -> Option<String> {
        env::var(name).ok().filter(|value| !value.is_empty())
    }

    fn set_variable(&self, name: &str, value: &str) {
        println!("{}", set_variable_command(name, value));
        env::set_var(name, value);
    }

    fn temp_directory(&self) -> PathBuf {
        self.get_variable(TEMP_DIRECTORY_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir)
    }

    fn tools_directory(&self) -> PathBuf {
        if let Some(dir) = self.get_variable(TOOLS_DIRECTORY_VAR) {
            return PathBuf::from(dir);
        }

        // Outside a pipeline, keep tools in a per-user directory.
        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        let dir = PathBuf::from(home).join(".condasetup").join("tools");
        debug!(
            "{} is not set, using {}",
            TOOLS_DIRECTORY_VAR,
            dir.display()
        );
        dir
    }

    fn prepend_path(&self, entry: &Path) {
        println!("{}", prepend_path_command(entry));

        match prepended_path_value(env::var_os("PATH"), entry) {
            Ok(path) => env::set_var("PATH", path),
            Err(e) => warn!("Could not add {} to PATH: {}", entry.display(), e),
        }
    }
}

/// `##vso[task.setvariable]` command publishing `name=value`.
pub fn set_variable_command(name: &str, value: &str) -> String {
    format!(
        "##vso[task.setvariable variable={}]{}",
        escape_property(name),
        escape_data(value)
    )
}

/// `##vso[task.prependpath]` command publishing a PATH entry.
pub fn prepend_path_command(entry: &Path) -> String {
    format!(
        "##vso[task.prependpath]{}",
        escape_data(&entry.display().to_string())
    )
}

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%AZP25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(value: &str) -> String {
    escape_data(value).replace(']', "%5D").replace(';', "%3B")
}

/// Builds the PATH value with `entry` placed first.
fn prepended_path_value(
    current: Option<OsString>,
    entry: &Path,
) -> Result<OsString, env::JoinPathsError> {
    let mut entries = vec![entry.to_path_buf()];
    if let Some(current) = current {
        entries.extend(env::split_paths(&current));
    }
    env::join_paths(entries)
}
