//! Recording fakes for the agent, downloader and process runner.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::agent::{Agent, Downloader};
use crate::error::Result;
use crate::process::{CommandLine, ProcessError, ProcessRunner};

#[derive(Default)]
struct AgentState {
    on_path: HashMap<String, PathBuf>,
    variables: HashMap<String, String>,
    published: Vec<(String, String)>,
    prepended: Vec<PathBuf>,
    calls: Vec<String>,
}

/// In-memory agent that records every interaction.
pub struct FakeAgent {
    temp: PathBuf,
    tools: PathBuf,
    state: Mutex<AgentState>,
}

impl FakeAgent {
    pub fn new(temp: impl Into<PathBuf>, tools: impl Into<PathBuf>) -> Self {
        Self {
            temp: temp.into(),
            tools: tools.into(),
            state: Mutex::new(AgentState::default()),
        }
    }

    pub fn with_on_path(self, executable: &str, path: impl Into<PathBuf>) -> Self {
        self.state
            .lock()
            .unwrap()
            .on_path
            .insert(executable.to_string(), path.into());
        self
    }

    pub fn with_variable(self, name: &str, value: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .variables
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Variables set through [`Agent::set_variable`], in call order.
    pub fn published(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().published.clone()
    }

    /// Entries passed to [`Agent::prepend_path`], in call order.
    pub fn prepended(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().prepended.clone()
    }

    /// Names of the agent methods called, in order.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

impl Agent for FakeAgent {
    fn resolve_on_path(&self, executable: &str) -> Option<PathBuf> {
        self.record(format!("resolve_on_path:{}", executable));
        self.state.lock().unwrap().on_path.get(executable).cloned()
    }

    fn get_variable(&self, name: &str) -> Option<String> {
        self.record(format!("get_variable:{}", name));
        self.state
            .lock()
            .unwrap()
            .variables
            .get(name)
            .filter(|v| !v.is_empty())
            .cloned()
    }

    fn set_variable(&self, name: &str, value: &str) {
        self.record(format!("set_variable:{}", name));
        let mut state = self.state.lock().unwrap();
        state.variables.insert(name.to_string(), value.to_string());
        state.published.push((name.to_string(), value.to_string()));
    }

    fn temp_directory(&self) -> PathBuf {
        self.record("temp_directory".to_string());
        self.temp.clone()
    }

    fn tools_directory(&self) -> PathBuf {
        self.record("tools_directory".to_string());
        self.tools.clone()
    }

    fn prepend_path(&self, entry: &Path) {
        self.record("prepend_path".to_string());
        self.state.lock().unwrap().prepended.push(entry.to_path_buf());
    }
}

/// Process runner that records commands instead of running them.
///
/// A command fails when any of its arguments (or its program) equals one
/// of the configured failure triggers.
#[derive(Default)]
pub struct FakeRunner {
    commands: Mutex<Vec<CommandLine>>,
    fail_on: Vec<String>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(trigger: &str) -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            fail_on: vec![trigger.to_string()],
        }
    }

    pub fn commands(&self) -> Vec<CommandLine> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessRunner for FakeRunner {
    async fn run(&self, command: &CommandLine) -> std::result::Result<(), ProcessError> {
        self.commands.lock().unwrap().push(command.clone());

        let program = command.program().display().to_string();
        let triggered = self
            .fail_on
            .iter()
            .any(|t| *t == program || command.args().iter().any(|a| a == t));

        if triggered {
            return Err(ProcessError::NonZeroExit {
                program,
                code: Some(1),
                output: format!("simulated failure running {}", command),
            });
        }
        Ok(())
    }
}

/// Downloader that records requests and writes nothing.
#[derive(Default)]
pub struct FakeDownloader {
    requests: Mutex<Vec<(String, PathBuf)>>,
}

impl FakeDownloader {
    pub fn requests(&self) -> Vec<(String, PathBuf)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Downloader for FakeDownloader {
    async fn download(&self, url: &str, destination: &Path) -> Result<PathBuf> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), destination.to_path_buf()));
        Ok(destination.to_path_buf())
    }
}

/// Creates the platform's `conda` executable under `root`.
pub fn make_installation(root: &Path, platform: crate::Platform) {
    let exe = platform.conda_executable(root);
    std::fs::create_dir_all(exe.parent().unwrap()).unwrap();
    std::fs::write(exe, b"").unwrap();
}
