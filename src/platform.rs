//! Platform Policy
//!
//! Pure mapping from the host platform to the paths, executable names and
//! installer invocations that differ between operating systems.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::process::CommandLine;

const INSTALLER_BASE_URL: &str = "https://repo.anaconda.com/miniconda";

/// Operating system family the agent runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux,
    MacOS,
    Windows,
}

impl Platform {
    /// Platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOS
        } else {
            Self::Linux
        }
    }

    pub fn is_windows(self) -> bool {
        self == Self::Windows
    }

    /// Location of the `conda` executable relative to an installation root.
    pub fn executable_subpath(self) -> &'static str {
        if self.is_windows() {
            "Scripts/conda.exe"
        } else {
            "bin/conda"
        }
    }

    /// Absolute path of the `conda` executable under `root`.
    pub fn conda_executable(self, root: &Path) -> PathBuf {
        self.executable_subpath()
            .split('/')
            .fold(root.to_path_buf(), |path, part| path.join(part))
    }

    /// PATH entries that make `conda` and `python` resolvable, in prepend order.
    ///
    /// Windows keeps `python.exe` in the root and `conda.exe` in `Scripts`,
    /// so both are needed there.
    pub fn path_entries(self, root: &Path) -> Vec<PathBuf> {
        if self.is_windows() {
            vec![root.to_path_buf(), root.join("Scripts")]
        } else {
            vec![root.join("bin")]
        }
    }

    /// Download URL of the Miniconda bootstrap installer.
    pub fn installer_url(self) -> String {
        let artifact = match self {
            Self::Linux => "Miniconda3-latest-Linux-x86_64.sh",
            Self::MacOS => "Miniconda3-latest-MacOSX-x86_64.sh",
            Self::Windows => "Miniconda3-latest-Windows-x86_64.exe",
        };
        format!("{}/{}", INSTALLER_BASE_URL, artifact)
    }

    /// Non-interactive installer command that installs into `destination`.
    pub fn installer_command(self, installer: &Path, destination: &Path) -> CommandLine {
        if self.is_windows() {
            CommandLine::new(installer)
                .arg("/S")
                .arg("/AddToPath=0")
                .arg("/RegisterPython=0")
                .arg(format!("/D={}", destination.display()))
        } else {
            CommandLine::new("bash")
                .arg(installer.display().to_string())
                .arg("-b")
                .arg("-f")
                .arg("-p")
                .arg(destination.display().to_string())
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "Linux"),
            Self::MacOS => write!(f, "macOS"),
            Self::Windows => write!(f, "Windows"),
        }
    }
}
