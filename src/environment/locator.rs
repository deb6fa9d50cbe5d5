//! Installation Locator
//!
//! Finds an existing Conda installation root. Candidate sources are tried
//! in [`SEARCH_ORDER`] and the first match wins; later sources are not
//! consulted at all once one matches.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::location::DeferredInstallLocation;
use crate::agent::Agent;
use crate::platform::Platform;

/// Variable naming the Conda installation root.
pub const CONDA_ROOT_VAR: &str = "CONDA";

/// Executable name looked up on PATH.
pub const CONDA_EXECUTABLE: &str = "conda";

/// Places an installation root may come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    /// A `conda` executable already resolvable on PATH.
    Path,
    /// The [`CONDA_ROOT_VAR`] variable.
    EnvironmentVariable,
    /// The [`DeferredInstallLocation`] of a previous fresh install.
    DeferredLocation,
}

/// Order in which candidate sources are searched.
pub const SEARCH_ORDER: [CandidateSource; 3] = [
    CandidateSource::Path,
    CandidateSource::EnvironmentVariable,
    CandidateSource::DeferredLocation,
];

/// Whether `dir` holds the platform's `conda` executable as a regular file.
///
/// Any filesystem error counts as "no installation".
pub fn has_installation(dir: &Path, platform: Platform) -> bool {
    fs::metadata(platform.conda_executable(dir))
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

/// Validates candidate installation roots.
pub trait InstallCheck: Send + Sync {
    fn has_installation(&self, dir: &Path, platform: Platform) -> bool;
}

/// Looks for the executable on the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskCheck;

impl InstallCheck for DiskCheck {
    fn has_installation(&self, dir: &Path, platform: Platform) -> bool {
        has_installation(dir, platform)
    }
}

/// Searches the candidate sources for an installation root.
pub struct Locator<'a> {
    agent: &'a dyn Agent,
    location: &'a DeferredInstallLocation,
    check: &'a dyn InstallCheck,
}

impl<'a> Locator<'a> {
    pub fn new(agent: &'a dyn Agent, location: &'a DeferredInstallLocation) -> Self {
        Self::with_check(agent, location, &DiskCheck)
    }

    pub fn with_check(
        agent: &'a dyn Agent,
        location: &'a DeferredInstallLocation,
        check: &'a dyn InstallCheck,
    ) -> Self {
        Self {
            agent,
            location,
            check,
        }
    }

    /// Returns the first installation root found, or `None` if there is none.
    pub fn find_installation(&self, platform: Platform) -> Option<PathBuf> {
        let found = SEARCH_ORDER.iter().find_map(|&source| {
            self.candidate(source, platform)
                .map(|root| (source, root))
        });

        match found {
            Some((source, root)) => {
                info!("Found Conda at {} (via {:?})", root.display(), source);
                Some(root)
            }
            None => {
                info!("No existing Conda installation found");
                None
            }
        }
    }

    fn candidate(&self, source: CandidateSource, platform: Platform) -> Option<PathBuf> {
        match source {
            CandidateSource::Path => {
                let executable = self.agent.resolve_on_path(CONDA_EXECUTABLE)?;
                debug!("conda resolved on PATH: {}", executable.display());
                root_from_executable(&executable)
            }
            CandidateSource::EnvironmentVariable => {
                let dir = PathBuf::from(self.agent.get_variable(CONDA_ROOT_VAR)?);
                self.validated(dir, platform)
            }
            CandidateSource::DeferredLocation => {
                self.validated(self.location.get().to_path_buf(), platform)
            }
        }
    }

    fn validated(&self, dir: PathBuf, platform: Platform) -> Option<PathBuf> {
        if self.check.has_installation(&dir, platform) {
            Some(dir)
        } else {
            debug!("No conda executable under {}", dir.display());
            None
        }
    }
}

/// Installation root of a `conda` executable found on PATH.
///
/// Assumes the executable sits in a directory directly under the root
/// (`bin/conda`, `Scripts/conda.exe`, `condabin/conda`); this is not
/// verified against the filesystem.
pub fn root_from_executable(executable: &Path) -> Option<PathBuf> {
    executable
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
}
