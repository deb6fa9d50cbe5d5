//! Miniconda Installer
//!
//! Downloads the platform's Miniconda bootstrap installer, runs it
//! unattended into the [`DeferredInstallLocation`], and records the result
//! so later lookups (in this step or later ones) find it directly.

use std::path::{Path, PathBuf};

use log::{debug, error, info};

use super::location::DeferredInstallLocation;
use super::locator::CONDA_ROOT_VAR;
use crate::agent::{Agent, Downloader};
use crate::error::{Result, SetupError};
use crate::platform::Platform;
use crate::process::{CommandLine, ProcessRunner};

/// Fallback file name if the installer URL has no final path segment.
const DEFAULT_INSTALLER_NAME: &str = "miniconda-installer";

pub struct Installer<'a> {
    agent: &'a dyn Agent,
    downloader: &'a dyn Downloader,
    runner: &'a dyn ProcessRunner,
    location: &'a DeferredInstallLocation,
}

impl<'a> Installer<'a> {
    pub fn new(
        agent: &'a dyn Agent,
        downloader: &'a dyn Downloader,
        runner: &'a dyn ProcessRunner,
        location: &'a DeferredInstallLocation,
    ) -> Self {
        Self {
            agent,
            downloader,
            runner,
            location,
        }
    }

    /// Downloads the installer into the agent's temp directory.
    ///
    /// The local file keeps the URL's file name: the Windows installer
    /// only runs with its `.exe` extension.
    pub async fn download(&self, platform: Platform) -> Result<PathBuf> {
        let url = platform.installer_url();
        let destination = self.agent.temp_directory().join(installer_file_name(&url));
        self.downloader.download(&url, &destination).await
    }

    /// Runs the installer and returns the new installation root.
    ///
    /// On success the root is published in [`CONDA_ROOT_VAR`]. A failed
    /// installer leaves the variable untouched.
    pub async fn install(&self, installer: &Path, platform: Platform) -> Result<PathBuf> {
        let destination = self.location.get().to_path_buf();
        let command = platform.installer_command(installer, &destination);

        info!("Installing Miniconda to {}", destination.display());
        self.runner.run(&command).await.map_err(|e| {
            error!("Miniconda installer failed: {}", e);
            SetupError::Installation(e.to_string())
        })?;

        self.update_self(&destination, platform).await;

        self.agent
            .set_variable(CONDA_ROOT_VAR, &destination.display().to_string());
        Ok(destination)
    }

    /// Updates conda in the `base` environment.
    ///
    /// Best-effort: this cannot fail. The tool may already be current or the
    /// network may be unavailable, and neither should stop the setup.
    pub async fn update_self(&self, root: &Path, platform: Platform) {
        update_self(self.runner, root, platform).await;
    }
}

/// Runs `conda update --name base conda --yes`, discarding any failure.
pub async fn update_self(runner: &dyn ProcessRunner, root: &Path, platform: Platform) {
    let command = CommandLine::new(platform.conda_executable(root))
        .arg("update")
        .arg("--name")
        .arg("base")
        .arg("conda")
        .arg("--yes");

    match runner.run(&command).await {
        Ok(()) => debug!("conda updated"),
        Err(e) => debug!("Ignoring conda update failure: {}", e),
    }
}

fn installer_file_name(url: &str) -> &str {
    url.rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_INSTALLER_NAME)
}
