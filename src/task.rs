//! Setup Task
//!
//! Runs one setup step end to end:
//! 1. Find an existing Conda installation, or download and install Miniconda
//! 2. Put the installation on PATH
//! 3. Optionally update conda
//! 4. Create and activate a custom environment, or activate `base`
//!
//! Every stage runs to completion before the next starts.

use std::path::PathBuf;

use log::info;

use crate::agent::{Agent, Downloader};
use crate::config::TaskInputs;
use crate::environment::conda::BASE_ENVIRONMENT;
use crate::environment::{
    environment_exists, environment_prefix, environments_dir, prepend_to_path,
    remove_environment, update_self, DeferredInstallLocation, EnvironmentManager, Installer,
    Locator,
};
use crate::error::Result;
use crate::platform::Platform;
use crate::process::ProcessRunner;

/// Collaborators a setup run works through.
pub struct SetupContext<'a> {
    pub agent: &'a dyn Agent,
    pub downloader: &'a dyn Downloader,
    pub runner: &'a dyn ProcessRunner,
    pub location: &'a DeferredInstallLocation,
    pub platform: Platform,
}

/// Result of a successful setup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupOutcome {
    /// Installation root now on PATH.
    pub root: PathBuf,
    /// Whether Miniconda was installed by this run.
    pub installed: bool,
    /// Name of the activated environment.
    pub environment: String,
    /// Prefix of the activated environment.
    pub prefix: PathBuf,
}

/// Runs the setup step described by `inputs`.
pub async fn run_task(inputs: &TaskInputs, ctx: &SetupContext<'_>) -> Result<SetupOutcome> {
    inputs.validate()?;

    let platform = ctx.platform;
    let (root, installed) = match Locator::new(ctx.agent, ctx.location).find_installation(platform)
    {
        Some(root) => (root, false),
        None => {
            let installer = Installer::new(ctx.agent, ctx.downloader, ctx.runner, ctx.location);
            let package = installer.download(platform).await?;
            (installer.install(&package, platform).await?, true)
        }
    };

    prepend_to_path(ctx.agent, &root, platform);

    // A fresh install has just been updated.
    if inputs.update_conda && !installed {
        update_self(ctx.runner, &root, platform).await;
    }

    let manager = EnvironmentManager::new(ctx.agent, ctx.runner);

    let (environment, prefix) = match inputs.custom_environment() {
        Some(name) => {
            let envs_dir = environments_dir(&root);
            let prefix = environment_prefix(&envs_dir, name);

            if inputs.clean_environment {
                remove_environment(&prefix).await?;
            }

            if environment_exists(&prefix) {
                info!("Reusing existing environment {}", prefix.display());
            } else {
                manager
                    .create_environment(
                        &prefix,
                        inputs.package_specs.as_deref(),
                        inputs.create_options.as_deref(),
                    )
                    .await?;
            }

            manager.activate(&envs_dir, name, platform);
            (name.to_string(), prefix)
        }
        None => {
            if let Some(specs) = inputs.package_specs.as_deref() {
                manager
                    .install_packages(specs, inputs.install_options.as_deref())
                    .await?;
            }

            manager.activate_base(&root);
            (BASE_ENVIRONMENT.to_string(), root.clone())
        }
    };

    Ok(SetupOutcome {
        root,
        installed,
        environment,
        prefix,
    })
}
