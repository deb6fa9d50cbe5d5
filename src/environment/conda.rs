//! Conda Environment Management
//!
//! Creates isolated environments by prefix and activates them for the rest
//! of the pipeline job.
//!
//! # Activation
//!
//! `conda activate` is a shell hook: its effects die with the shell that
//! ran it, while later pipeline steps run as separate processes. Activation
//! is therefore reproduced by publishing PATH entries and the variables in
//! [`ACTIVATION_VARIABLES`] through the agent.
//!
//! Only `CONDA_DEFAULT_ENV` and `CONDA_PREFIX` are reproduced; they have been
//! stable across conda releases. The hook sets other variables too, and a
//! conda release that starts depending on a new one will not be noticed
//! here. Adding a key changes what later steps see and must be done
//! deliberately, together with the pinned test below.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, error, info};

use super::locator::CONDA_EXECUTABLE;
use super::path::prepend_to_path;
use crate::agent::Agent;
use crate::error::{Result, SetupError};
use crate::platform::Platform;
use crate::process::{CommandLine, ProcessRunner};

/// Name of the active environment.
pub const CONDA_DEFAULT_ENV: &str = "CONDA_DEFAULT_ENV";

/// Prefix of the active environment.
pub const CONDA_PREFIX: &str = "CONDA_PREFIX";

/// Every variable activation publishes, in publish order.
pub const ACTIVATION_VARIABLES: [&str; 2] = [CONDA_DEFAULT_ENV, CONDA_PREFIX];

/// Environments directory name under an installation root.
pub const ENVS_DIR_NAME: &str = "envs";

/// Name of the root environment of an installation.
pub const BASE_ENVIRONMENT: &str = "base";

/// `<root>/envs`
pub fn environments_dir(root: &Path) -> PathBuf {
    root.join(ENVS_DIR_NAME)
}

/// Prefix of the environment `name` inside `envs_dir`.
pub fn environment_prefix(envs_dir: &Path, name: &str) -> PathBuf {
    envs_dir.join(name)
}

/// Key/value pairs published on activation.
pub fn activation_variables(name: &str, prefix: &Path) -> [(&'static str, String); 2] {
    [
        (CONDA_DEFAULT_ENV, name.to_string()),
        (CONDA_PREFIX, prefix.display().to_string()),
    ]
}

/// Whether an environment prefix exists as a directory.
pub fn environment_exists(prefix: &Path) -> bool {
    prefix.is_dir()
}

/// Deletes an environment prefix. A missing prefix is not an error.
pub async fn remove_environment(prefix: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(prefix).await {
        Ok(()) => {
            info!("Removed environment {}", prefix.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Environment {} does not exist", prefix.display());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Creates and activates conda environments.
///
/// `conda` must already be resolvable on PATH.
pub struct EnvironmentManager<'a> {
    agent: &'a dyn Agent,
    runner: &'a dyn ProcessRunner,
}

impl<'a> EnvironmentManager<'a> {
    pub fn new(agent: &'a dyn Agent, runner: &'a dyn ProcessRunner) -> Self {
        Self { agent, runner }
    }

    /// Creates an environment at `prefix`.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Directory of the new environment
    /// * `package_specs` - Space-separated specs, e.g. `"numpy=1.2 scipy"`
    /// * `other_options` - Extra `conda create` flags, passed through as-is
    pub async fn create_environment(
        &self,
        prefix: &Path,
        package_specs: Option<&str>,
        other_options: Option<&str>,
    ) -> Result<()> {
        let mut command = CommandLine::new(CONDA_EXECUTABLE)
            .arg("create")
            .arg("--quiet")
            .arg("--prefix")
            .arg(prefix.display().to_string())
            .arg("--mkdir")
            .arg("--yes");

        if let Some(specs) = package_specs {
            command = command.line(specs);
        }
        if let Some(options) = other_options {
            command = command.line(options);
        }

        info!("Creating environment {}", prefix.display());
        self.runner.run(&command).await.map_err(|e| {
            error!("Failed to create environment '{}': {}", prefix.display(), e);
            SetupError::Creation {
                prefix: prefix.to_path_buf(),
                message: e.to_string(),
            }
        })
    }

    /// Installs packages into the `base` environment.
    pub async fn install_packages(
        &self,
        package_specs: &str,
        install_options: Option<&str>,
    ) -> Result<()> {
        let mut command = CommandLine::new(CONDA_EXECUTABLE)
            .arg("install")
            .arg("--quiet")
            .arg("--name")
            .arg(BASE_ENVIRONMENT)
            .arg("--yes")
            .line(package_specs);

        if let Some(options) = install_options {
            command = command.line(options);
        }

        info!("Installing packages into base: {}", package_specs);
        self.runner
            .run(&command)
            .await
            .map_err(|e| SetupError::PackageInstall(e.to_string()))
    }

    /// Activates `envs_dir/name` for this and all later steps.
    pub fn activate(&self, envs_dir: &Path, name: &str, platform: Platform) {
        let prefix = environment_prefix(envs_dir, name);
        prepend_to_path(self.agent, &prefix, platform);
        self.publish_activation(name, &prefix);
    }

    /// Marks the installation's own `base` environment as active.
    ///
    /// PATH is expected to already point at `root`.
    pub fn activate_base(&self, root: &Path) {
        self.publish_activation(BASE_ENVIRONMENT, root);
    }

    fn publish_activation(&self, name: &str, prefix: &Path) {
        for (key, value) in activation_variables(name, prefix) {
            self.agent.set_variable(key, &value);
        }
        info!("Activated environment '{}' at {}", name, prefix.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeAgent, FakeRunner};
    use tempfile::tempdir;

    #[test]
    fn test_activation_variable_contract() {
        // Later pipeline steps read exactly these keys.
        assert_eq!(ACTIVATION_VARIABLES, ["CONDA_DEFAULT_ENV", "CONDA_PREFIX"]);

        let vars = activation_variables("foo", Path::new("/envs/foo"));
        assert_eq!(
            vars,
            [
                ("CONDA_DEFAULT_ENV", "foo".to_string()),
                ("CONDA_PREFIX", "/envs/foo".to_string()),
            ]
        );
    }

    #[test]
    fn test_environment_prefix() {
        assert_eq!(
            environment_prefix(&environments_dir(Path::new("/opt/conda")), "foo"),
            PathBuf::from("/opt/conda/envs/foo")
        );
    }

    #[tokio::test]
    async fn test_create_environment_argument_order() {
        let agent = FakeAgent::new("/tmp", "/tools");
        let runner = FakeRunner::new();
        let manager = EnvironmentManager::new(&agent, &runner);

        manager
            .create_environment(
                Path::new("/tmp/envs/foo"),
                Some("numpy=1.2 scipy"),
                Some("--override-channels"),
            )
            .await
            .unwrap();

        let commands = runner.commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].program(), Path::new("conda"));
        assert_eq!(
            commands[0].args(),
            [
                "create",
                "--quiet",
                "--prefix",
                "/tmp/envs/foo",
                "--mkdir",
                "--yes",
                "numpy=1.2",
                "scipy",
                "--override-channels",
            ]
        );
        assert!(agent.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_environment_without_extras() {
        let agent = FakeAgent::new("/tmp", "/tools");
        let runner = FakeRunner::new();
        let manager = EnvironmentManager::new(&agent, &runner);

        manager
            .create_environment(Path::new("/envs/bare"), None, None)
            .await
            .unwrap();

        assert_eq!(
            runner.commands()[0].to_string(),
            "conda create --quiet --prefix /envs/bare --mkdir --yes"
        );
    }

    #[tokio::test]
    async fn test_create_environment_failure_names_prefix() {
        let agent = FakeAgent::new("/tmp", "/tools");
        let runner = FakeRunner::failing_on("create");
        let manager = EnvironmentManager::new(&agent, &runner);

        let err = manager
            .create_environment(Path::new("/tmp/envs/foo"), Some("numpy"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, SetupError::Creation { .. }));
        let text = err.to_string();
        assert!(text.contains("/tmp/envs/foo"));
        assert!(text.contains("simulated failure"));
    }

    #[tokio::test]
    async fn test_install_packages_into_base() {
        let agent = FakeAgent::new("/tmp", "/tools");
        let runner = FakeRunner::new();
        let manager = EnvironmentManager::new(&agent, &runner);

        manager
            .install_packages("pytest=7", Some("--channel conda-forge"))
            .await
            .unwrap();

        assert_eq!(
            runner.commands()[0].args(),
            [
                "install",
                "--quiet",
                "--name",
                "base",
                "--yes",
                "pytest=7",
                "--channel",
                "conda-forge",
            ]
        );
    }

    #[tokio::test]
    async fn test_install_packages_failure() {
        let agent = FakeAgent::new("/tmp", "/tools");
        let runner = FakeRunner::failing_on("install");
        let manager = EnvironmentManager::new(&agent, &runner);

        let err = manager.install_packages("pytest", None).await.unwrap_err();
        assert!(matches!(err, SetupError::PackageInstall(_)));
    }

    #[test]
    fn test_activate_windows() {
        let agent = FakeAgent::new("/tmp", "/tools");
        let runner = FakeRunner::new();
        let manager = EnvironmentManager::new(&agent, &runner);
        let envs_dir = Path::new("C:/Miniconda/envs");

        manager.activate(envs_dir, "foo", Platform::Windows);

        let prefix = envs_dir.join("foo");
        assert_eq!(agent.prepended(), vec![prefix.clone(), prefix.join("Scripts")]);
        assert_eq!(
            agent.published(),
            vec![
                ("CONDA_DEFAULT_ENV".to_string(), "foo".to_string()),
                ("CONDA_PREFIX".to_string(), prefix.display().to_string()),
            ]
        );
    }

    #[test]
    fn test_activate_linux_path_before_variables() {
        let agent = FakeAgent::new("/tmp", "/tools");
        let runner = FakeRunner::new();
        let manager = EnvironmentManager::new(&agent, &runner);

        manager.activate(Path::new("/opt/conda/envs"), "py311", Platform::Linux);

        assert_eq!(
            agent.prepended(),
            vec![PathBuf::from("/opt/conda/envs/py311/bin")]
        );
        assert_eq!(
            agent.calls(),
            vec![
                "prepend_path",
                "set_variable:CONDA_DEFAULT_ENV",
                "set_variable:CONDA_PREFIX",
            ]
        );
    }

    #[test]
    fn test_activate_base_publishes_root() {
        let agent = FakeAgent::new("/tmp", "/tools");
        let runner = FakeRunner::new();
        let manager = EnvironmentManager::new(&agent, &runner);

        manager.activate_base(Path::new("/opt/conda"));

        assert!(agent.prepended().is_empty());
        assert_eq!(
            agent.published(),
            vec![
                ("CONDA_DEFAULT_ENV".to_string(), "base".to_string()),
                ("CONDA_PREFIX".to_string(), "/opt/conda".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_remove_environment() {
        let temp = tempdir().unwrap();
        let prefix = temp.path().join("envs").join("old");
        std::fs::create_dir_all(prefix.join("bin")).unwrap();
        assert!(environment_exists(&prefix));

        remove_environment(&prefix).await.unwrap();
        assert!(!environment_exists(&prefix));

        // Removing again is fine.
        remove_environment(&prefix).await.unwrap();
    }

    #[test]
    fn test_environment_exists_rejects_file() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("not-an-env");
        std::fs::write(&file, b"x").unwrap();
        assert!(!environment_exists(&file));
    }
}
