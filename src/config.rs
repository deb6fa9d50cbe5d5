//! Task Inputs
//!
//! Inputs come from the agent's `INPUT_<NAME>` environment variables and may
//! be overridden on the command line.

use std::env;
use std::path::{Component, Path};

use crate::error::{Result, SetupError};

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    Run { verbose: bool },
    Help,
    Version,
}

/// Inputs controlling a setup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInputs {
    /// Name of the environment to create under `<root>/envs`.
    pub environment_name: Option<String>,

    /// Create and activate `environment_name` instead of using `base`.
    pub create_custom_environment: bool,

    /// Space-separated package specs.
    pub package_specs: Option<String>,

    /// Run `conda update` on an existing installation.
    pub update_conda: bool,

    /// Extra flags for `conda install` into `base`.
    pub install_options: Option<String>,

    /// Extra flags for `conda create`.
    pub create_options: Option<String>,

    /// Delete an existing environment before creating it.
    pub clean_environment: bool,
}

impl Default for TaskInputs {
    fn default() -> Self {
        Self {
            environment_name: None,
            create_custom_environment: false,
            package_specs: None,
            update_conda: true,
            install_options: None,
            create_options: None,
            clean_environment: false,
        }
    }
}

impl TaskInputs {
    /// Reads inputs from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads inputs through `lookup`, keyed by `INPUT_<NAME>`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let text = |name: &str| {
            lookup(&format!("INPUT_{}", name))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let flag = |name: &str| -> Result<Option<bool>> {
            text(name)
                .map(|v| {
                    parse_bool(&v).ok_or_else(|| {
                        SetupError::InvalidInput(format!("{} must be true or false, got '{}'", name, v))
                    })
                })
                .transpose()
        };

        let defaults = Self::default();
        let environment_name = text("ENVIRONMENTNAME");
        let create_custom_environment =
            flag("CREATECUSTOMENVIRONMENT")?.unwrap_or(environment_name.is_some());

        Ok(Self {
            create_custom_environment,
            environment_name,
            package_specs: text("PACKAGESPECS"),
            update_conda: flag("UPDATECONDA")?.unwrap_or(defaults.update_conda),
            install_options: text("INSTALLOPTIONS"),
            create_options: text("CREATEOPTIONS"),
            clean_environment: flag("CLEANENVIRONMENT")?.unwrap_or(defaults.clean_environment),
        })
    }

    /// Applies command-line flags on top of the current inputs.
    ///
    /// `args` excludes the program name.
    pub fn apply_args(&mut self, args: &[String]) -> Result<CliAction> {
        let mut verbose = false;
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            let mut value = |flag: &str| {
                iter.next().cloned().ok_or_else(|| {
                    SetupError::InvalidInput(format!("{} requires a value", flag))
                })
            };

            match arg.as_str() {
                "--help" | "-h" => return Ok(CliAction::Help),
                "--version" | "-V" => return Ok(CliAction::Version),
                "--verbose" | "-v" => verbose = true,
                "--environment-name" => {
                    let name = value(arg.as_str())?.trim().to_string();
                    self.environment_name = Some(name).filter(|n| !n.is_empty());
                    self.create_custom_environment = true;
                }
                "--no-custom-environment" => self.create_custom_environment = false,
                "--package-specs" => self.package_specs = Some(value(arg.as_str())?),
                "--install-options" => self.install_options = Some(value(arg.as_str())?),
                "--create-options" => self.create_options = Some(value(arg.as_str())?),
                "--no-update-conda" => self.update_conda = false,
                "--clean-environment" => self.clean_environment = true,
                other => {
                    return Err(SetupError::InvalidInput(format!("Unknown option: {}", other)))
                }
            }
        }

        Ok(CliAction::Run { verbose })
    }

    /// Checks the inputs are consistent.
    pub fn validate(&self) -> Result<()> {
        if !self.create_custom_environment {
            return Ok(());
        }

        let name = self.environment_name.as_deref().unwrap_or_default();

        if name.is_empty() {
            return Err(SetupError::InvalidInput(
                "an environment name is required to create a custom environment".to_string(),
            ));
        }
        if name.contains(['/', '\\']) || name.contains(char::is_whitespace) {
            return Err(SetupError::InvalidInput(format!(
                "environment name '{}' must not contain path separators or whitespace",
                name
            )));
        }
        // The prefix is `<root>/envs/<name>`; `.` or `..` would point at the
        // installation itself.
        let mut components = Path::new(name).components();
        if !matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) {
            return Err(SetupError::InvalidInput(format!(
                "environment name '{}' is not a plain directory name",
                name
            )));
        }
        Ok(())
    }

    /// Name of the custom environment, if one should be created.
    pub fn custom_environment(&self) -> Option<&str> {
        if self.create_custom_environment {
            self.environment_name.as_deref()
        } else {
            None
        }
    }
}

/// Parses `true/false/1/0/yes/no`, ignoring case.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
