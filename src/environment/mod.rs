//! Conda Environment Module
//!
//! Finds or installs Conda and activates environments for later pipeline
//! steps.
//!
//! # Structure
//!
//! - [`locator`]: Search for an existing installation root
//! - [`location`]: Memoized location for a fresh installation
//! - [`installer`]: Download and unattended Miniconda install
//! - [`path`]: PATH activation
//! - [`conda`]: Environment creation and activation

pub mod conda;
pub mod installer;
pub mod location;
pub mod locator;
pub mod path;

pub use conda::{
    activation_variables, environment_exists, environment_prefix, environments_dir,
    remove_environment, EnvironmentManager, ACTIVATION_VARIABLES, CONDA_DEFAULT_ENV, CONDA_PREFIX,
};
pub use installer::{update_self, Installer};
pub use location::DeferredInstallLocation;
pub use locator::{has_installation, DiskCheck, InstallCheck, Locator, CONDA_ROOT_VAR};
pub use path::prepend_to_path;
