//! Error Types
//!
//! Failures that abort the setup step. Absence of an installation is not
//! an error (see [`crate::environment::locator`]), and self-update failures
//! never reach this type.

use std::path::PathBuf;

use thiserror::Error;

use crate::messages::{self, MessageId};

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SetupError>;

/// Fatal setup failures.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The Miniconda installer did not complete.
    #[error("{}", messages::format(MessageId::InstallationFailed, &[.0.as_str()]))]
    Installation(String),

    /// `conda create` failed for the given prefix.
    #[error("{}", messages::format(MessageId::CreateFailed, &[.prefix.display().to_string().as_str(), .message.as_str()]))]
    Creation { prefix: PathBuf, message: String },

    /// `conda install` into the base environment failed.
    #[error("{}", messages::format(MessageId::PackageInstallFailed, &[.0.as_str()]))]
    PackageInstall(String),

    /// The installer could not be fetched.
    #[error("{}", messages::format(MessageId::DownloadFailed, &[.url.as_str(), .message.as_str()]))]
    Download { url: String, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
