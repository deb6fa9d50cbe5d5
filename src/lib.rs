//! condasetup - Conda Provisioning for Build Pipelines
//!
//! Finds an existing Conda installation on a build agent (or installs
//! Miniconda when there is none), puts it on PATH, and creates and activates
//! an isolated environment that later pipeline steps inherit.
//!
//! # Architecture
//!
//! - [`platform`]: Per-OS paths, executables and installer invocations
//! - [`environment`]: Locator, installer, PATH activation, environments
//! - [`agent`]: Build agent capabilities (variables, PATH, downloads)
//! - [`process`]: External command execution
//! - [`task`]: The end-to-end setup step
//!
//! # Example
//!
//! ```rust,no_run
//! use condasetup::agent::{Agent, HttpDownloader, PipelineAgent};
//! use condasetup::environment::DeferredInstallLocation;
//! use condasetup::process::SystemRunner;
//! use condasetup::task::{run_task, SetupContext};
//! use condasetup::{Platform, TaskInputs};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let agent = PipelineAgent;
//!     let location = DeferredInstallLocation::new(move || agent.tools_directory());
//!     let ctx = SetupContext {
//!         agent: &agent,
//!         downloader: &HttpDownloader::new(),
//!         runner: &SystemRunner,
//!         location: &location,
//!         platform: Platform::current(),
//!     };
//!
//!     let inputs = TaskInputs::from_env()?;
//!     let outcome = run_task(&inputs, &ctx).await?;
//!     println!("Activated {}", outcome.prefix.display());
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod config;
pub mod environment;
pub mod error;
pub mod messages;
pub mod platform;
pub mod process;
pub mod task;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::TaskInputs;
pub use environment::conda;
pub use error::{Result, SetupError};
pub use platform::Platform;
pub use task::{run_task, SetupContext, SetupOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "condasetup";
