//! Deferred Install Location
//!
//! Where a fresh Miniconda lands when no installation is found. The path is
//! derived from the agent's tools directory the first time it is needed and
//! then fixed for the rest of the process, so the locator and the installer
//! always agree on it.

use std::fmt;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;

/// Directory name of a fresh installation inside the tools directory.
pub const INSTALL_DIR_NAME: &str = "Miniconda";

type BaseLookup = Box<dyn Fn() -> PathBuf + Send + Sync>;

/// Compute-once install location.
pub struct DeferredInstallLocation {
    base: BaseLookup,
    path: OnceCell<PathBuf>,
}

impl DeferredInstallLocation {
    /// Creates a location whose base directory comes from `base` on first use.
    pub fn new(base: impl Fn() -> PathBuf + Send + Sync + 'static) -> Self {
        Self {
            base: Box::new(base),
            path: OnceCell::new(),
        }
    }

    /// Returns `<base>/Miniconda`, computing it on the first call only.
    pub fn get(&self) -> &Path {
        self.path.get_or_init(|| (self.base)().join(INSTALL_DIR_NAME))
    }

    /// Whether [`get`](Self::get) has been called yet.
    pub fn is_resolved(&self) -> bool {
        self.path.get().is_some()
    }
}

impl fmt::Debug for DeferredInstallLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredInstallLocation")
            .field("path", &self.path.get())
            .finish()
    }
}
