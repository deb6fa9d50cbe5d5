//! PATH activation for an installation root or environment prefix.

use std::path::Path;

use log::info;

use crate::agent::Agent;
use crate::platform::Platform;

/// Prepends the platform's PATH entries for `root`, in policy order.
///
/// Not idempotent: a second call adds the entries again.
pub fn prepend_to_path(agent: &dyn Agent, root: &Path, platform: Platform) {
    for entry in platform.path_entries(root) {
        info!("Prepending PATH environment variable with directory: {}", entry.display());
        agent.prepend_path(&entry);
    }
}
