pub mod list;

use anyhow::{Context, Result};
use std::path::Path;
use tfmodtest_config::{Config, ConfigLoader, CONFIG_FILE_NAME};
use tracing::debug;

/// Load harness configuration for the test root at `dir`
///
/// The lookup walks up from the canonical root so a `tfmodtest.toml` beside
/// the module is found from any sub-directory. A root that does not exist is
/// left for discovery to report.
pub(crate) fn load_config(dir: &Path) -> Result<Config> {
    let start = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
    let config = ConfigLoader::new()
        .load_from_directory(&start)
        .with_context(|| format!("failed to load {}", CONFIG_FILE_NAME))?;

    match config.project_root() {
        Some(root) => debug!(root = %root.display(), "loaded {}", CONFIG_FILE_NAME),
        None => debug!("no {} found, using defaults", CONFIG_FILE_NAME),
    }
    Ok(config)
}
