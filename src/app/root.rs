//! Root path resolution

use anyhow::Result;
use std::path::{Path, PathBuf};
use log::debug;

/// Expand a leading `~` and require the path to exist.
///
/// The path is not canonicalized so reported file paths keep the form the
/// user typed.
pub fn resolve_root(path: &Path) -> Result<PathBuf> {
    let expanded = expand_home(path);

    if !expanded.exists() {
        anyhow::bail!("{} does not exist!", expanded.display());
    }

    debug!("Processing root: {}", expanded.display());
    Ok(expanded)
}

fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match dirs::home_dir() {
        Some(home_dir) => home_dir.join(rest),
        None => path.to_path_buf(),
    }
}
