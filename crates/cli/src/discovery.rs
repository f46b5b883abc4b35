//! Project root discovery.

use std::path::{Path, PathBuf};

use miette::{Result, miette};
use overlay_engine::MANIFEST_NAME;

/// Finds the project root by searching from the current directory upwards.
pub fn find_project_root() -> Result<PathBuf> {
    let cwd =
        std::env::current_dir().map_err(|e| miette!("Cannot get current directory: {}", e))?;
    let root = find_project_root_from(&cwd)?;
    canonical_project_root(&root)
}

/// Finds the nearest directory containing `package.json`, starting at `start`.
pub fn find_project_root_from(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let manifest = current.join(MANIFEST_NAME);

        if manifest.is_file() {
            return Ok(current);
        }

        // Try parent directory
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => {
                return Err(miette!(
                    "{} not found in {} or any parent directory",
                    MANIFEST_NAME,
                    start.display()
                ));
            }
        }
    }
}

/// Resolves a project directory to an absolute, symlink-free path so that
/// watcher events and rule paths agree.
pub fn canonical_project_root(path: &Path) -> Result<PathBuf> {
    let root = path
        .canonicalize()
        .map_err(|e| miette!("Cannot open project directory {}: {}", path.display(), e))?;

    if !root.join(MANIFEST_NAME).is_file() {
        return Err(miette!(
            "{} not found in {}",
            MANIFEST_NAME,
            root.display()
        ));
    }

    Ok(root)
}
