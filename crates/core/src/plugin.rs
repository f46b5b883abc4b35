//! Local plugin definition.

use std::path::{Path, PathBuf};

/// A plugin linked from a local source tree, editable in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plugin {
    /// Plugin name (dependency key in the manifest).
    pub name: String,

    /// Absolute path to the plugin's source tree.
    pub root_path: PathBuf,
}

impl Plugin {
    /// Creates a new plugin.
    pub fn new(name: impl Into<String>, root_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root_path: root_path.into(),
        }
    }

    /// Path to the plugin's `plugin.xml` descriptor.
    pub fn descriptor_path(&self) -> PathBuf {
        self.root_path.join("plugin.xml")
    }

    /// Returns true if `path` lies inside this plugin's tree (or is its root).
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root_path)
    }
}
