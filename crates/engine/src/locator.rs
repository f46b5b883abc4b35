//! Owning-plugin lookup for nested plugin trees.

use std::path::Path;

use overlay_core::{OverlayError, Plugin, Result};

/// Upper bound on parent steps taken while searching for an owner.
const MAX_ASCENT: usize = 256;

/// Finds the plugin that owns a path, preferring the deepest root.
#[derive(Debug, Clone, Default)]
pub struct PluginLocator {
    plugins: Vec<Plugin>,
}

impl PluginLocator {
    pub fn new(plugins: Vec<Plugin>) -> Self {
        Self { plugins }
    }

    /// All registered plugins, in discovery order.
    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    /// Returns the plugin whose root is `path` or its nearest ancestor.
    pub fn owner_of(&self, path: &Path) -> Result<&Plugin> {
        let mut current = path;

        for _ in 0..MAX_ASCENT {
            if let Some(plugin) = self.plugins.iter().find(|p| p.root_path == current) {
                return Ok(plugin);
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Err(OverlayError::NotFound(path.to_path_buf()))
    }
}
