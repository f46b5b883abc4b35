//! Dependency manifest (`package.json`) reader.
//!
//! Only dependencies declared with a `file:` location are local plugins;
//! everything else is served from the packaged assets untouched.

use std::path::Path;

use overlay_core::{OverlayError, Plugin, Result, path};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ParseError;

/// Marker prefix of a local-file dependency location.
pub const LOCAL_PREFIX: &str = "file:";

/// The parts of `package.json` the overlay cares about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    /// Dependency name to location string, in declaration order.
    #[serde(default)]
    pub dependencies: Map<String, Value>,
}

impl PackageManifest {
    /// Returns `(name, relative path)` for every local-file dependency.
    pub fn local_dependencies(&self) -> impl Iterator<Item = (&str, &str)> {
        self.dependencies.iter().filter_map(|(name, location)| {
            location
                .as_str()
                .and_then(|loc| loc.strip_prefix(LOCAL_PREFIX))
                .map(|rel| (name.as_str(), rel))
        })
    }
}

/// Parses a dependency manifest from a JSON string.
pub fn parse_package(content: &str) -> std::result::Result<PackageManifest, ParseError> {
    serde_json::from_str(content)
        .map_err(|e| ParseError::at_line_col(e.to_string(), content, e.line(), e.column()))
}

/// Reads the manifest at `manifest_path` and returns its local plugins, with
/// roots resolved against the manifest's directory.
pub fn discover_local_plugins(manifest_path: &Path) -> Result<Vec<Plugin>> {
    let content = std::fs::read_to_string(manifest_path).map_err(|e| {
        OverlayError::configuration(manifest_path, format!("cannot read manifest: {}", e))
    })?;

    let manifest = parse_package(&content)
        .map_err(|e| OverlayError::configuration(manifest_path, e.located_message()))?;

    let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));

    Ok(manifest
        .local_dependencies()
        .map(|(name, rel)| Plugin::new(name, path::resolve(base, rel)))
        .collect())
}
