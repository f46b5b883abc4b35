//! Shadow-tree materialization.
//!
//! Destinations are a pure function of `(rule, path)`, so the same call is used
//! both to write a shadow file and later to remove it.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use overlay_core::{ChangeKind, OverlayError, Result, TransformRule, path};
use tempfile::NamedTempFile;

use crate::locator::PluginLocator;

/// Directory under the shadow root that holds wrapped modules.
const MODULES_DIR: &str = "plugins";

/// Prefix that turns a JSON document into a module export.
const JSON_EXPORT_PREFIX: &str = "module.exports = ";

/// Wraps module source in the runtime's module-registration shim.
///
/// The output must match what the packaging step produces, since the runtime
/// resolves modules by the registered `<plugin>.<export>` identifier.
pub fn wrap_module(plugin: &str, export_name: &str, declared_source: &str, content: &str) -> String {
    let body = if is_json_source(declared_source) {
        format!("{}{}", JSON_EXPORT_PREFIX, content)
    } else {
        content.to_string()
    };

    format!(
        "cordova.define(\"{}.{}\", function(require, exports, module) {{ \n{}\n}});\n",
        plugin, export_name, body
    )
}

fn is_json_source(declared_source: &str) -> bool {
    declared_source.ends_with(".json")
}

/// Writes, copies and removes shadow files.
#[derive(Debug, Clone)]
pub struct TransformEngine {
    shadow_root: PathBuf,
    locator: PluginLocator,
}

impl TransformEngine {
    pub fn new(shadow_root: impl Into<PathBuf>, locator: PluginLocator) -> Self {
        let shadow_root: PathBuf = shadow_root.into();
        Self {
            shadow_root: path::normalize(&shadow_root),
            locator,
        }
    }

    pub fn shadow_root(&self) -> &Path {
        &self.shadow_root
    }

    pub fn locator(&self) -> &PluginLocator {
        &self.locator
    }

    /// Computes where the shadow copy of `path` lives under `rule`.
    ///
    /// The result is always strictly inside the shadow root.
    pub fn destination_for(&self, rule: &TransformRule, path: &Path) -> Result<PathBuf> {
        let destination = path::normalize(&self.unchecked_destination(rule, path)?);

        if !path::is_strict_subpath(&destination, &self.shadow_root) {
            return Err(OverlayError::Extraction {
                plugin: rule.plugin().to_string(),
                source_path: rule.source_path().to_path_buf(),
                message: format!(
                    "shadow copy {} would land outside {}",
                    destination.display(),
                    self.shadow_root.display()
                ),
            });
        }

        Ok(destination)
    }

    fn unchecked_destination(&self, rule: &TransformRule, path: &Path) -> Result<PathBuf> {
        match rule {
            TransformRule::ModuleWrap { .. } => {
                let owner = self.locator.owner_of(path)?;
                let relative = relative_to(path, &owner.root_path)?;
                Ok(join_relative(
                    self.shadow_root.join(MODULES_DIR).join(&owner.name),
                    relative,
                ))
            }
            TransformRule::AssetCopy {
                source_path,
                target,
                ..
            } => {
                let relative = relative_to(path, source_path)?;
                Ok(join_relative(self.shadow_root.join(target), relative))
            }
        }
    }

    /// Applies one change of `path` under `rule`. Returns the destinations
    /// that were written or removed.
    pub fn apply(&self, rule: &TransformRule, path: &Path, change: ChangeKind) -> Result<Vec<PathBuf>> {
        if !change.is_update() {
            let destination = self.destination_for(rule, path)?;
            remove_path(&destination)?;
            return Ok(vec![destination]);
        }

        if path.is_dir() {
            return match rule {
                // modules are single files
                TransformRule::ModuleWrap { .. } => Ok(Vec::new()),
                TransformRule::AssetCopy { .. } => {
                    let mut written = Vec::new();
                    for file in files_under(path)? {
                        written.push(self.materialize(rule, &file)?);
                    }
                    Ok(written)
                }
            };
        }

        Ok(vec![self.materialize(rule, path)?])
    }

    /// Writes the shadow copy of a single file.
    fn materialize(&self, rule: &TransformRule, path: &Path) -> Result<PathBuf> {
        let destination = self.destination_for(rule, path)?;

        let contents = match rule {
            TransformRule::ModuleWrap {
                plugin,
                declared_source,
                export_name,
                ..
            } => {
                let source = fs::read_to_string(path).map_err(|e| OverlayError::io(path, e))?;
                wrap_module(plugin, export_name, declared_source, &source).into_bytes()
            }
            TransformRule::AssetCopy { .. } => {
                fs::read(path).map_err(|e| OverlayError::io(path, e))?
            }
        };

        write_atomic(&destination, &contents)?;
        Ok(destination)
    }
}

/// Empties the shadow tree, leaving an empty directory behind.
pub fn reset_shadow_tree(shadow_root: &Path) -> Result<()> {
    remove_path(shadow_root)?;
    fs::create_dir_all(shadow_root).map_err(|e| OverlayError::io(shadow_root, e))
}

fn relative_to<'a>(path: &'a Path, base: &Path) -> Result<&'a Path> {
    path.strip_prefix(base)
        .map_err(|_| OverlayError::NotFound(path.to_path_buf()))
}

/// Joins without adding a trailing separator for an empty relative part.
fn join_relative(base: PathBuf, relative: &Path) -> PathBuf {
    if relative.as_os_str().is_empty() {
        base
    } else {
        base.join(relative)
    }
}

/// Writes through a temporary file in the destination directory, so readers
/// never observe a partial file.
fn write_atomic(destination: &Path, contents: &[u8]) -> Result<()> {
    let parent = destination.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| OverlayError::io(parent, e))?;

    let mut file = NamedTempFile::new_in(parent).map_err(|e| OverlayError::io(parent, e))?;
    file.write_all(contents)
        .map_err(|e| OverlayError::io(destination, e))?;
    file.persist(destination)
        .map_err(|e| OverlayError::io(destination, e.error))?;

    Ok(())
}

/// Removes a file or directory; a missing path is not an error.
fn remove_path(path: &Path) -> Result<()> {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) => Err(e),
    };

    match result {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(OverlayError::io(path, e)),
        _ => Ok(()),
    }
}

/// Lists every file below `dir`, recursively.
pub(crate) fn files_under(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let entries = fs::read_dir(&current).map_err(|e| OverlayError::io(&current, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| OverlayError::io(&current, e))?;
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}
