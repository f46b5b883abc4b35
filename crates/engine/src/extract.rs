//! Rule extraction from plugin descriptors.

use std::fs;
use std::path::{Path, PathBuf};

use overlay_core::{OverlayError, Platform, Plugin, Result, TransformRule, path};
use overlay_manifest::{Declaration, read_descriptor};

/// Reads `plugin`'s descriptor and builds its rules for `platform`.
///
/// Common declarations and the matching platform section are unioned. Asset
/// targets are checked against `asset_dir`, the packaged `www` directory.
pub fn extract_rules(
    plugin: &Plugin,
    platform: Platform,
    asset_dir: &Path,
) -> Result<Vec<TransformRule>> {
    let descriptor_path = plugin.descriptor_path();
    let descriptor = read_descriptor(&descriptor_path)?;

    descriptor
        .declarations_for(platform)
        .map(|declaration| rule_from_declaration(plugin, declaration, asset_dir))
        .collect()
}

fn rule_from_declaration(
    plugin: &Plugin,
    declaration: &Declaration,
    asset_dir: &Path,
) -> Result<TransformRule> {
    let source_path = path::resolve(&plugin.root_path, declaration.src());

    if !plugin.contains(&source_path) {
        return Err(OverlayError::configuration(
            plugin.descriptor_path(),
            format!("'{}' points outside the plugin directory", declaration.src()),
        ));
    }

    let rule = match declaration {
        Declaration::JsModule { src, name } => TransformRule::ModuleWrap {
            plugin: plugin.name.clone(),
            source_path,
            declared_source: src.clone(),
            export_name: name.clone(),
        },
        Declaration::Asset { src, target } => {
            let target = resolve_asset_target(plugin, &source_path, target, asset_dir)?;
            TransformRule::AssetCopy {
                plugin: plugin.name.clone(),
                source_path,
                declared_source: src.clone(),
                target,
            }
        }
    };

    Ok(rule)
}

/// A single file copied into a directory target keeps its own file name.
fn resolve_asset_target(
    plugin: &Plugin,
    source_path: &Path,
    target: &str,
    asset_dir: &Path,
) -> Result<PathBuf> {
    let extraction_error = |message: String| OverlayError::Extraction {
        plugin: plugin.name.clone(),
        source_path: source_path.to_path_buf(),
        message,
    };

    let declared_target = target;
    let target = path::normalize(Path::new(target));
    if !path::is_confined(&target) {
        return Err(extraction_error(format!(
            "target '{}' must be a relative path inside the shadow tree",
            declared_target
        )));
    }

    let source_meta = fs::metadata(source_path)
        .map_err(|e| extraction_error(format!("source cannot be read: {}", e)))?;
    if source_meta.is_dir() {
        return Ok(target);
    }

    let packaged_target = asset_dir.join(&target);
    let target_meta = fs::metadata(&packaged_target).map_err(|e| {
        extraction_error(format!(
            "target {} cannot be read: {}",
            packaged_target.display(),
            e
        ))
    })?;

    match source_path.file_name() {
        Some(file_name) if target_meta.is_dir() => Ok(target.join(file_name)),
        _ => Ok(target),
    }
}
