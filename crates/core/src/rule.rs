//! Transformation rules declared by plugin descriptors.

use std::fmt;
use std::path::{Path, PathBuf};

/// A file-level transformation owned by one plugin.
///
/// `source_path` is absolute and acts as a path prefix: a rule on a directory
/// governs every file below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformRule {
    /// A `<js-module>` entry, wrapped in a module-registration shim.
    ModuleWrap {
        /// Owning plugin name.
        plugin: String,
        source_path: PathBuf,
        /// `src` as written in the descriptor.
        declared_source: String,
        /// Logical module name (`name` attribute).
        export_name: String,
    },

    /// An `<asset>` entry, copied byte for byte.
    AssetCopy {
        /// Owning plugin name.
        plugin: String,
        source_path: PathBuf,
        /// `src` as written in the descriptor.
        declared_source: String,
        /// Destination relative to the shadow root, after directory adjustment.
        target: PathBuf,
    },
}

/// Discriminant of a [`TransformRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    ModuleWrap,
    AssetCopy,
}

impl TransformRule {
    pub fn kind(&self) -> RuleKind {
        match self {
            Self::ModuleWrap { .. } => RuleKind::ModuleWrap,
            Self::AssetCopy { .. } => RuleKind::AssetCopy,
        }
    }

    /// Name of the plugin that declared this rule.
    pub fn plugin(&self) -> &str {
        match self {
            Self::ModuleWrap { plugin, .. } | Self::AssetCopy { plugin, .. } => plugin,
        }
    }

    /// Absolute path the rule governs.
    pub fn source_path(&self) -> &Path {
        match self {
            Self::ModuleWrap { source_path, .. } | Self::AssetCopy { source_path, .. } => {
                source_path
            }
        }
    }

    /// Source path as declared in the descriptor.
    pub fn declared_source(&self) -> &str {
        match self {
            Self::ModuleWrap {
                declared_source, ..
            }
            | Self::AssetCopy {
                declared_source, ..
            } => declared_source,
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModuleWrap => f.write_str("js-module"),
            Self::AssetCopy => f.write_str("asset"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let rule = TransformRule::ModuleWrap {
            plugin: "my-plugin".to_string(),
            source_path: PathBuf::from("/p/www/module.js"),
            declared_source: "www/module.js".to_string(),
            export_name: "Module".to_string(),
        };
        assert_eq!(rule.kind(), RuleKind::ModuleWrap);
        assert_eq!(rule.plugin(), "my-plugin");
        assert_eq!(rule.declared_source(), "www/module.js");
        assert_eq!(rule.kind().to_string(), "js-module");
        assert_eq!(rule.source_path(), Path::new("/p/www/module.js"));
    }
}
