//! Watch-root selection.

use std::path::Path;

use overlay_core::{Plugin, path};

/// Selects the plugin roots that need their own recursive watch.
///
/// A root nested inside another plugin's root is already covered by the outer
/// watch and is skipped, so each change is observed once.
pub fn watch_roots(plugins: &[Plugin]) -> Vec<&Path> {
    let mut roots: Vec<&Path> = Vec::new();

    for plugin in plugins {
        let root = plugin.root_path.as_path();
        let nested = plugins
            .iter()
            .any(|other| path::is_strict_subpath(root, &other.root_path));

        if !nested && !roots.contains(&root) {
            roots.push(root);
        }
    }

    roots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_root_is_not_watched() {
        let plugins = vec![
            Plugin::new("inner", "/work/outer/plugins/inner"),
            Plugin::new("outer", "/work/outer"),
            Plugin::new("deeper", "/work/outer/plugins/inner/deeper"),
        ];

        assert_eq!(watch_roots(&plugins), vec![Path::new("/work/outer")]);
    }

    #[test]
    fn test_siblings_are_all_watched() {
        let plugins = vec![
            Plugin::new("a", "/work/plugin"),
            Plugin::new("b", "/work/plugin-extra"),
            Plugin::new("c", "/elsewhere/c"),
        ];

        assert_eq!(
            watch_roots(&plugins),
            vec![
                Path::new("/work/plugin"),
                Path::new("/work/plugin-extra"),
                Path::new("/elsewhere/c"),
            ]
        );
    }

    #[test]
    fn test_no_plugins() {
        assert!(watch_roots(&[]).is_empty());
    }
}
