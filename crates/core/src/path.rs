//! Lexical path helpers.
//!
//! Paths are compared component-wise and never touch the filesystem, so the
//! same input always yields the same answer.

use std::path::{Component, Path, PathBuf};

/// Lexically normalizes a path: drops `.` components and folds `..` into the
/// preceding component.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root, leading `..` of a relative path is kept
                match out.components().next_back() {
                    Some(Component::Normal(_)) => {
                        out.pop();
                    }
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                    _ => out.push(".."),
                }
            }
            other => out.push(other.as_os_str()),
        }
    }

    out
}

/// Joins `relative` onto `base` and normalizes the result.
pub fn resolve(base: &Path, relative: impl AsRef<Path>) -> PathBuf {
    normalize(&base.join(relative))
}

/// Returns true if `relative` names something strictly inside the directory it
/// is joined to: non-empty, not absolute, and free of `.`/`..` components.
pub fn is_confined(relative: &Path) -> bool {
    relative.components().next().is_some()
        && relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

/// Returns true if `path` is strictly below `ancestor`.
pub fn is_strict_subpath(path: &Path, ancestor: &Path) -> bool {
    path != ancestor && path.starts_with(ancestor)
}
