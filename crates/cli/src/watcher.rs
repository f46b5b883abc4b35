//! Filesystem watcher plumbing.
//!
//! Raw `notify` events are flattened into `(path, ChangeKind)` pairs and sent
//! down a channel in the order the backend reports them.

use std::path::{Path, PathBuf};

use miette::{Result, miette};
use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use overlay_core::ChangeKind;
use tokio::sync::mpsc;

/// A single change to forward to the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl FileChange {
    pub(crate) fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Installs one recursive watch per root. Dropping the watcher stops it.
pub fn watch(roots: &[&Path], tx: mpsc::Sender<FileChange>) -> Result<RecommendedWatcher> {
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for change in changes_from_event(&event) {
                    if tx.blocking_send(change).is_err() {
                        return;
                    }
                }
            }
            Err(e) => tracing::warn!(error = %e, "file watcher error"),
        },
        Config::default(),
    )
    .map_err(|e| miette!("Failed to create file watcher: {}", e))?;

    for root in roots {
        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|e| miette!("Failed to watch {}: {}", root.display(), e))?;
    }

    Ok(watcher)
}

/// Translates a raw event into changes, one per affected path.
pub fn changes_from_event(event: &Event) -> Vec<FileChange> {
    let each = |kind: ChangeKind| -> Vec<FileChange> {
        event
            .paths
            .iter()
            .map(|path| FileChange::new(path, kind))
            .collect()
    };

    match event.kind {
        EventKind::Create(_) => each(ChangeKind::Created),
        EventKind::Remove(_) => each(ChangeKind::Deleted),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => each(ChangeKind::Deleted),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => each(ChangeKind::Created),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let mut changes = Vec::with_capacity(2);
            if let Some(from) = event.paths.first() {
                changes.push(FileChange::new(from, ChangeKind::Deleted));
            }
            if let Some(to) = event.paths.get(1) {
                changes.push(FileChange::new(to, ChangeKind::Created));
            }
            changes
        }
        // the backend could not tell which side of the rename this is
        EventKind::Modify(ModifyKind::Name(_)) | EventKind::Any => event
            .paths
            .iter()
            .map(|path| FileChange::new(path, existence_change(path)))
            .collect(),
        EventKind::Modify(_) => each(ChangeKind::Modified),
        EventKind::Access(_) | EventKind::Other => Vec::new(),
    }
}

fn existence_change(path: &Path) -> ChangeKind {
    if path.exists() {
        ChangeKind::Modified
    } else {
        ChangeKind::Deleted
    }
}
