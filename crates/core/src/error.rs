//! Error types for the overlay.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for overlay operations.
pub type Result<T> = std::result::Result<T, OverlayError>;

/// Main error type for the overlay.
///
/// `Configuration` and `Extraction` abort startup. `NotFound` and `Io` raised
/// while handling a change event only skip that event.
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("Invalid configuration in {path}: {message}")]
    Configuration { path: PathBuf, message: String },

    #[error("Cannot resolve asset '{source_path}' of plugin '{plugin}': {message}")]
    Extraction {
        plugin: String,
        source_path: PathBuf,
        message: String,
    },

    #[error("Could not find a local plugin that contains {0}")]
    NotFound(PathBuf),

    #[error("IO error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OverlayError {
    /// Creates a configuration error for the given file.
    pub fn configuration(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Configuration {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Wraps an IO error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true for errors that must abort startup.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::Extraction { .. })
    }
}
