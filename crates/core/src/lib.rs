//! Overlay Core - Core types for the overlay live-reload server.

mod change;
mod error;
pub mod path;
mod platform;
mod plugin;
mod rule;

pub use change::ChangeKind;
pub use error::{OverlayError, Result};
pub use platform::Platform;
pub use plugin::Plugin;
pub use rule::{RuleKind, TransformRule};
