//! Overlay Engine - rule extraction and shadow-tree transformation.

mod extract;
mod index;
mod locator;
mod overlay;
mod transform;
mod watch;

pub use extract::extract_rules;
pub use index::RuleIndex;
pub use locator::PluginLocator;
pub use overlay::{ChangeReport, DEFAULT_SHADOW_DIR, MANIFEST_NAME, Overlay, OverlayConfig};
pub use transform::{TransformEngine, reset_shadow_tree, wrap_module};
pub use watch::watch_roots;
