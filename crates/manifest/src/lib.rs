//! Overlay Manifest - readers for `package.json` and `plugin.xml`.

pub mod descriptor;
mod error;
pub mod package;

pub use descriptor::{Declaration, Descriptor, parse_descriptor, read_descriptor};
pub use error::ParseError;
pub use package::{LOCAL_PREFIX, PackageManifest, discover_local_plugins, parse_package};
