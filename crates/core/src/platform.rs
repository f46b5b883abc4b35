//! Target platforms and their packaged asset locations.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A mobile platform whose packaged `www` directory is overlaid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    /// All supported platforms.
    pub const ALL: [Platform; 2] = [Platform::Android, Platform::Ios];

    /// Name used on the command line and in `<platform name="...">` sections.
    pub fn name(self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
        }
    }

    /// Packaged asset directory, relative to the project root.
    pub fn asset_dir(self) -> &'static Path {
        match self {
            Self::Android => Path::new("platforms/android/app/src/main/assets/www"),
            Self::Ios => Path::new("platforms/ios/www"),
        }
    }

    /// Packaged asset directory inside the given project.
    pub fn asset_dir_in(self, project_root: &Path) -> PathBuf {
        project_root.join(self.asset_dir())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| format!("unknown platform '{}', expected \"android\" or \"ios\"", s))
    }
}
