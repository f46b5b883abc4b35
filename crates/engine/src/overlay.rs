//! The overlay: plugins, rules and shadow tree, built once at startup.

use std::path::{Path, PathBuf};

use overlay_core::{ChangeKind, OverlayError, Platform, Plugin, Result, TransformRule, path};
use overlay_manifest::discover_local_plugins;

use crate::extract::extract_rules;
use crate::index::RuleIndex;
use crate::locator::PluginLocator;
use crate::transform::{TransformEngine, reset_shadow_tree};
use crate::watch::watch_roots;

/// Default shadow directory name, relative to the project root.
pub const DEFAULT_SHADOW_DIR: &str = ".hot_reload_js_files";

/// Dependency manifest file name.
pub const MANIFEST_NAME: &str = "package.json";

/// Where the overlay reads from and writes to.
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    /// Directory containing `package.json`.
    pub project_root: PathBuf,

    /// Platform whose descriptor sections and asset directory are used.
    pub platform: Platform,

    /// Directory the shadow tree is written to.
    pub shadow_root: PathBuf,

    /// Packaged `www` directory of the platform.
    pub asset_dir: PathBuf,
}

impl OverlayConfig {
    /// Creates a configuration with default shadow and asset locations.
    pub fn new(project_root: impl Into<PathBuf>, platform: Platform) -> Self {
        let project_root = project_root.into();
        Self {
            shadow_root: project_root.join(DEFAULT_SHADOW_DIR),
            asset_dir: platform.asset_dir_in(&project_root),
            project_root,
            platform,
        }
    }

    /// Sets the shadow directory.
    pub fn with_shadow_root(mut self, shadow_root: impl Into<PathBuf>) -> Self {
        self.shadow_root = shadow_root.into();
        self
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.project_root.join(MANIFEST_NAME)
    }
}

/// Outcome of handling one changed path.
#[derive(Debug, Default)]
pub struct ChangeReport {
    /// Shadow paths written or removed.
    pub applied: Vec<PathBuf>,

    /// Per-rule failures; the remaining rules were still applied.
    pub failed: Vec<OverlayError>,
}

/// Immutable overlay state shared by the watcher and the server.
#[derive(Debug)]
pub struct Overlay {
    config: OverlayConfig,
    index: RuleIndex,
    engine: TransformEngine,
}

impl Overlay {
    /// Discovers local plugins and extracts their rules. Touches nothing on disk.
    pub fn load(mut config: OverlayConfig) -> Result<Self> {
        config.shadow_root = path::resolve(&config.project_root, &config.shadow_root);

        let plugins = discover_local_plugins(&config.manifest_path())?;
        tracing::debug!(count = plugins.len(), "discovered local plugins");

        let mut index = RuleIndex::new();
        for plugin in &plugins {
            let rules = extract_rules(plugin, config.platform, &config.asset_dir)?;
            tracing::debug!(plugin = %plugin.name, rules = rules.len(), "extracted rules");
            for rule in rules {
                index.insert(rule);
            }
        }

        let engine = TransformEngine::new(&config.shadow_root, PluginLocator::new(plugins));

        Ok(Self {
            config,
            index,
            engine,
        })
    }

    /// Empties the shadow tree, then loads the overlay and writes the initial
    /// copy of every rule. Any failure here is fatal.
    pub fn prepare(config: OverlayConfig) -> Result<Self> {
        let overlay = Self::load(config)?;
        overlay.check_shadow_root()?;

        reset_shadow_tree(overlay.shadow_root())?;
        overlay.warm_up()?;
        Ok(overlay)
    }

    /// The shadow tree is emptied at startup, so it must not contain the
    /// project, the packaged assets or any plugin source.
    fn check_shadow_root(&self) -> Result<()> {
        let shadow = self.shadow_root();
        let protected = [
            ("project", self.config.project_root.as_path()),
            ("packaged assets", self.config.asset_dir.as_path()),
        ]
        .into_iter()
        .chain(
            self.plugins()
                .iter()
                .map(|plugin| ("plugin", plugin.root_path.as_path())),
        );

        for (what, dir) in protected {
            if path::normalize(dir).starts_with(shadow) {
                return Err(OverlayError::configuration(
                    shadow,
                    format!(
                        "the shadow directory must not contain the {} at {}",
                        what,
                        dir.display()
                    ),
                ));
            }
        }

        Ok(())
    }

    /// Materializes every rule's source once. Returns the number of shadow
    /// files written.
    pub fn warm_up(&self) -> Result<usize> {
        let mut written = 0;
        for rule in self.index.iter() {
            written += self
                .engine
                .apply(rule, rule.source_path(), ChangeKind::Created)?
                .len();
        }
        tracing::info!(files = written, "shadow tree warmed up");
        Ok(written)
    }

    /// Applies a change to every rule that governs `path`.
    ///
    /// Paths no rule governs are ignored. Failures are logged and collected; a
    /// failing rule never prevents the others from running.
    pub fn handle_change(&self, path: &Path, change: ChangeKind) -> ChangeReport {
        let mut report = ChangeReport::default();

        for rule in self.index.rules_for(path) {
            match self.engine.apply(rule, path, change) {
                Ok(mut destinations) => report.applied.append(&mut destinations),
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        rule = %rule.kind(),
                        error = %err,
                        "failed to update shadow copy"
                    );
                    report.failed.push(err);
                }
            }
        }

        report
    }

    /// Returns true if a change to `path` concerns the overlay.
    pub fn should_watch(&self, path: &Path) -> bool {
        self.index.should_watch(path)
    }

    /// Directories that need a recursive watch.
    pub fn watch_roots(&self) -> Vec<&Path> {
        watch_roots(self.plugins())
    }

    pub fn plugins(&self) -> &[Plugin] {
        self.engine.locator().plugins()
    }

    pub fn rules(&self) -> impl Iterator<Item = &TransformRule> {
        self.index.iter()
    }

    pub fn shadow_root(&self) -> &Path {
        self.engine.shadow_root()
    }

    pub fn asset_dir(&self) -> &Path {
        &self.config.asset_dir
    }

    pub fn engine(&self) -> &TransformEngine {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    /// Project layout:
    ///
    /// ```text
    /// work/app/package.json          my-plugin -> ../my-plugin, inner -> ../my-plugin/inner
    /// work/app/platforms/android/... packaged www with a css/ directory
    /// work/my-plugin/plugin.xml      js-module www/module.js, asset www/theme.css -> css
    /// work/my-plugin/inner/plugin.xml js-module www/inner.json
    /// ```
    fn project() -> (TempDir, OverlayConfig) {
        let dir = tempdir().unwrap();
        let work = dir.path();
        let app = work.join("app");
        let plugin = work.join("my-plugin");
        let inner = plugin.join("inner");

        fs::create_dir_all(&app).unwrap();
        fs::write(
            app.join("package.json"),
            r#"{"dependencies": {
                "cordova-android": "^12.0.0",
                "my-plugin": "file:../my-plugin",
                "inner": "file:../my-plugin/inner"
            }}"#,
        )
        .unwrap();
        fs::create_dir_all(Platform::Android.asset_dir_in(&app).join("css")).unwrap();

        fs::create_dir_all(plugin.join("www")).unwrap();
        fs::write(
            plugin.join("plugin.xml"),
            r#"<plugin id="my-plugin">
                <js-module src="www/module.js" name="Module"/>
                <platform name="android">
                    <asset src="www/theme.css" target="css"/>
                </platform>
            </plugin>"#,
        )
        .unwrap();
        fs::write(plugin.join("www/module.js"), "exports.v = 1;").unwrap();
        fs::write(plugin.join("www/theme.css"), "body { color: red; }").unwrap();

        fs::create_dir_all(inner.join("www")).unwrap();
        fs::write(
            inner.join("plugin.xml"),
            r#"<plugin><js-module src="www/inner.json" name="Data"/></plugin>"#,
        )
        .unwrap();
        fs::write(inner.join("www/inner.json"), "{\"k\": true}").unwrap();

        let config = OverlayConfig::new(app, Platform::Android);
        (dir, config)
    }

    #[test]
    fn test_prepare_warms_up_every_rule() {
        let (dir, config) = project();
        let shadow = config.shadow_root.clone();
        fs::create_dir_all(shadow.join("stale")).unwrap();

        let overlay = Overlay::prepare(config).unwrap();

        assert_eq!(overlay.plugins().len(), 2);
        assert_eq!(overlay.rules().count(), 3);
        assert!(!shadow.join("stale").exists());

        let module = fs::read_to_string(shadow.join("plugins/my-plugin/www/module.js")).unwrap();
        assert_eq!(
            module,
            "cordova.define(\"my-plugin.Module\", function(require, exports, module) { \nexports.v = 1;\n});\n"
        );

        let json = fs::read_to_string(shadow.join("plugins/inner/www/inner.json")).unwrap();
        assert!(json.contains("cordova.define(\"inner.Data\""));
        assert!(json.contains("module.exports = {\"k\": true}"));

        assert_eq!(
            fs::read_to_string(shadow.join("css/theme.css")).unwrap(),
            "body { color: red; }"
        );

        assert_eq!(
            overlay.watch_roots(),
            vec![dir.path().join("my-plugin").as_path()]
        );
    }

    #[test]
    fn test_load_does_not_touch_shadow_tree() {
        let (_dir, config) = project();
        let shadow = config.shadow_root.clone();

        let overlay = Overlay::load(config).unwrap();
        assert_eq!(overlay.rules().count(), 3);
        assert!(!shadow.exists());
    }

    #[test]
    fn test_edit_and_delete_cycle() {
        let (dir, config) = project();
        let shadow = config.shadow_root.clone();
        let overlay = Overlay::prepare(config).unwrap();

        let source = dir.path().join("my-plugin/www/module.js");
        let copy = shadow.join("plugins/my-plugin/www/module.js");

        fs::write(&source, "exports.v = 2;").unwrap();
        let report = overlay.handle_change(&source, ChangeKind::Modified);
        assert_eq!(report.applied, vec![copy.clone()]);
        assert!(report.failed.is_empty());
        assert!(fs::read_to_string(&copy).unwrap().contains("exports.v = 2;"));

        fs::remove_file(&source).unwrap();
        overlay.handle_change(&source, ChangeKind::Deleted);
        assert!(!copy.exists());
    }

    #[test]
    fn test_unrelated_paths_are_ignored() {
        let (dir, config) = project();
        let overlay = Overlay::prepare(config).unwrap();

        let readme = dir.path().join("my-plugin/README.md");
        assert!(!overlay.should_watch(&readme));

        let report = overlay.handle_change(&readme, ChangeKind::Modified);
        assert!(report.applied.is_empty());
        assert!(report.failed.is_empty());
    }

    #[test]
    fn test_failed_event_is_reported_not_fatal() {
        let (dir, config) = project();
        let overlay = Overlay::prepare(config).unwrap();

        let source = dir.path().join("my-plugin/www/module.js");
        fs::remove_file(&source).unwrap();

        let report = overlay.handle_change(&source, ChangeKind::Modified);
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(report.failed[0], OverlayError::Io { .. }));
    }

    #[test]
    fn test_shadow_root_containing_project_is_rejected() {
        let (dir, config) = project();
        let config = config.with_shadow_root(dir.path());

        let err = Overlay::prepare(config).unwrap_err();
        assert!(matches!(err, OverlayError::Configuration { .. }));
        assert!(dir.path().join("app/package.json").exists());
    }

    #[test]
    fn test_parent_dir_shadow_root_is_rejected() {
        let (dir, config) = project();
        let app = config.project_root.clone();
        let config = config.with_shadow_root(app.join(".."));

        let err = Overlay::prepare(config).unwrap_err();
        assert!(matches!(err, OverlayError::Configuration { .. }));
        assert!(app.join("package.json").exists());
        assert!(dir.path().join("my-plugin/plugin.xml").exists());
    }

    #[test]
    fn test_plugin_root_as_shadow_root_is_rejected() {
        let (dir, config) = project();
        let app = config.project_root.clone();
        let config = config.with_shadow_root(app.join("../my-plugin"));

        let err = Overlay::prepare(config).unwrap_err();
        assert!(matches!(err, OverlayError::Configuration { .. }));
        assert!(dir.path().join("my-plugin/plugin.xml").exists());
        assert!(dir.path().join("my-plugin/www/module.js").exists());
    }

    #[test]
    fn test_shadow_root_containing_asset_dir_is_rejected() {
        let (_dir, config) = project();
        let platforms = config.project_root.join("platforms");
        let config = config.with_shadow_root(&platforms);

        let err = Overlay::prepare(config).unwrap_err();
        assert!(matches!(err, OverlayError::Configuration { .. }));
        assert!(platforms.join("android").exists());
    }

    #[test]
    fn test_relative_shadow_root_resolves_against_project() {
        let (_dir, config) = project();
        let app = config.project_root.clone();
        let config = config.with_shadow_root("build/shadow");

        let overlay = Overlay::prepare(config).unwrap();
        assert_eq!(overlay.shadow_root(), app.join("build/shadow"));
        assert!(app.join("build/shadow/plugins/my-plugin/www/module.js").exists());
    }

    #[test]
    fn test_missing_manifest_is_fatal() {
        let dir = tempdir().unwrap();
        let err = Overlay::load(OverlayConfig::new(dir.path(), Platform::Ios)).unwrap_err();
        assert!(err.is_fatal());
    }
}
