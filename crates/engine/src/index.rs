//! Path-prefix index over all extracted rules.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use overlay_core::TransformRule;

/// Immutable lookup from a file path to the rules that govern it.
#[derive(Debug, Clone, Default)]
pub struct RuleIndex {
    rules: BTreeMap<PathBuf, Vec<TransformRule>>,
}

impl RuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule. Returns false if an identical rule was already present.
    pub fn insert(&mut self, rule: TransformRule) -> bool {
        let slot = self.rules.entry(rule.source_path().to_path_buf()).or_default();
        if slot.contains(&rule) {
            return false;
        }
        slot.push(rule);
        true
    }

    /// Every rule whose source path equals `path` or is one of its ancestors,
    /// deepest first.
    pub fn rules_for(&self, path: &Path) -> Vec<&TransformRule> {
        path.ancestors()
            .filter_map(|ancestor| self.rules.get(ancestor))
            .flatten()
            .collect()
    }

    /// Returns true if at least one rule governs `path`.
    pub fn should_watch(&self, path: &Path) -> bool {
        path.ancestors().any(|ancestor| self.rules.contains_key(ancestor))
    }

    /// Iterates over all rules, ordered by source path.
    pub fn iter(&self) -> impl Iterator<Item = &TransformRule> {
        self.rules.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<TransformRule> for RuleIndex {
    fn from_iter<I: IntoIterator<Item = TransformRule>>(iter: I) -> Self {
        let mut index = Self::new();
        for rule in iter {
            index.insert(rule);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(source: &str) -> TransformRule {
        TransformRule::ModuleWrap {
            plugin: "p".to_string(),
            source_path: PathBuf::from(source),
            declared_source: "www/module.js".to_string(),
            export_name: "Module".to_string(),
        }
    }

    fn asset(source: &str, target: &str) -> TransformRule {
        TransformRule::AssetCopy {
            plugin: "p".to_string(),
            source_path: PathBuf::from(source),
            declared_source: "www".to_string(),
            target: PathBuf::from(target),
        }
    }

    #[test]
    fn test_directory_rule_matches_descendants() {
        let index: RuleIndex = vec![asset("/p/www", "p")].into_iter().collect();

        assert_eq!(index.rules_for(Path::new("/p/www/img/a.png")).len(), 1);
        assert_eq!(index.rules_for(Path::new("/p/www")).len(), 1);
        assert!(index.rules_for(Path::new("/p/www2/a.png")).is_empty());
        assert!(index.rules_for(Path::new("/p")).is_empty());
    }

    #[test]
    fn test_file_rule_matches_only_itself() {
        let index: RuleIndex = vec![module("/p/www/module.js")].into_iter().collect();

        assert!(index.should_watch(Path::new("/p/www/module.js")));
        assert!(!index.should_watch(Path::new("/p/www/module.json")));
        assert!(!index.should_watch(Path::new("/p/www/other.js")));
    }

    #[test]
    fn test_overlapping_rules_all_match() {
        let index: RuleIndex = vec![asset("/p/www", "p"), module("/p/www/module.js")]
            .into_iter()
            .collect();

        let rules = index.rules_for(Path::new("/p/www/module.js"));
        assert_eq!(rules.len(), 2);
        // deepest first
        assert_eq!(rules[0], &module("/p/www/module.js"));
    }

    #[test]
    fn test_same_source_different_rules() {
        let mut index = RuleIndex::new();
        assert!(index.insert(module("/p/www/module.js")));
        assert!(index.insert(asset("/p/www/module.js", "js/module.js")));
        assert!(!index.insert(module("/p/www/module.js")));

        assert_eq!(index.len(), 2);
        assert_eq!(index.rules_for(Path::new("/p/www/module.js")).len(), 2);
    }
}
