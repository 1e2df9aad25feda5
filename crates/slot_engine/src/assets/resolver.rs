//! Per-engine bundle resolver
//!
//! Maps bundle names to the concrete locations a loader should fetch. One
//! resolver belongs to one asset manager, so several engines in the same
//! process never see each other's mappings.

use super::bundle::AssetBundle;
use std::collections::HashMap;

/// Asset entry with its final location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    /// Asset name
    pub name: String,
    /// Location after joining with the base path
    pub url: String,
    /// Advisory type tag
    pub kind: Option<String>,
}

/// Bundle name to resolved entries
#[derive(Debug, Clone, Default)]
pub struct AssetResolver {
    base_path: String,
    bundles: HashMap<String, Vec<ResolvedAsset>>,
}

impl AssetResolver {
    /// Create a resolver that joins relative urls onto `base_path`
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            bundles: HashMap::new(),
        }
    }

    /// Base path used for relative urls
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Store (or replace) the mapping for a bundle
    pub fn add_bundle(&mut self, bundle: &AssetBundle) {
        let resolved = bundle
            .assets
            .iter()
            .map(|entry| ResolvedAsset {
                name: entry.name.clone(),
                url: self.resolve_url(&entry.url),
                kind: entry.kind.clone(),
            })
            .collect();
        self.bundles.insert(bundle.name.clone(), resolved);
    }

    /// Forget a bundle mapping
    pub fn remove_bundle(&mut self, name: &str) -> bool {
        self.bundles.remove(name).is_some()
    }

    /// Resolved entries of a bundle
    pub fn bundle(&self, name: &str) -> Option<&[ResolvedAsset]> {
        self.bundles.get(name).map(Vec::as_slice)
    }

    /// Drop every mapping
    pub fn clear(&mut self) {
        self.bundles.clear();
    }

    /// Join a url onto the base path unless it is absolute or has a scheme
    pub fn resolve_url(&self, url: &str) -> String {
        let is_absolute = url.starts_with('/') || url.contains("://") || url.starts_with("data:");
        if self.base_path.is_empty() || is_absolute {
            return url.to_string();
        }
        format!(
            "{}/{}",
            self.base_path.trim_end_matches('/'),
            url.trim_start_matches("./")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_and_absolute() {
        let resolver = AssetResolver::new("assets/");
        assert_eq!(resolver.resolve_url("./reels/cherry.png"), "assets/reels/cherry.png");
        assert_eq!(resolver.resolve_url("/abs/seven.png"), "/abs/seven.png");
        assert_eq!(
            resolver.resolve_url("https://cdn.example.com/bar.png"),
            "https://cdn.example.com/bar.png"
        );
    }

    #[test]
    fn test_add_bundle_keeps_order() {
        let mut resolver = AssetResolver::new("");
        let bundle = AssetBundle::new("symbols")
            .with_asset("cherry", "cherry.png")
            .with_asset("bell", "bell.png");
        resolver.add_bundle(&bundle);

        let names: Vec<_> = resolver
            .bundle("symbols")
            .unwrap()
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["cherry", "bell"]);
        assert!(resolver.remove_bundle("symbols"));
        assert!(resolver.bundle("symbols").is_none());
    }
}
