//! Bundle definitions

use serde::{Deserialize, Serialize};

/// One asset inside a bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    /// Name used with `get_asset`
    pub name: String,
    /// Location relative to the asset base path, or absolute
    pub url: String,
    /// Advisory type tag ("texture", "json", ...). Not used to pick a loader.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl AssetEntry {
    /// Create an entry without a type tag
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            kind: None,
        }
    }

    /// Attach an advisory type tag
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

/// Named, ordered group of assets loaded and evicted together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetBundle {
    /// Bundle name, unique per asset manager
    pub name: String,
    /// Assets in load order
    pub assets: Vec<AssetEntry>,
}

impl AssetBundle {
    /// Create an empty bundle
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            assets: Vec::new(),
        }
    }

    /// Append an asset (builder pattern)
    pub fn with_asset(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.assets.push(AssetEntry::new(name, url));
        self
    }

    /// Append a prepared entry (builder pattern)
    pub fn with_entry(mut self, entry: AssetEntry) -> Self {
        self.assets.push(entry);
        self
    }

    /// Asset names in order
    pub fn asset_names(&self) -> impl Iterator<Item = &str> {
        self.assets.iter().map(|a| a.name.as_str())
    }
}

/// Lifecycle of a registered bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BundleState {
    /// Known but not loaded
    Registered,
    /// A load is in flight
    Loading,
    /// Loaded and cached
    Loaded,
}
