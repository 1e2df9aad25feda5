//! Loader backends
//!
//! An [`AssetLoader`] is the surface-side half of asset management: it
//! fetches and decodes resources and keeps a global cache keyed by asset
//! name. The [`AssetManager`](super::AssetManager) decides *when* to load and
//! evict; the loader decides *how*.

use super::resolver::ResolvedAsset;
use super::AssetHandle;
use crate::config::AssetConfig;
use async_trait::async_trait;
use thiserror::Error;

/// Progress sink, called with values in `[0, 1]`
pub type ProgressFn<'a> = &'a mut (dyn FnMut(f32) + Send);

/// Fetch/decode backend used by the asset manager
#[async_trait]
pub trait AssetLoader: Send + Sync {
    /// One-time backend initialisation
    async fn init(&self, _config: &AssetConfig) -> Result<(), LoaderError> {
        Ok(())
    }

    /// Load every asset of a bundle, reporting progress as it goes
    async fn load_bundle(
        &self,
        bundle: &str,
        assets: &[ResolvedAsset],
        progress: ProgressFn<'_>,
    ) -> Result<Vec<(String, AssetHandle)>, LoaderError>;

    /// Look an asset up in the backend's global cache
    fn cached(&self, name: &str) -> Option<AssetHandle>;

    /// Release a cached asset
    fn release(&self, name: &str);
}

/// Loader failures
#[derive(Error, Debug)]
pub enum LoaderError {
    /// Nothing exists at the location
    #[error("Asset source not found: {url}")]
    Missing {
        /// Location that was requested
        url: String,
    },

    /// Reading the location failed
    #[error("IO error reading {url}: {source}")]
    Io {
        /// Location that was requested
        url: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Bytes could not be decoded
    #[error("Failed to decode {url}: {message}")]
    Decode {
        /// Location that was requested
        url: String,
        /// Decoder message
        message: String,
    },

    /// Backend-specific failure
    #[error("Loader failure: {0}")]
    Failed(String),
}
