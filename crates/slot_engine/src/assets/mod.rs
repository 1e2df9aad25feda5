//! Asset bundles
//!
//! Assets are registered and evicted in named bundles. The
//! [`AssetManager`] owns the bundle registry and local handle cache and
//! delegates fetching/decoding to an [`AssetLoader`] backend.

pub mod bundle;
pub mod file_loader;
pub mod loader;
pub mod manager;
pub mod memory_loader;
pub mod resolver;
pub mod texture;

pub use bundle::{AssetBundle, AssetEntry, BundleState};
pub use file_loader::FileAssetLoader;
pub use loader::{AssetLoader, LoaderError, ProgressFn};
pub use manager::AssetManager;
pub use memory_loader::MemoryAssetLoader;
pub use resolver::{AssetResolver, ResolvedAsset};
pub use texture::{RawAsset, Texture};

use std::any::Any;
use std::sync::Arc;
use thiserror::Error;

/// Type-erased, shareable asset value
pub type AssetHandle = Arc<dyn Any + Send + Sync>;

/// Asset manager errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// The bundle was never registered
    #[error("Bundle not registered: {0}")]
    BundleNotFound(String),

    /// The loader backend failed
    #[error(transparent)]
    Loader(#[from] LoaderError),
}
