//! In-memory loader backend

use super::loader::{AssetLoader, LoaderError, ProgressFn};
use super::resolver::ResolvedAsset;
use super::texture::Texture;
use super::AssetHandle;
use crate::config::AssetConfig;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Loader that serves pre-registered values by url
///
/// Useful for tests, tools and embedded builds where every resource is
/// already in memory. Supports artificial latency and failure injection.
#[derive(Default)]
pub struct MemoryAssetLoader {
    sources: Mutex<HashMap<String, AssetHandle>>,
    cache: Mutex<HashMap<String, AssetHandle>>,
    latency: Option<Duration>,
    fail_next: AtomicUsize,
    fail_init: AtomicBool,
    load_calls: AtomicUsize,
    released: Mutex<Vec<String>>,
    initialized: AtomicBool,
}

impl MemoryAssetLoader {
    /// Create an empty loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every bundle load
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Serve `value` for `url`
    pub fn insert_source<T: Any + Send + Sync>(&self, url: impl Into<String>, value: T) {
        self.sources.lock().insert(url.into(), Arc::new(value));
    }

    /// Serve a solid placeholder texture for `url`
    pub fn insert_texture(&self, url: impl Into<String>, width: u32, height: u32) {
        let url = url.into();
        let texture = Texture::solid_color(&url, width, height, [255, 255, 255, 255]);
        self.insert_source(url, texture);
    }

    /// Put a value straight into the global cache, outside any bundle
    pub fn preload<T: Any + Send + Sync>(&self, name: impl Into<String>, value: T) {
        self.cache.lock().insert(name.into(), Arc::new(value));
    }

    /// Make the next `count` bundle loads fail
    pub fn fail_next_loads(&self, count: usize) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    /// Make the next `init` fail
    pub fn fail_next_init(&self) {
        self.fail_init.store(true, Ordering::SeqCst);
    }

    /// Number of `load_bundle` invocations so far
    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    /// Names released so far, in order
    pub fn released(&self) -> Vec<String> {
        self.released.lock().clone()
    }

    /// Whether `init` ran
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetLoader for MemoryAssetLoader {
    async fn init(&self, _config: &AssetConfig) -> Result<(), LoaderError> {
        if self.fail_init.swap(false, Ordering::SeqCst) {
            return Err(LoaderError::Failed("injected init failure".to_string()));
        }
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn load_bundle(
        &self,
        bundle: &str,
        assets: &[ResolvedAsset],
        progress: ProgressFn<'_>,
    ) -> Result<Vec<(String, AssetHandle)>, LoaderError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);

        match self.latency {
            Some(latency) => tokio::time::sleep(latency).await,
            None => tokio::task::yield_now().await,
        }

        let should_fail = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(LoaderError::Failed(format!("injected failure for bundle '{bundle}'")));
        }

        let mut loaded = Vec::with_capacity(assets.len());
        for (index, asset) in assets.iter().enumerate() {
            let handle = self
                .sources
                .lock()
                .get(&asset.url)
                .cloned()
                .ok_or_else(|| LoaderError::Missing {
                    url: asset.url.clone(),
                })?;
            loaded.push((asset.name.clone(), handle));
            progress((index + 1) as f32 / assets.len() as f32);
        }
        if assets.is_empty() {
            progress(1.0);
        }

        let mut cache = self.cache.lock();
        for (name, handle) in &loaded {
            cache.insert(name.clone(), Arc::clone(handle));
        }
        Ok(loaded)
    }

    fn cached(&self, name: &str) -> Option<AssetHandle> {
        self.cache.lock().get(name).cloned()
    }

    fn release(&self, name: &str) {
        self.cache.lock().remove(name);
        self.released.lock().push(name.to_string());
    }
}
