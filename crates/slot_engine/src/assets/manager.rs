//! Bundle registry and exactly-once loading

use super::bundle::{AssetBundle, BundleState};
use super::loader::AssetLoader;
use super::resolver::AssetResolver;
use super::{AssetError, AssetHandle};
use crate::config::AssetConfig;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

struct BundleSlot {
    definition: AssetBundle,
    /// Set once the bundle is loaded; replaced by a fresh cell on unload
    loaded: Arc<OnceCell<()>>,
    /// Callers currently awaiting a load of this bundle
    loading: usize,
}

impl BundleSlot {
    fn new(definition: AssetBundle) -> Self {
        Self {
            definition,
            loaded: Arc::new(OnceCell::new()),
            loading: 0,
        }
    }

    fn state(&self) -> BundleState {
        if self.loaded.initialized() {
            BundleState::Loaded
        } else if self.loading > 0 {
            BundleState::Loading
        } else {
            BundleState::Registered
        }
    }
}

/// Decrements a slot's in-flight counter however the load ends, unless the
/// slot was replaced in the meantime
struct LoadingGuard<'a> {
    bundles: &'a Mutex<HashMap<String, BundleSlot>>,
    name: &'a str,
    cell: Arc<OnceCell<()>>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if let Some(slot) = self.bundles.lock().get_mut(self.name) {
            if Arc::ptr_eq(&slot.loaded, &self.cell) {
                slot.loading = slot.loading.saturating_sub(1);
            }
        }
    }
}

/// Registry of asset bundles for one engine
///
/// All methods take `&self`; locks are never held across an `.await`, so
/// several loads may be in flight at once. Concurrent loads of the same
/// bundle share one loader invocation.
///
/// There is no cancellation or timeout here. Wrap the future in
/// `tokio::time::timeout` if needed; a dropped load leaves the bundle
/// registered and retryable.
pub struct AssetManager {
    loader: Arc<dyn AssetLoader>,
    config: AssetConfig,
    resolver: Mutex<AssetResolver>,
    bundles: Mutex<HashMap<String, BundleSlot>>,
    cache: Mutex<HashMap<String, AssetHandle>>,
    initialized: AtomicBool,
}

impl AssetManager {
    /// Create a manager over a loader backend
    pub fn new(loader: Arc<dyn AssetLoader>, config: &AssetConfig) -> Self {
        Self {
            loader,
            config: config.clone(),
            resolver: Mutex::new(AssetResolver::new(config.base_path.clone())),
            bundles: Mutex::new(HashMap::new()),
            cache: Mutex::new(HashMap::new()),
            initialized: AtomicBool::new(false),
        }
    }

    /// Initialise the loader backend. Repeated calls are no-ops.
    pub async fn init(&self) -> Result<(), AssetError> {
        if self.initialized.load(Ordering::SeqCst) {
            log::debug!("Asset manager already initialised");
            return Ok(());
        }
        self.loader.init(&self.config).await.map_err(|e| {
            log::error!("Asset loader initialisation failed: {}", e);
            e
        })?;
        self.initialized.store(true, Ordering::SeqCst);
        log::info!("Asset manager initialised (base path '{}')", self.config.base_path);
        Ok(())
    }

    /// Whether `init` completed
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Register a bundle, replacing any previous definition with that name
    pub fn register_bundle(&self, bundle: AssetBundle) {
        let replaced_loaded = match self.bundles.lock().get(&bundle.name) {
            Some(existing) => {
                log::warn!("Bundle '{}' already registered, overwriting", bundle.name);
                existing.loaded.initialized()
            }
            None => false,
        };
        if replaced_loaded {
            self.unload_bundle(&bundle.name);
        }

        self.resolver.lock().add_bundle(&bundle);
        log::debug!("Registered bundle '{}' ({} assets)", bundle.name, bundle.assets.len());
        self.bundles
            .lock()
            .insert(bundle.name.clone(), BundleSlot::new(bundle));
    }

    /// Load a bundle, at most once.
    ///
    /// Already-loaded bundles resolve immediately. Concurrent callers for
    /// the same bundle wait on the same load. Progress is reported in
    /// `[0, 1]`. On loader failure the bundle stays retryable.
    pub async fn load_bundle(
        &self,
        name: &str,
        progress: Option<&mut (dyn FnMut(f32) + Send)>,
    ) -> Result<(), AssetError> {
        let mut noop = |_: f32| {};
        let sink: &mut (dyn FnMut(f32) + Send) = match progress {
            Some(callback) => callback,
            None => &mut noop,
        };

        let (cell, assets) = {
            let mut bundles = self.bundles.lock();
            let Some(slot) = bundles.get_mut(name) else {
                log::warn!("Cannot load unregistered bundle '{}'", name);
                return Err(AssetError::BundleNotFound(name.to_string()));
            };
            if slot.loaded.initialized() {
                sink(1.0);
                return Ok(());
            }
            slot.loading += 1;
            let assets = self
                .resolver
                .lock()
                .bundle(name)
                .map(<[_]>::to_vec)
                .unwrap_or_default();
            (Arc::clone(&slot.loaded), assets)
        };
        let _guard = LoadingGuard {
            bundles: &self.bundles,
            name,
            cell: Arc::clone(&cell),
        };

        let mut last_reported = None;
        let mut report = |p: f32| {
            let p = p.clamp(0.0, 1.0);
            last_reported = Some(p);
            sink(p);
        };
        let report_ref: &mut (dyn FnMut(f32) + Send) = &mut report;

        let loader = Arc::clone(&self.loader);
        let bundles = &self.bundles;
        let cache = &self.cache;
        let current = Arc::clone(&cell);
        cell.get_or_try_init(move || async move {
            log::debug!("Loading bundle '{}' ({} assets)", name, assets.len());
            let loaded = loader
                .load_bundle(name, &assets, report_ref)
                .await
                .map_err(|e| {
                    log::error!("Failed to load bundle '{}': {}", name, e);
                    AssetError::from(e)
                })?;

            let bundles = bundles.lock();
            let still_registered = bundles
                .get(name)
                .is_some_and(|slot| Arc::ptr_eq(&slot.loaded, &current));
            if !still_registered {
                log::debug!("Bundle '{}' was replaced while loading, discarding result", name);
                for (asset, _) in &loaded {
                    loader.release(asset);
                }
                return Ok(());
            }
            let mut cache = cache.lock();
            for (asset, handle) in loaded {
                cache.insert(asset, handle);
            }
            log::info!("Bundle '{}' loaded", name);
            Ok::<(), AssetError>(())
        })
        .await?;

        // Callers that waited on someone else's load still see completion
        if last_reported != Some(1.0) {
            sink(1.0);
        }
        Ok(())
    }

    /// Load several bundles in order with aggregated progress
    pub async fn load_bundles(
        &self,
        names: &[&str],
        mut progress: Option<&mut (dyn FnMut(f32) + Send)>,
    ) -> Result<(), AssetError> {
        let total = names.len().max(1) as f32;
        for (index, name) in names.iter().enumerate() {
            match progress.as_deref_mut() {
                Some(outer) => {
                    let mut scaled = |p: f32| outer((index as f32 + p) / total);
                    self.load_bundle(name, Some(&mut scaled)).await?;
                }
                None => self.load_bundle(name, None).await?,
            }
        }
        if names.is_empty() {
            if let Some(outer) = progress {
                outer(1.0);
            }
        }
        Ok(())
    }

    /// Type-erased asset lookup.
    ///
    /// Checks the local cache first, then the loader's global cache
    /// (memoising a hit). Misses return `None`.
    pub fn get_asset_handle(&self, name: &str) -> Option<AssetHandle> {
        if let Some(handle) = self.cache.lock().get(name) {
            return Some(Arc::clone(handle));
        }
        match self.loader.cached(name) {
            Some(handle) => {
                self.cache.lock().insert(name.to_string(), Arc::clone(&handle));
                Some(handle)
            }
            None => {
                log::warn!("Asset '{}' not found", name);
                None
            }
        }
    }

    /// Typed asset lookup; `None` on a miss or a type mismatch
    pub fn get_asset<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        let handle = self.get_asset_handle(name)?;
        match handle.downcast::<T>() {
            Ok(asset) => Some(asset),
            Err(_) => {
                log::warn!(
                    "Asset '{}' is not a {}",
                    name,
                    std::any::type_name::<T>()
                );
                None
            }
        }
    }

    /// Evict a loaded bundle's assets. Returns false if it was not loaded.
    pub fn unload_bundle(&self, name: &str) -> bool {
        let asset_names: Vec<String> = {
            let mut bundles = self.bundles.lock();
            let Some(slot) = bundles.get_mut(name) else {
                log::warn!("Cannot unload unregistered bundle '{}'", name);
                return false;
            };
            if !slot.loaded.initialized() {
                return false;
            }
            slot.loaded = Arc::new(OnceCell::new());
            slot.definition.asset_names().map(String::from).collect()
        };

        for asset in &asset_names {
            self.cache.lock().remove(asset);
            self.loader.release(asset);
        }
        log::info!("Bundle '{}' unloaded ({} assets)", name, asset_names.len());
        true
    }

    /// Lifecycle state of a bundle, `None` if unregistered
    pub fn bundle_state(&self, name: &str) -> Option<BundleState> {
        self.bundles.lock().get(name).map(BundleSlot::state)
    }

    /// Whether a bundle is loaded
    pub fn is_bundle_loaded(&self, name: &str) -> bool {
        self.bundle_state(name) == Some(BundleState::Loaded)
    }

    /// Registered bundle names, sorted
    pub fn bundle_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bundles.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of locally cached handles
    pub fn cached_asset_count(&self) -> usize {
        self.cache.lock().len()
    }

    /// Unload everything and forget every registration
    pub fn destroy(&self) {
        let loaded: Vec<String> = self
            .bundles
            .lock()
            .iter()
            .filter(|(_, slot)| slot.loaded.initialized())
            .map(|(name, _)| name.clone())
            .collect();
        for name in &loaded {
            self.unload_bundle(name);
        }

        self.bundles.lock().clear();
        self.resolver.lock().clear();
        self.cache.lock().clear();
        self.initialized.store(false, Ordering::SeqCst);
        log::debug!("Asset manager destroyed");
    }
}

impl std::fmt::Debug for AssetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetManager")
            .field("bundles", &self.bundle_names())
            .field("cached", &self.cached_asset_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{MemoryAssetLoader, Texture};
    use std::time::Duration;

    fn setup() -> (Arc<MemoryAssetLoader>, AssetManager) {
        let loader = Arc::new(MemoryAssetLoader::new().with_latency(Duration::from_millis(5)));
        loader.insert_texture("cherry.png", 4, 4);
        loader.insert_texture("bell.png", 8, 8);
        let manager = AssetManager::new(loader.clone(), &AssetConfig::default());
        manager.register_bundle(
            AssetBundle::new("symbols")
                .with_asset("cherry", "cherry.png")
                .with_asset("bell", "bell.png"),
        );
        (loader, manager)
    }

    #[tokio::test]
    async fn test_init_runs_loader_once() {
        let (loader, manager) = setup();
        manager.init().await.unwrap();
        manager.init().await.unwrap();
        assert!(loader.is_initialized());
        assert!(manager.is_initialized());
    }

    #[tokio::test]
    async fn test_load_unregistered_bundle_fails() {
        let (_, manager) = setup();
        let err = manager.load_bundle("missing", None).await.unwrap_err();
        assert!(matches!(err, AssetError::BundleNotFound(name) if name == "missing"));
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_one_invocation() {
        let (loader, manager) = setup();
        let (a, b) = tokio::join!(
            manager.load_bundle("symbols", None),
            manager.load_bundle("symbols", None)
        );
        a.unwrap();
        b.unwrap();
        assert_eq!(loader.load_calls(), 1);
        assert!(manager.is_bundle_loaded("symbols"));

        manager.load_bundle("symbols", None).await.unwrap();
        assert_eq!(loader.load_calls(), 1);
    }

    #[tokio::test]
    async fn test_progress_reaches_one() {
        let (_, manager) = setup();
        let mut seen = Vec::new();
        let mut record = |p: f32| seen.push(p);
        manager.load_bundle("symbols", Some(&mut record)).await.unwrap();
        assert_eq!(seen, vec![0.5, 1.0]);
    }

    #[tokio::test]
    async fn test_failure_leaves_bundle_retryable() {
        let (loader, manager) = setup();
        loader.fail_next_loads(1);

        assert!(manager.load_bundle("symbols", None).await.is_err());
        assert_eq!(manager.bundle_state("symbols"), Some(BundleState::Registered));

        manager.load_bundle("symbols", None).await.unwrap();
        assert_eq!(manager.bundle_state("symbols"), Some(BundleState::Loaded));
        assert_eq!(loader.load_calls(), 2);
    }

    #[tokio::test]
    async fn test_typed_lookup_and_mismatch() {
        let (_, manager) = setup();
        manager.load_bundle("symbols", None).await.unwrap();

        let cherry = manager.get_asset::<Texture>("cherry").unwrap();
        assert_eq!(cherry.width, 4);
        assert!(manager.get_asset::<String>("cherry").is_none());
        assert!(manager.get_asset::<Texture>("plum").is_none());
    }

    #[tokio::test]
    async fn test_lookup_falls_back_to_loader_cache() {
        let (loader, manager) = setup();
        loader.preload("logo", String::from("LOGO"));
        assert_eq!(manager.cached_asset_count(), 0);
        assert_eq!(manager.get_asset::<String>("logo").unwrap().as_str(), "LOGO");
        assert_eq!(manager.cached_asset_count(), 1);
    }

    #[tokio::test]
    async fn test_unload_evicts_and_allows_reload() {
        let (loader, manager) = setup();
        assert!(!manager.unload_bundle("symbols"));

        manager.load_bundle("symbols", None).await.unwrap();
        assert!(manager.unload_bundle("symbols"));
        assert_eq!(loader.released(), vec!["cherry".to_string(), "bell".to_string()]);
        assert!(manager.get_asset::<Texture>("cherry").is_none());
        assert_eq!(manager.bundle_state("symbols"), Some(BundleState::Registered));

        manager.load_bundle("symbols", None).await.unwrap();
        assert_eq!(loader.load_calls(), 2);
    }

    #[tokio::test]
    async fn test_reregister_loaded_bundle_unloads_first() {
        let (loader, manager) = setup();
        manager.load_bundle("symbols", None).await.unwrap();
        manager.register_bundle(AssetBundle::new("symbols").with_asset("bell", "bell.png"));

        assert_eq!(loader.released().len(), 2);
        assert_eq!(manager.bundle_state("symbols"), Some(BundleState::Registered));
    }

    #[tokio::test]
    async fn test_reregister_during_load_discards_stale_result() {
        let (loader, manager) = setup();

        let (result, ()) = tokio::join!(manager.load_bundle("symbols", None), async {
            tokio::task::yield_now().await;
            manager.register_bundle(AssetBundle::new("symbols").with_asset("bell", "bell.png"));
        });

        result.unwrap();
        assert_eq!(manager.bundle_state("symbols"), Some(BundleState::Registered));
        assert_eq!(manager.cached_asset_count(), 0);
        assert!(manager.get_asset::<Texture>("cherry").is_none());
        assert_eq!(loader.released(), vec!["cherry".to_string(), "bell".to_string()]);

        manager.load_bundle("symbols", None).await.unwrap();
        assert!(manager.is_bundle_loaded("symbols"));
        assert_eq!(manager.cached_asset_count(), 1);
    }

    #[tokio::test]
    async fn test_load_bundles_aggregates_progress() {
        let (loader, manager) = setup();
        loader.insert_source("paytable.json", String::from("{}"));
        manager.register_bundle(AssetBundle::new("data").with_asset("paytable", "paytable.json"));

        let mut seen = Vec::new();
        let mut record = |p: f32| seen.push(p);
        manager
            .load_bundles(&["symbols", "data"], Some(&mut record))
            .await
            .unwrap();
        assert_eq!(seen, vec![0.25, 0.5, 1.0]);
    }

    #[tokio::test]
    async fn test_destroy_releases_everything() {
        let (loader, manager) = setup();
        manager.load_bundle("symbols", None).await.unwrap();
        manager.destroy();

        assert_eq!(loader.released().len(), 2);
        assert!(manager.bundle_names().is_empty());
        assert_eq!(manager.cached_asset_count(), 0);
        assert!(!manager.is_initialized());
    }
}
