//! Filesystem loader backend

use super::loader::{AssetLoader, LoaderError, ProgressFn};
use super::resolver::ResolvedAsset;
use super::texture::{RawAsset, Texture};
use super::AssetHandle;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Loader that reads files below a root directory
///
/// `.png` files decode into [`Texture`]; everything else is handed out as
/// [`RawAsset`] bytes.
pub struct FileAssetLoader {
    root: PathBuf,
    cache: Mutex<HashMap<String, AssetHandle>>,
}

impl FileAssetLoader {
    /// Create a loader rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, url: &str) -> PathBuf {
        let path = Path::new(url);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn decode(url: &str, path: &Path, bytes: Vec<u8>) -> Result<AssetHandle, LoaderError> {
        let is_png = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));

        if is_png {
            Ok(Arc::new(Texture::from_bytes(url, &bytes)?))
        } else {
            Ok(Arc::new(RawAsset {
                source: url.to_string(),
                bytes,
            }))
        }
    }
}

#[async_trait]
impl AssetLoader for FileAssetLoader {
    async fn load_bundle(
        &self,
        bundle: &str,
        assets: &[ResolvedAsset],
        progress: ProgressFn<'_>,
    ) -> Result<Vec<(String, AssetHandle)>, LoaderError> {
        log::debug!(
            "Reading bundle '{}' ({} assets) from {:?}",
            bundle,
            assets.len(),
            self.root
        );

        let mut loaded = Vec::with_capacity(assets.len());
        for (index, asset) in assets.iter().enumerate() {
            let path = self.path_for(&asset.url);
            let bytes = tokio::fs::read(&path).await.map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    LoaderError::Missing {
                        url: asset.url.clone(),
                    }
                } else {
                    LoaderError::Io {
                        url: asset.url.clone(),
                        source,
                    }
                }
            })?;
            loaded.push((asset.name.clone(), Self::decode(&asset.url, &path, bytes)?));
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
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetBundle, AssetManager};
    use crate::config::AssetConfig;

    #[tokio::test]
    async fn test_loads_png_and_raw_files() {
        let dir = tempfile::tempdir().unwrap();
        image::RgbaImage::from_pixel(3, 2, image::Rgba([0, 128, 255, 255]))
            .save(dir.path().join("seven.png"))
            .unwrap();
        std::fs::write(dir.path().join("paytable.json"), br#"{"seven": 100}"#).unwrap();

        let loader = Arc::new(FileAssetLoader::new(dir.path()));
        let assets = AssetManager::new(loader, &AssetConfig::default());
        assets.register_bundle(
            AssetBundle::new("base")
                .with_asset("seven", "seven.png")
                .with_asset("paytable", "paytable.json"),
        );
        assets.load_bundle("base", None).await.unwrap();

        let texture = assets.get_asset::<Texture>("seven").unwrap();
        assert_eq!((texture.width, texture.height), (3, 2));
        assert_eq!(&texture.data[0..4], &[0, 128, 255, 255]);

        let raw = assets.get_asset::<RawAsset>("paytable").unwrap();
        assert_eq!(raw.bytes, br#"{"seven": 100}"#.to_vec());
    }

    #[tokio::test]
    async fn test_missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let loader = FileAssetLoader::new(dir.path());
        let entries = vec![ResolvedAsset {
            name: "ghost".to_string(),
            url: "ghost.png".to_string(),
            kind: None,
        }];
        let mut progress = |_p: f32| {};
        let err = loader
            .load_bundle("b", &entries, &mut progress)
            .await
            .unwrap_err();
        assert!(matches!(err, LoaderError::Missing { .. }));
    }
}
