//! Offline cache of the widget's static assets.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::config::CacheConfig;
use crate::error::{Error, Result};

/// A named on-disk store of static assets, populated once on install.
#[derive(Debug, Clone)]
pub struct AssetCache {
    root: PathBuf,
    name: String,
}

/// Rejects asset paths that would escape the store.
fn checked_relative(asset: &str) -> Result<&Path> {
    let path = Path::new(asset);
    let ok = !asset.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if ok {
        Ok(path)
    } else {
        Err(Error::Io(std::io::Error::new(
            ErrorKind::InvalidInput,
            format!("asset path {asset:?} must be relative"),
        )))
    }
}

impl AssetCache {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.resolved_dir(), config.name.clone())
    }

    /// Directory holding this store's files.
    #[must_use]
    pub fn store_dir(&self) -> PathBuf {
        self.root.join(&self.name)
    }

    /// Copies every asset from `source_root` into the store.
    ///
    /// Either all assets are stored or none: a failure leaves the previous
    /// store contents in place.
    ///
    /// # Errors
    ///
    /// Returns an error if an asset is missing, unreadable or not a relative path.
    pub async fn install(&self, source_root: &Path, assets: &[String]) -> Result<usize> {
        let staging = self.root.join(format!("{}.tmp", self.name));
        if tokio::fs::metadata(&staging).await.is_ok() {
            tokio::fs::remove_dir_all(&staging).await?;
        }
        tokio::fs::create_dir_all(&staging).await?;

        if let Err(e) = Self::stage(&staging, source_root, assets).await {
            let _ = tokio::fs::remove_dir_all(&staging).await;
            return Err(e);
        }

        let store = self.store_dir();
        if tokio::fs::metadata(&store).await.is_ok() {
            tokio::fs::remove_dir_all(&store).await?;
        }
        tokio::fs::rename(&staging, &store).await?;
        log::info!("Cached {} asset(s) in {}", assets.len(), store.display());
        Ok(assets.len())
    }

    async fn stage(staging: &Path, source_root: &Path, assets: &[String]) -> Result<()> {
        for asset in assets {
            let relative = checked_relative(asset)?;
            let bytes = tokio::fs::read(source_root.join(relative)).await?;
            let dest = staging.join(relative);
            if let Some(parent) = dest.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&dest, bytes).await?;
        }
        Ok(())
    }

    /// Reads a cached asset, or `None` if it was never stored.
    ///
    /// # Errors
    ///
    /// Returns an error for paths outside the store or unreadable files.
    pub async fn get(&self, asset: &str) -> Result<Option<Vec<u8>>> {
        let relative = checked_relative(asset)?;
        match tokio::fs::read(self.store_dir().join(relative)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn contains(&self, asset: &str) -> bool {
        matches!(self.get(asset).await, Ok(Some(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn assets() -> Vec<String> {
        vec![
            "index.html".to_string(),
            "css/index.css".to_string(),
            "js/index.js".to_string(),
        ]
    }

    fn write_site(dir: &Path) {
        std::fs::create_dir_all(dir.join("css")).unwrap();
        std::fs::create_dir_all(dir.join("js")).unwrap();
        std::fs::write(dir.join("index.html"), "<html></html>").unwrap();
        std::fs::write(dir.join("css/index.css"), "body{}").unwrap();
        std::fs::write(dir.join("js/index.js"), "main()").unwrap();
    }

    #[tokio::test]
    async fn install_copies_every_asset() {
        let site = TempDir::new().unwrap();
        let cache_dir = TempDir::new().unwrap();
        write_site(site.path());

        let cache = AssetCache::new(cache_dir.path(), "static");
        assert_eq!(cache.install(site.path(), &assets()).await.unwrap(), 3);

        assert_eq!(
            cache.get("css/index.css").await.unwrap(),
            Some(b"body{}".to_vec())
        );
        assert!(cache.contains("js/index.js").await);
        assert!(cache_dir.path().join("static/index.html").exists());
        assert!(!cache_dir.path().join("static.tmp").exists());
    }

    #[tokio::test]
    async fn missing_asset_keeps_previous_store() {
        let site = TempDir::new().unwrap();
        let cache_dir = TempDir::new().unwrap();
        write_site(site.path());
        let cache = AssetCache::new(cache_dir.path(), "static");
        cache.install(site.path(), &assets()).await.unwrap();

        std::fs::remove_file(site.path().join("js/index.js")).unwrap();
        std::fs::write(site.path().join("index.html"), "changed").unwrap();
        assert!(cache.install(site.path(), &assets()).await.is_err());

        assert_eq!(
            cache.get("index.html").await.unwrap(),
            Some(b"<html></html>".to_vec())
        );
        assert!(!cache_dir.path().join("static.tmp").exists());
    }

    #[tokio::test]
    async fn unknown_asset_is_none() {
        let cache_dir = TempDir::new().unwrap();
        let cache = AssetCache::new(cache_dir.path(), "static");
        assert_eq!(cache.get("index.html").await.unwrap(), None);
        assert!(!cache.contains("index.html").await);
    }

    #[tokio::test]
    async fn rejects_escaping_paths() {
        let cache_dir = TempDir::new().unwrap();
        let cache = AssetCache::new(cache_dir.path(), "static");
        assert!(cache.get("../secret").await.is_err());
        assert!(cache.get("/etc/passwd").await.is_err());
        assert!(cache.get("").await.is_err());
    }
}
