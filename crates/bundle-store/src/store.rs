//! Read-only access to the data root.
//!
//! Resolution never writes. A missing file is `Ok(None)`; only unexpected
//! failures such as permission errors surface as `Err`.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use forecast_common::{BundleError, BundleResult};

/// Trait for the storage the resolver reads region data from.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Check whether a file exists.
    async fn exists(&self, path: &Path) -> BundleResult<bool>;

    /// Check whether a directory exists.
    async fn is_dir(&self, path: &Path) -> BundleResult<bool>;

    /// Read a UTF-8 file, `None` when it does not exist.
    async fn read_to_string(&self, path: &Path) -> BundleResult<Option<String>>;

    /// Names of the immediate subdirectories of `path`, in listing order.
    async fn list_dirs(&self, path: &Path) -> BundleResult<Vec<String>>;
}

/// Local filesystem store.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

#[async_trait]
impl DataStore for LocalStore {
    async fn exists(&self, path: &Path) -> BundleResult<bool> {
        match tokio::fs::metadata(path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BundleError::storage(path.display(), e)),
        }
    }

    async fn is_dir(&self, path: &Path) -> BundleResult<bool> {
        match tokio::fs::metadata(path).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BundleError::storage(path.display(), e)),
        }
    }

    async fn read_to_string(&self, path: &Path) -> BundleResult<Option<String>> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            // Non-UTF-8 content is a malformed document, not a storage failure
            Err(e) if e.kind() == ErrorKind::InvalidData => Err(BundleError::Parse(format!(
                "{}: {}",
                path.display(),
                e
            ))),
            Err(e) => Err(BundleError::storage(path.display(), e)),
        }
    }

    async fn list_dirs(&self, path: &Path) -> BundleResult<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(BundleError::storage(path.display(), e)),
        };

        let mut dirs = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| BundleError::storage(path.display(), e))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if !is_dir {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                dirs.push(name.to_string());
            }
        }
        Ok(dirs)
    }
}

/// Statistics for store access.
#[derive(Debug, Default)]
pub struct StoreStats {
    /// Existence probes issued.
    pub probes: AtomicU64,
    /// File reads issued (including reads of missing files).
    pub reads: AtomicU64,
    /// Directory listings issued.
    pub listings: AtomicU64,
}

/// A store wrapper that counts every access to the inner store.
pub struct CountingStore<S> {
    inner: S,
    stats: StoreStats,
}

impl<S: DataStore> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            stats: StoreStats::default(),
        }
    }

    pub fn stats(&self) -> &StoreStats {
        &self.stats
    }

    pub fn reads(&self) -> u64 {
        self.stats.reads.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl<S: DataStore> DataStore for CountingStore<S> {
    async fn exists(&self, path: &Path) -> BundleResult<bool> {
        self.stats.probes.fetch_add(1, Ordering::Relaxed);
        self.inner.exists(path).await
    }

    async fn is_dir(&self, path: &Path) -> BundleResult<bool> {
        self.stats.probes.fetch_add(1, Ordering::Relaxed);
        self.inner.is_dir(path).await
    }

    async fn read_to_string(&self, path: &Path) -> BundleResult<Option<String>> {
        self.stats.reads.fetch_add(1, Ordering::Relaxed);
        self.inner.read_to_string(path).await
    }

    async fn list_dirs(&self, path: &Path) -> BundleResult<Vec<String>> {
        self.stats.listings.fetch_add(1, Ordering::Relaxed);
        self.inner.list_dirs(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore;
        let path = dir.path().join("nope.json");

        assert!(!store.exists(&path).await.unwrap());
        assert!(store.read_to_string(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("summary.json")).unwrap();
        assert!(!LocalStore.exists(&dir.path().join("summary.json")).await.unwrap());
        assert!(LocalStore.is_dir(&dir.path().join("summary.json")).await.unwrap());
        assert!(!LocalStore.is_dir(&dir.path().join("whistler")).await.unwrap());
    }

    #[tokio::test]
    async fn test_non_utf8_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let result = LocalStore.read_to_string(&path).await;
        assert!(matches!(result, Err(BundleError::Parse(_))));
    }

    #[tokio::test]
    async fn test_list_dirs_skips_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("whistler")).unwrap();
        std::fs::write(dir.path().join("README"), "x").unwrap();

        let dirs = LocalStore.list_dirs(dir.path()).await.unwrap();
        assert_eq!(dirs, vec!["whistler".to_string()]);

        let missing = LocalStore.list_dirs(&dir.path().join("missing")).await.unwrap();
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_counting_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        std::fs::write(&path, "{}").unwrap();

        let store = CountingStore::new(LocalStore);
        store.exists(&path).await.unwrap();
        store.read_to_string(&path).await.unwrap();
        store.read_to_string(&path).await.unwrap();

        assert_eq!(store.reads(), 2);
        assert_eq!(store.stats().probes.load(Ordering::Relaxed), 1);
    }
}
