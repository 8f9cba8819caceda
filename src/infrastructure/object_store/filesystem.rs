//! FilesystemObjectStore — persists blobs as plain files with `mime_type`,
//! `last_modified`, and `last_fetched` carried in extended attributes under
//! the `user.` namespace (component D).
//!
//! On read, a missing attribute falls back to the file's mtime (for
//! `last_modified`/`last_fetched`) or a mime guess from the file extension
//! (for `mime_type`) — the xattrs are leading when present, never required.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use bytes::Bytes;
use filetime::FileTime;

use crate::domain::repositories::ObjectStore;
use crate::domain::value_objects::{Persisted, PersistedStat};
use crate::shared::error::StoreError;

const XATTR_MIME: &str = "user.mime_type";
const XATTR_LAST_MODIFIED: &str = "user.last_modified";
const XATTR_LAST_FETCHED: &str = "user.last_fetched";

pub struct FilesystemObjectStore {
    root: PathBuf,
}

impl FilesystemObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FilesystemObjectStore { root: root.into() }
    }

    fn resolve(&self, name: &str) -> PathBuf {
        self.root.join(name.trim_start_matches('/'))
    }

    fn read_xattr(path: &Path, key: &str) -> Option<String> {
        xattr::get(path, key)
            .ok()
            .flatten()
            .and_then(|bytes| String::from_utf8(bytes).ok())
    }

    fn guess_mime(path: &Path) -> String {
        mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string()
    }

    fn mtime_epoch(path: &Path) -> std::io::Result<i64> {
        let meta = std::fs::metadata(path)?;
        let modified = meta.modified()?;
        Ok(modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0))
    }

    fn build_stat(&self, path: &Path) -> std::io::Result<PersistedStat> {
        let size = std::fs::metadata(path)?.len();
        let mtime = Self::mtime_epoch(path)?;

        let content_type = Self::read_xattr(path, XATTR_MIME).unwrap_or_else(|| Self::guess_mime(path));
        let last_modified = Self::read_xattr(path, XATTR_LAST_MODIFIED)
            .and_then(|s| s.parse().ok())
            .unwrap_or(mtime);
        let last_fetched = Self::read_xattr(path, XATTR_LAST_FETCHED)
            .and_then(|s| s.parse().ok())
            .unwrap_or(mtime);

        Ok(PersistedStat {
            content_type,
            last_modified,
            last_fetched,
            ttl: -1,
            size,
        })
    }
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    async fn stat(&self, name: &str) -> Result<PersistedStat, StoreError> {
        let path = self.resolve(name);
        self.build_stat(&path)
            .map_err(|e| StoreError::not_found(name, e.to_string()))
    }

    async fn get(&self, name: &str) -> Result<Persisted, StoreError> {
        let path = self.resolve(name);
        let stat = self
            .build_stat(&path)
            .map_err(|e| StoreError::not_found(name, e.to_string()))?;
        let data =
            std::fs::read(&path).map_err(|e| StoreError::not_found(name, e.to_string()))?;

        Ok(Persisted {
            content_type: stat.content_type,
            last_modified: stat.last_modified,
            last_fetched: stat.last_fetched,
            ttl: stat.ttl,
            data: Bytes::from(data),
        })
    }

    async fn put(&self, name: &str, obj: Persisted) -> Result<(), StoreError> {
        let path = self.resolve(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::not_found(name, e.to_string()))?;
        }
        std::fs::write(&path, &obj.data).map_err(|e| StoreError::not_found(name, e.to_string()))?;

        xattr::set(&path, XATTR_MIME, obj.content_type.as_bytes()).ok();
        xattr::set(&path, XATTR_LAST_MODIFIED, obj.last_modified.to_string().as_bytes()).ok();
        xattr::set(&path, XATTR_LAST_FETCHED, obj.last_fetched.to_string().as_bytes()).ok();

        if obj.last_modified > 0 {
            let ft = FileTime::from_unix_time(obj.last_modified, 0);
            filetime::set_file_mtime(&path, ft).ok();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn roundtrips_bytes_and_metadata() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemObjectStore::new(dir.path());

        let obj = Persisted::new("text/xml", "<anime/>")
            .with_timestamps(1_000, 1_000)
            .with_ttl(60);
        store.put("anime/42.xml", obj).await.unwrap();

        let got = store.get("anime/42.xml").await.unwrap();
        assert_eq!(got.data.as_ref(), b"<anime/>");
        assert_eq!(got.content_type, "text/xml");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemObjectStore::new(dir.path());
        assert!(store.get("missing.xml").await.is_err());
    }

    #[tokio::test]
    async fn falls_back_to_extension_guess_without_xattr() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("plain.json"), b"{}").unwrap();
        let store = FilesystemObjectStore::new(dir.path());
        let stat = store.stat("plain.json").await.unwrap();
        assert_eq!(stat.content_type, "application/json");
    }
}
