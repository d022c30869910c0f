use std::collections::BTreeMap;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::SelectionStore;

/// Selection store backed by a small JSON document on disk.
///
/// The whole document is rewritten on every change through a sibling
/// temp file and a rename, so a crash never leaves half a file behind.
pub struct FileSelectionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSelectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> anyhow::Result<BTreeMap<String, String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("corrupt selection file {}", self.path.display())),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e)
                .with_context(|| format!("failed to read selection file {}", self.path.display())),
        }
    }

    async fn write_document(&self, doc: &BTreeMap<String, String>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(doc)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl SelectionStore for FileSelectionStore {
    async fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_document().await?.remove(key))
    }

    async fn save(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read_document().await?;
        doc.insert(key.to_string(), value.to_string());
        self.write_document(&doc).await
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read_document().await?;
        if doc.remove(key).is_some() {
            self.write_document(&doc).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn value_survives_a_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console").join("selection.json");

        let store = FileSelectionStore::new(&path);
        assert_eq!(store.load("selectedSocietyId").await.unwrap(), None);
        store.save("selectedSocietyId", "society-4").await.unwrap();
        store.save("other", "x").await.unwrap();

        let reopened = FileSelectionStore::new(&path);
        assert_eq!(
            reopened.load("selectedSocietyId").await.unwrap(),
            Some("society-4".to_string())
        );

        reopened.remove("selectedSocietyId").await.unwrap();
        assert_eq!(reopened.load("selectedSocietyId").await.unwrap(), None);
        assert_eq!(reopened.load("other").await.unwrap(), Some("x".to_string()));
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selection.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();

        let store = FileSelectionStore::new(&path);
        assert!(store.load("selectedSocietyId").await.is_err());
    }
}
