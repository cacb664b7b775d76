//! JSON files on disk: `lists.json` plus `cards/<list-id>.json`.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use cardbox_core::error::StoreError;
use cardbox_core::model::{Card, CardList};
use cardbox_core::traits::{cards_key, decode_cards, decode_lists, encode, CardStore, LISTS_KEY};

/// File-backed store rooted at a data directory.
///
/// Each key is written to a sibling temp file first and then renamed over
/// the target, so readers never see a partial write.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// The directory is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding the value stored under `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    async fn read_key(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => {
                tracing::debug!(key, path = %path.display(), bytes = raw.len(), "read");
                Ok(Some(raw))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(key, path = %path.display(), "missing, reading as empty");
                Ok(None)
            }
            Err(source) => Err(io_error(key, source)),
        }
    }

    async fn write_key(&self, key: &str, raw: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| io_error(key, source))?;
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| key.to_string());
        let tmp = path.with_file_name(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4()));

        if let Err(source) = tokio::fs::write(&tmp, raw).await {
            return Err(io_error(key, source));
        }
        if let Err(source) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_error(key, source));
        }
        tracing::debug!(key, path = %path.display(), bytes = raw.len(), "wrote");
        Ok(())
    }
}

fn io_error(key: &str, source: io::Error) -> StoreError {
    StoreError::Io {
        key: key.to_string(),
        source,
    }
}

#[async_trait]
impl CardStore for JsonFileStore {
    fn name(&self) -> &str {
        "json"
    }

    async fn load_lists(&self) -> Result<Vec<CardList>, StoreError> {
        Ok(self
            .read_key(LISTS_KEY)
            .await?
            .map(|raw| decode_lists(&raw))
            .unwrap_or_default())
    }

    async fn save_lists(&self, lists: &[CardList]) -> Result<(), StoreError> {
        let raw = encode(LISTS_KEY, lists)?;
        self.write_key(LISTS_KEY, &raw).await
    }

    async fn load_cards(&self, list_id: &str) -> Result<Vec<Card>, StoreError> {
        Ok(self
            .read_key(&cards_key(list_id))
            .await?
            .map(|raw| decode_cards(list_id, &raw))
            .unwrap_or_default())
    }

    async fn save_cards(&self, list_id: &str, cards: &[Card]) -> Result<(), StoreError> {
        let key = cards_key(list_id);
        let raw = encode(&key, cards)?;
        self.write_key(&key, &raw).await
    }

    async fn delete_cards(&self, list_id: &str) -> Result<(), StoreError> {
        let key = cards_key(list_id);
        match tokio::fs::remove_file(self.path_for(&key)).await {
            Ok(()) => {
                tracing::debug!(key = %key, "deleted");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(io_error(&key, source)),
        }
    }
}
