//! In-process store for tests and throwaway sessions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use cardbox_core::error::StoreError;
use cardbox_core::model::{Card, CardList};
use cardbox_core::traits::{cards_key, decode_cards, decode_lists, encode, CardStore, LISTS_KEY};

/// Keeps encoded values in a map, so it shares the JSON codec (and its
/// degraded-read behavior) with the file store.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    write_count: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes, deletes included.
    pub fn write_count(&self) -> u32 {
        self.write_count.load(Ordering::Relaxed)
    }

    /// Raw encoded value under `key`, if any.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    /// Store an arbitrary value under `key`, bypassing the codec.
    pub fn put_raw(&self, key: &str, raw: impl Into<String>) {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), raw.into());
    }

    fn write(&self, key: String, raw: String) {
        self.put_raw(&key, raw);
        self.write_count.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl CardStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load_lists(&self) -> Result<Vec<CardList>, StoreError> {
        Ok(self.raw(LISTS_KEY).map(|raw| decode_lists(&raw)).unwrap_or_default())
    }

    async fn save_lists(&self, lists: &[CardList]) -> Result<(), StoreError> {
        let raw = encode(LISTS_KEY, lists)?;
        self.write(LISTS_KEY.to_string(), raw);
        Ok(())
    }

    async fn load_cards(&self, list_id: &str) -> Result<Vec<Card>, StoreError> {
        Ok(self
            .raw(&cards_key(list_id))
            .map(|raw| decode_cards(list_id, &raw))
            .unwrap_or_default())
    }

    async fn save_cards(&self, list_id: &str, cards: &[Card]) -> Result<(), StoreError> {
        let key = cards_key(list_id);
        let raw = encode(&key, cards)?;
        self.write(key, raw);
        Ok(())
    }

    async fn delete_cards(&self, list_id: &str) -> Result<(), StoreError> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&cards_key(list_id));
        self.write_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_writes() {
        let store = MemoryStore::new();
        assert_eq!(store.write_count(), 0);
        store.save_lists(&[CardList::new("a")]).await.unwrap();
        store.save_cards("a", &[Card::new("a", "p", "q")]).await.unwrap();
        store.delete_cards("a").await.unwrap();
        assert_eq!(store.write_count(), 3);
        assert!(store.load_cards("a").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn shares_codec_with_file_store() {
        let store = MemoryStore::new();
        store.put_raw(&cards_key("x"), "garbage");
        assert!(store.load_cards("x").await.unwrap().is_empty());

        store.put_raw(&cards_key("x"), r#"[{"name":"n","definition":"d"}]"#);
        let cards = store.load_cards("x").await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].list_id, "x");
        assert_eq!(cards[0].id, "x-0");
    }

    #[tokio::test]
    async fn works_behind_a_trait_object() {
        let store: std::sync::Arc<dyn CardStore> = std::sync::Arc::new(MemoryStore::new());
        let list = CardList::new("Nouns");
        store.save_lists(std::slice::from_ref(&list)).await.unwrap();
        assert_eq!(store.load_lists().await.unwrap(), vec![list]);
        assert_eq!(store.name(), "memory");
    }
}
