//! Read-modify-write operations over a [`CardStore`].
//!
//! The repository is the only writer of lists and cards. Each mutation
//! reads the whole collection, changes it, and writes it back while holding
//! an in-process lock, so two tasks sharing one repository never interleave
//! their cycles. Separate processes can still overwrite each other.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::{CardboxError, Result};
use crate::exchange::{parse_bulk_text, Envelope};
use crate::model::{Card, CardList};
use crate::traits::CardStore;

/// Shared handle to the card collections of every list.
#[derive(Clone)]
pub struct CardRepository {
    store: Arc<dyn CardStore>,
    write_lock: Arc<Mutex<()>>,
}

impl CardRepository {
    pub fn new(store: Arc<dyn CardStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Name of the backing store.
    pub fn backend(&self) -> &str {
        self.store.name()
    }

    // -- lists -------------------------------------------------------------

    pub async fn lists(&self) -> Result<Vec<CardList>> {
        Ok(self.store.load_lists().await?)
    }

    /// Look a list up by id, then by exact name.
    pub async fn find_list(&self, key: &str) -> Result<CardList> {
        let lists = self.store.load_lists().await?;
        lists
            .iter()
            .find(|list| list.id == key)
            .or_else(|| lists.iter().find(|list| list.name == key))
            .cloned()
            .ok_or_else(|| CardboxError::ListNotFound(key.to_string()))
    }

    pub async fn create_list(&self, name: &str) -> Result<CardList> {
        let name = require_text("list name", name)?;
        let _guard = self.write_lock.lock().await;

        let mut lists = self.store.load_lists().await?;
        let list = CardList::new(name);
        lists.push(list.clone());
        self.store.save_lists(&lists).await?;

        tracing::info!(list = %list.id, name = %list.name, "created list");
        Ok(list)
    }

    pub async fn rename_list(&self, list_id: &str, name: &str) -> Result<CardList> {
        let name = require_text("list name", name)?;
        let _guard = self.write_lock.lock().await;

        let mut lists = self.store.load_lists().await?;
        let list = lists
            .iter_mut()
            .find(|list| list.id == list_id)
            .ok_or_else(|| CardboxError::ListNotFound(list_id.to_string()))?;
        list.name = name.to_string();
        let renamed = list.clone();
        self.store.save_lists(&lists).await?;

        tracing::info!(list = %renamed.id, name = %renamed.name, "renamed list");
        Ok(renamed)
    }

    /// Delete a list and every card it owns.
    pub async fn delete_list(&self, list_id: &str) -> Result<CardList> {
        let _guard = self.write_lock.lock().await;

        let mut lists = self.store.load_lists().await?;
        let index = lists
            .iter()
            .position(|list| list.id == list_id)
            .ok_or_else(|| CardboxError::ListNotFound(list_id.to_string()))?;
        let removed = lists.remove(index);

        // header first; a failed card delete then only orphans data
        self.store.save_lists(&lists).await?;
        self.store.delete_cards(list_id).await?;

        tracing::info!(list = %removed.id, name = %removed.name, "deleted list");
        Ok(removed)
    }

    // -- cards -------------------------------------------------------------

    /// Cards of an existing list.
    pub async fn cards(&self, list_id: &str) -> Result<Vec<Card>> {
        self.require_list(list_id).await?;
        Ok(self.store.load_cards(list_id).await?)
    }

    /// Overwrite a list's whole card collection.
    pub async fn save_cards(&self, list_id: &str, cards: &[Card]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        Ok(self.store.save_cards(list_id, cards).await?)
    }

    pub async fn add_card(&self, list_id: &str, prompt: &str, answer: &str) -> Result<Card> {
        let prompt = require_text("prompt", prompt)?;
        let answer = require_text("answer", answer)?;
        self.require_list(list_id).await?;
        let _guard = self.write_lock.lock().await;

        let mut cards = self.store.load_cards(list_id).await?;
        let card = Card::new(list_id, prompt, answer);
        cards.push(card.clone());
        self.store.save_cards(list_id, &cards).await?;

        tracing::info!(list = %list_id, card = %card.id, "added card");
        Ok(card)
    }

    /// Change the text of a card. Scheduling fields are left alone.
    pub async fn edit_card(
        &self,
        list_id: &str,
        card_id: &str,
        prompt: Option<&str>,
        answer: Option<&str>,
    ) -> Result<Card> {
        let prompt = prompt.map(|p| require_text("prompt", p)).transpose()?;
        let answer = answer.map(|a| require_text("answer", a)).transpose()?;
        self.require_list(list_id).await?;
        let _guard = self.write_lock.lock().await;

        let mut cards = self.store.load_cards(list_id).await?;
        let card = cards
            .iter_mut()
            .find(|card| card.id == card_id)
            .ok_or_else(|| CardboxError::CardNotFound(card_id.to_string()))?;
        if let Some(prompt) = prompt {
            card.prompt = prompt.to_string();
        }
        if let Some(answer) = answer {
            card.answer = answer.to_string();
        }
        let edited = card.clone();
        self.store.save_cards(list_id, &cards).await?;

        tracing::info!(list = %list_id, card = %card_id, "edited card");
        Ok(edited)
    }

    pub async fn delete_card(&self, list_id: &str, card_id: &str) -> Result<Card> {
        self.require_list(list_id).await?;
        let _guard = self.write_lock.lock().await;

        let mut cards = self.store.load_cards(list_id).await?;
        let index = cards
            .iter()
            .position(|card| card.id == card_id)
            .ok_or_else(|| CardboxError::CardNotFound(card_id.to_string()))?;
        let removed = cards.remove(index);
        self.store.save_cards(list_id, &cards).await?;

        tracing::info!(list = %list_id, card = %card_id, "deleted card");
        Ok(removed)
    }

    /// Write back one rescheduled card and return the list as stored.
    pub async fn replace_card(&self, list_id: &str, updated: &Card) -> Result<Vec<Card>> {
        let _guard = self.write_lock.lock().await;

        let mut cards = self.store.load_cards(list_id).await?;
        let slot = cards
            .iter_mut()
            .find(|card| card.id == updated.id)
            .ok_or_else(|| CardboxError::CardNotFound(updated.id.clone()))?;
        *slot = updated.clone();
        self.store.save_cards(list_id, &cards).await?;

        tracing::debug!(
            list = %list_id,
            card = %updated.id,
            interval = updated.interval,
            "saved review"
        );
        Ok(cards)
    }

    // -- import / export ---------------------------------------------------

    /// Append cards parsed from `Name - Definition` lines. Returns how many.
    pub async fn import_text(&self, list_id: &str, text: &str) -> Result<usize> {
        self.require_list(list_id).await?;
        let parsed = parse_bulk_text(list_id, text);
        if parsed.is_empty() {
            return Ok(0);
        }
        let _guard = self.write_lock.lock().await;

        let mut cards = self.store.load_cards(list_id).await?;
        let count = parsed.len();
        cards.extend(parsed);
        self.store.save_cards(list_id, &cards).await?;

        tracing::info!(list = %list_id, count, "imported cards from text");
        Ok(count)
    }

    /// Create one new list per envelope entry, with fresh cards.
    pub async fn import_envelope(&self, envelope: &Envelope) -> Result<Vec<(CardList, usize)>> {
        let _guard = self.write_lock.lock().await;

        let mut lists = self.store.load_lists().await?;
        let mut imported = Vec::with_capacity(envelope.lists.len());
        for entry in &envelope.lists {
            let name = entry.name.trim();
            let list = CardList::new(if name.is_empty() { "Imported" } else { name });
            let cards = entry.to_cards(&list.id);
            self.store.save_cards(&list.id, &cards).await?;
            lists.push(list.clone());
            imported.push((list, cards.len()));
        }
        self.store.save_lists(&lists).await?;

        tracing::info!(lists = imported.len(), cards = envelope.card_count(), "imported envelope");
        Ok(imported)
    }

    /// Every list with its cards, without scheduling state.
    pub async fn export_envelope(&self) -> Result<Envelope> {
        let lists = self.store.load_lists().await?;
        let mut collected = Vec::with_capacity(lists.len());
        for list in &lists {
            collected.push(self.store.load_cards(&list.id).await?);
        }
        Ok(Envelope::from_lists(
            lists.iter().zip(collected.iter().map(Vec::as_slice)),
        ))
    }

    async fn require_list(&self, list_id: &str) -> Result<()> {
        let lists = self.store.load_lists().await?;
        if lists.iter().any(|list| list.id == list_id) {
            Ok(())
        } else {
            Err(CardboxError::ListNotFound(list_id.to_string()))
        }
    }
}

fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CardboxError::InvalidInput(format!("{field} must not be blank")));
    }
    Ok(trimmed)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::StoreError;
    use crate::traits::{cards_key, decode_cards, decode_lists, encode, LISTS_KEY};

    /// Key/value store kept in a map, encoding values like a real backend.
    #[derive(Default)]
    pub(crate) struct MapStore {
        values: StdMutex<HashMap<String, String>>,
        fail_list_writes: AtomicBool,
    }

    impl MapStore {
        pub(crate) fn raw(&self, key: &str) -> Option<String> {
            self.values.lock().unwrap().get(key).cloned()
        }

        pub(crate) fn put_raw(&self, key: &str, value: &str) {
            self.values.lock().unwrap().insert(key.to_string(), value.to_string());
        }

        pub(crate) fn fail_list_writes(&self, fail: bool) {
            self.fail_list_writes.store(fail, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl CardStore for MapStore {
        fn name(&self) -> &str {
            "map"
        }

        async fn load_lists(&self) -> std::result::Result<Vec<CardList>, StoreError> {
            Ok(self.raw(LISTS_KEY).map(|raw| decode_lists(&raw)).unwrap_or_default())
        }

        async fn save_lists(&self, lists: &[CardList]) -> std::result::Result<(), StoreError> {
            if self.fail_list_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Io {
                    key: LISTS_KEY.into(),
                    source: std::io::Error::other("disk full"),
                });
            }
            let raw = encode(LISTS_KEY, lists)?;
            self.put_raw(LISTS_KEY, &raw);
            Ok(())
        }

        async fn load_cards(&self, list_id: &str) -> std::result::Result<Vec<Card>, StoreError> {
            Ok(self
                .raw(&cards_key(list_id))
                .map(|raw| decode_cards(list_id, &raw))
                .unwrap_or_default())
        }

        async fn save_cards(
            &self,
            list_id: &str,
            cards: &[Card],
        ) -> std::result::Result<(), StoreError> {
            let key = cards_key(list_id);
            let raw = encode(&key, cards)?;
            self.put_raw(&key, &raw);
            Ok(())
        }

        async fn delete_cards(&self, list_id: &str) -> std::result::Result<(), StoreError> {
            self.values.lock().unwrap().remove(&cards_key(list_id));
            Ok(())
        }
    }

    pub(crate) fn fixture() -> (Arc<MapStore>, CardRepository) {
        let store = Arc::new(MapStore::default());
        let repository = CardRepository::new(store.clone());
        (store, repository)
    }

    #[tokio::test]
    async fn create_find_rename_list() {
        let (_, repo) = fixture();
        let list = repo.create_list("  Vocabulary ").await.unwrap();
        assert_eq!(list.name, "Vocabulary");

        assert_eq!(repo.find_list(&list.id).await.unwrap().id, list.id);
        assert_eq!(repo.find_list("Vocabulary").await.unwrap().id, list.id);

        repo.rename_list(&list.id, "Words").await.unwrap();
        assert_eq!(repo.find_list("Words").await.unwrap().id, list.id);
        assert!(repo.find_list("Vocabulary").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn blank_names_are_rejected() {
        let (_, repo) = fixture();
        assert!(matches!(
            repo.create_list("   ").await,
            Err(CardboxError::InvalidInput(_))
        ));
        let list = repo.create_list("L").await.unwrap();
        assert!(matches!(
            repo.add_card(&list.id, "p", " ").await,
            Err(CardboxError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn delete_list_cascades_to_cards() {
        let (store, repo) = fixture();
        let list = repo.create_list("Doomed").await.unwrap();
        repo.add_card(&list.id, "a", "b").await.unwrap();
        assert!(store.raw(&cards_key(&list.id)).is_some());

        repo.delete_list(&list.id).await.unwrap();
        assert!(store.raw(&cards_key(&list.id)).is_none());
        assert!(repo.lists().await.unwrap().is_empty());
        assert!(repo.cards(&list.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn failed_list_delete_keeps_cards() {
        let (store, repo) = fixture();
        let list = repo.create_list("Kept").await.unwrap();
        repo.add_card(&list.id, "a", "b").await.unwrap();

        store.fail_list_writes(true);
        assert!(repo.delete_list(&list.id).await.is_err());
        store.fail_list_writes(false);

        assert_eq!(repo.lists().await.unwrap().len(), 1);
        assert_eq!(repo.cards(&list.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn stored_cards_without_ids_are_addressable() {
        let (store, repo) = fixture();
        let list = repo.create_list("Old").await.unwrap();
        store.put_raw(
            &cards_key(&list.id),
            r#"[{"name":"un","definition":"one"},{"name":"deux","definition":"two"}]"#,
        );

        let listed = repo.cards(&list.id).await.unwrap();
        let (first, second) = (listed[0].id.clone(), listed[1].id.clone());
        assert_eq!(repo.cards(&list.id).await.unwrap(), listed);

        let edited = repo.edit_card(&list.id, &second, None, Some("2")).await.unwrap();
        assert_eq!(edited.id, second);

        let mut reviewed = edited.clone();
        reviewed.total_wins = 1;
        repo.replace_card(&list.id, &reviewed).await.unwrap();

        let removed = repo.delete_card(&list.id, &first).await.unwrap();
        assert_eq!(removed.prompt, "un");

        // the survivor keeps its id now that it has been written back
        let remaining = repo.cards(&list.id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, second);
        assert_eq!(remaining[0].answer, "2");
        assert_eq!(remaining[0].total_wins, 1);
    }

    #[tokio::test]
    async fn edit_card_keeps_scheduling_state() {
        let (_, repo) = fixture();
        let list = repo.create_list("L").await.unwrap();
        let card = repo.add_card(&list.id, "p", "a").await.unwrap();

        let mut cards = repo.cards(&list.id).await.unwrap();
        cards[0].interval = 42;
        cards[0].total_wins = 3;
        repo.save_cards(&list.id, &cards).await.unwrap();

        let edited = repo.edit_card(&list.id, &card.id, None, Some("answer 2")).await.unwrap();
        assert_eq!(edited.prompt, "p");
        assert_eq!(edited.answer, "answer 2");
        assert_eq!(edited.interval, 42);
        assert_eq!(edited.total_wins, 3);
    }

    #[tokio::test]
    async fn unknown_ids_are_reported() {
        let (_, repo) = fixture();
        let list = repo.create_list("L").await.unwrap();
        assert!(matches!(
            repo.delete_card(&list.id, "nope").await,
            Err(CardboxError::CardNotFound(_))
        ));
        assert!(matches!(
            repo.add_card("missing", "p", "a").await,
            Err(CardboxError::ListNotFound(_))
        ));
    }

    #[tokio::test]
    async fn import_text_appends_parsed_cards() {
        let (_, repo) = fixture();
        let list = repo.create_list("fr").await.unwrap();
        repo.add_card(&list.id, "existing", "card").await.unwrap();
        let count = repo
            .import_text(&list.id, "Mot 1 - Définition 1\nbadline\nMot 2 - Définition 2")
            .await
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(repo.cards(&list.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn envelope_roundtrip_creates_fresh_lists() {
        let (_, repo) = fixture();
        let list = repo.create_list("Source").await.unwrap();
        repo.add_card(&list.id, "one", "1").await.unwrap();
        let mut cards = repo.cards(&list.id).await.unwrap();
        cards[0].total_wins = 9;
        repo.save_cards(&list.id, &cards).await.unwrap();

        let envelope = repo.export_envelope().await.unwrap();
        let imported = repo.import_envelope(&envelope).await.unwrap();
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].1, 1);
        assert_ne!(imported[0].0.id, list.id);

        let copied = repo.cards(&imported[0].0.id).await.unwrap();
        assert_eq!(copied[0].prompt, "one");
        assert!(copied[0].is_new());
        assert_eq!(repo.lists().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn malformed_stored_cards_read_as_empty_list() {
        let (store, repo) = fixture();
        let list = repo.create_list("Broken").await.unwrap();
        store.put_raw(&cards_key(&list.id), "][");
        assert!(repo.cards(&list.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_card_requires_existing_card() {
        let (_, repo) = fixture();
        let list = repo.create_list("L").await.unwrap();
        let stray = Card::new(&list.id, "p", "a");
        assert!(matches!(
            repo.replace_card(&list.id, &stray).await,
            Err(CardboxError::CardNotFound(_))
        ));
    }
}
