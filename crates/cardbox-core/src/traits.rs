//! The storage seam and the persisted record codec.
//!
//! `CardStore` is implemented by the `cardbox-store` crate. Every backend
//! shares the codec below, so all of them degrade the same way on bad data.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::StoreError;
use crate::model::{fallback_card_id, Card, CardList};

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// Whole-collection persistence for lists and their cards.
///
/// Writes replace the full collection stored under a key; there are no
/// partial updates.
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Human-readable backend name (e.g. "json").
    fn name(&self) -> &str;

    /// All list headers, in display order.
    async fn load_lists(&self) -> Result<Vec<CardList>, StoreError>;

    async fn save_lists(&self, lists: &[CardList]) -> Result<(), StoreError>;

    /// Every card of one list. A list never written reads as empty.
    async fn load_cards(&self, list_id: &str) -> Result<Vec<Card>, StoreError>;

    async fn save_cards(&self, list_id: &str, cards: &[Card]) -> Result<(), StoreError>;

    /// Drop a list's card collection. Missing collections are not an error.
    async fn delete_cards(&self, list_id: &str) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Keys and codec
// ---------------------------------------------------------------------------

/// Key holding the list headers.
pub const LISTS_KEY: &str = "lists";

/// Key holding one list's cards.
pub fn cards_key(list_id: &str) -> String {
    format!("cards/{list_id}")
}

/// Decode the card array stored under `list_id`.
///
/// Malformed data reads as an empty list (logged at `warn`). Each card is
/// normalized: missing `id` and `listId` are filled in and `score`
/// re-derived.
pub fn decode_cards(list_id: &str, raw: &str) -> Vec<Card> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<Card>>(raw) {
        Ok(mut cards) => {
            for (position, card) in cards.iter_mut().enumerate() {
                if card.id.trim().is_empty() {
                    card.id = fallback_card_id(list_id, position);
                }
                card.normalize(list_id);
            }
            cards
        }
        Err(e) => {
            let key = cards_key(list_id);
            tracing::warn!(key = %key, "unreadable card data, treating as empty: {e}");
            Vec::new()
        }
    }
}

/// Decode the list headers. Malformed data reads as no lists.
pub fn decode_lists(raw: &str) -> Vec<CardList> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<CardList>>(raw) {
        Ok(lists) => lists,
        Err(e) => {
            tracing::warn!(key = LISTS_KEY, "unreadable list data, treating as empty: {e}");
            Vec::new()
        }
    }
}

/// Serialize records for the value stored under `key`.
pub fn encode<T: Serialize + ?Sized>(key: &str, records: &T) -> Result<String, StoreError> {
    serde_json::to_string_pretty(records).map_err(|source| StoreError::Serialize {
        key: key.to_string(),
        source,
    })
}
