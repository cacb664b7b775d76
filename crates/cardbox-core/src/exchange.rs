//! Bulk text import and the JSON export/import envelope.
//!
//! Neither format carries scheduling state: every imported card starts
//! fresh, and exports contain only list names, prompts, and answers.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Card, CardList};

/// Parse newline-separated `Name - Definition` pairs into fresh cards.
///
/// Lines are split at the first `" - "`, or at the first `-` when no
/// spaced separator exists. Lines without a separator, or with a blank
/// side after trimming, are dropped.
pub fn parse_bulk_text(list_id: &str, text: &str) -> Vec<Card> {
    text.lines()
        .filter_map(split_pair)
        .map(|(prompt, answer)| Card::new(list_id, prompt, answer))
        .collect()
}

fn split_pair(line: &str) -> Option<(&str, &str)> {
    let (prompt, answer) = line.split_once(" - ").or_else(|| line.split_once('-'))?;
    let (prompt, answer) = (prompt.trim(), answer.trim());
    if prompt.is_empty() || answer.is_empty() {
        return None;
    }
    Some((prompt, answer))
}

/// Export/import document: `{ "lists": [ { "name", "flashcards": [...] } ] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub lists: Vec<EnvelopeList>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeList {
    pub name: String,
    #[serde(default)]
    pub flashcards: Vec<EnvelopeCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeCard {
    pub name: String,
    pub definition: String,
}

impl Envelope {
    /// Build an envelope from lists and their cards, in the given order.
    pub fn from_lists<'a, I>(lists: I) -> Self
    where
        I: IntoIterator<Item = (&'a CardList, &'a [Card])>,
    {
        let lists = lists
            .into_iter()
            .map(|(list, cards)| EnvelopeList {
                name: list.name.clone(),
                flashcards: cards
                    .iter()
                    .map(|card| EnvelopeCard {
                        name: card.prompt.clone(),
                        definition: card.answer.clone(),
                    })
                    .collect(),
            })
            .collect();
        Self { lists }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Total flashcards across all lists.
    pub fn card_count(&self) -> usize {
        self.lists.iter().map(|list| list.flashcards.len()).sum()
    }
}

impl EnvelopeList {
    /// Fresh cards for `list_id`; blank entries are skipped.
    pub fn to_cards(&self, list_id: &str) -> Vec<Card> {
        self.flashcards
            .iter()
            .filter(|fc| !fc.name.trim().is_empty() && !fc.definition.trim().is_empty())
            .map(|fc| Card::new(list_id, fc.name.trim(), fc.definition.trim()))
            .collect()
    }
}
