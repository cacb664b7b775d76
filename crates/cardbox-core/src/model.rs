//! Core data model types for cardbox.
//!
//! A [`Card`] carries its own scheduling state; a [`CardList`] is only a
//! named header. Cards reference their list through `list_id`, and the
//! store keeps each list's cards under a separate key.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ease factor given to every new card.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Lower bound for the ease factor.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Upper bound of the derived score.
pub const MAX_SCORE: f64 = 10.0;

/// A single flashcard and its scheduling state.
///
/// The persisted layout keeps the historical field names (`name`,
/// `definition`, `lastReview`) and every scheduling field is optional on
/// read, so older saved lists keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Opaque identifier, assigned at creation. Records stored without
    /// one get [`fallback_card_id`] when decoded.
    #[serde(default)]
    pub id: String,
    /// Owning list. Filled from the store key when missing.
    #[serde(default)]
    pub list_id: String,
    /// Text shown on the front.
    #[serde(rename = "name", alias = "prompt")]
    pub prompt: String,
    /// Text shown on the back.
    #[serde(rename = "definition", alias = "answer")]
    pub answer: String,
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f64,
    /// Minutes until the card is due again.
    #[serde(default)]
    pub interval: i64,
    /// Consecutive correct answers.
    #[serde(default)]
    pub repetitions: u32,
    #[serde(
        rename = "lastReview",
        alias = "lastReviewedAt",
        default = "epoch",
        with = "chrono::serde::ts_milliseconds"
    )]
    pub last_reviewed_at: DateTime<Utc>,
    #[serde(default)]
    pub total_wins: u32,
    #[serde(default)]
    pub total_losses: u32,
    /// Derived from the win/loss counters, in `[0, 10]`.
    #[serde(default)]
    pub score: f64,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_ease_factor() -> f64 {
    DEFAULT_EASE_FACTOR
}

fn epoch() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

impl Card {
    /// Create a card with fresh scheduling state.
    pub fn new(
        list_id: impl Into<String>,
        prompt: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            list_id: list_id.into(),
            prompt: prompt.into(),
            answer: answer.into(),
            ease_factor: DEFAULT_EASE_FACTOR,
            interval: 0,
            repetitions: 0,
            last_reviewed_at: epoch(),
            total_wins: 0,
            total_losses: 0,
            score: 0.0,
        }
    }

    /// Whether the card's interval has elapsed at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        let elapsed_ms = (now - self.last_reviewed_at).num_milliseconds();
        elapsed_ms >= self.interval.saturating_mul(60_000)
    }

    /// The moment the card becomes due.
    pub fn due_at(&self) -> DateTime<Utc> {
        let minutes = self.interval.clamp(0, i64::from(i32::MAX));
        self.last_reviewed_at + chrono::Duration::minutes(minutes)
    }

    /// Never answered, neither right nor wrong.
    pub fn is_new(&self) -> bool {
        self.total_wins == 0 && self.total_losses == 0
    }

    /// Never answered correctly, so never drawn by the selector. Such cards
    /// only come back when surfaced by hand.
    pub fn is_unlearned(&self) -> bool {
        self.total_wins == 0
    }

    /// Number of answers ever recorded.
    pub fn total_reviews(&self) -> u32 {
        self.total_wins.saturating_add(self.total_losses)
    }

    /// Re-derive `score` from the counters.
    pub fn refresh_score(&mut self) {
        self.score = score_from_counts(self.total_wins, self.total_losses);
    }

    /// Repair a record read from storage.
    ///
    /// Fills a missing `list_id`, re-derives `score`, and lifts an ease
    /// factor below the floor back to it.
    pub fn normalize(&mut self, list_id: &str) {
        if self.list_id.is_empty() {
            self.list_id = list_id.to_string();
        }
        if self.ease_factor.is_nan() || self.ease_factor < MIN_EASE_FACTOR {
            self.ease_factor = MIN_EASE_FACTOR;
        }
        self.refresh_score();
    }
}

/// Id for a stored card that has none.
///
/// Derived from its position so every read of the same data agrees on it;
/// the next write of the list persists it.
pub fn fallback_card_id(list_id: &str, position: usize) -> String {
    format!("{list_id}-{position}")
}

/// `10 * wins / (wins + losses)`, or 0 when the card was never answered.
pub fn score_from_counts(wins: u32, losses: u32) -> f64 {
    let total = u64::from(wins) + u64::from(losses);
    if total == 0 {
        return 0.0;
    }
    (MAX_SCORE * wins as f64 / total as f64).clamp(0.0, MAX_SCORE)
}

/// A named collection of cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardList {
    pub id: String,
    pub name: String,
    #[serde(default = "epoch", with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl CardList {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            // stored with millisecond precision
            created_at: Utc::now().trunc_subsecs(3),
        }
    }
}

/// Which side of a card is shown first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    Prompt,
    Answer,
}

impl Face {
    /// The side hidden while this one is shown.
    pub fn flipped(self) -> Self {
        match self {
            Face::Prompt => Face::Answer,
            Face::Answer => Face::Prompt,
        }
    }

    /// Text of `card` on this side.
    pub fn text(self, card: &Card) -> &str {
        match self {
            Face::Prompt => &card.prompt,
            Face::Answer => &card.answer,
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Face::Prompt => write!(f, "prompt"),
            Face::Answer => write!(f, "answer"),
        }
    }
}
