//! A study session over one list.
//!
//! ```text
//! Loading --start--> HasCard | Empty
//! HasCard --answer-> HasCard | Empty
//! any     --surface> HasCard
//! ```
//!
//! Answering is synchronous from the caller's point of view: the card is
//! rescheduled, written back, and the next card picked before `answer`
//! returns. A failed write is logged and the session carries on with its
//! in-memory copy.

use chrono::{DateTime, Utc};

use crate::error::{CardboxError, Result};
use crate::model::{Card, Face};
use crate::random::RandomSource;
use crate::repository::CardRepository;
use crate::scheduler::{Answer, Scheduler};
use crate::selector::{DifficultSet, Selector};

/// The card on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Presented {
    pub card: Card,
    /// Side shown first, fixed until the card is answered.
    pub face: Face,
    /// The user flipped the card before answering.
    pub revealed: bool,
}

impl Presented {
    /// Text currently visible.
    pub fn visible_text(&self) -> &str {
        if self.revealed {
            self.face.flipped().text(&self.card)
        } else {
            self.face.text(&self.card)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Loading,
    HasCard(Presented),
    /// Nothing due: all caught up.
    Empty,
}

pub struct StudySession<R: RandomSource> {
    repository: CardRepository,
    list_id: String,
    scheduler: Scheduler,
    selector: Selector,
    rng: R,
    cards: Vec<Card>,
    difficult: DifficultSet,
    state: SessionState,
    answered: usize,
}

impl<R: RandomSource> StudySession<R> {
    pub fn new(
        repository: CardRepository,
        list_id: impl Into<String>,
        scheduler: Scheduler,
        selector: Selector,
        rng: R,
    ) -> Self {
        Self {
            repository,
            list_id: list_id.into(),
            scheduler,
            selector,
            rng,
            cards: Vec::new(),
            difficult: DifficultSet::new(),
            state: SessionState::Loading,
            answered: 0,
        }
    }

    /// Load the list and pick the first card.
    pub async fn start(&mut self, now: DateTime<Utc>) -> Result<&SessionState> {
        self.cards = self.repository.cards(&self.list_id).await?;
        tracing::info!(
            list = %self.list_id,
            cards = self.cards.len(),
            "study session started"
        );
        self.pick(None, now);
        Ok(&self.state)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current(&self) -> Option<&Presented> {
        match &self.state {
            SessionState::HasCard(presented) => Some(presented),
            _ => None,
        }
    }

    pub fn list_id(&self) -> &str {
        &self.list_id
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn difficult(&self) -> &DifficultSet {
        &self.difficult
    }

    /// Answers recorded in this session.
    pub fn answered(&self) -> usize {
        self.answered
    }

    /// Cards a pick would currently draw from.
    pub fn pool_size(&self, now: DateTime<Utc>) -> usize {
        self.selector.due_pool(&self.cards, &self.difficult, now).len()
    }

    /// Cards never answered correctly, including ones that were only missed.
    /// Picks never draw them; only [`surface`](Self::surface) shows them.
    pub fn new_cards(&self) -> Vec<&Card> {
        self.cards.iter().filter(|card| card.is_unlearned()).collect()
    }

    /// Flip the current card before guessing. Forfeits the blind-guess bonus.
    pub fn reveal(&mut self) -> Option<&Presented> {
        match &mut self.state {
            SessionState::HasCard(presented) => {
                presented.revealed = true;
                Some(presented)
            }
            _ => None,
        }
    }

    /// Show a specific card now, due or not.
    pub fn surface(&mut self, card_id: &str) -> Result<&Presented> {
        let card = self
            .cards
            .iter()
            .find(|card| card.id == card_id)
            .cloned()
            .ok_or_else(|| CardboxError::CardNotFound(card_id.to_string()))?;
        let face = if self.rng.coin() { Face::Prompt } else { Face::Answer };
        self.state = SessionState::HasCard(Presented {
            card,
            face,
            revealed: false,
        });
        self.current()
            .ok_or_else(|| CardboxError::CardNotFound(card_id.to_string()))
    }

    /// Record an answer for the current card and move to the next one.
    ///
    /// Does nothing when no card is shown.
    pub async fn answer(&mut self, correct: bool, now: DateTime<Utc>) -> &SessionState {
        let presented = match &self.state {
            SessionState::HasCard(presented) => presented.clone(),
            _ => {
                tracing::debug!(list = %self.list_id, "answer ignored, no card shown");
                return &self.state;
            }
        };

        let due_count = self.pool_size(now);
        let answer = Answer {
            correct,
            saw_answer: presented.revealed,
        };
        let updated = self
            .scheduler
            .update(&presented.card, answer, due_count, now, &mut self.rng);

        if let Some(slot) = self.cards.iter_mut().find(|card| card.id == updated.id) {
            *slot = updated.clone();
        }
        self.selector
            .record_answer(&mut self.difficult, &updated, correct);
        self.answered += 1;

        match self.repository.replace_card(&self.list_id, &updated).await {
            Ok(stored) => self.cards = stored,
            Err(e) => {
                tracing::error!(
                    list = %self.list_id,
                    card = %updated.id,
                    "failed to save review: {e}"
                );
            }
        }

        self.pick(Some(&updated.id), now);
        &self.state
    }

    fn pick(&mut self, exclude: Option<&str>, now: DateTime<Utc>) {
        let difficult = std::mem::take(&mut self.difficult);
        let pick = self
            .selector
            .pick_next(&self.cards, difficult, exclude, now, &mut self.rng);
        self.difficult = pick.difficult;
        self.state = match pick.card {
            Some(card) => SessionState::HasCard(Presented {
                card,
                face: pick.face,
                revealed: false,
            }),
            None => SessionState::Empty,
        };
    }
}
