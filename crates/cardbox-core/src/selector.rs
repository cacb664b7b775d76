//! Due-pool computation and next-card selection.
//!
//! The pool holds every card that is due and has been answered correctly
//! at least once, plus the members of a small working set of cards kept in
//! rotation regardless of their due time. Cards that were never answered
//! correctly stay out of the pool until they are surfaced by hand.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Card, Face};
use crate::random::RandomSource;

/// Tunable constants of the selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Maximum members of the difficult working set.
    pub difficult_capacity: usize,
    /// Cards scoring above this are eligible for the working set.
    pub difficult_threshold: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            difficult_capacity: 10,
            difficult_threshold: 2.0,
        }
    }
}

/// Ordered set of card ids kept in rotation for reinforcement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultSet {
    ids: Vec<String>,
}

impl DifficultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|member| member == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Remove `id`, returning whether it was a member.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|member| member != id);
        self.ids.len() != before
    }

    fn push(&mut self, id: String) {
        if !self.contains(&id) {
            self.ids.push(id);
        }
    }
}

/// Outcome of [`Selector::pick_next`].
#[derive(Debug, Clone)]
pub struct Pick {
    /// `None` means nothing is due: the session is caught up.
    pub card: Option<Card>,
    /// The working set after refill.
    pub difficult: DifficultSet,
    /// Side to show first; fixed for as long as the card is displayed.
    pub face: Face,
}

/// Picks the next card of a study session.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    config: SelectorConfig,
}

impl Selector {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Whether `card` qualifies for the working set.
    pub fn is_difficult(&self, card: &Card) -> bool {
        card.score > self.config.difficult_threshold
    }

    /// Due and answered correctly at least once.
    pub fn in_rotation(card: &Card, now: DateTime<Utc>) -> bool {
        card.total_wins > 0 && card.is_due(now)
    }

    /// Cards eligible for the next pick, in list order.
    pub fn due_pool<'a>(
        &self,
        cards: &'a [Card],
        difficult: &DifficultSet,
        now: DateTime<Utc>,
    ) -> Vec<&'a Card> {
        cards
            .iter()
            .filter(|card| Self::in_rotation(card, now) || difficult.contains(&card.id))
            .collect()
    }

    /// Top the working set up to capacity.
    ///
    /// Members whose card is gone are dropped first. Candidates are taken
    /// lowest score first, ties in list order. `skip` is never enrolled.
    pub fn refill(&self, cards: &[Card], difficult: &mut DifficultSet, skip: Option<&str>) {
        let present: HashSet<&str> = cards.iter().map(|card| card.id.as_str()).collect();
        difficult.ids.retain(|id| present.contains(id.as_str()));

        let capacity = self.config.difficult_capacity;
        if difficult.len() >= capacity {
            return;
        }

        let mut candidates: Vec<&Card> = cards
            .iter()
            .filter(|card| self.is_difficult(card))
            .filter(|card| !difficult.contains(&card.id))
            .filter(|card| skip != Some(card.id.as_str()))
            .collect();
        candidates.sort_by(|a, b| a.score.total_cmp(&b.score));

        let room = capacity - difficult.len();
        for card in candidates.into_iter().take(room) {
            tracing::debug!(card = %card.id, score = card.score, "enrolled in difficult set");
            difficult.push(card.id.clone());
        }
    }

    /// Update the working set after `card` (already rescheduled) was answered.
    ///
    /// A member leaves the set on a correct answer while its score is still
    /// above the threshold. Returns whether it was evicted.
    pub fn record_answer(&self, difficult: &mut DifficultSet, card: &Card, correct: bool) -> bool {
        if correct && self.is_difficult(card) && difficult.remove(&card.id) {
            tracing::debug!(card = %card.id, score = card.score, "evicted from difficult set");
            return true;
        }
        false
    }

    /// Refill the working set, then draw uniformly from the due pool.
    ///
    /// `exclude` (the card just answered) is avoided when any other card is
    /// available, and is not enrolled by this refill.
    pub fn pick_next<R: RandomSource + ?Sized>(
        &self,
        cards: &[Card],
        mut difficult: DifficultSet,
        exclude: Option<&str>,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Pick {
        self.refill(cards, &mut difficult, exclude);

        let pool = self.due_pool(cards, &difficult, now);
        let others: Vec<&Card> = pool
            .iter()
            .copied()
            .filter(|card| exclude != Some(card.id.as_str()))
            .collect();
        let candidates = if others.is_empty() { pool } else { others };

        if candidates.is_empty() {
            return Pick {
                card: None,
                difficult,
                face: Face::Prompt,
            };
        }

        let card = candidates[rng.index(candidates.len())].clone();
        let face = if rng.coin() { Face::Prompt } else { Face::Answer };

        Pick {
            card: Some(card),
            difficult,
            face,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{rng_from_seed, ScriptedSource};
    use chrono::Duration;

    fn reviewed_card(id: &str, wins: u32, losses: u32, interval: i64, ago_minutes: i64) -> Card {
        let mut card = Card::new("l", format!("p-{id}"), format!("a-{id}"));
        card.id = id.to_string();
        card.total_wins = wins;
        card.total_losses = losses;
        card.refresh_score();
        card.interval = interval;
        card.last_reviewed_at = Utc::now() - Duration::minutes(ago_minutes);
        card
    }

    #[test]
    fn new_cards_stay_out_of_the_pool() {
        let selector = Selector::default();
        let fresh = Card::new("l", "nouveau", "new");
        let now = Utc::now();
        assert!(fresh.is_due(now));
        let cards = vec![fresh];
        let pool = selector.due_pool(&cards, &DifficultSet::new(), now);
        assert!(pool.is_empty());

        let mut rng = rng_from_seed(Some(1));
        let pick = selector.pick_next(&cards, DifficultSet::new(), None, now, &mut rng);
        assert!(pick.card.is_none());
    }

    #[test]
    fn pool_contains_due_cards_with_wins() {
        let selector = Selector::default();
        let cards = vec![
            reviewed_card("due", 1, 0, 5, 10),
            reviewed_card("later", 1, 0, 60, 10),
            reviewed_card("lost-only", 0, 3, 0, 10),
        ];
        let pool = selector.due_pool(&cards, &DifficultSet::new(), Utc::now());
        let ids: Vec<&str> = pool.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["due"]);
    }

    #[test]
    fn difficult_members_join_the_pool_even_when_not_due() {
        let selector = Selector::default();
        let cards = vec![reviewed_card("later", 3, 1, 600, 1)];
        let mut difficult = DifficultSet::new();
        selector.refill(&cards, &mut difficult, None);
        assert!(difficult.contains("later"));
        let pool = selector.due_pool(&cards, &difficult, Utc::now());
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn refill_respects_capacity_and_orders_by_score() {
        let selector = Selector::default();
        let mut cards = Vec::new();
        for i in 0..15u32 {
            // scores from 10/(10+0) down, all above 2
            cards.push(reviewed_card(&format!("c{i}"), 10, i / 2, 600, 1));
        }
        let mut difficult = DifficultSet::new();
        selector.refill(&cards, &mut difficult, None);
        assert_eq!(difficult.len(), 10);
        // lowest scores first: c14, c12, c13, c10, ... c4; c0-c3 and c5 are left out
        assert!(!difficult.contains("c0"));
        assert!(!difficult.contains("c1"));
        assert!(difficult.contains("c14"));
        assert_eq!(difficult.ids()[0], "c14");
    }

    #[test]
    fn refill_skips_low_scores_and_missing_cards() {
        let selector = Selector::default();
        let cards = vec![
            reviewed_card("weak", 1, 4, 0, 1),
            reviewed_card("ok", 3, 1, 0, 1),
        ];
        let mut difficult = DifficultSet::new();
        difficult.push("deleted".into());
        selector.refill(&cards, &mut difficult, None);
        assert_eq!(difficult.ids().to_vec(), vec!["ok".to_string()]);
    }

    #[test]
    fn correct_answer_above_threshold_evicts() {
        let selector = Selector::default();
        let card = reviewed_card("x", 4, 1, 6, 0);
        let mut difficult = DifficultSet::new();
        difficult.push("x".into());

        assert!(!selector.record_answer(&mut difficult, &card, false));
        assert!(difficult.contains("x"));
        assert!(selector.record_answer(&mut difficult, &card, true));
        assert!(difficult.is_empty());
    }

    #[test]
    fn member_below_threshold_lingers_until_next_success() {
        let selector = Selector::default();
        let card = reviewed_card("x", 1, 9, 0, 0);
        let mut difficult = DifficultSet::new();
        difficult.push("x".into());
        assert!(!selector.record_answer(&mut difficult, &card, true));
        selector.refill(&[card], &mut difficult, None);
        assert!(difficult.contains("x"));
    }

    #[test]
    fn evicted_card_is_not_reenrolled_in_same_step() {
        let selector = Selector::default();
        let cards = vec![reviewed_card("x", 4, 1, 600, 0), reviewed_card("y", 4, 1, 600, 0)];
        let mut difficult = DifficultSet::new();
        difficult.push("x".into());
        selector.record_answer(&mut difficult, &cards[0], true);

        let mut rng = ScriptedSource::new([0.0]);
        let pick = selector.pick_next(&cards, difficult, Some("x"), Utc::now(), &mut rng);
        assert!(!pick.difficult.contains("x"));
        assert!(pick.difficult.contains("y"));
        assert_eq!(pick.card.map(|c| c.id), Some("y".to_string()));
    }

    #[test]
    fn pick_never_returns_excluded_when_alternatives_exist() {
        let selector = Selector::default();
        let cards = vec![
            reviewed_card("a", 1, 0, 0, 5),
            reviewed_card("b", 1, 0, 0, 5),
            reviewed_card("c", 1, 0, 0, 5),
        ];
        let mut rng = rng_from_seed(Some(99));
        let mut difficult = DifficultSet::new();
        for _ in 0..500 {
            let pick = selector.pick_next(&cards, difficult, Some("b"), Utc::now(), &mut rng);
            assert_ne!(pick.card.as_ref().map(|c| c.id.as_str()), Some("b"));
            assert!(pick.difficult.len() <= 10);
            difficult = pick.difficult;
        }
    }

    #[test]
    fn lone_card_is_repeated() {
        let selector = Selector::default();
        let cards = vec![reviewed_card("only", 1, 0, 0, 5)];
        let mut rng = ScriptedSource::new([0.3]);
        let now = Utc::now();
        let pick = selector.pick_next(&cards, DifficultSet::new(), Some("only"), now, &mut rng);
        assert_eq!(pick.card.map(|c| c.id), Some("only".to_string()));
    }

    #[test]
    fn face_follows_coin() {
        let selector = Selector::default();
        let cards = vec![reviewed_card("a", 1, 0, 0, 5)];
        let now = Utc::now();
        let mut rng = ScriptedSource::new([0.0, 0.2]);
        let prompt_first = selector.pick_next(&cards, DifficultSet::new(), None, now, &mut rng);
        assert_eq!(prompt_first.face, Face::Prompt);
        let mut rng = ScriptedSource::new([0.0, 0.7]);
        let answer_first = selector.pick_next(&cards, DifficultSet::new(), None, now, &mut rng);
        assert_eq!(answer_first.face, Face::Answer);
    }

    #[test]
    fn both_faces_show_up_over_many_picks() {
        let selector = Selector::default();
        let cards = vec![reviewed_card("a", 1, 0, 0, 5)];
        let mut rng = rng_from_seed(Some(5));
        let prompts = (0..200)
            .filter(|_| {
                selector
                    .pick_next(&cards, DifficultSet::new(), None, Utc::now(), &mut rng)
                    .face
                    == Face::Prompt
            })
            .count();
        assert!(prompts > 50 && prompts < 150);
    }
}
