//! Per-list study statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Card;
use crate::selector::{DifficultSet, Selector};

/// Score at or above which a card may count as mastered.
pub const MASTERED_SCORE: f64 = 8.0;

/// Consecutive successes needed to count as mastered.
pub const MASTERED_STREAK: u32 = 3;

/// Summary of one list at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListStats {
    pub total: usize,
    /// Never answered correctly; waiting to be learned.
    pub new: usize,
    /// Interval elapsed, including new cards.
    pub due: usize,
    /// Size of the pool a session opened now would draw from.
    pub in_rotation: usize,
    /// Members of a freshly filled working set.
    pub difficult: usize,
    /// Mean score of answered cards; 0 when none were answered.
    pub average_score: f64,
    pub mastered: usize,
}

/// Compute statistics as a session started at `now` would see the list.
pub fn compute_list_stats(cards: &[Card], selector: &Selector, now: DateTime<Utc>) -> ListStats {
    let mut difficult = DifficultSet::new();
    selector.refill(cards, &mut difficult, None);

    let reviewed: Vec<&Card> = cards.iter().filter(|card| !card.is_new()).collect();
    let average_score = if reviewed.is_empty() {
        0.0
    } else {
        reviewed.iter().map(|card| card.score).sum::<f64>() / reviewed.len() as f64
    };

    ListStats {
        total: cards.len(),
        new: cards.iter().filter(|card| card.is_unlearned()).count(),
        due: cards.iter().filter(|card| card.is_due(now)).count(),
        in_rotation: selector.due_pool(cards, &difficult, now).len(),
        difficult: difficult.len(),
        average_score,
        mastered: cards
            .iter()
            .filter(|card| card.score >= MASTERED_SCORE && card.repetitions >= MASTERED_STREAK)
            .count(),
    }
}
