//! Card scheduling: ease factor, score, and next-interval computation.
//!
//! Answers are mapped to a two-point quality scale (2 = wrong, 4 = right)
//! and fed through an SM-2 style ease update. Intervals are in minutes.
//! Failed cards either come back at once, come back after a short delay,
//! or, for weak cards in a large pool, go to a long penalty box. Successful
//! cards grow by the ease factor times a random multiplier that is biased
//! low for weak cards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{score_from_counts, Card, MAX_SCORE};
use crate::random::RandomSource;

const QUALITY_CORRECT: u8 = 4;
const QUALITY_INCORRECT: u8 = 2;
const PASSING_QUALITY: u8 = 3;

/// Tunable constants of the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Floor applied after the ease update.
    pub min_ease_factor: f64,
    /// Multiplier applied when the user guessed without flipping first.
    pub blind_guess_bonus: f64,
    /// Interval after the first success of a streak, in minutes.
    pub first_success_interval: i64,
    /// Penalty box bounds, in minutes (inclusive).
    pub penalty_min_minutes: i64,
    pub penalty_max_minutes: i64,
    /// Only cards scoring below this can land in the penalty box.
    pub penalty_score_threshold: f64,
    /// Chance of a short re-show instead of an immediate repeat.
    pub short_reshow_probability: f64,
    /// Due-pool size at which the penalty chance stops growing.
    pub pool_normalizer: f64,
    /// Lower bound of the pool-size factor.
    pub min_pool_factor: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_ease_factor: 1.3,
            blind_guess_bonus: 1.05,
            first_success_interval: 6,
            penalty_min_minutes: 60,
            penalty_max_minutes: 180,
            penalty_score_threshold: 2.5,
            short_reshow_probability: 0.33,
            pool_normalizer: 90.0,
            min_pool_factor: 0.01,
        }
    }
}

/// What the user did with a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answer {
    pub correct: bool,
    /// The card was flipped before the user committed to a guess.
    pub saw_answer: bool,
}

impl Answer {
    pub fn correct() -> Self {
        Self {
            correct: true,
            saw_answer: false,
        }
    }

    pub fn incorrect() -> Self {
        Self {
            correct: false,
            saw_answer: false,
        }
    }

    pub fn after_reveal(mut self) -> Self {
        self.saw_answer = true;
        self
    }

    fn quality(self) -> u8 {
        if self.correct {
            QUALITY_CORRECT
        } else {
            QUALITY_INCORRECT
        }
    }
}

/// Which rule produced the new interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalRule {
    /// Failed weak card sent away for an hour or more.
    PenaltyBox,
    /// Failed card shown again after a few minutes.
    ShortReshow,
    /// Failed card due again right away.
    Immediate,
    /// First success of a streak.
    FirstSuccess,
    /// Later success, interval grown by ease and a random multiplier.
    Grown,
}

/// Result of scheduling one answer.
#[derive(Debug, Clone)]
pub struct Reviewed {
    pub card: Card,
    pub rule: IntervalRule,
}

/// The card scheduler. Holds only configuration; all state lives on cards.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Apply `answer` to `card` and return the updated record.
    ///
    /// `due_count` is the size of the due pool the card was drawn from.
    pub fn update<R: RandomSource + ?Sized>(
        &self,
        card: &Card,
        answer: Answer,
        due_count: usize,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Card {
        self.review(card, answer, due_count, now, rng).card
    }

    /// Like [`update`](Self::update), also reporting the interval rule.
    pub fn review<R: RandomSource + ?Sized>(
        &self,
        card: &Card,
        answer: Answer,
        due_count: usize,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Reviewed {
        let quality = answer.quality();
        let passed = quality >= PASSING_QUALITY;
        let mut next = card.clone();

        next.ease_factor = self.next_ease(card.ease_factor, quality, answer.saw_answer);

        if passed {
            next.repetitions = card.repetitions.saturating_add(1);
            next.total_wins = card.total_wins.saturating_add(1);
        } else {
            next.repetitions = 0;
            next.total_losses = card.total_losses.saturating_add(1);
        }

        next.score = score_from_counts(next.total_wins, next.total_losses);

        let (interval, rule) = if passed {
            let (ease, score) = (next.ease_factor, next.score);
            self.success_interval(card.interval, next.repetitions, ease, score, rng)
        } else {
            self.failure_interval(next.score, due_count, rng)
        };
        next.interval = interval;
        next.last_reviewed_at = now;

        tracing::trace!(
            card = %next.id,
            correct = answer.correct,
            ?rule,
            interval,
            ease = next.ease_factor,
            score = next.score,
            "scheduled card"
        );

        Reviewed { card: next, rule }
    }

    fn next_ease(&self, ease: f64, quality: u8, saw_answer: bool) -> f64 {
        let q = f64::from(5 - quality);
        let mut next = (ease + (0.1 - q * (0.08 + q * 0.02))).max(self.config.min_ease_factor);
        if !saw_answer {
            next *= self.config.blind_guess_bonus;
        }
        next
    }

    fn failure_interval<R: RandomSource + ?Sized>(
        &self,
        score: f64,
        due_count: usize,
        rng: &mut R,
    ) -> (i64, IntervalRule) {
        let cfg = &self.config;
        let threshold = cfg.penalty_score_threshold;
        let base = ((threshold - score) / threshold).clamp(0.0, 1.0);
        let size = (due_count as f64 / cfg.pool_normalizer).clamp(cfg.min_pool_factor, 1.0);
        let probability = base * size;

        if score < threshold && rng.next_unit() < probability {
            let minutes = rng.range_inclusive(cfg.penalty_min_minutes, cfg.penalty_max_minutes);
            (minutes, IntervalRule::PenaltyBox)
        } else if rng.next_unit() < cfg.short_reshow_probability {
            (to_minutes(score.max(1.0)), IntervalRule::ShortReshow)
        } else {
            (0, IntervalRule::Immediate)
        }
    }

    fn success_interval<R: RandomSource + ?Sized>(
        &self,
        previous: i64,
        repetitions: u32,
        ease: f64,
        score: f64,
        rng: &mut R,
    ) -> (i64, IntervalRule) {
        if repetitions == 1 {
            return (self.config.first_success_interval, IntervalRule::FirstSuccess);
        }
        let multiplier = growth_multiplier(rng.next_unit(), score);
        (to_minutes(previous as f64 * ease * multiplier), IntervalRule::Grown)
    }
}

/// `0.8 + u^(1 + (10 - score)/10) * 1.2`, in `[0.8, 2.0)`.
///
/// A lower score raises the exponent, pushing the multiplier toward 0.8.
pub fn growth_multiplier(unit: f64, score: f64) -> f64 {
    let exponent = 1.0 + (MAX_SCORE - score) / MAX_SCORE;
    0.8 + unit.powf(exponent) * 1.2
}

/// Truncate to whole minutes; NaN and negatives become 0.
fn to_minutes(value: f64) -> i64 {
    value.max(0.0) as i64
}
