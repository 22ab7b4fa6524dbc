//! Spaced-Repetition Scheduler
//!
//! Maintains each card's forgetting-curve parameters and computes due
//! dates. Retrievability follows a power-law decay in elapsed time
//! relative to stability; the next interval inverts the same curve for
//! the configured target retention.
//!
//! All functions are pure: they take an explicit `now` and return updated
//! copies, never touching the wall clock or any storage.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::config::SchedulerConfig;
use crate::types::{IntervalPreview, Rating, ReviewCard, ReviewOutcome, MS_PER_DAY};

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// Malformed card state. Indicates upstream data corruption; never
    /// repaired silently.
    #[error("card invariant violated: {0}")]
    InvariantViolation(String),
    /// A rating value outside the closed enum, from hosts that transport
    /// ratings as integers.
    #[error("invalid rating value: {0}")]
    InvalidRating(u8),
    #[error("invalid scheduler configuration: {0}")]
    InvalidConfig(String),
}

/// Predicted recall probability after `elapsed_days` for a card with the
/// given stability. Approaches 1 for a freshly reviewed card and decays
/// toward 0 as elapsed time grows relative to stability.
pub fn retrievability(stability: f64, elapsed_days: f64, cfg: &SchedulerConfig) -> f64 {
    if stability <= 0.0 {
        return 0.0;
    }
    let safe_elapsed = elapsed_days.max(0.0);
    (1.0 + cfg.factor * safe_elapsed / stability).powf(cfg.decay)
}

/// Gate malformed cards at the boundary instead of propagating corrupted
/// state through the formulas.
pub fn validate_card(card: &ReviewCard, cfg: &SchedulerConfig) -> Result<(), SchedulerError> {
    if !card.stability.is_finite() || card.stability <= 0.0 {
        return Err(SchedulerError::InvariantViolation(format!(
            "stability must be positive and finite, got {}",
            card.stability
        )));
    }
    if !card.difficulty.is_finite()
        || card.difficulty < cfg.min_difficulty
        || card.difficulty > cfg.max_difficulty
    {
        return Err(SchedulerError::InvariantViolation(format!(
            "difficulty must be in [{}, {}], got {}",
            cfg.min_difficulty, cfg.max_difficulty, card.difficulty
        )));
    }
    if card.reps < 0 || card.lapses < 0 {
        return Err(SchedulerError::InvariantViolation(format!(
            "counters must be non-negative, got reps={} lapses={}",
            card.reps, card.lapses
        )));
    }
    if card.lapses > card.reps {
        return Err(SchedulerError::InvariantViolation(format!(
            "lapses ({}) exceed reps ({})",
            card.lapses, card.reps
        )));
    }
    Ok(())
}

/// Apply one rating to a card and return the updated copy together with
/// the computed interval and the retrievability observed at review time.
///
/// A lapse multiplies stability by a penalty below 1, scaled down further
/// the more the card had already been forgotten; prior learning keeps a
/// partial benefit. A success grows stability multiplicatively, with
/// larger gains for higher ratings, damped by difficulty and by the
/// current stability, and boosted when recall happened against the odds.
pub fn rate(
    card: &ReviewCard,
    rating: Rating,
    now: DateTime<Utc>,
    cfg: &SchedulerConfig,
) -> Result<ReviewOutcome, SchedulerError> {
    validate_card(card, cfg)?;

    let elapsed = card.elapsed_days(now);
    let r = if card.is_new() {
        1.0
    } else {
        retrievability(card.stability, elapsed, cfg)
    };

    let mut next = card.clone();
    match rating {
        Rating::Again => {
            next.stability = next_forget_stability(card.stability, r, cfg);
            next.lapses = card.lapses + 1;
        }
        _ => {
            next.stability = next_recall_stability(card.stability, card.difficulty, r, rating, cfg);
        }
    }
    next.difficulty = next_difficulty(card.difficulty, rating, cfg);
    next.reps = card.reps + 1;
    next.last_review_at = Some(now);

    let interval = next_interval(next.stability, cfg.target_retention, cfg);
    next.due_at = Some(now + days_to_duration(interval));

    debug!(
        concept = %card.concept_id,
        rating = rating.as_str(),
        stability = next.stability,
        interval_days = interval,
        "scheduled next review"
    );

    Ok(ReviewOutcome {
        card: next,
        interval_days: interval,
        retrievability: r,
    })
}

/// Candidate interval for every rating, computed on throwaway copies.
/// Read-only and deterministic; the card is never mutated.
///
/// The `again <= hard <= good <= easy` ordering is a design expectation,
/// not an enforced invariant; violations are reported as telemetry.
pub fn preview_intervals(
    card: &ReviewCard,
    now: DateTime<Utc>,
    cfg: &SchedulerConfig,
) -> Result<IntervalPreview, SchedulerError> {
    let preview = IntervalPreview {
        again: rate(card, Rating::Again, now, cfg)?.interval_days,
        hard: rate(card, Rating::Hard, now, cfg)?.interval_days,
        good: rate(card, Rating::Good, now, cfg)?.interval_days,
        easy: rate(card, Rating::Easy, now, cfg)?.interval_days,
    };
    if !preview.is_monotonic() {
        warn!(
            concept = %card.concept_id,
            again = preview.again,
            hard = preview.hard,
            good = preview.good,
            easy = preview.easy,
            "preview intervals out of expected order"
        );
    }
    Ok(preview)
}

fn next_recall_stability(
    stability: f64,
    difficulty: f64,
    r: f64,
    rating: Rating,
    cfg: &SchedulerConfig,
) -> f64 {
    let gain = match rating {
        Rating::Hard => cfg.hard_gain,
        Rating::Good => cfg.good_gain,
        Rating::Easy => cfg.easy_gain,
        Rating::Again => unreachable!("lapse handled by next_forget_stability"),
    };
    let spacing = (cfg.max_difficulty + 1.0 - difficulty)
        * stability.powf(-cfg.stability_damp)
        * (1.0 + cfg.retention_boost * (1.0 - r));
    let growth = (1.0 + gain * spacing).max(cfg.min_success_growth);
    stability * growth
}

fn next_forget_stability(stability: f64, r: f64, cfg: &SchedulerConfig) -> f64 {
    // The penalty bites harder the further the card had decayed; recall
    // probability near 1 keeps the configured share of prior stability.
    let retained = cfg.lapse_retention_weight + (1.0 - cfg.lapse_retention_weight) * r;
    stability * cfg.lapse_penalty * retained
}

fn next_difficulty(difficulty: f64, rating: Rating, cfg: &SchedulerConfig) -> f64 {
    let delta = match rating {
        Rating::Again => 2.0,
        Rating::Hard => 1.0,
        Rating::Good => 0.0,
        Rating::Easy => -1.0,
    };
    (difficulty + delta * cfg.difficulty_step).clamp(cfg.min_difficulty, cfg.max_difficulty)
}

/// Invert the forgetting curve: the elapsed time at which predicted
/// retrievability equals the target retention, given the new stability.
fn next_interval(stability: f64, target_retention: f64, cfg: &SchedulerConfig) -> f64 {
    let safe_retention = target_retention.clamp(0.0001, 0.9999);
    let interval = stability / cfg.factor * (safe_retention.powf(1.0 / cfg.decay) - 1.0);
    interval.clamp(cfg.min_interval_days, cfg.max_interval_days)
}

fn days_to_duration(days: f64) -> Duration {
    Duration::milliseconds((days * MS_PER_DAY) as i64)
}
