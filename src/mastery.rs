//! Mastery Engine
//!
//! Maps a card's continuous scheduler parameters and its recent rating
//! history onto the discrete mastery ladder, with hysteresis so the
//! visible state does not flap on isolated answers.

use tracing::debug;

use crate::config::MasteryConfig;
use crate::types::{MasteryState, Rating, ReviewCard, DEFAULT_DIFFICULTY, MAX_DIFFICULTY};

/// Floor for the difficulty-driven cutoff shift.
const MIN_CUTOFF_SHIFT: f64 = 0.5;

/// Derive the mastery state for a card.
///
/// `history` is the chronological rating history for the concept, most
/// recent last; the card's stored `state` is the current state the
/// hysteresis rules key on. The ladder itself is a pure threshold over
/// stability with difficulty-shifted cutoffs; everything
/// history-dependent is factored into the transition helpers below.
pub fn derive_state(card: &ReviewCard, history: &[Rating], cfg: &MasteryConfig) -> MasteryState {
    if card.reps == 0 {
        return MasteryState::Unseen;
    }

    let was_misconceived = card.state == MasteryState::Misconceived;
    if misconception_transition(was_misconceived, history, cfg) {
        if !was_misconceived {
            debug!(concept = %card.concept_id, "concept flagged as misconceived");
        }
        return MasteryState::Misconceived;
    }

    let ladder = ladder_state(card.stability, card.difficulty, card.lapses, cfg);
    apply_downgrade_guard(card.state, ladder, history.last().copied())
}

/// Misconception entry/exit as an explicit transition rule.
///
/// Entry: the recent rating window contains at least the configured
/// number of lapses (the learner keeps failing the same concept). Exit:
/// only a trailing run of consecutive successes long enough to
/// demonstrate the misconception was resolved; the state is sticky until
/// then. A completed recovery run always wins over the entry signal.
pub fn misconception_transition(
    currently_misconceived: bool,
    history: &[Rating],
    cfg: &MasteryConfig,
) -> bool {
    if trailing_success_run(history) >= cfg.recovery_run {
        return false;
    }
    if currently_misconceived {
        return true;
    }
    recent_lapses(history, cfg.misconception_window) >= cfg.misconception_lapses
}

/// A drop below the current state is only accepted when the most recent
/// rating was a lapse; a single Hard slows the climb but never shows a
/// visible downgrade.
pub fn apply_downgrade_guard(
    current: MasteryState,
    candidate: MasteryState,
    last_rating: Option<Rating>,
) -> MasteryState {
    match (current.rank(), candidate.rank()) {
        (Some(cur), Some(cand)) if cand < cur && last_rating != Some(Rating::Again) => current,
        _ => candidate,
    }
}

fn ladder_state(
    stability: f64,
    difficulty: f64,
    lapses: i32,
    cfg: &MasteryConfig,
) -> MasteryState {
    let shift = cutoff_shift(difficulty, cfg);
    if stability >= cfg.mastered_cutoff * shift && lapses <= cfg.mastered_max_lapses {
        MasteryState::Mastered
    } else if stability >= cfg.solid_cutoff * shift {
        MasteryState::Solid
    } else if stability >= cfg.developing_cutoff * shift {
        MasteryState::Developing
    } else if stability >= cfg.fragile_cutoff * shift {
        MasteryState::Fragile
    } else {
        MasteryState::Exposed
    }
}

/// Harder concepts must reach greater stability to earn the same label;
/// their raw stability number is worth less.
fn cutoff_shift(difficulty: f64, cfg: &MasteryConfig) -> f64 {
    let normalized = (difficulty - DEFAULT_DIFFICULTY) / (MAX_DIFFICULTY - DEFAULT_DIFFICULTY);
    (1.0 + cfg.difficulty_shift * normalized).max(MIN_CUTOFF_SHIFT)
}

fn trailing_success_run(history: &[Rating]) -> usize {
    history.iter().rev().take_while(|r| r.is_success()).count()
}

fn recent_lapses(history: &[Rating], window: usize) -> usize {
    history
        .iter()
        .rev()
        .take(window)
        .filter(|r| !r.is_success())
        .count()
}
