//! Review Engine Facade
//!
//! Orchestrates one answered card end to end: scheduler transition, then
//! mastery re-derivation over the extended history. Hosts call
//! [`ReviewEngine::apply_review`] once per answer and persist the
//! returned card through their store.

use chrono::{DateTime, Utc};

use crate::config::EngineConfig;
use crate::mastery;
use crate::scheduler::{self, SchedulerError};
use crate::types::{IntervalPreview, MasteryState, Rating, ReviewCard, ReviewOutcome};

#[derive(Debug, Clone, Default)]
pub struct ReviewEngine {
    config: EngineConfig,
}

impl ReviewEngine {
    /// Build an engine with a validated configuration.
    pub fn new(config: EngineConfig) -> Result<Self, SchedulerError> {
        config.scheduler.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply one rating: reschedule the card and recompute its mastery
    /// state. `history` is the concept's prior rating history, most
    /// recent last, excluding the rating being applied.
    pub fn apply_review(
        &self,
        card: &ReviewCard,
        history: &[Rating],
        rating: Rating,
        now: DateTime<Utc>,
    ) -> Result<ReviewOutcome, SchedulerError> {
        let mut outcome = scheduler::rate(card, rating, now, &self.config.scheduler)?;

        let mut full_history = Vec::with_capacity(history.len() + 1);
        full_history.extend_from_slice(history);
        full_history.push(rating);
        outcome.card.state = mastery::derive_state(&outcome.card, &full_history, &self.config.mastery);

        Ok(outcome)
    }

    /// Candidate intervals for the rating buttons; never mutates the card.
    pub fn preview(
        &self,
        card: &ReviewCard,
        now: DateTime<Utc>,
    ) -> Result<IntervalPreview, SchedulerError> {
        scheduler::preview_intervals(card, now, &self.config.scheduler)
    }

    /// Re-derive a card's mastery state without rescheduling, e.g. after
    /// a configuration change.
    pub fn derive_state(&self, card: &ReviewCard, history: &[Rating]) -> MasteryState {
        mastery::derive_state(card, history, &self.config.mastery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;

    #[test]
    fn test_rejects_invalid_config() {
        let config = EngineConfig {
            scheduler: SchedulerConfig {
                lapse_penalty: 2.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(ReviewEngine::new(config).is_err());
    }

    #[test]
    fn test_apply_review_updates_schedule_and_state() {
        let engine = ReviewEngine::default();
        let now = Utc::now();
        let card = ReviewCard::new("u1", "c1", "p1");

        let out = engine.apply_review(&card, &[], Rating::Good, now).unwrap();
        assert_eq!(out.card.reps, 1);
        assert!(out.card.stability > card.stability);
        assert!(out.card.due_at.unwrap() > now);
        // One good answer on a fresh concept leaves it early on the ladder.
        assert_ne!(out.card.state, MasteryState::Unseen);
        assert_ne!(out.card.state, MasteryState::Mastered);
    }

    #[test]
    fn test_repeated_good_reviews_climb_the_ladder() {
        let engine = ReviewEngine::default();
        let mut now = Utc::now();
        let mut card = ReviewCard::new("u1", "c1", "p1");
        let mut history = Vec::new();

        for _ in 0..8 {
            let out = engine.apply_review(&card, &history, Rating::Good, now).unwrap();
            history.push(Rating::Good);
            card = out.card;
            // The learner reviews exactly when the card comes due.
            now = card.due_at.unwrap();
        }
        assert_eq!(card.state, MasteryState::Mastered);
        assert_eq!(card.reps, 8);
        assert_eq!(card.lapses, 0);
    }

    #[test]
    fn test_lapse_streak_flags_misconception_then_recovers() {
        let engine = ReviewEngine::default();
        let mut now = Utc::now();
        let mut card = ReviewCard::new("u1", "c1", "p1");
        let mut history = Vec::new();

        for _ in 0..3 {
            let out = engine.apply_review(&card, &history, Rating::Again, now).unwrap();
            history.push(Rating::Again);
            card = out.card;
            now = card.due_at.unwrap();
        }
        assert_eq!(card.state, MasteryState::Misconceived);

        // Three good answers are not enough to clear it.
        for _ in 0..3 {
            let out = engine.apply_review(&card, &history, Rating::Good, now).unwrap();
            history.push(Rating::Good);
            card = out.card;
            now = card.due_at.unwrap();
        }
        assert_eq!(card.state, MasteryState::Misconceived);

        // The fourth completes the recovery run.
        let out = engine.apply_review(&card, &history, Rating::Good, now).unwrap();
        assert_ne!(out.card.state, MasteryState::Misconceived);
    }

    #[test]
    fn test_preview_leaves_card_untouched() {
        let engine = ReviewEngine::default();
        let now = Utc::now();
        let card = ReviewCard::new("u1", "c1", "p1");
        let before = card.clone();
        let _ = engine.preview(&card, now).unwrap();
        assert_eq!(card, before);
    }
}
