//! Common Types and Constants
//!
//! Shared data structures used across all engine modules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scheduler::SchedulerError;

// ==================== Constants ====================

/// Stability assigned to a card on first exposure, in days
pub const SEED_STABILITY: f64 = 0.5;

/// Difficulty assigned to a card on first exposure
pub const DEFAULT_DIFFICULTY: f64 = 5.0;

/// Lower difficulty bound
pub const MIN_DIFFICULTY: f64 = 1.0;

/// Upper difficulty bound
pub const MAX_DIFFICULTY: f64 = 10.0;

/// Milliseconds per day, used for elapsed-time arithmetic
pub const MS_PER_DAY: f64 = 86_400_000.0;

/// Numerical stability epsilon
pub const EPSILON: f64 = 1e-10;

// ==================== Rating ====================

/// Recall quality reported by the learner for a single review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    Again = 1,
    Hard = 2,
    Good = 3,
    Easy = 4,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    /// Numeric ordinal, 1 (Again) through 4 (Easy).
    pub fn ordinal(&self) -> i32 {
        *self as i32
    }

    /// True for every rating except `Again`.
    pub fn is_success(&self) -> bool {
        !matches!(self, Rating::Again)
    }

    /// Derive a rating from answer correctness and response latency, for
    /// hosts that only capture correct/incorrect plus timing.
    pub fn from_response(is_correct: bool, response_time_ms: i64) -> Self {
        if !is_correct {
            return Self::Again;
        }
        if response_time_ms < 2000 {
            Self::Easy
        } else if response_time_ms < 5000 {
            Self::Good
        } else {
            Self::Hard
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Again => "AGAIN",
            Self::Hard => "HARD",
            Self::Good => "GOOD",
            Self::Easy => "EASY",
        }
    }
}

impl TryFrom<u8> for Rating {
    type Error = SchedulerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rating::Again),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Good),
            4 => Ok(Rating::Easy),
            other => Err(SchedulerError::InvalidRating(other)),
        }
    }
}

// ==================== MasteryState ====================

/// Discrete summary of a learner's grasp of one concept.
///
/// `Unseen` through `Mastered` form a linear order of increasing
/// competence. `Misconceived` sits outside that order: it flags a
/// persistently mis-learned concept and dominates severity regardless of
/// the card's stability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MasteryState {
    Unseen,
    Exposed,
    Fragile,
    Developing,
    Solid,
    Mastered,
    Misconceived,
}

impl Default for MasteryState {
    fn default() -> Self {
        Self::Unseen
    }
}

/// Presentation metadata attached to each mastery state. The color token
/// is passed through to the UI untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateMeta {
    pub label: &'static str,
    pub color: &'static str,
    pub progress_percent: u8,
}

impl MasteryState {
    /// The linearly ordered states, lowest competence first.
    pub const LINEAR: [MasteryState; 6] = [
        MasteryState::Unseen,
        MasteryState::Exposed,
        MasteryState::Fragile,
        MasteryState::Developing,
        MasteryState::Solid,
        MasteryState::Mastered,
    ];

    /// Every state, including the out-of-order sentinel.
    pub const ALL: [MasteryState; 7] = [
        MasteryState::Unseen,
        MasteryState::Exposed,
        MasteryState::Fragile,
        MasteryState::Developing,
        MasteryState::Solid,
        MasteryState::Mastered,
        MasteryState::Misconceived,
    ];

    /// Position in the linear order; `None` for `Misconceived`.
    pub fn rank(&self) -> Option<u8> {
        match self {
            Self::Unseen => Some(0),
            Self::Exposed => Some(1),
            Self::Fragile => Some(2),
            Self::Developing => Some(3),
            Self::Solid => Some(4),
            Self::Mastered => Some(5),
            Self::Misconceived => None,
        }
    }

    pub fn meta(&self) -> StateMeta {
        match self {
            Self::Unseen => StateMeta {
                label: "Unseen",
                color: "slate",
                progress_percent: 0,
            },
            Self::Exposed => StateMeta {
                label: "Exposed",
                color: "sky",
                progress_percent: 10,
            },
            Self::Fragile => StateMeta {
                label: "Fragile",
                color: "amber",
                progress_percent: 25,
            },
            Self::Developing => StateMeta {
                label: "Developing",
                color: "indigo",
                progress_percent: 50,
            },
            Self::Solid => StateMeta {
                label: "Solid",
                color: "teal",
                progress_percent: 75,
            },
            Self::Mastered => StateMeta {
                label: "Mastered",
                color: "emerald",
                progress_percent: 100,
            },
            Self::Misconceived => StateMeta {
                label: "Misconceived",
                color: "rose",
                progress_percent: 5,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unseen => "UNSEEN",
            Self::Exposed => "EXPOSED",
            Self::Fragile => "FRAGILE",
            Self::Developing => "DEVELOPING",
            Self::Solid => "SOLID",
            Self::Mastered => "MASTERED",
            Self::Misconceived => "MISCONCEIVED",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "EXPOSED" => Self::Exposed,
            "FRAGILE" => Self::Fragile,
            "DEVELOPING" => Self::Developing,
            "SOLID" => Self::Solid,
            "MASTERED" => Self::Mastered,
            "MISCONCEIVED" => Self::Misconceived,
            _ => Self::Unseen,
        }
    }
}

// ==================== ReviewCard ====================

/// Per-(learner, concept) scheduling record.
///
/// Created on first exposure to a concept, mutated exclusively by the
/// scheduler in response to a rating. `version` is the optimistic
/// concurrency token bumped by the store on every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCard {
    pub user_id: String,
    pub concept_id: String,
    pub project_id: String,
    /// Memory half-life proxy, in days. Always positive.
    pub stability: f64,
    /// Intrinsic resistance to stabilization, in [1, 10].
    pub difficulty: f64,
    pub reps: i32,
    pub lapses: i32,
    pub last_review_at: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
    pub state: MasteryState,
    pub version: i64,
}

impl ReviewCard {
    pub fn new(
        user_id: impl Into<String>,
        concept_id: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            concept_id: concept_id.into(),
            project_id: project_id.into(),
            stability: SEED_STABILITY,
            difficulty: DEFAULT_DIFFICULTY,
            reps: 0,
            lapses: 0,
            last_review_at: None,
            due_at: None,
            state: MasteryState::Unseen,
            version: 0,
        }
    }

    /// A card that has never been rated.
    pub fn is_new(&self) -> bool {
        self.reps == 0
    }

    /// Days since the last review, 0 for an unreviewed card. Clock skew
    /// (a `now` before the last review) clamps to 0.
    pub fn elapsed_days(&self, now: DateTime<Utc>) -> f64 {
        match self.last_review_at {
            Some(last) => ((now - last).num_milliseconds() as f64 / MS_PER_DAY).max(0.0),
            None => 0.0,
        }
    }
}

// ==================== Scheduler outputs ====================

/// Result of applying one rating to a card.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub card: ReviewCard,
    /// Interval until the next review, in days.
    pub interval_days: f64,
    /// Predicted recall probability at the moment the review happened.
    pub retrievability: f64,
}

/// Candidate intervals (days) for each rating, shown on rating buttons
/// before the learner commits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalPreview {
    pub again: f64,
    pub hard: f64,
    pub good: f64,
    pub easy: f64,
}

impl IntervalPreview {
    pub fn get(&self, rating: Rating) -> f64 {
        match rating {
            Rating::Again => self.again,
            Rating::Hard => self.hard,
            Rating::Good => self.good,
            Rating::Easy => self.easy,
        }
    }

    /// Whether the typical `again <= hard <= good <= easy` ordering holds.
    /// This is an expectation, not an invariant.
    pub fn is_monotonic(&self) -> bool {
        self.again <= self.hard && self.hard <= self.good && self.good <= self.easy
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Rating ====================

    #[test]
    fn test_rating_ordinals() {
        assert_eq!(Rating::Again.ordinal(), 1);
        assert_eq!(Rating::Hard.ordinal(), 2);
        assert_eq!(Rating::Good.ordinal(), 3);
        assert_eq!(Rating::Easy.ordinal(), 4);
    }

    #[test]
    fn test_rating_is_success() {
        assert!(!Rating::Again.is_success());
        assert!(Rating::Hard.is_success());
        assert!(Rating::Good.is_success());
        assert!(Rating::Easy.is_success());
    }

    #[test]
    fn test_rating_from_response() {
        assert_eq!(Rating::from_response(false, 100), Rating::Again);
        assert_eq!(Rating::from_response(false, 10_000), Rating::Again);
        assert_eq!(Rating::from_response(true, 1500), Rating::Easy);
        assert_eq!(Rating::from_response(true, 3000), Rating::Good);
        assert_eq!(Rating::from_response(true, 8000), Rating::Hard);
    }

    #[test]
    fn test_rating_try_from_valid() {
        assert_eq!(Rating::try_from(1).unwrap(), Rating::Again);
        assert_eq!(Rating::try_from(2).unwrap(), Rating::Hard);
        assert_eq!(Rating::try_from(3).unwrap(), Rating::Good);
        assert_eq!(Rating::try_from(4).unwrap(), Rating::Easy);
    }

    #[test]
    fn test_rating_try_from_invalid() {
        assert!(matches!(
            Rating::try_from(0),
            Err(SchedulerError::InvalidRating(0))
        ));
        assert!(matches!(
            Rating::try_from(5),
            Err(SchedulerError::InvalidRating(5))
        ));
        assert!(matches!(
            Rating::try_from(255),
            Err(SchedulerError::InvalidRating(255))
        ));
    }

    // ==================== MasteryState ====================

    #[test]
    fn test_state_rank_linear_order() {
        let ranks: Vec<u8> = MasteryState::LINEAR
            .iter()
            .map(|s| s.rank().expect("linear states have a rank"))
            .collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_misconceived_has_no_rank() {
        assert_eq!(MasteryState::Misconceived.rank(), None);
    }

    #[test]
    fn test_progress_weights_monotonic_between_endpoints() {
        assert_eq!(MasteryState::Unseen.meta().progress_percent, 0);
        assert_eq!(MasteryState::Mastered.meta().progress_percent, 100);
        let weights: Vec<u8> = MasteryState::LINEAR
            .iter()
            .map(|s| s.meta().progress_percent)
            .collect();
        for pair in weights.windows(2) {
            assert!(pair[0] < pair[1], "weights must increase: {:?}", weights);
        }
    }

    #[test]
    fn test_state_str_round_trip() {
        for state in MasteryState::ALL {
            assert_eq!(MasteryState::from_str(state.as_str()), state);
        }
        assert_eq!(MasteryState::from_str("unknown"), MasteryState::Unseen);
        assert_eq!(MasteryState::from_str("mastered"), MasteryState::Mastered);
    }

    #[test]
    fn test_state_serde_screaming_snake() {
        let json = serde_json::to_string(&MasteryState::Misconceived).unwrap();
        assert_eq!(json, "\"MISCONCEIVED\"");
        let back: MasteryState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MasteryState::Misconceived);
    }

    // ==================== ReviewCard ====================

    #[test]
    fn test_new_card_defaults() {
        let card = ReviewCard::new("u1", "c1", "p1");
        assert!(card.is_new());
        assert_eq!(card.stability, SEED_STABILITY);
        assert_eq!(card.difficulty, DEFAULT_DIFFICULTY);
        assert_eq!(card.reps, 0);
        assert_eq!(card.lapses, 0);
        assert_eq!(card.state, MasteryState::Unseen);
        assert!(card.last_review_at.is_none());
        assert!(card.due_at.is_none());
        assert_eq!(card.version, 0);
    }

    #[test]
    fn test_elapsed_days() {
        let now = Utc::now();
        let mut card = ReviewCard::new("u1", "c1", "p1");
        assert_eq!(card.elapsed_days(now), 0.0);

        card.last_review_at = Some(now - chrono::Duration::days(3));
        let elapsed = card.elapsed_days(now);
        assert!((elapsed - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_elapsed_days_clamps_clock_skew() {
        let now = Utc::now();
        let mut card = ReviewCard::new("u1", "c1", "p1");
        card.last_review_at = Some(now + chrono::Duration::hours(2));
        assert_eq!(card.elapsed_days(now), 0.0);
    }

    #[test]
    fn test_card_serde_camel_case() {
        let card = ReviewCard::new("u1", "c1", "p1");
        let json = serde_json::to_value(&card).unwrap();
        assert!(json.get("userId").is_some());
        assert!(json.get("conceptId").is_some());
        assert!(json.get("lastReviewAt").is_some());
        assert!(json.get("dueAt").is_some());
        let back: ReviewCard = serde_json::from_value(json).unwrap();
        assert_eq!(back, card);
    }

    // ==================== IntervalPreview ====================

    #[test]
    fn test_preview_get_and_monotonic() {
        let preview = IntervalPreview {
            again: 0.5,
            hard: 1.0,
            good: 3.0,
            easy: 7.0,
        };
        assert_eq!(preview.get(Rating::Again), 0.5);
        assert_eq!(preview.get(Rating::Easy), 7.0);
        assert!(preview.is_monotonic());

        let skewed = IntervalPreview {
            again: 2.0,
            hard: 1.0,
            good: 3.0,
            easy: 7.0,
        };
        assert!(!skewed.is_monotonic());
    }
}
