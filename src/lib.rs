//! # mnema-algo - Concept Learning Core Algorithms
//!
//! Pure Rust implementation of the scheduling and mastery-tracking engine
//! behind the Mnema learning app:
//!
//! - **Scheduler** - power-law forgetting curve, rating transitions, due dates
//! - **Mastery Engine** - discrete mastery states with hysteresis, aggregation
//! - **Review Queue** - due-card selection, ordering, session state machine
//!
//! ## Design goals
//!
//! - **Pure computation** - no I/O, no wall clock; every operation takes an
//!   explicit `now`, so behavior is fully deterministic and testable
//! - **Injectable tuning** - every curve constant and ladder cutoff lives in
//!   a config struct, not a hard-coded module constant
//! - **Strict boundaries** - malformed card state fails loudly instead of
//!   being silently repaired
//! - **Host-agnostic** - persistence and transport live behind the
//!   [`store::CardStore`] seam; hosts serialize everything as JSON
//!
//! ## Module structure
//!
//! - [`types`] - cards, ratings, mastery states, shared constants
//! - [`config`] - scheduler and mastery tuning with validated defaults
//! - [`scheduler`] - forgetting curve, rating transitions, interval previews
//! - [`mastery`] - state derivation and misconception hysteresis
//! - [`aggregate`] - distributions, progress percent, lowest state
//! - [`queue`] - due selection, ordering, review sessions
//! - [`store`] - persistence seam and in-memory reference store
//! - [`engine`] - one-call-per-answer orchestration facade
//! - [`pretest`] - standalone prerequisite gap classifier
//!
//! ## Usage
//!
//! ```rust
//! use chrono::Utc;
//! use mnema_algo::{Rating, ReviewCard, ReviewEngine};
//!
//! let engine = ReviewEngine::default();
//! let card = ReviewCard::new("learner-1", "concept-1", "project-1");
//!
//! // Show the learner what each rating button would schedule.
//! let preview = engine.preview(&card, Utc::now()).unwrap();
//! assert!(preview.easy >= preview.hard);
//!
//! // Apply the answer and persist `outcome.card` through the store.
//! let outcome = engine
//!     .apply_review(&card, &[], Rating::Good, Utc::now())
//!     .unwrap();
//! assert!(outcome.card.stability > card.stability);
//! ```

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod mastery;
pub mod pretest;
pub mod queue;
pub mod scheduler;
pub mod store;
pub mod types;

pub use aggregate::{
    calculate_mastery_progress, get_lowest_state, summarize, DistributionSummary,
    MasteryDistribution,
};
pub use config::{EngineConfig, MasteryConfig, SchedulerConfig};
pub use engine::ReviewEngine;
pub use mastery::derive_state;
pub use queue::{
    collect_due, days_overdue, is_due, ReviewSession, SessionError, SessionProgress, SessionStatus,
};
pub use scheduler::{preview_intervals, rate, retrievability, validate_card, SchedulerError};
pub use store::{CardStore, MemoryStore, StoreError};
pub use types::{
    IntervalPreview, MasteryState, Rating, ReviewCard, ReviewOutcome, StateMeta,
};
