//! Review Queue Manager
//!
//! Selects and orders the cards due for a sitting and tracks session
//! progress through a small state machine. Sessions are ephemeral: the
//! plan is snapshotted at start and discarded on drop, while every rated
//! card has already been durably updated by the scheduler.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::types::ReviewCard;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session already started")]
    AlreadyStarted,
    #[error("session not started")]
    NotStarted,
    #[error("session already completed")]
    Completed,
}

/// Whole days a card is past due; 0 for cards not yet due and for cards
/// that were never reviewed (newly introduced, not overdue).
pub fn days_overdue(card: &ReviewCard, now: DateTime<Utc>) -> i64 {
    if card.reps == 0 {
        return 0;
    }
    match card.due_at {
        Some(due) if due <= now => (now - due).num_days(),
        _ => 0,
    }
}

/// A card is eligible for review once its due date has passed. Cards
/// without a due date have never been reviewed and are always eligible.
pub fn is_due(card: &ReviewCard, now: DateTime<Utc>) -> bool {
    match card.due_at {
        Some(due) => due <= now,
        None => true,
    }
}

/// Due cards in review order: most overdue first, ties broken by
/// ascending stability so the most fragile concepts surface first.
/// `scope` restricts the selection to one project.
pub fn collect_due(
    cards: &[ReviewCard],
    scope: Option<&str>,
    now: DateTime<Utc>,
) -> Vec<ReviewCard> {
    let mut due: Vec<ReviewCard> = cards
        .iter()
        .filter(|card| scope.map_or(true, |p| card.project_id == p))
        .filter(|card| is_due(card, now))
        .cloned()
        .collect();
    due.sort_by(|a, b| {
        days_overdue(b, now)
            .cmp(&days_overdue(a, now))
            .then_with(|| {
                a.stability
                    .partial_cmp(&b.stability)
                    .unwrap_or(Ordering::Equal)
            })
    });
    due
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }
}

/// Cursor position for "Question X of Y" displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProgress {
    pub answered: usize,
    pub total: usize,
    pub status: SessionStatus,
}

/// One review sitting over a fixed plan of due cards.
///
/// The live due set may keep changing while the learner works, but the
/// plan snapshotted by [`ReviewSession::start`] does not grow
/// mid-session; newly due cards wait for the next sitting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSession {
    pub id: String,
    pub scope: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    status: SessionStatus,
    plan: Vec<ReviewCard>,
    cursor: usize,
}

impl ReviewSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            scope: None,
            started_at: None,
            status: SessionStatus::NotStarted,
            plan: Vec::new(),
            cursor: 0,
        }
    }

    /// Snapshot the currently due cards into an immutable ordered plan
    /// and begin the sitting. A start with nothing due completes
    /// immediately. Returns the plan size.
    pub fn start(
        &mut self,
        cards: &[ReviewCard],
        scope: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<usize, SessionError> {
        if self.status != SessionStatus::NotStarted {
            return Err(SessionError::AlreadyStarted);
        }
        self.plan = collect_due(cards, scope, now);
        self.scope = scope.map(str::to_string);
        self.started_at = Some(now);
        self.cursor = 0;
        self.status = if self.plan.is_empty() {
            SessionStatus::Completed
        } else {
            SessionStatus::InProgress
        };
        debug!(session = %self.id, planned = self.plan.len(), "review session started");
        Ok(self.plan.len())
    }

    /// The card currently awaiting an answer.
    pub fn current(&self) -> Option<&ReviewCard> {
        if self.status != SessionStatus::InProgress {
            return None;
        }
        self.plan.get(self.cursor)
    }

    /// Record that the current card was answered and move on. Reaching
    /// the end of the plan completes the session.
    pub fn advance(&mut self) -> Result<SessionProgress, SessionError> {
        match self.status {
            SessionStatus::NotStarted => return Err(SessionError::NotStarted),
            SessionStatus::Completed => return Err(SessionError::Completed),
            SessionStatus::InProgress => {}
        }
        self.cursor += 1;
        if self.cursor >= self.plan.len() {
            self.status = SessionStatus::Completed;
            debug!(session = %self.id, answered = self.cursor, "review session completed");
        }
        Ok(self.progress())
    }

    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            answered: self.cursor.min(self.plan.len()),
            total: self.plan.len(),
            status: self.status,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn plan(&self) -> &[ReviewCard] {
        &self.plan
    }

    pub fn is_complete(&self) -> bool {
        self.status == SessionStatus::Completed
    }
}

impl Default for ReviewSession {
    fn default() -> Self {
        Self::new()
    }
}
