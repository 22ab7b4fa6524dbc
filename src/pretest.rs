//! Prerequisite Pretest Classifier
//!
//! A deliberately simple threshold decision engine: given pretest
//! answers, bucket the score into a proceed/review recommendation and
//! list the prerequisites that showed gaps. It shares this crate but is
//! not consumed by the scheduling core; the two only meet in the UI.

use serde::{Deserialize, Serialize};

/// Score fraction at or above which the learner may proceed directly.
const PROCEED_THRESHOLD: f64 = 0.8;
/// Score fraction at or above which review is suggested rather than required.
const REVIEW_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PretestDecision {
    Proceed,
    ReviewSuggested,
    ReviewRequired,
}

/// One answered pretest question, tied to the prerequisite it probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PretestAnswer {
    pub prerequisite_id: String,
    pub correct: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PretestOutcome {
    pub score_percent: u8,
    pub decision: PretestDecision,
    /// Prerequisites answered incorrectly, in pretest order.
    pub gaps: Vec<String>,
}

/// Bucket a raw correct/total count. An empty pretest has nothing to
/// gate on and proceeds.
pub fn classify(correct: usize, total: usize) -> PretestDecision {
    if total == 0 {
        return PretestDecision::Proceed;
    }
    let fraction = correct as f64 / total as f64;
    if fraction >= PROCEED_THRESHOLD {
        PretestDecision::Proceed
    } else if fraction >= REVIEW_THRESHOLD {
        PretestDecision::ReviewSuggested
    } else {
        PretestDecision::ReviewRequired
    }
}

pub fn analyze(answers: &[PretestAnswer]) -> PretestOutcome {
    let total = answers.len();
    let correct = answers.iter().filter(|a| a.correct).count();

    let mut gaps = Vec::new();
    for answer in answers {
        if !answer.correct && !gaps.contains(&answer.prerequisite_id) {
            gaps.push(answer.prerequisite_id.clone());
        }
    }

    let score_percent = if total == 0 {
        0
    } else {
        ((correct as f64 / total as f64) * 100.0).round() as u8
    };

    PretestOutcome {
        score_percent,
        decision: classify(correct, total),
        gaps,
    }
}
