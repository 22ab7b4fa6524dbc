//! Mastery Aggregation
//!
//! Derived, report-only summaries over a scope of concepts: per-state
//! counts, a weighted progress percentage, and the lowest (most urgent)
//! state. Recomputed on demand, never persisted as source of truth.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::types::{MasteryState, ReviewCard};

/// Count of concepts per mastery state within one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MasteryDistribution {
    counts: HashMap<MasteryState, u64>,
}

impl MasteryDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_states(states: impl IntoIterator<Item = MasteryState>) -> Self {
        let mut dist = Self::default();
        for state in states {
            dist.increment(state);
        }
        dist
    }

    /// Parallel tally over a large card set.
    pub fn par_from_cards(cards: &[ReviewCard]) -> Self {
        cards
            .par_iter()
            .fold(Self::default, |mut acc, card| {
                acc.increment(card.state);
                acc
            })
            .reduce(Self::default, |mut a, b| {
                a.merge(&b);
                a
            })
    }

    pub fn increment(&mut self, state: MasteryState) {
        *self.counts.entry(state).or_insert(0) += 1;
    }

    pub fn add(&mut self, state: MasteryState, count: u64) {
        if count > 0 {
            *self.counts.entry(state).or_insert(0) += count;
        }
    }

    pub fn merge(&mut self, other: &Self) {
        for (state, count) in &other.counts {
            self.add(*state, *count);
        }
    }

    pub fn get(&self, state: MasteryState) -> u64 {
        self.counts.get(&state).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Count-weighted average of each state's progress weight, rounded to the
/// nearest integer percent (ties away from zero). An empty scope is a
/// valid neutral answer of 0, not an error.
pub fn calculate_mastery_progress(distribution: &MasteryDistribution) -> u8 {
    let total = distribution.total();
    if total == 0 {
        return 0;
    }
    let weighted: f64 = MasteryState::ALL
        .iter()
        .map(|s| distribution.get(*s) as f64 * f64::from(s.meta().progress_percent))
        .sum();
    (weighted / total as f64).round() as u8
}

/// The most urgent state present in the distribution. A nonzero
/// misconceived count dominates regardless of everything else; an empty
/// distribution answers `Unseen`.
pub fn get_lowest_state(distribution: &MasteryDistribution) -> MasteryState {
    if distribution.get(MasteryState::Misconceived) > 0 {
        return MasteryState::Misconceived;
    }
    for state in MasteryState::LINEAR {
        if distribution.get(state) > 0 {
            return state;
        }
    }
    MasteryState::Unseen
}

/// Flattened per-state counts for dashboard hosts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionSummary {
    pub total_concepts: u64,
    pub unseen: u64,
    pub exposed: u64,
    pub fragile: u64,
    pub developing: u64,
    pub solid: u64,
    pub mastered: u64,
    pub misconceived: u64,
    pub progress_percent: u8,
    pub lowest_state: MasteryState,
}

pub fn summarize(distribution: &MasteryDistribution) -> DistributionSummary {
    DistributionSummary {
        total_concepts: distribution.total(),
        unseen: distribution.get(MasteryState::Unseen),
        exposed: distribution.get(MasteryState::Exposed),
        fragile: distribution.get(MasteryState::Fragile),
        developing: distribution.get(MasteryState::Developing),
        solid: distribution.get(MasteryState::Solid),
        mastered: distribution.get(MasteryState::Mastered),
        misconceived: distribution.get(MasteryState::Misconceived),
        progress_percent: calculate_mastery_progress(distribution),
        lowest_state: get_lowest_state(distribution),
    }
}
