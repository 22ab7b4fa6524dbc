//! Card Store Seam
//!
//! The persistence collaborator is a trait; the engine itself never does
//! I/O. [`MemoryStore`] is the reference implementation used by tests and
//! embedded hosts. Saves are guarded by compare-and-swap on the card's
//! version so two writers working from the same stale snapshot cannot
//! silently overwrite one another.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::types::ReviewCard;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("card not found for concept {concept_id}")]
    NotFound { concept_id: String },
    #[error("version conflict for concept {concept_id}: expected {expected}, found {found}")]
    Conflict {
        concept_id: String,
        expected: i64,
        found: i64,
    },
}

/// Synchronous persistence contract. Hosts wrap this in whatever
/// async/transactional machinery their storage needs.
pub trait CardStore {
    fn load_card(&self, user_id: &str, concept_id: &str) -> Result<Option<ReviewCard>, StoreError>;
    /// Persist a card and return the stored copy with its bumped version.
    fn save_card(&self, card: &ReviewCard) -> Result<ReviewCard, StoreError>;
    fn list_cards(&self, user_id: &str, scope: Option<&str>) -> Result<Vec<ReviewCard>, StoreError>;
}

/// In-memory store keyed by (user, concept).
#[derive(Debug, Default)]
pub struct MemoryStore {
    cards: RwLock<HashMap<(String, String), ReviewCard>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cards.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.read().is_empty()
    }
}

impl CardStore for MemoryStore {
    fn load_card(&self, user_id: &str, concept_id: &str) -> Result<Option<ReviewCard>, StoreError> {
        let cards = self.cards.read();
        Ok(cards
            .get(&(user_id.to_string(), concept_id.to_string()))
            .cloned())
    }

    fn save_card(&self, card: &ReviewCard) -> Result<ReviewCard, StoreError> {
        let mut cards = self.cards.write();
        let key = (card.user_id.clone(), card.concept_id.clone());
        if let Some(existing) = cards.get(&key) {
            if existing.version != card.version {
                return Err(StoreError::Conflict {
                    concept_id: card.concept_id.clone(),
                    expected: card.version,
                    found: existing.version,
                });
            }
        }
        let mut stored = card.clone();
        stored.version = card.version + 1;
        cards.insert(key, stored.clone());
        Ok(stored)
    }

    fn list_cards(&self, user_id: &str, scope: Option<&str>) -> Result<Vec<ReviewCard>, StoreError> {
        let cards = self.cards.read();
        let mut out: Vec<ReviewCard> = cards
            .values()
            .filter(|card| card.user_id == user_id)
            .filter(|card| scope.map_or(true, |p| card.project_id == p))
            .cloned()
            .collect();
        // Stable listing order for callers that do not re-sort.
        out.sort_by(|a, b| a.concept_id.cmp(&b.concept_id));
        Ok(out)
    }
}
