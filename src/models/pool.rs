//! Round-robin pool.

use crate::models::game::GameMatch;
use crate::models::participant::ParticipantId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a pool.
pub type PoolId = Uuid;

/// A subset of participants who all play each other once.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub id: PoolId,
    pub name: String,
    pub participant_ids: Vec<ParticipantId>,
    /// Ordered by round, then match number.
    pub matches: Vec<GameMatch>,
}

impl Pool {
    pub fn new(name: impl Into<String>, participant_ids: Vec<ParticipantId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            participant_ids,
            matches: Vec::new(),
        }
    }

    /// Number of scheduled rounds (0 before scheduling).
    pub fn round_count(&self) -> u32 {
        self.matches.iter().map(|m| m.round).max().unwrap_or(0)
    }

    /// Matches that were given a court. Waiting matches are not required for completion.
    pub fn courted_matches(&self) -> impl Iterator<Item = &GameMatch> {
        self.matches.iter().filter(|m| m.court.is_some())
    }

    pub fn is_complete(&self) -> bool {
        self.courted_matches().all(|m| m.is_complete)
    }
}
