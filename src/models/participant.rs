//! Participant (player or team) data structure.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a participant (used in match slots and lookups).
pub type ParticipantId = Uuid;

/// A player or team entered in the tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    /// 1-based registration (or ranking) order. Lower seeds are stronger.
    pub seed: u32,
}

impl Participant {
    /// Create a new participant with the given name and seed.
    pub fn new(name: impl Into<String>, seed: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            seed,
        }
    }
}
