//! Standing: derived ranking record, recomputed from completed matches.

use crate::models::participant::ParticipantId;
use crate::models::pool::PoolId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One participant's record across their pool's completed matches.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub participant_id: ParticipantId,
    pub pool_id: PoolId,
    pub wins: u32,
    pub losses: u32,
    pub points_for: u32,
    pub points_against: u32,
    pub point_differential: i64,
    /// Opponent id -> +1 (beat them) or -1 (lost to them).
    pub head_to_head: HashMap<ParticipantId, i8>,
}

impl Standing {
    pub fn new(participant_id: ParticipantId, pool_id: PoolId) -> Self {
        Self {
            participant_id,
            pool_id,
            ..Self::default()
        }
    }

    /// Fold one completed match into the record.
    pub fn record(&mut self, opponent: ParticipantId, scored: u32, conceded: u32) {
        let won = scored > conceded;
        if won {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        self.points_for += scored;
        self.points_against += conceded;
        self.point_differential = i64::from(self.points_for) - i64::from(self.points_against);
        self.head_to_head.insert(opponent, if won { 1 } else { -1 });
    }

    /// Head-to-head result against `opponent`, 0 if they have not played.
    pub fn result_against(&self, opponent: ParticipantId) -> i8 {
        self.head_to_head.get(&opponent).copied().unwrap_or(0)
    }

    pub fn matches_played(&self) -> u32 {
        self.wins + self.losses
    }
}
