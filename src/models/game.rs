//! Match (game), Slot, advancement targets and the per-match timer.

use crate::models::participant::ParticipantId;
use crate::models::tournament::TournamentError;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// One of the two sides of a match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    #[default]
    One,
    Two,
}

impl Slot {
    pub fn other(self) -> Self {
        match self {
            Slot::One => Slot::Two,
            Slot::Two => Slot::One,
        }
    }
}

/// Where a participant goes once a match is decided.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SlotRef {
    pub match_id: MatchId,
    pub slot: Slot,
}

/// Lifecycle of a match as seen by the advancement engine.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchState {
    /// One or both slots are still unfilled.
    Empty,
    /// Both slots filled, no result yet.
    Ready,
    /// Scored. May be re-scored (edited).
    Complete,
}

/// Countdown state attached to a match. Purely a value object: the engine never reads it.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchTimer {
    /// Set while the clock is running.
    pub started_at: Option<DateTime<Utc>>,
    /// Set while the clock is paused.
    pub paused_remaining_secs: Option<i64>,
}

impl MatchTimer {
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Seconds left on a clock of `length_secs`, never negative.
    pub fn remaining(&self, length_secs: i64, now: DateTime<Utc>) -> i64 {
        if let Some(paused) = self.paused_remaining_secs {
            return paused;
        }
        match self.started_at {
            Some(started) => (length_secs - (now - started).num_seconds()).max(0),
            None => length_secs,
        }
    }

    pub fn start(&mut self, now: DateTime<Utc>) {
        self.started_at = Some(now);
        self.paused_remaining_secs = None;
    }

    pub fn pause(&mut self, length_secs: i64, now: DateTime<Utc>) {
        if self.is_running() {
            self.paused_remaining_secs = Some(self.remaining(length_secs, now));
            self.started_at = None;
        }
    }

    /// Continue from the paused value by back-dating the start.
    pub fn resume(&mut self, length_secs: i64, now: DateTime<Utc>) {
        if let Some(remaining) = self.paused_remaining_secs.take() {
            self.started_at = Some(now - TimeDelta::seconds(length_secs - remaining));
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Result of scoring a match. `previous_*` are set when an already complete match is edited.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ScoreChange {
    pub winner: ParticipantId,
    pub loser: ParticipantId,
    pub previous_winner: Option<ParticipantId>,
    pub previous_loser: Option<ParticipantId>,
}

impl ScoreChange {
    pub fn winner_changed(&self) -> bool {
        self.previous_winner.is_some_and(|p| p != self.winner)
    }
}

/// A single match between two slots (players or teams).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    /// 1-based round.
    pub round: u32,
    /// 1-based, stable ordering key within the round.
    pub match_number: u32,
    pub slot_1: Option<ParticipantId>,
    pub slot_2: Option<ParticipantId>,
    pub score_1: Option<u32>,
    pub score_2: Option<u32>,
    pub winner: Option<ParticipantId>,
    pub loser: Option<ParticipantId>,
    pub is_complete: bool,
    /// Third-place match.
    pub is_bronze: bool,
    /// Round robin only. None means waiting (not courted this round).
    pub court: Option<u32>,
    /// Downstream slot the winner is written into (bracket only).
    pub winner_to: Option<SlotRef>,
    /// Bronze match the loser drops into (first empty slot).
    pub loser_to: Option<MatchId>,
    #[serde(default)]
    pub timer: MatchTimer,
}

impl GameMatch {
    /// An unseeded match: both slots empty.
    pub fn new(round: u32, match_number: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            match_number,
            slot_1: None,
            slot_2: None,
            score_1: None,
            score_2: None,
            winner: None,
            loser: None,
            is_complete: false,
            is_bronze: false,
            court: None,
            winner_to: None,
            loser_to: None,
            timer: MatchTimer::default(),
        }
    }

    /// A match with both slots seeded.
    pub fn between(round: u32, match_number: u32, a: ParticipantId, b: ParticipantId) -> Self {
        Self {
            slot_1: Some(a),
            slot_2: Some(b),
            ..Self::new(round, match_number)
        }
    }

    pub fn slot(&self, slot: Slot) -> Option<ParticipantId> {
        match slot {
            Slot::One => self.slot_1,
            Slot::Two => self.slot_2,
        }
    }

    pub fn set_slot(&mut self, slot: Slot, participant: Option<ParticipantId>) {
        match slot {
            Slot::One => self.slot_1 = participant,
            Slot::Two => self.slot_2 = participant,
        }
    }

    /// Which slot holds the participant, if any.
    pub fn slot_of(&self, participant: ParticipantId) -> Option<Slot> {
        if self.slot_1 == Some(participant) {
            Some(Slot::One)
        } else if self.slot_2 == Some(participant) {
            Some(Slot::Two)
        } else {
            None
        }
    }

    pub fn first_empty_slot(&self) -> Option<Slot> {
        [Slot::One, Slot::Two]
            .into_iter()
            .find(|&s| self.slot(s).is_none())
    }

    /// Remove the participant from whichever slot it occupies. Returns true if it was present.
    pub fn clear_participant(&mut self, participant: ParticipantId) -> bool {
        match self.slot_of(participant) {
            Some(slot) => {
                self.set_slot(slot, None);
                true
            }
            None => false,
        }
    }

    pub fn involves(&self, participant: ParticipantId) -> bool {
        self.slot_of(participant).is_some()
    }

    pub fn state(&self) -> MatchState {
        if self.is_complete {
            MatchState::Complete
        } else if self.slot_1.is_some() && self.slot_2.is_some() {
            MatchState::Ready
        } else {
            MatchState::Empty
        }
    }

    /// Score as seen from `participant`: (points for, points against).
    pub fn points_for(&self, participant: ParticipantId) -> Option<(u32, u32)> {
        let (s1, s2) = (self.score_1?, self.score_2?);
        match self.slot_of(participant)? {
            Slot::One => Some((s1, s2)),
            Slot::Two => Some((s2, s1)),
        }
    }

    /// Record (or overwrite) the score and derive winner/loser.
    /// Nothing is written when validation fails.
    pub fn record_score(&mut self, score_1: u32, score_2: u32) -> Result<ScoreChange, TournamentError> {
        let (Some(p1), Some(p2)) = (self.slot_1, self.slot_2) else {
            return Err(TournamentError::EmptySlot(self.id));
        };
        if score_1 == score_2 {
            return Err(TournamentError::TiedScore);
        }
        let (winner, loser) = if score_1 > score_2 { (p1, p2) } else { (p2, p1) };
        let change = ScoreChange {
            winner,
            loser,
            previous_winner: self.winner,
            previous_loser: self.loser,
        };
        self.score_1 = Some(score_1);
        self.score_2 = Some(score_2);
        self.winner = Some(winner);
        self.loser = Some(loser);
        self.is_complete = true;
        Ok(change)
    }
}
