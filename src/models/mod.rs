//! Data structures for the pickleball tournament: participants, matches, pools, standings.

mod game;
mod participant;
mod pool;
mod standing;
mod tournament;

pub use game::{GameMatch, MatchId, MatchState, MatchTimer, ScoreChange, Slot, SlotRef};
pub use participant::{Participant, ParticipantId};
pub use pool::{Pool, PoolId};
pub use standing::Standing;
pub use tournament::{
    Tournament, TournamentError, TournamentFormat, TournamentId, TournamentSettings,
    TournamentState,
};
