//! Pickleball tournament organizer: library with models, scheduling/advancement logic and
//! the store boundary.

pub mod logic;
pub mod models;
pub mod store;

pub use logic::{
    build_bracket, build_pools, calculate_standings, generate_bracket, generate_pools,
    import_participants_csv, start_playoffs, start_tournament, submit_score, BracketLayout,
    ScoreOutcome, Tiebreak, TimerAction,
};
pub use models::{
    GameMatch, MatchId, MatchState, Participant, ParticipantId, Pool, PoolId, Slot, SlotRef,
    Standing, Tournament, TournamentError, TournamentFormat, TournamentId, TournamentSettings,
    TournamentState,
};
pub use store::{MemoryStore, StoreError, TournamentService, TournamentStore};
