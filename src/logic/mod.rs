//! Tournament business logic: setup, bracket generation, advancement, round robin, standings.

mod advancement;
mod bracket;
mod round_robin;
mod setup;
mod standings;
mod timer;

pub use advancement::{score_from_input, submit_score, ScoreOutcome};
pub use bracket::{build_bracket, generate_bracket, round_count, BracketLayout};
pub use round_robin::{
    assign_courts, build_pools, circle_schedule, generate_pools, pool_play_complete, pool_sizes,
    start_playoffs, MIN_ROUND_ROBIN_PARTICIPANTS,
};
pub use setup::{import_participants_csv, start_tournament};
pub use standings::{calculate_standings, playoff_seeds, Tiebreak, PLAYOFF_SIZE};
pub use timer::{update_match_timer, TimerAction};
