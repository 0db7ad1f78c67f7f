//! Match timers: start/pause/resume/reset the countdown stored on a match.

use crate::models::{GameMatch, MatchId, Tournament, TournamentError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerAction {
    Start,
    Pause,
    Resume,
    Reset,
}

/// Apply a timer action. Requires the tournament to have a timer length configured.
pub fn update_match_timer(
    tournament: &mut Tournament,
    match_id: MatchId,
    action: TimerAction,
    now: DateTime<Utc>,
) -> Result<GameMatch, TournamentError> {
    let length = tournament
        .timer_length_secs()
        .ok_or(TournamentError::InvalidState)?;
    let game = tournament
        .find_match_mut(match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    match action {
        TimerAction::Start => game.timer.start(now),
        TimerAction::Pause => game.timer.pause(length, now),
        TimerAction::Resume => game.timer.resume(length, now),
        TimerAction::Reset => game.timer.reset(),
    }
    Ok(game.clone())
}
