//! Advancement: score a match and propagate winner (and bronze-bound loser) downstream.
//!
//! A scored match moves Empty -> Ready -> Complete; re-scoring a complete match is an edit.
//! Edits clear the previous winner/loser from the downstream slot before writing the new one.
//! All writes go to a staged copy of the bracket that is committed only when every step succeeds.

use crate::models::{
    GameMatch, MatchId, ParticipantId, Slot, Tournament, TournamentError,
};
use serde::Serialize;

/// What a score submission changed.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ScoreOutcome {
    /// Every match whose stored state changed, in bracket order.
    pub updated: Vec<GameMatch>,
    /// Raised once, when the final is completed for the first time.
    pub champion_crowned: bool,
}

/// Validate a raw score coming from a client.
pub fn score_from_input(raw: i64) -> Result<u32, TournamentError> {
    u32::try_from(raw).map_err(|_| TournamentError::NegativeScore)
}

/// Score a bracket or pool match. Edits of complete matches repair downstream slots.
pub fn submit_score(
    tournament: &mut Tournament,
    match_id: MatchId,
    score_1: u32,
    score_2: u32,
) -> Result<ScoreOutcome, TournamentError> {
    if tournament.matches.iter().any(|m| m.id == match_id) {
        advance_bracket(tournament, match_id, score_1, score_2)
    } else {
        score_pool_match(tournament, match_id, score_1, score_2)
    }
}

fn score_pool_match(
    tournament: &mut Tournament,
    match_id: MatchId,
    score_1: u32,
    score_2: u32,
) -> Result<ScoreOutcome, TournamentError> {
    // Playoff seeds are frozen once the bracket exists.
    let playoffs_started = !tournament.matches.is_empty();
    let game = tournament
        .pools
        .iter_mut()
        .flat_map(|p| p.matches.iter_mut())
        .find(|m| m.id == match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    if playoffs_started {
        return Err(TournamentError::InvalidState);
    }
    game.record_score(score_1, score_2)?;
    Ok(ScoreOutcome {
        updated: vec![game.clone()],
        champion_crowned: false,
    })
}

fn advance_bracket(
    tournament: &mut Tournament,
    match_id: MatchId,
    score_1: u32,
    score_2: u32,
) -> Result<ScoreOutcome, TournamentError> {
    let mut staged = tournament.matches.clone();
    let game = staged
        .iter_mut()
        .find(|m| m.id == match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    let change = game.record_score(score_1, score_2)?;
    let (winner_to, loser_to, round, is_bronze) =
        (game.winner_to, game.loser_to, game.round, game.is_bronze);

    if change.winner_changed() {
        log::debug!("Match {match_id} edited: winner changed, repairing downstream");
    }
    if let Some(target) = winner_to {
        place(
            &mut staged,
            target.match_id,
            Some(target.slot),
            change.winner,
            change.previous_winner,
        )?;
    }
    if let Some(bronze) = loser_to {
        place(&mut staged, bronze, None, change.loser, change.previous_loser)?;
    }

    let updated: Vec<GameMatch> = staged
        .iter()
        .zip(&tournament.matches)
        .filter(|(new, old)| new != old)
        .map(|(new, _)| new.clone())
        .collect();
    tournament.matches = staged;

    let mut champion_crowned = false;
    if round == tournament.rounds && !is_bronze {
        champion_crowned = !tournament.is_complete;
        tournament.is_complete = true;
        tournament.champion = Some(change.winner);
        if champion_crowned {
            log::info!(
                "Tournament {} complete, champion {}",
                tournament.id,
                change.winner
            );
        }
    }

    Ok(ScoreOutcome {
        updated,
        champion_crowned,
    })
}

/// Write `entrant` into the target match, first clearing `previous` if it is there.
///
/// `preferred` falls back to the other slot when taken; `None` means first empty slot.
/// Re-placing a participant that is already in the target is a no-op.
fn place(
    staged: &mut [GameMatch],
    target: MatchId,
    preferred: Option<Slot>,
    entrant: ParticipantId,
    previous: Option<ParticipantId>,
) -> Result<(), TournamentError> {
    let game = staged
        .iter_mut()
        .find(|m| m.id == target)
        .ok_or(TournamentError::MatchNotFound(target))?;
    if game.involves(entrant) {
        return Ok(());
    }
    if game.is_complete {
        log::warn!("Rejected edit: downstream match {target} already played");
        return Err(TournamentError::DownstreamMatchComplete(target));
    }
    if let Some(previous) = previous {
        game.clear_participant(previous);
    }
    let slot = match preferred {
        Some(slot) => [slot, slot.other()]
            .into_iter()
            .find(|&s| game.slot(s).is_none()),
        None => game.first_empty_slot(),
    }
    .ok_or(TournamentError::SlotConflict(target))?;
    game.set_slot(slot, Some(entrant));
    log::debug!("Placed {entrant} into match {target} ({slot:?})");
    Ok(())
}
