//! Round robin: two pools, circle-method schedule, court assignment, playoff hand-off.

use crate::logic::bracket::build_bracket;
use crate::logic::standings::{calculate_standings, playoff_seeds, Tiebreak};
use crate::models::{
    GameMatch, ParticipantId, Pool, Standing, Tournament, TournamentError, TournamentFormat,
};
use rand::seq::SliceRandom;
use rand::Rng;

/// Minimum participants for pool play (two pools of two).
pub const MIN_ROUND_ROBIN_PARTICIPANTS: usize = 4;

/// Pool sizes that keep byes to a minimum: both even when possible, otherwise the
/// first pool takes the extra participant.
pub fn pool_sizes(total: usize) -> (usize, usize) {
    let half = total / 2;
    if total % 2 == 1 {
        (half + 1, half)
    } else if half % 2 == 1 {
        (half + 1, half - 1)
    } else {
        (half, half)
    }
}

/// Circle method. Returns, per round, the pairs of entrant indices that play.
///
/// Entrant 0 stays fixed and the rest rotate. An odd pool gets a virtual bye entrant;
/// pairs involving it are dropped, so exactly one real entrant sits out each round.
pub fn circle_schedule(size: usize) -> Vec<Vec<(usize, usize)>> {
    if size < 2 {
        return Vec::new();
    }
    let working = size + size % 2;
    let bye = (size % 2 == 1).then_some(size);
    let spin = working - 1;
    (0..spin)
        .map(|round| {
            let mut pairs = vec![(0, round % spin + 1)];
            for i in 1..working / 2 {
                pairs.push(((round + i) % spin + 1, (round + spin - i) % spin + 1));
            }
            pairs.retain(|&(a, b)| Some(a) != bye && Some(b) != bye);
            pairs
        })
        .collect()
}

fn schedule_pool(pool: &mut Pool) {
    let ids = &pool.participant_ids;
    pool.matches = circle_schedule(ids.len())
        .into_iter()
        .enumerate()
        .flat_map(|(round, pairs)| {
            pairs.into_iter().enumerate().map(move |(number, (a, b))| {
                GameMatch::between(round as u32 + 1, number as u32 + 1, ids[a], ids[b])
            })
        })
        .collect();
}

/// Give each round's matches a court, interleaving pools. Round 1 starts with the first
/// pool, round 2 with the second, and so on, so the waiting matches rotate between pools.
/// Matches past the court count stay waiting (`court == None`).
pub fn assign_courts(pools: &mut [Pool], courts: u32) {
    let rounds = pools.iter().map(Pool::round_count).max().unwrap_or(0);
    for round in 1..=rounds {
        let mut queues: Vec<Vec<&mut GameMatch>> = pools
            .iter_mut()
            .map(|p| p.matches.iter_mut().filter(|m| m.round == round).collect())
            .collect();
        let pool_count = queues.len();
        queues.rotate_left((round as usize - 1) % pool_count);

        let longest = queues.iter().map(Vec::len).max().unwrap_or(0);
        let mut next_court = 1;
        for i in 0..longest {
            for queue in queues.iter_mut() {
                if let Some(game) = queue.get_mut(i) {
                    game.court = (next_court <= courts).then_some(next_court);
                    next_court += 1;
                }
            }
        }
        if next_court > courts + 1 {
            log::debug!(
                "Round {round}: {} match(es) waiting for a court",
                next_court - courts - 1
            );
        }
    }
}

/// Shuffle participants into two pools, schedule both and assign courts.
pub fn build_pools<R: Rng + ?Sized>(
    participants: &[ParticipantId],
    courts: u32,
    rng: &mut R,
) -> Result<Vec<Pool>, TournamentError> {
    if participants.len() < MIN_ROUND_ROBIN_PARTICIPANTS {
        return Err(TournamentError::NotEnoughParticipants {
            required: MIN_ROUND_ROBIN_PARTICIPANTS,
            actual: participants.len(),
        });
    }
    if courts == 0 {
        return Err(TournamentError::InvalidCourtCount);
    }

    let mut shuffled = participants.to_vec();
    shuffled.shuffle(rng);
    let (first, _) = pool_sizes(shuffled.len());
    let second = shuffled.split_off(first);

    let mut pools = vec![Pool::new("Pool A", shuffled), Pool::new("Pool B", second)];
    for pool in &mut pools {
        schedule_pool(pool);
    }
    assign_courts(&mut pools, courts);
    Ok(pools)
}

/// Generate pools for a round-robin tournament (Setup only).
pub fn generate_pools<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    courts: u32,
    rng: &mut R,
) -> Result<(), TournamentError> {
    if tournament.format != TournamentFormat::RoundRobin {
        return Err(TournamentError::InvalidState);
    }
    if tournament.is_started {
        return Err(TournamentError::AlreadyStarted);
    }
    let ids: Vec<ParticipantId> = tournament.participants.iter().map(|p| p.id).collect();
    tournament.pools = build_pools(&ids, courts, rng)?;
    tournament.court_count = courts;
    tournament.is_started = true;
    log::info!(
        "Generated pools for tournament {} ({} + {} participants, {} courts)",
        tournament.id,
        tournament.pools[0].participant_ids.len(),
        tournament.pools[1].participant_ids.len(),
        courts
    );
    Ok(())
}

/// True once every courted match in every pool is complete.
pub fn pool_play_complete(pools: &[Pool]) -> bool {
    !pools.is_empty() && pools.iter().all(Pool::is_complete)
}

/// Rank pool play and seed the top finishers into the playoff bracket.
/// Returns the standings the seeds were taken from.
pub fn start_playoffs(
    tournament: &mut Tournament,
    tiebreak: Tiebreak,
) -> Result<Vec<Standing>, TournamentError> {
    if tournament.format != TournamentFormat::RoundRobin
        || !tournament.is_started
        || !tournament.matches.is_empty()
    {
        return Err(TournamentError::InvalidState);
    }
    if !pool_play_complete(&tournament.pools) {
        return Err(TournamentError::PoolPlayIncomplete);
    }
    let standings = calculate_standings(&tournament.pools, tiebreak);
    let layout = build_bracket(&playoff_seeds(&standings))?;
    tournament.rounds = layout.rounds;
    tournament.matches = layout.matches;
    log::info!(
        "Playoffs started for tournament {} ({} rounds)",
        tournament.id,
        tournament.rounds
    );
    Ok(standings)
}
