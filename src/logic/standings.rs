//! Standings: wins, losses, point differential and head-to-head from completed pool matches.

use crate::models::{ParticipantId, Pool, Standing, TournamentId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;

/// Number of finishers seeded into the playoff bracket.
pub const PLAYOFF_SIZE: usize = 6;

/// Seed for the last-resort tiebreak. Same seed, same order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tiebreak(pub u64);

impl Tiebreak {
    pub fn for_tournament(id: TournamentId) -> Self {
        let bits = id.as_u128();
        Tiebreak((bits as u64) ^ ((bits >> 64) as u64))
    }

    /// One draw per participant, taken in id order so the result does not depend on input order.
    fn keys(self, standings: &[Standing]) -> HashMap<ParticipantId, u64> {
        let mut ids: Vec<ParticipantId> = standings.iter().map(|s| s.participant_id).collect();
        ids.sort();
        let mut rng = StdRng::seed_from_u64(self.0);
        ids.into_iter().map(|id| (id, rng.gen())).collect()
    }
}

/// Combined ranking across all pools.
///
/// Order: wins, then point differential, then head-to-head among the tied participants,
/// then the seeded tiebreak.
pub fn calculate_standings(pools: &[Pool], tiebreak: Tiebreak) -> Vec<Standing> {
    let mut standings: Vec<Standing> = pools
        .iter()
        .flat_map(|p| p.participant_ids.iter().map(|&id| Standing::new(id, p.id)))
        .collect();
    let index: HashMap<ParticipantId, usize> = standings
        .iter()
        .enumerate()
        .map(|(i, s)| (s.participant_id, i))
        .collect();

    for game in pools.iter().flat_map(|p| &p.matches).filter(|m| m.is_complete) {
        let (Some(a), Some(b)) = (game.slot_1, game.slot_2) else {
            continue;
        };
        let (Some(score_a), Some(score_b)) = (game.score_1, game.score_2) else {
            continue;
        };
        if let Some(&i) = index.get(&a) {
            standings[i].record(b, score_a, score_b);
        }
        if let Some(&i) = index.get(&b) {
            standings[i].record(a, score_b, score_a);
        }
    }

    rank(&mut standings, tiebreak);
    standings
}

fn rank(standings: &mut [Standing], tiebreak: Tiebreak) {
    let keys = tiebreak.keys(standings);
    standings.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then(b.point_differential.cmp(&a.point_differential))
            .then(keys[&a.participant_id].cmp(&keys[&b.participant_id]))
    });

    let mut start = 0;
    while start < standings.len() {
        let (wins, diff) = (standings[start].wins, standings[start].point_differential);
        let tied = standings[start..]
            .iter()
            .take_while(|s| s.wins == wins && s.point_differential == diff)
            .count();
        let group = &mut standings[start..start + tied];
        if tied > 1 {
            let ids: Vec<ParticipantId> = group.iter().map(|s| s.participant_id).collect();
            group.sort_by_cached_key(|s| {
                let head_to_head: i32 = ids.iter().map(|&o| i32::from(s.result_against(o))).sum();
                (Reverse(head_to_head), keys[&s.participant_id])
            });
        }
        start += tied;
    }
}

/// Participant ids to seed into the playoff bracket, best first.
pub fn playoff_seeds(standings: &[Standing]) -> Vec<ParticipantId> {
    standings
        .iter()
        .take(PLAYOFF_SIZE)
        .map(|s| s.participant_id)
        .collect()
}
