//! Integration tests for bracket generation: general layouts, byes and the six-entrant layout.

use pickleball_tournament::logic::round_count;
use pickleball_tournament::{
    build_bracket, generate_bracket, GameMatch, MatchId, ParticipantId, Slot, Tournament,
    TournamentError, TournamentFormat,
};
use proptest::prelude::*;
use std::collections::HashMap;
use uuid::Uuid;

fn entrants(n: usize) -> Vec<ParticipantId> {
    (0..n).map(|_| Uuid::new_v4()).collect()
}

fn round(matches: &[GameMatch], round: u32) -> Vec<&GameMatch> {
    matches.iter().filter(|m| m.round == round).collect()
}

/// Every match must be fed by exactly two sources: seeded slots plus incoming winner links,
/// each landing in a distinct slot.
fn assert_fully_wired(matches: &[GameMatch]) {
    let mut incoming: HashMap<MatchId, Vec<Slot>> = HashMap::new();
    for m in matches {
        if let Some(target) = m.winner_to {
            incoming.entry(target.match_id).or_default().push(target.slot);
        }
        if let Some(bronze) = m.loser_to {
            incoming.entry(bronze).or_default().push(Slot::One);
        }
    }
    for m in matches {
        let seeded = [m.slot_1, m.slot_2].iter().filter(|s| s.is_some()).count();
        let links = incoming.get(&m.id).map(Vec::len).unwrap_or(0);
        assert_eq!(seeded + links, 2, "match r{} #{}", m.round, m.match_number);
        // Bronze slots are filled first-empty, so only winner links name a slot.
        if !m.is_bronze {
            let slots = incoming.get(&m.id).cloned().unwrap_or_default();
            for slot in &slots {
                assert!(m.slot(*slot).is_none(), "link into a seeded slot");
            }
            if slots.len() == 2 {
                assert_ne!(slots[0], slots[1], "two links into the same slot");
            }
        }
    }
}

#[test]
fn fewer_than_two_entrants_is_rejected() {
    assert!(matches!(
        build_bracket(&entrants(1)),
        Err(TournamentError::NotEnoughParticipants { required: 2, actual: 1 })
    ));
    assert!(build_bracket(&[]).is_err());
}

#[test]
fn round_count_halves_rounding_up() {
    assert_eq!(round_count(2), 1);
    assert_eq!(round_count(3), 2);
    assert_eq!(round_count(5), 3);
    assert_eq!(round_count(8), 3);
    assert_eq!(round_count(9), 4);
    assert_eq!(round_count(64), 6);
}

#[test]
fn eight_seeds_pair_top_against_bottom() {
    let seeds = entrants(8);
    let layout = build_bracket(&seeds).unwrap();
    assert_eq!(layout.rounds, 3);

    let first: Vec<(ParticipantId, ParticipantId)> = layout
        .round(1)
        .map(|m| (m.slot_1.unwrap(), m.slot_2.unwrap()))
        .collect();
    // Bracket order: 1v8 and 4v5 feed one semifinal, 2v7 and 3v6 the other.
    assert_eq!(
        first,
        vec![
            (seeds[0], seeds[7]),
            (seeds[3], seeds[4]),
            (seeds[1], seeds[6]),
            (seeds[2], seeds[5]),
        ]
    );
    assert!(layout.round(2).all(|m| m.slot_1.is_none() && m.slot_2.is_none()));
    assert_fully_wired(&layout.matches);
}

#[test]
fn five_entrants_give_the_middle_seed_a_bye() {
    let seeds = entrants(5);
    let layout = build_bracket(&seeds).unwrap();
    assert_eq!(layout.rounds, 3);
    assert_eq!(layout.matches.len(), 4);

    let first = round(&layout.matches, 1);
    assert_eq!(first.len(), 2);
    assert!(first.iter().all(|m| !m.involves(seeds[2])));

    let second = round(&layout.matches, 2);
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].slot_2, Some(seeds[2]));
    assert_eq!(second[0].slot_1, None);

    // One first-round winner fills the round-2 match, the other skips to the final.
    let final_id = round(&layout.matches, 3)[0].id;
    let targets: Vec<MatchId> = first.iter().map(|m| m.winner_to.unwrap().match_id).collect();
    assert!(targets.contains(&second[0].id));
    assert!(targets.contains(&final_id));
    assert_fully_wired(&layout.matches);
}

#[test]
fn three_entrants_bye_meets_the_only_first_round_winner() {
    let seeds = entrants(3);
    let layout = build_bracket(&seeds).unwrap();
    assert_eq!(layout.rounds, 2);
    assert_eq!(layout.matches.len(), 2);
    let first = &layout.matches[0];
    let last = &layout.matches[1];
    assert_eq!((first.slot_1, first.slot_2), (Some(seeds[0]), Some(seeds[2])));
    assert_eq!(last.slot_2, Some(seeds[1]));
    assert_eq!(first.winner_to.unwrap().match_id, last.id);
    assert_eq!(first.winner_to.unwrap().slot, Slot::One);
}

#[test]
fn six_entrants_use_the_seeded_layout() {
    let seeds = entrants(6);
    let layout = build_bracket(&seeds).unwrap();
    assert_eq!(layout.rounds, 3);
    assert_eq!(layout.matches.len(), 6);
    assert_eq!(layout.matches.iter().filter(|m| m.is_bronze).count(), 1);

    let quarters = round(&layout.matches, 1);
    let semis = round(&layout.matches, 2);
    let finals = round(&layout.matches, 3);
    assert_eq!((quarters.len(), semis.len(), finals.len()), (2, 2, 2));

    assert_eq!((quarters[0].slot_1, quarters[0].slot_2), (Some(seeds[2]), Some(seeds[5])));
    assert_eq!((quarters[1].slot_1, quarters[1].slot_2), (Some(seeds[3]), Some(seeds[4])));
    assert_eq!((semis[0].slot_1, semis[0].slot_2), (Some(seeds[0]), None));
    assert_eq!((semis[1].slot_1, semis[1].slot_2), (Some(seeds[1]), None));

    // Cross-mapped: QF1 feeds SF2, QF2 feeds SF1.
    assert_eq!(quarters[0].winner_to.unwrap().match_id, semis[1].id);
    assert_eq!(quarters[1].winner_to.unwrap().match_id, semis[0].id);

    let bronze = finals.iter().find(|m| m.is_bronze).unwrap();
    let championship = finals.iter().find(|m| !m.is_bronze).unwrap();
    for semi in &semis {
        assert_eq!(semi.loser_to, Some(bronze.id));
        assert_eq!(semi.winner_to.unwrap().match_id, championship.id);
    }
    assert!(bronze.slot_1.is_none() && bronze.slot_2.is_none());
    assert!(championship.slot_1.is_none() && championship.slot_2.is_none());
}

#[test]
fn generate_bracket_starts_a_bracket_tournament_once() {
    let mut t = Tournament::with_participants("Open", TournamentFormat::Bracket, ["A", "B", "C", "D"]);
    generate_bracket(&mut t).unwrap();
    assert!(t.is_started);
    assert_eq!(t.rounds, 2);
    assert_eq!(t.matches.len(), 3);
    assert_eq!(generate_bracket(&mut t), Err(TournamentError::AlreadyStarted));
}

#[test]
fn generate_bracket_follows_registration_seeds() {
    let mut t = Tournament::with_participants("Open", TournamentFormat::Bracket, ["A", "B", "C", "D"]);
    // Registration order, not vector order, decides seeding.
    t.participants.reverse();
    generate_bracket(&mut t).unwrap();
    let a = t.participants.iter().find(|p| p.name == "A").unwrap().id;
    let d = t.participants.iter().find(|p| p.name == "D").unwrap().id;
    assert_eq!((t.matches[0].slot_1, t.matches[0].slot_2), (Some(a), Some(d)));
}

#[test]
fn generate_bracket_rejects_round_robin_format() {
    let mut t = Tournament::with_participants("Pools", TournamentFormat::RoundRobin, ["A", "B"]);
    assert_eq!(generate_bracket(&mut t), Err(TournamentError::InvalidState));
    assert!(!t.is_started);
}

proptest! {
    #[test]
    fn general_bracket_shape(n in 2usize..=64) {
        prop_assume!(n != 6);
        let layout = build_bracket(&entrants(n)).unwrap();
        prop_assert_eq!(layout.matches.len(), n - 1);
        prop_assert_eq!(layout.rounds, n.next_power_of_two().trailing_zeros());
        prop_assert_eq!(layout.round(1).count(), n / 2);
        prop_assert!(layout.matches.iter().all(|m| !m.is_bronze));
        let finals: Vec<_> = layout.matches.iter().filter(|m| m.winner_to.is_none()).collect();
        prop_assert_eq!(finals.len(), 1);
        prop_assert_eq!(finals[0].round, layout.rounds);
        assert_fully_wired(&layout.matches);
    }

    #[test]
    fn every_entrant_is_placed_exactly_once(n in 2usize..=64) {
        let seeds = entrants(n);
        let layout = build_bracket(&seeds).unwrap();
        let placed: Vec<ParticipantId> = layout
            .matches
            .iter()
            .flat_map(|m| [m.slot_1, m.slot_2])
            .flatten()
            .collect();
        prop_assert_eq!(placed.len(), n);
        for id in &seeds {
            prop_assert!(placed.contains(id));
        }
    }
}
