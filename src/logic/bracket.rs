//! Bracket generation: single elimination for any entrant count, plus fixed seeded layouts.
//!
//! Every generated match carries its own advancement target (`winner_to`, and `loser_to`
//! for semifinals feeding a bronze match), so the advancement engine never has to infer
//! byes or skip-ahead routing from round sizes.

use crate::models::{
    GameMatch, MatchId, ParticipantId, Slot, SlotRef, Tournament, TournamentError,
    TournamentFormat,
};

/// A complete set of matches for one bracket, ready to be stored.
#[derive(Clone, Debug)]
pub struct BracketLayout {
    pub rounds: u32,
    /// Ordered by round, then match number.
    pub matches: Vec<GameMatch>,
}

impl BracketLayout {
    pub fn round(&self, round: u32) -> impl Iterator<Item = &GameMatch> {
        self.matches.iter().filter(move |m| m.round == round)
    }
}

#[derive(Clone, Copy)]
enum Entry {
    /// Index into the seeded entrant list.
    Seed(usize),
    /// Filled by advancement.
    Open,
}

struct FixedMatch {
    round: u32,
    slots: [Entry; 2],
    /// Index of the target match in the layout, and the slot.
    winner_to: Option<(usize, Slot)>,
    loser_to: Option<usize>,
    bronze: bool,
}

struct FixedLayout {
    entrants: usize,
    rounds: u32,
    matches: &'static [FixedMatch],
}

/// Seeds 1 and 2 get a bye into the semifinals and meet the quarterfinal winners cross-wise.
/// Both semifinal losers play for third.
const SIX_ENTRANTS: FixedLayout = FixedLayout {
    entrants: 6,
    rounds: 3,
    matches: &[
        // QF1: 3 v 6, winner to SF2
        FixedMatch {
            round: 1,
            slots: [Entry::Seed(2), Entry::Seed(5)],
            winner_to: Some((3, Slot::Two)),
            loser_to: None,
            bronze: false,
        },
        // QF2: 4 v 5, winner to SF1
        FixedMatch {
            round: 1,
            slots: [Entry::Seed(3), Entry::Seed(4)],
            winner_to: Some((2, Slot::Two)),
            loser_to: None,
            bronze: false,
        },
        // SF1: seed 1 v QF2 winner
        FixedMatch {
            round: 2,
            slots: [Entry::Seed(0), Entry::Open],
            winner_to: Some((4, Slot::One)),
            loser_to: Some(5),
            bronze: false,
        },
        // SF2: seed 2 v QF1 winner
        FixedMatch {
            round: 2,
            slots: [Entry::Seed(1), Entry::Open],
            winner_to: Some((4, Slot::Two)),
            loser_to: Some(5),
            bronze: false,
        },
        // Final
        FixedMatch {
            round: 3,
            slots: [Entry::Open, Entry::Open],
            winner_to: None,
            loser_to: None,
            bronze: false,
        },
        // Bronze
        FixedMatch {
            round: 3,
            slots: [Entry::Open, Entry::Open],
            winner_to: None,
            loser_to: None,
            bronze: true,
        },
    ],
};

/// Entrant counts with a hand-made layout. Everything else uses the general scheme.
const FIXED_LAYOUTS: &[FixedLayout] = &[SIX_ENTRANTS];

fn fixed_layout(entrants: usize) -> Option<&'static FixedLayout> {
    FIXED_LAYOUTS.iter().find(|l| l.entrants == entrants)
}

/// Rounds needed to halve `entrants` down to one, rounding up each step.
pub fn round_count(entrants: usize) -> u32 {
    let mut remaining = entrants;
    let mut rounds = 0;
    while remaining > 1 {
        remaining = remaining.div_ceil(2);
        rounds += 1;
    }
    rounds
}

/// Build a bracket for entrants ordered by seed (strongest first).
pub fn build_bracket(seeded: &[ParticipantId]) -> Result<BracketLayout, TournamentError> {
    if seeded.len() < 2 {
        return Err(TournamentError::NotEnoughParticipants {
            required: 2,
            actual: seeded.len(),
        });
    }
    let layout = match fixed_layout(seeded.len()) {
        Some(fixed) => build_fixed(fixed, seeded),
        None => build_general(seeded),
    };
    log::debug!(
        "Built bracket for {} entrants: {} rounds, {} matches",
        seeded.len(),
        layout.rounds,
        layout.matches.len()
    );
    Ok(layout)
}

/// Generate the bracket for a bracket-format tournament from its registered seeds.
pub fn generate_bracket(tournament: &mut Tournament) -> Result<(), TournamentError> {
    if tournament.format != TournamentFormat::Bracket {
        return Err(TournamentError::InvalidState);
    }
    if tournament.is_started {
        return Err(TournamentError::AlreadyStarted);
    }
    let layout = build_bracket(&tournament.seeded_ids())?;
    tournament.rounds = layout.rounds;
    tournament.matches = layout.matches;
    tournament.is_started = true;
    log::info!(
        "Generated bracket for tournament {} ({} rounds)",
        tournament.id,
        tournament.rounds
    );
    Ok(())
}

fn build_fixed(layout: &FixedLayout, seeded: &[ParticipantId]) -> BracketLayout {
    let mut matches: Vec<GameMatch> = Vec::with_capacity(layout.matches.len());
    for (i, fixed) in layout.matches.iter().enumerate() {
        let earlier_in_round = layout.matches[..i]
            .iter()
            .filter(|m| m.round == fixed.round)
            .count();
        let mut m = GameMatch::new(fixed.round, earlier_in_round as u32 + 1);
        for (slot, entry) in [Slot::One, Slot::Two].into_iter().zip(fixed.slots) {
            if let Entry::Seed(seed) = entry {
                m.set_slot(slot, Some(seeded[seed]));
            }
        }
        m.is_bronze = fixed.bronze;
        matches.push(m);
    }

    let ids: Vec<MatchId> = matches.iter().map(|m| m.id).collect();
    for (m, fixed) in matches.iter_mut().zip(layout.matches) {
        m.winner_to = fixed
            .winner_to
            .map(|(target, slot)| SlotRef { match_id: ids[target], slot });
        m.loser_to = fixed.loser_to.map(|target| ids[target]);
    }

    BracketLayout {
        rounds: layout.rounds,
        matches,
    }
}

/// Who is owed a place in the last match of the next round.
enum Carry {
    Seed(ParticipantId),
    /// Arena index of the match whose winner skips a round.
    Winner(usize),
}

/// General scheme: seed i meets seed n-1-i in round 1; an odd entrant out goes straight
/// into the last match of round 2. Later rounds halve, and whenever a round has an odd
/// number of entrants the overflow winner skips into the last match of the round after.
fn build_general(seeded: &[ParticipantId]) -> BracketLayout {
    let n = seeded.len();
    let rounds = round_count(n);
    let pairs = n / 2;
    let mut matches: Vec<GameMatch> = Vec::with_capacity(n - 1);

    for (number, pair) in bracket_order(pairs).into_iter().enumerate() {
        matches.push(GameMatch::between(
            1,
            number as u32 + 1,
            seeded[pair],
            seeded[n - 1 - pair],
        ));
    }

    let mut carry = (n % 2 == 1).then(|| Carry::Seed(seeded[n / 2]));
    let mut previous: Vec<usize> = (0..pairs).collect();
    let mut entrants = pairs + n % 2;

    for round in 2..=rounds {
        let count = entrants / 2;
        let start = matches.len();
        for number in 0..count {
            matches.push(GameMatch::new(round, number as u32 + 1));
        }
        let current: Vec<usize> = (start..start + count).collect();
        let mut taken = vec![[false; 2]; count];

        if let Some(carried) = carry.take() {
            let last = current[count - 1];
            match carried {
                Carry::Seed(participant) => matches[last].set_slot(Slot::Two, Some(participant)),
                Carry::Winner(source) => {
                    matches[source].winner_to = Some(SlotRef {
                        match_id: matches[last].id,
                        slot: Slot::Two,
                    });
                }
            }
            taken[count - 1][1] = true;
        }

        for (i, &source) in previous.iter().enumerate() {
            let target = i / 2;
            let preferred = if i % 2 == 0 { Slot::One } else { Slot::Two };
            let free = (target < count)
                .then(|| {
                    [preferred, preferred.other()]
                        .into_iter()
                        .find(|&s| !taken[target][slot_index(s)])
                })
                .flatten();
            match free {
                Some(slot) => {
                    taken[target][slot_index(slot)] = true;
                    matches[source].winner_to = Some(SlotRef {
                        match_id: matches[current[target]].id,
                        slot,
                    });
                }
                None => carry = Some(Carry::Winner(source)),
            }
        }

        entrants = count + entrants % 2;
        previous = current;
    }

    BracketLayout { rounds, matches }
}

fn slot_index(slot: Slot) -> usize {
    match slot {
        Slot::One => 0,
        Slot::Two => 1,
    }
}

/// Standard bracket positions for `pairs` first-round pairs (pair k holds seed k),
/// so that the top two seeds can only meet in the final.
fn bracket_order(pairs: usize) -> Vec<usize> {
    let size = pairs.next_power_of_two();
    let mut order = vec![0];
    while order.len() < size {
        let len = order.len() * 2;
        order = order.iter().flat_map(|&x| [x, len - 1 - x]).collect();
    }
    order.retain(|&pair| pair < pairs);
    order
}
