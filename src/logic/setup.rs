//! Setup phase: bulk registration and starting the tournament.

use crate::logic::bracket::generate_bracket;
use crate::logic::round_robin::generate_pools;
use crate::models::{ParticipantId, Tournament, TournamentError, TournamentFormat};
use rand::Rng;
use std::io;

/// Register participants from CSV, one per row. Uses the `name` column when a header row
/// has one, otherwise the first column. All rows are validated before anything is added.
pub fn import_participants_csv<R: io::Read>(
    tournament: &mut Tournament,
    reader: R,
) -> Result<Vec<ParticipantId>, TournamentError> {
    if tournament.is_started {
        return Err(TournamentError::AlreadyStarted);
    }
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut staged = tournament.clone();
    let mut added = Vec::new();
    let mut column = 0;
    for (line, record) in csv_reader.records().enumerate() {
        let record = record?;
        if line == 0 {
            if let Some(idx) = record.iter().position(|f| f.eq_ignore_ascii_case("name")) {
                column = idx;
                continue;
            }
        }
        let name = record.get(column).unwrap_or_default();
        added.push(staged.add_participant(name)?);
    }

    tournament.participants = staged.participants;
    log::info!(
        "Imported {} participant(s) into tournament {}",
        added.len(),
        tournament.id
    );
    Ok(added)
}

/// Start the tournament: bracket format generates the bracket, round robin generates pools
/// on `courts` courts.
pub fn start_tournament<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    courts: u32,
    rng: &mut R,
) -> Result<(), TournamentError> {
    match tournament.format {
        TournamentFormat::Bracket => generate_bracket(tournament),
        TournamentFormat::RoundRobin => generate_pools(tournament, courts, rng),
    }
}
