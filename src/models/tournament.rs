//! Tournament, settings, derived state and the domain error type.

use crate::models::game::{GameMatch, MatchId};
use crate::models::participant::{Participant, ParticipantId};
use crate::models::pool::Pool;
use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    /// Too few participants for the requested format.
    #[error("Need at least {required} participants (have {actual})")]
    NotEnoughParticipants { required: usize, actual: usize },
    /// Participants and settings are frozen once a bracket or pools exist.
    #[error("Tournament has already started")]
    AlreadyStarted,
    /// Tournament is not in a state that allows this action.
    #[error("Invalid state for this action")]
    InvalidState,
    #[error("Participant name cannot be empty")]
    EmptyName,
    /// Names are unique, case-insensitive.
    #[error("A participant with this name already exists")]
    DuplicateParticipantName,
    #[error("Participant not found")]
    ParticipantNotFound(ParticipantId),
    #[error("Match not found")]
    MatchNotFound(MatchId),
    #[error("Tournament not found")]
    TournamentNotFound(Uuid),
    /// A score was submitted for a match that is still waiting on a participant.
    #[error("Both slots must be filled before the match can be scored")]
    EmptySlot(MatchId),
    #[error("Scores cannot be tied")]
    TiedScore,
    #[error("Scores cannot be negative")]
    NegativeScore,
    #[error("At least one court is required")]
    InvalidCourtCount,
    /// Every courted pool match must be complete before playoffs.
    #[error("Pool play is not complete")]
    PoolPlayIncomplete,
    /// The result would change who plays in a match that has already been decided.
    #[error("Downstream match has already been played")]
    DownstreamMatchComplete(MatchId),
    /// The advancement target has no room for the participant.
    #[error("No free slot in the downstream match")]
    SlotConflict(MatchId),
    #[error("CSV import failed: {0}")]
    Csv(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<csv::Error> for TournamentError {
    fn from(err: csv::Error) -> Self {
        TournamentError::Csv(err.to_string())
    }
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// How the tournament is played.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    /// Single elimination from the first round.
    #[default]
    Bracket,
    /// Two pools, then a seeded playoff bracket.
    RoundRobin,
}

/// Current phase of the tournament, derived from its flags.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentState {
    /// Adding participants and settings; nothing generated yet.
    #[default]
    Setup,
    /// Round robin: pools generated, no playoff bracket yet.
    PoolPlay,
    /// Bracket generated and in progress.
    BracketPlay,
    /// Champion crowned.
    Completed,
}

/// Scoring rules and timer length. Stored for the UI; the engine only needs a decisive score.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TournamentSettings {
    pub score_target: u32,
    pub win_by_two: bool,
    pub timer_minutes: Option<u32>,
}

impl Default for TournamentSettings {
    fn default() -> Self {
        Self {
            score_target: 11,
            win_by_two: true,
            timer_minutes: None,
        }
    }
}

/// Full tournament: participants, bracket, pools and completion flags.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub format: TournamentFormat,
    /// Ordered by seed.
    pub participants: Vec<Participant>,
    /// Bracket rounds (0 until a bracket exists).
    pub rounds: u32,
    pub is_started: bool,
    pub is_complete: bool,
    pub champion: Option<ParticipantId>,
    pub settings: TournamentSettings,
    /// Bracket matches, ordered by round then match number. Advancement targets refer to these ids.
    pub matches: Vec<GameMatch>,
    /// Round robin only.
    pub pools: Vec<Pool>,
    pub court_count: u32,
    /// Bumped by the store on every write.
    pub version: u64,
}

impl Tournament {
    /// Create a new tournament in Setup with no participants.
    pub fn new(name: impl Into<String>, format: TournamentFormat) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            format,
            participants: Vec::new(),
            rounds: 0,
            is_started: false,
            is_complete: false,
            champion: None,
            settings: TournamentSettings::default(),
            matches: Vec::new(),
            pools: Vec::new(),
            court_count: 0,
            version: 0,
        }
    }

    /// Create a tournament with participants registered in the given order.
    pub fn with_participants<I, S>(name: impl Into<String>, format: TournamentFormat, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let participants = names
            .into_iter()
            .zip(1..)
            .map(|(n, seed)| Participant::new(n, seed))
            .collect();
        Self {
            participants,
            ..Self::new(name, format)
        }
    }

    pub fn state(&self) -> TournamentState {
        if self.is_complete {
            TournamentState::Completed
        } else if !self.is_started {
            TournamentState::Setup
        } else if self.format == TournamentFormat::RoundRobin && self.matches.is_empty() {
            TournamentState::PoolPlay
        } else {
            TournamentState::BracketPlay
        }
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Participant ids ordered by seed ascending.
    pub fn seeded_ids(&self) -> Vec<ParticipantId> {
        let mut seeded: Vec<_> = self.participants.iter().collect();
        seeded.sort_by_key(|p| p.seed);
        seeded.into_iter().map(|p| p.id).collect()
    }

    /// Add a participant (Setup only). Names must be unique (case-insensitive).
    pub fn add_participant(&mut self, name: impl Into<String>) -> Result<ParticipantId, TournamentError> {
        if self.is_started {
            return Err(TournamentError::AlreadyStarted);
        }
        let name = name.into();
        let name_trimmed = name.trim();
        if name_trimmed.is_empty() {
            return Err(TournamentError::EmptyName);
        }
        let is_duplicate = self
            .participants
            .iter()
            .any(|p| p.name.eq_ignore_ascii_case(name_trimmed));
        if is_duplicate {
            return Err(TournamentError::DuplicateParticipantName);
        }
        let seed = self.participants.iter().map(|p| p.seed).max().unwrap_or(0) + 1;
        let participant = Participant::new(name_trimmed, seed);
        let id = participant.id;
        self.participants.push(participant);
        Ok(id)
    }

    /// Remove a participant by id (Setup only). Remaining seeds close the gap.
    pub fn remove_participant(&mut self, participant_id: ParticipantId) -> Result<(), TournamentError> {
        if self.is_started {
            return Err(TournamentError::AlreadyStarted);
        }
        let idx = self
            .participants
            .iter()
            .position(|p| p.id == participant_id)
            .ok_or(TournamentError::ParticipantNotFound(participant_id))?;
        let removed = self.participants.remove(idx);
        for p in self.participants.iter_mut().filter(|p| p.seed > removed.seed) {
            p.seed -= 1;
        }
        Ok(())
    }

    /// Replace scoring settings (Setup only).
    pub fn set_settings(&mut self, settings: TournamentSettings) -> Result<(), TournamentError> {
        if self.is_started {
            return Err(TournamentError::AlreadyStarted);
        }
        self.settings = settings;
        Ok(())
    }

    /// Switch between bracket and round robin (Setup only).
    pub fn set_format(&mut self, format: TournamentFormat) -> Result<(), TournamentError> {
        if self.is_started {
            return Err(TournamentError::AlreadyStarted);
        }
        self.format = format;
        Ok(())
    }

    /// Look up a bracket or pool match.
    pub fn find_match(&self, id: MatchId) -> Option<&GameMatch> {
        self.matches
            .iter()
            .chain(self.pools.iter().flat_map(|p| p.matches.iter()))
            .find(|m| m.id == id)
    }

    pub fn find_match_mut(&mut self, id: MatchId) -> Option<&mut GameMatch> {
        self.matches
            .iter_mut()
            .chain(self.pools.iter_mut().flat_map(|p| p.matches.iter_mut()))
            .find(|m| m.id == id)
    }

    /// The championship match (last round, not bronze).
    pub fn final_match(&self) -> Option<&GameMatch> {
        self.matches
            .iter()
            .find(|m| m.round == self.rounds && !m.is_bronze)
    }

    /// Clock length for match timers, if the tournament uses them.
    pub fn timer_length_secs(&self) -> Option<i64> {
        self.settings.timer_minutes.map(|m| i64::from(m) * 60)
    }

    /// Full reset: back to Setup with the same participants and settings. Drops every match.
    pub fn reset(&mut self) {
        self.matches.clear();
        self.pools.clear();
        self.rounds = 0;
        self.court_count = 0;
        self.is_started = false;
        self.is_complete = false;
        self.champion = None;
    }
}
