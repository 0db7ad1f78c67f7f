//! Persistence boundary: the store trait, an in-memory store, and the service that
//! serializes every mutation of a tournament.

use crate::logic::{submit_score, ScoreOutcome};
use crate::models::{GameMatch, MatchId, Tournament, TournamentError, TournamentId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors raised by a store. Passed through to callers unchanged.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum StoreError {
    #[error("Tournament {0} is not in the store")]
    NotFound(TournamentId),
    #[error("Tournament {0} already exists")]
    AlreadyExists(TournamentId),
    /// Someone else wrote the tournament since it was read.
    #[error("Version conflict: expected {expected}, found {found}")]
    VersionConflict { expected: u64, found: u64 },
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Records the engine reads from and writes to, keyed by tournament id.
pub trait TournamentStore: Send + Sync {
    fn insert(&self, tournament: &Tournament) -> Result<(), StoreError>;

    fn get(&self, id: TournamentId) -> Result<Option<Tournament>, StoreError>;

    /// Write back a tournament read earlier. `tournament.version` must match the stored
    /// version. Returns the new version.
    fn update(&self, tournament: &Tournament) -> Result<u64, StoreError>;

    fn remove(&self, id: TournamentId) -> Result<bool, StoreError>;

    /// Current state of one match.
    fn get_match(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
    ) -> Result<Option<GameMatch>, StoreError> {
        Ok(self
            .get(tournament_id)?
            .and_then(|t| t.find_match(match_id).cloned()))
    }
}

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
struct StoreEntry {
    tournament: Tournament,
    last_activity: Instant,
}

/// In-memory store. Reads and writes refresh the entry's activity time.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<TournamentId, StoreEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove tournaments not touched for `timeout`. Returns the removed ids.
    pub fn remove_inactive(&self, timeout: Duration) -> Result<Vec<TournamentId>, StoreError> {
        let mut g = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        let stale: Vec<TournamentId> = g
            .iter()
            .filter(|(_, entry)| entry.last_activity.elapsed() >= timeout)
            .map(|(&id, _)| id)
            .collect();
        for id in &stale {
            g.remove(id);
        }
        Ok(stale)
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TournamentStore for MemoryStore {
    fn insert(&self, tournament: &Tournament) -> Result<(), StoreError> {
        let mut g = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        if g.contains_key(&tournament.id) {
            return Err(StoreError::AlreadyExists(tournament.id));
        }
        g.insert(
            tournament.id,
            StoreEntry {
                tournament: tournament.clone(),
                last_activity: Instant::now(),
            },
        );
        Ok(())
    }

    fn get(&self, id: TournamentId) -> Result<Option<Tournament>, StoreError> {
        let mut g = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        Ok(g.get_mut(&id).map(|entry| {
            entry.last_activity = Instant::now();
            entry.tournament.clone()
        }))
    }

    fn update(&self, tournament: &Tournament) -> Result<u64, StoreError> {
        let mut g = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        let entry = g
            .get_mut(&tournament.id)
            .ok_or(StoreError::NotFound(tournament.id))?;
        if entry.tournament.version != tournament.version {
            return Err(StoreError::VersionConflict {
                expected: tournament.version,
                found: entry.tournament.version,
            });
        }
        let version = tournament.version + 1;
        entry.tournament = Tournament {
            version,
            ..tournament.clone()
        };
        entry.last_activity = Instant::now();
        Ok(version)
    }

    fn remove(&self, id: TournamentId) -> Result<bool, StoreError> {
        let mut g = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        Ok(g.remove(&id).is_some())
    }
}

/// Entry point for callers sharing a store. Every mutation of a tournament runs under that
/// tournament's lock as read -> compute -> write, so concurrent score submissions cannot
/// interleave their downstream slot repairs.
pub struct TournamentService<S> {
    store: S,
    locks: Mutex<HashMap<TournamentId, Arc<Mutex<()>>>>,
}

impl<S: TournamentStore> TournamentService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn create(&self, tournament: Tournament) -> Result<Tournament, TournamentError> {
        self.store.insert(&tournament)?;
        log::info!("Created tournament {} ({})", tournament.id, tournament.name);
        Ok(tournament)
    }

    pub fn get(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        self.store
            .get(id)?
            .ok_or(TournamentError::TournamentNotFound(id))
    }

    pub fn get_match(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
    ) -> Result<GameMatch, TournamentError> {
        if self.store.get(tournament_id)?.is_none() {
            return Err(TournamentError::TournamentNotFound(tournament_id));
        }
        self.store
            .get_match(tournament_id, match_id)?
            .ok_or(TournamentError::MatchNotFound(match_id))
    }

    /// Run `f` against the current stored tournament and persist the result.
    /// Nothing is written when `f` fails.
    pub fn mutate<T, F>(&self, id: TournamentId, f: F) -> Result<(Tournament, T), TournamentError>
    where
        F: FnOnce(&mut Tournament) -> Result<T, TournamentError>,
    {
        let lock = self.lock_for(id)?;
        let _guard = lock.lock().map_err(|_| StoreError::Poisoned)?;

        let mut tournament = self.get(id)?;
        let out = f(&mut tournament)?;
        tournament.version = self.store.update(&tournament).inspect_err(|e| {
            log::warn!("Write to tournament {id} rejected: {e}");
        })?;
        Ok((tournament, out))
    }

    /// Score a match and persist every propagated change in one write.
    pub fn submit_score(
        &self,
        id: TournamentId,
        match_id: MatchId,
        score_1: u32,
        score_2: u32,
    ) -> Result<(Tournament, ScoreOutcome), TournamentError> {
        self.mutate(id, |t| submit_score(t, match_id, score_1, score_2))
    }

    pub fn remove(&self, id: TournamentId) -> Result<bool, TournamentError> {
        let removed = self.store.remove(id)?;
        self.forget_locks(&[id])?;
        Ok(removed)
    }

    fn lock_for(&self, id: TournamentId) -> Result<Arc<Mutex<()>>, StoreError> {
        let mut locks = self.locks.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(locks.entry(id).or_default().clone())
    }

    fn forget_locks(&self, ids: &[TournamentId]) -> Result<(), StoreError> {
        let mut locks = self.locks.lock().map_err(|_| StoreError::Poisoned)?;
        for id in ids {
            locks.remove(id);
        }
        Ok(())
    }
}

impl TournamentService<MemoryStore> {
    /// Drop tournaments idle for `timeout`. Returns how many were removed.
    pub fn remove_inactive(&self, timeout: Duration) -> Result<usize, TournamentError> {
        let removed = self.store.remove_inactive(timeout)?;
        self.forget_locks(&removed)?;
        Ok(removed.len())
    }
}
