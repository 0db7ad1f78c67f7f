//! Integration tests for the store boundary and the per-tournament mutation lock.

use pickleball_tournament::{
    generate_bracket, MemoryStore, StoreError, Tournament, TournamentError, TournamentFormat,
    TournamentService, TournamentStore,
};
use std::time::Duration;
use uuid::Uuid;

fn service_with_bracket(n: usize) -> (TournamentService<MemoryStore>, Tournament) {
    let service = TournamentService::new(MemoryStore::new());
    let names: Vec<String> = (1..=n).map(|i| format!("Seed {i}")).collect();
    let mut t = Tournament::with_participants("Open", TournamentFormat::Bracket, names);
    generate_bracket(&mut t).unwrap();
    let t = service.create(t).unwrap();
    (service, t)
}

#[test]
fn create_then_get() {
    let service = TournamentService::new(MemoryStore::new());
    let t = service
        .create(Tournament::new("Club night", TournamentFormat::Bracket))
        .unwrap();
    let stored = service.get(t.id).unwrap();
    assert_eq!(stored.name, "Club night");
    assert_eq!(stored.version, 0);
    assert_eq!(service.store().len(), 1);

    assert!(matches!(
        service.create(stored),
        Err(TournamentError::Store(StoreError::AlreadyExists(_)))
    ));
}

#[test]
fn unknown_tournament_is_not_found() {
    let service = TournamentService::new(MemoryStore::new());
    let id = Uuid::new_v4();
    assert_eq!(
        service.get(id).unwrap_err(),
        TournamentError::TournamentNotFound(id)
    );
    assert!(service.mutate(id, |_| Ok(())).is_err());
    assert_eq!(
        service.get_match(id, Uuid::new_v4()).unwrap_err(),
        TournamentError::TournamentNotFound(id)
    );
}

#[test]
fn mutate_persists_and_bumps_the_version() {
    let service = TournamentService::new(MemoryStore::new());
    let t = service
        .create(Tournament::new("Open", TournamentFormat::Bracket))
        .unwrap();

    let (updated, alice) = service.mutate(t.id, |t| t.add_participant("Alice")).unwrap();
    assert_eq!(updated.version, 1);
    let stored = service.get(t.id).unwrap();
    assert_eq!(stored.version, 1);
    assert_eq!(stored.participant(alice).unwrap().name, "Alice");
}

#[test]
fn failed_mutation_writes_nothing() {
    let service = TournamentService::new(MemoryStore::new());
    let t = service
        .create(Tournament::with_participants("Open", TournamentFormat::Bracket, ["Alice"]))
        .unwrap();

    let result = service.mutate(t.id, |t| {
        t.add_participant("Bob")?;
        t.add_participant("alice")
    });
    assert_eq!(result.unwrap_err(), TournamentError::DuplicateParticipantName);
    let stored = service.get(t.id).unwrap();
    assert_eq!(stored.version, 0);
    assert_eq!(stored.participants.len(), 1);
}

#[test]
fn stale_writes_are_rejected() {
    let (service, stale) = service_with_bracket(4);
    let id = stale.matches[0].id;
    service.submit_score(stale.id, id, 11, 3).unwrap();

    assert_eq!(
        service.store().update(&stale),
        Err(StoreError::VersionConflict { expected: 0, found: 1 })
    );
    let stored = service.get(stale.id).unwrap();
    assert!(stored.matches[0].is_complete);
}

#[test]
fn submit_score_persists_propagation() {
    let (service, t) = service_with_bracket(4);
    let semi = t.matches[0].id;
    let (after, outcome) = service.submit_score(t.id, semi, 11, 6).unwrap();
    assert_eq!(outcome.updated.len(), 2);
    assert!(!outcome.champion_crowned);

    let final_id = after.final_match().unwrap().id;
    let stored_final = service.get_match(t.id, final_id).unwrap();
    assert_eq!(stored_final.slot_1, Some(after.seeded_ids()[0]));

    assert_eq!(
        service.submit_score(t.id, semi, 4, 4).unwrap_err(),
        TournamentError::TiedScore
    );
    assert_eq!(service.get(t.id).unwrap().version, 1);
}

#[test]
fn get_match_reports_missing_matches() {
    let (service, t) = service_with_bracket(4);
    let missing = Uuid::new_v4();
    assert_eq!(
        service.get_match(t.id, missing).unwrap_err(),
        TournamentError::MatchNotFound(missing)
    );
}

#[test]
fn concurrent_submissions_into_the_same_match_both_land() {
    for _ in 0..20 {
        let (service, t) = service_with_bracket(4);
        let (left, right) = (t.matches[0].id, t.matches[1].id);

        std::thread::scope(|s| {
            s.spawn(|| service.submit_score(t.id, left, 11, 2).unwrap());
            s.spawn(|| service.submit_score(t.id, right, 11, 2).unwrap());
        });

        let stored = service.get(t.id).unwrap();
        let final_match = stored.final_match().unwrap();
        let seeds = stored.seeded_ids();
        assert_eq!(final_match.slot_1, Some(seeds[0]));
        assert_eq!(final_match.slot_2, Some(seeds[1]));
        assert_eq!(stored.version, 2);
    }
}

#[test]
fn remove_and_inactivity_cleanup() {
    let (service, t) = service_with_bracket(2);
    assert!(service.remove(t.id).unwrap());
    assert!(!service.remove(t.id).unwrap());

    let (service, _) = service_with_bracket(2);
    service
        .create(Tournament::new("Second", TournamentFormat::RoundRobin))
        .unwrap();
    assert_eq!(service.remove_inactive(Duration::from_secs(3600)).unwrap(), 0);
    assert_eq!(service.remove_inactive(Duration::ZERO).unwrap(), 2);
    assert!(service.store().is_empty());
}
