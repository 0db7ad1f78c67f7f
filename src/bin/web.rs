//! Single binary web server: JSON API over the scheduling and advancement engine.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, INACTIVITY_TIMEOUT_HOURS.

use actix_web::{
    delete, get, post, put,
    web::{self, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use pickleball_tournament::logic::{score_from_input, update_match_timer};
use pickleball_tournament::{
    calculate_standings, import_participants_csv, start_playoffs, start_tournament, GameMatch,
    MatchId, MemoryStore, ParticipantId, ScoreOutcome, StoreError, Tiebreak, TimerAction,
    Tournament, TournamentError, TournamentFormat, TournamentId, TournamentService,
    TournamentSettings,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

type AppState = Data<TournamentService<MemoryStore>>;

/// Server settings read from the environment.
struct ServerConfig {
    host: String,
    port: u16,
    inactivity_timeout: Duration,
}

impl ServerConfig {
    fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let hours: u64 = std::env::var("INACTIVITY_TIMEOUT_HOURS")
            .ok()
            .and_then(|h| h.parse().ok())
            .unwrap_or(12);
        Self {
            host,
            port,
            inactivity_timeout: Duration::from_secs(hours * 3600),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    #[serde(default = "default_name")]
    name: String,
    #[serde(default)]
    format: TournamentFormat,
    #[serde(default)]
    settings: Option<TournamentSettings>,
}

fn default_name() -> String {
    "Pickleball Tournament".to_string()
}

#[derive(Deserialize)]
struct AddParticipantBody {
    name: String,
}

#[derive(Deserialize)]
struct SetFormatBody {
    format: TournamentFormat,
}

#[derive(Deserialize)]
struct StartBody {
    #[serde(default = "default_courts")]
    court_count: u32,
}

fn default_courts() -> u32 {
    2
}

#[derive(Deserialize)]
struct ScoreBody {
    score_1: i64,
    score_2: i64,
}

#[derive(Serialize)]
struct ScoreResponse {
    tournament: Tournament,
    #[serde(flatten)]
    outcome: ScoreOutcome,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and participant id
#[derive(Deserialize)]
struct TournamentParticipantPath {
    id: TournamentId,
    participant_id: ParticipantId,
}

/// Path segments: tournament id and match id
#[derive(Deserialize)]
struct TournamentMatchPath {
    id: TournamentId,
    match_id: MatchId,
}

#[derive(Deserialize)]
struct TimerPath {
    id: TournamentId,
    match_id: MatchId,
    action: TimerAction,
}

fn error_response(err: TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": err.to_string() });
    match err {
        TournamentError::TournamentNotFound(_)
        | TournamentError::MatchNotFound(_)
        | TournamentError::ParticipantNotFound(_)
        | TournamentError::Store(StoreError::NotFound(_)) => HttpResponse::NotFound().json(body),
        TournamentError::Store(StoreError::VersionConflict { .. }) => {
            HttpResponse::Conflict().json(body)
        }
        TournamentError::Store(_) => HttpResponse::InternalServerError().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

fn respond<T: Serialize>(result: Result<T, TournamentError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(e),
    }
}

/// Respond with the tournament after a mutation.
fn respond_tournament<T>(result: Result<(Tournament, T), TournamentError>) -> HttpResponse {
    respond(result.map(|(t, _)| t))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "pickleball-tournament",
    })
}

/// Create a new tournament (returns it with id; client stores id for subsequent requests).
#[post("/api/tournaments")]
async fn api_create_tournament(
    state: AppState,
    body: Option<Json<CreateTournamentBody>>,
) -> HttpResponse {
    let tournament = match body {
        Some(body) => {
            let body = body.into_inner();
            let mut t = Tournament::new(body.name, body.format);
            if let Some(settings) = body.settings {
                t.settings = settings;
            }
            t
        }
        None => Tournament::new(default_name(), TournamentFormat::default()),
    };
    respond(state.create(tournament))
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.get(path.id))
}

/// Add a participant (Setup only).
#[post("/api/tournaments/{id}/participants")]
async fn api_add_participant(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<AddParticipantBody>,
) -> HttpResponse {
    respond_tournament(state.mutate(path.id, |t| t.add_participant(body.name.trim())))
}

/// Import participants from a CSV body (one name per row, optional `name` header).
#[post("/api/tournaments/{id}/participants/import")]
async fn api_import_participants(
    state: AppState,
    path: Path<TournamentPath>,
    body: String,
) -> HttpResponse {
    respond_tournament(state.mutate(path.id, |t| import_participants_csv(t, body.as_bytes())))
}

/// Remove a participant (Setup only).
#[delete("/api/tournaments/{id}/participants/{participant_id}")]
async fn api_remove_participant(
    state: AppState,
    path: Path<TournamentParticipantPath>,
) -> HttpResponse {
    respond_tournament(state.mutate(path.id, |t| t.remove_participant(path.participant_id)))
}

/// Replace score target / win-by-two / timer length (Setup only).
#[put("/api/tournaments/{id}/settings")]
async fn api_set_settings(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<TournamentSettings>,
) -> HttpResponse {
    let settings = body.into_inner();
    respond_tournament(state.mutate(path.id, |t| t.set_settings(settings)))
}

#[put("/api/tournaments/{id}/format")]
async fn api_set_format(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<SetFormatBody>,
) -> HttpResponse {
    respond_tournament(state.mutate(path.id, |t| t.set_format(body.format)))
}

/// Generate the bracket (bracket format) or the pools (round robin).
#[post("/api/tournaments/{id}/start")]
async fn api_start_tournament(
    state: AppState,
    path: Path<TournamentPath>,
    body: Option<Json<StartBody>>,
) -> HttpResponse {
    let courts = body.map(|b| b.court_count).unwrap_or_else(default_courts);
    respond_tournament(state.mutate(path.id, |t| {
        start_tournament(t, courts, &mut rand::thread_rng())
    }))
}

/// Submit or edit a match score. Returns every match changed by propagation.
#[put("/api/tournaments/{id}/matches/{match_id}/score")]
async fn api_submit_score(
    state: AppState,
    path: Path<TournamentMatchPath>,
    body: Json<ScoreBody>,
) -> HttpResponse {
    let (score_1, score_2) = match (score_from_input(body.score_1), score_from_input(body.score_2)) {
        (Ok(score_1), Ok(score_2)) => (score_1, score_2),
        (Err(e), _) | (_, Err(e)) => return error_response(e),
    };
    let result = state
        .submit_score(path.id, path.match_id, score_1, score_2)
        .map(|(tournament, outcome)| {
            if outcome.champion_crowned {
                log::info!("Tournament {} has a champion", tournament.id);
            }
            ScoreResponse {
                tournament,
                outcome,
            }
        });
    respond(result)
}

/// Current state of a single match.
#[get("/api/tournaments/{id}/matches/{match_id}")]
async fn api_get_match(state: AppState, path: Path<TournamentMatchPath>) -> HttpResponse {
    respond::<GameMatch>(state.get_match(path.id, path.match_id))
}

#[post("/api/tournaments/{id}/matches/{match_id}/timer/{action}")]
async fn api_match_timer(state: AppState, path: Path<TimerPath>) -> HttpResponse {
    let now = chrono::Utc::now();
    respond(
        state
            .mutate(path.id, |t| update_match_timer(t, path.match_id, path.action, now))
            .map(|(_, game)| game),
    )
}

/// Combined pool standings.
#[get("/api/tournaments/{id}/standings")]
async fn api_standings(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(
        state
            .get(path.id)
            .map(|t| calculate_standings(&t.pools, Tiebreak::for_tournament(t.id))),
    )
}

/// Seed the playoff bracket from pool standings (round robin, pool play complete).
#[post("/api/tournaments/{id}/playoffs")]
async fn api_start_playoffs(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond_tournament(state.mutate(path.id, |t| {
        let tiebreak = Tiebreak::for_tournament(t.id);
        start_playoffs(t, tiebreak)
    }))
}

/// Reset: back to Setup with the same participants.
#[post("/api/tournaments/{id}/reset")]
async fn api_reset_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond_tournament(state.mutate(path.id, |t| {
        t.reset();
        Ok(())
    }))
}

#[delete("/api/tournaments/{id}")]
async fn api_delete_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.remove(path.id) {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => error_response(TournamentError::TournamentNotFound(path.id)),
        Err(e) => error_response(e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    log::info!("Starting server at http://{}:{}", config.host, config.port);

    let state = Data::new(TournamentService::new(MemoryStore::new()));

    // Background task: every 30 minutes, remove tournaments past the inactivity timeout
    let state_cleanup = state.clone();
    let timeout = config.inactivity_timeout;
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30 * 60));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match state_cleanup.remove_inactive(timeout) {
                Ok(0) => {}
                Ok(removed) => log::info!("Cleaned up {} inactive tournament(s)", removed),
                Err(e) => log::warn!("Cleanup failed: {}", e),
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(1 << 20))
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_delete_tournament)
            .service(api_add_participant)
            .service(api_import_participants)
            .service(api_remove_participant)
            .service(api_set_settings)
            .service(api_set_format)
            .service(api_start_tournament)
            .service(api_submit_score)
            .service(api_get_match)
            .service(api_match_timer)
            .service(api_standings)
            .service(api_start_playoffs)
            .service(api_reset_tournament)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
