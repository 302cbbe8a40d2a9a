//! Single binary web server: JSON API over the in-memory game store, CSV export/import.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, STATIC_DIR (served at /static when it exists), RUST_LOG.

use actix_files::Files;
use actix_web::{
    delete, get, post,
    web::{Bytes, Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::Utc;
use mahjong_rating::{
    build_leaderboard, build_player_detail, build_team_ranking, encode_cp949, export_games_csv,
    export_team_games_csv, import_games_csv, import_team_games_csv, sort_leaderboard, ArchiveId,
    GameId, GameRecord, GameSet, GameStore, MemberId, Seat, SortDirection, SortKey, StoreError,
    TeamId, TeamSeat, TransferError,
};
use serde::Deserialize;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory state: every record set lives in one store behind a lock.
type AppState = Data<RwLock<GameStore>>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// Flat body: `playerN_name` / `playerN_score` for seats 1..4.
#[derive(Deserialize)]
struct CreateGameBody {
    #[serde(default)]
    player1_name: String,
    #[serde(default)]
    player2_name: String,
    #[serde(default)]
    player3_name: String,
    #[serde(default)]
    player4_name: String,
    player1_score: i64,
    player2_score: i64,
    player3_score: i64,
    player4_score: i64,
}

impl CreateGameBody {
    fn into_seats(self) -> [Seat; 4] {
        [
            Seat::new(self.player1_name, self.player1_score),
            Seat::new(self.player2_name, self.player2_score),
            Seat::new(self.player3_name, self.player3_score),
            Seat::new(self.player4_name, self.player4_score),
        ]
    }
}

#[derive(Deserialize)]
struct CreateTeamGameBody {
    g1_player: String,
    g1_team: String,
    g1_score: i64,
    g2_player: String,
    g2_team: String,
    g2_score: i64,
    g3_player: String,
    g3_team: String,
    g3_score: i64,
    g4_player: String,
    g4_team: String,
    g4_score: i64,
}

impl CreateTeamGameBody {
    fn into_seats(self) -> [TeamSeat; 4] {
        [
            TeamSeat::new(self.g1_player, self.g1_team, self.g1_score),
            TeamSeat::new(self.g2_player, self.g2_team, self.g2_score),
            TeamSeat::new(self.g3_player, self.g3_team, self.g3_score),
            TeamSeat::new(self.g4_player, self.g4_team, self.g4_score),
        ]
    }
}

#[derive(Deserialize)]
struct CreateArchiveBody {
    name: String,
}

#[derive(Deserialize)]
struct CreateTeamBody {
    #[serde(default)]
    team_name: String,
}

#[derive(Deserialize)]
struct CreateTeamMemberBody {
    #[serde(default)]
    team_name: String,
    #[serde(default)]
    player_name: String,
}

/// `?team=<name>` (optional).
#[derive(Deserialize)]
struct TeamMembersQuery {
    team: Option<String>,
}

/// `?sort=total_pt&dir=desc` (both optional).
#[derive(Deserialize)]
struct RankingQuery {
    #[serde(default)]
    sort: SortKey,
    #[serde(default)]
    dir: SortDirection,
}

#[derive(Deserialize)]
struct GamePath {
    id: GameId,
}

#[derive(Deserialize)]
struct PlayerPath {
    name: String,
}

#[derive(Deserialize)]
struct ArchivePath {
    id: ArchiveId,
}

#[derive(Deserialize)]
struct TeamPath {
    id: TeamId,
}

#[derive(Deserialize)]
struct MemberPath {
    id: MemberId,
}

#[derive(Deserialize)]
struct ArchivePlayerPath {
    id: ArchiveId,
    name: String,
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

fn read_store(state: &AppState) -> Result<RwLockReadGuard<'_, GameStore>, HttpResponse> {
    state.read().map_err(|_| lock_error())
}

fn write_store(state: &AppState) -> Result<RwLockWriteGuard<'_, GameStore>, HttpResponse> {
    state.write().map_err(|_| lock_error())
}

fn store_error(e: StoreError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    if e.is_not_found() {
        HttpResponse::NotFound().json(body)
    } else {
        HttpResponse::BadRequest().json(body)
    }
}

fn transfer_error(context: &str, e: TransferError) -> HttpResponse {
    log::warn!("{} failed: {}", context, e);
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
}

fn csv_download(filename: &str, content_type: &str, body: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(content_type)
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(body)
}

fn ranking_response(games: &[GameRecord], query: &RankingQuery) -> HttpResponse {
    let mut rows = build_leaderboard(games);
    sort_leaderboard(&mut rows, query.sort, query.dir);
    HttpResponse::Ok().json(rows)
}

fn list_games(state: &AppState, set: GameSet) -> HttpResponse {
    match read_store(state) {
        Ok(store) => HttpResponse::Ok().json(store.list_games(set)),
        Err(resp) => resp,
    }
}

fn create_game(state: &AppState, set: GameSet, body: CreateGameBody) -> HttpResponse {
    let mut store = match write_store(state) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match store.add_game(set, body.into_seats(), Utc::now()) {
        Ok(id) => HttpResponse::Created().json(serde_json::json!({ "id": id })),
        Err(e) => store_error(e),
    }
}

fn delete_game(state: &AppState, set: GameSet, id: GameId) -> HttpResponse {
    let mut store = match write_store(state) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match store.delete_game(set, id) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "ok": true })),
        Err(e) => store_error(e),
    }
}

fn ranking(state: &AppState, set: GameSet, query: &RankingQuery) -> HttpResponse {
    match read_store(state) {
        Ok(store) => ranking_response(&store.list_games(set), query),
        Err(resp) => resp,
    }
}

fn player_detail(state: &AppState, set: GameSet, name: &str) -> HttpResponse {
    match read_store(state) {
        Ok(store) => HttpResponse::Ok().json(build_player_detail(name, &store.list_games(set))),
        Err(resp) => resp,
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "mahjong-rating",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Live games, newest first.
#[get("/api/games")]
async fn api_list_games(state: AppState) -> HttpResponse {
    list_games(&state, GameSet::Live)
}

/// Record a live game (all four names, scores summing to 100000).
#[post("/api/games")]
async fn api_create_game(state: AppState, body: Json<CreateGameBody>) -> HttpResponse {
    create_game(&state, GameSet::Live, body.into_inner())
}

#[delete("/api/games/{id}")]
async fn api_delete_game(state: AppState, path: Path<GamePath>) -> HttpResponse {
    delete_game(&state, GameSet::Live, path.id)
}

/// Live leaderboard.
#[get("/api/ranking")]
async fn api_ranking(state: AppState, query: Query<RankingQuery>) -> HttpResponse {
    ranking(&state, GameSet::Live, &query)
}

/// Live detail for one player.
#[get("/api/players/{name}")]
async fn api_player_detail(state: AppState, path: Path<PlayerPath>) -> HttpResponse {
    player_detail(&state, GameSet::Live, &path.name)
}

#[get("/api/tournament_games")]
async fn api_list_tournament_games(state: AppState) -> HttpResponse {
    list_games(&state, GameSet::Tournament)
}

/// Record a tournament game (blank seats allowed, scores summing to 100000).
#[post("/api/tournament_games")]
async fn api_create_tournament_game(state: AppState, body: Json<CreateGameBody>) -> HttpResponse {
    create_game(&state, GameSet::Tournament, body.into_inner())
}

#[delete("/api/tournament_games/{id}")]
async fn api_delete_tournament_game(state: AppState, path: Path<GamePath>) -> HttpResponse {
    delete_game(&state, GameSet::Tournament, path.id)
}

#[get("/api/tournament_ranking")]
async fn api_tournament_ranking(state: AppState, query: Query<RankingQuery>) -> HttpResponse {
    ranking(&state, GameSet::Tournament, &query)
}

#[get("/api/tournament_players/{name}")]
async fn api_tournament_player_detail(state: AppState, path: Path<PlayerPath>) -> HttpResponse {
    player_detail(&state, GameSet::Tournament, &path.name)
}

/// Archive listing, newest first.
#[get("/api/archives")]
async fn api_list_archives(state: AppState) -> HttpResponse {
    let store = match read_store(&state) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().json(store.archives())
}

/// Freeze the current live games under a name.
#[post("/api/archives")]
async fn api_create_archive(state: AppState, body: Json<CreateArchiveBody>) -> HttpResponse {
    let mut store = match write_store(&state) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match store.create_archive(&body.name, Utc::now()) {
        Ok(id) => HttpResponse::Created().json(serde_json::json!({ "id": id })),
        Err(e) => store_error(e),
    }
}

#[delete("/api/archives/{id}")]
async fn api_delete_archive(state: AppState, path: Path<ArchivePath>) -> HttpResponse {
    let mut store = match write_store(&state) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match store.delete_archive(path.id) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "ok": true })),
        Err(e) => store_error(e),
    }
}

#[get("/api/archives/{id}/games")]
async fn api_archive_games(state: AppState, path: Path<ArchivePath>) -> HttpResponse {
    let store = match read_store(&state) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match store.archive_games(path.id) {
        Ok(games) => HttpResponse::Ok().json(games),
        Err(e) => store_error(e),
    }
}

#[get("/api/archives/{id}/ranking")]
async fn api_archive_ranking(
    state: AppState,
    path: Path<ArchivePath>,
    query: Query<RankingQuery>,
) -> HttpResponse {
    let store = match read_store(&state) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match store.get_archive(path.id) {
        Ok(archive) => ranking_response(&archive.games, &query),
        Err(e) => store_error(e),
    }
}

#[get("/api/archives/{id}/players/{name}")]
async fn api_archive_player_detail(state: AppState, path: Path<ArchivePlayerPath>) -> HttpResponse {
    let store = match read_store(&state) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match store.get_archive(path.id) {
        Ok(archive) => HttpResponse::Ok().json(build_player_detail(&path.name, &archive.games)),
        Err(e) => store_error(e),
    }
}

#[get("/api/team_games")]
async fn api_list_team_games(state: AppState) -> HttpResponse {
    let store = match read_store(&state) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().json(store.list_team_games())
}

#[post("/api/team_games")]
async fn api_create_team_game(state: AppState, body: Json<CreateTeamGameBody>) -> HttpResponse {
    let mut store = match write_store(&state) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let id = store.add_team_game(body.into_inner().into_seats(), Utc::now());
    HttpResponse::Created().json(serde_json::json!({ "id": id }))
}

/// Registered teams by name, with member counts.
#[get("/api/teams")]
async fn api_list_teams(state: AppState) -> HttpResponse {
    let store = match read_store(&state) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().json(store.teams())
}

#[post("/api/teams")]
async fn api_create_team(state: AppState, body: Json<CreateTeamBody>) -> HttpResponse {
    let mut store = match write_store(&state) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match store.add_team(&body.team_name) {
        Ok(id) => HttpResponse::Created()
            .json(serde_json::json!({ "id": id, "name": body.team_name.trim() })),
        Err(e) => store_error(e),
    }
}

/// Delete a team and its memberships.
#[delete("/api/teams/{id}")]
async fn api_delete_team(state: AppState, path: Path<TeamPath>) -> HttpResponse {
    let mut store = match write_store(&state) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match store.delete_team(path.id) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "ok": true })),
        Err(e) => store_error(e),
    }
}

#[get("/api/team_members")]
async fn api_list_team_members(state: AppState, query: Query<TeamMembersQuery>) -> HttpResponse {
    let store = match read_store(&state) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().json(store.team_members(query.team.as_deref()))
}

#[post("/api/team_members")]
async fn api_create_team_member(
    state: AppState,
    body: Json<CreateTeamMemberBody>,
) -> HttpResponse {
    let mut store = match write_store(&state) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match store.add_team_member(&body.team_name, &body.player_name, Utc::now()) {
        Ok(id) => HttpResponse::Created().json(serde_json::json!({ "ok": true, "id": id })),
        Err(e) => store_error(e),
    }
}

#[delete("/api/team_members/{id}")]
async fn api_delete_team_member(state: AppState, path: Path<MemberPath>) -> HttpResponse {
    let mut store = match write_store(&state) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match store.delete_team_member(path.id) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "ok": true })),
        Err(e) => store_error(e),
    }
}

/// Team totals, highest total pt first.
#[get("/api/team_ranking")]
async fn api_team_ranking(state: AppState) -> HttpResponse {
    let store = match read_store(&state) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().json(build_team_ranking(&store.list_team_games()))
}

/// Clear all live games (archives are kept).
#[post("/api/admin/reset_games")]
async fn api_reset_games(state: AppState) -> HttpResponse {
    let mut store = match write_store(&state) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let removed = store.reset_live_games();
    HttpResponse::Ok().json(serde_json::json!({ "ok": true, "removed": removed }))
}

/// Download live games as CP949 CSV with computed pt (opens directly in Excel).
#[get("/export")]
async fn export_csv(state: AppState) -> HttpResponse {
    let store = match read_store(&state) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match export_games_csv(&store.list_games(GameSet::Live)) {
        Ok(csv) => csv_download(
            "mahjong_rating.csv",
            "text/csv; charset=cp949",
            encode_cp949(&csv),
        ),
        Err(e) => {
            log::error!("CSV export failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() }))
        }
    }
}

/// Upload CSV (request body, UTF-8 or CP949) into the live set.
#[post("/import")]
async fn import_csv(state: AppState, body: Bytes) -> HttpResponse {
    let rows = match import_games_csv(&body) {
        Ok(rows) => rows,
        Err(e) => return transfer_error("CSV import", e),
    };
    let mut store = match write_store(&state) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let inserted = store.import_games(rows, Utc::now());
    HttpResponse::Ok().json(serde_json::json!({ "inserted": inserted }))
}

/// Download team games as UTF-8 CSV.
#[get("/team_export")]
async fn team_export_csv(state: AppState) -> HttpResponse {
    let store = match read_store(&state) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match export_team_games_csv(&store.list_team_games()) {
        Ok(csv) => csv_download("team_games.csv", "text/csv; charset=utf-8", csv.into_bytes()),
        Err(e) => {
            log::error!("Team CSV export failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() }))
        }
    }
}

/// Upload team game CSV (request body) into the team set.
#[post("/team_import")]
async fn team_import_csv(state: AppState, body: Bytes) -> HttpResponse {
    let rows = match import_team_games_csv(&body) {
        Ok(rows) => rows,
        Err(e) => return transfer_error("Team CSV import", e),
    };
    let mut store = match write_store(&state) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let inserted = store.import_team_games(rows, Utc::now());
    HttpResponse::Ok().json(serde_json::json!({ "inserted": inserted }))
}

/// Server settings read from the environment.
struct ServerConfig {
    host: String,
    port: u16,
    static_dir: String,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| default_host()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(default_port),
            static_dir: std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    let serve_static = std::path::Path::new(&config.static_dir).is_dir();
    if !serve_static {
        log::info!("No static directory at {:?}; serving API only", config.static_dir);
    }
    log::info!("Starting server at http://{}:{}", config.host, config.port);

    let state = Data::new(RwLock::new(GameStore::new()));
    let static_dir = config.static_dir.clone();

    HttpServer::new(move || {
        let static_dir = static_dir.clone();
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(favicon)
            .service(api_list_games)
            .service(api_create_game)
            .service(api_delete_game)
            .service(api_ranking)
            .service(api_player_detail)
            .service(api_list_tournament_games)
            .service(api_create_tournament_game)
            .service(api_delete_tournament_game)
            .service(api_tournament_ranking)
            .service(api_tournament_player_detail)
            .service(api_list_archives)
            .service(api_create_archive)
            .service(api_delete_archive)
            .service(api_archive_games)
            .service(api_archive_ranking)
            .service(api_archive_player_detail)
            .service(api_list_teams)
            .service(api_create_team)
            .service(api_delete_team)
            .service(api_list_team_members)
            .service(api_create_team_member)
            .service(api_delete_team_member)
            .service(api_list_team_games)
            .service(api_create_team_game)
            .service(api_team_ranking)
            .service(api_reset_games)
            .service(export_csv)
            .service(import_csv)
            .service(team_export_csv)
            .service(team_import_csv)
            .configure(move |cfg| {
                if serve_static {
                    cfg.service(Files::new("/static", static_dir).index_file("index.html"));
                }
            })
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
