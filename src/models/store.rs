//! GameStore: the in-memory record sets (live, tournament, teams, team games, archives).
//!
//! This is the write path. It enforces the 100000-sum and name rules that the
//! scoring and aggregation code deliberately never re-checks.

use crate::models::game::{GameId, GameRecord, Seat, SEATS};
use crate::models::team::{
    MemberId, Team, TeamGameRecord, TeamId, TeamListing, TeamMember, TeamSeat,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Required sum of the four raw scores of a recorded game.
pub const SCORE_TOTAL: i64 = 100_000;

/// Errors that can occur when writing to or reading from the store.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreError {
    /// No game with this id in the addressed set.
    GameNotFound(GameId),
    /// No archive with this id.
    ArchiveNotFound(ArchiveId),
    /// A seat has a blank name where all four names are required.
    MissingPlayerName { seat: usize },
    /// The four scores do not add up to [`SCORE_TOTAL`].
    ScoreSumMismatch { total: i128 },
    /// Archive name is blank.
    EmptyArchiveName,
    /// Team name is blank.
    EmptyTeamName,
    /// A team with this name is already registered.
    DuplicateTeam(String),
    /// No team with this id.
    TeamNotFound(TeamId),
    /// A membership needs both a player name and a team name.
    MissingMemberField,
    /// No membership with this id.
    MemberNotFound(MemberId),
}

impl StoreError {
    /// True for lookups of ids that do not exist (HTTP 404 rather than 400).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::GameNotFound(_)
                | StoreError::ArchiveNotFound(_)
                | StoreError::TeamNotFound(_)
                | StoreError::MemberNotFound(_)
        )
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::GameNotFound(id) => write!(f, "Game {} not found", id),
            StoreError::ArchiveNotFound(_) => write!(f, "Archive not found"),
            StoreError::MissingPlayerName { seat } => {
                write!(f, "All player names are required (seat {} is empty)", seat + 1)
            }
            StoreError::ScoreSumMismatch { total } => write!(
                f,
                "Scores must add up to {} (current total: {})",
                SCORE_TOTAL, total
            ),
            StoreError::EmptyArchiveName => write!(f, "Archive name is required"),
            StoreError::EmptyTeamName => write!(f, "Team name is required"),
            StoreError::DuplicateTeam(name) => write!(f, "Team {:?} already exists", name),
            StoreError::TeamNotFound(id) => write!(f, "Team {} not found", id),
            StoreError::MissingMemberField => {
                write!(f, "Player name and team name are required")
            }
            StoreError::MemberNotFound(id) => write!(f, "Team member {} not found", id),
        }
    }
}

impl std::error::Error for StoreError {}

/// Which ruleset a game belongs to. Both are scored identically.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameSet {
    /// Day-to-day rating games. All four names are required.
    #[default]
    Live,
    /// Tournament games. Seats may be left blank.
    Tournament,
}

/// Unique identifier for an archive.
pub type ArchiveId = Uuid;

/// A named, frozen copy of the live games at the moment it was taken.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Archive {
    pub id: ArchiveId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Newest first.
    pub games: Vec<GameRecord>,
}

/// Archive listing entry (without the games).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ArchiveSummary {
    pub id: ArchiveId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub game_count: usize,
}

impl ArchiveSummary {
    pub fn from_archive(a: &Archive) -> Self {
        Self {
            id: a.id,
            name: a.name.clone(),
            created_at: a.created_at,
            game_count: a.games.len(),
        }
    }
}

/// A game row coming from a bulk import; no validation beyond "has a name".
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ImportedGame {
    /// `None` when the source row carried no usable timestamp.
    pub created_at: Option<DateTime<Utc>>,
    pub seats: [Seat; SEATS],
}

/// A team game row coming from a bulk import.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ImportedTeamGame {
    pub created_at: Option<DateTime<Utc>>,
    pub seats: [TeamSeat; SEATS],
}

/// All record sets. Games are kept in insertion order; listings return newest first.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GameStore {
    live: Vec<GameRecord>,
    tournament: Vec<GameRecord>,
    teams: Vec<Team>,
    team_members: Vec<TeamMember>,
    team_games: Vec<TeamGameRecord>,
    archives: Vec<Archive>,
    /// Last id handed out (ids are shared across game sets and never reused).
    last_id: GameId,
    last_team_id: TeamId,
    last_member_id: MemberId,
}

fn trimmed(seats: [Seat; SEATS]) -> [Seat; SEATS] {
    seats.map(|s| Seat::new(s.name.trim(), s.score))
}

fn trimmed_team(seats: [TeamSeat; SEATS]) -> [TeamSeat; SEATS] {
    seats.map(|s| TeamSeat::new(s.player_name.trim(), s.team_name.trim(), s.score))
}

fn newest_first<T: Clone>(items: &[T]) -> Vec<T> {
    items.iter().rev().cloned().collect()
}

impl GameStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> GameId {
        self.last_id += 1;
        self.last_id
    }

    fn set(&self, set: GameSet) -> &Vec<GameRecord> {
        match set {
            GameSet::Live => &self.live,
            GameSet::Tournament => &self.tournament,
        }
    }

    fn set_mut(&mut self, set: GameSet) -> &mut Vec<GameRecord> {
        match set {
            GameSet::Live => &mut self.live,
            GameSet::Tournament => &mut self.tournament,
        }
    }

    /// Record a game. Names are trimmed; live games need all four names; scores must sum to 100000.
    pub fn add_game(
        &mut self,
        set: GameSet,
        seats: [Seat; SEATS],
        created_at: DateTime<Utc>,
    ) -> Result<GameId, StoreError> {
        let mut game = GameRecord::new(0, created_at, trimmed(seats));
        if set == GameSet::Live {
            if let Some(seat) = game.seats.iter().position(|s| s.name.is_empty()) {
                log::warn!("Rejected {:?} game: seat {} has no name", set, seat + 1);
                return Err(StoreError::MissingPlayerName { seat });
            }
        }
        let total = game.score_total();
        if total != i128::from(SCORE_TOTAL) {
            log::warn!("Rejected {:?} game: score total {} != {}", set, total, SCORE_TOTAL);
            return Err(StoreError::ScoreSumMismatch { total });
        }
        game.id = self.next_id();
        let id = game.id;
        self.set_mut(set).push(game);
        log::info!("Recorded {:?} game {}", set, id);
        Ok(id)
    }

    /// Games of one set, newest first (id descending).
    pub fn list_games(&self, set: GameSet) -> Vec<GameRecord> {
        newest_first(self.set(set))
    }

    pub fn get_game(&self, set: GameSet, id: GameId) -> Option<&GameRecord> {
        self.set(set).iter().find(|g| g.id == id)
    }

    /// Delete a game by id from one set.
    pub fn delete_game(&mut self, set: GameSet, id: GameId) -> Result<(), StoreError> {
        let games = self.set_mut(set);
        let idx = games
            .iter()
            .position(|g| g.id == id)
            .ok_or(StoreError::GameNotFound(id))?;
        games.remove(idx);
        log::info!("Deleted {:?} game {}", set, id);
        Ok(())
    }

    /// Remove every live game (archives are untouched). Returns how many were removed.
    pub fn reset_live_games(&mut self) -> usize {
        let removed = self.live.len();
        self.live.clear();
        log::info!("Reset live games ({} removed)", removed);
        removed
    }

    /// Bulk insert into the live set without the sum check. Rows with no names at all are skipped.
    /// Rows without a timestamp get `default_created_at`. Returns the number inserted.
    pub fn import_games(
        &mut self,
        rows: Vec<ImportedGame>,
        default_created_at: DateTime<Utc>,
    ) -> usize {
        let mut inserted = 0;
        for row in rows {
            let seats = trimmed(row.seats);
            if seats.iter().all(|s| s.name.is_empty()) {
                continue;
            }
            let id = self.next_id();
            let created_at = row.created_at.unwrap_or(default_created_at);
            self.live.push(GameRecord::new(id, created_at, seats));
            inserted += 1;
        }
        log::info!("Imported {} live game(s)", inserted);
        inserted
    }

    /// Snapshot the current live games under `name`. Later live edits do not affect the archive.
    pub fn create_archive(
        &mut self,
        name: &str,
        created_at: DateTime<Utc>,
    ) -> Result<ArchiveId, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyArchiveName);
        }
        let archive = Archive {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at,
            games: newest_first(&self.live),
        };
        let id = archive.id;
        log::info!(
            "Created archive {:?} with {} game(s)",
            archive.name,
            archive.games.len()
        );
        self.archives.push(archive);
        Ok(id)
    }

    /// Archive listing, newest first.
    pub fn archives(&self) -> Vec<ArchiveSummary> {
        self.archives
            .iter()
            .rev()
            .map(ArchiveSummary::from_archive)
            .collect()
    }

    pub fn get_archive(&self, id: ArchiveId) -> Result<&Archive, StoreError> {
        self.archives
            .iter()
            .find(|a| a.id == id)
            .ok_or(StoreError::ArchiveNotFound(id))
    }

    /// Games of an archive, newest first.
    pub fn archive_games(&self, id: ArchiveId) -> Result<Vec<GameRecord>, StoreError> {
        self.get_archive(id).map(|a| a.games.clone())
    }

    pub fn delete_archive(&mut self, id: ArchiveId) -> Result<(), StoreError> {
        let idx = self
            .archives
            .iter()
            .position(|a| a.id == id)
            .ok_or(StoreError::ArchiveNotFound(id))?;
        let removed = self.archives.remove(idx);
        log::info!("Deleted archive {:?}", removed.name);
        Ok(())
    }

    /// Register a team. Names are trimmed and must be unique.
    pub fn add_team(&mut self, name: &str) -> Result<TeamId, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyTeamName);
        }
        if self.teams.iter().any(|t| t.name == name) {
            log::warn!("Rejected team {:?}: already exists", name);
            return Err(StoreError::DuplicateTeam(name.to_string()));
        }
        self.last_team_id += 1;
        let id = self.last_team_id;
        self.teams.push(Team {
            id,
            name: name.to_string(),
        });
        log::info!("Registered team {:?}", name);
        Ok(id)
    }

    /// Teams ordered by name, each with its member count.
    pub fn teams(&self) -> Vec<TeamListing> {
        let mut listing: Vec<TeamListing> = self
            .teams
            .iter()
            .map(|t| TeamListing {
                id: t.id,
                name: t.name.clone(),
                member_count: self
                    .team_members
                    .iter()
                    .filter(|m| m.team_name == t.name)
                    .count(),
            })
            .collect();
        listing.sort_by(|a, b| a.name.cmp(&b.name));
        listing
    }

    /// Delete a team together with every membership filed under its name.
    pub fn delete_team(&mut self, id: TeamId) -> Result<(), StoreError> {
        let idx = self
            .teams
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::TeamNotFound(id))?;
        let team = self.teams.remove(idx);
        let before = self.team_members.len();
        self.team_members.retain(|m| m.team_name != team.name);
        log::info!(
            "Deleted team {:?} ({} member(s) removed)",
            team.name,
            before - self.team_members.len()
        );
        Ok(())
    }

    /// File `player_name` under `team_name`. The team does not have to be registered.
    pub fn add_team_member(
        &mut self,
        team_name: &str,
        player_name: &str,
        joined_at: DateTime<Utc>,
    ) -> Result<MemberId, StoreError> {
        let (team_name, player_name) = (team_name.trim(), player_name.trim());
        if team_name.is_empty() || player_name.is_empty() {
            return Err(StoreError::MissingMemberField);
        }
        self.last_member_id += 1;
        let id = self.last_member_id;
        self.team_members.push(TeamMember {
            id,
            team_name: team_name.to_string(),
            player_name: player_name.to_string(),
            joined_at,
        });
        log::info!("Added {:?} to team {:?}", player_name, team_name);
        Ok(id)
    }

    /// Memberships ordered by team then player, optionally limited to one team.
    pub fn team_members(&self, team: Option<&str>) -> Vec<TeamMember> {
        let team = team.map(str::trim).filter(|t| !t.is_empty());
        let mut members: Vec<TeamMember> = self
            .team_members
            .iter()
            .filter(|m| team.map_or(true, |t| m.team_name == t))
            .cloned()
            .collect();
        members.sort_by(|a, b| {
            a.team_name
                .cmp(&b.team_name)
                .then_with(|| a.player_name.cmp(&b.player_name))
        });
        members
    }

    pub fn delete_team_member(&mut self, id: MemberId) -> Result<(), StoreError> {
        let idx = self
            .team_members
            .iter()
            .position(|m| m.id == id)
            .ok_or(StoreError::MemberNotFound(id))?;
        let removed = self.team_members.remove(idx);
        log::info!(
            "Removed {:?} from team {:?}",
            removed.player_name,
            removed.team_name
        );
        Ok(())
    }

    /// Record a team game. Names are trimmed; no sum check (team games never had one).
    pub fn add_team_game(&mut self, seats: [TeamSeat; SEATS], created_at: DateTime<Utc>) -> GameId {
        let seats = trimmed_team(seats);
        let id = self.next_id();
        self.team_games.push(TeamGameRecord {
            id,
            created_at,
            seats,
        });
        log::info!("Recorded team game {}", id);
        id
    }

    /// Team games, newest first.
    pub fn list_team_games(&self) -> Vec<TeamGameRecord> {
        newest_first(&self.team_games)
    }

    /// Bulk insert team games without validation. Rows without a timestamp get
    /// `default_created_at`. Returns the number inserted.
    pub fn import_team_games(
        &mut self,
        rows: Vec<ImportedTeamGame>,
        default_created_at: DateTime<Utc>,
    ) -> usize {
        let inserted = rows.len();
        for row in rows {
            let id = self.next_id();
            self.team_games.push(TeamGameRecord {
                id,
                created_at: row.created_at.unwrap_or(default_created_at),
                seats: trimmed_team(row.seats),
            });
        }
        log::info!("Imported {} team game(s)", inserted);
        inserted
    }
}
