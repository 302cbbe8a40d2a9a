//! Data structures: game records, derived player/team views, and the record store.

mod game;
mod player;
mod store;
mod team;

pub use game::{GameId, GameRecord, Pt, ScoredGame, Seat, SEATS};
pub(crate) use player::percent;
pub use player::{
    CoPlayerStats, GameAppearance, PlayerDetail, PlayerSummary, RankTally, RecentRank, SeatResult,
};
pub use store::{
    Archive, ArchiveId, ArchiveSummary, GameSet, GameStore, ImportedGame, ImportedTeamGame,
    StoreError, SCORE_TOTAL,
};
pub use team::{
    MemberId, Team, TeamGameRecord, TeamId, TeamListing, TeamMember, TeamSeat, TeamSummary,
};
