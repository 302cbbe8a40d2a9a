//! Mahjong rating: scoring and aggregation library, record store, CSV transfer.
//!
//! Scoring and aggregation are pure functions over game lists; the store and the
//! web binary sit on top and hand materialized lists in.

pub mod logic;
pub mod models;
pub mod transfer;

pub use logic::{
    build_leaderboard, build_player_detail, build_team_ranking, placement_order, score,
    score_game, sort_leaderboard, SortDirection, SortKey, RECENT_RANK_LIMIT, RETURN_SCORE, UMA,
};
pub use models::{
    Archive, ArchiveId, ArchiveSummary, CoPlayerStats, GameAppearance, GameId, GameRecord,
    GameSet, GameStore, ImportedGame, ImportedTeamGame, MemberId, PlayerDetail, PlayerSummary, Pt,
    RankTally, RecentRank, ScoredGame, Seat, SeatResult, StoreError, Team, TeamGameRecord, TeamId,
    TeamListing, TeamMember, TeamSeat, TeamSummary, SCORE_TOTAL, SEATS,
};
pub use transfer::{
    decode_csv_bytes, encode_cp949, export_games_csv, export_team_games_csv, import_games_csv,
    import_team_games_csv, parse_timestamp, TransferError, EXPORT_HEADER, TEAM_EXPORT_HEADER,
};
