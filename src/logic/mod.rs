//! Rating logic: scoring, leaderboard and player detail folds, team ranking, display ordering.

mod leaderboard;
mod player_detail;
mod scoring;
mod sorting;
mod team_ranking;

pub use leaderboard::build_leaderboard;
pub use player_detail::{build_player_detail, RECENT_RANK_LIMIT};
pub use scoring::{placement_order, score, score_game, RETURN_SCORE, UMA};
pub use sorting::{sort_leaderboard, SortDirection, SortKey};
pub use team_ranking::build_team_ranking;
