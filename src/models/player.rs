//! Per-player views derived from a game list: leaderboard rows and the detail breakdown.

use crate::models::game::{GameId, Pt, SEATS};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Running totals for one name (player or team) while folding games.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RankTally {
    pub games: u32,
    pub total_pt: Pt,
    /// Indexed by rank - 1.
    pub rank_counts: [u32; SEATS],
}

impl RankTally {
    /// Record one appearance finishing at `rank` (1..=4) with `point`.
    pub fn record(&mut self, rank: u8, point: Pt) {
        self.games += 1;
        self.total_pt += point;
        self.rank_counts[usize::from(rank) - 1] += 1;
    }

    /// Average pt per game, one decimal. 0 when no games.
    pub fn avg_pt(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        round1(self.total_pt.as_f64() / f64::from(self.games))
    }

    /// Percentage of 1st or 2nd place finishes, one decimal. 0 when no games.
    pub fn yonde_rate(&self) -> f64 {
        percent(self.rank_counts[0] + self.rank_counts[1], self.games)
    }
}

/// Round half away from zero to one decimal place.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `count / total` as a percentage with one decimal; 0 when `total` is 0.
pub(crate) fn percent(count: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(f64::from(count) * 100.0 / f64::from(total))
}

/// One leaderboard row.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub name: String,
    pub games: u32,
    pub total_pt: Pt,
    pub avg_pt: f64,
    /// 연대율: percentage of appearances finishing 1st or 2nd.
    pub yonde_rate: f64,
    pub rank_counts: [u32; SEATS],
}

impl PlayerSummary {
    pub fn from_tally(name: impl Into<String>, tally: &RankTally) -> Self {
        Self {
            name: name.into(),
            games: tally.games,
            total_pt: tally.total_pt,
            avg_pt: tally.avg_pt(),
            yonde_rate: tally.yonde_rate(),
            rank_counts: tally.rank_counts,
        }
    }
}

/// A single (timestamp, rank) point of the recent-form trend.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RecentRank {
    pub created_at: DateTime<Utc>,
    pub rank: u8,
}

/// Head-to-head record against one co-player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoPlayerStats {
    pub name: String,
    /// Games played at the same table.
    pub games: u32,
    /// The queried player's average rank in those games.
    pub my_avg_rank: f64,
    /// The co-player's average rank in those games.
    pub co_avg_rank: f64,
}

/// One seat of a game as shown in a player's history.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SeatResult {
    pub name: String,
    pub score: i64,
    pub point: Pt,
    pub rank: u8,
}

/// A game the queried player took part in.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameAppearance {
    pub id: GameId,
    pub created_at: DateTime<Utc>,
    pub seats: [SeatResult; SEATS],
    /// Seat index of the queried player (first matching seat).
    pub my_seat: usize,
}

impl GameAppearance {
    pub fn my_result(&self) -> &SeatResult {
        &self.seats[self.my_seat]
    }
}

/// Full statistics for one player over one game list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerDetail {
    #[serde(flatten)]
    pub summary: PlayerSummary,
    /// 토비: appearances that ended with a negative raw score.
    pub tobi_count: u32,
    pub tobi_rate: f64,
    /// Highest raw score; 0 when the player has no games.
    pub max_score: i64,
    /// Oldest first, at most [`crate::RECENT_RANK_LIMIT`] entries.
    pub recent_ranks: Vec<RecentRank>,
    /// Most shared games first, then by name.
    pub co_players: Vec<CoPlayerStats>,
    /// Same order as the input game list.
    pub game_history: Vec<GameAppearance>,
}
