//! Teams, their members, team games (each seat plays for a team) and the team ranking row.

use crate::models::game::{GameId, Pt, SEATS};
use crate::models::player::RankTally;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage-assigned team id.
pub type TeamId = i64;

/// Storage-assigned membership id.
pub type MemberId = i64;

/// A registered team. Names are unique.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
}

/// Team listing entry with the number of members filed under its name.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamListing {
    pub id: TeamId,
    pub name: String,
    pub member_count: usize,
}

/// A player filed under a team name.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: MemberId,
    pub team_name: String,
    pub player_name: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamSeat {
    pub player_name: String,
    pub team_name: String,
    pub score: i64,
}

impl TeamSeat {
    pub fn new(player_name: impl Into<String>, team_name: impl Into<String>, score: i64) -> Self {
        Self {
            player_name: player_name.into(),
            team_name: team_name.into(),
            score,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamGameRecord {
    pub id: GameId,
    pub created_at: DateTime<Utc>,
    pub seats: [TeamSeat; SEATS],
}

impl TeamGameRecord {
    pub fn scores(&self) -> [i64; SEATS] {
        [
            self.seats[0].score,
            self.seats[1].score,
            self.seats[2].score,
            self.seats[3].score,
        ]
    }
}

/// One team ranking row.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub team_name: String,
    pub games: u32,
    pub total_pt: Pt,
    pub yonde_rate: f64,
    pub rank_counts: [u32; SEATS],
}

impl TeamSummary {
    pub fn from_tally(team_name: impl Into<String>, tally: &RankTally) -> Self {
        Self {
            team_name: team_name.into(),
            games: tally.games,
            total_pt: tally.total_pt,
            yonde_rate: tally.yonde_rate(),
            rank_counts: tally.rank_counts,
        }
    }
}
