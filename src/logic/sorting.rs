//! Ordering of leaderboard rows for display. Sort state is passed in, never stored.

use crate::models::PlayerSummary;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Column to rank by.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Games,
    #[default]
    TotalPt,
    AvgPt,
    YondeRate,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

fn compare_key(a: &PlayerSummary, b: &PlayerSummary, key: SortKey) -> Ordering {
    match key {
        SortKey::Games => a.games.cmp(&b.games),
        SortKey::TotalPt => a.total_pt.cmp(&b.total_pt),
        SortKey::AvgPt => a.avg_pt.total_cmp(&b.avg_pt),
        SortKey::YondeRate => a.yonde_rate.total_cmp(&b.yonde_rate),
    }
}

/// Sort rows by `key` in `dir`. Equal keys fall back to name ascending in either direction.
pub fn sort_leaderboard(players: &mut [PlayerSummary], key: SortKey, dir: SortDirection) {
    players.sort_by(|a, b| {
        let by_key = compare_key(a, b, key);
        let by_key = match dir {
            SortDirection::Asc => by_key,
            SortDirection::Desc => by_key.reverse(),
        };
        by_key.then_with(|| a.name.cmp(&b.name))
    });
}
