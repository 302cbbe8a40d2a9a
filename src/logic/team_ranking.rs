//! Team ranking: the leaderboard fold keyed by team name over team games.

use crate::logic::scoring::score;
use crate::models::{RankTally, TeamGameRecord, TeamSummary};
use std::collections::BTreeMap;

/// Per-team totals, highest total pt first (ties by team name).
pub fn build_team_ranking(games: &[TeamGameRecord]) -> Vec<TeamSummary> {
    log::debug!("Building team ranking over {} game(s)", games.len());
    let mut tallies: BTreeMap<&str, RankTally> = BTreeMap::new();
    for game in games {
        let scored = score(game.scores());
        for (seat_idx, seat) in game.seats.iter().enumerate() {
            let team = seat.team_name.trim();
            if team.is_empty() {
                continue;
            }
            tallies
                .entry(team)
                .or_default()
                .record(scored.rank(seat_idx), scored.point(seat_idx));
        }
    }
    let mut ranking: Vec<TeamSummary> = tallies
        .into_iter()
        .map(|(team, tally)| TeamSummary::from_tally(team, &tally))
        .collect();
    ranking.sort_by(|a, b| {
        b.total_pt
            .cmp(&a.total_pt)
            .then_with(|| a.team_name.cmp(&b.team_name))
    });
    ranking
}
