//! Leaderboard: one summary row per player over a game list.

use crate::logic::scoring::score_game;
use crate::models::{GameRecord, PlayerSummary, RankTally};
use std::collections::BTreeMap;

/// Fold `games` into per-player totals.
///
/// Blank seats are skipped. A name appearing at two seats of the same game counts once per seat.
/// Rows come back ordered by name; use [`crate::sort_leaderboard`] for ranking order.
pub fn build_leaderboard(games: &[GameRecord]) -> Vec<PlayerSummary> {
    log::debug!("Building leaderboard over {} game(s)", games.len());
    let mut tallies: BTreeMap<&str, RankTally> = BTreeMap::new();
    for game in games {
        let scored = score_game(game);
        for (seat_idx, seat) in game.seats.iter().enumerate() {
            let Some(name) = seat.player() else {
                continue;
            };
            tallies
                .entry(name)
                .or_default()
                .record(scored.rank(seat_idx), scored.point(seat_idx));
        }
    }
    tallies
        .into_iter()
        .map(|(name, tally)| PlayerSummary::from_tally(name, &tally))
        .collect()
}
