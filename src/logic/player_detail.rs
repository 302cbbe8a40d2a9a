//! Player detail: rank distribution, busts, recent form, head-to-head, and history for one name.

use crate::logic::scoring::score_game;
use crate::models::{
    percent, CoPlayerStats, GameAppearance, GameRecord, PlayerDetail, PlayerSummary, RankTally,
    RecentRank, SeatResult,
};
use std::collections::BTreeMap;

/// Number of most recent appearances kept in `recent_ranks`.
pub const RECENT_RANK_LIMIT: usize = 30;

#[derive(Default)]
struct CoTally {
    games: u32,
    my_rank_sum: u32,
    co_rank_sum: u32,
}

/// Build the detail view for `name` over `games`.
///
/// `games` is expected newest first (storage order). `recent_ranks` comes out oldest first;
/// `game_history` keeps the input order. If `name` sits at several seats of one game, the
/// lowest seat is the player's own and the others count as co-players.
/// Unknown names produce an all-zero detail.
pub fn build_player_detail(name: &str, games: &[GameRecord]) -> PlayerDetail {
    let name = name.trim();
    log::debug!("Building detail for {:?} over {} game(s)", name, games.len());

    let mut tally = RankTally::default();
    let mut tobi_count = 0;
    let mut max_score: Option<i64> = None;
    let mut recent_ranks = Vec::new();
    let mut co: BTreeMap<&str, CoTally> = BTreeMap::new();
    let mut game_history = Vec::new();

    for game in games {
        let Some(my_seat) = game.seats.iter().position(|s| s.player() == Some(name)) else {
            continue;
        };
        let scored = score_game(game);
        let my_rank = scored.rank(my_seat);
        let my_score = game.seats[my_seat].score;

        tally.record(my_rank, scored.point(my_seat));
        if my_score < 0 {
            tobi_count += 1;
        }
        max_score = Some(max_score.map_or(my_score, |m| m.max(my_score)));
        recent_ranks.push(RecentRank {
            created_at: game.created_at,
            rank: my_rank,
        });

        for (seat_idx, seat) in game.seats.iter().enumerate() {
            if seat_idx == my_seat {
                continue;
            }
            let Some(co_name) = seat.player() else {
                continue;
            };
            let entry = co.entry(co_name).or_default();
            entry.games += 1;
            entry.my_rank_sum += u32::from(my_rank);
            entry.co_rank_sum += u32::from(scored.rank(seat_idx));
        }

        let seats = std::array::from_fn(|i| SeatResult {
            name: game.seats[i].name.trim().to_string(),
            score: game.seats[i].score,
            point: scored.point(i),
            rank: scored.rank(i),
        });
        game_history.push(GameAppearance {
            id: game.id,
            created_at: game.created_at,
            seats,
            my_seat,
        });
    }

    // Input is newest first; flip to oldest first and keep the latest entries.
    recent_ranks.reverse();
    let excess = recent_ranks.len().saturating_sub(RECENT_RANK_LIMIT);
    let recent_ranks = recent_ranks.split_off(excess);

    let mut co_players: Vec<CoPlayerStats> = co
        .into_iter()
        .map(|(co_name, t)| CoPlayerStats {
            name: co_name.to_string(),
            games: t.games,
            my_avg_rank: f64::from(t.my_rank_sum) / f64::from(t.games),
            co_avg_rank: f64::from(t.co_rank_sum) / f64::from(t.games),
        })
        .collect();
    co_players.sort_by(|a, b| b.games.cmp(&a.games).then_with(|| a.name.cmp(&b.name)));

    PlayerDetail {
        summary: PlayerSummary::from_tally(name, &tally),
        tobi_count,
        tobi_rate: percent(tobi_count, tally.games),
        max_score: max_score.unwrap_or(0),
        recent_ranks,
        co_players,
        game_history,
    }
}
