//! Scoring: four raw scores -> four ranks and four pt values.

use crate::models::{GameRecord, Pt, ScoredGame, SEATS};

/// Placement bonus by finishing position (1st..4th), in whole pt.
pub const UMA: [i64; SEATS] = [50, 10, -10, -30];

/// Raw score that maps to 0 pt before uma.
pub const RETURN_SCORE: i64 = 30_000;

/// Integer division rounding half away from zero. `d` must be positive.
fn div_round_half_away(n: i128, d: i128) -> i128 {
    let q = n / d;
    let r = n % d;
    if 2 * r.abs() >= d {
        q + n.signum()
    } else {
        q
    }
}

/// Seat indices ordered best to worst. Equal scores keep the lower seat first.
pub fn placement_order(scores: [i64; SEATS]) -> [usize; SEATS] {
    let mut order = [0, 1, 2, 3];
    // sort_by is stable, so ties stay in seat order.
    order.sort_by(|&a, &b| scores[b].cmp(&scores[a]));
    order
}

/// Score one game.
///
/// pt = (raw - 30000) / 1000 + uma, rounded to one decimal (half away from zero).
/// Total over any input: the 100000-sum rule is the write path's job, not checked here.
pub fn score(scores: [i64; SEATS]) -> ScoredGame {
    let mut ranks = [0u8; SEATS];
    let mut points = [Pt::ZERO; SEATS];
    for (pos, seat) in placement_order(scores).into_iter().enumerate() {
        ranks[seat] = pos as u8 + 1;
        // Widened so any i64 score is accepted; the result is within i64 / 100.
        let raw = i128::from(scores[seat]) - i128::from(RETURN_SCORE);
        let base = div_round_half_away(raw, 100);
        points[seat] = Pt::from_tenths(base as i64 + UMA[pos] * 10);
    }
    ScoredGame { ranks, points }
}

/// Score a stored game by its seat scores.
pub fn score_game(game: &GameRecord) -> ScoredGame {
    score(game.scores())
}
