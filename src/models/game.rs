//! Game records, seats, and the fixed-point pt value.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Storage-assigned game id. Strictly increasing with insertion order.
pub type GameId = i64;

/// Seats per table.
pub const SEATS: usize = 4;

/// One seat of a recorded game. An empty name is an unfilled seat.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    pub name: String,
    pub score: i64,
}

impl Seat {
    pub fn new(name: impl Into<String>, score: i64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }

    /// Name with surrounding whitespace removed; `None` for a blank seat.
    pub fn player(&self) -> Option<&str> {
        let name = self.name.trim();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

/// A recorded four-player game, as stored. Consumed read-only by scoring and aggregation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: GameId,
    pub created_at: DateTime<Utc>,
    /// Seat 0..3 in table order. Seat index is the tiebreak for equal scores.
    pub seats: [Seat; SEATS],
}

impl GameRecord {
    pub fn new(id: GameId, created_at: DateTime<Utc>, seats: [Seat; SEATS]) -> Self {
        Self {
            id,
            created_at,
            seats,
        }
    }

    /// Raw scores in seat order.
    pub fn scores(&self) -> [i64; SEATS] {
        [
            self.seats[0].score,
            self.seats[1].score,
            self.seats[2].score,
            self.seats[3].score,
        ]
    }

    /// Sum of the four raw scores (100000 for a well-formed game). Wide enough for any scores.
    pub fn score_total(&self) -> i128 {
        self.seats.iter().map(|s| i128::from(s.score)).sum()
    }
}

/// Points with one decimal digit, stored as tenths so sums are exact.
/// Addition saturates at the `i64` range.
///
/// Serialized as a JSON number (e.g. `55.0`).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Pt(i64);

impl Pt {
    pub const ZERO: Pt = Pt(0);

    pub const fn from_tenths(tenths: i64) -> Self {
        Pt(tenths)
    }

    pub const fn tenths(self) -> i64 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 10.0
    }
}

impl Add for Pt {
    type Output = Pt;

    fn add(self, other: Pt) -> Pt {
        Pt(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Pt {
    fn add_assign(&mut self, other: Pt) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sum for Pt {
    fn sum<I: Iterator<Item = Pt>>(iter: I) -> Pt {
        iter.fold(Pt::ZERO, |a, b| a + b)
    }
}

impl fmt::Display for Pt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{}", sign, abs / 10, abs % 10)
    }
}

impl Serialize for Pt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Pt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        let tenths = (value * 10.0).round();
        // i64::MAX as f64 rounds up to 2^63, hence the exclusive upper bound.
        if !tenths.is_finite() || tenths < i64::MIN as f64 || tenths >= i64::MAX as f64 {
            return Err(D::Error::custom(format!("pt value out of range: {}", value)));
        }
        Ok(Pt(tenths as i64))
    }
}

/// Ranks and points for one game, indexed by seat.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScoredGame {
    /// 1 = best. Always a permutation of 1..=4.
    pub ranks: [u8; SEATS],
    pub points: [Pt; SEATS],
}

impl ScoredGame {
    pub fn rank(&self, seat: usize) -> u8 {
        self.ranks[seat]
    }

    pub fn point(&self, seat: usize) -> Pt {
        self.points[seat]
    }
}
