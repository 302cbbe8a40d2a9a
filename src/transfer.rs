//! CSV export and import of live games and team games.
//!
//! Export writes one row per game with the computed pt next to each score.
//! Import is forgiving: it accepts both the export header and the plain
//! `player1_name`/`player1_score` column names, `,` or `;` as delimiter, and
//! fills unparseable scores with 0. Input bytes may be UTF-8 (with or without
//! BOM) or CP949, which is what spreadsheet programs on Korean Windows save.

use crate::logic::score_game;
use crate::models::{
    GameRecord, ImportedGame, ImportedTeamGame, Seat, TeamGameRecord, TeamSeat, SEATS,
};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use encoding_rs::EUC_KR;
use std::borrow::Cow;

/// Errors from reading or writing CSV.
#[derive(Debug)]
pub enum TransferError {
    Csv(csv::Error),
    Io(std::io::Error),
    /// Output was not valid UTF-8.
    Encoding(std::string::FromUtf8Error),
    /// Input is neither UTF-8 nor CP949.
    UnknownEncoding,
}

impl std::fmt::Display for TransferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferError::Csv(e) => write!(f, "CSV error: {}", e),
            TransferError::Io(e) => write!(f, "I/O error: {}", e),
            TransferError::Encoding(e) => write!(f, "Encoding error: {}", e),
            TransferError::UnknownEncoding => {
                write!(f, "Unknown encoding; save the file as UTF-8 or CP949")
            }
        }
    }
}

impl std::error::Error for TransferError {}

impl From<csv::Error> for TransferError {
    fn from(e: csv::Error) -> Self {
        TransferError::Csv(e)
    }
}

impl From<std::io::Error> for TransferError {
    fn from(e: std::io::Error) -> Self {
        TransferError::Io(e)
    }
}

impl From<std::string::FromUtf8Error> for TransferError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        TransferError::Encoding(e)
    }
}

/// Header row of the export file.
pub const EXPORT_HEADER: [&str; 14] = [
    "ID", "시간", "P1 이름", "P1 점수", "P1 pt", "P2 이름", "P2 점수", "P2 pt", "P3 이름",
    "P3 점수", "P3 pt", "P4 이름", "P4 점수", "P4 pt",
];

/// Header row of the team game export file.
pub const TEAM_EXPORT_HEADER: [&str; 14] = [
    "id",
    "created_at",
    "p1_player_name",
    "p1_team_name",
    "p1_score",
    "p2_player_name",
    "p2_team_name",
    "p2_score",
    "p3_player_name",
    "p3_team_name",
    "p3_score",
    "p4_player_name",
    "p4_team_name",
    "p4_score",
];

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Re-encode UTF-8 text as CP949 for spreadsheet programs. Characters CP949
/// cannot represent become numeric character references.
pub fn encode_cp949(text: &str) -> Vec<u8> {
    let (bytes, _, _) = EUC_KR.encode(text);
    bytes.into_owned()
}

/// Decode uploaded CSV bytes: UTF-8 (a leading BOM is dropped), else CP949.
pub fn decode_csv_bytes(bytes: &[u8]) -> Result<Cow<'_, str>, TransferError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(Cow::Borrowed(text));
    }
    EUC_KR
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or(TransferError::UnknownEncoding)
}

/// Write `games` as CSV, oldest (lowest id) first, pt with one decimal.
pub fn export_games_csv(games: &[GameRecord]) -> Result<String, TransferError> {
    let mut ordered: Vec<&GameRecord> = games.iter().collect();
    ordered.sort_by_key(|g| g.id);

    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER)?;
    for game in ordered {
        let scored = score_game(game);
        let mut row = vec![game.id.to_string(), timestamp(&game.created_at)];
        for (i, seat) in game.seats.iter().enumerate() {
            row.push(seat.name.clone());
            row.push(seat.score.to_string());
            row.push(scored.point(i).to_string());
        }
        writer.write_record(&row)?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

const CREATED_AT_KEYS: [&str; 2] = ["created_at", "시간"];

fn name_keys(seat: usize) -> [String; 3] {
    let n = seat + 1;
    [
        format!("player{}_name", n),
        format!("P{} 이름", n),
        format!("P{}이름", n),
    ]
}

fn score_keys(seat: usize) -> [String; 3] {
    let n = seat + 1;
    [
        format!("player{}_score", n),
        format!("P{} 점수", n),
        format!("P{}점수", n),
    ]
}

/// `;` if the header line uses more semicolons than commas, else `,`.
fn sniff_delimiter(text: &str) -> u8 {
    let first = text.lines().next().unwrap_or("");
    let commas = first.matches(',').count();
    let semicolons = first.matches(';').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// First non-empty value among candidate column names.
fn pick<'r, K: AsRef<str>>(
    headers: &StringRecord,
    record: &'r StringRecord,
    keys: &[K],
) -> Option<&'r str> {
    keys.iter().find_map(|key| {
        let idx = headers.iter().position(|h| h == key.as_ref())?;
        let value = record.get(idx)?.trim();
        (!value.is_empty()).then_some(value)
    })
}

/// Integer score; decimals are truncated, anything unparseable is 0.
fn parse_score(value: Option<&str>) -> i64 {
    let Some(value) = value else {
        return 0;
    };
    value
        .parse::<i64>()
        .ok()
        .or_else(|| value.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        .unwrap_or(0)
}

/// RFC 3339, or a naive `YYYY-MM-DD[T ]HH:MM[:SS]` read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn csv_reader(text: &str) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .delimiter(sniff_delimiter(text))
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes())
}

/// Parse CSV bytes into game rows. Rows without any player name are dropped.
pub fn import_games_csv(input: impl AsRef<[u8]>) -> Result<Vec<ImportedGame>, TransferError> {
    let text = decode_csv_bytes(input.as_ref())?;
    let mut reader = csv_reader(&text);
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let seats: [Seat; SEATS] = std::array::from_fn(|i| {
            let name = pick(&headers, &record, &name_keys(i)).unwrap_or("");
            let score = parse_score(pick(&headers, &record, &score_keys(i)));
            Seat::new(name, score)
        });
        if seats.iter().all(|s| s.player().is_none()) {
            continue;
        }
        let created_at = pick(&headers, &record, &CREATED_AT_KEYS).and_then(parse_timestamp);
        rows.push(ImportedGame { created_at, seats });
    }
    log::debug!("Parsed {} game row(s) from CSV", rows.len());
    Ok(rows)
}

/// Write team games as CSV, oldest (lowest id) first.
pub fn export_team_games_csv(games: &[TeamGameRecord]) -> Result<String, TransferError> {
    let mut ordered: Vec<&TeamGameRecord> = games.iter().collect();
    ordered.sort_by_key(|g| g.id);

    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(TEAM_EXPORT_HEADER)?;
    for game in ordered {
        let mut row = vec![game.id.to_string(), timestamp(&game.created_at)];
        for seat in &game.seats {
            row.push(seat.player_name.clone());
            row.push(seat.team_name.clone());
            row.push(seat.score.to_string());
        }
        writer.write_record(&row)?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Parse team game CSV bytes (the export header).
///
/// A missing score column counts as 0, but a row whose score cell is present and
/// not an integer is skipped.
pub fn import_team_games_csv(
    input: impl AsRef<[u8]>,
) -> Result<Vec<ImportedTeamGame>, TransferError> {
    let text = decode_csv_bytes(input.as_ref())?;
    let mut reader = csv_reader(&text);
    let headers = reader.headers()?.clone();
    let column = |record: &StringRecord, key: &str| -> Option<String> {
        let idx = headers.iter().position(|h| h == key)?;
        record.get(idx).map(|v| v.trim().to_string())
    };

    let mut rows = Vec::new();
    let mut skipped = 0;
    'rows: for record in reader.records() {
        let record = record?;
        let mut seats: [TeamSeat; SEATS] = Default::default();
        for (i, seat) in seats.iter_mut().enumerate() {
            let n = i + 1;
            let score = match column(&record, &format!("p{}_score", n)) {
                None => 0,
                Some(value) => match value.parse::<i64>() {
                    Ok(score) => score,
                    Err(_) => {
                        skipped += 1;
                        continue 'rows;
                    }
                },
            };
            *seat = TeamSeat::new(
                column(&record, &format!("p{}_player_name", n)).unwrap_or_default(),
                column(&record, &format!("p{}_team_name", n)).unwrap_or_default(),
                score,
            );
        }
        let created_at = column(&record, "created_at").and_then(|v| parse_timestamp(&v));
        rows.push(ImportedTeamGame { created_at, seats });
    }
    if skipped > 0 {
        log::warn!("Skipped {} team game row(s) with invalid scores", skipped);
    }
    log::debug!("Parsed {} team game row(s) from CSV", rows.len());
    Ok(rows)
}
