//! CSV export and import.

use chrono::{TimeZone, Utc};
use mahjong_rating::{
    encode_cp949, export_games_csv, export_team_games_csv, import_games_csv,
    import_team_games_csv, parse_timestamp, GameRecord, Seat, TeamGameRecord, TeamSeat,
    TransferError, EXPORT_HEADER, TEAM_EXPORT_HEADER,
};

fn game(id: i64, seats: [(&str, i64); 4]) -> GameRecord {
    let created_at = Utc.with_ymd_and_hms(2024, 1, 2, 3, id as u32, 0).unwrap();
    GameRecord::new(id, created_at, seats.map(|(n, s)| Seat::new(n, s)))
}

#[test]
fn export_writes_header_and_rows_oldest_first() {
    let games = vec![
        game(2, [("B", 45000), ("A", 25000), ("C", 20000), ("D", 10000)]),
        game(1, [("A", 40000), ("B", 30000), ("C", 20000), ("D", 10000)]),
    ];
    let csv = export_games_csv(&games).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "ID,시간,P1 이름,P1 점수,P1 pt,P2 이름,P2 점수,P2 pt,P3 이름,P3 점수,P3 pt,P4 이름,P4 점수,P4 pt"
    );
    assert_eq!(
        lines[1],
        "1,2024-01-02T03:01:00Z,A,40000,60.0,B,30000,10.0,C,20000,-20.0,D,10000,-50.0"
    );
    assert!(lines[2].starts_with("2,2024-01-02T03:02:00Z,B,45000,65.0,A,25000,5.0,"));
}

#[test]
fn import_reads_export_header_with_semicolons_and_bom() {
    let text = "\u{feff}ID;시간;P1 이름;P1 점수;P1 pt;P2 이름;P2 점수;P2 pt;P3 이름;P3 점수;P3 pt;P4 이름;P4 점수;P4 pt\n\
                7;2024-03-01T18:30;가;40000;60.0;나;30000;10.0;다;20000;-20.0;라;10000;-50.0\n";
    let rows = import_games_csv(text).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].seats[0], Seat::new("가", 40000));
    assert_eq!(rows[0].seats[3], Seat::new("라", 10000));
    assert_eq!(
        rows[0].created_at,
        Some(Utc.with_ymd_and_hms(2024, 3, 1, 18, 30, 0).unwrap())
    );
}

#[test]
fn import_reads_plain_column_names_and_tolerates_bad_values() {
    let text = "created_at,player1_name,player2_name,player3_name,player4_name,player1_score,player2_score,player3_score,player4_score\n\
                not a date,A,B,C,D,40000.7,abc,,10000\n\
                ,,,,,1,2,3,4\n";
    let rows = import_games_csv(text).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].created_at, None);
    let scores: Vec<i64> = rows[0].seats.iter().map(|s| s.score).collect();
    assert_eq!(scores, vec![40000, 0, 0, 10000]);
}

#[test]
fn export_then_import_keeps_names_scores_and_times() {
    let games = vec![game(1, [("A", 40000), ("B", 30000), ("C", 20000), ("D", 10000)])];
    let rows = import_games_csv(&export_games_csv(&games).unwrap()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].seats, games[0].seats);
    assert_eq!(rows[0].created_at, Some(games[0].created_at));
}

#[test]
fn timestamp_formats() {
    let expected = Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 0).unwrap();
    assert_eq!(parse_timestamp("2024-03-01T09:05"), Some(expected));
    assert_eq!(parse_timestamp("2024-03-01 09:05"), Some(expected));
    assert_eq!(parse_timestamp("2024-03-01T09:05:00Z"), Some(expected));
    assert_eq!(parse_timestamp("2024-03-01T18:05:00+09:00"), Some(expected));
    assert_eq!(parse_timestamp("yesterday"), None);
}

#[test]
fn cp949_export_imports_back() {
    let games = vec![game(3, [("가", 40000), ("나", 30000), ("다", 20000), ("라", 10000)])];
    let bytes = encode_cp949(&export_games_csv(&games).unwrap());
    assert!(std::str::from_utf8(&bytes).is_err());

    let rows = import_games_csv(&bytes).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].seats, games[0].seats);
    assert_eq!(rows[0].created_at, Some(games[0].created_at));
}

#[test]
fn import_rejects_bytes_in_no_known_encoding() {
    let err = import_games_csv(b"player1_name\n\xff\xff\n").unwrap_err();
    assert!(matches!(err, TransferError::UnknownEncoding));
}

#[test]
fn export_header_is_the_first_row() {
    let csv = export_games_csv(&[]).unwrap();
    assert_eq!(csv.trim_end(), EXPORT_HEADER.join(","));
    let csv = export_team_games_csv(&[]).unwrap();
    assert_eq!(csv.trim_end(), TEAM_EXPORT_HEADER.join(","));
}

#[test]
fn team_export_writes_rows_oldest_first() {
    let team_game = |id: i64, first: &str| TeamGameRecord {
        id,
        created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, id as u32, 0).unwrap(),
        seats: [
            TeamSeat::new(first, "Red", 40000),
            TeamSeat::new("B", "Blue", 30000),
            TeamSeat::new("C", "Red", 20000),
            TeamSeat::new("D", "Blue", 10000),
        ],
    };
    let csv = export_team_games_csv(&[team_game(2, "E"), team_game(1, "A")]).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[1],
        "1,2024-01-02T03:01:00Z,A,Red,40000,B,Blue,30000,C,Red,20000,D,Blue,10000"
    );
    assert!(lines[2].starts_with("2,2024-01-02T03:02:00Z,E,Red,"));

    let rows = import_team_games_csv(&csv).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].seats[0], TeamSeat::new("A", "Red", 40000));
    assert_eq!(rows[1].created_at, Some(team_game(2, "E").created_at));
}

#[test]
fn team_import_skips_rows_with_bad_scores() {
    let text = "\u{feff}created_at,p1_player_name,p1_team_name,p1_score,p2_player_name,p2_team_name,p2_score\n\
                ,A,Red,40000,B,Blue,30000\n\
                2024-03-01 09:05,A,Red,12.5,B,Blue,30000\n\
                2024-03-01 09:05,A,Red,,B,Blue,30000\n";
    let rows = import_team_games_csv(text).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].created_at, None);
    assert_eq!(rows[0].seats[1], TeamSeat::new("B", "Blue", 30000));
    // Seats without columns stay blank with score 0.
    assert_eq!(rows[0].seats[3], TeamSeat::default());
}
