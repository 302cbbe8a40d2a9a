//! GameStore: write-path validation, listing order, archives, import, team games.

use chrono::{DateTime, TimeZone, Utc};
use mahjong_rating::{
    build_leaderboard, build_team_ranking, GameSet, GameStore, ImportedGame, ImportedTeamGame,
    Seat, StoreError, TeamSeat, SCORE_TOTAL,
};

fn at(minute: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + minute * 60, 0).unwrap()
}

fn seats(names: [&str; 4], scores: [i64; 4]) -> [Seat; 4] {
    std::array::from_fn(|i| Seat::new(names[i], scores[i]))
}

fn table() -> [Seat; 4] {
    seats(["A", "B", "C", "D"], [40000, 30000, 20000, 10000])
}

#[test]
fn add_game_rejects_wrong_total() {
    let mut store = GameStore::new();
    let err = store
        .add_game(
            GameSet::Live,
            seats(["A", "B", "C", "D"], [40000, 30000, 20000, 9000]),
            at(0),
        )
        .unwrap_err();
    assert_eq!(err, StoreError::ScoreSumMismatch { total: 99000 });
    assert!(err.to_string().contains(&SCORE_TOTAL.to_string()));
    assert!(store.list_games(GameSet::Live).is_empty());
}

#[test]
fn add_game_rejects_totals_that_overflow_i64() {
    let mut store = GameStore::new();
    let err = store
        .add_game(
            GameSet::Live,
            seats(["A", "B", "C", "D"], [i64::MAX, 1, 0, 0]),
            at(0),
        )
        .unwrap_err();
    assert_eq!(
        err,
        StoreError::ScoreSumMismatch {
            total: i128::from(i64::MAX) + 1
        }
    );

    // Wraps to exactly 100000 in 64-bit arithmetic.
    let err = store
        .add_game(
            GameSet::Tournament,
            seats(["A", "B", "C", "D"], [i64::MAX, i64::MAX, 2, 100_000]),
            at(0),
        )
        .unwrap_err();
    assert_eq!(
        err,
        StoreError::ScoreSumMismatch {
            total: 18_446_744_073_709_651_616
        }
    );

    assert!(store.add_game(GameSet::Live, table(), at(1)).is_ok());
    assert_eq!(store.list_games(GameSet::Live).len(), 1);
    assert!(store.list_games(GameSet::Tournament).is_empty());
}

#[test]
fn live_games_need_all_names_but_tournament_games_do_not() {
    let mut store = GameStore::new();
    let blank_seat = seats(["A", "B", " ", "D"], [40000, 30000, 20000, 10000]);
    assert_eq!(
        store.add_game(GameSet::Live, blank_seat.clone(), at(0)),
        Err(StoreError::MissingPlayerName { seat: 2 })
    );
    assert!(store.add_game(GameSet::Tournament, blank_seat, at(0)).is_ok());
    assert_eq!(store.list_games(GameSet::Tournament)[0].seats[2].name, "");
}

#[test]
fn names_are_trimmed_on_write() {
    let mut store = GameStore::new();
    store
        .add_game(
            GameSet::Live,
            seats([" A ", "B", "C", "D"], [40000, 30000, 20000, 10000]),
            at(0),
        )
        .unwrap();
    assert_eq!(store.list_games(GameSet::Live)[0].seats[0].name, "A");
}

#[test]
fn listings_are_newest_first_with_increasing_ids() {
    let mut store = GameStore::new();
    let first = store.add_game(GameSet::Live, table(), at(0)).unwrap();
    let second = store.add_game(GameSet::Live, table(), at(1)).unwrap();
    let third = store.add_game(GameSet::Tournament, table(), at(2)).unwrap();
    assert!(first < second && second < third);

    let ids: Vec<i64> = store.list_games(GameSet::Live).iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![second, first]);
    assert_eq!(store.list_games(GameSet::Tournament).len(), 1);
}

#[test]
fn delete_game_only_touches_its_set() {
    let mut store = GameStore::new();
    let live = store.add_game(GameSet::Live, table(), at(0)).unwrap();
    let tour = store.add_game(GameSet::Tournament, table(), at(1)).unwrap();

    assert_eq!(
        store.delete_game(GameSet::Tournament, live),
        Err(StoreError::GameNotFound(live))
    );
    assert!(StoreError::GameNotFound(live).is_not_found());
    store.delete_game(GameSet::Live, live).unwrap();
    assert!(store.list_games(GameSet::Live).is_empty());
    assert!(store.get_game(GameSet::Tournament, tour).is_some());
}

#[test]
fn archive_is_a_frozen_copy() {
    let mut store = GameStore::new();
    let g1 = store.add_game(GameSet::Live, table(), at(0)).unwrap();
    let g2 = store.add_game(GameSet::Live, table(), at(1)).unwrap();
    let archive = store.create_archive("  Season 1 ", at(2)).unwrap();

    store.delete_game(GameSet::Live, g1).unwrap();
    store.reset_live_games();
    store.add_game(GameSet::Live, table(), at(3)).unwrap();

    let games = store.archive_games(archive).unwrap();
    let ids: Vec<i64> = games.iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![g2, g1]);
    assert_eq!(build_leaderboard(&games).len(), 4);

    let listing = store.archives();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].name, "Season 1");
    assert_eq!(listing[0].game_count, 2);
}

#[test]
fn archive_errors() {
    let mut store = GameStore::new();
    assert_eq!(store.create_archive("   ", at(0)), Err(StoreError::EmptyArchiveName));

    let id = store.create_archive("Empty", at(0)).unwrap();
    assert!(store.archive_games(id).unwrap().is_empty());
    store.delete_archive(id).unwrap();
    let err = store.delete_archive(id).unwrap_err();
    assert_eq!(err, StoreError::ArchiveNotFound(id));
    assert!(err.is_not_found());
    assert!(store.archive_games(id).is_err());
}

#[test]
fn archives_list_newest_first() {
    let mut store = GameStore::new();
    store.create_archive("Old", at(0)).unwrap();
    store.create_archive("New", at(1)).unwrap();
    let names: Vec<String> = store.archives().into_iter().map(|a| a.name).collect();
    assert_eq!(names, vec!["New", "Old"]);
}

#[test]
fn reset_clears_live_games_only() {
    let mut store = GameStore::new();
    store.add_game(GameSet::Live, table(), at(0)).unwrap();
    store.add_game(GameSet::Live, table(), at(1)).unwrap();
    store.add_game(GameSet::Tournament, table(), at(2)).unwrap();
    assert_eq!(store.reset_live_games(), 2);
    assert!(store.list_games(GameSet::Live).is_empty());
    assert_eq!(store.list_games(GameSet::Tournament).len(), 1);
}

#[test]
fn import_skips_nameless_rows_and_keeps_bad_totals() {
    let mut store = GameStore::new();
    let rows = vec![
        ImportedGame {
            created_at: Some(at(5)),
            seats: seats(["A", "B", "C", "D"], [50000, 30000, 20000, 10000]),
        },
        ImportedGame {
            created_at: None,
            seats: seats(["", " ", "", ""], [0, 0, 0, 0]),
        },
        ImportedGame {
            created_at: None,
            seats: seats(["A", "", "", ""], [25000, 0, 0, 0]),
        },
    ];
    assert_eq!(store.import_games(rows, at(9)), 2);

    let games = store.list_games(GameSet::Live);
    assert_eq!(games.len(), 2);
    assert_eq!(games[0].created_at, at(9));
    assert_eq!(games[1].score_total(), 110000);
    assert_eq!(games[1].created_at, at(5));
}

#[test]
fn team_games_are_listed_newest_first() {
    let mut store = GameStore::new();
    let team_table = || {
        [
            TeamSeat::new(" A ", " Red ", 40000),
            TeamSeat::new("B", "Blue", 30000),
            TeamSeat::new("C", "Red", 20000),
            TeamSeat::new("D", "Blue", 10000),
        ]
    };
    let first = store.add_team_game(team_table(), at(0));
    let second = store.add_team_game(team_table(), at(1));
    let games = store.list_team_games();
    assert_eq!(games[0].id, second);
    assert_eq!(games[1].id, first);
    assert_eq!(games[0].seats[0].player_name, "A");
    assert_eq!(games[0].seats[0].team_name, "Red");
}

#[test]
fn teams_are_unique_and_listed_by_name_with_member_counts() {
    let mut store = GameStore::new();
    let red = store.add_team(" Red ").unwrap();
    store.add_team("Blue").unwrap();
    assert_eq!(
        store.add_team("Red"),
        Err(StoreError::DuplicateTeam("Red".to_string()))
    );
    assert_eq!(store.add_team("  "), Err(StoreError::EmptyTeamName));

    store.add_team_member("Red", "A", at(0)).unwrap();
    store.add_team_member("Red", "C", at(1)).unwrap();
    store.add_team_member("Blue", "B", at(2)).unwrap();

    let listing = store.teams();
    let names: Vec<&str> = listing.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Blue", "Red"]);
    assert_eq!(listing[1].id, red);
    assert_eq!(listing[1].member_count, 2);
    assert_eq!(listing[0].member_count, 1);
}

#[test]
fn team_members_filter_and_order() {
    let mut store = GameStore::new();
    store.add_team_member("Red", "C", at(0)).unwrap();
    store.add_team_member("Blue", "B", at(1)).unwrap();
    store.add_team_member(" Red ", " A ", at(2)).unwrap();
    assert_eq!(
        store.add_team_member("Red", " ", at(3)),
        Err(StoreError::MissingMemberField)
    );

    let all: Vec<(String, String)> = store
        .team_members(None)
        .into_iter()
        .map(|m| (m.team_name, m.player_name))
        .collect();
    assert_eq!(
        all,
        vec![
            ("Blue".to_string(), "B".to_string()),
            ("Red".to_string(), "A".to_string()),
            ("Red".to_string(), "C".to_string()),
        ]
    );

    let red: Vec<String> = store
        .team_members(Some("Red"))
        .into_iter()
        .map(|m| m.player_name)
        .collect();
    assert_eq!(red, vec!["A", "C"]);
    assert_eq!(store.team_members(Some("")).len(), 3);
}

#[test]
fn deleting_a_team_drops_its_members() {
    let mut store = GameStore::new();
    let red = store.add_team("Red").unwrap();
    store.add_team("Blue").unwrap();
    store.add_team_member("Red", "A", at(0)).unwrap();
    let blue_member = store.add_team_member("Blue", "B", at(1)).unwrap();

    store.delete_team(red).unwrap();
    let err = store.delete_team(red).unwrap_err();
    assert_eq!(err, StoreError::TeamNotFound(red));
    assert!(err.is_not_found());
    assert_eq!(store.teams().len(), 1);
    assert!(store.team_members(Some("Red")).is_empty());

    store.delete_team_member(blue_member).unwrap();
    let err = store.delete_team_member(blue_member).unwrap_err();
    assert_eq!(err, StoreError::MemberNotFound(blue_member));
    assert!(err.is_not_found());
}

#[test]
fn imported_team_games_feed_the_team_ranking() {
    let mut store = GameStore::new();
    let rows = vec![
        ImportedTeamGame {
            created_at: Some(at(1)),
            seats: [
                TeamSeat::new("A", " Red", 40000),
                TeamSeat::new("B", "Blue", 30000),
                TeamSeat::new("C", "Red", 20000),
                TeamSeat::new("D", "Blue", 10000),
            ],
        },
        ImportedTeamGame {
            created_at: None,
            seats: Default::default(),
        },
    ];
    assert_eq!(store.import_team_games(rows, at(9)), 2);

    let games = store.list_team_games();
    assert_eq!(games[0].created_at, at(9));
    assert_eq!(games[1].seats[0].team_name, "Red");

    let ranking = build_team_ranking(&games);
    assert_eq!(ranking.len(), 2);
    assert_eq!(ranking[0].team_name, "Red");
}
