use std::fs;
use std::path::PathBuf;

use courtside::feed::FetchError;
use courtside::scoreboard_fetch::parse_scoreboard_json;
use courtside::state::GameClass;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_scoreboard_fixture() {
    let raw = read_fixture("todays_scoreboard.json");
    let parsed = parse_scoreboard_json(&raw).expect("fixture should parse");

    let ids: Vec<&str> = parsed.games.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, ["0022400571", "0022400572", "0022400565", "0022400573"]);

    let live = &parsed.games[0];
    assert_eq!(live.class(), GameClass::Live);
    assert_eq!(live.code, "20250115/PHIGSW");
    assert_eq!(live.home.team_id, "1610612744");
    assert_eq!(live.home.tricode, "GSW");
    assert_eq!(live.home.score, 77);
    assert_eq!(live.away.name, "76ers");
    assert_eq!(live.away.wins, 15);

    let finished = &parsed.games[2];
    assert_eq!(finished.class(), GameClass::Finished);
    assert_eq!(finished.away.score, 101);
    assert_eq!(finished.home.score, 98);
}

#[test]
fn missing_fields_default() {
    let raw = read_fixture("todays_scoreboard.json");
    let parsed = parse_scoreboard_json(&raw).expect("fixture should parse");

    let scheduled = &parsed.games[1];
    assert_eq!(scheduled.class(), GameClass::Scheduled);
    assert_eq!(scheduled.home.score, 0);
    assert_eq!(scheduled.away.score, 0);

    let postponed = &parsed.games[3];
    assert_eq!(postponed.status_code, 5);
    assert_eq!(postponed.class(), GameClass::Scheduled);
    assert_eq!(postponed.home.name, "");
    assert_eq!(postponed.home.team_id, "1610612757");
    assert_eq!(postponed.start_time_utc, "");
    assert_eq!(postponed.away.losses, 0);
}

#[test]
fn malformed_and_duplicate_entries_become_warnings() {
    let raw = read_fixture("todays_scoreboard.json");
    let parsed = parse_scoreboard_json(&raw).expect("fixture should parse");

    let skipped: Vec<usize> = parsed.warnings.iter().map(|w| w.index).collect();
    assert_eq!(skipped, [3, 4]);
    assert!(parsed.warnings[1].message.contains("duplicate"));
}

#[test]
fn entry_without_id_is_skipped() {
    let raw = r#"{"scoreboard":{"games":[{"gameStatus":3},{"gameId":"G2","gameStatus":1}]}}"#;
    let parsed = parse_scoreboard_json(raw).expect("document should parse");
    assert_eq!(parsed.games.len(), 1);
    assert_eq!(parsed.games[0].id, "G2");
    assert_eq!(parsed.warnings.len(), 1);
}

#[test]
fn missing_game_list_is_empty() {
    let parsed = parse_scoreboard_json(r#"{"scoreboard":{}}"#).expect("should parse");
    assert!(parsed.games.is_empty());
    let parsed = parse_scoreboard_json(r#"{"meta":{}}"#).expect("should parse");
    assert!(parsed.games.is_empty());
}

#[test]
fn structurally_invalid_documents_fail() {
    for raw in ["", "null", "[1,2]", "<html>503</html>", r#"{"scoreboard":{"games":{}}}"#] {
        let err = parse_scoreboard_json(raw).expect_err("should fail");
        assert!(matches!(err, FetchError::Parse(_)), "{raw}: {err:?}");
    }
}
