use courtside::catalog::GameCatalog;
use courtside::state::{Game, GameClass, TeamScore};

fn team(tricode: &str, name: &str, score: u32) -> TeamScore {
    TeamScore {
        team_id: format!("id-{tricode}"),
        name: name.to_string(),
        city: String::new(),
        tricode: tricode.to_string(),
        score,
        wins: 0,
        losses: 0,
    }
}

fn game(id: &str, status_code: i64) -> Game {
    Game {
        id: id.to_string(),
        code: format!("20250115/{id}"),
        status_code,
        status_text: String::new(),
        start_time_utc: String::new(),
        home: team("HOM", "Home", 0),
        away: team("AWY", "Away", 0),
    }
}

fn final_g1() -> Game {
    Game {
        home: team("MIL", "Bucks", 98),
        away: team("BOS", "Celtics", 101),
        status_text: "Final".to_string(),
        ..game("G1", 3)
    }
}

#[test]
fn first_load_records_finished_games_but_suppresses_alerts() {
    let mut catalog = GameCatalog::new();
    assert!(catalog.is_first_load());

    let plan = catalog.apply(vec![final_g1()]);
    assert!(plan.suppress_all);
    assert_eq!(plan.alerts.len(), 1);
    assert!(plan.deliverable().is_empty());
    assert!(!catalog.is_first_load());
    assert!(catalog.was_notified("G1"));
    assert_eq!(catalog.notified_ids().len(), 1);

    let plan = catalog.apply(vec![final_g1()]);
    assert!(!plan.suppress_all);
    assert!(plan.alerts.is_empty());
    assert!(plan.deliverable().is_empty());
}

#[test]
fn game_finishing_after_first_load_alerts_once() {
    let mut catalog = GameCatalog::new();
    catalog.apply(vec![game("G1", 2), game("G2", 1)]);
    assert!(catalog.notified_ids().is_empty());

    let plan = catalog.apply(vec![final_g1(), game("G2", 1)]);
    assert!(!plan.suppress_all);
    assert_eq!(plan.deliverable().len(), 1);
    let alert = &plan.deliverable()[0];
    assert_eq!(alert.game.id, "G1");
    assert_eq!(alert.title(), "Game final");
    assert_eq!(alert.body(), "Celtics 101 vs Bucks 98");

    for _ in 0..3 {
        let again = catalog.apply(vec![final_g1(), game("G2", 1)]);
        assert!(again.alerts.is_empty());
    }
}

#[test]
fn notified_ids_survive_game_leaving_snapshot() {
    let mut catalog = GameCatalog::new();
    catalog.apply(Vec::new());
    catalog.apply(vec![final_g1()]);
    catalog.apply(Vec::new());
    assert!(catalog.snapshot().is_empty());
    assert!(catalog.was_notified("G1"));

    let plan = catalog.apply(vec![final_g1()]);
    assert!(plan.alerts.is_empty());
}

#[test]
fn alert_body_falls_back_to_tricode() {
    let mut catalog = GameCatalog::new();
    catalog.apply(Vec::new());
    let mut g = final_g1();
    g.away.name = String::new();
    let plan = catalog.apply(vec![g]);
    assert_eq!(plan.deliverable()[0].body(), "BOS 101 vs Bucks 98");
}

#[test]
fn apply_replaces_snapshot_wholesale() {
    let mut catalog = GameCatalog::new();
    catalog.apply(vec![game("A", 1), game("B", 2)]);
    catalog.apply(vec![game("C", 1)]);
    let ids: Vec<&str> = catalog.snapshot().iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, ["C"]);
    assert!(catalog.updated_at().is_some());
    assert!(catalog.updated_label().is_some());
}

#[test]
fn counts_project_snapshot() {
    let mut catalog = GameCatalog::new();
    assert_eq!(catalog.counts().total, 0);
    assert_eq!(catalog.counts().summary(), "No games today");

    catalog.apply(vec![
        game("A", 2),
        game("B", 3),
        game("C", 1),
        game("D", 0),
        game("E", 2),
        game("F", 7),
    ]);
    let counts = catalog.counts();
    assert_eq!(counts.total, catalog.snapshot().len());
    assert_eq!(counts.live, 2);
    assert_eq!(counts.finished, 1);
    assert!(counts.live + counts.finished <= counts.total);
    assert_eq!(counts.summary(), "6 games today · 2 live · 1 final");
}

#[test]
fn grouped_is_stable_partition() {
    let mut catalog = GameCatalog::new();
    let snapshot = vec![
        game("F1", 3),
        game("S1", 1),
        game("L1", 2),
        game("O1", 9),
        game("F2", 3),
        game("L2", 2),
        game("S2", 1),
    ];
    catalog.apply(snapshot.clone());

    let grouped = catalog.grouped();
    let ids: Vec<&str> = grouped.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, ["L1", "L2", "S1", "O1", "S2", "F1", "F2"]);

    // Permutation of the snapshot.
    let mut sorted_grouped = ids.clone();
    sorted_grouped.sort();
    let mut sorted_snapshot: Vec<&str> = snapshot.iter().map(|g| g.id.as_str()).collect();
    sorted_snapshot.sort();
    assert_eq!(sorted_grouped, sorted_snapshot);

    let classes: Vec<GameClass> = grouped.iter().map(|g| g.class()).collect();
    let rank = |c: &GameClass| match c {
        GameClass::Live => 0,
        GameClass::Scheduled => 1,
        GameClass::Finished => 2,
    };
    assert!(classes.windows(2).all(|w| rank(&w[0]) <= rank(&w[1])));
}

#[test]
fn classification_is_exclusive() {
    for code in -1..=10 {
        let g = game("X", code);
        let flags = [g.is_live(), g.is_finished(), g.class() == GameClass::Scheduled];
        assert_eq!(flags.iter().filter(|f| **f).count(), 1, "status {code}");
    }
}

#[test]
fn status_labels() {
    let mut g = game("X", 3);
    g.status_text = "Final/OT".to_string();
    assert_eq!(g.status_label(), "Final");
    g.status_text = "7:30 pm ET".to_string();
    assert_eq!(g.status_label(), "Tip-off 7:30");
    g.status_text = "Q2 3:41".to_string();
    assert_eq!(g.status_label(), "Q2 3:41");
    g.status_text = "Game postponed".to_string();
    assert_eq!(g.status_label(), "Game postponed");
}

#[test]
fn start_time_local_requires_valid_timestamp() {
    let mut g = game("X", 1);
    assert_eq!(g.start_time_local(), None);
    g.start_time_utc = "not a time".to_string();
    assert_eq!(g.start_time_local(), None);
    g.start_time_utc = "2025-01-16T03:30:00Z".to_string();
    let local = g.start_time_local().expect("valid rfc3339");
    assert_eq!(local.len(), 5);
}
