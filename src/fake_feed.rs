use std::sync::{Mutex, PoisonError};

use chrono::{Duration as ChronoDuration, Utc};
use rand::Rng;

use crate::feed::{FeedSource, FetchError};
use crate::state::{Game, STATUS_FINISHED, STATUS_LIVE, STATUS_SCHEDULED, TeamScore};

const DROP_RATE: f64 = 0.05;
const TIP_OFF_RATE: f64 = 0.3;
const POLLS_PER_PERIOD: u8 = 3;
const PERIODS: u8 = 4;

const TEAMS: &[(&str, &str, &str, &str)] = &[
    ("1610612747", "LAL", "Los Angeles", "Lakers"),
    ("1610612738", "BOS", "Boston", "Celtics"),
    ("1610612744", "GSW", "Golden State", "Warriors"),
    ("1610612749", "MIL", "Milwaukee", "Bucks"),
    ("1610612743", "DEN", "Denver", "Nuggets"),
    ("1610612748", "MIA", "Miami", "Heat"),
    ("1610612752", "NYK", "New York", "Knicks"),
    ("1610612756", "PHX", "Phoenix", "Suns"),
    ("1610612760", "OKC", "Oklahoma City", "Thunder"),
    ("1610612750", "MIN", "Minnesota", "Timberwolves"),
    ("1610612755", "PHI", "Philadelphia", "76ers"),
    ("1610612742", "DAL", "Dallas", "Mavericks"),
];

#[derive(Debug, Clone)]
struct DemoGame {
    game: Game,
    period: u8,
    polls: u8,
}

/// Offline scoreboard: a fixed slate that advances a little on every fetch
/// and occasionally drops a request.
pub struct DemoFeed {
    slate: Mutex<Vec<DemoGame>>,
}

impl Default for DemoFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoFeed {
    pub fn new() -> Self {
        let mut rng = rand::thread_rng();
        let today = Utc::now().format("%Y%m%d").to_string();
        let slate = TEAMS
            .chunks(2)
            .enumerate()
            .map(|(idx, pair)| {
                let (away, home) = (team(pair[0], &mut rng), team(pair[1], &mut rng));
                let mut demo = DemoGame {
                    game: Game {
                        id: format!("00224{:05}", idx + 1),
                        code: format!("{today}/{}{}", away.tricode, home.tricode),
                        status_code: STATUS_SCHEDULED,
                        status_text: format!("{}:00 pm ET", 7 + idx),
                        start_time_utc: (Utc::now() + ChronoDuration::hours(idx as i64))
                            .format("%Y-%m-%dT%H:00:00Z")
                            .to_string(),
                        home,
                        away,
                    },
                    period: 0,
                    polls: 0,
                };
                match idx {
                    0 => finish(&mut demo, &mut rng),
                    1 => tip_off(&mut demo),
                    _ => {}
                }
                demo
            })
            .collect();
        Self {
            slate: Mutex::new(slate),
        }
    }
}

impl FeedSource for DemoFeed {
    fn fetch(&self) -> Result<Vec<Game>, FetchError> {
        let mut rng = rand::thread_rng();
        if rng.gen_bool(DROP_RATE) {
            return Err(FetchError::Transport("demo feed dropped the request".to_string()));
        }
        let mut slate = self.slate.lock().unwrap_or_else(PoisonError::into_inner);
        for demo in slate.iter_mut() {
            advance(demo, &mut rng);
        }
        Ok(slate.iter().map(|demo| demo.game.clone()).collect())
    }
}

fn team(entry: (&str, &str, &str, &str), rng: &mut impl Rng) -> TeamScore {
    let (team_id, tricode, city, name) = entry;
    let wins = rng.gen_range(5..40);
    TeamScore {
        team_id: team_id.to_string(),
        name: name.to_string(),
        city: city.to_string(),
        tricode: tricode.to_string(),
        score: 0,
        wins,
        losses: rng.gen_range(5..40),
    }
}

fn advance(demo: &mut DemoGame, rng: &mut impl Rng) {
    match demo.game.status_code {
        STATUS_SCHEDULED => {
            if rng.gen_bool(TIP_OFF_RATE) {
                tip_off(demo);
            }
        }
        STATUS_LIVE => {
            demo.game.home.score += rng.gen_range(0..=7);
            demo.game.away.score += rng.gen_range(0..=7);
            demo.polls += 1;
            if demo.polls >= POLLS_PER_PERIOD {
                demo.polls = 0;
                demo.period += 1;
            }
            if demo.period > PERIODS && demo.game.home.score != demo.game.away.score {
                demo.game.status_code = STATUS_FINISHED;
                demo.game.status_text = "Final".to_string();
            } else {
                set_clock(demo);
            }
        }
        _ => {}
    }
}

fn tip_off(demo: &mut DemoGame) {
    demo.game.status_code = STATUS_LIVE;
    demo.period = 1;
    demo.polls = 0;
    set_clock(demo);
}

fn finish(demo: &mut DemoGame, rng: &mut impl Rng) {
    demo.game.home.score = rng.gen_range(95..125);
    demo.game.away.score = demo.game.home.score + rng.gen_range(1..12);
    demo.game.status_code = STATUS_FINISHED;
    demo.game.status_text = "Final".to_string();
    demo.period = PERIODS;
}

fn set_clock(demo: &mut DemoGame) {
    let minutes = 12 - u32::from(demo.polls) * 4;
    demo.game.status_text = if demo.period > PERIODS {
        format!("OT {minutes}:00")
    } else {
        format!("Q{} {minutes}:00", demo.period)
    };
}
