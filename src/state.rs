use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::dock::{Animation, DockState, Geometry};

pub const STATUS_SCHEDULED: i64 = 1;
pub const STATUS_LIVE: i64 = 2;
pub const STATUS_FINISHED: i64 = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamScore {
    pub team_id: String,
    pub name: String,
    pub city: String,
    pub tricode: String,
    pub score: u32,
    pub wins: u32,
    pub losses: u32,
}

impl TeamScore {
    /// Name used in alerts and cards; falls back to the tricode when the feed
    /// leaves the team name blank.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.tricode
        } else {
            &self.name
        }
    }

    pub fn record(&self) -> String {
        format!("{}-{}", self.wins, self.losses)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub code: String,
    pub status_code: i64,
    pub status_text: String,
    pub start_time_utc: String,
    pub home: TeamScore,
    pub away: TeamScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameClass {
    Live,
    Scheduled,
    Finished,
}

impl Game {
    pub fn class(&self) -> GameClass {
        classify(self.status_code)
    }

    pub fn is_live(&self) -> bool {
        self.class() == GameClass::Live
    }

    pub fn is_finished(&self) -> bool {
        self.class() == GameClass::Finished
    }

    /// Short card label derived from the feed's status text.
    pub fn status_label(&self) -> String {
        let text = self.status_text.trim();
        if text.contains("Final") {
            return "Final".to_string();
        }
        let lower = text.to_ascii_lowercase();
        let clock = lower.trim_end_matches(" et").trim();
        let starts_numeric = clock.chars().next().is_some_and(|c| c.is_ascii_digit());
        if starts_numeric && (clock.ends_with("am") || clock.ends_with("pm")) {
            let time = clock.trim_end_matches("am").trim_end_matches("pm").trim();
            return format!("Tip-off {time}");
        }
        text.to_string()
    }

    pub fn start_time_local(&self) -> Option<String> {
        let raw = self.start_time_utc.trim();
        if raw.is_empty() {
            return None;
        }
        let parsed = DateTime::parse_from_rfc3339(raw).ok()?;
        let local = parsed.with_timezone(&Local);
        Some(local.format("%H:%M").to_string())
    }
}

pub fn classify(status_code: i64) -> GameClass {
    match status_code {
        STATUS_LIVE => GameClass::Live,
        STATUS_FINISHED => GameClass::Finished,
        _ => GameClass::Scheduled,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub total: usize,
    pub live: usize,
    pub finished: usize,
}

impl Counts {
    pub fn from_games(games: &[Game]) -> Self {
        let mut counts = Counts {
            total: games.len(),
            ..Counts::default()
        };
        for game in games {
            match game.class() {
                GameClass::Live => counts.live += 1,
                GameClass::Finished => counts.finished += 1,
                GameClass::Scheduled => {}
            }
        }
        counts
    }

    pub fn summary(&self) -> String {
        if self.total == 0 {
            return "No games today".to_string();
        }
        format!(
            "{} games today · {} live · {} final",
            self.total, self.live, self.finished
        )
    }
}

/// Messages from the core controllers to the presentation layer.
#[derive(Debug, Clone)]
pub enum Delta {
    SetSnapshot {
        games: Vec<Game>,
        counts: Counts,
        updated_at: Option<String>,
    },
    FetchError(String),
    Refreshing(bool),
    DockGeometry {
        rect: Geometry,
        animate: Option<Duration>,
    },
    DockState(DockState),
    Alert {
        title: String,
        body: String,
    },
    Log(String),
}

/// Presentation-side view of the panel, rebuilt only from [`Delta`]s.
#[derive(Debug, Clone)]
pub struct PanelState {
    pub games: Vec<Game>,
    pub counts: Counts,
    pub updated_at: Option<String>,
    pub error: Option<String>,
    pub refreshing: bool,
    pub loaded: bool,
    pub dock_state: DockState,
    pub dock_target: Geometry,
    pub dock_motion: Option<Animation>,
    pub toast: Option<Toast>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub minimized: bool,
    pub focused: bool,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub title: String,
    pub body: String,
    pub shown_at: Instant,
}

const TOAST_SECS: u64 = 3;

impl PanelState {
    pub fn new(initial: Geometry) -> Self {
        Self {
            games: Vec::new(),
            counts: Counts::default(),
            updated_at: None,
            error: None,
            refreshing: false,
            loaded: false,
            dock_state: DockState::Visible,
            dock_target: initial,
            dock_motion: None,
            toast: None,
            logs: VecDeque::new(),
            help_overlay: false,
            minimized: false,
            focused: true,
        }
    }

    /// Whether the user can currently see the panel; alerts are only
    /// delivered while this is false.
    pub fn attended(&self) -> bool {
        self.focused && !self.minimized
    }

    pub fn panel_rect(&self, now: Instant) -> Geometry {
        match &self.dock_motion {
            Some(motion) => motion.sample(now),
            None => self.dock_target,
        }
    }

    pub fn status_line(&self) -> String {
        if self.refreshing {
            return "Refreshing...".to_string();
        }
        if let Some(err) = &self.error {
            return format!("Error: {err}");
        }
        if !self.loaded {
            return "Loading...".to_string();
        }
        self.counts.summary()
    }

    pub fn expire_toast(&mut self, now: Instant) {
        if let Some(toast) = &self.toast
            && now.duration_since(toast.shown_at) >= Duration::from_secs(TOAST_SECS)
        {
            self.toast = None;
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

pub fn apply_delta(state: &mut PanelState, delta: Delta) {
    match delta {
        Delta::SetSnapshot {
            games,
            counts,
            updated_at,
        } => {
            state.games = games;
            state.counts = counts;
            state.updated_at = updated_at;
            state.error = None;
            state.loaded = true;
        }
        Delta::FetchError(message) => {
            state.push_log(format!("[WARN] Fetch failed: {message}"));
            state.error = Some(message);
        }
        Delta::Refreshing(active) => state.refreshing = active,
        Delta::DockGeometry { rect, animate } => {
            let now = Instant::now();
            state.dock_motion = animate.map(|duration| Animation {
                from: state.panel_rect(now),
                to: rect,
                started: now,
                duration,
            });
            state.dock_target = rect;
        }
        Delta::DockState(dock_state) => state.dock_state = dock_state,
        Delta::Alert { title, body } => {
            state.push_log(format!("[INFO] {title}: {body}"));
            state.toast = Some(Toast {
                title,
                body,
                shown_at: Instant::now(),
            });
        }
        Delta::Log(line) => state.push_log(line),
    }
}
