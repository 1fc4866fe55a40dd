use std::collections::HashSet;

use chrono::{DateTime, Local};

use crate::state::{Counts, Game, GameClass};

pub const ALERT_TITLE: &str = "Game final";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAlert {
    pub game: Game,
}

impl PendingAlert {
    pub fn title(&self) -> &'static str {
        ALERT_TITLE
    }

    pub fn body(&self) -> String {
        let away = &self.game.away;
        let home = &self.game.home;
        format!(
            "{} {} vs {} {}",
            away.display_name(),
            away.score,
            home.display_name(),
            home.score
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertPlan {
    pub alerts: Vec<PendingAlert>,
    /// First successful load: recorded, never announced.
    pub suppress_all: bool,
}

impl AlertPlan {
    pub fn deliverable(&self) -> &[PendingAlert] {
        if self.suppress_all {
            &[]
        } else {
            &self.alerts
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameCatalog {
    snapshot: Vec<Game>,
    notified_ids: HashSet<String>,
    first_load: bool,
    updated_at: Option<DateTime<Local>>,
}

impl Default for GameCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl GameCatalog {
    pub fn new() -> Self {
        Self {
            snapshot: Vec::new(),
            notified_ids: HashSet::new(),
            first_load: true,
            updated_at: None,
        }
    }

    /// Replaces the snapshot wholesale and returns the finished games that
    /// have not been considered before.
    pub fn apply(&mut self, snapshot: Vec<Game>) -> AlertPlan {
        let suppress_all = self.first_load;
        let mut alerts = Vec::new();
        for game in snapshot.iter().filter(|g| g.is_finished()) {
            if self.notified_ids.insert(game.id.clone()) {
                alerts.push(PendingAlert { game: game.clone() });
            }
        }
        self.snapshot = snapshot;
        self.first_load = false;
        self.updated_at = Some(Local::now());
        AlertPlan {
            alerts,
            suppress_all,
        }
    }

    pub fn snapshot(&self) -> &[Game] {
        &self.snapshot
    }

    pub fn counts(&self) -> Counts {
        Counts::from_games(&self.snapshot)
    }

    pub fn grouped(&self) -> Vec<Game> {
        let mut grouped = Vec::with_capacity(self.snapshot.len());
        for class in [GameClass::Live, GameClass::Scheduled, GameClass::Finished] {
            grouped.extend(self.snapshot.iter().filter(|g| g.class() == class).cloned());
        }
        grouped
    }

    pub fn is_first_load(&self) -> bool {
        self.first_load
    }

    pub fn was_notified(&self, id: &str) -> bool {
        self.notified_ids.contains(id)
    }

    pub fn notified_ids(&self) -> &HashSet<String> {
        &self.notified_ids
    }

    pub fn updated_at(&self) -> Option<DateTime<Local>> {
        self.updated_at
    }

    pub fn updated_label(&self) -> Option<String> {
        self.updated_at.map(|at| at.format("%H:%M:%S").to_string())
    }
}
