use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::catalog::GameCatalog;
use crate::feed::{FetchCompletion, FetchError};
use crate::state::{Delta, Game};
use crate::timer::{self, OneShot, Repeating};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Periodic,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub id: u64,
    pub trigger: Trigger,
}

pub trait Notifier {
    /// Focused and not minimized; alerts are withheld then.
    fn window_attended(&self) -> bool;
    fn notify(&self, title: &str, body: &str);
}

#[derive(Debug, Clone, Copy)]
pub struct RefreshConfig {
    pub interval: Duration,
    pub min_display: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            min_display: Duration::from_millis(800),
        }
    }
}

#[derive(Debug)]
struct InFlight {
    ticket: FetchTicket,
    started_at: Instant,
}

#[derive(Debug)]
struct Held {
    ticket: FetchTicket,
    result: Result<Vec<Game>, FetchError>,
    commit: OneShot,
}

/// Never performs I/O: `tick` and `request_manual` hand out a [`FetchTicket`]
/// for the caller to dispatch, and the result comes back through `complete`.
pub struct RefreshCoordinator {
    config: RefreshConfig,
    poll: Repeating,
    in_flight: Option<InFlight>,
    held: Option<Held>,
    next_ticket: u64,
    tx: Sender<Delta>,
}

impl RefreshCoordinator {
    pub fn new(config: RefreshConfig, now: Instant, tx: Sender<Delta>) -> Self {
        Self {
            config,
            poll: Repeating::new(config.interval, now),
            in_flight: None,
            held: None,
            next_ticket: 1,
            tx,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some() || self.held.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        timer::earliest([
            Some(self.poll.deadline()),
            self.held.as_ref().and_then(|h| h.commit.deadline()),
        ])
    }

    pub fn tick(&mut self, now: Instant) -> Option<FetchTicket> {
        if !self.poll.fire_if_due(now) {
            return None;
        }
        if self.is_busy() {
            debug!("periodic refresh skipped, fetch in flight");
            return None;
        }
        Some(self.begin(Trigger::Periodic, now))
    }

    pub fn request_manual(&mut self, now: Instant) -> Option<FetchTicket> {
        if self.is_busy() {
            debug!("manual refresh ignored, fetch in flight");
            return None;
        }
        let ticket = self.begin(Trigger::Manual, now);
        let _ = self.tx.send(Delta::Refreshing(true));
        Some(ticket)
    }

    pub fn complete(
        &mut self,
        completion: FetchCompletion,
        now: Instant,
        catalog: &mut GameCatalog,
        notifier: &dyn Notifier,
    ) {
        let FetchCompletion { ticket, result } = completion;
        let Some(in_flight) = self.in_flight.take_if(|f| f.ticket == ticket) else {
            warn!(ticket = ticket.id, "completion for unknown fetch ignored");
            return;
        };

        if ticket.trigger == Trigger::Manual {
            let visible_until = in_flight.started_at + self.config.min_display;
            if now < visible_until {
                let mut commit = OneShot::default();
                commit.arm(now, visible_until - now);
                self.held = Some(Held {
                    ticket,
                    result,
                    commit,
                });
                return;
            }
        }
        self.commit(ticket, result, catalog, notifier);
    }

    /// Commits a held manual result once `min_display` has passed since it
    /// was requested; the coordinator stays busy until then.
    pub fn poll(&mut self, now: Instant, catalog: &mut GameCatalog, notifier: &dyn Notifier) {
        let due = self
            .held
            .as_mut()
            .is_some_and(|held| held.commit.fire_if_due(now));
        if !due {
            return;
        }
        if let Some(held) = self.held.take() {
            self.commit(held.ticket, held.result, catalog, notifier);
        }
    }

    fn begin(&mut self, trigger: Trigger, now: Instant) -> FetchTicket {
        let ticket = FetchTicket {
            id: self.next_ticket,
            trigger,
        };
        self.next_ticket += 1;
        self.in_flight = Some(InFlight {
            ticket,
            started_at: now,
        });
        ticket
    }

    fn commit(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Game>, FetchError>,
        catalog: &mut GameCatalog,
        notifier: &dyn Notifier,
    ) {
        match result {
            Ok(games) => {
                let plan = catalog.apply(games);
                let counts = catalog.counts();
                info!(
                    ticket = ticket.id,
                    total = counts.total,
                    live = counts.live,
                    finished = counts.finished,
                    "scoreboard updated"
                );
                let _ = self.tx.send(Delta::SetSnapshot {
                    games: catalog.grouped(),
                    counts,
                    updated_at: catalog.updated_label(),
                });

                if plan.suppress_all && !plan.alerts.is_empty() {
                    debug!(count = plan.alerts.len(), "first load, finished games recorded silently");
                }
                let attended = notifier.window_attended();
                for alert in plan.deliverable() {
                    let body = alert.body();
                    if attended {
                        debug!(game = %alert.game.id, "panel attended, alert withheld");
                        continue;
                    }
                    info!(game = %alert.game.id, %body, "game final alert");
                    notifier.notify(alert.title(), &body);
                }
            }
            Err(err) => {
                warn!(ticket = ticket.id, %err, "scoreboard fetch failed");
                let _ = self.tx.send(Delta::FetchError(err.to_string()));
            }
        }
        if ticket.trigger == Trigger::Manual {
            let _ = self.tx.send(Delta::Refreshing(false));
        }
    }
}
