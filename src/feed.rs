use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::refresh::FetchTicket;
use crate::state::Game;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// One network round trip to the scoreboard. Implementations must not retry
/// and must not touch caller state.
pub trait FeedSource: Send + Sync {
    fn fetch(&self) -> Result<Vec<Game>, FetchError>;
}

#[derive(Debug)]
pub struct FetchCompletion {
    pub ticket: FetchTicket,
    pub result: Result<Vec<Game>, FetchError>,
}

/// Runs fetches off the event loop and hands completions back over a channel.
pub struct Provider {
    source: Arc<dyn FeedSource>,
    tx: Sender<FetchCompletion>,
    rx: Receiver<FetchCompletion>,
}

impl Provider {
    pub fn new(source: Arc<dyn FeedSource>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { source, tx, rx }
    }

    pub fn dispatch(&self, ticket: FetchTicket) -> JoinHandle<()> {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        debug!(ticket = ticket.id, trigger = ?ticket.trigger, "dispatching fetch");
        thread::spawn(move || {
            // A panicking source still has to release the coordinator's busy flag.
            let result = panic::catch_unwind(AssertUnwindSafe(|| source.fetch()))
                .unwrap_or_else(|_| {
                    warn!(ticket = ticket.id, "feed source panicked");
                    Err(FetchError::Transport("feed worker panicked".to_string()))
                });
            let _ = tx.send(FetchCompletion { ticket, result });
        })
    }

    pub fn try_recv(&self) -> Option<FetchCompletion> {
        self.rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<FetchCompletion> {
        self.rx.recv_timeout(timeout).ok()
    }
}
