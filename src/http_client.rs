use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

use crate::scoreboard_fetch::FETCH_TIMEOUT;

const USER_AGENT: &str = concat!("courtside/", env!("CARGO_PKG_VERSION"));

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared client for scoreboard requests; every request is bounded by
/// [`FETCH_TIMEOUT`].
pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("build scoreboard http client")
    })
}
