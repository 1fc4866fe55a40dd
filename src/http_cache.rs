use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use tracing::debug;

// Validators for conditional GETs. Lives for the process only.
static CACHE: Mutex<Option<HashMap<String, CacheEntry>>> = Mutex::new(None);

#[derive(Debug, Clone)]
struct CacheEntry {
    body: String,
    etag: Option<String>,
    last_modified: Option<String>,
}

/// GETs `url`, revalidating against the last body seen for it. A 304 answer
/// returns that body again.
pub fn fetch_json_cached(client: &Client, url: &str) -> Result<String> {
    let cached_entry = {
        let guard = CACHE.lock().expect("http cache lock poisoned");
        guard.as_ref().and_then(|entries| entries.get(url).cloned())
    };

    let mut req = client.get(url);
    if let Some(entry) = cached_entry.as_ref() {
        if let Some(etag) = entry.etag.as_ref() {
            req = req.header(IF_NONE_MATCH, etag);
        }
        if let Some(last_modified) = entry.last_modified.as_ref() {
            req = req.header(IF_MODIFIED_SINCE, last_modified);
        }
    }

    let resp = req.send().context("request failed")?;
    let status = resp.status();
    let headers = resp.headers().clone();
    if status == StatusCode::NOT_MODIFIED {
        if let Some(entry) = cached_entry {
            debug!(url, "scoreboard not modified");
            return Ok(entry.body);
        }
        return Err(anyhow::anyhow!("received 304 without cache body"));
    }

    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("http {}", status));
    }

    let etag = headers
        .get(ETAG)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    let last_modified = headers
        .get(LAST_MODIFIED)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    if etag.is_some() || last_modified.is_some() {
        let entry = CacheEntry {
            body: body.clone(),
            etag,
            last_modified,
        };
        let mut guard = CACHE.lock().expect("http cache lock poisoned");
        guard
            .get_or_insert_with(HashMap::new)
            .insert(url.to_string(), entry);
    }
    Ok(body)
}
