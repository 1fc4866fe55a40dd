use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::feed::{FeedSource, FetchError};
use crate::http_cache::fetch_json_cached;
use crate::http_client::http_client;
use crate::state::{Game, TeamScore};

pub const NBA_SCOREBOARD_URL: &str =
    "https://cdn.nba.com/static/json/liveData/scoreboard/todaysScoreboard_00.json";

/// Upper bound on one scoreboard round trip, connect through body.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// A game entry that was skipped; the rest of the batch is unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    pub index: usize,
    pub message: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "game #{}: {}", self.index, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParsedScoreboard {
    pub games: Vec<Game>,
    pub warnings: Vec<ParseWarning>,
}

pub struct ScoreboardFeed {
    url: String,
}

impl ScoreboardFeed {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for ScoreboardFeed {
    fn default() -> Self {
        Self::new(NBA_SCOREBOARD_URL)
    }
}

impl FeedSource for ScoreboardFeed {
    fn fetch(&self) -> Result<Vec<Game>, FetchError> {
        let client = http_client().map_err(|err| FetchError::Transport(format!("{err:#}")))?;
        let body = fetch_json_cached(client, &self.url)
            .map_err(|err| FetchError::Transport(format!("{err:#}")))?;
        let parsed = parse_scoreboard_json(&body)?;
        for warning in &parsed.warnings {
            warn!(%warning, "skipped scoreboard entry");
        }
        Ok(parsed.games)
    }
}

#[derive(Debug, Deserialize)]
struct ScoreboardResponse {
    #[serde(default)]
    scoreboard: Option<ScoreboardBody>,
}

#[derive(Debug, Deserialize)]
struct ScoreboardBody {
    #[serde(default)]
    games: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct RawGame {
    #[serde(rename = "gameId", default, deserialize_with = "lenient_string")]
    game_id: String,
    #[serde(rename = "gameCode", default, deserialize_with = "lenient_string")]
    game_code: String,
    #[serde(rename = "gameStatus", default, deserialize_with = "lenient_i64")]
    game_status: i64,
    #[serde(rename = "gameStatusText", default, deserialize_with = "lenient_string")]
    game_status_text: String,
    #[serde(rename = "gameTimeUTC", default, deserialize_with = "lenient_string")]
    game_time_utc: String,
    #[serde(rename = "homeTeam", default)]
    home_team: Option<RawTeam>,
    #[serde(rename = "awayTeam", default)]
    away_team: Option<RawTeam>,
}

#[derive(Debug, Deserialize)]
struct RawTeam {
    #[serde(rename = "teamId", default, deserialize_with = "lenient_string")]
    team_id: String,
    #[serde(rename = "teamName", default, deserialize_with = "lenient_string")]
    team_name: String,
    #[serde(rename = "teamCity", default, deserialize_with = "lenient_string")]
    team_city: String,
    #[serde(rename = "teamTricode", default, deserialize_with = "lenient_string")]
    team_tricode: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    score: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    wins: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    losses: u32,
}

impl From<RawTeam> for TeamScore {
    fn from(raw: RawTeam) -> Self {
        TeamScore {
            team_id: raw.team_id,
            name: raw.team_name,
            city: raw.team_city,
            tricode: raw.team_tricode,
            score: raw.score,
            wins: raw.wins,
            losses: raw.losses,
        }
    }
}

/// Parses a scoreboard document. Only a body that is not a JSON object (or
/// whose game list is not an array) fails; bad entries become warnings.
pub fn parse_scoreboard_json(raw: &str) -> Result<ParsedScoreboard, FetchError> {
    let root: Value = serde_json::from_str(raw.trim())
        .map_err(|err| FetchError::Parse(format!("invalid scoreboard json: {err}")))?;
    if !root.is_object() {
        return Err(FetchError::Parse("scoreboard response is not an object".to_string()));
    }
    let response: ScoreboardResponse = serde_json::from_value(root)
        .map_err(|err| FetchError::Parse(format!("unexpected scoreboard shape: {err}")))?;
    let entries = response
        .scoreboard
        .and_then(|body| body.games)
        .unwrap_or_default();

    let mut parsed = ParsedScoreboard::default();
    let mut seen = HashSet::new();
    for (index, entry) in entries.into_iter().enumerate() {
        match parse_game(entry) {
            Ok(game) => {
                if !seen.insert(game.id.clone()) {
                    parsed.warnings.push(ParseWarning {
                        index,
                        message: format!("duplicate game id {}", game.id),
                    });
                    continue;
                }
                parsed.games.push(game);
            }
            Err(message) => parsed.warnings.push(ParseWarning { index, message }),
        }
    }
    Ok(parsed)
}

fn parse_game(entry: Value) -> Result<Game, String> {
    let raw: RawGame = serde_json::from_value(entry).map_err(|err| err.to_string())?;
    if raw.game_id.trim().is_empty() {
        return Err("missing gameId".to_string());
    }
    Ok(Game {
        id: raw.game_id,
        code: raw.game_code,
        status_code: raw.game_status,
        status_text: raw.game_status_text,
        start_time_utc: raw.game_time_utc,
        home: raw.home_team.map(TeamScore::from).unwrap_or_default(),
        away: raw.away_team.map(TeamScore::from).unwrap_or_default(),
    })
}

// The CDN sends ids as numbers in some payloads and strings in others.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string, found {other}"
        ))),
    }
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_is_bounded_to_ten_seconds() {
        assert_eq!(FETCH_TIMEOUT, Duration::from_secs(10));
    }

    #[test]
    fn numeric_team_id_becomes_string() {
        let raw = r#"{"scoreboard":{"games":[
            {"gameId":"G1","gameStatus":2,"homeTeam":{"teamId":1610612738,"score":null}}
        ]}}"#;
        let parsed = parse_scoreboard_json(raw).expect("valid document");
        assert_eq!(parsed.games[0].home.team_id, "1610612738");
        assert_eq!(parsed.games[0].home.score, 0);
        assert_eq!(parsed.games[0].away, TeamScore::default());
    }

    #[test]
    fn negative_score_skips_only_that_game() {
        let raw = r#"{"scoreboard":{"games":[
            {"gameId":"G1","awayTeam":{"score":-4}},
            {"gameId":"G2"}
        ]}}"#;
        let parsed = parse_scoreboard_json(raw).expect("valid document");
        assert_eq!(parsed.games.len(), 1);
        assert_eq!(parsed.games[0].id, "G2");
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].index, 0);
    }
}
