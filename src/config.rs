use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::dock::DockConfig;
use crate::refresh::RefreshConfig;
use crate::scoreboard_fetch::NBA_SCOREBOARD_URL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Live,
    Demo,
}

/// Launch-time settings for the terminal panel, read from the environment.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    pub source: SourceKind,
    pub scoreboard_url: String,
    pub refresh: RefreshConfig,
    pub dock: DockConfig,
    pub bell: bool,
}

impl PanelConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unparsable values fall back to
    /// defaults and numbers are clamped to their allowed range.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let source = match lookup("SCOREBOARD_SOURCE")
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "demo" | "fake" => SourceKind::Demo,
            _ => SourceKind::Live,
        };
        let scoreboard_url = lookup("SCOREBOARD_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| NBA_SCOREBOARD_URL.to_string());

        let poll_secs = parsed(&lookup, "SCOREBOARD_POLL_SECS", 30u64).clamp(5, 600);
        let min_display_ms = parsed(&lookup, "REFRESH_MIN_DISPLAY_MS", 800u64).min(5000);
        let refresh = RefreshConfig {
            interval: Duration::from_secs(poll_secs),
            min_display: Duration::from_millis(min_display_ms),
        };

        let mut dock = terminal_dock_config();
        dock.edge_threshold = parsed(&lookup, "DOCK_EDGE_THRESHOLD", dock.edge_threshold).clamp(0, 20);
        dock.sliver = parsed(&lookup, "DOCK_SLIVER", dock.sliver).clamp(1, 10);
        dock.inset = parsed(&lookup, "DOCK_INSET", dock.inset).clamp(0, 40);

        let bell = match lookup("NOTIFY_BELL") {
            Some(v) => matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            ),
            None => true,
        };

        Self {
            source,
            scoreboard_url,
            refresh,
            dock,
            bell,
        }
    }
}

/// Dock geometry in terminal cells rather than pixels.
pub fn terminal_dock_config() -> DockConfig {
    DockConfig {
        edge_threshold: 3,
        sliver: 2,
        inset: 4,
        width: 44,
        collapsed_height: 14,
        expanded_height: 26,
        initial_right_margin: 2,
        initial_top: 2,
        ..DockConfig::default()
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_with(pairs: &[(&str, &str)]) -> PanelConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PanelConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config_with(&[]);
        assert_eq!(config.source, SourceKind::Live);
        assert_eq!(config.scoreboard_url, NBA_SCOREBOARD_URL);
        assert_eq!(config.refresh.interval, Duration::from_secs(30));
        assert_eq!(config.refresh.min_display, Duration::from_millis(800));
        assert_eq!(config.dock.edge_threshold, 3);
        assert_eq!(config.dock.sliver, 2);
        assert_eq!(config.dock.inset, 4);
        assert!(config.bell);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let low = config_with(&[
            ("SCOREBOARD_POLL_SECS", "1"),
            ("DOCK_EDGE_THRESHOLD", "-5"),
            ("DOCK_SLIVER", "0"),
            ("DOCK_INSET", "-1"),
        ]);
        assert_eq!(low.refresh.interval, Duration::from_secs(5));
        assert_eq!(low.dock.edge_threshold, 0);
        assert_eq!(low.dock.sliver, 1);
        assert_eq!(low.dock.inset, 0);

        let high = config_with(&[
            ("SCOREBOARD_POLL_SECS", "86400"),
            ("REFRESH_MIN_DISPLAY_MS", "60000"),
            ("DOCK_EDGE_THRESHOLD", "99"),
            ("DOCK_SLIVER", "50"),
            ("DOCK_INSET", "400"),
        ]);
        assert_eq!(high.refresh.interval, Duration::from_secs(600));
        assert_eq!(high.refresh.min_display, Duration::from_millis(5000));
        assert_eq!(high.dock.edge_threshold, 20);
        assert_eq!(high.dock.sliver, 10);
        assert_eq!(high.dock.inset, 40);
    }

    #[test]
    fn garbage_values_fall_back_to_defaults() {
        let config = config_with(&[
            ("SCOREBOARD_POLL_SECS", "soon"),
            ("REFRESH_MIN_DISPLAY_MS", "-3"),
            ("DOCK_SLIVER", "2.5"),
            ("SCOREBOARD_URL", "   "),
            ("SCOREBOARD_SOURCE", "cable"),
        ]);
        assert_eq!(config.refresh.interval, Duration::from_secs(30));
        assert_eq!(config.refresh.min_display, Duration::from_millis(800));
        assert_eq!(config.dock.sliver, 2);
        assert_eq!(config.scoreboard_url, NBA_SCOREBOARD_URL);
        assert_eq!(config.source, SourceKind::Live);
    }

    #[test]
    fn source_url_and_bell_overrides() {
        let config = config_with(&[
            ("SCOREBOARD_SOURCE", " Demo "),
            ("SCOREBOARD_URL", " http://localhost:8080/board.json "),
            ("NOTIFY_BELL", "off"),
        ]);
        assert_eq!(config.source, SourceKind::Demo);
        assert_eq!(config.scoreboard_url, "http://localhost:8080/board.json");
        assert!(!config.bell);
        assert!(config_with(&[("NOTIFY_BELL", "YES")]).bell);
    }
}
