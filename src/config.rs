//! Application-level configuration loading: round pacing and music catalog settings.

use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::deck::DeckSettings;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "ROULEN_GAMOS_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
/// Immutable runtime configuration shared across the application.
///
/// Every field is optional in the JSON file; omitted values keep their built-in default.
pub struct AppConfig {
    /// Seconds a round stays open for guesses.
    pub round_duration_secs: u32,
    /// Delay between the `game_starting` signal and the first round.
    pub starting_delay_ms: u64,
    /// Delay between a round ending and the next round (or the final scores).
    pub round_end_delay_ms: u64,
    /// Maximum number of rounds drawn for one game.
    pub max_rounds: usize,
    /// Minimum number of players required to start a game.
    pub min_players: usize,
    /// How many shuffled candidates are checked against the catalog per game.
    pub verification_window: usize,
    /// Albums with fewer tracks than this are considered placeholders and skipped.
    pub min_album_tracks: u32,
    /// Base URL of the music catalog API.
    pub catalog_base_url: String,
    /// Listening-history account the round pool is sourced from.
    pub reference_user_id: String,
    /// Upper bound of tracks requested from the reference account.
    pub track_fetch_limit: u32,
    /// Per-request timeout applied to catalog calls.
    pub catalog_timeout_ms: u64,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        Self::load_from(&resolve_config_path())
    }

    /// Load the configuration stored at `path`, falling back to defaults when the file is
    /// missing or invalid.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_json_str(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document into a configuration.
    pub fn from_json_str(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str(contents)
    }

    /// Delay before the first round once the deck is ready.
    pub fn starting_delay(&self) -> Duration {
        Duration::from_millis(self.starting_delay_ms)
    }

    /// Delay before advancing after a round ended.
    pub fn round_end_delay(&self) -> Duration {
        Duration::from_millis(self.round_end_delay_ms)
    }

    /// Timeout applied to each catalog HTTP request.
    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_millis(self.catalog_timeout_ms)
    }

    /// Deck construction parameters derived from this configuration.
    pub fn deck_settings(&self) -> DeckSettings {
        DeckSettings {
            max_rounds: self.max_rounds,
            verification_window: self.verification_window,
            min_album_tracks: self.min_album_tracks,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            round_duration_secs: 20,
            starting_delay_ms: 1_500,
            round_end_delay_ms: 3_000,
            max_rounds: 30,
            min_players: 2,
            verification_window: 50,
            min_album_tracks: 3,
            catalog_base_url: "https://api.deezer.com".into(),
            reference_user_id: "5654460941".into(),
            track_fetch_limit: 2_000,
            catalog_timeout_ms: 10_000,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
