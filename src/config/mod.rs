// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Application configuration.
//!
//! This module manages the application configuration file.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{Source, TrackRef};

const CONFIG_NAME: &str = "meting-mini";

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,

    /// Base URL of the provider metadata service.
    pub metadata_api: String,
    /// URL of the stream lookup service.
    pub stream_api: String,
    pub default_source: Source,

    /// Initial playlist, as `"<id>"` or `"<source>:<id>"` entries.
    pub playlist: Vec<String>,

    /// Start playing the next track when the previous one finished.
    pub autoplay_next: bool,

    pub request_timeout_secs: u64,
    pub log_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            metadata_api: "https://api.i-meto.com/meting/api".to_string(),
            stream_api: "http://localhost:2323/api/netease/song".to_string(),
            default_source: Source::Netease,
            playlist: vec![],
            autoplay_next: false,
            request_timeout_secs: 10,
            log_dir: ".logs".to_string(),
        }
    }
}

impl AppConfig {
    /// Parses the configured playlist, skipping (and logging) bad entries.
    pub fn playlist_tracks(&self) -> Vec<TrackRef> {
        self.playlist
            .iter()
            .filter_map(|entry| match TrackRef::parse_with_default(entry, self.default_source) {
                Ok(track) => Some(track),
                Err(e) => {
                    warn!(entry = %entry, error = %e, "skipping playlist entry");
                    None
                }
            })
            .collect()
    }
}

/// Loads the configuration file, falling back to defaults if it cannot be
/// read or parsed.
///
/// Logging depends on the configuration, so the load error is handed back
/// for the caller to report once logging is running.
pub fn load_config() -> (AppConfig, Option<String>) {
    config_or_default(confy::load(CONFIG_NAME, None))
}

fn config_or_default<E: std::fmt::Display>(loaded: Result<AppConfig, E>) -> (AppConfig, Option<String>) {
    match loaded {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playlist_entries_use_default_source() {
        let config = AppConfig {
            default_source: Source::Kugou,
            playlist: vec!["101".into(), "tencent:202".into(), "nope".into()],
            ..AppConfig::default()
        };

        assert_eq!(
            config.playlist_tracks(),
            vec![
                TrackRef::with_source(101, Source::Kugou),
                TrackRef::with_source(202, Source::Tencent),
            ]
        );
    }

    #[test]
    fn unreadable_config_keeps_the_error() {
        let (config, error) = config_or_default::<String>(Err("bad toml at line 3".to_string()));

        assert_eq!(error.as_deref(), Some("bad toml at line 3"));
        assert!(!config.autoplay_next);
        assert_eq!(config.log_dir, ".logs");

        let (_, error) = config_or_default::<String>(Ok(AppConfig::default()));
        assert!(error.is_none());
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"autoplay_next": true}"#).unwrap();

        assert!(config.autoplay_next);
        assert_eq!(config.metadata_api, "https://api.i-meto.com/meting/api");
        assert_eq!(config.default_source, Source::Netease);
        assert_eq!(config.request_timeout_secs, 10);
    }
}
