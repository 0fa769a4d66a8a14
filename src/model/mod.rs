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

//! Domain models and core data structures.
//!
//! This module defines the central entities of the player: the references to
//! tracks held in a playlist, the fully resolved playable metadata for one
//! track, and the playback state observed from the media engine.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The metadata provider a track identifier belongs to.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[default]
    Netease,
    Tencent,
    Kugou,
    Xiami,
    Baidu,
}

impl Source {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Source::Netease => "netease",
            Source::Tencent => "tencent",
            Source::Kugou => "kugou",
            Source::Xiami => "xiami",
            Source::Baidu => "baidu",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseTrackRefError {
    #[error("unknown source '{0}'")]
    UnknownSource(String),
    #[error("invalid track id '{0}'")]
    InvalidId(String),
}

impl FromStr for Source {
    type Err = ParseTrackRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "netease" => Ok(Source::Netease),
            "tencent" => Ok(Source::Tencent),
            "kugou" => Ok(Source::Kugou),
            "xiami" => Ok(Source::Xiami),
            "baidu" => Ok(Source::Baidu),
            _ => Err(ParseTrackRefError::UnknownSource(s.to_string())),
        }
    }
}

/// An entry in the playlist: a provider track id plus the provider it comes
/// from.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct TrackRef {
    pub(crate) id: u64,
    pub(crate) source: Source,
}

impl TrackRef {
    #[cfg(test)]
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id,
            source: Source::default(),
        }
    }

    pub(crate) fn with_source(id: u64, source: Source) -> Self {
        Self { id, source }
    }

    /// Parses `"<id>"` or `"<source>:<id>"`, using `default_source` when no
    /// source prefix is given.
    pub(crate) fn parse_with_default(s: &str, default_source: Source) -> Result<Self, ParseTrackRefError> {
        let s = s.trim();
        let (source, id) = match s.split_once(':') {
            Some((source, id)) => (source.parse()?, id),
            None => (default_source, s),
        };

        let id = id
            .trim()
            .parse::<u64>()
            .map_err(|_| ParseTrackRefError::InvalidId(id.to_string()))?;

        Ok(Self::with_source(id, source))
    }
}

impl FromStr for TrackRef {
    type Err = ParseTrackRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_default(s, Source::default())
    }
}

impl fmt::Display for TrackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.id)
    }
}

/// Fully hydrated playable metadata for one track.
///
/// Replaced wholesale each time a resolution is applied, never mutated in
/// place.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ResolvedTrack {
    pub(crate) id: u64,
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) lyrics_url: Option<String>,
    pub(crate) cover_url: Option<String>,
    pub(crate) stream_url: Option<String>,
}

/// Playback status reported by the media engine.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) enum PlayerState {
    Playing,
    Paused,
    #[default]
    Stopped,
}

impl PlayerState {
    pub(crate) fn is_paused(&self) -> bool {
        !matches!(self, PlayerState::Playing)
    }
}

/// Playback state as last observed from the media engine.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct PlaybackState {
    pub(crate) state: PlayerState,
    pub(crate) time: f64,
    pub(crate) duration: f64,
    pub(crate) volume: Option<u32>,
}

impl PlaybackState {
    /// Progress through the current track in the range `0.0..=1.0`.
    pub(crate) fn position(&self) -> f64 {
        if self.duration > 0.0 {
            (self.time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_id_with_default_source() {
        let track: TrackRef = "101".parse().unwrap();
        assert_eq!(track, TrackRef::new(101));
        assert_eq!(track.source, Source::Netease);
    }

    #[test]
    fn parses_source_prefixed_id() {
        let track: TrackRef = "Tencent:202".parse().unwrap();
        assert_eq!(track, TrackRef::with_source(202, Source::Tencent));
        assert_eq!(track.to_string(), "tencent:202");
    }

    #[test]
    fn rejects_bad_track_refs() {
        assert_eq!(
            "spotify:1".parse::<TrackRef>(),
            Err(ParseTrackRefError::UnknownSource("spotify".to_string()))
        );
        assert_eq!(
            "abc".parse::<TrackRef>(),
            Err(ParseTrackRefError::InvalidId("abc".to_string()))
        );
    }

    #[test]
    fn position_is_clamped() {
        let mut state = PlaybackState::default();
        assert_eq!(state.position(), 0.0);

        state.duration = 100.0;
        state.time = 25.0;
        assert_eq!(state.position(), 0.25);

        state.time = 150.0;
        assert_eq!(state.position(), 1.0);
    }

    #[test]
    fn only_playing_is_unpaused() {
        assert!(!PlayerState::Playing.is_paused());
        assert!(PlayerState::Paused.is_paused());
        assert!(PlayerState::Stopped.is_paused());
    }
}
