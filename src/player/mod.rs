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

//! Audio playback control.
//!
//! This module provides the [`AudioPlayer`] handle through which the
//! application drives the media engine. The engine itself (MPV) lives on a
//! background worker thread; the handle only forwards [`MediaCommand`]s to it.
//! Playback state flows back the other way as application events.

mod commands;

pub(crate) use commands::MediaCommand;

use std::sync::mpsc;

use anyhow::{Context, Result};

use crate::{events::AppEvent, model::PlayerState};

/// A handle to the audio playback engine.
///
/// This struct acts as a command proxy; it does not perform audio processing
/// itself but instead sends instructions to a background worker thread.
pub(crate) struct AudioPlayer {
    /// Channel for sending commands to the background worker thread.
    command_tx: mpsc::Sender<MediaCommand>,
}

impl AudioPlayer {
    /// Spawns the audio worker thread and returns a new player handle.
    ///
    /// # Arguments
    ///
    /// * `event_tx` - A channel to send application-level events (like progress
    ///   updates or errors) back to the main event loop.
    pub(crate) fn new(event_tx: mpsc::Sender<AppEvent>) -> Result<Self> {
        let (command_tx, command_rx) = mpsc::channel::<MediaCommand>();

        commands::spawn_player_worker(command_rx, event_tx);

        Ok(Self { command_tx })
    }

    /// A handle with no worker behind it, exposing the command channel.
    #[cfg(test)]
    pub(crate) fn detached() -> (Self, mpsc::Receiver<MediaCommand>) {
        let (command_tx, command_rx) = mpsc::channel();
        (Self { command_tx }, command_rx)
    }

    // Maps internal audio backend flags to a simplified [`PlayerState`].
    fn player_state(is_paused: bool, is_idle: bool) -> PlayerState {
        if is_idle {
            PlayerState::Stopped
        } else if is_paused {
            PlayerState::Paused
        } else {
            PlayerState::Playing
        }
    }

    /// Forwards a command to the worker.
    pub(crate) fn send(&self, command: MediaCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .context("Audio player worker is not running")?;
        Ok(())
    }

    /// Adjusts the playback volume relative to the current level.
    ///
    /// # Arguments
    ///
    /// * `delta` - The amount to change the volume (positive or negative).
    pub(crate) fn adjust_volume(&self, delta: i32) -> Result<()> {
        self.send(MediaCommand::AdjustVolume(delta))
    }

    /// Toggles the audio output between muted and unmuted.
    pub(crate) fn toggle_mute(&self) -> Result<()> {
        self.send(MediaCommand::ToggleMute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_wins_over_pause_flag() {
        assert_eq!(AudioPlayer::player_state(false, true), PlayerState::Stopped);
        assert_eq!(AudioPlayer::player_state(true, true), PlayerState::Stopped);
        assert_eq!(AudioPlayer::player_state(true, false), PlayerState::Paused);
        assert_eq!(AudioPlayer::player_state(false, false), PlayerState::Playing);
    }
}
