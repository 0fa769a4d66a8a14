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

//! MPV-backed media engine and event processing.
//!
//! The engine operates using a dual-channel communication pattern:
//! 1. **Command Channel**: Receives [`MediaCommand`]s to load a stream and
//!    control playback (play, pause, absolute seek and so on).
//! 2. **Event Channel**: Broadcasts [`AppEvent`]s to notify the application of
//!    observed state changes: paused/idle state, elapsed time, duration,
//!    volume and track completion.

use anyhow::{Context, Result};
use mpv::Format;
use std::{
    sync::mpsc::{self, Receiver, Sender},
    thread,
};
use tracing::{debug, error, warn};

use crate::{events::AppEvent, model::PlayerState, player::AudioPlayer};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MediaCommand {
    /// Replace the current stream. The track starts paused unless `autoplay`.
    Load { url: String, autoplay: bool },
    Play,
    Pause,
    /// Absolute seek, in seconds.
    Seek(f64),
    Stop,
    AdjustVolume(i32),
    ToggleMute,
}

impl MediaCommand {
    /// Whether mpv refusing this command leaves the engine usable. A seek is
    /// refused while no file is loaded, for instance.
    pub(crate) fn is_recoverable(&self) -> bool {
        matches!(self, MediaCommand::Seek(_))
    }
}

/// Spawns the audio worker thread to process playback commands.
///
/// If the internal worker returns an error, it is caught here and broadcast as
/// a fatal application event.
pub(crate) fn spawn_player_worker(command_rx: Receiver<MediaCommand>, event_tx: Sender<AppEvent>) {
    let error_tx = event_tx.clone();

    thread::spawn(move || {
        if let Err(e) = audio_player_worker(command_rx, event_tx) {
            error!(error = ?e, "media worker failed");
            let _ = error_tx.send(AppEvent::FatalError(format!("MPV worker failure: {:?}", e)));
        }
    });
}

/// The primary execution loop for the audio player backend.
///
/// Initializes a local `libmpv` context, then alternates between draining
/// incoming commands and waiting briefly for MPV events.
///
/// # Errors
///
/// Returns an error if the MPV context fails to initialize or if a command or
/// event cannot be processed.
fn audio_player_worker(command_rx: Receiver<MediaCommand>, event_tx: Sender<AppEvent>) -> Result<()> {
    let mut handler = (|| {
        let mut builder = mpv::MpvHandlerBuilder::new().context("Failed to create MPV builder")?;
        builder
            .set_option("vo", "null")
            .context("Failed to set no video output")?;
        builder.build().context("Failed to build MPV handler")
    })()?;

    handler
        .observe_property::<f64>("duration", 0)
        .context("Failed to observe duration")?;
    handler
        .observe_property::<bool>("pause", 0)
        .context("Failed to observe pause")?;
    handler
        .observe_property::<f64>("time-pos", 0)
        .context("Failed to observe time-pos")?;
    handler
        .observe_property::<f64>("volume", 0)
        .context("Failed to observe volume")?;
    handler
        .observe_property::<bool>("idle-active", 0)
        .context("Failed to observe idle-active")?;

    let mut is_paused = true;
    let mut is_idle = true;

    let mut player_state = PlayerState::Stopped;

    loop {
        if !process_commands(&mut handler, &command_rx)? {
            debug!("media command channel closed");
            return Ok(());
        }
        process_mpv_events(
            &mut handler,
            &mut is_paused,
            &mut is_idle,
            &mut player_state,
            &event_tx,
        )?;
    }
}

/// Drains and executes all pending commands.
///
/// Returns `false` once the command channel has been closed.
fn process_commands(handler: &mut mpv::MpvHandler, command_rx: &Receiver<MediaCommand>) -> Result<bool> {
    loop {
        let command = match command_rx.try_recv() {
            Ok(command) => command,
            Err(mpsc::TryRecvError::Empty) => return Ok(true),
            Err(mpsc::TryRecvError::Disconnected) => return Ok(false),
        };

        debug!(?command, "media command");

        match execute_command(handler, &command) {
            Err(e) if command.is_recoverable() => warn!(?command, error = ?e, "media command refused"),
            result => result?,
        }
    }
}

fn execute_command(handler: &mut mpv::MpvHandler, command: &MediaCommand) -> Result<()> {
    match command {
        MediaCommand::Load { url, autoplay } => {
            handler.set_property("pause", !*autoplay)?;
            handler
                .command(&["loadfile", url.as_str(), "replace"])
                .context(format!("Failed to load stream: {}", url))?;
        }
        MediaCommand::Play => {
            handler.set_property("pause", false)?;
        }
        MediaCommand::Pause => {
            handler.set_property("pause", true)?;
        }
        MediaCommand::Seek(seconds) => {
            handler.command(&["seek", &seconds.to_string(), "absolute"])?;
        }
        MediaCommand::Stop => {
            handler.command(&["stop"])?;
        }
        MediaCommand::AdjustVolume(delta) => {
            handler.command(&["add", "volume", &delta.to_string()])?;
        }
        MediaCommand::ToggleMute => {
            handler.command(&["cycle", "mute"])?;
        }
    }

    Ok(())
}

/// Polls for MPV events and synchronizes the application state.
///
/// This function waits for up to 50ms for an event from the MPV context.
/// If an event occurs, it updates internal flags and broadcasts any necessary
/// [`AppEvent`]s.
fn process_mpv_events(
    handler: &mut mpv::MpvHandler,
    is_paused: &mut bool,
    is_idle: &mut bool,
    current_state: &mut PlayerState,
    event_tx: &Sender<AppEvent>,
) -> Result<()> {
    if let Some(mpv_event) = handler.wait_event(0.05) {
        let app_event = match mpv_event {
            mpv::Event::PropertyChange { name, change, .. } => match (name, change) {
                ("duration", Format::Double(duration)) => Some(AppEvent::DurationChanged(duration)),
                ("pause", Format::Flag(pause)) => {
                    *is_paused = pause;
                    None
                }
                ("time-pos", Format::Double(seconds)) if seconds >= 0.0 => {
                    Some(AppEvent::TimeChanged(seconds))
                }
                ("volume", Format::Double(volume)) => {
                    Some(AppEvent::VolumeChanged(volume.round() as u32))
                }
                ("idle-active", Format::Flag(idle_active)) => {
                    *is_idle = idle_active;
                    None
                }
                _ => None,
            },
            mpv::Event::EndFile(Ok(mpv::EndFileReason::MPV_END_FILE_REASON_EOF)) => {
                Some(AppEvent::TrackFinished)
            }
            _ => None,
        };

        let new_player_state = AudioPlayer::player_state(*is_paused, *is_idle);

        if new_player_state != *current_state {
            *current_state = new_player_state;
            event_tx
                .send(AppEvent::PlayerStateChanged(new_player_state))
                .context("Failed to send player state event")?;
        }

        if let Some(event) = app_event {
            event_tx.send(event).context("Failed to send event")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_seek_failures_are_recoverable() {
        assert!(MediaCommand::Seek(5.0).is_recoverable());

        assert!(!MediaCommand::Stop.is_recoverable());
        assert!(!MediaCommand::Play.is_recoverable());
        assert!(
            !MediaCommand::Load {
                url: "https://one".to_string(),
                autoplay: false,
            }
            .is_recoverable()
        );
    }
}
