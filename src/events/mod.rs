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

//! Application events and the main event loop.
//!
//! Every input to the application arrives as an [`AppEvent`] on a single
//! channel: key presses, ticks, results from the resolver worker and state
//! changes observed by the media engine. The loop in [`process_events`]
//! applies each one to the [`App`] and redraws.
//!
//! # Organization
//!
//! * [`handlers`]: Per-event state updates, including execution of the
//!   controller's effects.
//! * [`key_handlers`]: Keyboard routing.

mod handlers;
mod key_handlers;

use handlers::*;

use std::{io::Stdout, sync::mpsc::Sender};

use anyhow::{Result, anyhow};
use crossterm::event::{Event, KeyEvent};
use ratatui::{Terminal, prelude::CrosstermBackend};

use crate::{
    App,
    controller::PlayerCommand,
    model::{PlayerState, ResolvedTrack},
    render::draw,
};

#[derive(Debug)]
pub(crate) enum AppEvent {
    Key(KeyEvent),

    Command(PlayerCommand),

    TrackResolved(u64, ResolvedTrack),
    ResolveFailed(u64, String),

    PlayerStateChanged(PlayerState),
    DurationChanged(f64),
    TimeChanged(f64),
    VolumeChanged(u32),
    TrackFinished,

    OpenStream,
    ToggleHidden,

    Tick,

    ExitApplication,

    FatalError(String),
}

/// A component that may consume terminal events.
pub(crate) trait AppEventProcessor {
    /// Returns `true` if the event was handled.
    fn process_event(&mut self, event: Event, event_tx: &Sender<AppEvent>) -> Result<bool>;
}

/// Runs the main application loop, handling events and rendering the UI in the
/// terminal.
///
/// This function loops until a quit event is received or the event channel
/// is closed. A fatal worker error ends the loop with that error.
pub(crate) fn process_events(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    terminal.draw(|f| draw(f, app))?;

    while let Ok(event) = app.event_rx.recv() {
        match event {
            AppEvent::ExitApplication => break,
            AppEvent::FatalError(message) => return Err(anyhow!(message)),
            event => handle_event(app, event)?,
        }

        terminal.draw(|f| draw(f, app))?;
    }

    Ok(())
}

/// Applies a single non-terminal event to the application state.
pub(crate) fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => key_handlers::process_key_event(app, key)?,
        AppEvent::Command(command) => handle_command(app, command)?,
        AppEvent::TrackResolved(seq, track) => handle_track_resolved(app, seq, track)?,
        AppEvent::ResolveFailed(seq, message) => handle_resolve_failed(app, seq, message),
        AppEvent::PlayerStateChanged(state) => handle_player_state_changed(app, state),
        AppEvent::DurationChanged(duration) => handle_duration_changed(app, duration),
        AppEvent::TimeChanged(secs) => handle_time_changed(app, secs),
        AppEvent::VolumeChanged(volume) => handle_volume_changed(app, volume),
        AppEvent::TrackFinished => handle_track_finished(app)?,
        AppEvent::OpenStream => handle_open_stream(app),
        AppEvent::ToggleHidden => handle_toggle_hidden(app)?,
        AppEvent::Tick | AppEvent::ExitApplication | AppEvent::FatalError(_) => {}
    }

    Ok(())
}
