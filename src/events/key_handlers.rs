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

//! Keyboard routing.
//!
//! Keys go first to the command line, then to the playlist view, and finally
//! to the global player bindings.

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent};

use crate::{
    App,
    controller::PlayerCommand,
    events::{AppEvent, AppEventProcessor},
};

const FINE_VOLUME_DELTA: i32 = 1;
const VOLUME_DELTA: i32 = 5;

const FINE_SEEK_DELTA: f64 = 5.0;
const SEEK_DELTA: f64 = 20.0;

/// Maps keyboard input to application events and player commands.
///
/// # Errors
///
/// Returns an error if an event fails to send or the media engine is gone.
pub(super) fn process_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    let event = Event::Key(key);

    if app.commander.handle_event(&event, &app.event_tx)? {
        return Ok(());
    }

    if app.playlist_view.process_event(event, &app.event_tx)? {
        return Ok(());
    }

    process_global_key_event(app, key)
}

fn process_global_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    let command = |command| AppEvent::Command(command);

    match key.code {
        KeyCode::Char('q') => app.event_tx.send(AppEvent::ExitApplication)?,

        KeyCode::Char(' ') => app.event_tx.send(command(PlayerCommand::TogglePause))?,
        KeyCode::Char('n') => app.event_tx.send(command(PlayerCommand::Next))?,
        KeyCode::Char('p') => app.event_tx.send(command(PlayerCommand::Prev))?,

        KeyCode::Char(',') => app.event_tx.send(command(seek_by(app, -FINE_SEEK_DELTA)))?,
        KeyCode::Char('.') => app.event_tx.send(command(seek_by(app, FINE_SEEK_DELTA)))?,
        KeyCode::Char('<') => app.event_tx.send(command(seek_by(app, -SEEK_DELTA)))?,
        KeyCode::Char('>') => app.event_tx.send(command(seek_by(app, SEEK_DELTA)))?,

        KeyCode::Char('-') => app.audio_player.adjust_volume(-FINE_VOLUME_DELTA)?,
        KeyCode::Char('=') => app.audio_player.adjust_volume(FINE_VOLUME_DELTA)?,
        KeyCode::Char('_') => app.audio_player.adjust_volume(-VOLUME_DELTA)?,
        KeyCode::Char('+') => app.audio_player.adjust_volume(VOLUME_DELTA)?,
        KeyCode::Char('m') => app.audio_player.toggle_mute()?,

        KeyCode::Char('o') => app.event_tx.send(AppEvent::OpenStream)?,
        KeyCode::Char('v') => app.event_tx.send(AppEvent::ToggleHidden)?,

        _ => {}
    }

    Ok(())
}

// Relative seeks become absolute ones from the last observed position.
fn seek_by(app: &App, delta: f64) -> PlayerCommand {
    PlayerCommand::Seek((app.playback.time + delta).max(0.0))
}
