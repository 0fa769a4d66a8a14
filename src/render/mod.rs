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

//! User interface rendering logic.
//!
//! This module translates the [`App`] state into `ratatui` widgets. The
//! primary entry point is [`draw`], called after every processed event.

mod commander;
mod icons;
mod player;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::{
    App,
    render::{commander::draw_commander, player::draw_player},
};

const PLAYER_HEIGHT: u16 = 7;

/// Renders the user interface to the terminal frame.
///
/// The screen is split into the playlist, the player panel and the command
/// line. When the player is hidden its panel collapses to a single line.
pub(crate) fn draw(f: &mut Frame, app: &mut App) {
    let player_height = if app.hidden { 1 } else { PLAYER_HEIGHT };

    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(player_height),
            Constraint::Length(1),
        ])
        .split(f.area());

    app.playlist_view
        .draw(f, outer[0], &app.controller, &app.theme);

    draw_player(f, outer[1], app);

    draw_commander(f, outer[2], app);
}
