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

//! Render the command line and status line.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Paragraph,
};

use crate::{App, commander::Status};

pub(crate) fn draw_commander(f: &mut Frame, area: Rect, app: &App) {
    let commander = &app.commander;

    let container = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1)])
        .horizontal_margin(1)
        .split(area);

    let (text, colour) = if commander.active() {
        (format!(":{}", commander.input.value()), app.theme.commander_colour)
    } else {
        match &commander.status {
            Some(Status::Info(message)) => (message.clone(), app.theme.muted_colour),
            Some(Status::Error(message)) => (message.clone(), app.theme.error_colour),
            None => (String::new(), app.theme.muted_colour),
        }
    };

    f.render_widget(
        Paragraph::new(text).style(Style::default().fg(colour).bg(app.theme.gauge_track_colour)),
        container[0],
    );

    if commander.active() {
        // +1 for the ':' prompt
        let cursor_x = container[0].x + 1 + commander.input.visual_cursor() as u16;
        f.set_cursor_position((cursor_x, container[0].y));
    }
}
