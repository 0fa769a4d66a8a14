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

//! Render the player panel.
//!
//! The panel is a pure reflection of the controller and the observed playback
//! state: cover indicator, play/pause icon, title and author, elapsed and
//! total time, and progress and volume gauges.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Padding, Paragraph},
};

use crate::{
    App,
    controller::TrackPhase,
    render::icons::{ICON_COVER, ICON_HIDDEN, ICON_LOADING, ICON_LYRICS, ICON_PAUSE, ICON_PLAY},
    util::format::{format_seconds, url_host},
};

const MAX_VOLUME: f64 = 130.0;

/// Renders the player panel, or a one-line placeholder when hidden.
pub(crate) fn draw_player(f: &mut Frame, area: Rect, app: &App) {
    if app.hidden {
        let line = Line::from(vec![
            Span::styled(format!(" {} ", ICON_HIDDEN), Style::default().fg(app.theme.accent_colour)),
            Span::styled("player hidden (v to show)", Style::default().fg(app.theme.muted_colour)),
        ]);
        f.render_widget(Paragraph::new(line), area);
        return;
    }

    let block = Block::default()
        .borders(Borders::TOP | Borders::BOTTOM)
        .border_style(Style::default().fg(app.theme.border_colour))
        .padding(Padding::horizontal(1));

    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner_area);

    let info_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(20)])
        .split(rows[0]);

    let bold = Style::default().add_modifier(Modifier::BOLD);

    let icon = if app.controller.phase() == TrackPhase::Resolving {
        ICON_LOADING
    } else if app.playback.state.is_paused() {
        ICON_PLAY
    } else {
        ICON_PAUSE
    };

    let mut title_line = vec![Span::styled(format!(" {} ", icon), bold.fg(app.theme.text_colour))];

    match app.controller.current() {
        Some(track) => {
            title_line.push(Span::styled(track.title.as_str(), bold.fg(app.theme.accent_colour)));
            title_line.push(Span::raw(" by "));
            title_line.push(Span::styled(track.author.as_str(), Style::default().fg(app.theme.muted_colour)));
        }
        None if app.controller.phase() == TrackPhase::Resolving => {
            title_line.push(Span::styled("Resolving track\u{2026}", Style::default().fg(app.theme.muted_colour)));
        }
        None => {
            title_line.push(Span::styled("Nothing loaded", Style::default().fg(app.theme.muted_colour)));
        }
    }
    f.render_widget(Paragraph::new(Line::from(title_line)), info_chunks[0]);

    if app.controller.current().is_some() {
        let time_line = Line::from(vec![
            Span::styled(format_seconds(app.playback.time), bold.fg(app.theme.accent_colour)),
            Span::styled("/", bold.fg(app.theme.text_colour)),
            Span::styled(format_seconds(app.playback.duration), bold.fg(app.theme.accent_colour)),
        ]);
        f.render_widget(Paragraph::new(time_line).alignment(Alignment::Right), info_chunks[1]);
    }

    if let Some(track) = app.controller.current() {
        let mut details = vec![];
        if let Some(cover) = &track.cover_url {
            details.push(Span::styled(format!(" {} ", ICON_COVER), Style::default().fg(app.theme.accent_colour)));
            details.push(Span::styled(url_host(cover).to_string(), Style::default().fg(app.theme.muted_colour)));
        }
        if track.lyrics_url.is_some() {
            details.push(Span::styled(format!("  {} lyrics", ICON_LYRICS), Style::default().fg(app.theme.muted_colour)));
        }
        let stream_hint = match &track.stream_url {
            Some(_) => "  o: open stream",
            None => "  no stream available",
        };
        details.push(Span::styled(stream_hint, Style::default().fg(app.theme.muted_colour)));

        f.render_widget(Paragraph::new(Line::from(details)), rows[1]);
    }

    let control_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(26)])
        .split(rows[2]);

    let volume_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(6)])
        .split(control_chunks[1]);

    let vol_ratio = (app.playback.volume.unwrap_or(0) as f64 / MAX_VOLUME).clamp(0.0, 1.0);

    let volume_gauge = Gauge::default()
        .gauge_style(Style::default().fg(app.theme.accent_colour).bg(app.theme.gauge_track_colour))
        .ratio(vol_ratio)
        .label("")
        .use_unicode(true);
    f.render_widget(volume_gauge, volume_layout[0]);

    let volume_label = Paragraph::new(format!(" {}%", (vol_ratio * MAX_VOLUME).round() as u16))
        .alignment(Alignment::Right)
        .style(Style::default().fg(app.theme.text_colour));
    f.render_widget(volume_label, volume_layout[1]);

    let position_gauge = Gauge::default()
        .gauge_style(Style::default().fg(app.theme.accent_colour).bg(app.theme.gauge_track_colour))
        .ratio(app.playback.position())
        .label("")
        .use_unicode(true);

    f.render_widget(position_gauge, rows[4]);
}
