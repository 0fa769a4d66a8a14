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

//! UI rendering logic for the playlist view.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Padding},
};

use crate::{components::PlaylistView, controller::PlaylistController, model::ResolvedTrack, theme::Theme};

impl PlaylistView {
    pub(crate) fn draw(&mut self, f: &mut Frame, area: Rect, controller: &PlaylistController, theme: &Theme) {
        let cursor = controller.cursor();
        let current = controller.current();

        let items: Vec<ListItem> = controller
            .playlist()
            .iter()
            .enumerate()
            .map(|(index, track)| {
                let is_cursor = index == cursor;
                let marker = if is_cursor { "\u{25B8} " } else { "  " };

                let mut spans = vec![
                    Span::styled(marker, Style::default().fg(theme.accent_colour)),
                    Span::styled(format!("{:>3}. ", index + 1), Style::default().fg(theme.muted_colour)),
                    Span::styled(track.to_string(), Style::default().fg(theme.text_colour)),
                ];

                if let Some(resolved) = current.filter(|t| is_cursor && t.id == track.id) {
                    spans.push(Span::styled(
                        resolved_label(resolved),
                        Style::default().fg(theme.accent_colour).add_modifier(Modifier::BOLD),
                    ));
                }

                ListItem::new(Line::from(spans))
            })
            .collect();

        let title = format!(" Playlist | {} tracks ", controller.playlist().len());

        let list = List::new(items)
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.border_colour))
                    .padding(Padding::horizontal(1)),
            )
            .highlight_style(Style::default().bg(theme.gauge_track_colour).add_modifier(Modifier::BOLD));

        f.render_stateful_widget(list, area, &mut self.list_state);
    }
}

fn resolved_label(track: &ResolvedTrack) -> String {
    format!("  {} by {}", track.title, track.author)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_track_is_labelled_with_author() {
        let track = ResolvedTrack {
            title: "Song".to_string(),
            author: "Singer".to_string(),
            ..Default::default()
        };

        assert_eq!(resolved_label(&track), "  Song by Singer");
    }
}
