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

//! Playlist view state.
//!
//! The playlist view lists the track references of the current playlist and
//! keeps its own selection, independent of the controller's cursor. Moving the
//! cursor pulls the selection along; activating a selection asks the
//! controller to jump there.

mod event;
mod render;

use ratatui::widgets::ListState;

pub(crate) struct PlaylistView {
    pub(crate) list_state: ListState,
    len: usize,
}

impl PlaylistView {
    pub(crate) fn new() -> Self {
        Self {
            list_state: ListState::default(),
            len: 0,
        }
    }

    /// Resets the view for a playlist of `len` entries.
    pub(crate) fn set_len(&mut self, len: usize) {
        self.len = len;
        self.list_state.select(if len > 0 { Some(0) } else { None });
    }

    /// Moves the selection to follow the controller cursor.
    pub(crate) fn follow_cursor(&mut self, cursor: usize) {
        if cursor < self.len {
            self.list_state.select(Some(cursor));
        }
    }

    pub(crate) fn selected(&self) -> Option<usize> {
        self.list_state.selected().filter(|i| *i < self.len)
    }

    fn goto_next(&mut self) {
        if self.len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < self.len => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    fn goto_previous(&mut self) {
        if self.len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    fn goto_first(&mut self) {
        if self.len > 0 {
            self.list_state.select(Some(0));
        }
    }

    fn goto_last(&mut self) {
        if self.len > 0 {
            self.list_state.select(Some(self.len - 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_wraps_both_ways() {
        let mut view = PlaylistView::new();
        view.set_len(3);
        assert_eq!(view.selected(), Some(0));

        view.goto_previous();
        assert_eq!(view.selected(), Some(2));

        view.goto_next();
        assert_eq!(view.selected(), Some(0));

        view.goto_last();
        view.goto_first();
        assert_eq!(view.selected(), Some(0));
    }

    #[test]
    fn empty_playlist_has_no_selection() {
        let mut view = PlaylistView::new();
        view.set_len(0);
        view.goto_next();
        view.follow_cursor(0);
        assert_eq!(view.selected(), None);
    }

    #[test]
    fn follows_cursor_within_bounds() {
        let mut view = PlaylistView::new();
        view.set_len(2);
        view.follow_cursor(1);
        assert_eq!(view.selected(), Some(1));
        view.follow_cursor(5);
        assert_eq!(view.selected(), Some(1));
    }
}
