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

//! Keyboard handling for the playlist view.

use std::sync::mpsc::Sender;

use anyhow::Result;
use crossterm::event::{Event, KeyCode};

use crate::{
    components::PlaylistView,
    controller::PlayerCommand,
    events::{AppEvent, AppEventProcessor},
};

impl AppEventProcessor for PlaylistView {
    fn process_event(&mut self, event: Event, event_tx: &Sender<AppEvent>) -> Result<bool> {
        let Event::Key(key) = event else {
            return Ok(false);
        };

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.goto_next(),
            KeyCode::Char('k') | KeyCode::Up => self.goto_previous(),
            KeyCode::Char('g') | KeyCode::Home => self.goto_first(),
            KeyCode::Char('G') | KeyCode::End => self.goto_last(),
            KeyCode::Enter => {
                if let Some(index) = self.selected() {
                    event_tx.send(AppEvent::Command(PlayerCommand::JumpTo(index)))?;
                }
            }
            _ => return Ok(false),
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use crossterm::event::{KeyEvent, KeyModifiers};

    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn enter_jumps_to_selection() {
        let (event_tx, event_rx) = mpsc::channel();
        let mut view = PlaylistView::new();
        view.set_len(3);

        assert!(view.process_event(key(KeyCode::Char('j')), &event_tx).unwrap());
        assert!(view.process_event(key(KeyCode::Char('j')), &event_tx).unwrap());
        assert!(view.process_event(key(KeyCode::Enter), &event_tx).unwrap());

        match event_rx.try_recv() {
            Ok(AppEvent::Command(PlayerCommand::JumpTo(2))) => {}
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn other_keys_are_not_handled() {
        let (event_tx, event_rx) = mpsc::channel();
        let mut view = PlaylistView::new();
        view.set_len(1);

        assert!(!view.process_event(key(KeyCode::Char('n')), &event_tx).unwrap());
        assert!(event_rx.try_recv().is_err());
    }
}
