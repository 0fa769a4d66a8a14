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

//! Command-line input logic and state management.
//!
//! This module implements the command-line component: a text input that is
//! activated with `:`, and on submission is parsed into an application event.
//! The same line doubles as a status line showing the last message or error
//! while the input is inactive.

use std::sync::mpsc::Sender;

use anyhow::Result;
use crossterm::event::{Event, KeyCode};
use tui_input::{Input, backend::crossterm::EventHandler};

use crate::{
    controller::PlayerCommand,
    events::AppEvent,
    model::{Source, TrackRef},
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Status {
    Info(String),
    Error(String),
}

pub(crate) struct Commander {
    active: bool,
    pub(crate) input: Input,
    pub(crate) status: Option<Status>,
    default_source: Source,
}

impl Commander {
    pub(crate) fn new(default_source: Source) -> Self {
        Self {
            active: false,
            input: Input::default(),
            status: None,
            default_source,
        }
    }

    pub(crate) fn active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_info(&mut self, message: impl Into<String>) {
        self.status = Some(Status::Info(message.into()));
    }

    pub(crate) fn set_error(&mut self, message: impl Into<String>) {
        self.status = Some(Status::Error(message.into()));
    }

    /// Handles a terminal event, returning `true` if it was consumed.
    pub(crate) fn handle_event(&mut self, event: &Event, event_tx: &Sender<AppEvent>) -> Result<bool> {
        let Event::Key(key_event) = event else {
            return Ok(false);
        };

        if !self.active {
            if key_event.code == KeyCode::Char(':') {
                self.active = true;
                self.status = None;
                return Ok(true);
            }
            return Ok(false);
        }

        match key_event.code {
            KeyCode::Esc => {
                self.active = false;
                self.input.reset();
            }

            KeyCode::Enter => {
                let buffer = self.input.value().trim().to_string();
                self.input.reset();
                self.active = false;

                if !buffer.is_empty() {
                    match parse_command(&buffer, self.default_source) {
                        Ok(event) => event_tx.send(event)?,
                        Err(message) => self.set_error(message),
                    }
                }
            }

            _ => {
                self.input.handle_event(event);
            }
        }

        Ok(true)
    }
}

/// Parses a submitted command line into an application event.
///
/// | Command            | Effect                   |
/// |--------------------|--------------------------|
/// | `pl <ref>...`      | replace the playlist     |
/// | `j <n>`            | jump to entry `n` (1-based) |
/// | `s <seconds>`      | seek to an absolute time |
/// | `p`                | toggle play/pause        |
/// | `n` / `b`          | next / previous          |
/// | `q`                | quit                     |
pub(crate) fn parse_command(buffer: &str, default_source: Source) -> Result<AppEvent, String> {
    let parts: Vec<&str> = buffer.split_whitespace().collect();

    let command = match parts.as_slice() {
        ["q"] => return Ok(AppEvent::ExitApplication),

        ["pl", refs @ ..] => {
            let tracks = refs
                .iter()
                .map(|r| TrackRef::parse_with_default(r, default_source))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| e.to_string())?;
            PlayerCommand::ReplacePlaylist(tracks)
        }

        ["j", index] => {
            let index = index
                .parse::<usize>()
                .ok()
                .filter(|i| *i > 0)
                .ok_or_else(|| format!("invalid playlist position '{}'", index))?;
            PlayerCommand::JumpTo(index - 1)
        }

        ["s", seconds] => {
            let seconds = seconds
                .parse::<f64>()
                .map_err(|_| format!("invalid seek position '{}'", seconds))?;
            PlayerCommand::Seek(seconds)
        }

        ["p"] => PlayerCommand::TogglePause,
        ["n"] => PlayerCommand::Next,
        ["b"] => PlayerCommand::Prev,

        [cmd, ..] => return Err(format!("unknown command '{}'", cmd)),
        [] => return Err("empty command".to_string()),
    };

    Ok(AppEvent::Command(command))
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use crossterm::event::{KeyEvent, KeyModifiers};

    use super::*;

    fn command(buffer: &str) -> PlayerCommand {
        match parse_command(buffer, Source::Netease) {
            Ok(AppEvent::Command(command)) => command,
            other => panic!("unexpected parse result {:?}", other),
        }
    }

    #[test]
    fn parses_playlist_replacement() {
        assert_eq!(
            command("pl 101 tencent:202"),
            PlayerCommand::ReplacePlaylist(vec![
                TrackRef::new(101),
                TrackRef::with_source(202, Source::Tencent),
            ])
        );
        assert_eq!(command("pl"), PlayerCommand::ReplacePlaylist(vec![]));
    }

    #[test]
    fn parses_transport_commands() {
        assert_eq!(command("j 3"), PlayerCommand::JumpTo(2));
        assert_eq!(command("s 42.5"), PlayerCommand::Seek(42.5));
        assert_eq!(command("p"), PlayerCommand::TogglePause);
        assert_eq!(command("n"), PlayerCommand::Next);
        assert_eq!(command("b"), PlayerCommand::Prev);
        assert!(matches!(
            parse_command("q", Source::Netease),
            Ok(AppEvent::ExitApplication)
        ));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_command("j 0", Source::Netease).is_err());
        assert!(parse_command("s soon", Source::Netease).is_err());
        assert!(parse_command("pl 1 x:2", Source::Netease).is_err());
        assert_eq!(
            parse_command("dance", Source::Netease).unwrap_err(),
            "unknown command 'dance'"
        );
    }

    #[test]
    fn typed_command_is_sent_on_enter() {
        let (event_tx, event_rx) = mpsc::channel();
        let mut commander = Commander::new(Source::Netease);
        let key = |code| Event::Key(KeyEvent::new(code, KeyModifiers::NONE));

        assert!(!commander.handle_event(&key(KeyCode::Char('n')), &event_tx).unwrap());
        assert!(commander.handle_event(&key(KeyCode::Char(':')), &event_tx).unwrap());
        assert!(commander.active());
        commander.handle_event(&key(KeyCode::Char('n')), &event_tx).unwrap();
        commander.handle_event(&key(KeyCode::Enter), &event_tx).unwrap();

        assert!(!commander.active());
        assert!(matches!(
            event_rx.try_recv(),
            Ok(AppEvent::Command(PlayerCommand::Next))
        ));
    }

    #[test]
    fn parse_errors_become_status() {
        let (event_tx, _event_rx) = mpsc::channel();
        let mut commander = Commander::new(Source::Netease);
        commander.input = Input::new("bogus".to_string());
        commander.active = true;

        let enter = Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        commander.handle_event(&enter, &event_tx).unwrap();

        assert_eq!(
            commander.status,
            Some(Status::Error("unknown command 'bogus'".to_string()))
        );
    }
}
