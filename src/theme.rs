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

//! Visual styling and color configuration for the TUI.
//!
//! This module defines the application's color palette and converts colours
//! to the hexadecimal form used for terminal emulator styling.

use ratatui::style::Color;

#[derive(Clone, Copy)]
pub(crate) struct Theme {
    pub(crate) background_colour: Color,
    pub(crate) accent_colour: Color,
    pub(crate) border_colour: Color,
    pub(crate) gauge_track_colour: Color,
    pub(crate) text_colour: Color,
    pub(crate) muted_colour: Color,
    pub(crate) commander_colour: Color,
    pub(crate) error_colour: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background_colour: Color::Rgb(40, 20, 50),
            accent_colour: Color::Rgb(250, 189, 47),
            border_colour: Color::Rgb(102, 102, 102),
            gauge_track_colour: Color::Rgb(50, 30, 60),
            text_colour: Color::Rgb(255, 255, 255),
            muted_colour: Color::Rgb(162, 161, 166),
            commander_colour: Color::Rgb(179, 157, 219),
            error_colour: Color::Rgb(231, 76, 60),
        }
    }
}

impl Theme {
    /// Converts an RGB colour into a CSS-style hexadecimal string.
    ///
    /// Returns `None` for colours that are not [`Color::Rgb`].
    pub(crate) fn to_hex(colour: Color) -> Option<String> {
        match colour {
            Color::Rgb(r, g, b) => Some(format!("#{:02x}{:02x}{:02x}", r, g, b)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_converts_to_hex() {
        assert_eq!(Theme::to_hex(Color::Rgb(40, 20, 50)).as_deref(), Some("#281432"));
        assert_eq!(Theme::to_hex(Color::Red), None);
    }
}
