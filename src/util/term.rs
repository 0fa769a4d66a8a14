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

//! Terminal background colour control.
//!
//! The player paints the whole terminal window in the theme background using
//! OSC 11, and hands the original colour back with OSC 111 on exit. Terminals
//! that do not understand these sequences ignore them.

use std::io::{self, Write};

fn write_osc(sequence: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "\x1b]{}\x07", sequence)?;
    stdout.flush()
}

/// Sets the terminal background to `hex_colour` (e.g. `"#1e1e1e"`).
pub(crate) fn set_terminal_bg(hex_colour: &str) -> io::Result<()> {
    write_osc(&format!("11;{}", hex_colour))
}

/// Restores the terminal's configured background colour.
pub(crate) fn reset_terminal_bg() -> io::Result<()> {
    write_osc("111")
}
