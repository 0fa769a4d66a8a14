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

/// Formats a duration in seconds as `MM:SS`, or `H:MM:SS` from one hour up.
///
/// This is used for displaying track positions and total durations in the
/// player interface.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_time(65), "01:05");
/// assert_eq!(format_time(3725), "1:02:05");
/// ```
pub(crate) fn format_time(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let mins = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}", mins, secs)
    }
}

/// Formats a fractional seconds value reported by the media engine,
/// truncating towards zero. Negative and non-finite values read as zero.
pub(crate) fn format_seconds(seconds: f64) -> String {
    let whole = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format_time(whole)
}

/// Extracts the host part of a URL for compact display.
pub(crate) fn url_host(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    rest.split(['/', '?', '#']).next().unwrap_or(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_hours() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(65), "01:05");
        assert_eq!(format_time(3599), "59:59");
        assert_eq!(format_time(3725), "1:02:05");
    }

    #[test]
    fn formats_engine_seconds() {
        assert_eq!(format_seconds(65.9), "01:05");
        assert_eq!(format_seconds(-3.0), "00:00");
        assert_eq!(format_seconds(f64::NAN), "00:00");
    }

    #[test]
    fn extracts_url_host() {
        assert_eq!(url_host("https://p1.music.126.net/a/b.jpg?param=1"), "p1.music.126.net");
        assert_eq!(url_host("example.com/x"), "example.com");
    }
}
