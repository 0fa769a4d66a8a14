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

//! File-based logging.
//!
//! The terminal is owned by the TUI, so log output goes to a daily rotating
//! file instead of stdout. The filter can be overridden with `RUST_LOG`.

use std::fs;

use anyhow::{Context, Result};
use tracing_appender::{non_blocking::WorkerGuard, rolling::{RollingFileAppender, Rotation}};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;

const LOG_FILE_PREFIX: &str = "meting-mini";

const DEFAULT_FILTER: &str = "meting_mini=debug,warn";

/// Initializes the global tracing subscriber.
///
/// The returned guard flushes buffered log lines when dropped, so it must be
/// held until the application exits.
pub(crate) fn init_logging(config: &AppConfig) -> Result<WorkerGuard> {
    fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Failed to create log directory {}", config.log_dir))?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &config.log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialise logging")?;

    tracing::info!(dir = %config.log_dir, "logging initialised");

    Ok(guard)
}
