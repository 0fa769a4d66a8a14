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

//! # Meting Mini.
//!
//! A terminal music mini-player for provider playlists.
//!
//! The player keeps a playlist of provider track ids, resolves the one under
//! the cursor into playable metadata over HTTP, and plays the resulting stream
//! through an embedded MPV instance.
//!
//! It uses an event-driven architecture where:
//!
//! * The **Main Thread** manages the terminal lifecycle, applies every event
//!   to the playlist controller and renders the UI.
//! * **Background Workers** resolve tracks over HTTP and drive MPV.
//! * **Input and Tick Threads** capture key presses and trigger periodic
//!   redraws.
//!
//! ## Architecture
//!
//! The application follows a strict setup-run-teardown pattern so the
//! terminal state is restored even when the event loop fails. Communication
//! between the UI and background workers is handled via `std::sync::mpsc`
//! channels.

mod commander;
mod components;
mod config;
mod controller;
mod events;
mod logging;
mod model;
mod player;
mod render;
mod resolver;
mod theme;
mod util;

use anyhow::{Context, Result};
use crossterm::{
    event, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    io,
    sync::mpsc::{self, Receiver, Sender},
    thread,
    time::Duration,
};
use tracing::{info, warn};

use crate::{
    commander::Commander,
    components::PlaylistView,
    config::AppConfig,
    controller::{PlayerCommand, PlaylistController},
    events::{AppEvent, process_events},
    model::PlaybackState,
    player::AudioPlayer,
    resolver::ResolveRequest,
    theme::Theme,
};

const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Application state.
struct App {
    pub config: AppConfig,
    pub theme: Theme,

    pub event_tx: Sender<AppEvent>,
    pub event_rx: Receiver<AppEvent>,

    pub resolve_tx: Sender<ResolveRequest>,
    pub audio_player: AudioPlayer,

    pub controller: PlaylistController,
    pub playback: PlaybackState,

    pub playlist_view: PlaylistView,
    pub commander: Commander,

    pub hidden: bool,
}

impl App {
    /// Create a new instance of application state.
    pub fn new(
        config: AppConfig,
        event_tx: Sender<AppEvent>,
        event_rx: Receiver<AppEvent>,
        resolve_tx: Sender<ResolveRequest>,
        audio_player: AudioPlayer,
    ) -> Self {
        let controller = PlaylistController::new(config.autoplay_next);
        let commander = Commander::new(config.default_source);

        Self {
            config,
            theme: Theme::default(),
            event_tx,
            event_rx,
            resolve_tx,
            audio_player,
            controller,
            playback: PlaybackState::default(),
            playlist_view: PlaylistView::new(),
            commander,
            hidden: false,
        }
    }
}

/// The entry point of the application.
///
/// Loads the configuration, starts logging and the workers, manages the
/// terminal lifecycle, and returns an error if any part of the execution
/// fails.
fn main() -> Result<()> {
    let (config, config_error) = config::load_config();

    let _log_guard = logging::init_logging(&config)?;

    if let Some(e) = config_error {
        warn!(error = %e, "failed to load configuration, using defaults");
    }

    let (event_tx, event_rx) = mpsc::channel();
    let (resolve_tx, resolve_rx) = mpsc::channel();

    resolver::spawn_resolver_worker(&config, resolve_rx, event_tx.clone());

    let audio_player =
        AudioPlayer::new(event_tx.clone()).context("Failed to initialise audio player")?;

    let mut app = App::new(config, event_tx, event_rx, resolve_tx, audio_player);

    let mut terminal = setup_terminal(&app)?;
    let res = run(&mut terminal, &mut app);
    restore_terminal(&mut terminal);

    if let Err(e) = &res {
        tracing::error!(error = ?e, "application error");
    }
    info!("exiting");

    res.context("Application error occurred")
}

/// Prepares the terminal for the TUI application.
///
/// Sets the terminal background from the theme, enables raw mode and
/// switches to the alternate screen buffer.
///
/// # Errors
///
/// Returns an error if raw mode cannot be enabled or if the alternate screen
/// cannot be entered.
fn setup_terminal(app: &App) -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    // Set the background of the entire terminal window, without this we'd get
    // a thin black outline
    if let Some(hex) = Theme::to_hex(app.theme.background_colour) {
        if let Err(e) = util::term::set_terminal_bg(&hex) {
            warn!(error = %e, "failed to set terminal background");
        }
    }

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// Best-effort: failures are ignored since this runs during cleanup.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) {
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    util::term::reset_terminal_bg().ok();
    terminal.show_cursor().ok();
}

/// Starts the input and tick threads, loads the configured playlist and
/// enters the main event loop.
///
/// # Errors
///
/// Returns an error if the event processing loop encounters an unrecoverable
/// application error.
fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Translate raw key events to application events.
    let tx_keys = app.event_tx.clone();
    thread::spawn(move || {
        loop {
            match event::read() {
                Ok(event::Event::Key(key)) => {
                    if tx_keys.send(AppEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    let _ = tx_keys.send(AppEvent::FatalError(format!("Failed to read input: {}", e)));
                    break;
                }
            }
        }
    });

    // Periodic tick, effectively the minimum frame rate of the UI.
    let tx_tick = app.event_tx.clone();
    thread::spawn(move || {
        while tx_tick.send(AppEvent::Tick).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });

    let playlist = app.config.playlist_tracks();
    info!(tracks = playlist.len(), "loading configured playlist");
    app.event_tx
        .send(AppEvent::Command(PlayerCommand::ReplacePlaylist(playlist)))
        .context("Failed to queue initial playlist")?;

    process_events(terminal, app)
}
