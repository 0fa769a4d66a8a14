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

//! Playlist and playback controller.
//!
//! The [`PlaylistController`] owns the playlist, the cursor into it and the
//! currently resolved track. It does no I/O itself: every operation returns
//! the list of [`Effect`]s the application must carry out, such as asking the
//! resolver worker for a track, sending a command to the media engine, or
//! notifying the view of a state change.
//!
//! # Resolution ordering
//!
//! Each resolve request is tagged with a monotonically increasing sequence
//! number. Only the result matching the latest request is applied, so a slow
//! response for an earlier cursor position can never overwrite a newer track.

use tracing::{debug, info, warn};

use crate::{
    model::{PlayerState, ResolvedTrack, TrackRef},
    player::MediaCommand,
    resolver::ResolveRequest,
};

/// Commands accepted from the embedding caller.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PlayerCommand {
    Play,
    Pause,
    TogglePause,
    Seek(f64),
    Next,
    Prev,
    JumpTo(usize),
    ReplacePlaylist(Vec<TrackRef>),
}

/// The playback intent reported outward whenever play or pause is requested.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum PlayIntent {
    Play,
    Pause,
}

/// State change notifications emitted by the controller.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Notification {
    PlayStateChanged(PlayIntent),
    CursorChanged(usize),
    TrackChanged(Option<ResolvedTrack>),
}

/// Work the application must perform on behalf of the controller.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Effect {
    Resolve(ResolveRequest),
    Media(MediaCommand),
    Notify(Notification),
}

/// Lifecycle of the track under the cursor.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub(crate) enum TrackPhase {
    #[default]
    Idle,
    Resolving,
    Ready,
    Playing,
    Paused,
    Ended,
}

pub(crate) struct PlaylistController {
    playlist: Vec<TrackRef>,
    cursor: usize,
    current: Option<ResolvedTrack>,
    phase: TrackPhase,
    player_state: PlayerState,
    last_seq: u64,
    pending: Option<u64>,
    autoplay_pending: bool,
    autoplay_next: bool,
}

impl PlaylistController {
    /// Creates a controller with an empty playlist.
    ///
    /// # Arguments
    ///
    /// * `autoplay_next` - Whether a track reached by auto-advance after the
    ///   previous one finished should start playing once resolved.
    pub(crate) fn new(autoplay_next: bool) -> Self {
        Self {
            playlist: Vec::new(),
            cursor: 0,
            current: None,
            phase: TrackPhase::Idle,
            player_state: PlayerState::Stopped,
            last_seq: 0,
            pending: None,
            autoplay_pending: false,
            autoplay_next,
        }
    }

    pub(crate) fn playlist(&self) -> &[TrackRef] {
        &self.playlist
    }

    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn current(&self) -> Option<&ResolvedTrack> {
        self.current.as_ref()
    }

    pub(crate) fn phase(&self) -> TrackPhase {
        self.phase
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.player_state.is_paused()
    }

    /// Dispatches a caller command.
    pub(crate) fn handle(&mut self, command: PlayerCommand) -> Vec<Effect> {
        debug!(?command, cursor = self.cursor, "handling player command");

        // Explicit navigation overrides a pending auto-advance
        if matches!(command, PlayerCommand::Next | PlayerCommand::Prev | PlayerCommand::JumpTo(_)) {
            self.autoplay_pending = false;
        }

        match command {
            PlayerCommand::Play => self.play(),
            PlayerCommand::Pause => self.pause(),
            PlayerCommand::TogglePause => {
                if self.is_paused() {
                    self.play()
                } else {
                    self.pause()
                }
            }
            PlayerCommand::Seek(seconds) => self.seek(seconds),
            PlayerCommand::Next => self.step(1),
            PlayerCommand::Prev => self.step(-1),
            PlayerCommand::JumpTo(index) => self.jump_to(index),
            PlayerCommand::ReplacePlaylist(tracks) => self.replace_playlist(tracks),
        }
    }

    fn play(&mut self) -> Vec<Effect> {
        self.play_state_effects(MediaCommand::Play, PlayIntent::Play)
    }

    fn pause(&mut self) -> Vec<Effect> {
        self.play_state_effects(MediaCommand::Pause, PlayIntent::Pause)
    }

    // Nothing is reported outward until a track has been resolved.
    fn play_state_effects(&self, command: MediaCommand, intent: PlayIntent) -> Vec<Effect> {
        let mut effects = vec![Effect::Media(command)];
        if self.current.is_some() {
            effects.push(Effect::Notify(Notification::PlayStateChanged(intent)));
        }
        effects
    }

    /// Whether the media engine has a stream loaded for the current track.
    fn has_media(&self) -> bool {
        matches!(self.phase, TrackPhase::Ready | TrackPhase::Playing | TrackPhase::Paused)
            && self
                .current
                .as_ref()
                .is_some_and(|track| track.stream_url.is_some())
    }

    fn seek(&mut self, seconds: f64) -> Vec<Effect> {
        if !seconds.is_finite() || seconds < 0.0 {
            warn!(seconds, "ignoring invalid seek position");
            return vec![];
        }
        if !self.has_media() {
            debug!(seconds, phase = ?self.phase, "ignoring seek with no stream loaded");
            return vec![];
        }
        vec![Effect::Media(MediaCommand::Seek(seconds))]
    }

    fn step(&mut self, delta: isize) -> Vec<Effect> {
        let len = self.playlist.len();
        if len == 0 {
            return vec![];
        }

        // rem_euclid keeps the result in 0..len for negative deltas
        let cursor = (self.cursor as isize + delta).rem_euclid(len as isize) as usize;
        self.move_cursor(cursor)
    }

    fn jump_to(&mut self, index: usize) -> Vec<Effect> {
        let len = self.playlist.len();
        if len == 0 {
            return vec![];
        }

        self.move_cursor(index % len)
    }

    fn move_cursor(&mut self, cursor: usize) -> Vec<Effect> {
        self.cursor = cursor;

        let mut effects = vec![Effect::Notify(Notification::CursorChanged(cursor))];
        effects.extend(self.resolve_at_cursor());
        effects
    }

    fn replace_playlist(&mut self, tracks: Vec<TrackRef>) -> Vec<Effect> {
        info!(tracks = tracks.len(), "replacing playlist");

        self.playlist = tracks;
        self.cursor = 0;
        self.current = None;
        self.pending = None;
        self.autoplay_pending = false;
        self.phase = TrackPhase::Idle;

        let mut effects = vec![
            Effect::Media(MediaCommand::Stop),
            Effect::Notify(Notification::TrackChanged(None)),
            Effect::Notify(Notification::CursorChanged(0)),
        ];
        effects.extend(self.resolve_at_cursor());
        effects
    }

    fn resolve_at_cursor(&mut self) -> Vec<Effect> {
        match self.playlist.get(self.cursor).copied() {
            Some(track) => self.resolve(track),
            None => vec![],
        }
    }

    /// Requests resolution of `track`, superseding any outstanding request.
    ///
    /// A zero id requests nothing and leaves the current track as it is, but
    /// still supersedes any outstanding request.
    pub(crate) fn resolve(&mut self, track: TrackRef) -> Vec<Effect> {
        if track.id == 0 {
            debug!(pending = ?self.pending, "ignoring resolve request for empty track id");
            if self.pending.take().is_some() {
                self.phase = if self.current.is_some() { TrackPhase::Ready } else { TrackPhase::Idle };
            }
            self.autoplay_pending = false;
            return vec![];
        }

        self.last_seq += 1;
        self.pending = Some(self.last_seq);
        self.phase = TrackPhase::Resolving;

        vec![Effect::Resolve(ResolveRequest {
            seq: self.last_seq,
            track,
        })]
    }

    /// Applies a resolution result if it answers the latest request.
    pub(crate) fn apply_resolution(&mut self, seq: u64, track: ResolvedTrack) -> Vec<Effect> {
        if self.pending != Some(seq) {
            debug!(seq, pending = ?self.pending, "discarding stale resolution");
            return vec![];
        }

        self.pending = None;
        self.phase = TrackPhase::Ready;

        let autoplay = std::mem::take(&mut self.autoplay_pending);

        let media = match &track.stream_url {
            Some(url) => MediaCommand::Load {
                url: url.clone(),
                autoplay,
            },
            None => {
                warn!(id = track.id, "resolved track has no stream URL");
                MediaCommand::Stop
            }
        };

        info!(id = track.id, title = %track.title, "track resolved");

        self.current = Some(track.clone());

        vec![
            Effect::Notify(Notification::TrackChanged(Some(track))),
            Effect::Media(media),
        ]
    }

    /// Records a failed resolution. Returns `true` if it answered the latest
    /// request and so should be reported.
    pub(crate) fn resolution_failed(&mut self, seq: u64) -> bool {
        if self.pending != Some(seq) {
            return false;
        }

        self.pending = None;
        self.autoplay_pending = false;
        self.phase = TrackPhase::Idle;
        true
    }

    /// Observes a playback state change from the media engine.
    pub(crate) fn observe_player_state(&mut self, state: PlayerState) {
        self.player_state = state;

        if matches!(self.phase, TrackPhase::Ready | TrackPhase::Playing | TrackPhase::Paused) {
            self.phase = match state {
                PlayerState::Playing => TrackPhase::Playing,
                PlayerState::Paused => TrackPhase::Paused,
                PlayerState::Stopped => self.phase,
            };
        }
    }

    /// Advances to the next track after the current one played to the end.
    pub(crate) fn track_finished(&mut self) -> Vec<Effect> {
        if self.playlist.is_empty() {
            return vec![];
        }

        self.phase = TrackPhase::Ended;
        self.autoplay_pending = self.autoplay_next;

        let effects = self.step(1);
        if self.pending.is_none() {
            self.autoplay_pending = false;
        }
        effects
    }
}
