use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::{
    App,
    controller::{Effect, Notification, PlayIntent, PlayerCommand},
    model::{PlayerState, ResolvedTrack},
    util::open::open_url,
};

pub(super) fn handle_command(app: &mut App, command: PlayerCommand) -> Result<()> {
    let replaces_playlist = matches!(command, PlayerCommand::ReplacePlaylist(_));

    let effects = app.controller.handle(command);

    if replaces_playlist {
        app.playlist_view.set_len(app.controller.playlist().len());
    }

    apply_effects(app, effects)
}

/// Carries out the effects requested by the playlist controller.
pub(crate) fn apply_effects(app: &mut App, effects: Vec<Effect>) -> Result<()> {
    for effect in effects {
        match effect {
            Effect::Resolve(request) => app
                .resolve_tx
                .send(request)
                .context("Resolver worker is not running")?,
            Effect::Media(command) => app.audio_player.send(command)?,
            Effect::Notify(notification) => handle_notification(app, notification),
        }
    }

    Ok(())
}

fn handle_notification(app: &mut App, notification: Notification) {
    match notification {
        Notification::PlayStateChanged(intent) => {
            info!(?intent, "play state requested");
            app.commander.set_info(match intent {
                PlayIntent::Play => "Playing",
                PlayIntent::Pause => "Paused",
            });
        }
        Notification::CursorChanged(cursor) => app.playlist_view.follow_cursor(cursor),
        Notification::TrackChanged(track) => {
            app.playback.time = 0.0;
            app.playback.duration = 0.0;
            if let Some(track) = track {
                app.commander
                    .set_info(format!("Loaded {} by {}", track.title, track.author));
            }
        }
    }
}

pub(super) fn handle_track_resolved(app: &mut App, seq: u64, track: ResolvedTrack) -> Result<()> {
    let effects = app.controller.apply_resolution(seq, track);
    apply_effects(app, effects)
}

pub(super) fn handle_resolve_failed(app: &mut App, seq: u64, message: String) {
    if app.controller.resolution_failed(seq) {
        error!(seq, error = %message, "failed to resolve track");
        app.commander
            .set_error(format!("Failed to resolve track: {}", message));
    }
}

pub(super) fn handle_player_state_changed(app: &mut App, state: PlayerState) {
    app.playback.state = state;
    app.controller.observe_player_state(state);
}

pub(super) fn handle_duration_changed(app: &mut App, duration: f64) {
    app.playback.duration = duration;
}

pub(super) fn handle_time_changed(app: &mut App, seconds: f64) {
    app.playback.time = seconds;
}

pub(super) fn handle_volume_changed(app: &mut App, volume: u32) {
    app.playback.volume = Some(volume);
}

pub(super) fn handle_track_finished(app: &mut App) -> Result<()> {
    app.playback.time = app.playback.duration;
    let effects = app.controller.track_finished();
    apply_effects(app, effects)
}

pub(super) fn handle_open_stream(app: &mut App) {
    let Some(url) = app
        .controller
        .current()
        .and_then(|track| track.stream_url.clone())
    else {
        app.commander.set_error("No stream to open");
        return;
    };

    match open_url(&url) {
        Ok(()) => info!(url = %url, "opened stream URL"),
        Err(e) => {
            warn!(error = ?e, "failed to open stream URL");
            app.commander.set_error(e.to_string());
        }
    }
}

pub(super) fn handle_toggle_hidden(app: &mut App) -> Result<()> {
    app.hidden = !app.hidden;

    if app.hidden {
        handle_command(app, PlayerCommand::Pause)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::{self, Receiver};

    use super::*;
    use crate::{
        config::AppConfig,
        events::{AppEvent, handle_event},
        model::TrackRef,
        player::{AudioPlayer, MediaCommand},
        resolver::ResolveRequest,
    };

    struct Harness {
        app: App,
        resolve_rx: Receiver<ResolveRequest>,
        media_rx: Receiver<MediaCommand>,
    }

    fn harness() -> Harness {
        let (event_tx, event_rx) = mpsc::channel();
        let (resolve_tx, resolve_rx) = mpsc::channel();
        let (audio_player, media_rx) = AudioPlayer::detached();

        let app = App::new(AppConfig::default(), event_tx, event_rx, resolve_tx, audio_player);

        Harness {
            app,
            resolve_rx,
            media_rx,
        }
    }

    fn track(id: u64, url: &str) -> ResolvedTrack {
        ResolvedTrack {
            id,
            title: format!("Track {}", id),
            author: "Artist".to_string(),
            stream_url: Some(url.to_string()),
            ..Default::default()
        }
    }

    fn replace(h: &mut Harness, ids: &[u64]) {
        let tracks = ids.iter().copied().map(TrackRef::new).collect();
        handle_event(&mut h.app, AppEvent::Command(PlayerCommand::ReplacePlaylist(tracks))).unwrap();
    }

    #[test]
    fn finished_track_resolves_the_next_one() {
        let mut h = harness();
        replace(&mut h, &[101, 202]);

        let first = h.resolve_rx.try_recv().unwrap();
        assert_eq!(first.track.id, 101);
        assert_eq!(h.media_rx.try_recv().unwrap(), MediaCommand::Stop);

        handle_event(&mut h.app, AppEvent::TrackResolved(first.seq, track(101, "https://one"))).unwrap();
        assert_eq!(
            h.media_rx.try_recv().unwrap(),
            MediaCommand::Load {
                url: "https://one".to_string(),
                autoplay: false,
            }
        );

        handle_event(&mut h.app, AppEvent::TrackFinished).unwrap();

        assert_eq!(h.app.controller.cursor(), 1);
        assert_eq!(h.app.playlist_view.selected(), Some(1));
        let second = h.resolve_rx.try_recv().unwrap();
        assert_eq!(second.track.id, 202);
        assert!(h.resolve_rx.try_recv().is_err());
    }

    #[test]
    fn late_result_does_not_replace_newer_track() {
        let mut h = harness();
        replace(&mut h, &[1, 2, 3]);
        let first = h.resolve_rx.try_recv().unwrap();

        handle_event(&mut h.app, AppEvent::Command(PlayerCommand::Next)).unwrap();
        let second = h.resolve_rx.try_recv().unwrap();

        handle_event(&mut h.app, AppEvent::TrackResolved(second.seq, track(2, "https://two"))).unwrap();
        handle_event(&mut h.app, AppEvent::TrackResolved(first.seq, track(1, "https://one"))).unwrap();

        assert_eq!(h.app.controller.current().map(|t| t.id), Some(2));
    }

    #[test]
    fn resolve_failure_is_reported_on_status_line() {
        let mut h = harness();
        replace(&mut h, &[7]);
        let request = h.resolve_rx.try_recv().unwrap();

        handle_event(&mut h.app, AppEvent::ResolveFailed(request.seq, "timeout".to_string())).unwrap();

        assert_eq!(
            h.app.commander.status,
            Some(crate::commander::Status::Error(
                "Failed to resolve track: timeout".to_string()
            ))
        );
    }

    #[test]
    fn hiding_the_player_pauses_playback() {
        let mut h = harness();

        handle_event(&mut h.app, AppEvent::ToggleHidden).unwrap();

        assert!(h.app.hidden);
        assert_eq!(h.media_rx.try_recv().unwrap(), MediaCommand::Pause);

        handle_event(&mut h.app, AppEvent::ToggleHidden).unwrap();
        assert!(!h.app.hidden);
        assert!(h.media_rx.try_recv().is_err());
    }

    #[test]
    fn observed_state_reaches_controller_and_view() {
        let mut h = harness();

        handle_event(&mut h.app, AppEvent::PlayerStateChanged(PlayerState::Playing)).unwrap();
        handle_event(&mut h.app, AppEvent::DurationChanged(200.0)).unwrap();
        handle_event(&mut h.app, AppEvent::TimeChanged(50.0)).unwrap();

        assert!(!h.app.controller.is_paused());
        assert_eq!(h.app.playback.position(), 0.25);

        handle_event(&mut h.app, AppEvent::Command(PlayerCommand::TogglePause)).unwrap();
        assert_eq!(h.media_rx.try_recv().unwrap(), MediaCommand::Pause);
    }

    #[test]
    fn seek_before_a_stream_is_loaded_is_not_sent() {
        let mut h = harness();

        handle_event(&mut h.app, AppEvent::Command(PlayerCommand::Seek(5.0))).unwrap();
        assert!(h.media_rx.try_recv().is_err());

        replace(&mut h, &[3]);
        let request = h.resolve_rx.try_recv().unwrap();
        assert_eq!(h.media_rx.try_recv().unwrap(), MediaCommand::Stop);

        handle_event(&mut h.app, AppEvent::Command(PlayerCommand::Seek(5.0))).unwrap();
        assert!(h.media_rx.try_recv().is_err());

        handle_event(&mut h.app, AppEvent::TrackResolved(request.seq, track(3, "https://three"))).unwrap();
        h.media_rx.try_recv().unwrap();

        handle_event(&mut h.app, AppEvent::Command(PlayerCommand::Seek(5.0))).unwrap();
        assert_eq!(h.media_rx.try_recv().unwrap(), MediaCommand::Seek(5.0));
    }

    #[test]
    fn opening_without_a_track_sets_error() {
        let mut h = harness();

        handle_event(&mut h.app, AppEvent::OpenStream).unwrap();

        assert_eq!(
            h.app.commander.status,
            Some(crate::commander::Status::Error("No stream to open".to_string()))
        );
    }
}
