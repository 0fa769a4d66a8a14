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

//! Track resolution.
//!
//! This module turns a [`TrackRef`] into a [`ResolvedTrack`] by way of two
//! chained lookups:
//!
//! 1. The provider metadata service, queried with the track id and source,
//!    returns the title, author, cover and lyrics URLs.
//! 2. The stream service, queried with the track id alone, returns the
//!    playable URL, which is rewritten to use `https`.
//!
//! Lookups block, so they run on a dedicated worker thread that receives
//! [`ResolveRequest`]s and broadcasts the results back to the application as
//! [`AppEvent`]s. Every request carries the sequence number assigned by the
//! playlist controller so that stale results can be discarded.

mod error;

pub(crate) use error::ResolveError;

use std::{
    sync::mpsc::{Receiver, Sender},
    thread,
    time::Duration,
};

use serde::Deserialize;
use tracing::{debug, info, warn};
use ureq::Agent;

use crate::{
    config::AppConfig,
    events::AppEvent,
    model::{ResolvedTrack, TrackRef},
};

/// A request to resolve one track, tagged with the controller's sequence
/// number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ResolveRequest {
    pub(crate) seq: u64,
    pub(crate) track: TrackRef,
}

/// One element of the metadata service response.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct MetingPayload {
    #[serde(default)]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) author: String,
    #[serde(default)]
    pub(crate) lrc: Option<String>,
    #[serde(default)]
    pub(crate) pic: Option<String>,
}

/// One element of the stream service response.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct StreamPayload {
    #[serde(default)]
    pub(crate) url: Option<String>,
}

/// The two lookups needed to resolve a track.
pub(crate) trait TrackLookup {
    fn fetch_metadata(&self, track: TrackRef) -> Result<Vec<MetingPayload>, ResolveError>;

    fn fetch_stream(&self, id: u64) -> Result<Vec<StreamPayload>, ResolveError>;
}

/// [`TrackLookup`] backed by blocking HTTP requests.
pub(crate) struct HttpLookup {
    agent: Agent,
    metadata_api: String,
    stream_api: String,
}

impl HttpLookup {
    pub(crate) fn new(metadata_api: &str, stream_api: &str, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        Self {
            agent,
            metadata_api: metadata_api.trim_end_matches('/').to_string(),
            stream_api: stream_api.to_string(),
        }
    }

    pub(crate) fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.metadata_api,
            &config.stream_api,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub(crate) fn metadata_url(&self, track: TrackRef) -> String {
        format!("{}/?server={}&id={}", self.metadata_api, track.source, track.id)
    }

    pub(crate) fn stream_url(&self, id: u64) -> String {
        format!("{}?id={}", self.stream_api, id)
    }

    fn get(&self, url: &str) -> Result<String, ResolveError> {
        debug!(url, "GET");
        let mut response = self.agent.get(url).call()?;
        Ok(response.body_mut().read_to_string()?)
    }
}

impl TrackLookup for HttpLookup {
    fn fetch_metadata(&self, track: TrackRef) -> Result<Vec<MetingPayload>, ResolveError> {
        let body = self.get(&self.metadata_url(track))?;
        Ok(serde_json::from_str(&body)?)
    }

    fn fetch_stream(&self, id: u64) -> Result<Vec<StreamPayload>, ResolveError> {
        let body = self.get(&self.stream_url(id))?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Rewrites a plain `http://` URL to `https://`, leaving anything else alone.
pub(crate) fn secure_url(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    }
}

/// Resolves a track by performing the metadata lookup followed by the stream
/// lookup.
///
/// Returns `Ok(None)` without touching the lookup for a zero id. A stream
/// lookup that yields no URL still produces a track, with no `stream_url`.
pub(crate) fn resolve<L: TrackLookup + ?Sized>(
    lookup: &L,
    track: TrackRef,
) -> Result<Option<ResolvedTrack>, ResolveError> {
    if track.id == 0 {
        return Ok(None);
    }

    let metadata = lookup
        .fetch_metadata(track)?
        .into_iter()
        .next()
        .ok_or(ResolveError::EmptyMetadata(track.id))?;

    let stream_url = lookup
        .fetch_stream(track.id)?
        .into_iter()
        .next()
        .and_then(|stream| stream.url)
        .map(|url| secure_url(&url));

    Ok(Some(ResolvedTrack {
        id: track.id,
        title: metadata.title,
        author: metadata.author,
        lyrics_url: metadata.lrc.filter(|s| !s.is_empty()),
        cover_url: metadata.pic.filter(|s| !s.is_empty()),
        stream_url,
    }))
}

/// Spawns the resolver worker thread.
///
/// # Arguments
///
/// * `config` - The application configuration, providing the service URLs.
/// * `request_rx` - The receiving end of the resolve request channel.
/// * `event_tx` - The channel used to broadcast resolved tracks and failures.
pub(crate) fn spawn_resolver_worker(
    config: &AppConfig,
    request_rx: Receiver<ResolveRequest>,
    event_tx: Sender<AppEvent>,
) {
    let lookup = HttpLookup::from_config(config);

    thread::spawn(move || {
        run_resolver(&lookup, request_rx, event_tx);
        info!("resolver worker stopped");
    });
}

/// Processes resolve requests until the request channel closes.
///
/// Before each resolution any further queued requests are drained and only
/// the newest is kept, since the controller would discard the others anyway.
fn run_resolver<L: TrackLookup + ?Sized>(
    lookup: &L,
    request_rx: Receiver<ResolveRequest>,
    event_tx: Sender<AppEvent>,
) {
    while let Ok(mut request) = request_rx.recv() {
        while let Ok(newer) = request_rx.try_recv() {
            debug!(seq = request.seq, superseded_by = newer.seq, "dropping queued resolve request");
            request = newer;
        }

        debug!(seq = request.seq, track = %request.track, "resolving track");

        let event = match resolve(lookup, request.track) {
            Ok(Some(track)) => AppEvent::TrackResolved(request.seq, track),
            Ok(None) => continue,
            Err(e) => {
                warn!(seq = request.seq, track = %request.track, error = %e, "track resolution failed");
                AppEvent::ResolveFailed(request.seq, e.to_string())
            }
        };

        if event_tx.send(event).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, sync::mpsc};

    use super::*;
    use crate::model::Source;

    #[derive(Default)]
    struct FakeLookup {
        calls: RefCell<Vec<String>>,
        metadata: Vec<MetingPayload>,
        stream_url: Option<String>,
        fail_stream: bool,
    }

    impl FakeLookup {
        fn with_track(title: &str, stream_url: Option<&str>) -> Self {
            Self {
                metadata: vec![MetingPayload {
                    title: title.to_string(),
                    author: "Someone".to_string(),
                    lrc: Some("https://lyrics.example.com/1.lrc".to_string()),
                    pic: Some(String::new()),
                }],
                stream_url: stream_url.map(str::to_string),
                ..Default::default()
            }
        }
    }

    impl TrackLookup for FakeLookup {
        fn fetch_metadata(&self, track: TrackRef) -> Result<Vec<MetingPayload>, ResolveError> {
            self.calls.borrow_mut().push(format!("metadata {}", track));
            Ok(self.metadata.clone())
        }

        fn fetch_stream(&self, id: u64) -> Result<Vec<StreamPayload>, ResolveError> {
            self.calls.borrow_mut().push(format!("stream {}", id));
            if self.fail_stream {
                let err = serde_json::from_str::<Vec<StreamPayload>>("not json").unwrap_err();
                return Err(ResolveError::Decode(err));
            }
            Ok(vec![StreamPayload {
                url: self.stream_url.clone(),
            }])
        }
    }

    #[test]
    fn zero_id_issues_no_lookups() {
        let lookup = FakeLookup::with_track("Song", Some("http://example.com/a.mp3"));

        let resolved = resolve(&lookup, TrackRef::new(0)).unwrap();

        assert!(resolved.is_none());
        assert!(lookup.calls.borrow().is_empty());
    }

    #[test]
    fn lookups_run_in_order_and_merge() {
        let lookup = FakeLookup::with_track("Song", Some("http://example.com/a.mp3"));

        let track = resolve(&lookup, TrackRef::with_source(7, Source::Tencent))
            .unwrap()
            .unwrap();

        assert_eq!(
            *lookup.calls.borrow(),
            vec!["metadata tencent:7".to_string(), "stream 7".to_string()]
        );
        assert_eq!(track.id, 7);
        assert_eq!(track.title, "Song");
        assert_eq!(track.author, "Someone");
        assert_eq!(track.lyrics_url.as_deref(), Some("https://lyrics.example.com/1.lrc"));
        assert_eq!(track.cover_url, None);
        assert_eq!(track.stream_url.as_deref(), Some("https://example.com/a.mp3"));
    }

    #[test]
    fn missing_stream_url_still_resolves() {
        let lookup = FakeLookup::with_track("Song", None);

        let track = resolve(&lookup, TrackRef::new(3)).unwrap().unwrap();

        assert_eq!(track.stream_url, None);
    }

    #[test]
    fn empty_metadata_is_an_error_and_skips_stream_lookup() {
        let lookup = FakeLookup::default();

        let result = resolve(&lookup, TrackRef::new(5));

        assert!(matches!(result, Err(ResolveError::EmptyMetadata(5))));
        assert_eq!(lookup.calls.borrow().len(), 1);
    }

    #[test]
    fn secure_url_only_rewrites_the_scheme() {
        assert_eq!(secure_url("http://example.com/a.mp3"), "https://example.com/a.mp3");
        assert_eq!(secure_url("https://example.com/a.mp3"), "https://example.com/a.mp3");
        assert_eq!(
            secure_url("https://example.com/?next=http://x"),
            "https://example.com/?next=http://x"
        );
    }

    #[test]
    fn request_urls_follow_service_layout() {
        let lookup = HttpLookup::new(
            "https://api.i-meto.com/meting/api/",
            "http://localhost:2323/api/netease/song",
            Duration::from_secs(1),
        );

        assert_eq!(
            lookup.metadata_url(TrackRef::new(101)),
            "https://api.i-meto.com/meting/api/?server=netease&id=101"
        );
        assert_eq!(
            lookup.stream_url(101),
            "http://localhost:2323/api/netease/song?id=101"
        );
    }

    #[test]
    fn payloads_tolerate_missing_fields() {
        let metadata: Vec<MetingPayload> =
            serde_json::from_str(r#"[{"title":"A","author":"B","pic":"https://p/1.jpg"}]"#).unwrap();
        assert_eq!(metadata[0].pic.as_deref(), Some("https://p/1.jpg"));
        assert_eq!(metadata[0].lrc, None);

        let stream: Vec<StreamPayload> = serde_json::from_str(r#"[{"id":1,"url":null}]"#).unwrap();
        assert_eq!(stream[0].url, None);
    }

    #[test]
    fn worker_keeps_only_the_newest_queued_request() {
        let lookup = FakeLookup::with_track("Song", Some("http://example.com/a.mp3"));
        let (request_tx, request_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        request_tx.send(ResolveRequest { seq: 1, track: TrackRef::new(101) }).unwrap();
        request_tx.send(ResolveRequest { seq: 2, track: TrackRef::new(202) }).unwrap();
        drop(request_tx);

        run_resolver(&lookup, request_rx, event_tx);

        let events: Vec<AppEvent> = event_rx.try_iter().collect();
        assert_eq!(events.len(), 1);
        match &events[0] {
            AppEvent::TrackResolved(seq, track) => {
                assert_eq!(*seq, 2);
                assert_eq!(track.id, 202);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn worker_reports_failures_with_their_sequence_number() {
        let lookup = FakeLookup {
            fail_stream: true,
            ..FakeLookup::with_track("Song", None)
        };
        let (request_tx, request_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        request_tx.send(ResolveRequest { seq: 9, track: TrackRef::new(1) }).unwrap();
        drop(request_tx);

        run_resolver(&lookup, request_rx, event_tx);

        match event_rx.try_recv() {
            Ok(AppEvent::ResolveFailed(seq, message)) => {
                assert_eq!(seq, 9);
                assert!(message.starts_with("failed to decode response"));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
