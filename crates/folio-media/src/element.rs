// crates/folio-media/src/element.rs
//
// FetchElement: MediaElement for the project preview pane.
//
// There is no video decoder in the desktop build; the preview shows the
// poster / low-res still while "playing". What the element does do for real
// is verify that the video asset exists and is non-empty (file metadata or an
// HTTP HEAD, never the body), on a background thread, and report
// LoadStart → LoadedData → CanPlay, or Error.
//
// The loader thread holds a clone of the EventSink. Once the controller has
// moved on, that sink is dead and whatever the thread reports is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use log::debug;

use folio_core::media::MediaElement;
use folio_core::media_types::{EventSink, MediaEvent, MediaSource, PlayTicket};

use crate::fetch::AssetFetcher;

pub struct FetchElement {
    fetcher:    AssetFetcher,
    source:     Option<MediaSource>,
    events:     Option<EventSink>,
    /// Cancel flag of the running verification thread.
    cancel:     Option<Arc<AtomicBool>>,
    muted:      bool,
    /// Playback clock: accumulated seconds plus the instant play last began.
    position:   f64,
    playing_at: Option<Instant>,
}

impl FetchElement {
    pub fn new(fetcher: AssetFetcher) -> Self {
        Self {
            fetcher,
            source:     None,
            events:     None,
            cancel:     None,
            muted:      true,
            position:   0.0,
            playing_at: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing_at.is_some()
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn position(&self) -> f64 {
        self.position + self.playing_at.map(|t| t.elapsed().as_secs_f64()).unwrap_or(0.0)
    }

    fn emit(&self, event: MediaEvent) {
        if let Some(sink) = &self.events {
            sink.emit(event);
        }
    }
}

impl MediaElement for FetchElement {
    fn attach(&mut self, source: &MediaSource, events: EventSink) {
        self.source   = Some(source.clone());
        self.events   = Some(events);
        self.position = 0.0;
    }

    fn detach(&mut self) {
        if let Some(flag) = self.cancel.take() {
            flag.store(true, Ordering::Relaxed);
        }
        self.source     = None;
        self.events     = None;
        self.playing_at = None;
        self.position   = 0.0;
    }

    fn load(&mut self) {
        let (Some(source), Some(sink)) = (self.source.clone(), self.events.clone()) else {
            return;
        };
        if let Some(old) = self.cancel.take() {
            old.store(true, Ordering::Relaxed);
        }
        let cancel  = Arc::new(AtomicBool::new(false));
        let flag    = Arc::clone(&cancel);
        let fetcher = self.fetcher.clone();
        self.cancel = Some(cancel);

        thread::spawn(move || verify_source(&fetcher, &source, &sink, &flag));
    }

    fn play(&mut self, ticket: PlayTicket) {
        if self.source.is_none() {
            return;
        }
        if self.playing_at.is_none() {
            self.playing_at = Some(Instant::now());
        }
        // Desktop has no autoplay policy: every request is granted.
        self.emit(MediaEvent::PlayResolved { ticket, result: Ok(()) });
    }

    fn pause(&mut self) {
        if let Some(t) = self.playing_at.take() {
            self.position += t.elapsed().as_secs_f64();
        }
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn tick(&mut self) {
        if self.is_playing() {
            self.emit(MediaEvent::TimeUpdate { position: self.position(), duration: 0.0 });
        }
    }
}

/// Body of the verification thread. Checks `cancel` before any I/O and again
/// before reporting, so a superseded load does no work and says nothing.
fn verify_source(fetcher: &AssetFetcher, source: &MediaSource, sink: &EventSink, cancel: &AtomicBool) {
    let cancelled = || {
        let hit = cancel.load(Ordering::Relaxed);
        if hit {
            debug!("[media] verification of {} cancelled", source.url);
        }
        hit
    };
    if cancelled() {
        return;
    }
    sink.emit(MediaEvent::LoadStart);
    let result = fetcher.verify(&source.url);
    if cancelled() {
        return;
    }
    match result {
        Ok(size) => {
            debug!("[media] {} verified ({size:?} bytes)", source.url);
            sink.emit(MediaEvent::LoadedData);
            sink.emit(MediaEvent::CanPlay);
        }
        Err(failure) => {
            sink.emit(MediaEvent::Error(failure));
        }
    }
}

impl Drop for FetchElement {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use folio_core::media_types::event_channel;
    use folio_core::LoadFailure;

    use super::*;

    fn recv_until_settled(rx: &crossbeam_channel::Receiver<MediaEvent>) -> Vec<MediaEvent> {
        let mut seen = Vec::new();
        while let Ok(ev) = rx.recv_timeout(Duration::from_secs(2)) {
            let done = matches!(ev, MediaEvent::CanPlay | MediaEvent::Error(_));
            seen.push(ev);
            if done {
                break;
            }
        }
        seen
    }

    #[test]
    fn existing_video_reports_ready() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("p.webm"), b"webm").unwrap();
        let mut el = FetchElement::new(AssetFetcher::new(Some(dir.path().to_path_buf())));

        let (sink, rx) = event_channel();
        el.attach(&MediaSource::new("/p.webm"), sink);
        el.load();
        assert_eq!(recv_until_settled(&rx), vec![
            MediaEvent::LoadStart,
            MediaEvent::LoadedData,
            MediaEvent::CanPlay,
        ]);
    }

    #[test]
    fn missing_video_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut el = FetchElement::new(AssetFetcher::new(Some(dir.path().to_path_buf())));
        let (sink, rx) = event_channel();
        el.attach(&MediaSource::new("gone.webm"), sink);
        el.load();
        let seen = recv_until_settled(&rx);
        assert!(matches!(seen.last(), Some(MediaEvent::Error(LoadFailure::NotFound(_)))));
    }

    #[test]
    fn superseded_verification_does_no_work() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("p.webm"), b"webm").unwrap();
        let fetcher = AssetFetcher::new(Some(dir.path().to_path_buf()));
        let (sink, rx) = event_channel();

        verify_source(&fetcher, &MediaSource::new("p.webm"), &sink, &AtomicBool::new(true));
        assert!(rx.try_recv().is_err());

        verify_source(&fetcher, &MediaSource::new("p.webm"), &sink, &AtomicBool::new(false));
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![
            MediaEvent::LoadStart,
            MediaEvent::LoadedData,
            MediaEvent::CanPlay,
        ]);
        assert!(fetcher.cached_entries().is_empty());
    }

    #[test]
    fn play_is_always_granted_and_pause_keeps_position() {
        let mut el = FetchElement::new(AssetFetcher::default());
        let (sink, rx) = event_channel();
        el.attach(&MediaSource::new("p.webm"), sink);
        el.play(PlayTicket(7));
        assert_eq!(
            rx.try_recv().unwrap(),
            MediaEvent::PlayResolved { ticket: PlayTicket(7), result: Ok(()) },
        );
        assert!(el.is_playing());
        el.pause();
        assert!(!el.is_playing());
        let pos = el.position();
        assert_eq!(el.position(), pos);
    }

    #[test]
    fn detached_element_reports_nothing() {
        let mut el = FetchElement::new(AssetFetcher::default());
        let (sink, rx) = event_channel();
        el.attach(&MediaSource::new("p.webm"), sink);
        el.detach();
        el.play(PlayTicket(0));
        el.tick();
        assert!(rx.try_recv().is_err());
    }
}
