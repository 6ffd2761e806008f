// crates/folio-media/src/audio.rs
//
// AudioElement: rodio-backed MediaElement for the background music player.
//
// - The output stream is opened lazily on the first tick, not at construction;
//   some platforms need the window's event loop running first.
// - Track bytes are fetched on a background thread (local file or HTTP) and
//   handed back over a channel; the Decoder and Sink are built in `tick`.
//   A track staged ahead of time by MediaWorker::prefetch is used instead.
//   Track bytes are never kept in the image cache.
// - End of track: `sink.empty()` after the sink was seen non-empty, and only
//   once MIN_PLAY_SECS have passed since playback began. Rodio fills its
//   buffer asynchronously, so a fresh sink can read empty for a tick or two.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver};
use log::{debug, warn};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use folio_core::error::{LoadFailure, PlayError};
use folio_core::media::MediaElement;
use folio_core::media_types::{EventSink, MediaEvent, MediaSource, PlayTicket};

use crate::fetch::AssetFetcher;

/// Minimum time a sink must have been playing before `empty()` counts as the
/// end of the track.
const MIN_PLAY_SECS: f64 = 1.5;

pub struct AudioElement {
    fetcher:     AssetFetcher,
    volume:      f32,
    muted:       bool,

    /// Opened on first use; must outlive every sink.
    stream:      Option<OutputStream>,
    stream_failed: bool,

    source:      Option<MediaSource>,
    events:      Option<EventSink>,
    pending:     Option<Receiver<Result<Arc<[u8]>, LoadFailure>>>,
    cancel:      Option<Arc<AtomicBool>>,
    sink:        Option<Sink>,
    duration:    Option<Duration>,
    playing:     bool,
    play_started: Option<Instant>,
    has_played:  bool,
}

impl AudioElement {
    pub fn new(fetcher: AssetFetcher, volume: f32) -> Self {
        Self {
            fetcher,
            volume: volume.clamp(0.0, 1.0),
            muted:  false,
            stream: None,
            stream_failed: false,
            source:  None,
            events:  None,
            pending: None,
            cancel:  None,
            sink:    None,
            duration: None,
            playing: false,
            play_started: None,
            has_played: false,
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.apply_volume();
    }

    fn apply_volume(&self) {
        if let Some(sink) = &self.sink {
            sink.set_volume(if self.muted { 0.0 } else { self.volume });
        }
    }

    fn emit(&self, event: MediaEvent) {
        if let Some(sink) = &self.events {
            sink.emit(event);
        }
    }

    fn ensure_stream(&mut self) -> bool {
        if self.stream.is_some() {
            return true;
        }
        if self.stream_failed {
            return false;
        }
        match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => {
                debug!("[music] audio stream ready");
                self.stream = Some(stream);
                true
            }
            Err(e) => {
                warn!("[music] no audio output: {e}");
                self.stream_failed = true;
                false
            }
        }
    }

    /// Build the paused sink once the fetch thread has delivered the bytes.
    fn poll_fetch(&mut self) {
        let Some(rx) = &self.pending else { return };
        let Ok(result) = rx.try_recv() else { return };
        self.pending = None;
        self.cancel  = None;

        let bytes = match result {
            Ok(bytes) => bytes,
            Err(failure) => {
                self.emit(MediaEvent::Error(failure));
                return;
            }
        };
        let decoder = match Decoder::new(Cursor::new(bytes.to_vec())) {
            Ok(d)  => d,
            Err(e) => {
                self.emit(MediaEvent::Error(LoadFailure::Decode(e.to_string())));
                return;
            }
        };
        if !self.ensure_stream() {
            self.emit(MediaEvent::Error(LoadFailure::Unsupported("no audio output device".into())));
            return;
        }
        let Some(stream) = &self.stream else { return };

        self.duration = decoder.total_duration();
        let sink = Sink::connect_new(stream.mixer());
        sink.pause();
        sink.append(decoder);
        self.sink = Some(sink);
        self.apply_volume();
        self.emit(MediaEvent::LoadedData);
        self.emit(MediaEvent::CanPlay);
    }

    fn poll_playback(&mut self) {
        let Some(sink) = &self.sink else { return };
        if !self.playing {
            return;
        }
        let position = sink.get_pos().as_secs_f64();
        let duration = self.duration.map(|d| d.as_secs_f64()).unwrap_or(0.0);

        if !sink.empty() {
            self.has_played = true;
            self.emit(MediaEvent::TimeUpdate { position, duration });
            return;
        }
        let elapsed = self.play_started.map(|t| t.elapsed().as_secs_f64()).unwrap_or(0.0);
        if self.has_played && elapsed >= MIN_PLAY_SECS {
            debug!("[music] track exhausted after {elapsed:.2}s");
            self.playing = false;
            self.emit(MediaEvent::Ended);
        }
    }
}

impl MediaElement for AudioElement {
    fn attach(&mut self, source: &MediaSource, events: EventSink) {
        self.source = Some(source.clone());
        self.events = Some(events);
    }

    fn detach(&mut self) {
        if let Some(flag) = self.cancel.take() {
            flag.store(true, Ordering::Relaxed);
        }
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.pending      = None;
        self.source       = None;
        self.events       = None;
        self.duration     = None;
        self.playing      = false;
        self.play_started = None;
        self.has_played   = false;
    }

    fn load(&mut self) {
        let (Some(source), Some(sink)) = (self.source.clone(), self.events.as_ref()) else {
            return;
        };
        sink.emit(MediaEvent::LoadStart);

        let (tx, rx) = bounded(1);
        let cancel   = Arc::new(AtomicBool::new(false));
        let flag     = Arc::clone(&cancel);
        let fetcher  = self.fetcher.clone();
        self.pending = Some(rx);
        self.cancel  = Some(cancel);

        thread::spawn(move || {
            let result = match fetcher.take_staged(&source.url) {
                Some(bytes) => Ok(bytes),
                None        => fetcher.fetch_uncached(&source.url).map(Arc::<[u8]>::from),
            };
            if !flag.load(Ordering::Relaxed) {
                let _ = tx.send(result);
            }
        });
    }

    fn play(&mut self, ticket: PlayTicket) {
        let result = match &self.sink {
            Some(sink) => {
                sink.play();
                self.playing = true;
                if self.play_started.is_none() {
                    self.play_started = Some(Instant::now());
                }
                Ok(())
            }
            None if self.stream_failed => Err(PlayError::NotSupported),
            None => Err(PlayError::Aborted),
        };
        self.emit(MediaEvent::PlayResolved { ticket, result });
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
        self.playing = false;
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.apply_volume();
    }

    fn tick(&mut self) {
        self.poll_fetch();
        self.poll_playback();
    }
}

impl Drop for AudioElement {
    fn drop(&mut self) {
        self.detach();
    }
}
