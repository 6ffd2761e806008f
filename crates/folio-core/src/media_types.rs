// crates/folio-core/src/media_types.rs
//
// Types that cross the boundary between the controllers and the media
// backends in folio-media. No egui, no rodio — just plain data plus the
// event channel handle an element uses to report back.

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::error::{LoadFailure, PlayError};
use crate::media::Phase;

/// A playable asset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSource {
    pub url:         String,
    /// Cheap placeholder shown while the full asset loads.
    #[serde(default)]
    pub low_res_url: Option<String>,
    #[serde(default)]
    pub poster_url:  Option<String>,
}

impl MediaSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), low_res_url: None, poster_url: None }
    }

    pub fn with_poster(mut self, poster: impl Into<String>) -> Self {
        self.poster_url = Some(poster.into());
        self
    }

    pub fn with_low_res(mut self, low_res: impl Into<String>) -> Self {
        self.low_res_url = Some(low_res.into());
        self
    }

    /// Blank sources suppress rendering instead of producing a load error.
    pub fn is_renderable(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// Which URL a progressive view should show for the given phase:
    /// the low-res placeholder (or poster) while loading, the asset once it is
    /// ready, and the poster again if loading failed.
    ///
    /// ```
    /// use folio_core::{MediaSource, Phase};
    /// let src = MediaSource::new("/v.mp4").with_low_res("/v-lo.jpg").with_poster("/v.jpg");
    /// assert_eq!(src.display_url(Phase::Loading), Some("/v-lo.jpg"));
    /// assert_eq!(src.display_url(Phase::Ready),   Some("/v.mp4"));
    /// assert_eq!(src.display_url(Phase::Error),   Some("/v.jpg"));
    /// ```
    pub fn display_url(&self, phase: Phase) -> Option<&str> {
        match phase {
            Phase::Idle | Phase::Loading => self.low_res_url.as_deref()
                .or(self.poster_url.as_deref()),
            Phase::Ready | Phase::Playing | Phase::Paused => Some(self.url.as_str()),
            Phase::Error => self.poster_url.as_deref(),
        }
    }
}

/// A technology badge shown under a project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechItem {
    pub name: String,
    pub logo: String,
    #[serde(default)]
    pub url:  String,
}

/// One entry of the project showcase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name:       String,
    pub year:       u16,
    pub video:      MediaSource,
    #[serde(default)]
    pub tech_stack: Vec<TechItem>,
}

/// Link in the hero block (mail, profile, repository).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactLink {
    pub label: String,
    pub url:   String,
}

/// Who the showcase belongs to, shown above the project list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hero {
    pub name:     String,
    pub tagline:  String,
    pub contacts: Vec<ContactLink>,
}

/// One background-music track.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub path: String,
}

/// Identifies one `play()` request; the element echoes it in `PlayResolved`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlayTicket(pub u64);

/// Everything a media element can report.
#[derive(Clone, Debug, PartialEq)]
pub enum MediaEvent {
    LoadStart,
    LoadedData,
    CanPlay,
    Error(LoadFailure),
    Ended,
    Stalled,
    /// Resolution of an earlier `play(ticket)` call.
    PlayResolved { ticket: PlayTicket, result: Result<(), PlayError> },
    /// Playback position, in seconds. `duration` is 0 when unknown.
    TimeUpdate { position: f64, duration: f64 },
}

/// Sending half of a per-source event channel.
///
/// A new channel is opened every time a controller attaches a source. Once
/// the controller moves on, the receiving half is gone and `emit` returns
/// false, so an element (or a loader thread it spawned) still holding an old
/// sink cannot reach the new source's state.
#[derive(Clone, Debug)]
pub struct EventSink {
    tx: Sender<MediaEvent>,
}

impl EventSink {
    /// Returns false when the source this sink belonged to has been detached.
    pub fn emit(&self, event: MediaEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Open a fresh per-source channel. Controllers call this on every attach.
pub fn event_channel() -> (EventSink, Receiver<MediaEvent>) {
    let (tx, rx) = unbounded();
    (EventSink { tx }, rx)
}
