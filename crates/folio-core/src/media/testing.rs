// crates/folio-core/src/media/testing.rs
//
// Recording MediaElement used by the controller, showcase and music tests.

use crate::error::PlayError;
use crate::media::MediaElement;
use crate::media_types::{EventSink, MediaEvent, MediaSource, PlayTicket};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Attach(String),
    Detach,
    Load,
    Play { muted: bool },
    Pause,
    SetMuted(bool),
}

/// Resolves every `play()` synchronously according to `deny_unmuted` /
/// `deny_muted`, unless `manual_play` is set, in which case tests resolve
/// plays themselves through `resolve_last_play`.
#[derive(Debug, Default)]
pub struct FakeElement {
    pub calls:        Vec<Call>,
    pub sink:         Option<EventSink>,
    /// Sinks from earlier attaches, kept to simulate late events.
    pub stale_sinks:  Vec<EventSink>,
    pub muted:        bool,
    pub deny_unmuted: bool,
    pub deny_muted:   bool,
    pub manual_play:  bool,
    pub last_ticket:  Option<PlayTicket>,
}

impl FakeElement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Browser with an autoplay policy that refuses everything until unlocked.
    pub fn locked() -> Self {
        Self { deny_unmuted: true, deny_muted: true, ..Self::default() }
    }

    pub fn emit(&self, event: MediaEvent) -> bool {
        self.sink.as_ref().map(|s| s.emit(event)).unwrap_or(false)
    }

    pub fn resolve_last_play(&self, result: Result<(), PlayError>) -> bool {
        match self.last_ticket {
            Some(ticket) => self.emit(MediaEvent::PlayResolved { ticket, result }),
            None         => false,
        }
    }

    pub fn attached_urls(&self) -> Vec<String> {
        self.calls.iter().filter_map(|c| match c {
            Call::Attach(url) => Some(url.clone()),
            _                 => None,
        }).collect()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn play_count(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, Call::Play { .. })).count()
    }
}

impl MediaElement for FakeElement {
    fn attach(&mut self, source: &MediaSource, events: EventSink) {
        self.calls.push(Call::Attach(source.url.clone()));
        self.sink = Some(events);
    }

    fn detach(&mut self) {
        self.calls.push(Call::Detach);
        if let Some(old) = self.sink.take() {
            self.stale_sinks.push(old);
        }
    }

    fn load(&mut self) {
        self.calls.push(Call::Load);
    }

    fn play(&mut self, ticket: PlayTicket) {
        self.calls.push(Call::Play { muted: self.muted });
        self.last_ticket = Some(ticket);
        if self.manual_play {
            return;
        }
        let denied = if self.muted { self.deny_muted } else { self.deny_unmuted };
        let result = if denied { Err(PlayError::NotAllowed) } else { Ok(()) };
        self.emit(MediaEvent::PlayResolved { ticket, result });
    }

    fn pause(&mut self) {
        self.calls.push(Call::Pause);
    }

    fn set_muted(&mut self, muted: bool) {
        self.calls.push(Call::SetMuted(muted));
        self.muted = muted;
    }
}
