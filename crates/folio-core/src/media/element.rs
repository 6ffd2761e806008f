// crates/folio-core/src/media/element.rs

use crate::media_types::{EventSink, MediaSource, PlayTicket};

/// What a playable element must offer the controller.
///
/// Calls never report results directly. Everything the element learns
/// (buffered enough, failed, ended, play accepted or refused) goes back
/// through the `EventSink` it was handed in `attach`. An element must drop
/// that sink in `detach`; after that point nothing it does can reach the
/// controller.
pub trait MediaElement {
    /// Point the element at `source`. Always preceded by `detach` when a
    /// previous source was attached.
    fn attach(&mut self, source: &MediaSource, events: EventSink);

    /// Stop playback, abort any fetch and drop the event sink.
    fn detach(&mut self);

    /// Begin fetching the attached source.
    fn load(&mut self);

    /// Request playback. Answered by `MediaEvent::PlayResolved { ticket, .. }`.
    fn play(&mut self, ticket: PlayTicket);

    fn pause(&mut self);

    fn set_muted(&mut self, muted: bool);

    /// Called at the start of every controller pump. Backends that must poll
    /// their device (end-of-track detection, position updates) do it here.
    fn tick(&mut self) {}
}

impl<E: MediaElement + ?Sized> MediaElement for Box<E> {
    fn attach(&mut self, source: &MediaSource, events: EventSink) {
        (**self).attach(source, events)
    }
    fn detach(&mut self)                 { (**self).detach() }
    fn load(&mut self)                   { (**self).load() }
    fn play(&mut self, ticket: PlayTicket) { (**self).play(ticket) }
    fn pause(&mut self)                  { (**self).pause() }
    fn set_muted(&mut self, muted: bool) { (**self).set_muted(muted) }
    fn tick(&mut self)                   { (**self).tick() }
}
