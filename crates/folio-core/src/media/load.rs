// crates/folio-core/src/media/load.rs
//
// MediaLoadController drives one media element.
//
//   Idle ──(eager, or gate reports visible)──▶ Loading
//   Loading ──LoadedData/CanPlay──▶ Ready ──autoplay──▶ Playing | Paused(blocked)
//   Loading ──load timeout──▶ Ready (best effort, logged)
//   Loading/Ready/Playing/Paused ──Error──▶ Error   (terminal for this source)
//   Playing ◀──toggle──▶ Paused
//   any ──set_source──▶ Idle
//
// Source changes detach the old element source and drop the old event
// receiver before the new source is attached. Late events from the old source
// hit a closed channel, so they can't mutate the new state.
//
// Nothing fires after `teardown()` (also run on drop): timers are cleared,
// listeners unregistered, the event receiver dropped.

use std::time::Instant;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, warn};
use uuid::Uuid;

use crate::error::{ErrorKind, PlayError};
use crate::helpers::geometry::Rect;
use crate::helpers::timers::{TimerId, Timers};
use crate::interaction::{InteractionBus, InteractionListener, UNLOCK_GESTURES};
use crate::intersection::{IntersectionEntry, IntersectionGate};
use crate::media::autoplay::{AutoplayAction, AutoplayRetryPolicy};
use crate::media::element::MediaElement;
use crate::media::state::{MediaLoadState, MediaOptions, Phase};
use crate::media_types::{event_channel, MediaEvent, MediaSource, PlayTicket};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MediaTimer {
    LoadTimeout,
    Unmute,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PlayIntent {
    Autoplay,
    User,
}

pub struct MediaLoadController<E: MediaElement> {
    id:            Uuid,
    element:       E,
    options:       MediaOptions,
    gate:          IntersectionGate,
    bus:           InteractionBus,

    source:        Option<MediaSource>,
    state:         MediaLoadState,
    /// Receiving half of the current source's event channel.
    events:        Option<Receiver<MediaEvent>>,
    timers:        Timers<MediaTimer>,
    load_timeout:  Option<TimerId>,
    unmute_timer:  Option<TimerId>,
    autoplay:      AutoplayRetryPolicy,
    /// Armed gesture listeners while autoplay waits for the user.
    gesture:       Option<InteractionListener>,
    pending_play:  Option<(PlayTicket, PlayIntent)>,
    next_ticket:   u64,
    /// Set by a natural end of playback; consumed by `take_ended`.
    ended:         bool,
    /// (position, duration) in seconds from the latest TimeUpdate.
    progress:      Option<(f64, f64)>,
    observers:     Vec<Sender<MediaLoadState>>,
    mounted:       bool,
}

impl<E: MediaElement> std::fmt::Debug for MediaLoadController<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaLoadController")
            .field("id", &self.id)
            .field("source", &self.source.as_ref().map(|s| s.url.as_str()))
            .field("state", &self.state)
            .field("mounted", &self.mounted)
            .finish()
    }
}

impl<E: MediaElement> MediaLoadController<E> {
    /// Mount a controller with no source. Call `set_source` to start.
    pub fn new(
        element: E,
        options: MediaOptions,
        gate:    IntersectionGate,
        bus:     InteractionBus,
    ) -> Self {
        let autoplay = AutoplayRetryPolicy::new(options.unmute_delay);
        Self {
            id: Uuid::new_v4(),
            element,
            options,
            gate,
            bus,
            source:       None,
            state:        MediaLoadState::default(),
            events:       None,
            timers:       Timers::new(),
            load_timeout: None,
            unmute_timer: None,
            autoplay,
            gesture:      None,
            pending_play: None,
            next_ticket:  0,
            ended:        false,
            progress:     None,
            observers:    Vec::new(),
            mounted:      true,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn id(&self)           -> Uuid                 { self.id }
    pub fn state(&self)        -> &MediaLoadState      { &self.state }
    pub fn phase(&self)        -> Phase                { self.state.phase }
    pub fn source(&self)       -> Option<&MediaSource> { self.source.as_ref() }
    pub fn options(&self)      -> &MediaOptions        { &self.options }
    pub fn gate(&self)         -> &IntersectionGate    { &self.gate }
    pub fn element(&self)      -> &E                   { &self.element }
    pub fn element_mut(&mut self) -> &mut E            { &mut self.element }
    pub fn is_mounted(&self)   -> bool                 { self.mounted }
    pub fn progress(&self)     -> Option<(f64, f64)>   { self.progress }

    /// A blank or missing source renders nothing.
    pub fn should_render(&self) -> bool {
        self.mounted && self.source.is_some()
    }

    /// Earliest pending timer, so hosts can schedule their next pump.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Receive a snapshot after every state change.
    pub fn subscribe(&mut self) -> Receiver<MediaLoadState> {
        let (tx, rx) = unbounded();
        self.observers.push(tx);
        rx
    }

    /// Gesture listeners are armed: the next click, touch or key press
    /// retries playback. False once the gesture retry has been spent.
    pub fn awaiting_gesture(&self) -> bool {
        self.gesture.is_some()
    }

    /// True once after the element played to its natural end.
    pub fn take_ended(&mut self) -> bool {
        std::mem::take(&mut self.ended)
    }

    /// Whether the next source that becomes ready should start by itself.
    pub fn set_autoplay(&mut self, on: bool) {
        self.options.autoplay = on;
    }

    // ── Source lifecycle ──────────────────────────────────────────────────────

    /// Replace the source. The previous source is fully detached first; the
    /// new one starts at Idle and moves to Loading if it may load right away.
    /// Blank sources leave the controller Idle with nothing attached.
    pub fn set_source(&mut self, source: Option<MediaSource>, now: Instant) {
        if !self.mounted {
            return;
        }
        self.detach_source();
        self.state = MediaLoadState::default();

        let Some(source) = source.filter(MediaSource::is_renderable) else {
            self.notify();
            return;
        };

        debug!("[media] {} attach {}", self.id, source.url);
        let (sink, rx) = event_channel();
        self.events = Some(rx);
        self.element.attach(&source, sink);
        self.source = Some(source);
        self.notify();
        self.maybe_begin_loading(now);
    }

    /// Explicit retry of the current source (e.g. after a load error).
    pub fn reload(&mut self, now: Instant) {
        let Some(source) = self.source.clone() else { return };
        let retries = self.state.retry_count + 1;
        self.set_source(Some(source), now);
        self.state.retry_count = retries;
        self.notify();
    }

    /// Unmount: cancel everything, detach, and stop reacting to anything.
    pub fn teardown(&mut self) {
        if !self.mounted {
            return;
        }
        self.detach_source();
        self.mounted = false;
        self.observers.clear();
        debug!("[media] {} torn down", self.id);
    }

    fn detach_source(&mut self) {
        // Receiver goes first: from here on the old source's sink is dead.
        self.events = None;
        self.timers.cancel_all();
        self.load_timeout = None;
        self.unmute_timer = None;
        self.autoplay.cancel();
        self.gesture      = None;
        self.pending_play = None;
        self.ended        = false;
        self.progress     = None;
        if self.source.take().is_some() {
            self.element.detach();
        }
    }

    // ── Visibility ────────────────────────────────────────────────────────────

    pub fn observe_visibility(&mut self, entry: IntersectionEntry, now: Instant) {
        if !self.mounted {
            return;
        }
        self.gate.observe(entry);
        self.maybe_begin_loading(now);
    }

    pub fn observe_rects(&mut self, target: Rect, viewport: Rect, now: Instant) {
        if !self.mounted {
            return;
        }
        self.gate.observe_rects(target, viewport);
        self.maybe_begin_loading(now);
    }

    fn maybe_begin_loading(&mut self, now: Instant) {
        if self.state.phase != Phase::Idle || self.source.is_none() {
            return;
        }
        if self.options.lazy && !self.gate.has_intersected() {
            return;
        }
        self.element.load();
        self.state.phase = Phase::Loading;
        self.load_timeout = Some(
            self.timers.schedule(now + self.options.load_timeout, MediaTimer::LoadTimeout),
        );
        self.notify();
    }

    // ── Playback control ──────────────────────────────────────────────────────

    /// User play/pause. An explicit toggle supersedes any autoplay run and is
    /// the only way to retry after autoplay gave up.
    pub fn toggle(&mut self) {
        if !self.mounted {
            return;
        }
        match self.state.phase {
            Phase::Playing => self.pause(),
            Phase::Ready | Phase::Paused => self.play(),
            other => debug!("[media] {} toggle ignored in {other:?}", self.id),
        }
    }

    /// User-initiated play.
    pub fn play(&mut self) {
        if !self.mounted || !matches!(self.state.phase, Phase::Ready | Phase::Paused) {
            return;
        }
        self.cancel_autoplay();
        self.element.set_muted(self.options.muted);
        self.issue_play(PlayIntent::User);
    }

    pub fn pause(&mut self) {
        if !self.mounted {
            return;
        }
        // A muted autoplay start may be running underneath a Ready phase.
        let autoplaying = self.autoplay.awaiting_result()
            || self.unmute_timer.is_some()
            || self.gesture.is_some();
        if autoplaying {
            self.cancel_autoplay();
        }
        if autoplaying || self.state.phase == Phase::Playing {
            self.element.pause();
        }
        if self.state.phase == Phase::Playing {
            self.state.phase = Phase::Paused;
            self.notify();
        }
    }

    fn cancel_autoplay(&mut self) {
        self.autoplay.cancel();
        self.gesture      = None;
        self.pending_play = None;
        if let Some(id) = self.unmute_timer.take() {
            self.timers.cancel(id);
        }
    }

    fn issue_play(&mut self, intent: PlayIntent) {
        let ticket = PlayTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending_play = Some((ticket, intent));
        self.element.play(ticket);
    }

    // ── Event pump ────────────────────────────────────────────────────────────

    /// Process everything that has happened since the last pump: element
    /// events, a fired gesture listener, due timers. Repeats until quiet so
    /// synchronous backends settle within one call.
    pub fn pump(&mut self, now: Instant) {
        if !self.mounted {
            return;
        }
        self.element.tick();
        loop {
            let mut progressed = self.drain_events(now);
            progressed |= self.poll_gesture(now);
            progressed |= self.fire_timers(now);
            if !progressed || !self.mounted {
                break;
            }
        }
    }

    fn drain_events(&mut self, now: Instant) -> bool {
        let mut any = false;
        // One at a time: if handling an event changes the source, the next
        // receive already comes from the new channel.
        while let Some(event) = self.events.as_ref().and_then(|rx| rx.try_recv().ok()) {
            any = true;
            self.handle_event(event, now);
        }
        any
    }

    fn poll_gesture(&mut self, now: Instant) -> bool {
        let Some(kind) = self.gesture.as_ref().and_then(|l| l.try_fired()) else {
            return false;
        };
        debug!("[autoplay] {} gesture {kind:?}", self.id);
        self.gesture = None;
        let actions = self.autoplay.on_gesture();
        self.apply(actions, now);
        true
    }

    fn fire_timers(&mut self, now: Instant) -> bool {
        let due = self.timers.expire(now);
        let any = !due.is_empty();
        for (id, timer) in due {
            match timer {
                MediaTimer::LoadTimeout => {
                    if self.load_timeout == Some(id) {
                        self.load_timeout = None;
                        self.on_load_timeout(now);
                    }
                }
                MediaTimer::Unmute => {
                    if self.unmute_timer == Some(id) {
                        self.unmute_timer = None;
                        let actions = self.autoplay.on_unmute_due();
                        self.apply(actions, now);
                    }
                }
            }
        }
        any
    }

    fn handle_event(&mut self, event: MediaEvent, now: Instant) {
        match event {
            MediaEvent::LoadStart => {
                debug!("[media] {} loadstart", self.id);
            }
            MediaEvent::LoadedData | MediaEvent::CanPlay => {
                if self.state.phase == Phase::Loading {
                    if let Some(id) = self.load_timeout.take() {
                        self.timers.cancel(id);
                    }
                    self.state.phase = Phase::Ready;
                    self.notify();
                    self.start_autoplay(now);
                }
            }
            MediaEvent::Error(failure) => {
                if matches!(self.state.phase, Phase::Idle | Phase::Error) {
                    return;
                }
                warn!("[media] {} failed to load: {failure}", self.id);
                self.timers.cancel_all();
                self.load_timeout = None;
                self.unmute_timer = None;
                self.autoplay.cancel();
                self.gesture      = None;
                self.pending_play = None;
                self.state.phase            = Phase::Error;
                self.state.autoplay_blocked = false;
                self.state.last_error       = Some(ErrorKind::LoadFailure);
                self.notify();
            }
            MediaEvent::Stalled => {
                warn!("[media] {} stalled", self.id);
            }
            MediaEvent::Ended => {
                if self.state.phase == Phase::Playing && !self.options.looped {
                    self.state.phase = Phase::Paused;
                    self.ended = true;
                    self.notify();
                }
            }
            MediaEvent::PlayResolved { ticket, result } => {
                match self.pending_play {
                    Some((pending, intent)) if pending == ticket => {
                        self.pending_play = None;
                        match intent {
                            PlayIntent::Autoplay => {
                                let actions = self.autoplay.on_play_result(&result);
                                self.apply(actions, now);
                            }
                            PlayIntent::User => self.on_user_play(result),
                        }
                    }
                    _ => debug!("[media] {} superseded play {ticket:?} ignored", self.id),
                }
            }
            MediaEvent::TimeUpdate { position, duration } => {
                self.progress = Some((position, duration));
            }
        }
    }

    fn on_load_timeout(&mut self, now: Instant) {
        if self.state.phase != Phase::Loading {
            return;
        }
        warn!(
            "[media] {} still loading after {:?}; continuing without readiness",
            self.id, self.options.load_timeout,
        );
        self.state.phase      = Phase::Ready;
        self.state.last_error = Some(ErrorKind::Timeout);
        self.notify();
        self.start_autoplay(now);
    }

    fn start_autoplay(&mut self, now: Instant) {
        if !self.options.autoplay {
            return;
        }
        let actions = self.autoplay.begin(self.options.muted);
        self.apply(actions, now);
    }

    fn on_user_play(&mut self, result: Result<(), PlayError>) {
        match result {
            Ok(()) => {
                self.state.phase            = Phase::Playing;
                self.state.autoplay_blocked = false;
            }
            Err(e) if e.is_policy() => {
                debug!("[media] {} user play refused by policy", self.id);
                self.state.phase            = Phase::Paused;
                self.state.autoplay_blocked = true;
                self.state.last_error       = Some(ErrorKind::AutoplayDenied);
            }
            Err(e) => {
                warn!("[media] {} playback failed: {e}", self.id);
                self.state.phase            = Phase::Error;
                self.state.autoplay_blocked = false;
                self.state.last_error       = Some(ErrorKind::Playback);
            }
        }
        self.notify();
    }

    fn apply(&mut self, actions: Vec<AutoplayAction>, now: Instant) {
        for action in actions {
            match action {
                AutoplayAction::SetMuted(muted) => self.element.set_muted(muted),
                AutoplayAction::Play            => self.issue_play(PlayIntent::Autoplay),
                AutoplayAction::Pause           => self.element.pause(),
                AutoplayAction::ScheduleUnmute(delay) => {
                    self.unmute_timer =
                        Some(self.timers.schedule(now + delay, MediaTimer::Unmute));
                }
                AutoplayAction::ArmGestureListeners => {
                    self.gesture = None;
                    self.gesture = Some(self.bus.listen(&UNLOCK_GESTURES));
                }
                AutoplayAction::DisarmGestureListeners => {
                    self.gesture = None;
                }
                AutoplayAction::Succeeded => {
                    self.state.phase            = Phase::Playing;
                    self.state.autoplay_blocked = false;
                    self.notify();
                }
                AutoplayAction::Blocked => {
                    self.state.phase            = Phase::Paused;
                    self.state.autoplay_blocked = true;
                    self.state.last_error       = Some(ErrorKind::AutoplayDenied);
                    self.notify();
                }
                AutoplayAction::Failed => {
                    if let Some(id) = self.unmute_timer.take() {
                        self.timers.cancel(id);
                    }
                    self.state.phase            = Phase::Error;
                    self.state.autoplay_blocked = false;
                    self.state.last_error       = Some(ErrorKind::Playback);
                    self.notify();
                }
            }
        }
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.state.clone();
        self.observers.retain(|tx| tx.send(snapshot.clone()).is_ok());
    }
}

impl<E: MediaElement> Drop for MediaLoadController<E> {
    fn drop(&mut self) {
        self.teardown();
    }
}
